use ahash::HashMap;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn, Level};

use crate::error::ScenarioError;
use crate::mst::PrimStrategy;

/// Registers an override handler for a `module.field` config key
macro_rules! register_override {
    ($key:literal, $func:expr) => {
        inventory::submit! {
            OverrideHandler {
                key: $key,
                apply: $func,
            }
        }
    };
}

struct OverrideHandler {
    key: &'static str,
    apply: fn(config: &mut Config, value: &str) -> Result<(), ScenarioError>,
}

inventory::collect!(OverrideHandler);

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    #[arg(long, short)]
    pub config: String,
    /// Name of the location the tree is grown from. Defaults to the first location.
    #[arg(long, short)]
    pub start: Option<String>,
    #[arg(long, value_enum)]
    pub strategy: Option<PrimStrategy>,
    #[arg(long = "set", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,
}

impl CommandLineArgs {
    pub fn new_with_path(path: impl ToString) -> Self {
        CommandLineArgs {
            config: path.to_string(),
            start: None,
            strategy: None,
            overrides: Vec::new(),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.find('=') {
        Some(pos) => Ok((s[..pos].to_string(), s[pos + 1..].to_string())),
        None => Err(format!("invalid KEY=VALUE: no `=` found in `{}`", s)),
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Config {
    // behind a mutex, so that getters can store defaults while the config is shared
    modules: Mutex<HashMap<String, Box<dyn ConfigModule>>>,
    #[serde(skip)]
    context: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            modules: Mutex::new(HashMap::default()),
            context: None,
        }
    }
}

impl TryFrom<CommandLineArgs> for Config {
    type Error = ScenarioError;

    fn try_from(args: CommandLineArgs) -> Result<Self, Self::Error> {
        let mut config = Config::from_file(Path::new(&args.config))?;
        config.apply_overrides(&args.overrides)?;

        if args.start.is_some() || args.strategy.is_some() {
            let mut mst = config.mst();
            if let Some(start) = args.start {
                mst.start = Some(start);
            }
            if let Some(strategy) = args.strategy {
                mst.strategy = strategy;
            }
            config.set_mst(mst);
        }
        Ok(config)
    }
}

impl Config {
    pub fn from_file(config_path: &Path) -> Result<Self, ScenarioError> {
        info!("Loading config from {config_path:?}");
        let file = File::open(config_path).map_err(|source| ScenarioError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        let mut config: Config =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| {
                ScenarioError::Yaml {
                    path: config_path.to_path_buf(),
                    source,
                }
            })?;
        config.set_context(Some(config_path.to_path_buf()));
        Ok(config)
    }

    pub fn set_context(&mut self, context: Option<PathBuf>) {
        self.context = context;
    }

    pub fn context(&self) -> &Option<PathBuf> {
        &self.context
    }

    /// Apply generic key-value overrides to the config, e.g. mst.start=Clifton
    fn apply_overrides(&mut self, overrides: &[(String, String)]) -> Result<(), ScenarioError> {
        info!("Applying overrides: {:?}", overrides);

        for (key, value) in overrides {
            let key_str = key.as_str();

            if let Some(handler) = inventory::iter::<OverrideHandler>().find(|h| h.key == key_str) {
                (handler.apply)(self, value)?;
            } else {
                warn!("No override handler found for key: {}", key);
            }
        }
        Ok(())
    }

    pub fn network(&self) -> Result<Network, ScenarioError> {
        self.module::<Network>("network")
            .ok_or(ScenarioError::MissingModule("network"))
    }

    pub fn set_network(&mut self, network: Network) {
        self.set_module("network", network);
    }

    pub fn mst(&self) -> Mst {
        self.module_or_default::<Mst>("mst")
    }

    pub fn set_mst(&mut self, mst: Mst) {
        self.set_module("mst", mst);
    }

    pub fn output(&self) -> Output {
        self.module_or_default::<Output>("output")
    }

    pub fn set_output(&mut self, output: Output) {
        self.set_module("output", output);
    }

    fn set_module<T: ConfigModule + 'static>(&mut self, key: &str, module: T) {
        self.modules
            .lock()
            .unwrap()
            .insert(key.to_string(), Box::new(module));
    }

    fn module<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.modules
            .lock()
            .unwrap()
            .get(key)
            .and_then(|boxed| boxed.as_ref().as_any().downcast_ref::<T>())
            .cloned()
    }

    /// Returns the module stored under `key`. If there is none, the default is stored and returned,
    /// so that a written config shows the values that were actually used.
    fn module_or_default<T: ConfigModule + Clone + Default + 'static>(&self, key: &str) -> T {
        if let Some(module) = self.module::<T>(key) {
            module
        } else {
            let default = T::default();
            self.modules
                .lock()
                .unwrap()
                .insert(key.to_string(), Box::new(default.clone()));
            default
        }
    }
}

pub fn write_config(config: &Config, output_path: &Path) -> Result<(), ScenarioError> {
    let output_config = output_path.join("output_config.yml");
    let file = File::create(&output_config).map_err(|source| ScenarioError::Io {
        path: output_config.clone(),
        source,
    })?;
    serde_yaml::to_writer(BufWriter::new(file), config).map_err(|source| ScenarioError::Yaml {
        path: output_config,
        source,
    })
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Network {
    pub path: PathBuf,
}

register_override!("network.path", |config, value| {
    config.set_network(Network {
        path: PathBuf::from(value),
    });
    Ok(())
});

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Mst {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub strategy: PrimStrategy,
}

register_override!("mst.start", |config, value| {
    let mut mst = config.mst();
    mst.start = Some(value.to_string());
    config.set_mst(mst);
    Ok(())
});

register_override!("mst.strategy", |config, value| {
    let mut mst = config.mst();
    mst.strategy =
        PrimStrategy::from_str(value, true).map_err(|_| ScenarioError::InvalidOverride {
            key: "mst.strategy".to_string(),
            value: value.to_string(),
        })?;
    config.set_mst(mst);
    Ok(())
});

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Output {
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub logging: Logging,
}

register_override!("output.output_dir", |config, value| {
    let mut output = config.output();
    output.output_dir = Some(PathBuf::from(value));
    config.set_output(output);
    Ok(())
});

register_override!("output.logging", |config, value| {
    let mut output = config.output();
    output.logging =
        Logging::from_str(value, true).map_err(|_| ScenarioError::InvalidOverride {
            key: "output.logging".to_string(),
            value: value.to_string(),
        })?;
    config.set_output(output);
    Ok(())
});

/// Level of the log file written into the output directory.
#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default)]
pub enum Logging {
    #[default]
    None,
    Info,
    Debug,
}

impl Logging {
    pub fn level(&self) -> Option<Level> {
        match self {
            Logging::None => None,
            Logging::Info => Some(Level::INFO),
            Logging::Debug => Some(Level::DEBUG),
        }
    }
}

#[typetag::serde(tag = "type")]
pub trait ConfigModule: Debug + Send {
    fn as_any(&self) -> &dyn Any;
}

#[typetag::serde]
impl ConfigModule for Network {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Mst {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Output {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::NamedTempFile;

    use crate::config::{
        parse_key_val, write_config, CommandLineArgs, Config, Logging, Mst, Network, Output,
    };
    use crate::error::ScenarioError;
    use crate::mst::PrimStrategy;

    const YAML: &str = r#"
modules:
  network:
    type: Network
    path: network.yml
  mst:
    type: Mst
    start: Clifton
    strategy: DenseScan
  output:
    type: Output
    output_dir: out
    logging: Info
"#;

    fn write_temp_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    fn base_config() -> Config {
        let mut config = Config::default();
        config.set_network(Network {
            path: "net.yml".into(),
        });
        config.set_mst(Mst {
            start: None,
            strategy: PrimStrategy::Queue,
        });
        config.set_output(Output::default());
        config
    }

    #[test]
    fn read_from_yaml() {
        let file = write_temp_config(YAML);
        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.network().unwrap().path, PathBuf::from("network.yml"));
        assert_eq!(config.mst().start.as_deref(), Some("Clifton"));
        assert_eq!(config.mst().strategy, PrimStrategy::DenseScan);
        assert_eq!(config.output().output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.output().logging, Logging::Info);
        assert_eq!(config.context(), &Some(file.path().to_path_buf()));
    }

    #[test]
    fn missing_modules_fall_back_to_defaults() {
        let config: Config = serde_yaml::from_str("modules: {}").unwrap();
        assert_eq!(config.mst(), Mst::default());
        assert_eq!(config.output(), Output::default());
        assert!(matches!(
            config.network(),
            Err(ScenarioError::MissingModule("network"))
        ));
    }

    #[test]
    fn roundtrip_serialize_deserialize() {
        let config = base_config();
        let serialized = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&serialized).unwrap();

        assert_eq!(parsed.network().unwrap(), config.network().unwrap());
        assert_eq!(parsed.mst(), config.mst());
        assert_eq!(parsed.output(), config.output());
    }

    #[test]
    fn write_config_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = base_config();
        write_config(&config, dir.path()).unwrap();

        let written = std::fs::read_to_string(dir.path().join("output_config.yml")).unwrap();
        let parsed: Config = serde_yaml::from_str(&written).unwrap();
        assert_eq!(parsed.network().unwrap().path, PathBuf::from("net.yml"));
    }

    #[test]
    fn command_line_start_and_strategy_win() {
        let file = write_temp_config(YAML);
        let args = CommandLineArgs {
            config: file.path().to_str().unwrap().to_string(),
            start: Some("Saddar".to_string()),
            strategy: Some(PrimStrategy::Queue),
            overrides: vec![("mst.start".to_string(), "Lyari".to_string())],
        };
        let config = Config::try_from(args).unwrap();
        assert_eq!(config.mst().start.as_deref(), Some("Saddar"));
        assert_eq!(config.mst().strategy, PrimStrategy::Queue);
    }

    #[test]
    fn override_output_dir() {
        let file = write_temp_config(YAML);
        let args = CommandLineArgs {
            overrides: vec![("output.output_dir".to_string(), "new_out".to_string())],
            ..CommandLineArgs::new_with_path(file.path().to_str().unwrap())
        };
        let config = Config::try_from(args).unwrap();
        assert_eq!(config.output().output_dir, Some(PathBuf::from("new_out")));
        assert_eq!(config.output().logging, Logging::Info);
    }

    #[test]
    fn override_network_path() {
        let mut config = base_config();
        config
            .apply_overrides(&[("network.path".to_string(), "other.yml".to_string())])
            .unwrap();
        assert_eq!(config.network().unwrap().path, PathBuf::from("other.yml"));
    }

    #[test]
    fn override_strategy_ignores_case() {
        let mut config = base_config();
        config
            .apply_overrides(&[("mst.strategy".to_string(), "dense-scan".to_string())])
            .unwrap();
        assert_eq!(config.mst().strategy, PrimStrategy::DenseScan);
    }

    #[test]
    fn override_strategy_invalid() {
        let mut config = base_config();
        let result =
            config.apply_overrides(&[("mst.strategy".to_string(), "fibonacci".to_string())]);
        assert!(matches!(
            result,
            Err(ScenarioError::InvalidOverride { key, .. }) if key == "mst.strategy"
        ));
    }

    #[test]
    fn unknown_override_is_ignored() {
        let mut config = base_config();
        config
            .apply_overrides(&[("routing.mode".to_string(), "ad-hoc".to_string())])
            .unwrap();
        assert_eq!(config.mst(), Mst::default());
    }

    #[test]
    fn test_parse_key_val_valid() {
        let parsed = parse_key_val("mst.start=Delivery Station (Karachi)");
        assert_eq!(
            parsed,
            Ok((
                "mst.start".to_string(),
                "Delivery Station (Karachi)".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_key_val_invalid() {
        assert!(parse_key_val("mst.start_Clifton").is_err());
    }
}
