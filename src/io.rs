use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScenarioError;

/// On-disk form of a location network: the vertex list and the edge list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NetworkDefinition {
    pub locations: Vec<IOLocation>,
    #[serde(default)]
    pub links: Vec<IOLink>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IOLocation {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IOLink {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

impl NetworkDefinition {
    /// Reads a definition from a `.json` file, anything else is parsed as yaml.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        info!("Loading network definition from {path:?}");
        let file = File::open(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let definition: NetworkDefinition = if is_json(path) {
            serde_json::from_reader(reader).map_err(|source| ScenarioError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_yaml::from_reader(reader).map_err(|source| ScenarioError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };
        info!(
            "Loaded {} locations and {} links",
            definition.locations.len(),
            definition.links.len()
        );
        Ok(definition)
    }
}

/// Resolves `file_path` against the directory of the config file, unless it is absolute or
/// explicitly relative to the working directory.
pub fn resolve_path(config_path: &Option<PathBuf>, file_path: &PathBuf) -> PathBuf {
    if file_path.is_absolute() || file_path.starts_with("./") {
        return file_path.clone();
    }

    if let Some(path) = config_path.as_ref().and_then(|c| c.parent()) {
        path.join(file_path)
    } else {
        file_path.clone()
    }
}

pub fn write_json<T: Serialize>(value: &T, file_path: &Path) -> Result<(), ScenarioError> {
    if let Some(prefix) = file_path.parent() {
        fs::create_dir_all(prefix).map_err(|source| ScenarioError::Io {
            path: prefix.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(file_path).map_err(|source| ScenarioError::Io {
        path: file_path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|source| {
        ScenarioError::Json {
            path: file_path.to_path_buf(),
            source,
        }
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
