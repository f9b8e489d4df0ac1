//! Built-in structure adapters.
//!
//! `json://path` loads a structure snapshot previously written with
//! `semdiff show --format json`. `stdin://` reads the same format from
//! standard input and takes no resource.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use crate::error::{Result, SemdiffError};
use crate::registry::{Adapter, AdapterFactory};
use crate::types::Structure;

/// Structure snapshot on disk.
pub struct JsonAdapter {
    path: PathBuf,
}

impl Adapter for JsonAdapter {
    fn get_structure(&self) -> Result<Structure> {
        if !self.path.exists() {
            return Err(SemdiffError::PathNotFound {
                path: self.path.display().to_string(),
            });
        }
        let content = fs::read_to_string(&self.path)?;
        let mut structure: Structure = serde_json::from_str(&content)?;
        if structure.path.is_none() {
            structure.path = Some(self.path.display().to_string());
        }
        Ok(structure)
    }
}

pub struct JsonAdapterFactory;

impl AdapterFactory for JsonAdapterFactory {
    fn scheme(&self) -> &'static str {
        "json"
    }

    fn create(&self, resource: Option<&str>) -> Result<Box<dyn Adapter>> {
        match resource {
            Some(path) if !path.is_empty() => Ok(Box::new(JsonAdapter {
                path: PathBuf::from(path),
            })),
            _ => Err(SemdiffError::Adapter {
                scheme: self.scheme().to_string(),
                message: "expected a snapshot path, as in json://structure.json".to_string(),
            }),
        }
    }
}

/// Structure snapshot piped on standard input.
pub struct StdinAdapter;

impl Adapter for StdinAdapter {
    fn get_structure(&self) -> Result<Structure> {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub struct StdinAdapterFactory;

impl AdapterFactory for StdinAdapterFactory {
    fn scheme(&self) -> &'static str {
        "stdin"
    }

    fn accepts_resource(&self) -> bool {
        false
    }

    fn create(&self, _resource: Option<&str>) -> Result<Box<dyn Adapter>> {
        Ok(Box::new(StdinAdapter))
    }
}
