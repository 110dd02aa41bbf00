//! Read-only ability catalog keyed by server and job.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::ability::Ability;
use crate::data::loader::{read_data_file, resolve_ability};
use crate::error::FileError;

pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.yaml";

/// Environment variable overriding [DEFAULT_CATALOG_PATH].
pub const CATALOG_PATH_ENV: &str = "MACROSIM_CATALOG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCatalog {
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCatalog {
    #[serde(default)]
    pub jobs: BTreeMap<String, JobCatalog>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub data_version: Option<String>,
    #[serde(default)]
    pub servers: BTreeMap<String, ServerCatalog>,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FileError> {
        read_data_file(path)
    }

    /// Single-job catalog, mostly for tests and embedding callers.
    pub fn single_job(server: &str, job: &str, abilities: Vec<Ability>) -> Self {
        let mut jobs = BTreeMap::new();
        jobs.insert(job.to_string(), JobCatalog { abilities });
        let mut servers = BTreeMap::new();
        servers.insert(server.to_string(), ServerCatalog { jobs });
        Self {
            data_version: None,
            servers,
        }
    }

    pub fn job(&self, server: &str, job: &str) -> Option<&JobCatalog> {
        self.servers.get(server)?.jobs.get(job)
    }

    pub fn ability(&self, server: &str, job: &str, id_or_name: &str) -> Option<&Ability> {
        resolve_ability(self.job(server, job)?, id_or_name)
    }
}

/// Catalog path from `MACROSIM_CATALOG`, falling back to the default.
pub fn catalog_path_from_env() -> String {
    std::env::var(CATALOG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CATALOG_PATH.to_string())
}
