//! Read YAML/JSON data files and resolve abilities by id or display name.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::data::ability::Ability;
use crate::data::catalog::JobCatalog;
use crate::error::FileError;

/// Normalize a string for lookup: lowercase, collapse spaces/underscores.
fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
        })
}

/// Deserialize a data file. `.yaml`/`.yml` files are read as YAML, anything
/// else as JSON.
pub fn read_data_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, FileError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if is_yaml(path) {
        serde_yaml::from_str(&raw).map_err(|source| FileError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&raw).map_err(|source| FileError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolve an ability by exact id first, then by normalized id or name.
pub fn resolve_ability<'a>(job: &'a JobCatalog, id_or_name: &str) -> Option<&'a Ability> {
    if let Some(ability) = job.abilities.iter().find(|a| a.id.as_str() == id_or_name) {
        return Some(ability);
    }
    let normalized = normalize_lookup(id_or_name);
    job.abilities.iter().find(|a| {
        normalize_lookup(a.id.as_str()) == normalized
            || (!a.name.is_empty() && normalize_lookup(&a.name) == normalized)
    })
}
