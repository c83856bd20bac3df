//! # Persistence
//!
//! Saves and loads the e-mail list and the recorded patterns as one JSON
//! document with the fields `emailList` and `soundPatterns`.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use crate::error::Result;
use crate::recorder::Pattern;

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    pub email_list: Vec<String>,
    pub sound_patterns: Vec<Pattern>,
}

/// Serializes the data to a JSON string.
pub fn to_json(data: &AppData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Deserializes data from a JSON string. Missing fields default to empty.
pub fn from_json(json: &str) -> Result<AppData> {
    Ok(serde_json::from_str(json)?)
}

/// Writes the data to `path`, creating parent directories as needed.
pub fn save(path: &Path, data: &AppData) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json_string = to_json(data)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    log::debug!(
        "Saved {} patterns and {} e-mails to {}",
        data.sound_patterns.len(),
        data.email_list.len(),
        path.display()
    );
    Ok(())
}

/// Reads the data from `path`. A missing file yields empty data.
pub fn load(path: &Path) -> Result<AppData> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No saved data at {}, starting empty", path.display());
            return Ok(AppData::default());
        }
        Err(e) => return Err(e.into()),
    };
    let mut data = String::new();
    file.read_to_string(&mut data)?;
    from_json(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_external_field_names() {
        let json = to_json(&AppData::default()).unwrap();
        assert!(json.contains("\"emailList\""));
        assert!(json.contains("\"soundPatterns\""));
    }

    #[test]
    fn missing_fields_default() {
        let data = from_json(r#"{"emailList":["a@b.c"]}"#).unwrap();
        assert_eq!(data.email_list, ["a@b.c"]);
        assert!(data.sound_patterns.is_empty());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let data = load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(data, AppData::default());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load(&path).is_err());
    }
}
