//! Loading migration units from JSON files.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::operation::MigrationUnit;

#[derive(Deserialize)]
#[serde(untagged)]
enum UnitFile {
    Many(Vec<MigrationUnit>),
    One(MigrationUnit),
}

impl From<UnitFile> for Vec<MigrationUnit> {
    fn from(file: UnitFile) -> Self {
        match file {
            UnitFile::Many(units) => units,
            UnitFile::One(unit) => vec![unit],
        }
    }
}

/// Parses one migration unit or a JSON array of them.
pub fn parse_units(json: &str) -> Result<Vec<MigrationUnit>> {
    let file: UnitFile = serde_json::from_str(json)?;
    Ok(file.into())
}

/// Reads and parses a migration unit file.
pub fn load_units(path: impl AsRef<Path>) -> Result<Vec<MigrationUnit>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let units = parse_units(&contents)?;
    debug!(path = %path.display(), units = units.len(), "Loaded migration units");
    Ok(units)
}
