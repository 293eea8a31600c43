use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::common::data::FixtureDefinition;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read fixture file: {0}")]
    FileReadError(std::io::Error),
    #[error("cannot deserialize fixture file: {0}")]
    DeserializationError(serde_json::Error),
}

/// Reads the fixture catalog from a JSON file: a single array of fixture
/// definitions. The caller decides what a failure means; at startup it is
/// logged and the server runs with an empty store.
pub fn read_fixture_definitions(path: PathBuf) -> Result<Vec<FixtureDefinition>, Error> {
    tracing::info!("Loading fixture file from '{}'", path.to_string_lossy());

    let content = fs::read(&path).map_err(Error::FileReadError)?;
    let definitions: Vec<FixtureDefinition> =
        serde_json::from_slice(&content).map_err(Error::DeserializationError)?;

    Ok(definitions)
}
