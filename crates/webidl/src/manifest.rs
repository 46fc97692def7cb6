//! Dependency manifest for build systems.
//!
//! The manifest maps every definition name to the sorted source files it
//! depends on. A build system compares it between runs to decide which
//! generated bindings are stale.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::Serialize;

use webidl_parser::Definitions;

use crate::WebIdlError;

/// File name the manifest is written under inside the cache directory.
pub const MANIFEST_FILE: &str = "dependencies.toml";

#[derive(Debug, Default, Serialize)]
pub struct DependencyManifest {
    #[serde(flatten)]
    definitions: BTreeMap<String, Vec<String>>,
}

impl DependencyManifest {
    pub fn from_definitions(definitions: &Definitions) -> Self {
        let definitions = definitions
            .iter()
            .map(|(id, definition)| {
                let files = definitions.dependencies(id).into_iter().collect();
                (definition.name().as_string(), files)
            })
            .collect();
        Self { definitions }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Files the named definition depends on.
    pub fn files(&self, name: &str) -> Option<&[String]> {
        self.definitions.get(name).map(Vec::as_slice)
    }

    pub fn to_toml(&self) -> Result<String, WebIdlError> {
        Ok(toml::to_string(self)?)
    }

    /// Write the manifest into `dir`, creating the directory if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, WebIdlError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(MANIFEST_FILE);
        debug!(path = path.display().to_string(), definitions = self.len(); "Writing dependency manifest");
        fs::write(&path, self.to_toml()?)?;
        info!(path = path.display().to_string(); "Dependency manifest written");
        Ok(path)
    }
}
