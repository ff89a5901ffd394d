//! `name[@version]` arguments given to `bru install`.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

use crate::core::catalog::{Catalog, FormulaSource};

/// A module requested on the command line, with an optional version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installable {
    pub module: String,
    pub version: Option<String>,
}

impl FromStr for Installable {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('@');
        let module = parts.next().unwrap_or_default();
        let version = parts.next();
        if parts.next().is_some() || module.is_empty() || version.is_some_and(str::is_empty) {
            bail!("expected module or module@version but got `{}`", s);
        }
        Ok(Installable {
            module: module.to_string(),
            version: version.map(str::to_string),
        })
    }
}

impl fmt::Display for Installable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.module, v),
            None => f.write_str(&self.module),
        }
    }
}

impl Installable {
    /// Pin the version against the catalog: the latest one when none was
    /// given. Fails when the module or version is not in the catalog.
    pub fn resolve(&self, catalog: &Catalog) -> Result<(String, String)> {
        let version = match &self.version {
            Some(v) => v.clone(),
            None => catalog.latest_version(&self.module)?,
        };
        // Loading validates both the module and the version.
        catalog.load_formula(&self.module, &version)?;
        Ok((self.module.clone(), version))
    }
}
