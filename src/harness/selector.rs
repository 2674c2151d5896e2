use crate::harness::Suite;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Literal request token selecting every suite in the catalog.
pub const ALL_SUITES: &'static str = "all";

/// Fatal configuration faults, raised before any network activity.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    UnknownSuite(String),
    EmptySelection,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::UnknownSuite(name) => write!(f, "Unsupported test suite: {}", name),
            ConfigError::EmptySelection => {
                write!(f, "Must specify at least one suite to execute")
            }
        }
    }
}

impl ::std::error::Error for ConfigError {}

/// Resolves requested and excluded suite names against the full catalog.
/// Exclusion applies after inclusion; a name absent from the entire
/// catalog is rejected whether it appears on either list. The resolved
/// suites come back in catalog order.
pub fn resolve(
    catalog: BTreeMap<String, Suite>,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<Suite>, ConfigError> {
    let known: BTreeSet<&str> = catalog.keys().map(String::as_str).collect();
    let mut chosen: BTreeSet<String> = BTreeSet::new();
    let mut take_all = false;

    for name in include {
        let name = name.trim();
        if name == ALL_SUITES {
            take_all = true;
        } else if known.contains(name) {
            chosen.insert(name.to_owned());
        } else {
            return Err(ConfigError::UnknownSuite(name.to_owned()));
        }
    }
    if take_all {
        chosen = known.iter().map(|tag| (*tag).to_owned()).collect();
    }

    for name in exclude {
        let name = name.trim();
        if !known.contains(name) {
            return Err(ConfigError::UnknownSuite(name.to_owned()));
        }
        chosen.remove(name);
    }

    if chosen.is_empty() {
        return Err(ConfigError::EmptySelection);
    }

    Ok(catalog
        .into_iter()
        .filter(|(tag, _)| chosen.contains(tag))
        .map(|(_, suite)| suite)
        .collect())
}
