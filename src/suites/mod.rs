pub(crate) mod memcache;
pub(crate) mod taskqueue;

use crate::configuration::command_line::Binding;
use crate::harness::Suite;
use std::collections::BTreeMap;

/// Builds the full catalog of available suites for the given binding,
/// keyed by suite tag. Pure: no network activity happens here, and the
/// same binding always yields the same catalog.
pub fn catalog(binding: Binding) -> BTreeMap<String, Suite> {
    let mut suites = BTreeMap::new();
    for suite in vec![memcache::suite(binding), taskqueue::suite(binding)] {
        suites.insert(suite.tag().to_owned(), suite);
    }
    suites
}
