pub(crate) mod assert;
pub(crate) mod case;
pub(crate) mod outcome;
pub(crate) mod runner;
pub(crate) mod selector;

use crate::harness::case::TestCase;

/// A named, tagged, ordered collection of cases. Insertion order is
/// execution order; later cases must not rely on state left behind by
/// earlier ones beyond what they create themselves.
pub struct Suite {
    name: String,
    tag: String,
    cases: Vec<Box<dyn TestCase>>,
}

impl Suite {
    pub fn new(name: &str, tag: &str) -> Self {
        Self {
            name: name.to_owned(),
            tag: tag.to_owned(),
            cases: Vec::new(),
        }
    }

    pub fn add_case(&mut self, case: impl TestCase + 'static) {
        self.cases.push(Box::new(case));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn cases(&self) -> &[Box<dyn TestCase>] {
        &self.cases
    }

    pub fn case_names(&self) -> Vec<&str> {
        self.cases.iter().map(|case| case.name()).collect()
    }
}
