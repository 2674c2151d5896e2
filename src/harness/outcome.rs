use crate::harness::case::CaseError;
use std::fmt;

/// Terminal state of an executed case. No retries; first fault wins.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    Failed(String),
    Errored(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed(_) => "FAILED",
            Outcome::Errored(_) => "ERRORED",
        }
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(detail) | Outcome::Errored(detail) => Some(detail.as_str()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.diagnostic() {
            Some(detail) => write!(f, "{}: {}", self.label(), detail),
            None => write!(f, "{}", self.label()),
        }
    }
}

impl From<CaseError> for Outcome {
    fn from(error: CaseError) -> Self {
        match error {
            CaseError::Assertion(detail) => Outcome::Failed(detail),
            CaseError::Execution(detail) => Outcome::Errored(detail),
        }
    }
}

/// Exactly one record exists per executed case, whatever happened to it.
#[derive(Debug, Clone)]
pub struct CaseRecord {
    pub case: String,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub struct SuiteSummary {
    pub name: String,
    pub tag: String,
    pub records: Vec<CaseRecord>,
}

impl SuiteSummary {
    pub fn new(name: String, tag: String, records: Vec<CaseRecord>) -> Self {
        Self { name, tag, records }
    }

    pub fn passed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Failed(_)))
    }

    pub fn errored(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Errored(_)))
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.records
            .iter()
            .filter(|record| predicate(&record.outcome))
            .count()
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub suites: Vec<SuiteSummary>,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.suites.iter().map(SuiteSummary::passed).sum()
    }

    pub fn failed(&self) -> usize {
        self.suites.iter().map(SuiteSummary::failed).sum()
    }

    pub fn errored(&self) -> usize {
        self.suites.iter().map(SuiteSummary::errored).sum()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_summary_counts_every_outcome_kind() {
        let summary = SuiteSummary::new(
            "Cache Test Suite".to_owned(),
            "cache".to_owned(),
            vec![
                CaseRecord {
                    case: "add".to_owned(),
                    outcome: Outcome::Passed,
                },
                CaseRecord {
                    case: "set".to_owned(),
                    outcome: Outcome::Failed("expected true, actual false".to_owned()),
                },
                CaseRecord {
                    case: "expiry".to_owned(),
                    outcome: Outcome::Errored("connection refused".to_owned()),
                },
                CaseRecord {
                    case: "delete".to_owned(),
                    outcome: Outcome::Passed,
                },
            ],
        );

        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.errored(), 1);
    }

    #[test]
    fn test_case_error_maps_to_matching_outcome() {
        let failed = Outcome::from(CaseError::Assertion("expected 200, actual 404".to_owned()));
        let errored = Outcome::from(CaseError::Execution("timed out".to_owned()));

        assert_eq!(failed.label(), "FAILED");
        assert_eq!(errored.label(), "ERRORED");
    }
}
