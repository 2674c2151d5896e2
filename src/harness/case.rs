use crate::connection::RemoteClient;
use std::fmt;

/// A single named test scenario. One invocation performs a sequence of
/// request/assert steps against the target server; the first failed
/// assertion or harness fault abandons the remaining steps.
pub trait TestCase: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, client: &RemoteClient) -> Result<(), CaseError>;
}

/// Distinguishes "the system under test behaved wrong" from "the harness
/// itself could not complete the step". The runner maps the former to a
/// Failed outcome and the latter to Errored.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseError {
    Assertion(String),
    Execution(String),
}

impl fmt::Display for CaseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CaseError::Assertion(detail) => write!(f, "assertion failed: {}", detail),
            CaseError::Execution(detail) => write!(f, "execution error: {}", detail),
        }
    }
}

impl ::std::error::Error for CaseError {}

impl From<reqwest::Error> for CaseError {
    fn from(error: reqwest::Error) -> Self {
        CaseError::Execution(format!("{}", error))
    }
}

impl From<serde_json::Error> for CaseError {
    fn from(error: serde_json::Error) -> Self {
        CaseError::Execution(format!("malformed response body: {}", error))
    }
}
