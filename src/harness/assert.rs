use crate::connection::HttpResponse;
use crate::harness::case::CaseError;
use reqwest::StatusCode;
use std::fmt::Debug;

pub fn expect_status(response: &HttpResponse, expected: StatusCode) -> Result<(), CaseError> {
    if response.status() == expected {
        Ok(())
    } else {
        Err(CaseError::Assertion(format!(
            "status: expected {}, actual {}",
            expected,
            response.status()
        )))
    }
}

pub fn expect_eq<T>(actual: T, expected: T, what: &str) -> Result<(), CaseError>
where
    T: PartialEq + Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(CaseError::Assertion(format!(
            "{}: expected {:?}, actual {:?}",
            what, expected, actual
        )))
    }
}

pub fn expect_true(condition: bool, what: &str) -> Result<(), CaseError> {
    expect_eq(condition, true, what)
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_equal_values_pass() {
        assert!(expect_eq("foo", "foo", "stored value").is_ok());
    }

    #[test]
    fn test_mismatch_carries_expected_and_actual() {
        let result = expect_eq("bar", "foo", "stored value");

        match result {
            Err(CaseError::Assertion(detail)) => {
                assert!(detail.contains("expected \"foo\""));
                assert!(detail.contains("actual \"bar\""));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_boolean_helper_mirrors_expect_eq() {
        assert!(expect_true(true, "mutation status").is_ok());
        assert!(expect_true(false, "mutation status").is_err());
    }
}
