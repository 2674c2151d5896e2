//! Task queue conformance cases. A queued task hits the counter worker
//! endpoint, which records one processed delivery per key; the harness
//! polls the counter after giving the queue time to deliver.

use crate::configuration::command_line::Binding;
use crate::connection::RemoteClient;
use crate::harness::assert::{expect_eq, expect_status, expect_true};
use crate::harness::case::{CaseError, TestCase};
use crate::harness::Suite;
use reqwest::StatusCode;
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;
use uuid::Uuid;

const EXEC_PATH: &'static str = "/taskqueue/exec";
const COUNTER_PATH: &'static str = "/taskqueue/counter";

const DELIVERY_WAIT: Duration = Duration::from_secs(6);
// The first delivery of a retrying task fails on purpose, so the queue
// needs one extra redelivery interval.
const REDELIVERY_WAIT: Duration = Duration::from_secs(12);

#[derive(Debug, Deserialize)]
struct OperationStatus {
    success: bool,
}

fn enqueue(client: &RemoteClient, key: &str, retry: bool) -> Result<(), CaseError> {
    let mut params = vec![("key", key)];
    if retry {
        params.push(("retry", "true"));
    }
    let response = client.post_form(EXEC_PATH, &params)?;
    expect_status(&response, StatusCode::OK)?;
    let info: OperationStatus = response.json()?;
    expect_true(info.success, "enqueue status")
}

fn expect_count(client: &RemoteClient, key: &str, expected: i64) -> Result<(), CaseError> {
    let response = client.get(COUNTER_PATH, &[("key", key)])?;
    expect_status(&response, StatusCode::OK)?;
    let counters: HashMap<String, i64> = response.json()?;
    expect_eq(counters.get(key).copied(), Some(expected), "processed count")
}

/// A queued task is delivered to the worker exactly once.
struct CounterTask;

impl TestCase for CounterTask {
    fn name(&self) -> &str {
        "taskqueue_counter"
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = Uuid::new_v4().to_string();
        enqueue(client, &key, false)?;
        sleep(DELIVERY_WAIT);
        expect_count(client, &key, 1)
    }
}

/// The worker rejects the first delivery of a retrying task; the queue
/// must redeliver it until it is processed once.
struct RetryTask;

impl TestCase for RetryTask {
    fn name(&self) -> &str {
        "taskqueue_retry"
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = Uuid::new_v4().to_string();
        enqueue(client, &key, true)?;
        sleep(REDELIVERY_WAIT);
        expect_count(client, &key, 1)
    }
}

pub fn suite(_binding: Binding) -> Suite {
    let mut suite = Suite::new("Task Queue Test Suite", "taskqueue");
    suite.add_case(CounterTask);
    suite.add_case(RetryTask);
    suite
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_suite_is_binding_independent() {
        let python = suite(Binding::Python);
        let java = suite(Binding::Java);

        assert_eq!(python.case_names(), java.case_names());
        assert_eq!(python.case_names(), vec!["taskqueue_counter", "taskqueue_retry"]);
    }
}
