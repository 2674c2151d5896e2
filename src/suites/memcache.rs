//! Cache API conformance cases. Every case generates its own keys so
//! concurrently running cases never collide through the shared remote
//! store. The asynchronous variants and the secondary JCache API exist
//! only in the Java binding and are appended at catalog-build time.

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

const CACHE_PATH: &'static str = "/memcache";
const MULTI_PATH: &'static str = "/memcache/multi";
const JCACHE_PATH: &'static str = "/memcache/jcache";

const EXPIRY_TIMEOUT_SECS: u64 = 6;
// Strictly longer than the entry timeout under test.
const EXPIRY_WAIT: Duration = Duration::from_secs(8);

#[derive(Debug, Deserialize)]
struct OperationStatus {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct CachedValue {
    value: String,
}

fn unique() -> String {
    Uuid::new_v4().to_string()
}

fn with_async<'a>(
    mut params: Vec<(&'a str, &'a str)>,
    run_async: bool,
) -> Vec<(&'a str, &'a str)> {
    if run_async {
        params.push(("async", "true"));
    }
    params
}

fn store(
    client: &RemoteClient,
    key: &str,
    value: &str,
    update: bool,
    timeout: Option<u64>,
    run_async: bool,
    should_succeed: bool,
) -> Result<(), CaseError> {
    let timeout_value = timeout.map(|secs| secs.to_string());
    let mut params = vec![("key", key), ("value", value)];
    if update {
        params.push(("update", "true"));
    }
    if let Some(ref secs) = timeout_value {
        params.push(("timeout", secs.as_str()));
    }
    let response = client.post_form(CACHE_PATH, &with_async(params, run_async))?;
    expect_status(&response, StatusCode::OK)?;
    let info: OperationStatus = response.json()?;
    expect_eq(info.success, should_succeed, "mutation status")
}

fn read_value(
    client: &RemoteClient,
    key: &str,
    run_async: bool,
    expected: &str,
) -> Result<(), CaseError> {
    let response = client.get(CACHE_PATH, &with_async(vec![("key", key)], run_async))?;
    expect_status(&response, StatusCode::OK)?;
    let entry: CachedValue = response.json()?;
    expect_eq(entry.value.as_str(), expected, "stored value")
}

fn read_missing(client: &RemoteClient, key: &str, run_async: bool) -> Result<(), CaseError> {
    let response = client.get(CACHE_PATH, &with_async(vec![("key", key)], run_async))?;
    expect_status(&response, StatusCode::NOT_FOUND)
}

fn remove(client: &RemoteClient, key: &str, run_async: bool) -> Result<(), CaseError> {
    let response = client.delete(CACHE_PATH, &with_async(vec![("key", key)], run_async))?;
    expect_status(&response, StatusCode::OK)?;
    let info: OperationStatus = response.json()?;
    expect_true(info.success, "delete status")
}

fn store_multi(
    client: &RemoteClient,
    keys: &str,
    values: &str,
    update: bool,
    run_async: bool,
    should_succeed: bool,
) -> Result<(), CaseError> {
    let mut params = vec![("keys", keys), ("values", values)];
    if update {
        params.push(("update", "true"));
    }
    let response = client.post_form(MULTI_PATH, &with_async(params, run_async))?;
    expect_status(&response, StatusCode::OK)?;
    let info: OperationStatus = response.json()?;
    expect_eq(info.success, should_succeed, "multi mutation status")
}

fn read_multi(
    client: &RemoteClient,
    keys: &str,
    run_async: bool,
) -> Result<HashMap<String, String>, CaseError> {
    let response = client.get(MULTI_PATH, &with_async(vec![("keys", keys)], run_async))?;
    expect_status(&response, StatusCode::OK)?;
    response.json().map_err(CaseError::from)
}

fn remove_multi(client: &RemoteClient, keys: &str, run_async: bool) -> Result<(), CaseError> {
    let response = client.delete(MULTI_PATH, &with_async(vec![("keys", keys)], run_async))?;
    expect_status(&response, StatusCode::OK)?;
    let info: OperationStatus = response.json()?;
    expect_true(info.success, "multi delete status")
}

/// Add is create-only: a second add with the same key must be refused
/// and must leave the first value intact.
struct AddEntry {
    name: &'static str,
    run_async: bool,
}

impl AddEntry {
    fn new(run_async: bool) -> Self {
        Self {
            name: if run_async {
                "memcache_async_add"
            } else {
                "memcache_add"
            },
            run_async,
        }
    }
}

impl TestCase for AddEntry {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = unique();
        let value = unique();
        store(client, &key, &value, false, None, self.run_async, true)?;
        read_value(client, &key, self.run_async, &value)?;
        store(client, &key, "foo", false, None, self.run_async, false)?;
        read_value(client, &key, self.run_async, &value)
    }
}

/// Set is an upsert: repeated sets with the update flag always succeed
/// and the last written value wins.
struct SetEntry {
    name: &'static str,
    run_async: bool,
}

impl SetEntry {
    fn new(run_async: bool) -> Self {
        Self {
            name: if run_async {
                "memcache_async_set"
            } else {
                "memcache_set"
            },
            run_async,
        }
    }
}

impl TestCase for SetEntry {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = unique();
        let value = unique();
        store(client, &key, &value, true, None, self.run_async, true)?;
        read_value(client, &key, self.run_async, &value)?;
        store(client, &key, "foo", true, None, self.run_async, true)?;
        read_value(client, &key, self.run_async, "foo")
    }
}

/// An entry stored with a short timeout is readable immediately and
/// gone once the timeout has elapsed.
struct KeyExpiry {
    name: &'static str,
    run_async: bool,
}

impl KeyExpiry {
    fn new(run_async: bool) -> Self {
        Self {
            name: if run_async {
                "memcache_async_key_expiry"
            } else {
                "memcache_key_expiry"
            },
            run_async,
        }
    }
}

impl TestCase for KeyExpiry {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = unique();
        let value = unique();
        store(
            client,
            &key,
            &value,
            false,
            Some(EXPIRY_TIMEOUT_SECS),
            self.run_async,
            true,
        )?;
        read_value(client, &key, self.run_async, &value)?;
        sleep(EXPIRY_WAIT);
        read_missing(client, &key, self.run_async)
    }
}

struct DeleteEntry {
    name: &'static str,
    run_async: bool,
}

impl DeleteEntry {
    fn new(run_async: bool) -> Self {
        Self {
            name: if run_async {
                "memcache_async_delete"
            } else {
                "memcache_delete"
            },
            run_async,
        }
    }
}

impl TestCase for DeleteEntry {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = unique();
        let value = unique();
        store(client, &key, &value, false, None, self.run_async, true)?;
        read_value(client, &key, self.run_async, &value)?;
        remove(client, &key, self.run_async)?;
        read_missing(client, &key, self.run_async)
    }
}

struct MultiAdd {
    name: &'static str,
    run_async: bool,
}

impl MultiAdd {
    fn new(run_async: bool) -> Self {
        Self {
            name: if run_async {
                "memcache_multi_async_add"
            } else {
                "memcache_multi_add"
            },
            run_async,
        }
    }
}

impl TestCase for MultiAdd {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let (key1, key2) = (unique(), unique());
        let (value1, value2) = (unique(), unique());
        let keys = format!("{},{}", key1, key2);
        let values = format!("{},{}", value1, value2);
        store_multi(client, &keys, &values, false, self.run_async, true)?;

        let entries = read_multi(client, &keys, self.run_async)?;
        expect_eq(
            entries.get(&key1).map(String::as_str),
            Some(value1.as_str()),
            "first stored value",
        )?;
        expect_eq(
            entries.get(&key2).map(String::as_str),
            Some(value2.as_str()),
            "second stored value",
        )?;

        store_multi(client, &keys, "foo,bar", false, self.run_async, false)?;

        let entries = read_multi(client, &keys, self.run_async)?;
        expect_eq(
            entries.get(&key1).map(String::as_str),
            Some(value1.as_str()),
            "first stored value",
        )?;
        expect_eq(
            entries.get(&key2).map(String::as_str),
            Some(value2.as_str()),
            "second stored value",
        )
    }
}

struct MultiSet {
    name: &'static str,
    run_async: bool,
}

impl MultiSet {
    fn new(run_async: bool) -> Self {
        Self {
            name: if run_async {
                "memcache_multi_async_set"
            } else {
                "memcache_multi_set"
            },
            run_async,
        }
    }
}

impl TestCase for MultiSet {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let (key1, key2) = (unique(), unique());
        let (value1, value2) = (unique(), unique());
        let keys = format!("{},{}", key1, key2);
        let values = format!("{},{}", value1, value2);
        store_multi(client, &keys, &values, true, self.run_async, true)?;

        let entries = read_multi(client, &keys, self.run_async)?;
        expect_eq(
            entries.get(&key1).map(String::as_str),
            Some(value1.as_str()),
            "first stored value",
        )?;
        expect_eq(
            entries.get(&key2).map(String::as_str),
            Some(value2.as_str()),
            "second stored value",
        )?;

        store_multi(client, &keys, "foo,bar", true, self.run_async, true)?;

        let entries = read_multi(client, &keys, self.run_async)?;
        expect_eq(
            entries.get(&key1).map(String::as_str),
            Some("foo"),
            "first stored value",
        )?;
        expect_eq(
            entries.get(&key2).map(String::as_str),
            Some("bar"),
            "second stored value",
        )
    }
}

struct MultiDelete {
    name: &'static str,
    run_async: bool,
}

impl MultiDelete {
    fn new(run_async: bool) -> Self {
        Self {
            name: if run_async {
                "memcache_multi_async_delete"
            } else {
                "memcache_multi_delete"
            },
            run_async,
        }
    }
}

impl TestCase for MultiDelete {
    fn name(&self) -> &str {
        self.name
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let (key1, key2) = (unique(), unique());
        let (value1, value2) = (unique(), unique());
        let keys = format!("{},{}", key1, key2);
        let values = format!("{},{}", value1, value2);
        store_multi(client, &keys, &values, false, self.run_async, true)?;

        let entries = read_multi(client, &keys, self.run_async)?;
        expect_eq(
            entries.get(&key1).map(String::as_str),
            Some(value1.as_str()),
            "first stored value",
        )?;
        expect_eq(
            entries.get(&key2).map(String::as_str),
            Some(value2.as_str()),
            "second stored value",
        )?;

        remove_multi(client, &keys, self.run_async)?;

        let entries = read_multi(client, &keys, self.run_async)?;
        expect_eq(entries.len(), 0, "remaining entries")
    }
}

fn store_jcache(
    client: &RemoteClient,
    key: &str,
    value: &str,
    cache: &str,
) -> Result<(), CaseError> {
    let response = client.post_form(JCACHE_PATH, &[("key", key), ("value", value), ("cache", cache)])?;
    expect_status(&response, StatusCode::OK)?;
    let info: OperationStatus = response.json()?;
    expect_true(info.success, "jcache mutation status")
}

fn read_jcache(
    client: &RemoteClient,
    key: &str,
    cache: &str,
    expected: &str,
) -> Result<(), CaseError> {
    let response = client.get(JCACHE_PATH, &[("key", key), ("cache", cache)])?;
    expect_status(&response, StatusCode::OK)?;
    let entries: HashMap<String, String> = response.json()?;
    expect_eq(
        entries.get(key).map(String::as_str),
        Some(expected),
        "jcache stored value",
    )
}

/// Secondary caching API: put, get, miss on a bogus key, delete returns
/// the removed entry, second delete misses.
struct SimpleJCache;

impl TestCase for SimpleJCache {
    fn name(&self) -> &str {
        "jcache_simple"
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = unique();
        let value = unique();
        store_jcache(client, &key, &value, "simple")?;
        read_jcache(client, &key, "simple", &value)?;

        let response = client.get(JCACHE_PATH, &[("key", "bogus"), ("cache", "simple")])?;
        expect_status(&response, StatusCode::NOT_FOUND)?;

        let response = client.delete(JCACHE_PATH, &[("key", &key), ("cache", "simple")])?;
        expect_status(&response, StatusCode::OK)?;
        let entries: HashMap<String, String> = response.json()?;
        expect_eq(
            entries.get(&key).map(String::as_str),
            Some(value.as_str()),
            "removed entry",
        )?;

        let response = client.delete(JCACHE_PATH, &[("key", &key), ("cache", "simple")])?;
        expect_status(&response, StatusCode::NOT_FOUND)
    }
}

struct JCacheExpiry;

impl TestCase for JCacheExpiry {
    fn name(&self) -> &str {
        "jcache_expiry"
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = unique();
        let value = unique();
        store_jcache(client, &key, &value, "expiring")?;
        read_jcache(client, &key, "expiring", &value)?;
        sleep(EXPIRY_WAIT);
        let response = client.get(JCACHE_PATH, &[("key", &key), ("cache", "expiring")])?;
        expect_status(&response, StatusCode::NOT_FOUND)
    }
}

/// The add-only cache accepts a second put for the same key but keeps
/// the original value.
struct JCacheAddPolicy;

impl TestCase for JCacheAddPolicy {
    fn name(&self) -> &str {
        "jcache_add_policy"
    }

    fn run(&self, client: &RemoteClient) -> Result<(), CaseError> {
        let key = unique();
        let value = unique();
        store_jcache(client, &key, &value, "noupdate")?;
        read_jcache(client, &key, "noupdate", &value)?;
        store_jcache(client, &key, "foo", "noupdate")?;
        read_jcache(client, &key, "noupdate", &value)
    }
}

pub fn suite(binding: Binding) -> Suite {
    let mut suite = Suite::new("Memcache Test Suite", "memcache");
    suite.add_case(AddEntry::new(false));
    suite.add_case(SetEntry::new(false));
    suite.add_case(KeyExpiry::new(false));
    suite.add_case(DeleteEntry::new(false));
    suite.add_case(MultiAdd::new(false));
    suite.add_case(MultiSet::new(false));
    suite.add_case(MultiDelete::new(false));

    if binding == Binding::Java {
        suite.add_case(AddEntry::new(true));
        suite.add_case(SetEntry::new(true));
        suite.add_case(KeyExpiry::new(true));
        suite.add_case(DeleteEntry::new(true));
        suite.add_case(MultiAdd::new(true));
        suite.add_case(MultiSet::new(true));
        suite.add_case(MultiDelete::new(true));
        suite.add_case(SimpleJCache);
        suite.add_case(JCacheExpiry);
        suite.add_case(JCacheAddPolicy);
    }
    suite
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_python_suite_carries_only_shared_cases() {
        let suite = suite(Binding::Python);
        let names = suite.case_names();

        assert_eq!(names.len(), 7);
        assert!(names.contains(&"memcache_add"));
        assert!(!names.iter().any(|name| name.contains("async")));
        assert!(!names.iter().any(|name| name.starts_with("jcache")));
    }

    #[test]
    fn test_java_suite_adds_async_and_jcache_cases() {
        let suite = suite(Binding::Java);
        let names = suite.case_names();

        assert_eq!(names.len(), 17);
        assert!(names.contains(&"memcache_async_add"));
        assert!(names.contains(&"memcache_multi_async_delete"));
        assert!(names.contains(&"jcache_simple"));
        assert!(names.contains(&"jcache_add_policy"));
    }

    #[test]
    fn test_shared_cases_keep_their_order_across_bindings() {
        let python: Vec<String> = suite(Binding::Python)
            .case_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let java: Vec<String> = suite(Binding::Java)
            .case_names()
            .iter()
            .take(python.len())
            .map(|name| name.to_string())
            .collect();

        assert_eq!(python, java);
    }
}
