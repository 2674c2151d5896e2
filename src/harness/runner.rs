use crate::connection::RemoteClient;
use crate::harness::case::TestCase;
use crate::harness::outcome::{CaseRecord, Outcome, RunSummary, SuiteSummary};
use crate::harness::Suite;
use crate::reporter::{ConsoleSink, FileSink, ReportSink};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

macro_rules! lock {
    ($name: expr) => {
        match $name.lock() {
            Ok(locked) => locked,
            Err(e) => panic!("{:#?}", e),
        }
    };
}

/// Executes suites case by case, isolating each case's fault so one
/// broken scenario never aborts its siblings. Case lifecycle is
/// NotRun -> Running -> Passed | Failed | Errored, with the terminal
/// state recorded exactly once.
#[derive(Clone)]
pub struct SuiteRunner {
    client: Arc<RemoteClient>,
    log_dir: PathBuf,
    console: bool,
}

impl SuiteRunner {
    pub fn new(client: Arc<RemoteClient>, log_dir: PathBuf, console: bool) -> Self {
        Self {
            client,
            log_dir,
            console,
        }
    }

    /// Runs every selected suite, spreading independent suites over a
    /// bounded pool of worker threads. Suspension inside a time-sensitive
    /// case stalls only the worker running it.
    pub fn run(&self, suites: Vec<Suite>, threads: usize) -> RunSummary {
        let workers = threads.max(1).min(suites.len().max(1));
        if workers == 1 {
            let summaries = suites.iter().map(|suite| self.run_suite(suite)).collect();
            return RunSummary { suites: summaries };
        }

        let queue: Arc<Mutex<VecDeque<(usize, Suite)>>> =
            Arc::new(Mutex::new(suites.into_iter().enumerate().collect()));
        let (tx, rx) = mpsc::channel();
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let runner = self.clone();
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            handles.push(thread::spawn(move || loop {
                let next = lock!(queue).pop_front();
                match next {
                    Some((index, suite)) => {
                        let summary = runner.run_suite(&suite);
                        if tx.send((index, summary)).is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }));
        }
        drop(tx);

        let mut summaries: Vec<(usize, SuiteSummary)> = rx.iter().collect();
        for handle in handles {
            if handle.join().is_err() {
                error!("Worker thread terminated abnormally");
            }
        }
        summaries.sort_by_key(|(index, _)| *index);
        RunSummary {
            suites: summaries.into_iter().map(|(_, summary)| summary).collect(),
        }
    }

    pub fn run_suite(&self, suite: &Suite) -> SuiteSummary {
        info!(
            "Starting suite '{}' with {} cases",
            suite.name(),
            suite.cases().len()
        );
        debug!("Suite '{}' cases: {:?}", suite.tag(), suite.case_names());
        let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();
        match FileSink::create(&self.log_dir, suite.tag()) {
            Ok(sink) => sinks.push(Box::new(sink)),
            Err(e) => error!("Cannot create report file for '{}': {}", suite.tag(), e),
        }
        if self.console {
            sinks.push(Box::new(ConsoleSink::default()));
        }

        let mut records = Vec::with_capacity(suite.cases().len());
        for case in suite.cases() {
            let record = CaseRecord {
                case: case.name().to_owned(),
                outcome: self.run_case(case.as_ref()),
            };
            for sink in sinks.iter_mut() {
                sink.record(&record);
            }
            records.push(record);
        }

        let summary = SuiteSummary::new(suite.name().to_owned(), suite.tag().to_owned(), records);
        for sink in sinks.iter_mut() {
            sink.close(&summary);
        }
        summary
    }

    fn run_case(&self, case: &dyn TestCase) -> Outcome {
        debug!("Running case '{}'", case.name());
        let now = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| case.run(&self.client)));
        debug!(
            "Elapsed for execution of case '{}': {} ms",
            case.name(),
            now.elapsed().as_millis()
        );
        match result {
            Ok(Ok(())) => Outcome::Passed,
            Ok(Err(error)) => Outcome::from(error),
            Err(payload) => Outcome::Errored(describe_panic(payload)),
        }
    }
}

fn describe_panic(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("case panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("case panicked: {}", message)
    } else {
        "case panicked".to_owned()
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::connection::Credentials;
    use crate::harness::case::CaseError;
    use std::env;
    use std::fs;

    struct Passes(&'static str);

    impl TestCase for Passes {
        fn name(&self) -> &str {
            self.0
        }
        fn run(&self, _client: &RemoteClient) -> Result<(), CaseError> {
            Ok(())
        }
    }

    struct Fails;

    impl TestCase for Fails {
        fn name(&self) -> &str {
            "always_fails"
        }
        fn run(&self, _client: &RemoteClient) -> Result<(), CaseError> {
            Err(CaseError::Assertion(
                "stored value: expected \"v1\", actual \"v2\"".to_owned(),
            ))
        }
    }

    struct Faults;

    impl TestCase for Faults {
        fn name(&self) -> &str {
            "always_faults"
        }
        fn run(&self, _client: &RemoteClient) -> Result<(), CaseError> {
            Err(CaseError::Execution("connection refused".to_owned()))
        }
    }

    struct Panics;

    impl TestCase for Panics {
        fn name(&self) -> &str {
            "always_panics"
        }
        fn run(&self, _client: &RemoteClient) -> Result<(), CaseError> {
            panic!("boom")
        }
    }

    fn runner(dir: &std::path::Path) -> SuiteRunner {
        let client = RemoteClient::new("localhost", 1, Credentials::default()).unwrap();
        SuiteRunner::new(Arc::new(client), dir.to_path_buf(), false)
    }

    fn scratch_dir() -> PathBuf {
        let dir = env::temp_dir().join(format!("arbiter-runner-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_one_case_fault_never_aborts_siblings() {
        let dir = scratch_dir();
        let mut suite = Suite::new("Mixed Suite", "mixed");
        suite.add_case(Fails);
        suite.add_case(Passes("first_pass"));
        suite.add_case(Panics);
        suite.add_case(Faults);
        suite.add_case(Passes("second_pass"));

        let summary = runner(&dir).run_suite(&suite);

        assert_eq!(summary.records.len(), 5);
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.errored(), 2);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_records_keep_suite_order_and_names() {
        let dir = scratch_dir();
        let mut suite = Suite::new("Ordered Suite", "ordered");
        suite.add_case(Passes("one"));
        suite.add_case(Fails);
        suite.add_case(Passes("two"));

        let summary = runner(&dir).run_suite(&suite);
        let names: Vec<&str> = summary
            .records
            .iter()
            .map(|record| record.case.as_str())
            .collect();

        assert_eq!(names, vec!["one", "always_fails", "two"]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_panic_is_recorded_as_errored_with_message() {
        let dir = scratch_dir();
        let mut suite = Suite::new("Panic Suite", "panic");
        suite.add_case(Panics);

        let summary = runner(&dir).run_suite(&suite);

        match &summary.records[0].outcome {
            Outcome::Errored(detail) => assert!(detail.contains("boom")),
            other => panic!("unexpected outcome {:?}", other),
        }
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_parallel_run_attributes_summaries_in_order() {
        let dir = scratch_dir();
        let mut first = Suite::new("First Suite", "first");
        first.add_case(Passes("a"));
        let mut second = Suite::new("Second Suite", "second");
        second.add_case(Fails);
        let mut third = Suite::new("Third Suite", "third");
        third.add_case(Passes("b"));

        let summary = runner(&dir).run(vec![first, second, third], 2);
        let tags: Vec<&str> = summary
            .suites
            .iter()
            .map(|suite| suite.tag.as_str())
            .collect();

        assert_eq!(tags, vec!["first", "second", "third"]);
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failed(), 1);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_sequential_run_covers_every_suite() {
        let dir = scratch_dir();
        let mut first = Suite::new("First Suite", "first");
        first.add_case(Passes("a"));
        let mut second = Suite::new("Second Suite", "second");
        second.add_case(Faults);

        let summary = runner(&dir).run(vec![first, second], 1);

        assert_eq!(summary.suites.len(), 2);
        assert_eq!(summary.errored(), 1);
        fs::remove_dir_all(dir).unwrap();
    }
}
