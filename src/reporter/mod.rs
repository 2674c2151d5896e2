use crate::harness::outcome::{CaseRecord, SuiteSummary};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Consumes the single outcome stream produced by the runner. Multiple
/// sinks may be attached; none of them triggers re-execution.
pub trait ReportSink {
    fn record(&mut self, record: &CaseRecord);
    fn close(&mut self, summary: &SuiteSummary);
}

/// Creates the report directory if missing and clears file-type entries
/// left over from the previous run. Subdirectories are kept.
pub fn prepare_log_directory(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

/// Persistent per-suite report artifact, one line per case.
pub struct FileSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileSink {
    pub fn create(dir: &Path, tag: &str) -> io::Result<Self> {
        let path = dir.join(format!("{}.log", tag));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    fn write_line(&mut self, line: String) {
        if let Err(e) = writeln!(self.writer, "{}", line) {
            error!("Cannot write to report file {:?}: {}", self.path, e);
        }
    }
}

impl ReportSink for FileSink {
    fn record(&mut self, record: &CaseRecord) {
        self.write_line(format!("[{}] {}", record.outcome.label(), record.case));
        if let Some(detail) = record.outcome.diagnostic() {
            self.write_line(format!("    {}", detail));
        }
    }

    fn close(&mut self, summary: &SuiteSummary) {
        self.write_line(format!(
            "{}: {} passed, {} failed, {} errored",
            summary.name,
            summary.passed(),
            summary.failed(),
            summary.errored()
        ));
        if let Err(e) = self.writer.flush() {
            error!("Cannot flush report file {:?}: {}", self.path, e);
        }
    }
}

/// Interactive console stream, itemizing failures and errors as they
/// happen so a long run can be diagnosed without waiting for the files.
#[derive(Default)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn record(&mut self, record: &CaseRecord) {
        match record.outcome.diagnostic() {
            Some(detail) => error!(
                "[{}] {}: {}",
                record.outcome.label(),
                record.case,
                detail
            ),
            None => debug!("[{}] {}", record.outcome.label(), record.case),
        }
    }

    fn close(&mut self, summary: &SuiteSummary) {
        info!(
            "{}: {} passed, {} failed, {} errored",
            summary.name,
            summary.passed(),
            summary.failed(),
            summary.errored()
        );
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::harness::outcome::Outcome;
    use std::env;

    fn scratch_dir() -> PathBuf {
        let dir = env::temp_dir().join(format!("arbiter-report-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_sink_writes_case_lines_and_counts() {
        let dir = scratch_dir();
        let mut sink = FileSink::create(&dir, "memcache").unwrap();
        let records = vec![
            CaseRecord {
                case: "memcache_add".to_owned(),
                outcome: Outcome::Passed,
            },
            CaseRecord {
                case: "memcache_set".to_owned(),
                outcome: Outcome::Failed("stored value: expected \"v2\", actual \"v1\"".to_owned()),
            },
        ];
        for record in &records {
            sink.record(record);
        }
        sink.close(&SuiteSummary::new(
            "Memcache Test Suite".to_owned(),
            "memcache".to_owned(),
            records,
        ));

        let contents = fs::read_to_string(dir.join("memcache.log")).unwrap();
        assert!(contents.contains("[PASSED] memcache_add"));
        assert!(contents.contains("[FAILED] memcache_set"));
        assert!(contents.contains("expected \"v2\""));
        assert!(contents.contains("1 passed, 1 failed, 0 errored"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_prepare_clears_previous_run_files() {
        let dir = scratch_dir();
        fs::write(dir.join("stale.log"), "old run").unwrap();
        fs::create_dir_all(dir.join("archive")).unwrap();

        prepare_log_directory(&dir).unwrap();

        assert!(!dir.join("stale.log").exists());
        assert!(dir.join("archive").exists());

        fs::remove_dir_all(dir).unwrap();
    }
}
