use crate::configuration::constants::cargo_env::CARGO_PKG_NAME;
use clap::arg_enum;
use log::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

arg_enum! {
    #[derive(Debug)]
    pub enum LogLevel {
        Off, Error, Warn, Info, Debug, Trace,
    }
}

arg_enum! {
    /// Language binding of the application server under test.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Binding {
        Python, Java,
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = CARGO_PKG_NAME)]
pub struct Opt {
    /// Hostname of the target application server
    #[structopt(long, short = "s")]
    pub server: String,

    /// Port of the target application server
    #[structopt(long, short = "p")]
    pub port: u16,

    /// Language binding to test
    #[structopt(case_insensitive = true, long, short = "l", possible_values = &Binding::variants(), default_value = "python")]
    pub lang: Binding,

    /// Admin username
    #[structopt(long)]
    pub user: Option<String>,

    /// Admin password
    #[structopt(long = "pass")]
    pub password: Option<String>,

    /// Report failures and errors to the console
    #[structopt(long, short = "c")]
    pub console: bool,

    /// A comma separated list of suites to run
    #[structopt(long, use_delimiter = true, default_value = "all")]
    pub suites: Vec<String>,

    /// A comma separated list of suites to exclude
    #[structopt(long = "exclude-suites", use_delimiter = true)]
    pub exclude_suites: Vec<String>,

    /// Amount of parallel threads running independent suites
    #[structopt(long, short = "t")]
    pub threads: Option<usize>,

    /// Sets a logging level
    #[structopt(case_insensitive = true, long, short = "L", possible_values = &LogLevel::variants(), env = "LOG_LEVEL")]
    pub logging: Option<LogLevel>,

    /// File to which application will write logs
    #[structopt(long, short = "O", env = "LOG_OUTPUT_FILE")]
    pub log_output_file: Option<PathBuf>,
}

impl Into<LevelFilter> for LogLevel {
    fn into(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}
