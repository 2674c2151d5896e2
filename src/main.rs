extern crate chrono;
extern crate reqwest;
extern crate uuid;

#[macro_use]
extern crate log;

mod configuration;
mod connection;
mod harness;
mod reporter;
mod suites;

use log::LevelFilter;
use signal_hook::{iterator::Signals, SIGINT};
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;
use std::thread;
use structopt::StructOpt;

use self::configuration::command_line::{LogLevel, Opt};
use self::configuration::constants::{common, defaults};
use self::connection::{Credentials, RemoteClient};
use self::harness::runner::SuiteRunner;
use self::harness::selector;

fn main() {
    let options = Opt::from_args();
    let signals = Signals::new(&[SIGINT]).unwrap();

    thread::spawn(move || {
        for sig in signals.forever() {
            info!("Received signal {:?}, stopping", sig);
            exit(0);
        }
    });

    init_logging(
        options.logging.unwrap_or(LogLevel::Info).into(),
        &options.log_output_file,
    );

    let catalog = suites::catalog(options.lang);
    let selection = match selector::resolve(catalog, &options.suites, &options.exclude_suites) {
        Ok(selection) => selection,
        Err(e) => exit_with_usage(&format!("{}", e)),
    };

    let credentials = Credentials::new(
        options
            .user
            .unwrap_or_else(|| defaults::ADMIN_USER.to_owned()),
        options
            .password
            .unwrap_or_else(|| defaults::ADMIN_PASSWORD.to_owned()),
    );
    let client = match RemoteClient::new(&options.server, options.port, credentials) {
        Ok(client) => Arc::new(client),
        Err(e) => exit_with_usage(&format!("Cannot initialize HTTP client: {}", e)),
    };

    let log_dir = Path::new(defaults::LOG_DIRECTORY);
    if let Err(e) = reporter::prepare_log_directory(log_dir) {
        exit_with_usage(&format!(
            "Cannot prepare report directory '{}': {}",
            defaults::LOG_DIRECTORY,
            e
        ));
    }

    let threads = options
        .threads
        .unwrap_or(1)
        .min(common::MAX_WORKER_THREADS);
    let runner = SuiteRunner::new(client, log_dir.to_path_buf(), options.console);
    let summary = runner.run(selection, threads);

    for suite in &summary.suites {
        info!(
            "Suite '{}': {} passed, {} failed, {} errored",
            suite.name,
            suite.passed(),
            suite.failed(),
            suite.errored()
        );
    }
    info!(
        "Overall: {} passed, {} failed, {} errored",
        summary.passed(),
        summary.failed(),
        summary.errored()
    );
}

fn exit_with_usage(message: &str) -> ! {
    eprintln!("{}", message);
    Opt::clap().print_help().ok();
    eprintln!();
    exit(1)
}

fn init_logging(level: LevelFilter, output: &Option<PathBuf>) {
    let mut dispatcher = fern::Dispatch::new()
        // Perform allocation-free log formatting
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}:{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record
                    .line()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "".to_owned()),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(log_file) = output {
        dispatcher = dispatcher.chain(fern::log_file(log_file).unwrap())
    }
    dispatcher.apply().unwrap();
    info!("Logging level {} enabled", level);
}
