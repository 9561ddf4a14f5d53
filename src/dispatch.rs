// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The command-line surface and the run orchestrator.

use crate::{
    cases::{sample_test_list, RegistryExecutor},
    errors::{exit_codes, ConfigError, RunTestError, WriteReportError},
    output::{Color, OutputOpts, OutputWriter},
    reporter::{ReporterKind, ReporterOpts},
    runner::{
        ProcessExecutor, RunnerExecuteError, RunnerKind, RunnerOpts, TestExecutor,
    },
    selection::SelectionCriteria,
    test_list::{expand_test_args, Priority, TestId, TestStatus},
};
use camino::Utf8PathBuf;
use clap::Parser;
use std::fs;
use tracing::{debug, warn};

/// The `runtest` command line.
#[derive(Debug, Parser)]
#[command(
    name = "runtest",
    version,
    about = "Select and execute test cases, with pluggable runner strategies and report sinks"
)]
pub struct Opts {
    /// Test identifiers to run, or @file references listing them
    #[arg(value_name = "TESTS", required_unless_present = "run_worker")]
    pub tests: Vec<String>,

    /// Only run tests with this status (repeatable)
    #[arg(long = "status", value_enum, value_name = "STATUS")]
    pub statuses: Vec<TestStatus>,

    /// Only run tests with this priority (repeatable)
    #[arg(long = "priority", value_enum, value_name = "PRIORITY")]
    pub priorities: Vec<Priority>,

    /// Only run tests carrying this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Never run tests carrying this tag (repeatable)
    #[arg(long = "excluded-tag", value_name = "TAG")]
    pub excluded_tags: Vec<String>,

    /// Only run tests with this owner (repeatable)
    #[arg(long = "owner", value_name = "OWNER")]
    pub owners: Vec<String>,

    /// The strategy used to execute tests
    #[arg(long, value_enum, default_value_t, value_name = "TYPE")]
    pub runner_type: RunnerKind,

    /// Extra options for the runner strategy, as one string
    /// (e.g. "--retries 2 --concurrency 4")
    #[arg(long, value_name = "ARGS", default_value = "", allow_hyphen_values = true)]
    pub runner_args: String,

    /// The report sink for results
    #[arg(long, value_enum, default_value_t, value_name = "TYPE")]
    pub report_type: ReporterKind,

    /// Extra options for the report sink, as one string
    /// (e.g. "--output report.html")
    #[arg(long, value_name = "ARGS", default_value = "", allow_hyphen_values = true)]
    pub report_args: String,

    /// Directory report outputs are resolved against
    #[arg(long, short = 'w', value_name = "DIR")]
    pub working_dir: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub output: OutputOpts,

    /// Run a single test in-process and print its outcome as one JSON line
    #[arg(long, hide = true, value_name = "TEST_ID", conflicts_with = "tests")]
    pub run_worker: Option<String>,
}

impl Opts {
    /// Executes the run and returns the process exit code.
    pub fn exec(self, output_writer: &mut OutputWriter) -> Result<i32, RunTestError> {
        if let Some(test_id) = &self.run_worker {
            // Workers log nothing and never colorize; their stdout is the
            // outcome wire format.
            Color::Never.init(false);
            return run_worker(TestId::new(test_id.clone()));
        }

        let output = self.output.init();

        // Selecting.
        let list = sample_test_list();
        let patterns = expand_test_args(&self.tests)?;
        let candidates = list.candidate_subset(&patterns)?;
        let criteria = SelectionCriteria {
            statuses: self.statuses.iter().copied().collect(),
            priorities: self.priorities.iter().copied().collect(),
            included_tags: self.tags.iter().cloned().collect(),
            excluded_tags: self.excluded_tags.iter().cloned().collect(),
            owners: self.owners.iter().cloned().collect(),
        };
        let selected = criteria.select(&candidates);
        if selected.is_empty() {
            warn!("no tests matched the selection criteria");
            return Ok(exit_codes::NO_TESTS_SELECTED);
        }

        if let Some(dir) = &self.working_dir {
            fs::create_dir_all(dir).map_err(|error| ConfigError::WorkingDirCreate {
                path: dir.clone(),
                error,
            })?;
        }

        // Dispatching.
        let runner = RunnerOpts::from_args_str(&self.runner_args)?.build(self.runner_type);
        debug!(
            "running {} tests with {:?} (concurrency {}, retries {})",
            selected.len(),
            runner.kind(),
            runner.concurrency(),
            runner.retries(),
        );

        let reporter_opts = ReporterOpts::from_args_str(&self.report_args)?;
        let colorize = output
            .color
            .should_colorize(supports_color::Stream::Stdout);
        let mut reporter = reporter_opts.build(
            self.report_type,
            self.working_dir.as_deref(),
            output_writer.stdout_writer(),
            colorize,
        )?;

        let process_executor;
        let registry_executor;
        let executor: &dyn TestExecutor = match self.runner_type {
            RunnerKind::ProcessPool => {
                process_executor = ProcessExecutor::for_current_exe()?;
                &process_executor
            }
            RunnerKind::Serial | RunnerKind::ThreadPool => {
                registry_executor = RegistryExecutor;
                &registry_executor
            }
        };

        // Awaiting: events flow from the runner into the reporter until
        // the run winds down.
        match runner.try_execute(&selected, executor, |event| reporter.report_event(event)) {
            Ok(_) => {}
            Err(RunnerExecuteError::Dispatch(error)) => return Err(error.into()),
            Err(RunnerExecuteError::Report(error)) => {
                return Err(WriteReportError::Stream { error }.into());
            }
        }

        // Finalizing.
        let summary = reporter.finish()?;
        Ok(summary.exit_code())
    }
}

/// Runs one test in-process and prints its outcome for the parent.
fn run_worker(test_id: TestId) -> Result<i32, RunTestError> {
    let outcome = RegistryExecutor.execute_once(&test_id)?;
    let line = serde_json::to_string(&outcome).expect("outcome serializes to JSON");
    println!("{line}");
    Ok(if outcome.kind.is_success() {
        exit_codes::OK
    } else {
        exit_codes::TEST_RUN_FAILED
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tests_are_required_without_a_worker() {
        Opts::try_parse_from(["runtest"]).unwrap_err();
        Opts::try_parse_from(["runtest", "--run-worker", "a.Case"]).unwrap();
        Opts::try_parse_from(["runtest", "--run-worker", "a.Case", "b.Other"]).unwrap_err();
    }

    #[test]
    fn bad_sub_args_are_setup_errors() {
        let opts = Opts::try_parse_from([
            "runtest",
            "--runner-args",
            "--no-such-flag",
            "sampletest.hellotest.PassedCase",
        ])
        .unwrap();
        let err = opts.exec(&mut OutputWriter::test()).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::SETUP_ERROR);
    }
}
