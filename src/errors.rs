// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types and the process exit-code table.

use crate::{reporter::ReporterKind, test_list::TestId};
use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// Exit codes returned by the `runtest` binary.
pub mod exit_codes {
    /// The run completed and every selected test passed.
    pub const OK: i32 = 0;

    /// At least one test failed or errored, or the run was canceled.
    pub const TEST_RUN_FAILED: i32 = 1;

    /// The selection criteria matched no tests.
    pub const NO_TESTS_SELECTED: i32 = 4;

    /// A worker process or worker pool could not be started.
    pub const DISPATCH_ERROR: i32 = 70;

    /// Invalid configuration: bad sub-arguments, unknown test identifiers,
    /// or an unreadable identifier file.
    pub const SETUP_ERROR: i32 = 96;

    /// The report sink could not write its output.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

/// An error that occurred while turning command-line test arguments into a
/// candidate set.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A test pattern matched no registered test.
    #[error("no registered test matches `{pattern}`")]
    UnknownTest {
        /// The pattern as given on the command line.
        pattern: String,
    },

    /// An `@file` argument could not be read.
    #[error("failed to read test identifier file `{path}`")]
    TestFileRead {
        /// The path of the identifier file.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurred while interpreting runner or report options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An argument string could not be split into words.
    #[error("failed to split argument string `{args}`")]
    SplitArgs {
        /// The argument string as given on the command line.
        args: String,
        /// The underlying error.
        #[source]
        error: shell_words::ParseError,
    },

    /// `--runner-args` did not parse.
    #[error("invalid runner arguments")]
    RunnerArgs {
        /// The underlying error.
        #[source]
        error: clap::Error,
    },

    /// `--report-args` did not parse.
    #[error("invalid report arguments")]
    ReportArgs {
        /// The underlying error.
        #[source]
        error: clap::Error,
    },

    /// A file-producing report sink had nowhere to write: neither
    /// `--output` nor a working directory was given.
    #[error("report type `{kind}` requires --output in --report-args or a --working-dir")]
    OutputRequired {
        /// The report sink that was requested.
        kind: ReporterKind,
    },

    /// The working directory could not be created.
    #[error("failed to create working directory `{path}`")]
    WorkingDirCreate {
        /// The directory that was requested.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

/// A fatal error while dispatching tests to a runner strategy.
///
/// Faults inside test bodies are never a `DispatchError`; they are
/// recovered into an error [`Outcome`](crate::runner::Outcome).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A worker process could not be started.
    #[error("failed to start worker process for test `{test_id}`")]
    WorkerSpawn {
        /// The test the worker was meant to run.
        test_id: TestId,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The worker thread pool could not be built.
    #[error("failed to build the worker thread pool")]
    PoolBuild {
        /// The underlying error.
        #[source]
        error: rayon::ThreadPoolBuildError,
    },

    /// The current executable could not be located for process workers.
    #[error("failed to locate the current executable for worker processes")]
    CurrentExe {
        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

/// An error while writing report output.
#[derive(Debug, Error)]
pub enum WriteReportError {
    /// An error occurred while writing to stdout.
    #[error("error writing to stdout")]
    Stream {
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// An error occurred while writing a report file.
    #[error("failed to write report to `{path}`")]
    Io {
        /// The file or directory being written.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// An error occurred while serializing report data.
    #[error("failed to serialize report to `{path}`")]
    Serialize {
        /// The file being written.
        path: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// The top-level error type returned by [`Opts::exec`](crate::dispatch::Opts::exec).
///
/// Every variant maps to an exit code via [`RunTestError::exit_code`].
#[derive(Debug, Error)]
pub enum RunTestError {
    /// A selection error occurred.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// A configuration error occurred.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A dispatch error occurred.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A report-writing error occurred.
    #[error(transparent)]
    WriteReport(#[from] WriteReportError),
}

impl RunTestError {
    /// The exit code the process should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunTestError::Selection(_) | RunTestError::Config(_) => exit_codes::SETUP_ERROR,
            RunTestError::Dispatch(_) => exit_codes::DISPATCH_ERROR,
            RunTestError::WriteReport(_) => exit_codes::WRITE_OUTPUT_ERROR,
        }
    }
}
