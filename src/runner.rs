// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runner strategies: serial, thread-pool and process-pool execution.

use crate::{
    errors::{ConfigError, DispatchError},
    reporter::{CancelReason, TestEvent},
    retry::run_with_retries,
    test_list::TestId,
};
use clap::{Parser, ValueEnum};
use crossbeam_channel::Sender;
use duct::cmd;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use signal_hook::{iterator::Handle, low_level::emulate_default_handler};
use std::{
    convert::Infallible,
    fmt,
    marker::PhantomData,
    os::raw::c_int,
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

/// The command-line flag used to re-invoke the current executable as a
/// single-test worker.
pub const RUN_WORKER_ARG: &str = "--run-worker";

/// The terminal outcome of a single test.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// What happened.
    pub kind: OutcomeKind,
    /// The failure or error message, if any.
    pub message: Option<String>,
    /// How many attempts were made, including the final one.
    pub attempts: usize,
    /// How long the final attempt took.
    pub time_taken: Duration,
}

impl Outcome {
    fn new(kind: OutcomeKind, message: Option<String>) -> Self {
        Self {
            kind,
            message,
            attempts: 1,
            time_taken: Duration::ZERO,
        }
    }

    /// A passing outcome.
    pub fn passed() -> Self {
        Self::new(OutcomeKind::Passed, None)
    }

    /// A failing outcome (an assertion inside the test failed).
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Failed, Some(message.into()))
    }

    /// An error outcome (the test could not run to a verdict).
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Error, Some(message.into()))
    }

    /// A skipped outcome.
    pub fn skipped() -> Self {
        Self::new(OutcomeKind::Skipped, None)
    }

    /// Annotates this outcome with the total attempt count.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Annotates this outcome with the time taken.
    pub fn with_time(mut self, time_taken: Duration) -> Self {
        self.time_taken = time_taken;
        self
    }
}

/// The kind of terminal outcome.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    /// The test ran to completion and passed.
    Passed,
    /// The test ran to completion and failed.
    Failed,
    /// The test did not run to a verdict (panic, crash, unknown id).
    Error,
    /// The test was not run.
    Skipped,
}

impl OutcomeKind {
    /// Returns true if this outcome does not fail the run.
    pub fn is_success(self) -> bool {
        match self {
            OutcomeKind::Passed | OutcomeKind::Skipped => true,
            OutcomeKind::Failed | OutcomeKind::Error => false,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Passed => f.pad("PASS"),
            OutcomeKind::Failed => f.pad("FAIL"),
            OutcomeKind::Error => f.pad("ERROR"),
            OutcomeKind::Skipped => f.pad("SKIP"),
        }
    }
}

/// The concurrency strategy used to execute tests.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum RunnerKind {
    /// Run tests one at a time, in selection order.
    #[default]
    #[value(name = "basic")]
    Serial,
    /// Run tests concurrently on an in-process thread pool.
    #[value(name = "multithread")]
    ThreadPool,
    /// Run each test in its own worker process.
    #[value(name = "multiprocess")]
    ProcessPool,
}

/// Runner options, parsed from the `--runner-args` string.
#[derive(Debug, Default, Parser)]
#[command(name = "runner-args", no_binary_name = true)]
pub struct RunnerOpts {
    /// Number of times a failing test is retried
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub retries: usize,

    /// Number of tests to run simultaneously [0 means the strategy default]
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

impl RunnerOpts {
    /// Parses runner options from a single argument string.
    pub fn from_args_str(args: &str) -> Result<Self, ConfigError> {
        let words = shell_words::split(args).map_err(|error| ConfigError::SplitArgs {
            args: args.to_owned(),
            error,
        })?;
        Self::try_parse_from(words).map_err(|error| ConfigError::RunnerArgs { error })
    }

    /// Creates a test runner for the given strategy.
    pub fn build(&self, kind: RunnerKind) -> TestRunner {
        let concurrency = match kind {
            RunnerKind::Serial => 1,
            RunnerKind::ThreadPool => match self.concurrency {
                Some(n) if n > 0 => n,
                _ => num_cpus::get(),
            },
            RunnerKind::ProcessPool => match self.concurrency {
                Some(n) if n > 0 => n,
                _ => 1,
            },
        };
        TestRunner {
            kind,
            concurrency,
            retries: self.retries,
        }
    }
}

/// Executes a single attempt of a single test.
///
/// Implementations must be callable from worker threads; the runner never
/// calls `execute_once` for the same test concurrently.
pub trait TestExecutor: Sync {
    /// Executes one attempt and returns its outcome.
    ///
    /// Test-body faults must be recovered into a failed or error
    /// [`Outcome`]; an `Err` means the attempt could not be dispatched at
    /// all and cancels the run.
    fn execute_once(&self, test_id: &TestId) -> Result<Outcome, DispatchError>;
}

impl<F> TestExecutor for F
where
    F: Fn(&TestId) -> Result<Outcome, DispatchError> + Sync,
{
    fn execute_once(&self, test_id: &TestId) -> Result<Outcome, DispatchError> {
        self(test_id)
    }
}

/// An executor that runs each attempt in a fresh worker process by
/// re-invoking a `runtest` binary in its hidden worker mode.
///
/// A worker that crashes or prints garbage becomes an error outcome; only
/// a worker that cannot be started at all is a [`DispatchError`].
#[derive(Clone, Debug)]
pub struct ProcessExecutor {
    program: PathBuf,
}

impl ProcessExecutor {
    /// Creates an executor that re-invokes the current executable.
    pub fn for_current_exe() -> Result<Self, DispatchError> {
        let program =
            std::env::current_exe().map_err(|error| DispatchError::CurrentExe { error })?;
        Ok(Self { program })
    }

    /// Creates an executor for an explicit worker binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl TestExecutor for ProcessExecutor {
    fn execute_once(&self, test_id: &TestId) -> Result<Outcome, DispatchError> {
        let start_time = Instant::now();

        let handle = cmd(self.program.as_path(), [RUN_WORKER_ARG, test_id.as_str()])
            // Capture stdout and stderr; a failing worker exit is an
            // outcome, not an error.
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .start()
            .map_err(|error| DispatchError::WorkerSpawn {
                test_id: test_id.clone(),
                error,
            })?;

        let output = match handle.into_output() {
            Ok(output) => output,
            Err(error) => {
                return Ok(Outcome::error(format!("failed to collect worker output: {error}"))
                    .with_time(start_time.elapsed()));
            }
        };

        let outcome = match parse_worker_outcome(&output.stdout) {
            Some(outcome) => outcome,
            None => Outcome::error(format!(
                "worker exited with {} without reporting an outcome",
                output.status,
            )),
        };
        // Wall time as observed from the parent, including spawn overhead.
        Ok(outcome.with_time(start_time.elapsed()))
    }
}

/// Extracts the outcome a worker printed on its stdout.
///
/// The last non-empty line is taken so that stray prints from the test
/// body do not break the protocol.
fn parse_worker_outcome(stdout: &[u8]) -> Option<Outcome> {
    let text = std::str::from_utf8(stdout).ok()?;
    let line = text.lines().rev().find(|line| !line.trim().is_empty())?;
    serde_json::from_str(line.trim()).ok()
}

/// An error returned by [`TestRunner::try_execute`].
#[derive(Debug)]
pub enum RunnerExecuteError<E> {
    /// The reporting callback returned an error.
    Report(E),
    /// A test could not be dispatched to its worker.
    Dispatch(DispatchError),
}

/// Context for running tests under a concurrency strategy.
#[derive(Clone, Debug)]
pub struct TestRunner {
    kind: RunnerKind,
    concurrency: usize,
    retries: usize,
}

impl TestRunner {
    /// The strategy this runner was built for.
    pub fn kind(&self) -> RunnerKind {
        self.kind
    }

    /// The resolved concurrency: always at least 1.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// The per-test retry budget.
    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Executes the selected tests against the given executor.
    ///
    /// The callback is called with each test event.
    pub fn execute<'a, F>(
        &self,
        tests: &'a [TestId],
        executor: &dyn TestExecutor,
        mut callback: F,
    ) -> Result<RunStats, DispatchError>
    where
        F: FnMut(TestEvent<'a>) + Send,
    {
        self.try_execute::<Infallible, _>(tests, executor, |test_event| {
            callback(test_event);
            Ok(())
        })
        .map_err(|err| match err {
            RunnerExecuteError::Dispatch(error) => error,
            RunnerExecuteError::Report(_) => unreachable!("Err branch is infallible"),
        })
    }

    /// Executes the selected tests against the given executor.
    ///
    /// Accepts a callback that is called with each test event. If the
    /// callback returns an error, the run is canceled and the first error
    /// is propagated once the run winds down.
    pub fn try_execute<'a, E, F>(
        &self,
        tests: &'a [TestId],
        executor: &dyn TestExecutor,
        callback: F,
    ) -> Result<RunStats, RunnerExecuteError<E>>
    where
        F: FnMut(TestEvent<'a>) -> Result<(), E> + Send,
        E: Send,
    {
        let run_pool = ThreadPoolBuilder::new()
            // The main run_pool closure will need its own thread.
            .num_threads(self.concurrency + 1)
            .thread_name(|idx| format!("runtest-run-{idx}"))
            .build()
            .map_err(|error| RunnerExecuteError::Dispatch(DispatchError::PoolBuild { error }))?;

        let (run_sender, run_receiver) = crossbeam_channel::unbounded();

        let canceled = AtomicBool::new(false);
        let canceled_ref = &canceled;

        // ---
        // Spawn the signal handler thread.
        // ---
        let (srp_sender, srp_receiver) = crossbeam_channel::bounded(1);
        let (signal_sender, signal_receiver) = crossbeam_channel::unbounded();
        spawn_signal_thread(signal_sender, srp_sender);

        let mut ctx = CallbackContext::new(callback, tests.len());

        // Send the initial event.
        // (Don't need to set the canceled atomic if this fails because the
        // run hasn't started yet.)
        ctx.run_started(tests.len())
            .map_err(RunnerExecuteError::Report)?;

        // Stores the first error that occurred. This error is propagated up.
        let mut first_error: Option<RunnerExecuteError<E>> = None;

        let ctx_mut = &mut ctx;
        let first_error_mut = &mut first_error;
        let kind = self.kind;
        let retries = self.retries;

        // ---
        // Spawn the test tasks.
        // ---
        // XXX rayon requires its scope callback to be Send, there's no good
        // reason for it but there's also no other well-maintained scoped
        // threadpool :(
        run_pool.scope(move |run_scope| {
            // Block until signals are set up.
            let _ = srp_receiver.recv();

            match kind {
                RunnerKind::Serial => {
                    // One sequential task so completion order is selection
                    // order.
                    let this_run_sender = run_sender.clone();
                    run_scope.spawn(move |_| {
                        for test_id in tests {
                            run_test_task(test_id, retries, executor, canceled_ref, &this_run_sender);
                        }
                    });
                }
                RunnerKind::ThreadPool | RunnerKind::ProcessPool => {
                    for test_id in tests {
                        let this_run_sender = run_sender.clone();
                        run_scope.spawn(move |_| {
                            run_test_task(test_id, retries, executor, canceled_ref, &this_run_sender);
                        });
                    }
                }
            }

            drop(run_sender);

            loop {
                let internal_event = crossbeam_channel::select! {
                    recv(run_receiver) -> internal_event => {
                        match internal_event {
                            Ok(event) => InternalEvent::Test(event),
                            Err(_) => {
                                // All runs have been completed.
                                break;
                            }
                        }
                    },
                    recv(signal_receiver) -> internal_event => {
                        match internal_event {
                            Ok(event) => InternalEvent::Signal(event),
                            Err(_) => {
                                // Ignore the signal thread being dropped.
                                continue;
                            }
                        }
                    },
                };

                match ctx_mut.handle_event(internal_event) {
                    Ok(()) => {}
                    Err(err) => {
                        // Cancel the run, keep draining events so completed
                        // outcomes are still observed, and remember the
                        // first error.
                        canceled_ref.store(true, Ordering::Release);

                        match err {
                            InternalError::Callback(err) => {
                                // Ignore errors that happen during error cancellation.
                                if first_error_mut.is_none() {
                                    *first_error_mut = Some(RunnerExecuteError::Report(err));
                                }
                                let _ = ctx_mut.begin_cancel(CancelReason::ReportError);
                            }
                            InternalError::Dispatch(error) => {
                                if first_error_mut.is_none() {
                                    *first_error_mut =
                                        Some(RunnerExecuteError::Dispatch(error));
                                }
                                let _ = ctx_mut.begin_cancel(CancelReason::DispatchFailed);
                            }
                            InternalError::SignalCanceled(Some(err)) => {
                                // Signal-based cancellation and an error was
                                // received during cancellation.
                                if first_error_mut.is_none() {
                                    *first_error_mut = Some(RunnerExecuteError::Report(err));
                                }
                            }
                            InternalError::SignalCanceled(None) => {
                                // Signal-based cancellation and no error was
                                // returned during cancellation. Continue to
                                // handle events.
                            }
                        }
                    }
                }
            }
        });

        match ctx.run_finished() {
            Ok(()) => {}
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(RunnerExecuteError::Report(err));
                }
            }
        }

        match first_error {
            None => Ok(ctx.run_stats),
            Some(err) => Err(err),
        }
    }
}

/// Runs one test inside a pool task, reporting through the run channel.
fn run_test_task<'a>(
    test_id: &'a TestId,
    retries: usize,
    executor: &dyn TestExecutor,
    canceled: &AtomicBool,
    run_sender: &Sender<InternalTestEvent<'a>>,
) {
    if canceled.load(Ordering::Acquire) {
        // The run was canceled before this test started.
        // Failure to send means the receiver was dropped.
        let _ = run_sender.send(InternalTestEvent::Skipped { test_id });
        return;
    }

    // Failure to send means the receiver was dropped.
    let _ = run_sender.send(InternalTestEvent::Started { test_id });

    match run_with_retries(test_id, retries, |id| executor.execute_once(id)) {
        Ok(outcome) => {
            let _ = run_sender.send(InternalTestEvent::Finished { test_id, outcome });
        }
        Err(error) => {
            let _ = run_sender.send(InternalTestEvent::DispatchFailed { error });
        }
    }
}

/// Statistics for a test run.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct RunStats {
    /// The total number of tests that were expected to be run at the beginning.
    pub initial_run_count: usize,

    /// The total number of tests that ran to a terminal outcome.
    pub finished_count: usize,

    /// The number of tests that passed.
    pub passed: usize,

    /// The number of tests that passed after at least one retry.
    ///
    /// Always included in `passed`.
    pub flaky: usize,

    /// The number of tests that failed.
    pub failed: usize,

    /// The number of tests that errored (panicked, crashed, or could not
    /// reach a verdict).
    pub errored: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// Whether the run was canceled before completion.
    pub canceled: bool,
}

impl RunStats {
    /// Returns true if this run is considered a success.
    ///
    /// A run is marked as failed if any of the following are true:
    /// * the run was canceled
    /// * any test failed or errored
    /// * some selected test never reached a terminal outcome
    pub fn is_success(&self) -> bool {
        if self.canceled {
            return false;
        }
        if self.finished_count + self.skipped < self.initial_run_count {
            return false;
        }
        if self.failed > 0 || self.errored > 0 {
            return false;
        }
        true
    }

    fn on_test_finished(&mut self, outcome: &Outcome) {
        self.finished_count += 1;
        match outcome.kind {
            OutcomeKind::Passed => {
                self.passed += 1;
                if outcome.attempts > 1 {
                    self.flaky += 1;
                }
            }
            OutcomeKind::Failed => self.failed += 1,
            OutcomeKind::Error => self.errored += 1,
            OutcomeKind::Skipped => self.skipped += 1,
        }
    }
}

fn spawn_signal_thread(sender: Sender<InternalSignalEvent>, srp_sender: Sender<()>) {
    std::thread::spawn(move || {
        use signal_hook::{
            consts::*,
            iterator::{exfiltrator::SignalOnly, SignalsInfo},
        };

        // Register the SignalsInfo.
        let mut signals =
            SignalsInfo::<SignalOnly>::new(TERM_SIGNALS).expect("SignalsInfo created");
        let _ = sender.send(InternalSignalEvent::Handle {
            handle: signals.handle(),
        });
        // Let the run pool know that the signals have been registered.
        let _ = srp_sender.send(());

        let mut term_once = false;

        for signal in &mut signals {
            if term_once {
                let _ = emulate_default_handler(signal);
            } else {
                term_once = true;
                let _ = sender.send(InternalSignalEvent::Canceled { signal });
            }
        }
    });
}

struct CallbackContext<F, E> {
    callback: F,
    start_time: Instant,
    run_stats: RunStats,
    running: usize,
    signal_handle: Option<Handle>,
    cancel_state: Option<CancelReason>,
    phantom: PhantomData<E>,
}

impl<'a, F, E> CallbackContext<F, E>
where
    F: FnMut(TestEvent<'a>) -> Result<(), E> + Send,
{
    fn new(callback: F, initial_run_count: usize) -> Self {
        Self {
            callback,
            start_time: Instant::now(),
            run_stats: RunStats {
                initial_run_count,
                ..RunStats::default()
            },
            running: 0,
            signal_handle: None,
            cancel_state: None,
            phantom: PhantomData,
        }
    }

    fn run_started(&mut self, test_count: usize) -> Result<(), E> {
        (self.callback)(TestEvent::RunStarted { test_count })
    }

    fn handle_event(&mut self, event: InternalEvent<'a>) -> Result<(), InternalError<E>> {
        match event {
            InternalEvent::Signal(InternalSignalEvent::Handle { handle }) => {
                self.signal_handle = Some(handle);
                Ok(())
            }
            InternalEvent::Test(InternalTestEvent::Started { test_id }) => {
                self.running += 1;
                (self.callback)(TestEvent::TestStarted { test_id })
                    .map_err(InternalError::Callback)
            }
            InternalEvent::Test(InternalTestEvent::Finished { test_id, outcome }) => {
                self.running -= 1;
                self.run_stats.on_test_finished(&outcome);
                (self.callback)(TestEvent::TestFinished { test_id, outcome })
                    .map_err(InternalError::Callback)
            }
            InternalEvent::Test(InternalTestEvent::Skipped { test_id }) => {
                self.run_stats.skipped += 1;
                (self.callback)(TestEvent::TestSkipped { test_id })
                    .map_err(InternalError::Callback)
            }
            InternalEvent::Test(InternalTestEvent::DispatchFailed { error }) => {
                self.running -= 1;
                Err(InternalError::Dispatch(error))
            }
            InternalEvent::Signal(InternalSignalEvent::Canceled { signal: _signal }) => {
                self.cancel_state = Some(CancelReason::Signal);
                self.run_stats.canceled = true;
                // Don't close the signal handle because we're still
                // interested in the second signal.

                match (self.callback)(TestEvent::RunBeginCancel {
                    running: self.running,
                    reason: CancelReason::Signal,
                }) {
                    Ok(()) => Err(InternalError::SignalCanceled(None)),
                    Err(err) => Err(InternalError::SignalCanceled(Some(err))),
                }
            }
        }
    }

    fn begin_cancel(&mut self, reason: CancelReason) -> Result<(), E> {
        if self.cancel_state.is_none() {
            self.cancel_state = Some(reason);
        }
        self.run_stats.canceled = true;
        (self.callback)(TestEvent::RunBeginCancel {
            running: self.running,
            reason,
        })
    }

    fn run_finished(&mut self) -> Result<(), E> {
        (self.callback)(TestEvent::RunFinished {
            run_stats: self.run_stats,
            elapsed: self.start_time.elapsed(),
        })
    }
}

#[derive(Debug)]
enum InternalEvent<'a> {
    Test(InternalTestEvent<'a>),
    Signal(InternalSignalEvent),
}

#[derive(Debug)]
enum InternalTestEvent<'a> {
    Started {
        test_id: &'a TestId,
    },
    Finished {
        test_id: &'a TestId,
        outcome: Outcome,
    },
    Skipped {
        test_id: &'a TestId,
    },
    DispatchFailed {
        error: DispatchError,
    },
}

#[derive(Debug)]
enum InternalSignalEvent {
    Handle { handle: Handle },
    Canceled { signal: c_int },
}

#[derive(Debug)]
enum InternalError<E> {
    Callback(E),
    Dispatch(DispatchError),
    SignalCanceled(Option<E>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[test]
    fn test_is_success() {
        assert!(RunStats::default().is_success(), "empty run => success");
        assert!(
            RunStats {
                initial_run_count: 42,
                finished_count: 42,
                passed: 42,
                ..RunStats::default()
            }
            .is_success(),
            "all tests finished => success"
        );
        assert!(
            !RunStats {
                initial_run_count: 42,
                finished_count: 41,
                passed: 41,
                ..RunStats::default()
            }
            .is_success(),
            "not all tests finished => failure"
        );
        assert!(
            !RunStats {
                initial_run_count: 42,
                finished_count: 42,
                passed: 41,
                failed: 1,
                ..RunStats::default()
            }
            .is_success(),
            "failed => failure"
        );
        assert!(
            !RunStats {
                initial_run_count: 42,
                finished_count: 42,
                passed: 41,
                errored: 1,
                ..RunStats::default()
            }
            .is_success(),
            "errored => failure"
        );
        assert!(
            RunStats {
                initial_run_count: 42,
                finished_count: 41,
                passed: 41,
                skipped: 1,
                ..RunStats::default()
            }
            .is_success(),
            "skipped => not considered a failure"
        );
        assert!(
            !RunStats {
                initial_run_count: 42,
                finished_count: 42,
                passed: 42,
                canceled: true,
                ..RunStats::default()
            }
            .is_success(),
            "canceled => failure"
        );
    }

    #[test]
    fn concurrency_resolution() {
        let opts = RunnerOpts {
            retries: 0,
            concurrency: None,
        };
        assert_eq!(opts.build(RunnerKind::Serial).concurrency(), 1);
        assert_eq!(
            opts.build(RunnerKind::ThreadPool).concurrency(),
            num_cpus::get(),
        );
        assert_eq!(opts.build(RunnerKind::ProcessPool).concurrency(), 1);

        let opts = RunnerOpts {
            retries: 0,
            concurrency: Some(0),
        };
        assert_eq!(opts.build(RunnerKind::Serial).concurrency(), 1);
        assert_eq!(
            opts.build(RunnerKind::ThreadPool).concurrency(),
            num_cpus::get(),
        );
        assert_eq!(opts.build(RunnerKind::ProcessPool).concurrency(), 1);

        let opts = RunnerOpts {
            retries: 0,
            concurrency: Some(3),
        };
        assert_eq!(opts.build(RunnerKind::Serial).concurrency(), 1);
        assert_eq!(opts.build(RunnerKind::ThreadPool).concurrency(), 3);
        assert_eq!(opts.build(RunnerKind::ProcessPool).concurrency(), 3);
    }

    #[test]
    fn runner_args_parsing() {
        let opts = RunnerOpts::from_args_str("--retries 3 --concurrency 8").unwrap();
        assert_eq!(opts.retries, 3);
        assert_eq!(opts.concurrency, Some(8));

        let opts = RunnerOpts::from_args_str("").unwrap();
        assert_eq!(opts.retries, 0);
        assert_eq!(opts.concurrency, None);

        RunnerOpts::from_args_str("--bogus").unwrap_err();
        RunnerOpts::from_args_str("--retries 'unclosed").unwrap_err();
    }

    fn test_ids(names: &[&str]) -> Vec<TestId> {
        names.iter().map(|name| TestId::new(*name)).collect()
    }

    #[test]
    fn serial_reports_in_selection_order() {
        let tests = test_ids(&["a.First", "a.Second", "a.Third"]);
        let runner = RunnerOpts::default().build(RunnerKind::Serial);

        let executor = |test_id: &TestId| -> Result<Outcome, DispatchError> {
            if test_id.as_str() == "a.Second" {
                Ok(Outcome::failed("expected"))
            } else {
                Ok(Outcome::passed())
            }
        };

        let mut log = Vec::new();
        let stats = runner
            .execute(&tests, &executor, |event| match event {
                TestEvent::TestStarted { test_id } => log.push(format!("start {test_id}")),
                TestEvent::TestFinished { test_id, outcome } => {
                    log.push(format!("finish {test_id} {}", outcome.kind))
                }
                _ => {}
            })
            .unwrap();

        assert_eq!(
            log,
            vec![
                "start a.First",
                "finish a.First PASS",
                "start a.Second",
                "finish a.Second FAIL",
                "start a.Third",
                "finish a.Third PASS",
            ],
        );
        assert_eq!(stats.initial_run_count, 3);
        assert_eq!(stats.finished_count, 3);
        assert_eq!(stats.passed, 2);
        assert_eq!(stats.failed, 1);
        assert!(!stats.is_success());
    }

    #[test]
    fn thread_pool_runs_everything() {
        let tests = test_ids(&[
            "b.T0", "b.T1", "b.T2", "b.T3", "b.T4", "b.T5", "b.T6", "b.T7",
        ]);
        let runner = RunnerOpts {
            retries: 0,
            concurrency: Some(4),
        }
        .build(RunnerKind::ThreadPool);

        let executor = |test_id: &TestId| -> Result<Outcome, DispatchError> {
            if test_id.as_str().ends_with('7') {
                Ok(Outcome::error("deliberate"))
            } else {
                Ok(Outcome::passed())
            }
        };

        let finished = Mutex::new(Vec::new());
        let stats = runner
            .execute(&tests, &executor, |event| {
                if let TestEvent::TestFinished { test_id, .. } = event {
                    finished.lock().unwrap().push(test_id.clone());
                }
            })
            .unwrap();

        let mut finished = finished.into_inner().unwrap();
        finished.sort();
        assert_eq!(finished, tests);
        assert_eq!(stats.finished_count, 8);
        assert_eq!(stats.passed, 7);
        assert_eq!(stats.errored, 1);
        assert!(!stats.is_success());
    }

    #[test]
    fn flaky_tests_are_counted() {
        let tests = test_ids(&["c.Flaky"]);
        let runner = RunnerOpts {
            retries: 2,
            concurrency: None,
        }
        .build(RunnerKind::Serial);

        let attempts = Mutex::new(0usize);
        let executor = |_: &TestId| -> Result<Outcome, DispatchError> {
            let mut attempts = attempts.lock().unwrap();
            *attempts += 1;
            if *attempts < 2 {
                Ok(Outcome::failed("first attempt fails"))
            } else {
                Ok(Outcome::passed())
            }
        };

        let mut final_outcome = None;
        let stats = runner
            .execute(&tests, &executor, |event| {
                if let TestEvent::TestFinished { outcome, .. } = event {
                    final_outcome = Some(outcome);
                }
            })
            .unwrap();

        let outcome = final_outcome.unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Passed);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(stats.passed, 1);
        assert_eq!(stats.flaky, 1);
        assert!(stats.is_success());
    }

    #[test]
    fn dispatch_failure_cancels_the_run() {
        let tests = test_ids(&["d.First", "d.Second"]);
        let runner = RunnerOpts::default().build(RunnerKind::Serial);

        let executor = |test_id: &TestId| -> Result<Outcome, DispatchError> {
            Err(DispatchError::WorkerSpawn {
                test_id: test_id.clone(),
                error: std::io::Error::other("no such worker"),
            })
        };

        let err = runner
            .try_execute::<Infallible, _>(&tests, &executor, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, RunnerExecuteError::Dispatch(_)));
    }

    #[test]
    fn parse_worker_outcome_takes_last_line() {
        let outcome = Outcome::failed("assertion failed").with_attempts(2);
        let mut stdout = b"test body printed this\n".to_vec();
        stdout.extend_from_slice(serde_json::to_string(&outcome).unwrap().as_bytes());
        stdout.extend_from_slice(b"\n\n");

        assert_eq!(parse_worker_outcome(&stdout), Some(outcome));
        assert_eq!(parse_worker_outcome(b""), None);
        assert_eq!(parse_worker_outcome(b"not json\n"), None);
    }
}
