// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report sinks: stream results to stdout, or render a JSON or HTML report.

use crate::{
    errors::{ConfigError, WriteReportError},
    output::StdoutWriter,
    runner::{Outcome, OutcomeKind, RunStats},
    test_list::TestId,
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use clap::{Parser, ValueEnum};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;
use std::{
    fmt, fs,
    fs::File,
    io,
    io::Write,
    time::Duration,
};

/// A test event.
///
/// Events are produced by a [`TestRunner`](crate::runner::TestRunner) and
/// consumed by a [`TestReporter`].
#[derive(Clone, Debug)]
pub enum TestEvent<'a> {
    /// The test run started.
    RunStarted {
        /// The number of tests that will be run.
        test_count: usize,
    },

    /// A test started running.
    TestStarted {
        /// The test that was started.
        test_id: &'a TestId,
    },

    /// A test finished running.
    TestFinished {
        /// The test that finished running.
        test_id: &'a TestId,

        /// The terminal outcome of the test.
        outcome: Outcome,
    },

    /// A test was skipped because the run was canceled before it started.
    TestSkipped {
        /// The test that was skipped.
        test_id: &'a TestId,
    },

    /// A cancellation notice was received.
    RunBeginCancel {
        /// The number of tests still running.
        running: usize,

        /// The reason this run was canceled.
        reason: CancelReason,
    },

    /// The test run finished.
    RunFinished {
        /// Statistics for the run.
        run_stats: RunStats,

        /// The amount of time the run took.
        elapsed: Duration,
    },
}

/// The reason why a test run is being canceled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CancelReason {
    /// An error occurred while reporting results.
    ReportError,

    /// A test could not be dispatched to its worker.
    DispatchFailed,

    /// A termination signal was received.
    Signal,
}

impl CancelReason {
    fn to_static_str(self) -> &'static str {
        match self {
            CancelReason::ReportError => "reporting error",
            CancelReason::DispatchFailed => "dispatch failure",
            CancelReason::Signal => "signal",
        }
    }
}

/// The report sink used for test results.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ReporterKind {
    /// Write results to stdout as they arrive.
    #[default]
    #[value(name = "stream")]
    Stream,
    /// Render a JSON report file.
    #[value(name = "json")]
    Json,
    /// Render a self-contained HTML report file.
    #[value(name = "html")]
    Html,
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReporterKind::Stream => f.write_str("stream"),
            ReporterKind::Json => f.write_str("json"),
            ReporterKind::Html => f.write_str("html"),
        }
    }
}

/// Reporter options, parsed from the `--report-args` string.
#[derive(Debug, Default, Parser)]
#[command(name = "report-args", no_binary_name = true)]
pub struct ReporterOpts {
    /// Path the rendered report is written to (json and html)
    /// [default: report.json / report.html in the working directory]
    #[arg(long, value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Don't print per-result lines (stream)
    #[arg(long)]
    pub no_output_result: bool,

    /// Don't print the final summary line (stream)
    #[arg(long)]
    pub no_summary: bool,
}

impl ReporterOpts {
    /// Parses reporter options from a single argument string.
    pub fn from_args_str(args: &str) -> Result<Self, ConfigError> {
        let words = shell_words::split(args).map_err(|error| ConfigError::SplitArgs {
            args: args.to_owned(),
            error,
        })?;
        Self::try_parse_from(words).map_err(|error| ConfigError::ReportArgs { error })
    }

    /// Creates a reporter for the given sink.
    ///
    /// `working_dir`, when present, anchors a relative `--output` path.
    /// Without `--output`, the json and html sinks write `report.json` /
    /// `report.html` into `working_dir`; with neither, configuration
    /// fails.
    pub fn build<'a>(
        self,
        kind: ReporterKind,
        working_dir: Option<&Utf8Path>,
        writer: StdoutWriter<'a>,
        colorize: bool,
    ) -> Result<TestReporter<'a>, ConfigError> {
        let mode = match kind {
            ReporterKind::Stream => {
                let mut styles = Styles::default();
                if colorize {
                    styles.colorize();
                }
                ReporterMode::Stream {
                    writer,
                    styles,
                    no_output_result: self.no_output_result,
                    no_summary: self.no_summary,
                }
            }
            ReporterKind::Json | ReporterKind::Html => {
                let default_name = match kind {
                    ReporterKind::Json => "report.json",
                    ReporterKind::Html => "report.html",
                    ReporterKind::Stream => unreachable!("handled above"),
                };
                let output = match (self.output, working_dir) {
                    (Some(output), Some(dir)) if output.is_relative() => dir.join(output),
                    (Some(output), _) => output,
                    (None, Some(dir)) => dir.join(default_name),
                    (None, None) => return Err(ConfigError::OutputRequired { kind }),
                };
                match kind {
                    ReporterKind::Json => ReporterMode::Json { output },
                    ReporterKind::Html => ReporterMode::Html { output },
                    ReporterKind::Stream => unreachable!("handled above"),
                }
            }
        };
        Ok(TestReporter {
            mode,
            summary: RunSummary::default(),
            started_at: Local::now(),
            elapsed: Duration::ZERO,
        })
    }
}

/// A single recorded test result.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TestResult {
    /// The test this result belongs to.
    pub test_id: TestId,
    /// Its terminal outcome.
    pub outcome: Outcome,
}

/// The ordered results of a run plus derived counts.
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// The number of tests the run set out to execute.
    pub expected: usize,
    /// Results in arrival order; exactly one entry per selected test.
    pub results: Vec<TestResult>,
    /// The number of tests that passed.
    pub passed: usize,
    /// The number of tests that passed after at least one retry.
    pub flaky: usize,
    /// The number of tests that failed.
    pub failed: usize,
    /// The number of tests that errored.
    pub errored: usize,
    /// The number of tests that were skipped.
    pub skipped: usize,
    /// Whether the run was canceled.
    pub canceled: bool,
}

impl RunSummary {
    fn record(&mut self, test_id: &TestId, outcome: Outcome) {
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
        self.results.push(TestResult {
            test_id: test_id.clone(),
            outcome,
        });
    }

    /// The total number of recorded results.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Returns true if this run is considered a success.
    pub fn is_success(&self) -> bool {
        !self.canceled && self.failed == 0 && self.errored == 0 && self.total() >= self.expected
    }

    /// The exit code the process should terminate with.
    pub fn exit_code(&self) -> i32 {
        use crate::errors::exit_codes;
        if self.is_success() {
            exit_codes::OK
        } else {
            exit_codes::TEST_RUN_FAILED
        }
    }
}

#[derive(Debug)]
enum ReporterMode<'a> {
    Stream {
        writer: StdoutWriter<'a>,
        styles: Styles,
        no_output_result: bool,
        no_summary: bool,
    },
    Json {
        output: Utf8PathBuf,
    },
    Html {
        output: Utf8PathBuf,
    },
}

/// Reports test results to stdout or to a report file.
///
/// Fed with [`TestEvent`]s while the run is in progress; [`finish`]
/// (consuming) writes out file-based reports and returns the summary.
///
/// [`finish`]: TestReporter::finish
#[derive(Debug)]
pub struct TestReporter<'a> {
    mode: ReporterMode<'a>,
    summary: RunSummary,
    started_at: DateTime<Local>,
    elapsed: Duration,
}

impl<'a> TestReporter<'a> {
    /// Report a test event.
    pub fn report_event(&mut self, event: TestEvent<'_>) -> io::Result<()> {
        if let ReporterMode::Stream {
            writer,
            styles,
            no_output_result,
            no_summary,
        } = &mut self.mode
        {
            write_stream_event(writer, styles, *no_output_result, *no_summary, &event)?;
        }

        match event {
            TestEvent::RunStarted { test_count } => self.summary.expected = test_count,
            TestEvent::TestStarted { .. } => {}
            TestEvent::TestFinished { test_id, outcome } => self.summary.record(test_id, outcome),
            TestEvent::TestSkipped { test_id } => {
                self.summary.record(test_id, Outcome::skipped())
            }
            TestEvent::RunBeginCancel { .. } => self.summary.canceled = true,
            TestEvent::RunFinished { elapsed, .. } => self.elapsed = elapsed,
        }
        Ok(())
    }

    /// Finalizes the report, writing out file-based sinks.
    ///
    /// Errors here are fatal: a report that was asked for but cannot be
    /// written must not be silently dropped.
    pub fn finish(mut self) -> Result<RunSummary, WriteReportError> {
        match &mut self.mode {
            ReporterMode::Stream { writer, .. } => {
                writer
                    .flush()
                    .map_err(|error| WriteReportError::Stream { error })?;
            }
            ReporterMode::Json { output } => {
                let report = JsonReport {
                    started_at: self.started_at.to_rfc3339(),
                    elapsed_secs: self.elapsed.as_secs_f64(),
                    summary: JsonSummary::new(&self.summary),
                    tests: &self.summary.results,
                };
                create_parent_dir(output)?;
                let file = File::create(&*output).map_err(|error| WriteReportError::Io {
                    path: output.clone(),
                    error,
                })?;
                serde_json::to_writer_pretty(&file, &report).map_err(|error| {
                    WriteReportError::Serialize {
                        path: output.clone(),
                        error,
                    }
                })?;
            }
            ReporterMode::Html { output } => {
                let html = render_html(&self.summary, &self.started_at.to_rfc3339(), self.elapsed);
                create_parent_dir(output)?;
                fs::write(&*output, html).map_err(|error| WriteReportError::Io {
                    path: output.clone(),
                    error,
                })?;
            }
        }
        Ok(self.summary)
    }
}

fn create_parent_dir(path: &Utf8Path) -> Result<(), WriteReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent).map_err(|error| WriteReportError::Io {
                path: parent.to_path_buf(),
                error,
            })?;
        }
    }
    Ok(())
}

fn write_stream_event(
    writer: &mut StdoutWriter<'_>,
    styles: &Styles,
    no_output_result: bool,
    no_summary: bool,
    event: &TestEvent<'_>,
) -> io::Result<()> {
    match event {
        TestEvent::RunStarted { test_count } => {
            if !no_output_result {
                write_status(writer, "Starting", styles.pass)?;
                writeln!(
                    writer,
                    "{} tests",
                    test_count.style(styles.count),
                )?;
            }
        }
        TestEvent::TestStarted { .. } => {}
        TestEvent::TestFinished { test_id, outcome } => {
            if !no_output_result {
                let style = match outcome.kind {
                    OutcomeKind::Passed => styles.pass,
                    OutcomeKind::Failed | OutcomeKind::Error => styles.fail,
                    OutcomeKind::Skipped => styles.skip,
                };
                write_status(writer, &format!("{}", outcome.kind), style)?;

                // * > means right-align.
                // * 8 is the number of characters to pad to.
                // * .3 means three digits after the decimal point.
                write!(writer, "[{:>8.3}s] ", outcome.time_taken.as_secs_f64())?;
                write!(writer, "{test_id}")?;
                if outcome.attempts > 1 {
                    write!(writer, " (after {} attempts)", outcome.attempts)?;
                }
                writeln!(writer)?;

                if !outcome.kind.is_success() {
                    if let Some(message) = &outcome.message {
                        writeln!(writer, "{:>12} {}", "", message.style(styles.fail_output))?;
                    }
                }
            }
        }
        TestEvent::TestSkipped { test_id } => {
            if !no_output_result {
                write_status(writer, "SKIP", styles.skip)?;
                // same spacing as [   0.034s]
                write!(writer, "[         ] ")?;
                writeln!(writer, "{test_id}")?;
            }
        }
        TestEvent::RunBeginCancel { running, reason } => {
            write_status(writer, "Canceling", styles.fail)?;
            writeln!(
                writer,
                "due to {}, {} tests still running",
                reason.to_static_str().style(styles.count),
                running.style(styles.count),
            )?;
        }
        TestEvent::RunFinished { run_stats, elapsed } => {
            if !no_summary {
                let summary_style = if run_stats.failed > 0 || run_stats.errored > 0 {
                    styles.fail
                } else {
                    styles.pass
                };
                write_status(writer, "Summary", summary_style)?;
                write!(writer, "[{:>8.3}s] ", elapsed.as_secs_f64())?;

                write!(writer, "{}", run_stats.finished_count.style(styles.count))?;
                if run_stats.finished_count != run_stats.initial_run_count {
                    write!(writer, "/{}", run_stats.initial_run_count.style(styles.count))?;
                }
                write!(
                    writer,
                    " tests run: {} passed",
                    run_stats.passed.style(styles.count),
                )?;
                if run_stats.flaky > 0 {
                    write!(writer, " ({} flaky)", run_stats.flaky.style(styles.count))?;
                }
                if run_stats.failed > 0 {
                    write!(writer, ", {} failed", run_stats.failed.style(styles.count))?;
                }
                if run_stats.errored > 0 {
                    write!(writer, ", {} errored", run_stats.errored.style(styles.count))?;
                }
                write!(writer, ", {} skipped", run_stats.skipped.style(styles.count))?;
                writeln!(writer)?;
            }
        }
    }
    Ok(())
}

// The status word is padded before styling so ANSI escapes don't throw the
// column off.
fn write_status(writer: &mut StdoutWriter<'_>, status: &str, style: Style) -> io::Result<()> {
    let padded = format!("{status:>12}");
    write!(writer, "{} ", padded.style(style))
}

#[derive(Copy, Clone, Debug, Default)]
struct Styles {
    count: Style,
    pass: Style,
    fail: Style,
    fail_output: Style,
    skip: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.fail_output = Style::new().red();
        self.skip = Style::new().yellow().bold();
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    started_at: String,
    elapsed_secs: f64,
    summary: JsonSummary,
    tests: &'a [TestResult],
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    passed: usize,
    flaky: usize,
    failed: usize,
    errored: usize,
    skipped: usize,
    canceled: bool,
}

impl JsonSummary {
    fn new(summary: &RunSummary) -> Self {
        Self {
            total: summary.total(),
            passed: summary.passed,
            flaky: summary.flaky,
            failed: summary.failed,
            errored: summary.errored,
            skipped: summary.skipped,
            canceled: summary.canceled,
        }
    }
}

fn render_html(summary: &RunSummary, started_at: &str, elapsed: Duration) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Test report</title>\n\
         <style>\n\
         body { font-family: sans-serif; margin: 2em; }\n\
         table { border-collapse: collapse; }\n\
         th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: left; }\n\
         .passed { color: #1a7f37; }\n\
         .failed, .error { color: #cf222e; }\n\
         .skipped { color: #9a6700; }\n\
         </style>\n</head>\n<body>\n",
    );
    html.push_str("<h1>Test report</h1>\n");
    html.push_str(&format!(
        "<p>Started at {}, took {:.3}s.</p>\n",
        escape_html(started_at),
        elapsed.as_secs_f64(),
    ));
    html.push_str(&format!(
        "<p>{} tests: <span class=\"passed\">{} passed</span>, \
         <span class=\"failed\">{} failed</span>, \
         <span class=\"error\">{} errored</span>, \
         <span class=\"skipped\">{} skipped</span>.</p>\n",
        summary.total(),
        summary.passed,
        summary.failed,
        summary.errored,
        summary.skipped,
    ));
    if summary.canceled {
        html.push_str("<p><strong>The run was canceled before completion.</strong></p>\n");
    }
    html.push_str(
        "<table>\n<tr><th>Test</th><th>Outcome</th><th>Attempts</th>\
         <th>Time (s)</th><th>Message</th></tr>\n",
    );
    for result in &summary.results {
        let (class, word) = match result.outcome.kind {
            OutcomeKind::Passed => ("passed", "PASS"),
            OutcomeKind::Failed => ("failed", "FAIL"),
            OutcomeKind::Error => ("error", "ERROR"),
            OutcomeKind::Skipped => ("skipped", "SKIP"),
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"{class}\">{word}</td><td>{}</td>\
             <td>{:.3}</td><td>{}</td></tr>\n",
            escape_html(result.test_id.as_str()),
            result.outcome.attempts,
            result.outcome.time_taken.as_secs_f64(),
            escape_html(result.outcome.message.as_deref().unwrap_or("")),
        ));
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputWriter;
    use camino_tempfile::Utf8TempDir;
    use pretty_assertions::assert_eq;

    fn feed<'a>(
        reporter: &mut TestReporter<'_>,
        events: impl IntoIterator<Item = TestEvent<'a>>,
    ) {
        for event in events {
            reporter.report_event(event).unwrap();
        }
    }

    fn sample_events(first: &'static TestId, second: &'static TestId) -> Vec<TestEvent<'static>> {
        vec![
            TestEvent::RunStarted { test_count: 2 },
            TestEvent::TestStarted { test_id: first },
            TestEvent::TestFinished {
                test_id: first,
                outcome: Outcome::passed().with_time(Duration::from_millis(12)),
            },
            TestEvent::TestStarted { test_id: second },
            TestEvent::TestFinished {
                test_id: second,
                outcome: Outcome::failed("assertion failed: 1 == 2"),
            },
            TestEvent::RunFinished {
                run_stats: RunStats {
                    initial_run_count: 2,
                    finished_count: 2,
                    passed: 1,
                    failed: 1,
                    ..RunStats::default()
                },
                elapsed: Duration::from_millis(20),
            },
        ]
    }

    fn leak_id(name: &str) -> &'static TestId {
        Box::leak(Box::new(TestId::new(name)))
    }

    #[test]
    fn counts_are_order_independent() {
        let first = leak_id("x.First");
        let second = leak_id("x.Second");

        let mut forward = ReporterOpts::default()
            .build(ReporterKind::Stream, None, StdoutWriter::sink(), false)
            .unwrap();
        feed(&mut forward, sample_events(first, second));
        let forward = forward.finish().unwrap();

        let mut events = sample_events(first, second);
        // Swap the two TestFinished events.
        events.swap(2, 4);
        let mut reversed = ReporterOpts::default()
            .build(ReporterKind::Stream, None, StdoutWriter::sink(), false)
            .unwrap();
        feed(&mut reversed, events);
        let reversed = reversed.finish().unwrap();

        assert_eq!(forward.passed, reversed.passed);
        assert_eq!(forward.failed, reversed.failed);
        assert_eq!(forward.total(), reversed.total());
        assert_eq!(forward.is_success(), reversed.is_success());
    }

    #[test]
    fn stream_writes_status_lines() {
        let first = leak_id("x.First");
        let second = leak_id("x.Second");

        let mut output = OutputWriter::test();
        let mut reporter = ReporterOpts::default()
            .build(ReporterKind::Stream, None, output.stdout_writer(), false)
            .unwrap();
        feed(&mut reporter, sample_events(first, second));
        reporter.finish().unwrap();

        let stdout = output.stdout_str();
        assert!(stdout.contains("PASS"), "missing PASS: {stdout}");
        assert!(stdout.contains("FAIL"), "missing FAIL: {stdout}");
        assert!(stdout.contains("x.Second"), "missing test id: {stdout}");
        assert!(stdout.contains("Summary"), "missing summary: {stdout}");
        assert!(
            stdout.contains("assertion failed: 1 == 2"),
            "missing failure message: {stdout}",
        );
    }

    #[test]
    fn stream_flags_suppress_output() {
        let first = leak_id("x.First");
        let second = leak_id("x.Second");

        let mut output = OutputWriter::test();
        let opts = ReporterOpts::from_args_str("--no-output-result --no-summary").unwrap();
        let mut reporter = opts
            .build(ReporterKind::Stream, None, output.stdout_writer(), false)
            .unwrap();
        feed(&mut reporter, sample_events(first, second));
        reporter.finish().unwrap();

        assert_eq!(output.stdout_str(), "");
    }

    #[test]
    fn json_report_round_trips_counts() {
        let first = leak_id("x.First");
        let second = leak_id("x.Second");

        let dir = Utf8TempDir::new().unwrap();
        let opts = ReporterOpts {
            output: Some("report.json".into()),
            ..ReporterOpts::default()
        };
        let mut reporter = opts
            .build(
                ReporterKind::Json,
                Some(dir.path()),
                StdoutWriter::sink(),
                false,
            )
            .unwrap();
        feed(&mut reporter, sample_events(first, second));
        let summary = reporter.finish().unwrap();
        assert!(!summary.is_success());

        let contents = fs::read_to_string(dir.path().join("report.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["summary"]["total"], 2);
        assert_eq!(parsed["summary"]["passed"], 1);
        assert_eq!(parsed["summary"]["failed"], 1);
        assert_eq!(parsed["tests"][0]["test_id"], "x.First");
        assert_eq!(parsed["tests"][1]["outcome"]["kind"], "failed");
    }

    #[test]
    fn html_report_contains_results() {
        let first = leak_id("x.First");
        let second = leak_id("x.Second");

        let dir = Utf8TempDir::new().unwrap();
        let opts = ReporterOpts {
            output: Some(dir.path().join("nested/report.html")),
            ..ReporterOpts::default()
        };
        let mut reporter = opts
            .build(ReporterKind::Html, None, StdoutWriter::sink(), false)
            .unwrap();
        feed(&mut reporter, sample_events(first, second));
        reporter.finish().unwrap();

        let contents = fs::read_to_string(dir.path().join("nested/report.html")).unwrap();
        assert!(contents.contains("x.First"));
        assert!(contents.contains("FAIL"));
        assert!(contents.contains("assertion failed: 1 == 2"));
    }

    #[test]
    fn file_sinks_default_into_the_working_dir() {
        let first = leak_id("x.First");
        let second = leak_id("x.Second");

        let dir = Utf8TempDir::new().unwrap();
        let mut reporter = ReporterOpts::default()
            .build(
                ReporterKind::Html,
                Some(dir.path()),
                StdoutWriter::sink(),
                false,
            )
            .unwrap();
        feed(&mut reporter, sample_events(first, second));
        reporter.finish().unwrap();

        let contents = fs::read_to_string(dir.path().join("report.html")).unwrap();
        assert!(contents.contains("x.First"));

        let mut reporter = ReporterOpts::default()
            .build(
                ReporterKind::Json,
                Some(dir.path()),
                StdoutWriter::sink(),
                false,
            )
            .unwrap();
        feed(&mut reporter, sample_events(first, second));
        reporter.finish().unwrap();
        assert!(dir.path().join("report.json").is_file());
    }

    #[test]
    fn file_sinks_require_somewhere_to_write() {
        // No --output and no working directory.
        let err = ReporterOpts::default()
            .build(ReporterKind::Json, None, StdoutWriter::sink(), false)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutputRequired {
                kind: ReporterKind::Json
            }
        ));
    }

    #[test]
    fn escape_html_special_chars() {
        assert_eq!(
            escape_html("<b>&\"quotes\"'</b>"),
            "&lt;b&gt;&amp;&quot;quotes&quot;&#39;&lt;/b&gt;",
        );
    }
}
