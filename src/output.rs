// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output and logging options shared by the whole CLI.

use clap::{Args, ValueEnum};
use std::{
    io,
    io::{BufWriter, Stdout, Write},
    sync::Once,
};
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

/// Output options for the CLI.
#[derive(Copy, Clone, Debug, Default, Args)]
pub struct OutputOpts {
    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Produce color output
    #[arg(long, value_enum, default_value_t, value_name = "WHEN")]
    pub color: Color,
}

impl OutputOpts {
    /// Initializes tracing and returns the output context.
    pub fn init(self) -> OutputContext {
        let Self { verbose, color } = self;
        color.init(verbose);
        OutputContext { verbose, color }
    }
}

/// The resolved output context.
#[derive(Copy, Clone, Debug)]
pub struct OutputContext {
    /// Whether verbose output was requested.
    pub verbose: bool,

    /// The color preference.
    pub color: Color,
}

/// When to produce color output.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Color {
    /// Color output if stdout is a terminal that supports it.
    #[default]
    Auto,
    /// Always color output.
    Always,
    /// Never color output.
    Never,
}

static INIT_LOGGER: Once = Once::new();

impl Color {
    /// Returns true if the given stream should be colorized.
    pub fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }

    /// Initializes the tracing subscriber. Idempotent.
    ///
    /// The filter comes from `RUNTEST_LOG` when set; otherwise the default
    /// level is INFO, or DEBUG with `--verbose`.
    pub(crate) fn init(self, verbose: bool) {
        INIT_LOGGER.call_once(|| {
            let default_level = if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            };
            let env = std::env::var("RUNTEST_LOG").unwrap_or_default();
            let targets = if env.is_empty() {
                Targets::new().with_default(default_level)
            } else {
                match env.parse::<Targets>() {
                    Ok(targets) => targets,
                    Err(error) => {
                        eprintln!(
                            "warning: could not parse RUNTEST_LOG ({error}), \
                             using the default filter"
                        );
                        Targets::new().with_default(default_level)
                    }
                }
            };

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .without_time()
                .with_target(false)
                .with_filter(targets);
            tracing_subscriber::registry().with(layer).init();
        });
    }
}

/// A helper for capturing output in tests.
///
/// The test call pattern generally looks like:
///
/// ```ignore
/// let mut output_writer = OutputWriter::test();
/// opts.exec(&mut output_writer)
/// ```
#[derive(Debug, Default)]
pub enum OutputWriter {
    /// Produce output on the (real) stdout.
    #[default]
    Normal,

    /// Capture output in an in-memory buffer.
    Test {
        /// The captured stdout.
        stdout: Vec<u8>,
    },
}

impl OutputWriter {
    /// Creates a capturing writer for tests.
    pub fn test() -> Self {
        Self::Test { stdout: Vec::new() }
    }

    /// Returns a writer for stdout.
    pub fn stdout_writer(&mut self) -> StdoutWriter<'_> {
        match self {
            Self::Normal => StdoutWriter::Normal {
                buf: BufWriter::new(io::stdout()),
            },
            Self::Test { stdout } => StdoutWriter::Test { buf: stdout },
        }
    }

    /// The captured stdout, for assertions. Empty in normal mode.
    pub fn stdout_str(&self) -> &str {
        match self {
            Self::Normal => "",
            Self::Test { stdout } => {
                std::str::from_utf8(stdout).expect("captured stdout is valid UTF-8")
            }
        }
    }
}

/// A stdout writer, either real, capturing or discarding.
#[derive(Debug)]
pub enum StdoutWriter<'a> {
    /// Write to the real stdout, buffered.
    Normal {
        /// The buffered writer.
        buf: BufWriter<Stdout>,
    },

    /// Discard everything.
    Sink,

    /// Write to an in-memory buffer.
    Test {
        /// The buffer.
        buf: &'a mut Vec<u8>,
    },
}

#[cfg(test)]
impl StdoutWriter<'static> {
    /// A writer that discards everything, for tests of sinks that only
    /// write files.
    pub(crate) fn sink() -> Self {
        Self::Sink
    }
}

impl Write for StdoutWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Normal { buf: w } => w.write(buf),
            Self::Sink => Ok(buf.len()),
            Self::Test { buf: w } => {
                w.extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Normal { buf } => buf.flush(),
            Self::Sink | Self::Test { .. } => Ok(()),
        }
    }
}
