// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use runtest::{dispatch::Opts, output::OutputWriter};
use std::error::Error;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let opts = Opts::parse();
    match opts.exec(&mut OutputWriter::default()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("error: {error}");
            let mut source = error.source();
            while let Some(err) = source {
                eprintln!("  caused by: {err}");
                source = err.source();
            }
            std::process::exit(error.exit_code());
        }
    }
}
