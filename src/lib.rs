// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! runtest is a test-execution orchestrator: it selects test cases by
//! status, priority, tag and owner, runs them under a serial, thread-pool
//! or process-pool strategy with per-test retries, streams results into a
//! report sink (stream, JSON or HTML), and reduces all outcomes into a
//! single process exit code.
//!
//! The crate is a library plus a thin `runtest` binary; the binary's
//! entire surface lives in [`dispatch::Opts`].

pub mod cases;
pub mod dispatch;
pub mod errors;
pub mod output;
pub mod reporter;
pub mod retry;
pub mod runner;
pub mod selection;
pub mod test_list;
