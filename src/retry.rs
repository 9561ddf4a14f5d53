// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strategy-agnostic retry control.

use crate::{
    errors::DispatchError,
    runner::{Outcome, OutcomeKind},
    test_list::TestId,
};
use tracing::debug;

/// Runs a single test up to `retries + 1` times, stopping at the first
/// pass.
///
/// The returned outcome is the last attempt's, annotated with the total
/// number of attempts, so a pass-after-retry is distinguishable from a
/// first-try pass. Skipped outcomes are terminal and never retried.
/// Dispatch errors propagate immediately: they mean the attempt could not
/// be made at all, not that the test failed.
pub fn run_with_retries<F>(
    test_id: &TestId,
    retries: usize,
    mut execute_once: F,
) -> Result<Outcome, DispatchError>
where
    F: FnMut(&TestId) -> Result<Outcome, DispatchError>,
{
    let total_attempts = retries + 1;
    let mut attempt = 1;
    loop {
        let outcome = execute_once(test_id)?;
        match outcome.kind {
            OutcomeKind::Passed | OutcomeKind::Skipped => {
                return Ok(outcome.with_attempts(attempt));
            }
            OutcomeKind::Failed | OutcomeKind::Error => {
                if attempt >= total_attempts {
                    return Ok(outcome.with_attempts(attempt));
                }
                debug!(
                    "retrying {test_id} (attempt {} of {total_attempts})",
                    attempt + 1,
                );
                attempt += 1;
            }
        }
    }
}
