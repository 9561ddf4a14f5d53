// Copyright (c) The runtest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The built-in sample suite.
//!
//! Test-case logic is a collaborator, not part of the orchestrator; this
//! fixed registry stands in for it so the binary and the tests have
//! something real to select and execute.

use crate::{
    errors::DispatchError,
    runner::{Outcome, TestExecutor},
    test_list::{Priority, TestId, TestList, TestMeta, TestStatus},
};
use std::{
    any::Any,
    panic::catch_unwind,
    thread,
    time::{Duration, Instant},
};

/// A registered sample case.
pub struct SampleCase {
    /// The dotted-path identifier.
    pub id: &'static str,
    /// Lifecycle status.
    pub status: TestStatus,
    /// Priority.
    pub priority: Priority,
    /// Tags.
    pub tags: &'static [&'static str],
    /// Owners.
    pub owners: &'static [&'static str],
    /// The test body.
    pub body: fn() -> Result<(), String>,
}

impl SampleCase {
    fn meta(&self) -> TestMeta {
        TestMeta {
            status: self.status,
            priority: self.priority,
            tags: self.tags.iter().map(|s| s.to_string()).collect(),
            owners: self.owners.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn passed_body() -> Result<(), String> {
    Ok(())
}

fn failed_body() -> Result<(), String> {
    Err("the failing sample case always fails".to_owned())
}

fn crash_body() -> Result<(), String> {
    panic!("deliberate crash in sample case");
}

fn slow_body() -> Result<(), String> {
    thread::sleep(Duration::from_millis(5));
    Ok(())
}

/// All registered sample cases, in registration order.
pub static SAMPLE_CASES: &[SampleCase] = &[
    SampleCase {
        id: "sampletest.hellotest.PassedCase",
        status: TestStatus::Ready,
        priority: Priority::Bvt,
        tags: &["hello"],
        owners: &["apple"],
        body: passed_body,
    },
    SampleCase {
        id: "sampletest.hellotest.FailedCase",
        status: TestStatus::Ready,
        priority: Priority::Bvt,
        tags: &["hello"],
        owners: &["banana"],
        body: failed_body,
    },
    SampleCase {
        id: "sampletest.hellotest.CrashCase",
        status: TestStatus::Ready,
        priority: Priority::High,
        tags: &["hello", "crash"],
        owners: &["banana"],
        body: crash_body,
    },
    SampleCase {
        id: "sampletest.quicktest.SlowCase",
        status: TestStatus::Ready,
        priority: Priority::Low,
        tags: &["slow"],
        owners: &["apple", "banana"],
        body: slow_body,
    },
    SampleCase {
        id: "sampletest.quicktest.DesignCase",
        status: TestStatus::Design,
        priority: Priority::Normal,
        tags: &[],
        owners: &["cherry"],
        body: passed_body,
    },
];

/// The sample suite as an ordered test list.
pub fn sample_test_list() -> TestList {
    TestList::new(
        SAMPLE_CASES
            .iter()
            .map(|case| (TestId::new(case.id), case.meta()))
            .collect(),
    )
}

fn find_case(test_id: &TestId) -> Option<&'static SampleCase> {
    SAMPLE_CASES.iter().find(|case| case.id == test_id.as_str())
}

/// Executes sample cases in-process, one attempt at a time.
///
/// Panics inside a test body are caught and recovered into an error
/// outcome so one misbehaving test never takes the run down.
#[derive(Copy, Clone, Debug, Default)]
pub struct RegistryExecutor;

impl TestExecutor for RegistryExecutor {
    fn execute_once(&self, test_id: &TestId) -> Result<Outcome, DispatchError> {
        let start_time = Instant::now();
        let outcome = match find_case(test_id) {
            Some(case) => match catch_unwind(case.body) {
                Ok(Ok(())) => Outcome::passed(),
                Ok(Err(message)) => Outcome::failed(message),
                Err(payload) => Outcome::error(panic_message(payload)),
            },
            None => Outcome::error(format!("test `{test_id}` is not registered")),
        };
        Ok(outcome.with_time(start_time.elapsed()))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        format!("test panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("test panicked: {message}")
    } else {
        "test panicked".to_owned()
    }
}
