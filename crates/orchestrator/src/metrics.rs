//! Counters and histograms emitted by the orchestrator.
//!
//! Names and labels match the storage service dashboards. Recording goes
//! through the `metrics` facade; installing an exporter is the embedding
//! binary's job.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use tracing::debug;

pub const SEGMENTS_STORED: &str = "storage_segments_stored_total";
pub const SEGMENTS_RETRIEVED: &str = "storage_segments_retrieved_total";
pub const OPERATION_DURATION: &str = "storage_operation_duration_seconds";

/// Register metric descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(SEGMENTS_STORED, "Total number of segments stored");
    describe_counter!(SEGMENTS_RETRIEVED, "Total number of segments retrieved");
    describe_histogram!(
        OPERATION_DURATION,
        Unit::Seconds,
        "Duration of storage operations"
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Store,
    Retrieve,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Store => "store",
            Operation::Retrieve => "retrieve",
        }
    }

    fn counter_name(self) -> &'static str {
        match self {
            Operation::Store => SEGMENTS_STORED,
            Operation::Retrieve => SEGMENTS_RETRIEVED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    CacheHit,
    NotFound,
    Failed,
}

impl Status {
    fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::CacheHit => "cache_hit",
            Status::NotFound => "not_found",
            Status::Failed => "failed",
        }
    }
}

/// Times one operation and counts its outcome.
///
/// The duration is recorded on drop, so it is captured for successes,
/// errors and futures dropped mid-flight alike. A timer dropped without
/// [`finish`](Self::finish) counts as a failure.
#[derive(Debug)]
pub struct OperationTimer {
    operation: Operation,
    started: Instant,
    finished: bool,
}

impl OperationTimer {
    pub fn start(operation: Operation) -> Self {
        Self {
            operation,
            started: Instant::now(),
            finished: false,
        }
    }

    pub fn finish(mut self, status: Status) {
        self.finished = true;
        counter!(self.operation.counter_name(), "status" => status.as_str()).increment(1);
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        if !self.finished {
            debug!(operation = self.operation.as_str(), "operation abandoned before completion");
            counter!(self.operation.counter_name(), "status" => Status::Failed.as_str())
                .increment(1);
        }
        histogram!(OPERATION_DURATION, "operation" => self.operation.as_str())
            .record(self.started.elapsed().as_secs_f64());
    }
}
