// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Timestamps and latency series.
//!
//! Timestamps are microseconds read from `CLOCK_MONOTONIC`. On Linux that
//! clock is shared by every process on the host, so stamps taken by a client
//! and a server on the same machine can be subtracted. Across hosts the
//! difference is only meaningful if the clocks are synchronized externally;
//! nothing here attempts to correct for that.

use std::fmt;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use nix::time::{clock_gettime, ClockId};

use crate::framing::LENGTH_HEADER_SIZE;

/// Wire width of an encoded timestamp.
pub const TIMESTAMP_SIZE: usize = LENGTH_HEADER_SIZE;

/// A point in time, in microseconds of a monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn as_micros(&self) -> i64 {
        self.0
    }

    /// Signed difference `self - earlier` in microseconds.
    pub fn micros_since(&self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn to_be_bytes(self) -> [u8; TIMESTAMP_SIZE] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; TIMESTAMP_SIZE]) -> Self {
        Self(i64::from_be_bytes(bytes))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// Source of timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Host-wide monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        match clock_gettime(ClockId::CLOCK_MONOTONIC) {
            #[allow(clippy::unnecessary_cast)]
            Ok(ts) => Timestamp(ts.tv_sec() as i64 * 1_000_000 + ts.tv_nsec() as i64 / 1_000),
            Err(_) => process_local_now(),
        }
    }
}

/// Fallback with a per-process origin. Still monotonic, not host-wide.
fn process_local_now() -> Timestamp {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    let origin = ORIGIN.get_or_init(Instant::now);
    Timestamp(i64::try_from(origin.elapsed().as_micros()).unwrap_or(i64::MAX))
}

/// Wall-clock style stopwatch for whole-session measurements.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed duration.
    pub fn elapsed(self) -> Duration {
        self.start.elapsed()
    }
}

/// Per-round timestamps of a ping-pong session.
///
/// `t1` is taken before the send, `t2` by the peer when it echoes, `t3` after
/// the reply arrived. The series only grow. `elapsed` covers all rounds,
/// from the first send to the last reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencySeries {
    t1: Vec<Timestamp>,
    t2: Vec<Timestamp>,
    t3: Vec<Timestamp>,
    elapsed: Duration,
}

impl LatencySeries {
    pub fn with_capacity(rounds: usize) -> Self {
        Self {
            t1: Vec::with_capacity(rounds),
            t2: Vec::with_capacity(rounds),
            t3: Vec::with_capacity(rounds),
            elapsed: Duration::ZERO,
        }
    }

    pub fn record_send(&mut self, ts: Timestamp) {
        self.t1.push(ts);
    }

    pub fn record_remote(&mut self, ts: Timestamp) {
        self.t2.push(ts);
    }

    pub fn record_receive(&mut self, ts: Timestamp) {
        self.t3.push(ts);
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    /// Wall time of the whole session.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of completed rounds.
    pub fn len(&self) -> usize {
        self.t1.len().min(self.t2.len()).min(self.t3.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn send_times(&self) -> &[Timestamp] {
        &self.t1
    }

    pub fn remote_times(&self) -> &[Timestamp] {
        &self.t2
    }

    pub fn receive_times(&self) -> &[Timestamp] {
        &self.t3
    }

    /// `t2 - t1` per round. Assumes synchronized clocks.
    pub fn request_latencies(&self) -> Vec<i64> {
        Self::diff(&self.t2, &self.t1)
    }

    /// `t3 - t2` per round. Assumes synchronized clocks.
    pub fn response_latencies(&self) -> Vec<i64> {
        Self::diff(&self.t3, &self.t2)
    }

    /// `t3 - t1` per round. Same clock on both ends, always meaningful.
    pub fn round_trips(&self) -> Vec<i64> {
        Self::diff(&self.t3, &self.t1)
    }

    fn diff(later: &[Timestamp], earlier: &[Timestamp]) -> Vec<i64> {
        later
            .iter()
            .zip(earlier)
            .map(|(l, e)| l.micros_since(*e))
            .collect()
    }
}
