//! Client metrics
//!
//! Counters for remote calls, sensor reads and registry lookups, plus an in-memory
//! aggregate a session can hand out as a snapshot.

use std::collections::BTreeMap;
use std::fmt;

use contracts::{ObjectKind, ReturnCode};
use metrics::counter;

/// How a sensor value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReadPath {
    /// Blocking read issued before the stream was subscribed
    Cold,
    /// Fresh value from the streaming buffer
    Buffered,
    /// Buffer miss answered with the value captured at subscription time
    Masked,
}

impl ReadPath {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadPath::Cold => "cold",
            ReadPath::Buffered => "buffered",
            ReadPath::Masked => "masked",
        }
    }
}

/// Outcome of a name lookup in the object registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult {
    Hit,
    Miss,
    Absent,
}

impl LookupResult {
    pub fn as_str(self) -> &'static str {
        match self {
            LookupResult::Hit => "hit",
            LookupResult::Miss => "miss",
            LookupResult::Absent => "absent",
        }
    }
}

/// Record one remote call and its return code
pub fn record_remote_call(operation: &'static str, code: ReturnCode) {
    counter!(
        "simscene_remote_calls_total",
        "operation" => operation,
        "status" => code.0.to_string()
    )
    .increment(1);
}

/// Record one sensor value handed to a caller
pub fn record_sensor_read(kind: ObjectKind, path: ReadPath) {
    counter!(
        "simscene_sensor_reads_total",
        "kind" => kind.as_str(),
        "path" => path.as_str()
    )
    .increment(1);
}

/// Record one registry name lookup
pub fn record_registry_lookup(result: LookupResult) {
    counter!(
        "simscene_registry_lookups_total",
        "result" => result.as_str()
    )
    .increment(1);
}

/// In-memory aggregate of a session's traffic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Calls per remote operation
    pub calls: BTreeMap<&'static str, u64>,

    /// Calls answered with a code not accepted for their mode
    pub failed_calls: u64,

    /// Sensor values per read path
    pub reads: BTreeMap<ReadPath, u64>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&mut self, operation: &'static str, accepted: bool) {
        *self.calls.entry(operation).or_insert(0) += 1;
        if !accepted {
            self.failed_calls += 1;
        }
    }

    pub fn record_read(&mut self, path: ReadPath) {
        *self.reads.entry(path).or_insert(0) += 1;
    }

    pub fn total_calls(&self) -> u64 {
        self.calls.values().sum()
    }

    pub fn calls_to(&self, operation: &str) -> u64 {
        self.calls.get(operation).copied().unwrap_or(0)
    }

    pub fn reads_via(&self, path: ReadPath) -> u64 {
        self.reads.get(&path).copied().unwrap_or(0)
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Session Summary ===")?;
        writeln!(
            f,
            "Remote calls: {} ({} failed)",
            self.total_calls(),
            self.failed_calls
        )?;
        for (operation, count) in &self.calls {
            writeln!(f, "  {operation}: {count}")?;
        }
        write!(
            f,
            "Sensor reads: cold={} buffered={} masked={}",
            self.reads_via(ReadPath::Cold),
            self.reads_via(ReadPath::Buffered),
            self.reads_via(ReadPath::Masked)
        )
    }
}
