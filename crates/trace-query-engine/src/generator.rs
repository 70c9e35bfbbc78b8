//! Simulated execution traces with an embedded anomaly.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use trace_query::Value;
use tracing::info;

use crate::error::EngineError;
use crate::record::{FrameId, FrameStatus, Record};

/// Function names used for ordinary frames.
pub const SYSTEM_FUNCTIONS: [&str; 16] = [
    "init_system",
    "load_config",
    "start_ai_core",
    "process_request",
    "allocate_buffer",
    "parse_input",
    "validate_data",
    "execute_query",
    "format_response",
    "cleanup_resources",
    "log_event",
    "check_permissions",
    "acquire_lock",
    "release_lock",
    "read_file",
    "write_file",
];

const FIRST_TIMESTAMP: u64 = 1000;
const MIB: u64 = 1024 * 1024;

/// The kind of failure injected into a generated trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureScenario {
    /// Buffers allocated and never released.
    MemoryLeak,
    /// Recursion past its depth limit.
    StackOverflow,
    /// A request handled with null parameters.
    NullPointer,
    /// Two frames each waiting for the other's lock.
    Deadlock,
    /// Several very large allocations.
    ResourceExhaustion,
}

impl FailureScenario {
    /// Every scenario.
    pub const ALL: [FailureScenario; 5] = [
        FailureScenario::MemoryLeak,
        FailureScenario::StackOverflow,
        FailureScenario::NullPointer,
        FailureScenario::Deadlock,
        FailureScenario::ResourceExhaustion,
    ];

    /// The scenario's snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureScenario::MemoryLeak => "memory_leak",
            FailureScenario::StackOverflow => "stack_overflow",
            FailureScenario::NullPointer => "null_pointer",
            FailureScenario::Deadlock => "deadlock",
            FailureScenario::ResourceExhaustion => "resource_exhaustion",
        }
    }
}

impl fmt::Display for FailureScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailureScenario {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == s)
            .ok_or_else(|| EngineError::UnknownScenario(s.to_string()))
    }
}

/// Generates a chained stack trace with one injected anomaly.
///
/// Frames are numbered from 1 and each frame is called by the previous one.
/// With a seed, generation is deterministic.
///
/// # Example
///
/// ```rust
/// use trace_query_engine::{FailureScenario, RecordGenerator};
///
/// let mut generator = RecordGenerator::new(FailureScenario::Deadlock, Some(7));
/// let records = generator.generate(10);
/// assert_eq!(records.len(), 10);
/// assert!(records.iter().any(|r| r.param("waiting_for").is_some()));
/// ```
pub struct RecordGenerator {
    scenario: FailureScenario,
    rng: StdRng,
    frames: Vec<Record>,
    next_id: FrameId,
    timestamp: u64,
}

impl RecordGenerator {
    /// Creates a generator for `scenario`, seeded when `seed` is given.
    pub fn new(scenario: FailureScenario, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            scenario,
            rng,
            frames: Vec::new(),
            next_id: 1,
            timestamp: FIRST_TIMESTAMP,
        }
    }

    /// The scenario this generator injects.
    pub fn scenario(&self) -> FailureScenario {
        self.scenario
    }

    /// Generates a trace of at least `num_frames` frames.
    ///
    /// Half the frames are ordinary, then the anomaly is injected, then
    /// ordinary frames fill up to `num_frames`. Anomalies that need more
    /// frames than remain make the trace longer than requested.
    pub fn generate(&mut self, num_frames: usize) -> Vec<Record> {
        self.frames.clear();
        self.next_id = 1;
        self.timestamp = FIRST_TIMESTAMP;

        self.normal_frames(num_frames / 2);
        match self.scenario {
            FailureScenario::MemoryLeak => self.inject_memory_leak(),
            FailureScenario::StackOverflow => self.inject_stack_overflow(),
            FailureScenario::NullPointer => self.inject_null_pointer(),
            FailureScenario::Deadlock => self.inject_deadlock(),
            FailureScenario::ResourceExhaustion => self.inject_resource_exhaustion(),
        }
        let remaining = num_frames.saturating_sub(self.frames.len());
        self.normal_frames(remaining);

        info!(
            scenario = %self.scenario,
            frames = self.frames.len(),
            "generated execution trace"
        );
        std::mem::take(&mut self.frames)
    }

    fn push(
        &mut self,
        name: &str,
        allocated: u64,
        status: FrameStatus,
        advance: u64,
    ) -> &mut Record {
        let caller = self.frames.last().map(|f| f.id);
        let record = Record::new(self.next_id, name, caller, self.timestamp, allocated, status);
        self.frames.push(record);
        self.next_id += 1;
        self.timestamp += advance;
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn normal_frames(&mut self, count: usize) {
        for _ in 0..count {
            let name = SYSTEM_FUNCTIONS.choose(&mut self.rng).copied().unwrap_or("log_event");
            let allocated = self.rng.gen_range(1024..=8192);
            let status = if self.rng.gen_bool(0.5) {
                FrameStatus::Active
            } else {
                FrameStatus::Completed
            };
            let advance = self.rng.gen_range(10..=100);
            let parameters = self.normal_parameters();
            self.push(name, allocated, status, advance).parameters = parameters;
        }
    }

    fn normal_parameters(&mut self) -> Vec<(String, Value)> {
        let count = self.rng.gen_range(0..=3);
        (0..count)
            .map(|i| {
                let value = match self.rng.gen_range(0..3) {
                    0 => Value::Int(self.rng.gen_range(0..=1000)),
                    1 => Value::atom(format!("data_{}", self.rng.gen_range(1..=100))),
                    _ => Value::Null,
                };
                (format!("arg{}", i), value)
            })
            .collect()
    }

    fn inject_memory_leak(&mut self) {
        // No matching cleanup frames follow
        for i in 0..3 {
            let frame = self.push("allocate_buffer", MIB, FrameStatus::Active, 50);
            frame.parameters = vec![
                ("buffer_size".to_string(), Value::from(MIB)),
                ("buffer_id".to_string(), Value::Int(i)),
            ];
        }
    }

    fn inject_stack_overflow(&mut self) {
        for depth in 0..15 {
            let frame = self.push("recursive_process", 4096, FrameStatus::Active, 5);
            frame.parameters = vec![
                ("depth".to_string(), Value::Int(depth)),
                ("max_depth".to_string(), Value::Int(10)),
            ];
        }
    }

    fn inject_null_pointer(&mut self) {
        let frame = self.push("process_request", 2048, FrameStatus::Error, 20);
        frame.parameters = vec![
            ("request_data".to_string(), Value::Null),
            ("handler".to_string(), Value::Null),
        ];
    }

    fn inject_deadlock(&mut self) {
        for (held, wanted) in [("lock_a", "lock_b"), ("lock_b", "lock_a")] {
            let frame = self.push("acquire_lock", 1024, FrameStatus::Active, 10);
            frame.parameters = vec![
                ("lock_id".to_string(), Value::atom(held)),
                ("waiting_for".to_string(), Value::atom(wanted)),
            ];
        }
    }

    fn inject_resource_exhaustion(&mut self) {
        for i in 0..5 {
            let frame = self.push("load_dataset", 10 * MIB, FrameStatus::Active, 100);
            frame.parameters = vec![
                ("dataset_id".to_string(), Value::Int(i)),
                ("size".to_string(), Value::atom("large")),
            ];
        }
    }
}
