//! Execution-trace records: the source entities facts are derived from.

use std::fmt;
use std::str::FromStr;

use trace_query::Value;

use crate::error::EngineError;

/// Stack frame identifier (positive integer).
pub type FrameId = u64;

/// Lifecycle status of a stack frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FrameStatus {
    /// Still on the stack.
    Active,
    /// Returned normally.
    Completed,
    /// Failed.
    Error,
}

impl FrameStatus {
    /// The atom used for this status in facts.
    pub fn as_str(self) -> &'static str {
        match self {
            FrameStatus::Active => "active",
            FrameStatus::Completed => "completed",
            FrameStatus::Error => "error",
        }
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(FrameStatus::Active),
            "completed" => Ok(FrameStatus::Completed),
            "error" => Ok(FrameStatus::Error),
            other => Err(EngineError::UnknownStatus(other.to_string())),
        }
    }
}

/// One stack frame of a simulated execution trace.
///
/// Records are created once by a generator and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Unique frame identifier.
    pub id: FrameId,
    /// Function executing in this frame.
    pub name: String,
    /// Frame that called this one, if any. Lookup only.
    pub caller: Option<FrameId>,
    /// Logical timestamp at frame entry.
    pub timestamp: u64,
    /// Bytes allocated by the frame.
    pub allocated: u64,
    /// Frame status.
    pub status: FrameStatus,
    /// Named parameters in declaration order.
    pub parameters: Vec<(String, Value)>,
}

impl Record {
    /// Creates a record without parameters.
    pub fn new(
        id: FrameId,
        name: impl Into<String>,
        caller: Option<FrameId>,
        timestamp: u64,
        allocated: u64,
        status: FrameStatus,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            caller,
            timestamp,
            allocated,
            status,
            parameters: Vec::new(),
        }
    }

    /// Adds a parameter, keeping declaration order.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    /// Looks up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Renders the facts this record contributes, in surface syntax.
    ///
    /// ```rust
    /// use trace_query_engine::{FrameStatus, Record};
    ///
    /// let record = Record::new(2, "parse_input", Some(1), 1040, 2048, FrameStatus::Active)
    ///     .with_param("arg0", "data_7");
    /// assert_eq!(
    ///     record.to_fact_strings(),
    ///     vec![
    ///         "frame(2, parse_input, 1040, active).",
    ///         "calls(1, 2).",
    ///         "allocated(2, 2048).",
    ///         "param(2, arg0, data_7).",
    ///         "status(2, active).",
    ///     ],
    /// );
    /// ```
    pub fn to_fact_strings(&self) -> Vec<String> {
        let mut facts = Vec::with_capacity(4 + self.parameters.len());
        facts.push(format!(
            "frame({}, {}, {}, {}).",
            self.id, self.name, self.timestamp, self.status
        ));
        if let Some(caller) = self.caller {
            facts.push(format!("calls({}, {}).", caller, self.id));
        }
        facts.push(format!("allocated({}, {}).", self.id, self.allocated));
        for (name, value) in &self.parameters {
            facts.push(format!("param({}, {}, {}).", self.id, name, value));
        }
        facts.push(format!("status({}, {}).", self.id, self.status));
        facts
    }
}
