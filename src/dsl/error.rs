//! Error types for the session DSL.
//!
//! Parse failures and validation failures are kept apart: a line that does
//! not parse is dropped without a diagnostic, while a line that parses but
//! breaks a range rule is reported back as a [`Diagnostic`].

use std::fmt;

use thiserror::Error;

/// Numeric fields of a session line, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Left,
    RightOrPulse,
    Duration,
    Volume,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Left => "left/carrier frequency",
            Field::RightOrPulse => "frequency",
            Field::Duration => "duration",
            Field::Volume => "volume",
        };
        f.write_str(name)
    }
}

/// Why a single line could not be turned into a stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("need 5 or 6 parts separated by ':' (got {0})")]
    FieldCount(usize),
    #[error("invalid type `{0}`; use BINAURAL, ISOCHRONIC, or GENERATOR")]
    UnknownToneType(String),
    #[error("invalid {field} `{value}`")]
    InvalidNumber { field: Field, value: String },
    #[error("invalid waveform `{0}`; use SINE, SQUARE, TRIANGLE, SAWTOOTH")]
    UnknownWaveform(String),
    #[error("volume must be 0-100% (got {0})")]
    VolumeOutOfRange(f64),
}

/// A parsed stage that breaks a range or consistency rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("carrier/left frequency must be 20-20000 Hz (got {0})")]
    CarrierOutOfRange(f64),
    #[error("right frequency must be 20-20000 Hz (got {0})")]
    RightOutOfRange(f64),
    #[error("ISOCHRONIC carrier mismatch (right {right} should equal left {left})")]
    CarrierMismatch { left: f64, right: f64 },
    #[error("ISOCHRONIC pulse must be 0.5-100 Hz (got {0})")]
    PulseOutOfRange(f64),
    #[error("duration must be at least 1 minute (got {0})")]
    DurationTooShort(i32),
    #[error("duration exceeds maximum ({max} min, got {minutes})")]
    DurationTooLong { minutes: i32, max: i32 },
    #[error("volume must be 0-100% (got {0})")]
    VolumeOutOfRange(f64),
}

/// A validation failure tied to its 1-based source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: ValidationError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.error)
    }
}

/// Compilation produced nothing playable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("no valid stages found")]
    NoValidStages {
        diagnostics: Vec<Diagnostic>,
        skipped_lines: Vec<usize>,
    },
}

impl CompileError {
    /// Validation diagnostics gathered before the compile gave up.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileError::NoValidStages { diagnostics, .. } => diagnostics,
        }
    }
}
