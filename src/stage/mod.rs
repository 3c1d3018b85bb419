//! Stage descriptors: the immutable parameter record for one session stage.
//!
//! The textual format is positionally uniform, but the third field means
//! different things per tone type. [`ToneParams`] keeps that distinction in
//! the type system; the flat accessors on [`StageDescriptor`] reproduce the
//! stereo-pair view downstream consumers expect.

use std::fmt;
use std::sync::Arc;

/// Pulse rate carried by non-isochronic stages. Never used for synthesis.
pub const DEFAULT_PULSE_HZ: f64 = 7.83;

/// Volume applied when a line omits the sixth field.
pub const DEFAULT_VOLUME_PERCENT: f64 = 15.0;

/// The kind of tone a stage drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToneType {
    Binaural,
    Isochronic,
    Generator,
}

impl ToneType {
    /// Parse a case-insensitive tone keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BINAURAL" => Some(Self::Binaural),
            "ISOCHRONIC" => Some(Self::Isochronic),
            "GENERATOR" => Some(Self::Generator),
            _ => None,
        }
    }

    /// Lower-case keyword as written in session files.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Binaural => "binaural",
            Self::Isochronic => "isochronic",
            Self::Generator => "generator",
        }
    }

    /// Three-letter label used in status lines.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Binaural => "BIN",
            Self::Isochronic => "ISO",
            Self::Generator => "GEN",
        }
    }
}

/// Oscillator waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    /// Parse a case-insensitive waveform keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SINE" => Some(Self::Sine),
            "SQUARE" => Some(Self::Square),
            "TRIANGLE" => Some(Self::Triangle),
            "SAWTOOTH" => Some(Self::Sawtooth),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Sawtooth => "sawtooth",
        }
    }
}

/// Frequency parameters, tagged by tone type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneParams {
    /// Independent left/right channel frequencies in Hz.
    Binaural { left: f64, right: f64 },
    /// A single carrier gated at `pulse` Hz.
    Isochronic { carrier: f64, pulse: f64 },
    /// Plain generator; left and right may diverge.
    Generator { left: f64, right: f64 },
}

/// One scheduled configuration of the tone generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageDescriptor {
    pub tone: ToneParams,
    pub waveform: Waveform,
    pub duration_minutes: i32,
    pub volume_percent: f64,
}

impl StageDescriptor {
    pub fn tone_type(&self) -> ToneType {
        match self.tone {
            ToneParams::Binaural { .. } => ToneType::Binaural,
            ToneParams::Isochronic { .. } => ToneType::Isochronic,
            ToneParams::Generator { .. } => ToneType::Generator,
        }
    }

    /// Carrier / left-channel frequency.
    pub fn left_frequency(&self) -> f64 {
        match self.tone {
            ToneParams::Binaural { left, .. } | ToneParams::Generator { left, .. } => left,
            ToneParams::Isochronic { carrier, .. } => carrier,
        }
    }

    /// Right-channel frequency. Isochronic stages echo the carrier.
    pub fn right_frequency(&self) -> f64 {
        match self.tone {
            ToneParams::Binaural { right, .. } | ToneParams::Generator { right, .. } => right,
            ToneParams::Isochronic { carrier, .. } => carrier,
        }
    }

    /// Pulse rate; [`DEFAULT_PULSE_HZ`] for everything but isochronic stages.
    pub fn pulse_frequency(&self) -> f64 {
        match self.tone {
            ToneParams::Isochronic { pulse, .. } => pulse,
            _ => DEFAULT_PULSE_HZ,
        }
    }

    /// Perceived beat (`right - left`).
    pub fn beat_frequency(&self) -> f64 {
        self.right_frequency() - self.left_frequency()
    }

    pub fn duration_seconds(&self) -> u32 {
        (self.duration_minutes.max(0) as u32).saturating_mul(60)
    }

    /// The value written in the third field of the textual form.
    fn third_field(&self) -> f64 {
        match self.tone {
            ToneParams::Isochronic { pulse, .. } => pulse,
            _ => self.right_frequency(),
        }
    }
}

/// Renders the canonical six-field line, e.g. `binaural:360:367.83:sine:10:15`.
impl fmt::Display for StageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.tone_type().keyword(),
            self.left_frequency(),
            self.third_field(),
            self.waveform.keyword(),
            self.duration_minutes,
            self.volume_percent
        )
    }
}

/// An ordered, immutable list of stages plus its precomputed length.
///
/// Cloning shares the stage list.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    stages: Arc<[StageDescriptor]>,
    total_seconds: u32,
}

impl Session {
    pub fn new(stages: Vec<StageDescriptor>) -> Self {
        let total_seconds = stages.iter().map(StageDescriptor::duration_seconds).sum();
        Self {
            stages: stages.into(),
            total_seconds,
        }
    }

    pub fn stages(&self) -> &[StageDescriptor] {
        &self.stages
    }

    pub fn get(&self, index: usize) -> Option<&StageDescriptor> {
        self.stages.get(index)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Sum of every stage's duration in seconds.
    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    /// Re-derive session text, one canonical line per stage.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for stage in self.stages.iter() {
            out.push_str(&stage.to_string());
            out.push('\n');
        }
        out
    }
}
