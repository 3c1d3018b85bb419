//! Stage validator: numeric ranges and cross-field consistency.

use crate::stage::{StageDescriptor, ToneType};

use super::error::{Diagnostic, ValidationError};

/// Audible range for carrier and right-channel frequencies, in Hz.
pub const FREQ_RANGE: (f64, f64) = (20.0, 20_000.0);
/// Accepted isochronic pulse rates, in Hz.
pub const PULSE_RANGE: (f64, f64) = (0.5, 100.0);
/// Largest allowed `|right - left|` for isochronic stages.
pub const CARRIER_ECHO_TOLERANCE: f64 = 0.1;

/// Upper bound on stage length, switched by the "unlimited duration" setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationPolicy {
    pub unlimited: bool,
}

impl DurationPolicy {
    pub const LIMITED_MAX_MINUTES: i32 = 45;
    pub const UNLIMITED_MAX_MINUTES: i32 = 360;

    pub fn new(unlimited: bool) -> Self {
        Self { unlimited }
    }

    pub fn max_minutes(&self) -> i32 {
        if self.unlimited {
            Self::UNLIMITED_MAX_MINUTES
        } else {
            Self::LIMITED_MAX_MINUTES
        }
    }
}

fn in_range(value: f64, (lo, hi): (f64, f64)) -> bool {
    (lo..=hi).contains(&value)
}

/// Check a parsed stage. Rules run in order and the first failure wins.
///
/// Generator stages get no left/right constraint.
pub fn validate_stage(
    stage: &StageDescriptor,
    policy: DurationPolicy,
) -> Result<(), ValidationError> {
    let left = stage.left_frequency();
    if !in_range(left, FREQ_RANGE) {
        return Err(ValidationError::CarrierOutOfRange(left));
    }

    match stage.tone_type() {
        ToneType::Binaural => {
            let right = stage.right_frequency();
            if !in_range(right, FREQ_RANGE) {
                return Err(ValidationError::RightOutOfRange(right));
            }
        }
        ToneType::Isochronic => {
            let right = stage.right_frequency();
            if (right - left).abs() > CARRIER_ECHO_TOLERANCE {
                return Err(ValidationError::CarrierMismatch { left, right });
            }
            let pulse = stage.pulse_frequency();
            if !in_range(pulse, PULSE_RANGE) {
                return Err(ValidationError::PulseOutOfRange(pulse));
            }
        }
        ToneType::Generator => {}
    }

    if stage.duration_minutes < 1 {
        return Err(ValidationError::DurationTooShort(stage.duration_minutes));
    }
    let max = policy.max_minutes();
    if stage.duration_minutes > max {
        return Err(ValidationError::DurationTooLong {
            minutes: stage.duration_minutes,
            max,
        });
    }

    if !in_range(stage.volume_percent, (0.0, 100.0)) {
        return Err(ValidationError::VolumeOutOfRange(stage.volume_percent));
    }

    Ok(())
}

/// [`validate_stage`], with the failure tagged by its 1-based line number.
pub fn validate_line(
    stage: &StageDescriptor,
    line: usize,
    policy: DurationPolicy,
) -> Result<(), Diagnostic> {
    validate_stage(stage, policy).map_err(|error| Diagnostic { line, error })
}
