//! Line parser for the session DSL.
//!
//! Grammar, one stage per line:
//!
//! ```text
//! TYPE:LEFT:RIGHT_OR_PULSE:WAVE:DURATION[:VOLUME]
//! ```
//!
//! The third field is the right-channel frequency for binaural and generator
//! stages, and the pulse rate for isochronic ones.

use crate::stage::{StageDescriptor, ToneParams, ToneType, Waveform, DEFAULT_VOLUME_PERCENT};

use super::error::{Field, ParseError};

/// Field separator.
pub const DELIMITER: char = ':';

/// Parse one trimmed, non-comment line into a stage.
pub fn parse_line(line: &str) -> Result<StageDescriptor, ParseError> {
    let parts: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    if parts.len() != 5 && parts.len() != 6 {
        return Err(ParseError::FieldCount(parts.len()));
    }

    let tone_type = ToneType::from_keyword(parts[0])
        .ok_or_else(|| ParseError::UnknownToneType(parts[0].to_string()))?;
    let left = parse_float(parts[1], Field::Left)?;
    let third = parse_float(parts[2], Field::RightOrPulse)?;

    let tone = match tone_type {
        ToneType::Binaural => ToneParams::Binaural { left, right: third },
        ToneType::Isochronic => ToneParams::Isochronic {
            carrier: left,
            pulse: third,
        },
        ToneType::Generator => ToneParams::Generator { left, right: third },
    };

    let waveform = Waveform::from_keyword(parts[3])
        .ok_or_else(|| ParseError::UnknownWaveform(parts[3].to_string()))?;
    let duration_minutes = parse_int(parts[4], Field::Duration)?;

    let volume_percent = match parts.get(5) {
        Some(raw) => {
            let volume = parse_float(raw, Field::Volume)?;
            if !(0.0..=100.0).contains(&volume) {
                return Err(ParseError::VolumeOutOfRange(volume));
            }
            volume
        }
        None => DEFAULT_VOLUME_PERCENT,
    };

    Ok(StageDescriptor {
        tone,
        waveform,
        duration_minutes,
        volume_percent,
    })
}

fn invalid(field: Field, raw: &str) -> ParseError {
    ParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    }
}

/// `f64::from_str` accepts `inf` and `NaN`; neither is a usable frequency.
fn parse_float(raw: &str, field: Field) -> Result<f64, ParseError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(field, raw))
}

fn parse_int(raw: &str, field: Field) -> Result<i32, ParseError> {
    raw.parse::<i32>().map_err(|_| invalid(field, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn binaural_keeps_right_frequency() {
        let stage = parse_line("binaural:360:367.83:sine:10:15").unwrap();
        assert_eq!(stage.tone_type(), ToneType::Binaural);
        assert_approx_eq!(stage.left_frequency(), 360.0);
        assert_approx_eq!(stage.right_frequency(), 367.83);
        assert_approx_eq!(stage.pulse_frequency(), 7.83);
        assert_eq!(stage.waveform, Waveform::Sine);
        assert_eq!(stage.duration_minutes, 10);
        assert_approx_eq!(stage.volume_percent, 15.0);
    }

    #[test]
    fn isochronic_reinterprets_third_field() {
        let stage = parse_line("isochronic:333:10:square:5").unwrap();
        assert_eq!(stage.tone_type(), ToneType::Isochronic);
        assert_approx_eq!(stage.left_frequency(), 333.0);
        assert_approx_eq!(stage.right_frequency(), 333.0);
        assert_approx_eq!(stage.pulse_frequency(), 10.0);
    }

    #[test]
    fn generator_allows_divergent_channels() {
        let stage = parse_line("GENERATOR:432:440:Triangle:3:50").unwrap();
        assert_eq!(stage.tone_type(), ToneType::Generator);
        assert_approx_eq!(stage.right_frequency(), 440.0);
        assert_approx_eq!(stage.volume_percent, 50.0);
    }

    #[test]
    fn fields_are_trimmed() {
        let stage = parse_line("binaural : 200 : 210 : sawtooth : 2 : 40").unwrap();
        assert_eq!(stage.waveform, Waveform::Sawtooth);
        assert_eq!(stage.duration_minutes, 2);
    }

    #[test]
    fn default_volume_when_five_fields() {
        let stage = parse_line("generator:432:432:sine:3").unwrap();
        assert_approx_eq!(stage.volume_percent, DEFAULT_VOLUME_PERCENT);
    }

    #[test]
    fn wrong_field_count() {
        assert_eq!(
            parse_line("binaural:360:367:sine"),
            Err(ParseError::FieldCount(4))
        );
        assert_eq!(
            parse_line("binaural:360:367:sine:1:15:9"),
            Err(ParseError::FieldCount(7))
        );
    }

    #[test]
    fn unknown_type_and_waveform() {
        assert!(matches!(
            parse_line("monaural:360:367:sine:1"),
            Err(ParseError::UnknownToneType(_))
        ));
        assert!(matches!(
            parse_line("binaural:360:367:pink:1"),
            Err(ParseError::UnknownWaveform(_))
        ));
    }

    #[test]
    fn non_numeric_fields() {
        assert!(matches!(
            parse_line("binaural:abc:367:sine:1"),
            Err(ParseError::InvalidNumber {
                field: Field::Left,
                ..
            })
        ));
        assert!(matches!(
            parse_line("binaural:360:inf:sine:1"),
            Err(ParseError::InvalidNumber {
                field: Field::RightOrPulse,
                ..
            })
        ));
        assert!(matches!(
            parse_line("binaural:360:367:sine:1.5"),
            Err(ParseError::InvalidNumber {
                field: Field::Duration,
                ..
            })
        ));
        assert!(matches!(
            parse_line("binaural:360:367:sine:1:loud"),
            Err(ParseError::InvalidNumber {
                field: Field::Volume,
                ..
            })
        ));
    }

    #[test]
    fn volume_out_of_range_is_a_parse_failure() {
        assert_eq!(
            parse_line("binaural:360:367:sine:1:120"),
            Err(ParseError::VolumeOutOfRange(120.0))
        );
    }

    #[test]
    fn negative_duration_parses() {
        // Range checks belong to the validator.
        let stage = parse_line("binaural:360:367:sine:-2").unwrap();
        assert_eq!(stage.duration_minutes, -2);
    }
}
