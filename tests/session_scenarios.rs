//! Session scenarios: compile text, then drive the scheduler with synthetic ticks.

use assert_approx_eq::assert_approx_eq;

use entrain::dsl::{DurationPolicy, SessionCompiler, ValidationError};
use entrain::session::{EndReason, PlayState, SessionEvent, SessionScheduler};
use entrain::stage::{Session, ToneType, Waveform};

fn compile(src: &str) -> Session {
    SessionCompiler::default()
        .compile(src)
        .expect("compile failed")
        .session
}

fn tick_n(scheduler: &mut SessionScheduler, n: usize) -> Vec<SessionEvent> {
    (0..n).flat_map(|_| scheduler.tick()).collect()
}

fn fade_targets(events: &[SessionEvent]) -> Vec<f64> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::FadeRequested { target_volume } => Some(*target_volume),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Field reinterpretation
// =============================================================================

#[test]
fn third_field_meaning_depends_on_tone_type() {
    let session = compile(
        "binaural:360:367.83:sine:1\ngenerator:432:440.5:triangle:2\nisochronic:250:12.5:square:3",
    );
    let stages = session.stages();

    assert_approx_eq!(stages[0].right_frequency(), 367.83);
    assert_approx_eq!(stages[1].right_frequency(), 440.5);

    assert_eq!(stages[2].tone_type(), ToneType::Isochronic);
    assert_approx_eq!(stages[2].right_frequency(), stages[2].left_frequency());
    assert_approx_eq!(stages[2].pulse_frequency(), 12.5);
}

// =============================================================================
// Text round trip
// =============================================================================

#[test]
fn rendered_text_recompiles_to_the_same_stages() {
    let src = "# morning\nBINAURAL:360:367.83:Sine:10\n\nisochronic:333:10:square:5:25\ngenerator:432:432:sawtooth:3:50\nbinaural:200.125:210:triangle:45:0\n";
    let first = compile(src);
    let second = compile(&first.to_text());
    assert_eq!(first, second);
    assert_eq!(first.total_seconds(), second.total_seconds());
}

// =============================================================================
// Stop while idle
// =============================================================================

#[test]
fn stop_when_idle_is_a_no_op() {
    let mut scheduler = SessionScheduler::new();
    assert!(scheduler.stop().is_empty());
    assert!(scheduler.stop().is_empty());
    let state = scheduler.state();
    assert_eq!(state.current_stage, None);
    assert!(!state.is_active());
}

// =============================================================================
// One-minute stage boundary
// =============================================================================

#[test]
fn one_minute_stage_counts_down_over_sixty_ticks() {
    let mut scheduler = SessionScheduler::new();
    scheduler
        .start(compile("binaural:360:367:sine:1\nbinaural:360:367:sine:1"))
        .unwrap();
    assert_eq!(scheduler.state().stage_remaining_seconds, 60);

    for expected in (1..60).rev() {
        scheduler.tick();
        assert_eq!(scheduler.state().stage_remaining_seconds, expected);
        assert_eq!(scheduler.state().current_stage, Some(0));
    }

    // The 60th tick reaches zero and enters stage 2 with the correction applied.
    scheduler.tick();
    assert_eq!(scheduler.state().current_stage, Some(1));
    assert_eq!(scheduler.state().stage_remaining_seconds, 59);
}

// =============================================================================
// Single stage scenario
// =============================================================================

#[test]
fn single_stage_session() {
    let session = compile("binaural:360:367.83:sine:1:15");
    assert_eq!(session.len(), 1);
    let stage = session.stages()[0];
    assert_eq!(stage.tone_type(), ToneType::Binaural);
    assert_approx_eq!(stage.left_frequency(), 360.0);
    assert_approx_eq!(stage.right_frequency(), 367.83);
    assert_eq!(stage.waveform, Waveform::Sine);
    assert_eq!(stage.duration_minutes, 1);
    assert_approx_eq!(stage.volume_percent, 15.0);

    let mut scheduler = SessionScheduler::new();
    let started = scheduler.start(session).unwrap();
    assert_eq!(started[0], SessionEvent::SessionStarted { total_seconds: 60 });
    assert_eq!(scheduler.state().total_remaining_seconds, 60);

    let events = tick_n(&mut scheduler, 55);
    assert_eq!(fade_targets(&events), vec![0.0]);

    let events = tick_n(&mut scheduler, 4);
    assert!(events.is_empty());

    let events = scheduler.tick();
    assert_eq!(
        events,
        vec![SessionEvent::SessionEnded {
            reason: EndReason::Completed
        }]
    );
    assert_eq!(scheduler.play_state(), PlayState::Idle);
    assert_eq!(scheduler.state().current_stage, None);
}

// =============================================================================
// Mixed session scenario
// =============================================================================

#[test]
fn mixed_session_announces_isochronic_stage() {
    let session = compile("binaural:360:367.83:sine:1\nisochronic:200:10:square:1");
    assert_eq!(session.len(), 2);

    let mut scheduler = SessionScheduler::new();
    scheduler.start(session).unwrap();
    let events = tick_n(&mut scheduler, 60);

    let changed = events
        .iter()
        .find_map(|e| match e {
            SessionEvent::StageChanged { index: 1, stage } => Some(*stage),
            _ => None,
        })
        .expect("no stage change at the boundary");
    assert_eq!(changed.tone_type(), ToneType::Isochronic);
    assert_approx_eq!(changed.left_frequency(), 200.0);
    assert_approx_eq!(changed.right_frequency(), 200.0);
    assert_approx_eq!(changed.pulse_frequency(), 10.0);
    assert_approx_eq!(changed.volume_percent, 15.0);

    // Fade out before the boundary, fade in to the new stage's volume after.
    assert_eq!(fade_targets(&events), vec![0.0, 15.0]);
}

// =============================================================================
// Malformed lines
// =============================================================================

#[test]
fn short_line_is_dropped_without_failing() {
    let compiled = SessionCompiler::default()
        .compile("binaural:360:367:sine:1\nbinaural:360:367:sine")
        .unwrap();
    assert_eq!(compiled.session.len(), 1);
    assert!(compiled.diagnostics.is_empty());
    assert_eq!(compiled.skipped_lines, vec![2]);
}

// =============================================================================
// Duration policy
// =============================================================================

#[test]
fn duration_policy_decides_long_stages() {
    let src = "binaural:360:367:sine:50\ngenerator:432:432:sine:1";

    let limited = SessionCompiler::new(DurationPolicy::new(false))
        .compile(src)
        .unwrap();
    assert_eq!(limited.session.len(), 1);
    assert_eq!(limited.diagnostics.len(), 1);
    assert_eq!(limited.diagnostics[0].line, 1);
    assert_eq!(
        limited.diagnostics[0].error,
        ValidationError::DurationTooLong {
            minutes: 50,
            max: 45
        }
    );

    let unlimited = SessionCompiler::new(DurationPolicy::new(true))
        .compile(src)
        .unwrap();
    assert_eq!(unlimited.session.len(), 2);
    assert!(unlimited.diagnostics.is_empty());
    assert_eq!(unlimited.session.total_seconds(), 51 * 60);
}

// =============================================================================
// Pause mid-session
// =============================================================================

#[test]
fn pause_and_resume_keep_total_in_step() {
    let mut scheduler = SessionScheduler::new();
    scheduler
        .start(compile("generator:432:432:sine:1\ngenerator:432:432:sine:2"))
        .unwrap();
    tick_n(&mut scheduler, 30);
    scheduler.pause().unwrap();
    assert!(tick_n(&mut scheduler, 100).is_empty());
    scheduler.resume().unwrap();

    let events = tick_n(&mut scheduler, 30 + 119);
    assert_eq!(
        events.last(),
        Some(&SessionEvent::SessionEnded {
            reason: EndReason::Completed
        })
    );
}
