//! Session compiler: scans a text buffer into a playable [`Session`].
//!
//! Each stage line is parsed, then validated. Lines that fail to parse are
//! skipped silently; lines that fail validation are dropped and reported as
//! diagnostics. Neither aborts the batch.

use log::{debug, warn};

use crate::stage::{Session, StageDescriptor};

use super::error::{CompileError, Diagnostic};
use super::locate::is_stage_line;
use super::parser::parse_line;
use super::validate::{validate_line, DurationPolicy};

/// The result of compiling session text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSession {
    pub session: Session,
    /// Validation failures, in line order.
    pub diagnostics: Vec<Diagnostic>,
    /// 1-based numbers of stage lines that failed to parse.
    pub skipped_lines: Vec<usize>,
}

impl CompiledSession {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Aggregated warning text, or `None` when every parsed line was valid.
    pub fn summary(&self) -> Option<String> {
        diagnostics_summary(&self.diagnostics)
    }
}

/// Join diagnostics into one warning block.
pub fn diagnostics_summary(diagnostics: &[Diagnostic]) -> Option<String> {
    if diagnostics.is_empty() {
        return None;
    }
    let lines: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
    Some(format!("Some lines had errors:\n{}", lines.join("\n")))
}

/// Parse and validate a single trimmed stage line.
pub(crate) fn accept_line(
    line: &str,
    line_no: usize,
    policy: DurationPolicy,
) -> Result<Option<StageDescriptor>, Diagnostic> {
    let stage = match parse_line(line) {
        Ok(stage) => stage,
        Err(e) => {
            debug!("line {line_no}: skipped ({e})");
            return Ok(None);
        }
    };
    validate_line(&stage, line_no, policy)?;
    Ok(Some(stage))
}

/// Compile a full text buffer under the given duration policy.
pub fn compile_session(
    source: &str,
    policy: DurationPolicy,
) -> Result<CompiledSession, CompileError> {
    let mut stages = Vec::new();
    let mut diagnostics = Vec::new();
    let mut skipped_lines = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        if !is_stage_line(raw) {
            continue;
        }
        let line_no = idx + 1;

        match accept_line(raw.trim(), line_no, policy) {
            Ok(Some(stage)) => stages.push(stage),
            Ok(None) => skipped_lines.push(line_no),
            Err(diagnostic) => {
                warn!("{diagnostic}");
                diagnostics.push(diagnostic);
            }
        }
    }

    if stages.is_empty() {
        return Err(CompileError::NoValidStages {
            diagnostics,
            skipped_lines,
        });
    }

    let session = Session::new(stages);
    debug!(
        "compiled {} stage(s), {} s total",
        session.len(),
        session.total_seconds()
    );

    Ok(CompiledSession {
        session,
        diagnostics,
        skipped_lines,
    })
}
