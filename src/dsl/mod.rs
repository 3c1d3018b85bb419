//! Session DSL: text lines → stage descriptors → validated session.

pub mod compile;
pub mod error;
pub mod locate;
pub mod parser;
pub mod validate;

pub use compile::{compile_session, diagnostics_summary, CompiledSession};
pub use error::{CompileError, Diagnostic, Field, ParseError, ValidationError};
pub use locate::{is_stage_line, locate_line, locate_line_with};
pub use parser::parse_line;
pub use validate::{validate_stage, DurationPolicy};

use compile::accept_line;

/// The session compiler, bound to a duration policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCompiler {
    policy: DurationPolicy,
}

impl SessionCompiler {
    pub fn new(policy: DurationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    /// Parse and validate session text into a [`CompiledSession`].
    pub fn compile(&self, source: &str) -> Result<CompiledSession, CompileError> {
        compile_session(source, self.policy)
    }

    /// Physical line (0-based) of the `index`-th stage this compiler accepts.
    ///
    /// Lines that fail to parse or validate are skipped, so the index lines
    /// up with positions in the compiled session.
    pub fn locate(&self, source: &str, index: usize) -> Option<usize> {
        locate_line_with(source, index, |line| {
            matches!(accept_line(line, 0, self.policy), Ok(Some(_)))
        })
    }
}
