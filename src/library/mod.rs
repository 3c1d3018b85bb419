//! Session library: session text files on disk.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::dsl::{compile_session, CompileError, CompiledSession, DurationPolicy};

/// Extension given to saved sessions that lack a recognised one.
pub const SESSION_EXTENSION: &str = "bsession";
/// Extensions recognised as session files.
pub const SESSION_EXTENSIONS: [&str; 2] = [SESSION_EXTENSION, "txt"];

/// Template written for a new session.
pub const STARTER_SESSION: &str = "\
# TYPE:LEFT:RIGHT:WAVE:DURATION(min)[:VOLUME(%)]
# ISOCHRONIC: the RIGHT field is the pulse frequency (Hz).
# Volume is optional (0-100%, default 15%).

# Alpha (7 Hz beat)
binaural:360:367:sine:10:15
# Focus (333 Hz carrier + 10 Hz pulse)
isochronic:333:10:square:5:15
# Relaxation (432 Hz mono)
generator:432:432:sine:3:15
";

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> LibraryError + '_ {
    move |source| LibraryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn has_session_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SESSION_EXTENSIONS.contains(&e))
}

/// Append `.bsession` unless the name already ends in a session extension.
pub fn with_session_extension(path: &Path) -> PathBuf {
    if has_session_extension(path) {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(SESSION_EXTENSION);
    PathBuf::from(name)
}

/// Read a session file and compile it.
pub fn load_session(
    path: &Path,
    policy: DurationPolicy,
) -> Result<(String, CompiledSession), LibraryError> {
    let text = std::fs::read_to_string(path).map_err(io_err(path))?;
    let compiled = compile_session(&text, policy).map_err(|source| LibraryError::Compile {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "loaded {} stage(s) from {}",
        compiled.session.len(),
        path.display()
    );
    Ok((text, compiled))
}

/// Write session text to disk, refusing text with no valid stage.
///
/// Returns the path actually written, which may carry an added extension.
pub fn save_session(
    path: &Path,
    text: &str,
    policy: DurationPolicy,
) -> Result<PathBuf, LibraryError> {
    let target = with_session_extension(path);
    compile_session(text, policy).map_err(|source| LibraryError::Compile {
        path: target.clone(),
        source,
    })?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    std::fs::write(&target, text).map_err(io_err(&target))?;
    log::info!("session saved to {}", target.display());
    Ok(target)
}

/// Session files in `dir`, sorted by path. A missing directory is empty.
pub fn list_sessions(dir: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
        let path = entry.map_err(io_err(dir))?.path();
        if path.is_file() && has_session_extension(&path) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}
