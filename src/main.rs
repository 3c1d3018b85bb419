//! entrain: compile, inspect, and play multi-stage tone sessions.

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};

use entrain::config::EngineConfig;
use entrain::dsl::{CompileError, CompiledSession, SessionCompiler};
use entrain::library::{self, LibraryError};
use entrain::session::{format_clock, SessionCommand, SessionEvent, SessionRunner, TickSource};

#[derive(Parser)]
#[command(name = "entrain", version, about = "Multi-stage binaural session engine")]
struct Cli {
    /// Allow stages up to 360 minutes instead of 45.
    #[arg(long, global = true)]
    unlimited: bool,
    /// Milliseconds per tick (overrides the config file).
    #[arg(long, global = true)]
    tick_ms: Option<u64>,
    /// Config file to use instead of ~/.entrain/config.yaml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a session file and report its stages and diagnostics.
    Check { file: PathBuf },
    /// Play a session, printing tone and fade notifications.
    Play { file: PathBuf },
    /// Print the source line of the Nth accepted stage (0-based).
    Locate { file: PathBuf, index: usize },
    /// List session files in the session directory.
    List,
    /// Write a starter session file into the session directory.
    New { name: String },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load(),
    };
    config.unlimited_duration |= cli.unlimited;
    if let Some(ms) = cli.tick_ms {
        config.tick_interval_ms = ms;
    }
    Ok(config)
}

/// Resolve a session path, falling back to the session directory.
fn resolve(config: &EngineConfig, file: &Path) -> PathBuf {
    if file.exists() || file.is_absolute() {
        return file.to_path_buf();
    }
    let candidate = config.session_dir().join(file);
    if candidate.exists() {
        candidate
    } else {
        file.to_path_buf()
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(&cli)?;
    let policy = config.duration_policy();

    match &cli.command {
        Command::Check { file } => {
            let (_, compiled) = load_reporting(&resolve(&config, file), &config)?;
            print_stages(&compiled);
        }
        Command::Play { file } => {
            let (_, compiled) = load_reporting(&resolve(&config, file), &config)?;
            print_stages(&compiled);
            play(&config, compiled)?;
        }
        Command::Locate { file, index } => {
            let path = resolve(&config, file);
            let text = std::fs::read_to_string(&path)?;
            match SessionCompiler::new(policy).locate(&text, *index) {
                Some(line) => {
                    let content = text.lines().nth(line).unwrap_or_default();
                    println!("{}: {}", line + 1, content.trim());
                }
                None => return Err(format!("no stage {index} in {}", path.display()).into()),
            }
        }
        Command::List => {
            let dir = config.session_dir();
            for path in library::list_sessions(&dir)? {
                println!("{}", path.display());
            }
        }
        Command::New { name } => {
            let path = config.session_dir().join(name);
            let written = library::save_session(&path, library::STARTER_SESSION, policy)?;
            println!("wrote {}", written.display());
        }
    }
    Ok(())
}

/// Load a session file, printing validation warnings before returning.
fn load_reporting(
    path: &Path,
    config: &EngineConfig,
) -> Result<(String, CompiledSession), Box<dyn Error>> {
    match library::load_session(path, config.duration_policy()) {
        Ok((text, compiled)) => {
            if let Some(summary) = compiled.summary() {
                eprintln!("{summary}");
            }
            Ok((text, compiled))
        }
        Err(LibraryError::Compile {
            source: CompileError::NoValidStages { diagnostics, .. },
            ..
        }) => {
            if let Some(summary) = entrain::dsl::diagnostics_summary(&diagnostics) {
                eprintln!("{summary}");
            }
            Err(format!("no valid stages found in {}", path.display()).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_stages(compiled: &CompiledSession) {
    let session = &compiled.session;
    for (i, stage) in session.stages().iter().enumerate() {
        println!("{:>3}. {}", i + 1, stage);
    }
    println!(
        "{} stage(s), total {}",
        session.len(),
        format_clock(session.total_seconds())
    );
    if !compiled.skipped_lines.is_empty() {
        println!("skipped malformed line(s): {:?}", compiled.skipped_lines);
    }
}

fn play(config: &EngineConfig, compiled: CompiledSession) -> Result<(), Box<dyn Error>> {
    let (runner, updates) = SessionRunner::spawn(TickSource::Internal(config.tick_interval()));

    let stop = runner.sender();
    ctrlc::set_handler(move || {
        let _ = stop.send(SessionCommand::Stop);
    })?;

    runner.start(compiled.session)?;

    let mut stdout = std::io::stdout();
    loop {
        let Some(update) = updates.recv_timeout(Duration::from_millis(250)) else {
            continue;
        };
        for event in &update.events {
            match event {
                SessionEvent::SessionStarted { total_seconds } => {
                    println!("session started ({})", format_clock(*total_seconds));
                }
                SessionEvent::StageChanged { index, stage } => {
                    println!(
                        "\nstage {}: {} L={} R={} pulse={} {} vol={}%",
                        index + 1,
                        stage.tone_type().keyword(),
                        stage.left_frequency(),
                        stage.right_frequency(),
                        stage.pulse_frequency(),
                        stage.waveform.keyword(),
                        stage.volume_percent
                    );
                }
                SessionEvent::FadeRequested { target_volume } => {
                    println!("\nfade to {target_volume}%");
                }
                SessionEvent::PauseRequested => println!("\npaused"),
                SessionEvent::ResumeRequested => println!("\nresumed"),
                SessionEvent::SessionEnded { reason } => {
                    println!("\nsession ended ({reason:?})");
                }
            }
        }
        if update.state.is_active() {
            print!("\r{}", update.status);
            stdout.flush()?;
        }
        if update.events.iter().any(SessionEvent::is_terminal) {
            break;
        }
    }
    Ok(())
}
