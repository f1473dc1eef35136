//! Command handlers for CLI subcommands.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use safefile::{Artifact, RecoveryAction, SafeFile, SafeFileConfig, SafeFileError, SafetyState};
use serde::Serialize;
use tracing::info;

use crate::cli::{Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands, config: SafeFileConfig) -> Result<()> {
    match command {
        Commands::State { path, format } => {
            let report = cmd_state(&SafeFile::with_config(path, config))?;
            print_state(&report, format)
        }
        Commands::Recover { path } => {
            let summary = cmd_recover(&SafeFile::with_config(path, config))?;
            println!("{}", summary);
            Ok(())
        }
        Commands::Read { path } => {
            let data = SafeFile::with_config(path, config).read()?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
            Ok(())
        }
        Commands::Write { path, input } => {
            let data = read_input(input.as_deref())?;
            cmd_write(&SafeFile::with_config(path, config), &data)
        }
    }
}

/// Maps an error to the process exit status: 2 for validation failures,
/// 1 for everything else.
pub fn exit_code(err: &(dyn std::error::Error + 'static)) -> i32 {
    match err.downcast_ref::<SafeFileError>() {
        Some(e) if e.is_validation() => 2,
        _ => 1,
    }
}

/// Layout of a logical file as shown by the state command.
#[derive(Debug, Serialize)]
pub struct StateReport {
    pub path: PathBuf,
    pub state: SafetyState,
    pub artifacts: Vec<ArtifactEntry>,
}

#[derive(Debug, Serialize)]
pub struct ArtifactEntry {
    pub artifact: Artifact,
    pub path: PathBuf,
}

/// Collects the safety state and present artifacts of a file.
pub fn cmd_state(file: &SafeFile) -> Result<StateReport> {
    let state = file.state();
    let artifacts = if state.is_present() {
        let paths = file.artifacts()?;
        file.layout()?
            .present()
            .into_iter()
            .map(|artifact| ArtifactEntry {
                artifact,
                path: paths.path(artifact).to_path_buf(),
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(StateReport {
        path: file.path().to_path_buf(),
        state,
        artifacts,
    })
}

fn print_state(report: &StateReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}: {}", report.path.display(), report.state);
            for entry in &report.artifacts {
                println!("  {:<10} {}", entry.artifact, entry.path.display());
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Runs recovery and describes what happened.
pub fn cmd_recover(file: &SafeFile) -> Result<String> {
    let report = file.recover()?;
    info!(path = %file.path().display(), action = ?report.action, "recovery finished");

    let mut summary = match report.action {
        RecoveryAction::None => "already consistent".to_string(),
        RecoveryAction::PromotedReady { rotated_base: true } => {
            "committed ready file (previous base kept as backup)".to_string()
        }
        RecoveryAction::PromotedReady {
            rotated_base: false,
        } => "committed ready file".to_string(),
        RecoveryAction::Restored { from } => format!("restored base from {}", from),
        RecoveryAction::NothingSurvived => "no committed content survived".to_string(),
    };
    if report.discarded_ephemeral {
        summary.push_str("; discarded interrupted write");
    }
    Ok(summary)
}

/// Commits `data` through the protected write pipeline.
pub fn cmd_write(file: &SafeFile, data: &[u8]) -> Result<()> {
    file.write(data)?;
    info!(path = %file.path().display(), len = data.len(), "write committed");
    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut data = Vec::new();
            io::stdin().lock().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}
