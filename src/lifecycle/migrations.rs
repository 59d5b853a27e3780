//! Startup migration hook.
//!
//! # Responsibilities
//! - Launch the external migration tool with an "upgrade to latest" command
//! - Capture its stdout/stderr
//! - Report success as a boolean; never propagate a failure
//!
//! # Design Decisions
//! - Process launching sits behind [`CommandRunner`] so the hook is testable
//!   without spawning anything
//! - Fully synchronous; callers on the async runtime move it to the
//!   blocking pool

use std::io;
use std::process::Command;

use crate::config::MigrationConfig;

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment for the child, e.g. `DATABASE_URL`.
    pub envs: Vec<(String, String)>,
}

impl MigrationCommand {
    /// Command from config, exporting the database URL to the child.
    pub fn from_config(config: &MigrationConfig, database_url: &str) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            envs: vec![("DATABASE_URL".to_string(), database_url.to_string())],
        }
    }

    /// Program and arguments joined for log output. Environment is left out
    /// because it carries credentials.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Exit status and captured streams of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a command to completion.
pub trait CommandRunner {
    fn run(&self, command: &MigrationCommand) -> io::Result<CommandOutput>;
}

/// Spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &MigrationCommand) -> io::Result<CommandOutput> {
        let output = Command::new(&command.program)
            .args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k, v)))
            .output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Apply pending migrations. Returns `true` on a zero exit status and
/// `false` on any other exit status or launch error.
pub fn run_migrations(runner: &dyn CommandRunner, command: &MigrationCommand) -> bool {
    tracing::info!(command = %command.display(), "Running database migrations");

    match runner.run(command) {
        Ok(output) if output.success => {
            if !output.stdout.trim().is_empty() {
                tracing::info!(output = %output.stdout.trim(), "Migration output");
            }
            tracing::info!("Migrations completed successfully");
            true
        }
        Ok(output) => {
            tracing::error!(code = ?output.code, "Migration failed");
            tracing::error!(stdout = %output.stdout.trim(), "Migration standard output");
            tracing::error!(stderr = %output.stderr.trim(), "Migration standard error");
            false
        }
        Err(e) => {
            tracing::error!(command = %command.display(), error = %e, "An error occurred while running migrations");
            false
        }
    }
}
