//! External process execution.
//!
//! Every git interaction in this crate goes through [`Shell`], which runs
//! commands against one working directory and reports results three ways:
//! exit code only ([`Shell::call`]), success-or-failure ([`Shell::check_call`]),
//! and captured standard output ([`Shell::check_output`]).
//!
//! Configuration is an explicit [`ShellConfig`] passed at construction; there
//! are no process-wide defaults.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::error::{Error, Result};

/// Configuration for a [`Shell`].
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Working directory for every spawned command.
    pub workdir: PathBuf,
    /// Extra environment variables set for every spawned command.
    pub env: Vec<(String, String)>,
}

impl ShellConfig {
    /// Config with the given working directory and no extra environment.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            env: Vec::new(),
        }
    }
}

/// Runner for external commands in a fixed working directory.
#[derive(Debug)]
pub struct Shell {
    config: ShellConfig,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }

    /// The working directory commands run in.
    pub fn workdir(&self) -> &Path {
        &self.config.workdir
    }

    /// Run a command and return its exit code. Only failing to spawn is an
    /// error; a non-zero exit is a normal return.
    pub fn call(&self, program: &str, args: &[&str]) -> Result<i32> {
        let output = self.run(program, args)?;
        Ok(exit_code(&output))
    }

    /// Run a command, requiring a zero exit code.
    pub fn check_call(&self, program: &str, args: &[&str]) -> Result<()> {
        let output = self.run(program, args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(command_failed(program, args, &output))
        }
    }

    /// Run a command, requiring a zero exit code, and return its captured
    /// standard output. On failure the error still carries the captured
    /// output.
    pub fn check_output(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = self.run(program, args)?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(command_failed(program, args, &output))
        }
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        debug!(
            command = %render_command(program, args),
            workdir = %self.config.workdir.display(),
            "running command"
        );
        let mut command = Command::new(program);
        command.args(args).current_dir(&self.config.workdir);
        for (key, value) in &self.config.env {
            command.env(key, value);
        }
        Ok(command.output()?)
    }
}

fn exit_code(output: &Output) -> i32 {
    // Signal-terminated processes have no code; fold them into -1.
    output.status.code().unwrap_or(-1)
}

fn command_failed(program: &str, args: &[&str], output: &Output) -> Error {
    Error::CommandFailed {
        command: render_command(program, args),
        code: exit_code(output),
        output: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

fn render_command(program: &str, args: &[&str]) -> String {
    let mut rendered = String::from(program);
    for arg in args {
        rendered.push(' ');
        if arg.contains(char::is_whitespace) {
            rendered.push('\'');
            rendered.push_str(arg);
            rendered.push('\'');
        } else {
            rendered.push_str(arg);
        }
    }
    rendered
}
