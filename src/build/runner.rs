use crate::error::{GitFlowError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

/// A local command line: program, arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Run the command inside `dir`
    pub fn in_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output carrying `stdout`
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandOutput {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with exit code 1 and `stderr`
    pub fn failed(stderr: impl Into<String>) -> Self {
        CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Local process execution.
///
/// A non-zero exit is reported through [`CommandOutput::success`], not as an
/// error; `Err` means the process could not be started at all.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands with `std::process::Command`, blocking until they exit
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!(command = %command, "running");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output()?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command and turn a spawn failure or non-zero exit into a build error
pub fn run_checked(runner: &dyn CommandRunner, command: &CommandSpec) -> Result<CommandOutput> {
    let output = runner
        .run(command)
        .map_err(|e| GitFlowError::build(format!("Failed to execute '{}': {}", command, e)))?;

    if !output.success() {
        return Err(GitFlowError::build(format!(
            "'{}' failed with exit code {}\nStdout: {}\nStderr: {}",
            command,
            output.code.unwrap_or(-1),
            output.stdout.trim_end(),
            output.stderr.trim_end()
        )));
    }

    Ok(output)
}

type Handler = Box<dyn Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync>;

/// Test runner that records every command and answers from a handler
pub struct ScriptedRunner {
    handler: Handler,
    commands: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        ScriptedRunner {
            handler: Box::new(handler),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Runner where every command succeeds with empty output
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(CommandOutput::ok("")))
    }

    /// Commands run so far, in order
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }

    /// Commands run so far rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.commands().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command.clone());
        }
        (self.handler)(command)
    }
}
