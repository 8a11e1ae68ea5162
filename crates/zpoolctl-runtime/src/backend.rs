use crate::config::BackendConfig;
use crate::device::ParentDeviceLookup;
use crate::platform::Platform;
use crate::RuntimeError;
use serde::{Deserialize, Serialize};

/// Captured result of one `zpool` invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Turn a non-zero exit into [`RuntimeError::CommandFailed`].
    pub fn into_result(self, args: &[String]) -> Result<String, RuntimeError> {
        if self.success {
            return Ok(self.stdout);
        }
        Err(RuntimeError::CommandFailed {
            command: format!("zpool {}", args.join(" ")),
            status: self
                .code
                .map_or_else(|| "killed by signal".to_owned(), |c| format!("exit {c}")),
            stderr: self.stderr.trim().to_owned(),
        })
    }
}

/// Executes `zpool(8)` and the auxiliary device lookup.
pub trait ZpoolBackend: ParentDeviceLookup {
    fn name(&self) -> &str;

    /// Platform whose reporting conventions the backend's output follows.
    fn platform(&self) -> Platform;

    /// Run `zpool` with `args`. A non-zero exit is reported in the returned
    /// output, not as an error; only a failure to spawn is an error.
    fn run(&self, args: &[String]) -> Result<CommandOutput, RuntimeError>;

    /// Run `zpool` with `args` and fail on a non-zero exit.
    fn zpool(&self, args: &[String]) -> Result<String, RuntimeError> {
        self.run(args)?.into_result(args)
    }
}

pub fn select_backend(
    name: &str,
    config: &BackendConfig,
) -> Result<Box<dyn ZpoolBackend>, RuntimeError> {
    match name {
        "system" => Ok(Box::new(crate::system::SystemBackend::new(config.clone()))),
        "mock" => Ok(Box::new(crate::mock::MockBackend::with_platform(
            config.platform(),
        ))),
        other => Err(RuntimeError::BackendUnavailable(other.to_owned())),
    }
}
