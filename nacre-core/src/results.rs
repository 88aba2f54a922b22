//! Encapsulation of execution results.

/// Represents the result of executing a line, a pipeline, or a single command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The control flow transition to apply after execution.
    pub next_control_flow: ExecutionControlFlow,
    /// The exit code resulting from execution.
    pub exit_code: ExecutionExitCode,
}

impl ExecutionResult {
    /// Returns a new `ExecutionResult` with the given exit code.
    ///
    /// # Arguments
    ///
    /// * `exit_code` - The exit code of the command.
    pub fn new(exit_code: u8) -> Self {
        Self {
            exit_code: exit_code.into(),
            ..Self::default()
        }
    }

    /// Returns a new `ExecutionResult` with an exit code of 0.
    pub const fn success() -> Self {
        Self {
            next_control_flow: ExecutionControlFlow::Normal,
            exit_code: ExecutionExitCode::Success,
        }
    }

    /// Returns a new `ExecutionResult` with a general error exit code.
    pub const fn general_error() -> Self {
        Self {
            next_control_flow: ExecutionControlFlow::Normal,
            exit_code: ExecutionExitCode::GeneralError,
        }
    }

    /// Returns a new `ExecutionResult` requesting that the shell exit with the given code.
    ///
    /// # Arguments
    ///
    /// * `exit_code` - The code the shell should exit with.
    pub fn exit_shell(exit_code: u8) -> Self {
        Self {
            next_control_flow: ExecutionControlFlow::ExitShell,
            exit_code: exit_code.into(),
        }
    }

    /// Returns whether the shell was asked to exit.
    pub const fn is_exit(&self) -> bool {
        matches!(self.next_control_flow, ExecutionControlFlow::ExitShell)
    }
}

impl From<ExecutionExitCode> for ExecutionResult {
    fn from(exit_code: ExecutionExitCode) -> Self {
        Self {
            next_control_flow: ExecutionControlFlow::Normal,
            exit_code,
        }
    }
}

/// Represents an exit code from execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionExitCode {
    /// Indicates successful execution.
    #[default]
    Success,
    /// Indicates a general error.
    GeneralError,
    /// Indicates invalid usage.
    InvalidUsage,
    /// Cannot execute the command.
    CannotExecute,
    /// Indicates a command or similar item was not found.
    NotFound,
    /// Indicates execution was interrupted.
    Interrupted,
    /// Indicates execution was terminated by a quit signal.
    Quit,
    /// A custom exit code.
    Custom(u8),
}

impl From<u8> for ExecutionExitCode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::GeneralError,
            2 => Self::InvalidUsage,
            126 => Self::CannotExecute,
            127 => Self::NotFound,
            130 => Self::Interrupted,
            131 => Self::Quit,
            code => Self::Custom(code),
        }
    }
}

impl From<ExecutionExitCode> for u8 {
    fn from(code: ExecutionExitCode) -> Self {
        match code {
            ExecutionExitCode::Success => 0,
            ExecutionExitCode::GeneralError => 1,
            ExecutionExitCode::InvalidUsage => 2,
            ExecutionExitCode::CannotExecute => 126,
            ExecutionExitCode::NotFound => 127,
            ExecutionExitCode::Interrupted => 130,
            ExecutionExitCode::Quit => 131,
            ExecutionExitCode::Custom(code) => code,
        }
    }
}

/// Represents a control flow transition to apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionControlFlow {
    /// Continue normal execution.
    #[default]
    Normal,
    /// Exit the shell.
    ExitShell,
}
