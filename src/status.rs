// src/status.rs
//! Status-object surface
//!
//! Operations exposed across an ABI-stable boundary report their outcome
//! through a status object carrying closed result-code enumerations plus a
//! diagnostic message list, instead of propagating language-native errors.
//! The rich internal API stays `Result`-based; these wrappers fold results
//! into a `Status` for a C-callable layer above it.

use crate::error::{Result, RioError};

/// Overall severity of an operation's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusCode {
    Success,
    Warning,
    Error,
}

/// Closed enumeration detailing the outcome. Values are stable: 0 success,
/// positive warnings, negative errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailCode {
    Success,
    /// A bounded read expired and returned fewer blocks than requested.
    TimeoutWarning,
    ResourceNotFound,
    UnsupportedPlatform,
    UnsupportedDevProfile,
    VersionMismatch,
    TerminalNotImplemented,
    ModulesNotReady,
    InitializationTimeout,
    UnsupportedFrameType,
    DmaBudgetExceeded,
    DmaNotArmed,
    DrainStalled,
    DriverError,
}

impl DetailCode {
    /// Stable numeric value for the C surface.
    pub const fn value(self) -> i32 {
        match self {
            DetailCode::Success => 0,
            DetailCode::TimeoutWarning => 1,
            DetailCode::ResourceNotFound => -1,
            DetailCode::UnsupportedPlatform => -2,
            DetailCode::UnsupportedDevProfile => -3,
            DetailCode::VersionMismatch => -4,
            DetailCode::TerminalNotImplemented => -5,
            DetailCode::ModulesNotReady => -6,
            DetailCode::InitializationTimeout => -7,
            DetailCode::UnsupportedFrameType => -8,
            DetailCode::DmaBudgetExceeded => -9,
            DetailCode::DmaNotArmed => -10,
            DetailCode::DrainStalled => -11,
            DetailCode::DriverError => -12,
        }
    }

    fn for_error(err: &RioError) -> Self {
        match err {
            RioError::ResourceNotFound(_) => DetailCode::ResourceNotFound,
            RioError::UnsupportedPlatform(_) => DetailCode::UnsupportedPlatform,
            RioError::UnsupportedDevProfile { .. } => DetailCode::UnsupportedDevProfile,
            RioError::VersionMismatch { .. } => DetailCode::VersionMismatch,
            RioError::TerminalNotImplemented(_) => DetailCode::TerminalNotImplemented,
            RioError::ModulesNotReady => DetailCode::ModulesNotReady,
            RioError::InitializationTimeout(_) => DetailCode::InitializationTimeout,
            RioError::UnsupportedFrameType { .. } => DetailCode::UnsupportedFrameType,
            RioError::DmaBudgetExceeded { .. } => DetailCode::DmaBudgetExceeded,
            RioError::DmaNotArmed => DetailCode::DmaNotArmed,
            RioError::DrainStalled { .. } => DetailCode::DrainStalled,
            RioError::Driver(_) => DetailCode::DriverError,
        }
    }
}

/// Outcome of one operation: severity, detail and accumulated diagnostics.
#[derive(Debug, Clone)]
pub struct Status {
    pub code: StatusCode,
    pub detail: DetailCode,
    pub messages: Vec<String>,
}

impl Default for Status {
    fn default() -> Self {
        Self::success()
    }
}

impl Status {
    pub fn success() -> Self {
        Self {
            code: StatusCode::Success,
            detail: DetailCode::Success,
            messages: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == StatusCode::Success
    }

    pub fn is_warning(&self) -> bool {
        self.code == StatusCode::Warning
    }

    pub fn is_error(&self) -> bool {
        self.code == StatusCode::Error
    }

    /// Record a warning. Never downgrades an error.
    pub fn add_warning(&mut self, detail: DetailCode, message: impl Into<String>) {
        self.messages.push(message.into());
        if self.code < StatusCode::Warning {
            self.code = StatusCode::Warning;
            self.detail = detail;
        }
    }

    /// Record a failure from the rich error type.
    pub fn set_error(&mut self, err: &RioError) {
        self.messages.push(err.to_string());
        self.code = StatusCode::Error;
        self.detail = DetailCode::for_error(err);
    }
}

/// Run a read-style operation, folding its result into `status`. Returns the
/// value on success, `None` on failure.
pub fn get_operation<T>(status: &mut Status, op: impl FnOnce() -> Result<T>) -> Option<T> {
    match op() {
        Ok(value) => Some(value),
        Err(err) => {
            status.set_error(&err);
            None
        }
    }
}

/// Run a write-style operation, folding its result into `status`.
pub fn set_operation(status: &mut Status, op: impl FnOnce() -> Result<()>) {
    if let Err(err) = op() {
        status.set_error(&err);
    }
}

/// Run a bounded block read. A short read is reported as a timeout warning,
/// per the streaming contract; the partial count is still returned.
pub fn read_operation(
    status: &mut Status,
    requested_blocks: usize,
    op: impl FnOnce() -> Result<usize>,
) -> usize {
    match op() {
        Ok(read) => {
            if read < requested_blocks {
                status.add_warning(
                    DetailCode::TimeoutWarning,
                    format!("read {read} of {requested_blocks} requested blocks"),
                );
            }
            read
        }
        Err(err) => {
            status.set_error(&err);
            0
        }
    }
}
