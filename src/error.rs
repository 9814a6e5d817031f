//! Errors raised before a simulation starts.
//!
//! A run that hits its tick limit is not an error: it is reported through
//! [`crate::ExitKind::TickLimit`] with the partial results attached.

/// Errors from building or loading a scenario.
#[derive(Debug)]
pub enum SimError {
    /// Scheduler configuration out of range (quantum bounds).
    Config(String),
    /// Malformed process definition.
    Validation(String),
    /// Malformed text input.
    Parse(String),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Input file could not be read.
    Io(std::io::Error),
}

impl SimError {
    pub fn is_config(&self) -> bool {
        matches!(self, SimError::Config(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SimError::Validation(_))
    }
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            SimError::Validation(msg) => write!(f, "invalid process: {msg}"),
            SimError::Parse(msg) => write!(f, "parse error: {msg}"),
            SimError::Json(e) => write!(f, "JSON parse error: {e}"),
            SimError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Json(e) => Some(e),
            SimError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Json(e)
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}
