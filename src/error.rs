use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FoodnsapError {
    #[error("Storage error: {0}")]
    Storage(String),

    /// `remaining` entries are still stored after the failed pass.
    /// `retryable` carries the transience of the executor's own error.
    #[error("Mutation {position} failed during flush ({remaining} still queued): {message}")]
    Executor {
        position: usize,
        remaining: usize,
        retryable: bool,
        message: String,
    },

    #[error("Queue contents could not be decoded: {0}")]
    Serialization(String),

    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),

    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, FoodnsapError>;

impl From<std::io::Error> for FoodnsapError {
    fn from(e: std::io::Error) -> Self {
        FoodnsapError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FoodnsapError {
    fn from(e: serde_json::Error) -> Self {
        FoodnsapError::Json(e.to_string())
    }
}

impl FoodnsapError {
    /// Short machine-readable code, used in log lines and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            FoodnsapError::Storage(_) => "storage_error",
            FoodnsapError::Executor { .. } => "executor_error",
            FoodnsapError::Serialization(_) => "serialization_error",
            FoodnsapError::InvalidMutation(_) => "invalid_mutation",
            FoodnsapError::Remote { .. } => "remote_error",
            FoodnsapError::Config(_) => "config_error",
            FoodnsapError::Json(_) => "json_error",
            FoodnsapError::Io(_) => "io_error",
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FoodnsapError::Storage(_) | FoodnsapError::Io(_) => true,
            FoodnsapError::Executor { retryable, .. } => *retryable,
            FoodnsapError::Remote { status, .. } => *status == 0 || *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
