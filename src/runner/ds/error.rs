use thiserror::Error;

/// Errors raised while dispatching or running a method.
///
/// The first three variants are raised by the dispatcher itself. The rest come
/// from inside a resolved implementation and are passed through untouched.
#[derive(Debug, Error)]
pub enum UnderscoreError {
    #[error("Unable to find the class of type \"{0}\"")]
    Classification(String),

    #[error("The method {target}::{method} does not exist")]
    MethodNotFound { target: String, method: String },

    #[error("The method {target}::{method} can't be chained")]
    NonChainable { target: String, method: String },

    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl UnderscoreError {
    pub fn method_not_found(target: impl Into<String>, method: impl Into<String>) -> Self {
        UnderscoreError::MethodNotFound {
            target: target.into(),
            method: method.into(),
        }
    }

    pub fn non_chainable(target: impl Into<String>, method: impl Into<String>) -> Self {
        UnderscoreError::NonChainable {
            target: target.into(),
            method: method.into(),
        }
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        UnderscoreError::TypeError(msg.into())
    }

    /// Whether this error was raised by the dispatcher rather than a method body.
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            UnderscoreError::Classification(_)
                | UnderscoreError::MethodNotFound { .. }
                | UnderscoreError::NonChainable { .. }
        )
    }
}
