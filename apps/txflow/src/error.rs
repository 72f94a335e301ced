//! CLI error handling

use std::fmt;

use txflow_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(txflow_errors::Error),
    /// Engine or plan error
    Transaction(txflow_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// The engine error behind this failure, if there is one
    pub fn engine_error(&self) -> Option<&txflow_errors::Error> {
        match self {
            CliError::Config(e) | CliError::Transaction(e) => Some(e),
            CliError::InvalidArguments(_) | CliError::Io(_) => None,
        }
    }
}

fn write_user_facing(f: &mut fmt::Formatter<'_>, e: &txflow_errors::Error) -> fmt::Result {
    write!(f, "{}", e.user_message())?;
    if let Some(code) = e.user_code() {
        write!(f, "\n  Code: {code}")?;
    }
    if let Some(hint) = e.user_hint() {
        write!(f, "\n  Hint: {hint}")?;
    }
    if e.is_retryable() {
        write!(f, "\n  Retry: safe to retry this transaction.")?;
    }
    Ok(())
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: ")?;
                write_user_facing(f, e)
            }
            CliError::Transaction(e) => write_user_facing(f, e),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Transaction(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<txflow_errors::Error> for CliError {
    fn from(e: txflow_errors::Error) -> Self {
        match e {
            txflow_errors::Error::Config(_) => CliError::Config(e),
            other => CliError::Transaction(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txflow_errors::{ConfigError, TransactionError};

    #[test]
    fn test_transaction_error_shows_code() {
        let err: CliError = txflow_errors::Error::from(TransactionError::AlreadyRun).into();
        let text = err.to_string();
        assert!(text.contains("Code: transaction.already_run"));
        assert!(text.contains("Hint:"));
    }

    #[test]
    fn test_config_errors_are_kept_apart() {
        let err: CliError = txflow_errors::Error::from(ConfigError::InvalidValue {
            field: "TXFLOW_COLOR".into(),
            value: "sometimes".into(),
        })
        .into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error: "));
    }
}
