use lambda_runtime::Error as LambdaError;
use thiserror::Error;
use tracing::error;

/// Internal application errors surfaced during event handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required input or configuration is missing. Not retriable.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// An external API call failed; the underlying error detail is kept verbatim.
    #[error("upstream error: {0}")]
    Upstream(String),
    /// An external call succeeded but returned data violating an expected invariant.
    #[error("data error: {0}")]
    Data(String),
}

impl AppError {
    /// Short classification string used for logging.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "configuration",
            AppError::Upstream(_) => "upstream",
            AppError::Data(_) => "data",
        }
    }
}

/// Convert an internal application error into the Lambda runtime error type.
pub fn lambda_error(err: AppError) -> LambdaError {
    let category = err.category();
    let message = err.to_string();
    error!(category = %category, error = ?err, message = %message, "unhandled application error forwarded to Lambda runtime");
    LambdaError::from(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_match_variants() {
        assert_eq!(
            AppError::Configuration("x".into()).category(),
            "configuration"
        );
        assert_eq!(AppError::Upstream("x".into()).category(), "upstream");
        assert_eq!(AppError::Data("x".into()).category(), "data");
    }

    #[test]
    fn display_includes_detail() {
        let err = AppError::Data("no tags returned".into());
        assert_eq!(err.to_string(), "data error: no tags returned");
    }
}
