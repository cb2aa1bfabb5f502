use crate::error::AppError;

/// Logs a failed operation where it surfaces and passes the error on.
pub trait LogErr<T> {
    fn log_err(self, op: &'static str) -> Result<T, AppError>;
}

impl<T> LogErr<T> for Result<T, AppError> {
    fn log_err(self, op: &'static str) -> Result<T, AppError> {
        self.inspect_err(|e| match e {
            AppError::Store(_) => tracing::error!(error = %e, op, "store failure"),
            _ => tracing::debug!(error = %e, op, "rejected"),
        })
    }
}
