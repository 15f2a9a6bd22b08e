use libris_db::StoreError;
use libris_http::error::AppError;
use thiserror::Error;

/// Failure of a catalog or recommendation operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Expected condition such as invalid input or a violated constraint.
    #[error("{0}")]
    Business(String),

    /// Unexpected failure, typically an unreachable store.
    #[error(transparent)]
    System(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn business(message: impl Into<String>) -> Self {
        Self::Business(message.into())
    }

    pub fn is_business(&self) -> bool {
        matches!(self, Self::Business(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(message) => Self::Business(message),
            unavailable @ StoreError::Unavailable(_) => {
                Self::System(anyhow::Error::new(unavailable))
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Business(message) => AppError::bad_request(message),
            ServiceError::System(err) => AppError::Internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn constraint_violations_are_business_failures() {
        let err = ServiceError::from(StoreError::Constraint("duplicate isbn".to_string()));
        assert!(err.is_business());
        assert_eq!(AppError::from(err).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn outages_are_system_failures() {
        let err = ServiceError::from(StoreError::Unavailable("connection refused".to_string()));
        assert!(!err.is_business());
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(
            AppError::from(err).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
