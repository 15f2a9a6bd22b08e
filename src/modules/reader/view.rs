//! View-model rendering for reader pages.
//!
//! A page answers with a view name and a model of named attributes, encoded
//! as `{"view": ..., "model": {...}}`. Every failure renders the same bare
//! `error` view.

use anyhow::Context;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ServiceError;

pub const READER_INDEX: &str = "reader_index";
pub const READER_DETAIL: &str = "reader_detail";
pub const LOGIN: &str = "login";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, Serialize)]
pub struct View {
    view: &'static str,
    model: serde_json::Map<String, serde_json::Value>,
}

impl View {
    pub fn new(name: &'static str) -> Self {
        Self {
            view: name,
            model: serde_json::Map::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.view
    }

    /// Add a model attribute.
    pub fn attribute<T: Serialize + ?Sized>(
        mut self,
        key: &str,
        value: &T,
    ) -> Result<Self, ServiceError> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("failed to encode view attribute '{key}'"))?;
        self.model.insert(key.to_string(), value);
        Ok(self)
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// The generic failure page. Carries no model.
pub fn error_view() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(View::new(ERROR))).into_response()
}

/// Render `result`, logging failures by kind before hiding them behind the
/// error view.
pub fn render(result: Result<View, ServiceError>, action: &str) -> Response {
    match result {
        Ok(view) => view.into_response(),
        Err(ServiceError::Business(reason)) => {
            tracing::warn!(%reason, "{action} failed");
            error_view()
        }
        Err(ServiceError::System(err)) => {
            tracing::error!(error = ?err, "{action} failed");
            error_view()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_are_kept_by_name() {
        let view = View::new(READER_INDEX)
            .attribute("bookList", &vec!["Dune"])
            .unwrap();
        let encoded = serde_json::to_value(&view).unwrap();
        assert_eq!(encoded["view"], "reader_index");
        assert_eq!(encoded["model"]["bookList"][0], "Dune");
    }

    #[test]
    fn failures_render_the_error_view() {
        let response = render(Err(ServiceError::business("no such shelf")), "test");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = render(Err(anyhow::anyhow!("socket closed").into()), "test");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
