pub mod service;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, State},
    routing::get,
    Json, Router,
};
use libris_authz::{LoginRequired, SessionUser, Sessions};
use libris_db::Recommendation;
use libris_http::error::AppError;
use libris_kernel::{InitCtx, Module};
use serde_json::json;

pub use service::RecommendService;

#[derive(Clone)]
pub struct RecommendState {
    pub recommend: RecommendService,
    pub sessions: Sessions,
}

impl FromRef<RecommendState> for Sessions {
    fn from_ref(state: &RecommendState) -> Self {
        state.sessions.clone()
    }
}

/// Recommendations for the logged-in reader
pub struct RecommendModule {
    state: RecommendState,
}

impl RecommendModule {
    pub fn new(state: RecommendState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for RecommendModule {
    fn name(&self) -> &'static str {
        "recommend"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "recommend module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/me", get(my_recommendations))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/me": {
                    "get": {
                        "summary": "Recommendations for the session user",
                        "tags": ["Recommendations"],
                        "responses": {
                            "200": {
                                "description": "Recommended books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": {
                                                "$ref": "#/components/schemas/Recommendation"
                                            }
                                        }
                                    }
                                }
                            },
                            "401": {
                                "description": "No logged-in session",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Recommendation": {
                        "type": "object",
                        "properties": {
                            "user_id": { "type": "integer", "format": "int64" },
                            "book_id": { "type": "integer", "format": "int64" },
                            "book_name": { "type": "string" },
                            "author": { "type": "string" }
                        },
                        "required": ["user_id", "book_id", "book_name", "author"]
                    }
                }
            }
        }))
    }
}

async fn my_recommendations(
    State(state): State<RecommendState>,
    user: Result<SessionUser, LoginRequired>,
) -> Result<Json<Vec<Recommendation>>, AppError> {
    let SessionUser(user) = user.map_err(|_| AppError::unauthorized("login required"))?;
    Ok(Json(state.recommend.list_by_user_id(user.user_id).await?))
}

/// Create a new instance of the recommend module
pub fn create_module(state: RecommendState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(RecommendModule::new(state))
}
