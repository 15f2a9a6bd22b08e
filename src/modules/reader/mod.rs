//! Reader-facing pages: catalog index, search, book detail.
//!
//! Every catalog page sits behind the login gate: the [`SessionUser`]
//! extractor redirects anonymous callers before a handler, and therefore any
//! store access, runs.

pub mod view;


use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        FromRef, Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use libris_authz::{SessionUser, Sessions, UserIdentity};
use libris_kernel::{InitCtx, Module};
use serde::Deserialize;
use serde_json::json;
use tracing::Instrument;

use crate::error::ServiceError;
use crate::modules::catalog::models::{MultiConditions, SearchForm};
use crate::modules::catalog::CatalogService;
use crate::modules::recommend::RecommendService;
use view::{render, View, LOGIN, READER_DETAIL, READER_INDEX};

#[derive(Clone)]
pub struct ReaderState {
    pub catalog: CatalogService,
    pub recommend: RecommendService,
    pub sessions: Sessions,
    pub allow_dev_login: bool,
}

impl FromRef<ReaderState> for Sessions {
    fn from_ref(state: &ReaderState) -> Self {
        state.sessions.clone()
    }
}

pub fn pages(state: ReaderState) -> Router {
    Router::new()
        .route("/reader/index", get(index))
        .route("/reader/search", post(search))
        .route("/reader/advanced-search", get(advanced_search))
        .route("/book/{book_name}/{author}", get(detail))
        .route("/login", get(login_page).post(dev_login))
        .route("/logout", post(logout))
        .with_state(state)
}

async fn index(State(state): State<ReaderState>, SessionUser(user): SessionUser) -> Response {
    let span = tracing::info_span!("reader.index", user_id = %user.user_id);
    let result = index_view(&state, &user).instrument(span.clone()).await;
    span.in_scope(|| render(result, "listing books"))
}

async fn index_view(state: &ReaderState, user: &UserIdentity) -> Result<View, ServiceError> {
    tracing::info!("listing all books");
    let books = state.catalog.list_all().await?;
    let recommendations = state.recommend.list_by_user_id(user.user_id).await?;

    View::new(READER_INDEX)
        .attribute("userDTO", user)?
        .attribute("bookList", &books)?
        .attribute("recommendDTOList", &recommendations)
}

async fn search(
    State(state): State<ReaderState>,
    SessionUser(user): SessionUser,
    headers: HeaderMap,
    form: Result<Form<SearchForm>, FormRejection>,
) -> Response {
    const ACTION: &str = "searching books by title or author";

    let form = match form {
        Ok(Form(form)) => form,
        // A bare POST carries no condition and lists every book
        Err(FormRejection::InvalidFormContentType(_))
            if !headers.contains_key(header::CONTENT_TYPE) =>
        {
            SearchForm::default()
        }
        Err(rejection) => {
            let span = tracing::info_span!("reader.search", user_id = %user.user_id);
            let reason = format!("unreadable search form: {}", rejection.body_text());
            return span.in_scope(|| render(Err(ServiceError::business(reason)), ACTION));
        }
    };

    let condition = form.condition.unwrap_or_default();
    let span = tracing::info_span!("reader.search", user_id = %user.user_id, %condition);

    let result = async {
        tracing::info!("searching by title or author");
        let books = state.catalog.list_by_free_text(Some(&condition)).await?;
        View::new(READER_INDEX)
            .attribute("userDTO", &user)?
            .attribute("bookList", &books)
    }
    .instrument(span.clone())
    .await;

    span.in_scope(|| render(result, ACTION))
}

async fn detail(
    State(state): State<ReaderState>,
    SessionUser(user): SessionUser,
    Path((book_name, author)): Path<(String, String)>,
) -> Response {
    let span = tracing::info_span!(
        "reader.detail",
        user_id = %user.user_id,
        %book_name,
        %author
    );

    let result = async {
        tracing::info!("showing book detail");
        let books = state
            .catalog
            .list_by_name_and_author(&book_name, &author)
            .await?;
        let recommendations = state.recommend.list_by_user_id(user.user_id).await?;
        View::new(READER_DETAIL)
            .attribute("recommendDTOList", &recommendations)?
            .attribute("userDTO", &user)?
            .attribute("bookList", &books)
    }
    .instrument(span.clone())
    .await;

    span.in_scope(|| render(result, "showing book detail"))
}

async fn advanced_search(
    State(state): State<ReaderState>,
    SessionUser(user): SessionUser,
    query: Result<Query<MultiConditions>, QueryRejection>,
) -> Response {
    const ACTION: &str = "multi-condition search";

    let conditions = match query {
        Ok(Query(conditions)) => conditions,
        Err(rejection) => {
            let span = tracing::info_span!("reader.advanced_search", user_id = %user.user_id);
            let reason = format!("unreadable search query: {}", rejection.body_text());
            return span.in_scope(|| render(Err(ServiceError::business(reason)), ACTION));
        }
    };

    let span = tracing::info_span!(
        "reader.advanced_search",
        user_id = %user.user_id,
        publisher = ?conditions.publisher,
        introduction = ?conditions.introduction,
        author = ?conditions.author,
        location = ?conditions.location
    );

    let result = async {
        tracing::info!("searching by publisher, introduction, author and location");
        let books = state.catalog.query_by_multi_conditions(&conditions).await?;
        View::new(READER_INDEX)
            .attribute("userDTO", &user)?
            .attribute("bookList", &books)
    }
    .instrument(span.clone())
    .await;

    span.in_scope(|| render(result, ACTION))
}

async fn login_page() -> View {
    View::new(LOGIN)
}

#[derive(Debug, Deserialize)]
struct DevLoginForm {
    user_id: i64,
    name: String,
    #[serde(default)]
    admin: bool,
}

/// Opens a session without checking credentials. Disabled unless
/// `auth.allow_dev_login` is set.
async fn dev_login(State(state): State<ReaderState>, Form(form): Form<DevLoginForm>) -> Response {
    if !state.allow_dev_login {
        return StatusCode::NOT_FOUND.into_response();
    }

    let identity = if form.admin {
        UserIdentity::admin(form.user_id, form.name)
    } else {
        UserIdentity::reader(form.user_id, form.name)
    };

    match state.sessions.open(&identity).await {
        Ok(id) => (
            [(header::SET_COOKIE, state.sessions.cookie(id))],
            Redirect::to("/reader/index"),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = ?err, "failed to open session");
            view::error_view()
        }
    }
}

async fn logout(State(state): State<ReaderState>, headers: HeaderMap) -> Response {
    if let Err(err) = state.sessions.close(&headers).await {
        tracing::warn!(error = %err, "failed to drop session on logout");
    }

    (
        [(header::SET_COOKIE, state.sessions.expired_cookie())],
        Redirect::to(state.sessions.login_path()),
    )
        .into_response()
}

/// Reader pages module; contributes root-level routes only
pub struct ReaderModule {
    state: ReaderState,
}

impl ReaderModule {
    pub fn new(state: ReaderState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for ReaderModule {
    fn name(&self) -> &'static str {
        "reader"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.state.allow_dev_login {
            tracing::warn!(
                module = self.name(),
                environment = ?ctx.settings.environment,
                "development login is enabled"
            );
        }
        tracing::info!(module = self.name(), "reader module initialized");
        Ok(())
    }

    fn pages(&self) -> Router {
        pages(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let view = json!({
            "description": "Rendered view",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/View" }
                }
            }
        });
        let redirect = json!({ "description": "No logged-in session; redirect to the login page" });
        let failure = json!({
            "description": "Generic error view",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/View" }
                }
            }
        });

        Some(json!({
            "x-pages": {
                "/reader/index": {
                    "get": {
                        "summary": "All books and the reader's recommendations",
                        "tags": ["Reader"],
                        "responses": { "200": view, "303": redirect, "500": failure }
                    }
                },
                "/reader/search": {
                    "post": {
                        "summary": "Search books by title or author",
                        "tags": ["Reader"],
                        "requestBody": {
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "condition": { "type": "string" } }
                                    }
                                }
                            }
                        },
                        "responses": { "200": view, "303": redirect, "500": failure }
                    }
                },
                "/reader/advanced-search": {
                    "get": {
                        "summary": "Search by publisher, introduction, author and location",
                        "tags": ["Reader"],
                        "responses": { "200": view, "303": redirect, "500": failure }
                    }
                },
                "/book/{book_name}/{author}": {
                    "get": {
                        "summary": "Book detail by title and author",
                        "tags": ["Reader"],
                        "parameters": [
                            {
                                "name": "book_name", "in": "path", "required": true,
                                "schema": { "type": "string" }
                            },
                            {
                                "name": "author", "in": "path", "required": true,
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": { "200": view, "303": redirect, "500": failure }
                    }
                }
            },
            "components": {
                "schemas": {
                    "View": {
                        "type": "object",
                        "properties": {
                            "view": { "type": "string" },
                            "model": { "type": "object" }
                        },
                        "required": ["view", "model"]
                    }
                }
            }
        }))
    }
}

/// Create a new instance of the reader module
pub fn create_module(state: ReaderState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ReaderModule::new(state))
}
