//! Catalog administration endpoints, mounted under `/api/catalog`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use libris_authz::{LoginRequired, SessionUser, Sessions, UserIdentity};
use libris_db::{Book, Page};
use libris_http::error::AppError;
use libris_kernel::BookId;
use serde_json::json;

use super::models::MultiConditions;
use super::service::CatalogService;

#[derive(Clone)]
pub struct CatalogApiState {
    pub catalog: CatalogService,
    pub sessions: Sessions,
}

impl axum::extract::FromRef<CatalogApiState> for Sessions {
    fn from_ref(state: &CatalogApiState) -> Self {
        state.sessions.clone()
    }
}

pub fn router(state: CatalogApiState) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/search", get(search_books))
        .route("/books/pages/{page}", get(list_page))
        .route("/books/{id}", axum::routing::put(update_book).delete(delete_book))
        .with_state(state)
}

fn require_admin(user: Result<SessionUser, LoginRequired>) -> Result<UserIdentity, AppError> {
    let SessionUser(identity) = user.map_err(|_| AppError::unauthorized("login required"))?;
    if !identity.is_admin() {
        return Err(AppError::forbidden(
            "catalog administration requires the admin role",
        ));
    }
    Ok(identity)
}

async fn list_books(
    State(state): State<CatalogApiState>,
    user: Result<SessionUser, LoginRequired>,
) -> Result<Json<Vec<Book>>, AppError> {
    require_admin(user)?;
    Ok(Json(state.catalog.list_all().await?))
}

async fn list_page(
    State(state): State<CatalogApiState>,
    user: Result<SessionUser, LoginRequired>,
    Path(page): Path<u32>,
) -> Result<Json<Page<Book>>, AppError> {
    require_admin(user)?;
    Ok(Json(state.catalog.list_all_paged(page).await?))
}

async fn search_books(
    State(state): State<CatalogApiState>,
    user: Result<SessionUser, LoginRequired>,
    Query(conditions): Query<MultiConditions>,
) -> Result<Json<Vec<Book>>, AppError> {
    require_admin(user)?;
    Ok(Json(
        state.catalog.query_by_multi_conditions(&conditions).await?,
    ))
}

async fn create_book(
    State(state): State<CatalogApiState>,
    user: Result<SessionUser, LoginRequired>,
    Json(book): Json<Book>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let admin = require_admin(user)?;
    let id = book.id;

    if !state.catalog.insert(book.clone()).await? {
        return Err(AppError::conflict(
            vec![json!({ "id": id })],
            format!("book {id} already exists"),
        ));
    }

    tracing::info!(book_id = %id, admin = %admin.user_id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(state): State<CatalogApiState>,
    user: Result<SessionUser, LoginRequired>,
    Path(id): Path<i64>,
    Json(book): Json<Book>,
) -> Result<Json<Book>, AppError> {
    require_admin(user)?;
    let id = BookId(id);
    if book.id != id {
        return Err(AppError::bad_request(format!(
            "body id {} does not match path id {}",
            book.id, id
        )));
    }

    if !state.catalog.update_by_id(book.clone()).await? {
        return Err(AppError::not_found(format!("book {id} not found")));
    }
    Ok(Json(book))
}

async fn delete_book(
    State(state): State<CatalogApiState>,
    user: Result<SessionUser, LoginRequired>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_admin(user)?;
    let id = BookId(id);

    if !state.catalog.delete_by_id(id).await? {
        return Err(AppError::not_found(format!("book {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request},
        response::Response,
    };
    use libris_authz::MemorySessionStore;
    use libris_db::MemoryStore;
    use libris_kernel::settings::AuthSettings;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        admin_cookie: String,
        reader_cookie: String,
    }

    async fn harness() -> Harness {
        let store = MemoryStore::new();
        libris_db::BookStore::insert(
            &store,
            Book {
                id: BookId(1),
                name: "Dune".to_string(),
                author: "Herbert".to_string(),
                publisher: "Chilton".to_string(),
                introduction: String::new(),
                location: "A-1".to_string(),
                count: 3,
            },
        )
        .await
        .unwrap();

        let sessions = Sessions::new(Arc::new(MemorySessionStore::new()), &AuthSettings::default());
        let admin = sessions.open(&UserIdentity::admin(1, "Root")).await.unwrap();
        let reader = sessions.open(&UserIdentity::reader(2, "Ada")).await.unwrap();

        Harness {
            app: router(CatalogApiState {
                catalog: CatalogService::new(Arc::new(store), 10),
                sessions: sessions.clone(),
            }),
            admin_cookie: format!("{}={}", sessions.cookie_name(), admin),
            reader_cookie: format!("{}={}", sessions.cookie_name(), reader),
        }
    }

    fn request(
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn new_book(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Hyperion",
            "author": "Simmons",
            "publisher": "Doubleday",
            "location": "C-3",
            "count": 1
        })
    }

    #[tokio::test]
    async fn anonymous_callers_are_unauthorized() {
        let h = harness().await;
        let response = h
            .app
            .oneshot(request(Method::GET, "/books", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn readers_are_forbidden() {
        let h = harness().await;
        let response = h
            .app
            .oneshot(request(Method::GET, "/books", Some(&h.reader_cookie), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn create_then_conflict() {
        let h = harness().await;
        let response = h
            .app
            .clone()
            .oneshot(request(Method::POST, "/books", Some(&h.admin_cookie), Some(new_book(5))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = h
            .app
            .oneshot(request(Method::POST, "/books", Some(&h.admin_cookie), Some(new_book(5))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["code"], "conflict");
    }

    #[tokio::test]
    async fn blank_name_is_a_bad_request() {
        let h = harness().await;
        let mut body = new_book(6);
        body["name"] = json!("");
        let response = h
            .app
            .oneshot(request(Method::POST, "/books", Some(&h.admin_cookie), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids_are_not_found() {
        let h = harness().await;
        let response = h
            .app
            .clone()
            .oneshot(request(Method::PUT, "/books/77", Some(&h.admin_cookie), Some(new_book(77))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = h
            .app
            .oneshot(request(Method::DELETE, "/books/77", Some(&h.admin_cookie), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_rejects_mismatched_ids() {
        let h = harness().await;
        let response = h
            .app
            .oneshot(request(Method::PUT, "/books/1", Some(&h.admin_cookie), Some(new_book(2))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_existing_book() {
        let h = harness().await;
        let response = h
            .app
            .clone()
            .oneshot(request(Method::DELETE, "/books/1", Some(&h.admin_cookie), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = h
            .app
            .oneshot(request(Method::GET, "/books", Some(&h.admin_cookie), None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn paged_listing_and_page_zero() {
        let h = harness().await;
        let response = h
            .app
            .clone()
            .oneshot(request(Method::GET, "/books/pages/1", Some(&h.admin_cookie), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["pages"], 1);
        assert_eq!(page["items"][0]["name"], "Dune");

        let response = h
            .app
            .oneshot(request(Method::GET, "/books/pages/0", Some(&h.admin_cookie), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_by_publisher_and_location() {
        let h = harness().await;
        let response = h
            .app
            .oneshot(request(
                Method::GET,
                "/books/search?publisher=chil&location=A-1&author=",
                Some(&h.admin_cookie),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let books = body_json(response).await;
        assert_eq!(books.as_array().unwrap().len(), 1);
    }
}
