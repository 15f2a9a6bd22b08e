pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Module};
use serde_json::json;

pub use routes::CatalogApiState;
pub use service::CatalogService;

/// Catalog administration: listing, paging, searching and maintaining books
pub struct CatalogModule {
    state: CatalogApiState,
}

impl CatalogModule {
    pub fn new(state: CatalogApiState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            page_size = self.state.catalog.page_size(),
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "description": "Error",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let book_list = json!({
            "description": "Books in store order",
            "content": {
                "application/json": {
                    "schema": {
                        "type": "array",
                        "items": { "$ref": "#/components/schemas/Book" }
                    }
                }
            }
        });
        let book = json!({
            "description": "The stored book",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Book" }
                }
            }
        });
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/Book" }
                }
            }
        });
        let id_param = json!({
            "name": "id", "in": "path", "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let query_param = |name: &str| {
            json!({
                "name": name, "in": "query", "required": false,
                "schema": { "type": "string" }
            })
        };

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List all books",
                        "tags": ["Catalog"],
                        "responses": { "200": book_list, "401": error, "403": error }
                    },
                    "post": {
                        "summary": "Add a book",
                        "tags": ["Catalog"],
                        "requestBody": book_body,
                        "responses": { "201": book, "400": error, "409": error }
                    }
                },
                "/books/pages/{page}": {
                    "get": {
                        "summary": "List one page of books",
                        "tags": ["Catalog"],
                        "parameters": [{
                            "name": "page", "in": "path", "required": true,
                            "schema": { "type": "integer", "minimum": 1 }
                        }],
                        "responses": {
                            "200": {
                                "description": "Page of books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookPage" }
                                    }
                                }
                            },
                            "400": error
                        }
                    }
                },
                "/books/search": {
                    "get": {
                        "summary": "Search by publisher, introduction, author and location",
                        "tags": ["Catalog"],
                        "parameters": [
                            query_param("publisher"),
                            query_param("introduction"),
                            query_param("author"),
                            query_param("location")
                        ],
                        "responses": { "200": book_list, "401": error }
                    }
                },
                "/books/{id}": {
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Catalog"],
                        "parameters": [id_param],
                        "requestBody": book_body,
                        "responses": { "200": book, "400": error, "404": error }
                    },
                    "delete": {
                        "summary": "Remove a book",
                        "tags": ["Catalog"],
                        "parameters": [id_param],
                        "responses": { "204": { "description": "Removed" }, "404": error }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string", "description": "Title of the book" },
                            "author": { "type": "string" },
                            "publisher": { "type": "string" },
                            "introduction": { "type": "string" },
                            "location": { "type": "string", "description": "Shelf location" },
                            "count": { "type": "integer", "minimum": 0 }
                        },
                        "required": ["id", "name", "author"]
                    },
                    "BookPage": {
                        "type": "object",
                        "properties": {
                            "items": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            },
                            "page": { "type": "integer" },
                            "page_size": { "type": "integer" },
                            "total": { "type": "integer" },
                            "pages": { "type": "integer" }
                        },
                        "required": ["items", "page", "page_size", "total", "pages"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Create a new instance of the catalog module
pub fn create_module(state: CatalogApiState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(CatalogModule::new(state))
}
