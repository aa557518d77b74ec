use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, Method};
use axum::middleware;
use axum::response::Json;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Router};
use shared::{CreateTodoRequest, Todo, UpdateTodoRequest};
use sqlx::SqlitePool;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::{self, AuthUser, TokenVerifier};
use crate::error::AppError;
use crate::store;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub verifier: Arc<TokenVerifier>,
}

pub fn app(state: AppState) -> Router {
    // Any origin is accepted; with credentials allowed the origin must be
    // echoed back rather than wildcarded.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/allTodos/:date", get(list_todos))
        .route("/createTodo", post(create_todo))
        .route("/editTodo/:id", put(edit_todo))
        .route("/deleteTodo/:id", delete(delete_todo))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(cors)
        .with_state(state)
}

async fn list_todos(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = store::list(&state.pool, &user.sub, &date).await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    let date = body
        .date
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("Date is required".to_string()))?;
    if !shared::valid_date(date) {
        return Err(AppError::BadRequest("Invalid date".to_string()));
    }
    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let todo = store::create(
        &state.pool,
        &user.sub,
        &body.title,
        body.is_completed.unwrap_or(false),
        date,
    )
    .await?;
    tracing::info!(user = %user.sub, id = todo.id, "created todo");
    Ok(Json(todo))
}

async fn edit_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    if body.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::BadRequest("Title cannot be empty".to_string()));
    }
    if body.date.as_deref().is_some_and(|d| !shared::valid_date(d)) {
        return Err(AppError::BadRequest("Invalid date".to_string()));
    }

    // Any store failure surfaces as 400 on this route, matching delete.
    store::update(&state.pool, &user.sub, id, &body)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .map(Json)
        .ok_or_else(|| AppError::BadRequest(format!("No todo with id {id}")))
}

async fn delete_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, AppError> {
    store::delete(&state.pool, &user.sub, id)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .map(Json)
        .ok_or_else(|| AppError::BadRequest(format!("No todo with id {id}")))
}
