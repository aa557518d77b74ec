//! SQLite persistence for todos. Every read and write is scoped by the
//! owning user id; one user's rows are invisible to another's queries.

use shared::{Todo, UpdateTodoRequest};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    date TEXT NOT NULL,
    user_id TEXT NOT NULL
)";

const COLUMNS: &str = "id, title, is_completed, date, user_id";

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    is_completed: bool,
    date: String,
    user_id: String,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            is_completed: row.is_completed,
            date: row.date,
            user_id: row.user_id,
        }
    }
}

/// Opens the pool and ensures the schema exists. A single connection: SQLite
/// serializes writers anyway, and it keeps an in-memory database coherent
/// across sequential queries.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await?;
    sqlx::query(SCHEMA).execute(&pool).await?;
    Ok(pool)
}

/// All todos for (user, date), by id ascending — the documented
/// deterministic order.
pub async fn list(pool: &SqlitePool, user_id: &str, date: &str) -> Result<Vec<Todo>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TodoRow>(&format!(
        "SELECT {COLUMNS} FROM todos WHERE user_id = ?1 AND date = ?2 ORDER BY id"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Todo::from).collect())
}

pub async fn create(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    is_completed: bool,
    date: &str,
) -> Result<Todo, sqlx::Error> {
    let row = sqlx::query_as::<_, TodoRow>(&format!(
        "INSERT INTO todos (title, is_completed, date, user_id)
         VALUES (?1, ?2, ?3, ?4) RETURNING {COLUMNS}"
    ))
    .bind(title)
    .bind(is_completed)
    .bind(date)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Partial update: a `None` field binds NULL and `COALESCE` keeps the stored
/// value, while `Some(false)` binds 0 and overwrites it. Returns `None` when
/// no row with that id belongs to the user.
pub async fn update(
    pool: &SqlitePool,
    user_id: &str,
    id: i64,
    changes: &UpdateTodoRequest,
) -> Result<Option<Todo>, sqlx::Error> {
    let row = sqlx::query_as::<_, TodoRow>(&format!(
        "UPDATE todos SET
            title = COALESCE(?1, title),
            is_completed = COALESCE(?2, is_completed),
            date = COALESCE(?3, date)
         WHERE id = ?4 AND user_id = ?5 RETURNING {COLUMNS}"
    ))
    .bind(&changes.title)
    .bind(changes.is_completed)
    .bind(&changes.date)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Todo::from))
}

/// Deletes and returns the row's prior state, or `None` when no row with
/// that id belongs to the user.
pub async fn delete(
    pool: &SqlitePool,
    user_id: &str,
    id: i64,
) -> Result<Option<Todo>, sqlx::Error> {
    let row = sqlx::query_as::<_, TodoRow>(&format!(
        "DELETE FROM todos WHERE id = ?1 AND user_id = ?2 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Todo::from))
}
