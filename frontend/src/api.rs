//! Fetch wrappers for the todo API. Every call obtains the bearer token
//! first; without one the call fails and the caller logs it — there is no
//! user-facing error state at this scale.

use shared::{CreateTodoRequest, Todo, UpdateTodoRequest};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCredentials, RequestInit, Response};

use crate::session;

const API_URL: &str = "http://localhost:8080";

pub async fn fetch_todos(date: &str) -> Result<Vec<Todo>, String> {
    let text = send(&format!("{API_URL}/allTodos/{date}"), "GET", None).await?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse JSON: {e}"))
}

pub async fn create_todo(title: String, date: String) -> Result<Todo, String> {
    let request = CreateTodoRequest {
        title,
        is_completed: Some(false),
        date: Some(date),
    };
    let body = serde_json::to_string(&request).map_err(|_| "Failed to serialize request")?;
    let text = send(&format!("{API_URL}/createTodo"), "POST", Some(body)).await?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse JSON: {e}"))
}

pub async fn update_todo(id: i64, changes: UpdateTodoRequest) -> Result<Todo, String> {
    let body = serde_json::to_string(&changes).map_err(|_| "Failed to serialize request")?;
    let text = send(&format!("{API_URL}/editTodo/{id}"), "PUT", Some(body)).await?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse JSON: {e}"))
}

pub async fn delete_todo(id: i64) -> Result<Todo, String> {
    let text = send(&format!("{API_URL}/deleteTodo/{id}"), "DELETE", None).await?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse JSON: {e}"))
}

async fn send(url: &str, method: &str, body: Option<String>) -> Result<String, String> {
    let token = session::access_token().ok_or("No access token available")?;

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_credentials(RequestCredentials::Include);
    if let Some(body) = body {
        opts.set_body(&wasm_bindgen::JsValue::from_str(&body));
    }

    let request =
        Request::new_with_str_and_init(url, &opts).map_err(|_| "Failed to create request")?;
    request
        .headers()
        .set("Authorization", &format!("Bearer {token}"))
        .map_err(|_| "Failed to set header")?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(|_| "Failed to set header")?;

    let promise = web_sys::window()
        .ok_or("No window")?
        .fetch_with_request(&request);
    let response: Response = JsFuture::from(promise)
        .await
        .map_err(|_| "Failed to send request")?
        .into();

    let text_promise = response.text().map_err(|_| "Failed to read response")?;
    let text = JsFuture::from(text_promise)
        .await
        .map_err(|_| "Failed to get text")?
        .as_string()
        .ok_or("Failed to convert to string")?;

    if !response.ok() {
        return Err(format!("Request failed ({}): {}", response.status(), text));
    }
    Ok(text)
}
