use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::{Todo, UpdateTodoRequest};
use web_sys::console;

mod api;
mod session;

/// Reducer actions. The list-shaping ones — `TodosLoaded`, `TodoCreated`,
/// `TodoUpdated`, `TodoDeleted` — mutate local state only and are unit
/// tested without any network code; the rest dispatch API calls that resolve
/// back into those four.
#[derive(Debug, Clone)]
pub enum Msg {
    DateSelected(String),
    LoadTodos,
    TodosLoaded { date: String, todos: Vec<Todo> },
    SetNewTitle(String),
    CreateTodo,
    TodoCreated(Todo),
    ToggleTodo(i64, bool),
    TodoUpdated(Todo),
    DeleteTodo(i64),
    TodoDeleted(i64),
    EditTodo(i64),
    SetEditTitle(String),
    SaveEdit(i64),
    CancelEdit,
    SignOut,
    SignedOut,
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    selected_date: String,
    todos: Vec<Todo>,
    new_title: String,
    editing: Option<i64>,
    edit_title: String,
    loading: bool,
    username: Option<String>,
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        self.selected_date = today();
        self.username = session::username();
        Cmd::new(async { Msg::LoadTodos })
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::DateSelected(date) => {
                if date.is_empty() {
                    return Cmd::none();
                }
                self.selected_date = date;
                Cmd::new(async { Msg::LoadTodos })
            }
            Msg::LoadTodos => {
                // Previous list stays rendered while the fetch is in flight.
                self.loading = true;
                let date = self.selected_date.clone();
                Cmd::new(async move {
                    match api::fetch_todos(&date).await {
                        Ok(todos) => Msg::TodosLoaded { date, todos },
                        Err(e) => Msg::Error(e),
                    }
                })
            }
            Msg::TodosLoaded { date, todos } => {
                // A slow response for a date the user has already left must
                // not overwrite the newer list.
                if date == self.selected_date {
                    self.todos = todos;
                    self.loading = false;
                }
                Cmd::none()
            }
            Msg::SetNewTitle(title) => {
                self.new_title = title;
                Cmd::none()
            }
            Msg::CreateTodo => {
                let title = self.new_title.trim().to_string();
                if title.is_empty() {
                    return Cmd::none();
                }
                let date = self.selected_date.clone();
                Cmd::new(async move {
                    match api::create_todo(title, date).await {
                        Ok(todo) => Msg::TodoCreated(todo),
                        Err(e) => Msg::Error(e),
                    }
                })
            }
            Msg::TodoCreated(todo) => {
                self.todos.push(todo);
                self.new_title.clear();
                Cmd::none()
            }
            Msg::ToggleTodo(id, is_completed) => {
                let changes = UpdateTodoRequest {
                    is_completed: Some(!is_completed),
                    ..Default::default()
                };
                Cmd::new(async move {
                    match api::update_todo(id, changes).await {
                        Ok(todo) => Msg::TodoUpdated(todo),
                        Err(e) => Msg::Error(e),
                    }
                })
            }
            Msg::TodoUpdated(updated) => {
                if let Some(todo) = self.todos.iter_mut().find(|t| t.id == updated.id) {
                    *todo = updated;
                }
                Cmd::none()
            }
            Msg::DeleteTodo(id) => Cmd::new(async move {
                match api::delete_todo(id).await {
                    Ok(_) => Msg::TodoDeleted(id),
                    Err(e) => Msg::Error(e),
                }
            }),
            Msg::TodoDeleted(id) => {
                self.todos.retain(|t| t.id != id);
                Cmd::none()
            }
            Msg::EditTodo(id) => {
                if let Some(todo) = self.todos.iter().find(|t| t.id == id) {
                    self.editing = Some(id);
                    self.edit_title = todo.title.clone();
                }
                Cmd::none()
            }
            Msg::SetEditTitle(title) => {
                self.edit_title = title;
                Cmd::none()
            }
            Msg::SaveEdit(id) => {
                if self.editing != Some(id) {
                    return Cmd::none();
                }
                self.editing = None;
                let changes = UpdateTodoRequest {
                    title: Some(self.edit_title.clone()),
                    ..Default::default()
                };
                // A concurrent toggle could otherwise be overwritten by a
                // local patch, so a save re-fetches the whole list.
                Cmd::new(async move {
                    match api::update_todo(id, changes).await {
                        Ok(_) => Msg::LoadTodos,
                        Err(e) => Msg::Error(e),
                    }
                })
            }
            Msg::CancelEdit => {
                self.editing = None;
                Cmd::none()
            }
            Msg::SignOut => Cmd::new(async {
                session::sign_out();
                Msg::SignedOut
            }),
            Msg::SignedOut => {
                self.username = None;
                Cmd::none()
            }
            Msg::Error(error) => {
                // Failures are diagnostic-only; the UI shows no error state.
                console::log_1(&format!("Error: {error}").into());
                self.loading = false;
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("max-w-md mx-auto bg-white shadow-lg rounded-lg mt-16 py-4 px-4")],
            [
                self.view_header(),
                self.view_date_picker(),
                self.view_create_form(),
                self.view_todo_list(),
            ],
        )
    }
}

impl Model {
    fn view_header(&self) -> Node<Msg> {
        div([class("px-4 py-2")], [
            div([class("flex justify-between items-center")], [
                h1([class("text-gray-800 font-bold text-2xl uppercase")], [text("To-Do List")]),
                if self.username.is_some() {
                    button(
                        [
                            on_click(|_| Msg::SignOut),
                            class("bg-red-500 hover:bg-red-700 text-white font-bold py-1 px-3 rounded"),
                        ],
                        [text("Logout")],
                    )
                } else {
                    span([], [])
                },
            ]),
            match &self.username {
                Some(name) => p(
                    [class("text-gray-600 text-sm")],
                    [text(&format!("Welcome, {name}!"))],
                ),
                None => span([], []),
            },
        ])
    }

    fn view_date_picker(&self) -> Node<Msg> {
        div([class("px-4 py-2")], [
            label([class("block text-gray-700")], [text("Select Date")]),
            input(
                [
                    r#type("date"),
                    value(&self.selected_date),
                    on_input(|event| Msg::DateSelected(event.value())),
                    class("w-full px-3 py-2 border rounded-md text-gray-700"),
                ],
                [],
            ),
        ])
    }

    fn view_create_form(&self) -> Node<Msg> {
        div([class("px-4 py-2 flex gap-2")], [
            input(
                [
                    r#type("text"),
                    placeholder("Add a task"),
                    value(&self.new_title),
                    on_input(|event| Msg::SetNewTitle(event.value())),
                    class("flex-1 px-3 py-2 border rounded-md text-gray-700"),
                ],
                [],
            ),
            button(
                [
                    on_click(|_| Msg::CreateTodo),
                    class("bg-blue-500 hover:bg-blue-700 text-white font-bold py-2 px-4 rounded"),
                ],
                [text("Add")],
            ),
        ])
    }

    fn view_todo_list(&self) -> Node<Msg> {
        if self.todos.is_empty() && !self.loading {
            return div(
                [class("px-4 py-8 text-center text-gray-500 italic")],
                [text("Nothing planned for this day")],
            );
        }
        ul(
            [class("px-4 py-2 space-y-2")],
            self.todos
                .iter()
                .map(|todo| self.view_todo(todo))
                .collect::<Vec<_>>(),
        )
    }

    fn view_todo(&self, todo: &Todo) -> Node<Msg> {
        let id = todo.id;
        let is_completed = todo.is_completed;
        li(
            [
                key(id.to_string()),
                class("flex items-center gap-3 border rounded-md px-3 py-2"),
            ],
            if self.editing == Some(id) {
                vec![
                    input(
                        [
                            r#type("text"),
                            value(&self.edit_title),
                            on_input(|event| Msg::SetEditTitle(event.value())),
                            class("flex-1 px-2 py-1 border rounded-md text-gray-700"),
                        ],
                        [],
                    ),
                    button(
                        [
                            on_click(move |_| Msg::SaveEdit(id)),
                            class("text-green-600 font-bold"),
                        ],
                        [text("Save")],
                    ),
                    button(
                        [on_click(|_| Msg::CancelEdit), class("text-gray-500")],
                        [text("Cancel")],
                    ),
                ]
            } else {
                vec![
                    input(
                        [
                            r#type("checkbox"),
                            checked(is_completed),
                            on_click(move |_| Msg::ToggleTodo(id, is_completed)),
                            class("w-4 h-4"),
                        ],
                        [],
                    ),
                    span(
                        [class(if is_completed {
                            "flex-1 line-through text-gray-400"
                        } else {
                            "flex-1 text-gray-800"
                        })],
                        [text(&todo.title)],
                    ),
                    button(
                        [
                            on_click(move |_| Msg::EditTodo(id)),
                            class("text-blue-500 font-bold"),
                        ],
                        [text("Edit")],
                    ),
                    button(
                        [
                            on_click(move |_| Msg::DeleteTodo(id)),
                            class("text-red-500 font-bold"),
                        ],
                        [text("Delete")],
                    ),
                ]
            },
        )
    }
}

/// Today as `YYYY-MM-DD` in the browser's clock.
fn today() -> String {
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    iso.split('T').next().unwrap_or_default().to_string()
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    Program::mount_to_body(Model::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: i64, title: &str, is_completed: bool, date: &str) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            is_completed,
            date: date.to_string(),
            user_id: "user-1".to_string(),
        }
    }

    fn model_for(date: &str, todos: Vec<Todo>) -> Model {
        Model {
            selected_date: date.to_string(),
            todos,
            loading: true,
            ..Default::default()
        }
    }

    #[test]
    fn loaded_list_replaces_current_date() {
        let mut model = model_for("2025-06-01", vec![todo(1, "old", false, "2025-06-01")]);
        model.update(Msg::TodosLoaded {
            date: "2025-06-01".to_string(),
            todos: vec![todo(2, "new", false, "2025-06-01")],
        });
        assert_eq!(model.todos.len(), 1);
        assert_eq!(model.todos[0].id, 2);
        assert!(!model.loading);
    }

    #[test]
    fn stale_list_for_prior_date_is_dropped() {
        let current = vec![todo(1, "today", false, "2025-06-02")];
        let mut model = model_for("2025-06-02", current.clone());
        model.update(Msg::TodosLoaded {
            date: "2025-06-01".to_string(),
            todos: vec![todo(9, "yesterday", false, "2025-06-01")],
        });
        assert_eq!(model.todos, current);
    }

    #[test]
    fn created_todo_is_appended_and_input_cleared() {
        let mut model = model_for("2025-06-01", vec![todo(1, "first", false, "2025-06-01")]);
        model.new_title = "second".to_string();
        model.update(Msg::TodoCreated(todo(2, "second", false, "2025-06-01")));
        assert_eq!(model.todos.len(), 2);
        assert_eq!(model.todos[1].id, 2);
        assert!(model.new_title.is_empty());
    }

    #[test]
    fn updated_todo_replaces_matching_item_in_place() {
        let mut model = model_for(
            "2025-06-01",
            vec![
                todo(1, "first", false, "2025-06-01"),
                todo(2, "second", false, "2025-06-01"),
            ],
        );
        model.update(Msg::TodoUpdated(todo(1, "first", true, "2025-06-01")));
        assert!(model.todos[0].is_completed);
        assert_eq!(model.todos[1].id, 2);
        assert!(!model.todos[1].is_completed);
    }

    #[test]
    fn deleted_todo_is_removed_by_id() {
        let mut model = model_for(
            "2025-06-01",
            vec![
                todo(1, "first", false, "2025-06-01"),
                todo(2, "second", false, "2025-06-01"),
            ],
        );
        model.update(Msg::TodoDeleted(1));
        assert_eq!(model.todos.len(), 1);
        assert_eq!(model.todos[0].id, 2);
    }

    #[test]
    fn entering_edit_mode_buffers_current_title() {
        let mut model = model_for("2025-06-01", vec![todo(1, "first", false, "2025-06-01")]);
        model.update(Msg::EditTodo(1));
        assert_eq!(model.editing, Some(1));
        assert_eq!(model.edit_title, "first");

        model.update(Msg::SetEditTitle("changed".to_string()));
        model.update(Msg::CancelEdit);
        assert_eq!(model.editing, None);
        // The list itself is untouched until a save round-trips.
        assert_eq!(model.todos[0].title, "first");
    }

    #[test]
    fn unknown_updates_and_deletes_are_ignored() {
        let mut model = model_for("2025-06-01", vec![todo(1, "first", false, "2025-06-01")]);
        model.update(Msg::TodoUpdated(todo(99, "ghost", true, "2025-06-01")));
        model.update(Msg::TodoDeleted(99));
        assert_eq!(model.todos.len(), 1);
        assert_eq!(model.todos[0].title, "first");
    }
}
