use thiserror::Error;

use things_core::{OperationOutcome, TaskItem};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("error marshaling todo: {0}")]
    Json(#[from] serde_json::Error),
}

/// Glyph shown in front of a to-do. Unknown statuses get no glyph.
pub fn status_symbol(status: &str) -> &'static str {
    match status {
        "open" => "○ ",
        "completed" => "✔︎ ",
        "canceled" => "✕ ",
        _ => "",
    }
}

pub fn render_todo_line(todo: &TaskItem) -> String {
    format!("{}{}", status_symbol(todo.status.as_str()), todo.name)
}

/// One line per to-do, no trailing newline.
pub fn format_todos_for_display(todos: &[TaskItem]) -> String {
    todos
        .iter()
        .map(render_todo_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_todo_jsonl(todo: &TaskItem) -> Result<String, RenderError> {
    Ok(serde_json::to_string(todo)?)
}

pub fn format_todos_jsonl(todos: &[TaskItem]) -> Result<String, RenderError> {
    let lines = todos
        .iter()
        .map(format_todo_jsonl)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

pub fn format_outcome(outcome: &OperationOutcome) -> &str {
    &outcome.message
}

pub fn format_list_names(names: &[String]) -> String {
    names.join("\n")
}
