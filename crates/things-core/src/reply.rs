use tracing::debug;

use crate::script::{ERROR_PREFIX, SUCCESS_TOKEN};
use crate::todo::OperationOutcome;

/// Trimmed bridge output, split on the `ERROR:` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Success(String),
    ApplicationError(String),
}

impl Reply {
    pub fn classify(output: &str) -> Self {
        let output = output.trim();
        if output.starts_with(ERROR_PREFIX) {
            Reply::ApplicationError(output.to_string())
        } else {
            Reply::Success(output.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// "... not found in list": the list exists, the to-do does not.
    TodoMissing,
    ListMissing,
    /// Some other "not found" that names neither side.
    NotFound,
    Other,
}

/// Decide what an `ERROR:` message from the bridge is complaining about.
///
/// Script revisions word these differently; this is the only place that
/// looks inside the text.
pub fn failure_kind(message: &str) -> FailureKind {
    if message.contains("not found in list") {
        FailureKind::TodoMissing
    } else if message.contains("List") && message.contains("not found") {
        FailureKind::ListMissing
    } else if message.contains("not found") {
        FailureKind::NotFound
    } else {
        FailureKind::Other
    }
}

/// A mutating request, carrying the names the caller supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation<'a> {
    Add {
        list: &'a str,
    },
    Delete {
        list: &'a str,
        name: &'a str,
    },
    Rename {
        list: &'a str,
        old_name: &'a str,
        new_name: &'a str,
    },
    Move {
        from: &'a str,
        to: &'a str,
        name: &'a str,
    },
}

impl Mutation<'_> {
    pub fn success_message(&self) -> String {
        match self {
            Mutation::Add { list } => format!("To-do added successfully to list \"{list}\"!"),
            Mutation::Delete { list, name } => {
                format!("To-do \"{name}\" deleted successfully from list \"{list}\"!")
            }
            Mutation::Rename {
                list,
                old_name,
                new_name,
            } => format!("To-do \"{old_name}\" renamed to \"{new_name}\" in list \"{list}\"!"),
            Mutation::Move { from, to, name } => format!(
                "To-do \"{name}\" moved successfully from list \"{from}\" to list \"{to}\"!"
            ),
        }
    }

    pub fn failure_message(&self, bridge_message: &str) -> String {
        let kind = failure_kind(bridge_message);
        match self {
            Mutation::Add { .. } => bridge_message.to_string(),
            Mutation::Delete { list, name }
            | Mutation::Rename {
                list,
                old_name: name,
                ..
            } => match kind {
                FailureKind::TodoMissing => todo_missing(name, list),
                FailureKind::ListMissing | FailureKind::NotFound | FailureKind::Other => {
                    list_missing(list)
                }
            },
            Mutation::Move { from, name, .. } => match kind {
                FailureKind::TodoMissing | FailureKind::ListMissing | FailureKind::NotFound => {
                    todo_missing(name, from)
                }
                FailureKind::Other => bridge_message.to_string(),
            },
        }
    }

    pub fn outcome(&self, reply: Reply) -> OperationOutcome {
        match reply {
            Reply::Success(token) => {
                if token != SUCCESS_TOKEN {
                    debug!(token = %token, "bridge reported success with unexpected output");
                }
                OperationOutcome::succeeded(self.success_message())
            }
            Reply::ApplicationError(message) => {
                OperationOutcome::failed(self.failure_message(&message))
            }
        }
    }
}

fn todo_missing(name: &str, list: &str) -> String {
    format!("ERROR: To-do \"{name}\" not found in list \"{list}\"")
}

fn list_missing(list: &str) -> String {
    format!("ERROR: List \"{list}\" not found")
}
