//! Drive Things from the command line through `osascript`.
//!
//! Each operation renders a script, hands it to a [`bridge::ScriptRunner`],
//! and turns the reply into to-dos or an [`todo::OperationOutcome`].

pub mod bridge;
pub mod client;
pub mod config;
pub mod dates;
pub mod filter;
pub mod reply;
pub mod script;
pub mod todo;

pub use bridge::{BridgeError, Osascript, ScriptRunner};
pub use client::{ThingsClient, ThingsError};
pub use todo::{OperationOutcome, Status, TaskItem};
