use chrono::{DateTime, Local, SecondsFormat};
use thiserror::Error;
use tracing::debug;

use crate::bridge::{BridgeError, ScriptRunner};
use crate::config::{ThingsConfig, DEFAULT_LOGBOOK_LIST};
use crate::dates::{DateFilterError, DateFilterSpec};
use crate::filter::ContainerFilter;
use crate::reply::{Mutation, Reply};
use crate::script::{Script, ScriptBuilder};
use crate::todo::{OperationOutcome, TaskItem};

#[derive(Debug, Error)]
pub enum ThingsError {
    /// The bridge process could not be started or exited non-zero.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    /// The script ran and reported `ERROR: ...`.
    #[error("{0}")]
    Application(String),
    #[error("error parsing JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    DateFilter(#[from] DateFilterError),
}

/// Runs Things operations through a [`ScriptRunner`].
#[derive(Debug, Clone)]
pub struct ThingsClient<R> {
    runner: R,
    scripts: ScriptBuilder,
    logbook_list: String,
}

impl<R: ScriptRunner> ThingsClient<R> {
    pub fn new(runner: R) -> Self {
        Self::with_scripts(runner, ScriptBuilder::default())
    }

    pub fn with_scripts(runner: R, scripts: ScriptBuilder) -> Self {
        Self {
            runner,
            scripts,
            logbook_list: DEFAULT_LOGBOOK_LIST.to_string(),
        }
    }

    pub fn from_config(runner: R, config: &ThingsConfig) -> Self {
        Self {
            runner,
            scripts: ScriptBuilder::new(config.app_name()),
            logbook_list: config.logbook_list().to_string(),
        }
    }

    fn reply(&self, script: &Script) -> Result<Reply, ThingsError> {
        let output = self.runner.run(script)?;
        Ok(Reply::classify(&output))
    }

    fn mutate(
        &self,
        script: &Script,
        mutation: Mutation<'_>,
    ) -> Result<OperationOutcome, ThingsError> {
        let reply = self.reply(script)?;
        Ok(mutation.outcome(reply))
    }

    pub fn todos(&self, list: &str) -> Result<Vec<TaskItem>, ThingsError> {
        self.todos_since(list, None)
    }

    /// Fetch a list, keeping only to-dos completed at or after `since` when given.
    pub fn todos_since(
        &self,
        list: &str,
        since: Option<DateTime<Local>>,
    ) -> Result<Vec<TaskItem>, ThingsError> {
        let since = since.map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, false));
        let script = self.scripts.list_todos(list, since.as_deref());
        match self.reply(&script)? {
            Reply::ApplicationError(message) => Err(ThingsError::Application(message)),
            Reply::Success(payload) => {
                let todos: Vec<TaskItem> = serde_json::from_str(&payload)?;
                debug!(list = %list, count = todos.len(), "fetched to-dos");
                Ok(todos)
            }
        }
    }

    pub fn add_todo(
        &self,
        list: &str,
        name: &str,
        tags: Option<&str>,
    ) -> Result<OperationOutcome, ThingsError> {
        let script = self.scripts.add_todo(list, name, tags);
        self.mutate(&script, Mutation::Add { list })
    }

    pub fn delete_todo(&self, list: &str, name: &str) -> Result<OperationOutcome, ThingsError> {
        let script = self.scripts.delete_todo(list, name);
        self.mutate(&script, Mutation::Delete { list, name })
    }

    pub fn rename_todo(
        &self,
        list: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<OperationOutcome, ThingsError> {
        let script = self.scripts.rename_todo(list, old_name, new_name);
        self.mutate(
            &script,
            Mutation::Rename {
                list,
                old_name,
                new_name,
            },
        )
    }

    pub fn move_todo(
        &self,
        from: &str,
        to: &str,
        name: &str,
    ) -> Result<OperationOutcome, ThingsError> {
        let script = self.scripts.move_todo(from, to, name);
        self.mutate(&script, Mutation::Move { from, to, name })
    }

    /// Ask Things to move completed to-dos into the Logbook right away.
    pub fn log_completed_now(&self) -> Result<(), ThingsError> {
        match self.reply(&self.scripts.log_completed())? {
            Reply::ApplicationError(message) => Err(ThingsError::Application(message)),
            Reply::Success(_) => Ok(()),
        }
    }

    /// Completed to-dos from the Logbook inside the window named by `date_filter`.
    pub fn completed_todos(&self, date_filter: &str) -> Result<Vec<TaskItem>, ThingsError> {
        let window = DateFilterSpec::resolve(date_filter)?;
        self.completed_in(&window)
    }

    pub fn completed_in(&self, window: &DateFilterSpec) -> Result<Vec<TaskItem>, ThingsError> {
        self.log_completed_now()?;
        let fetched = self.todos_since(&self.logbook_list, Some(window.lower_bound()))?;
        let kept = window.retain(fetched);
        debug!(count = kept.len(), "completed to-dos in window");
        Ok(kept)
    }

    pub fn completed_todos_filtered(
        &self,
        date_filter: &str,
        area: Option<&str>,
        project: Option<&str>,
    ) -> Result<Vec<TaskItem>, ThingsError> {
        let todos = self.completed_todos(date_filter)?;
        Ok(ContainerFilter::new(area, project).apply(todos))
    }

    /// Names of every list Things knows about.
    pub fn list_names(&self) -> Result<Vec<String>, ThingsError> {
        match self.reply(&self.scripts.list_names())? {
            Reply::ApplicationError(message) => Err(ThingsError::Application(message)),
            Reply::Success(payload) => Ok(serde_json::from_str(&payload)?),
        }
    }
}
