use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use things_core::config::{load_config, ThingsConfig};
use things_core::{OperationOutcome, Osascript, TaskItem, ThingsClient, ThingsError};
use things_render::{
    format_list_names, format_outcome, format_todos_for_display, format_todos_jsonl,
};

mod version;

const LISTS_HINT: &str = "Use `things lists` to see available lists.";

#[derive(Parser)]
#[command(
    name = "things",
    version = version::FULL,
    about = "Interact with Things.app from the command line."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show to-dos from a specified list
    #[command(visible_alias = "s")]
    Show {
        /// List to show
        #[arg(short, long)]
        list: String,
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Add a new to-do to a list
    #[command(visible_alias = "a")]
    Add {
        /// List to add the to-do to (defaults to the configured list, "inbox")
        #[arg(short, long)]
        list: Option<String>,
        /// Name of the new to-do
        #[arg(short, long)]
        name: String,
        /// Comma-separated tags, e.g. "Home, Work"
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Delete a to-do by name from a list
    #[command(visible_alias = "d")]
    Delete {
        #[arg(short, long)]
        list: String,
        #[arg(short, long)]
        name: String,
    },
    /// Rename a to-do within a list
    #[command(visible_alias = "r")]
    Rename {
        #[arg(short, long)]
        list: String,
        /// Current name of the to-do
        #[arg(short, long)]
        name: String,
        #[arg(short = 'N', long)]
        new_name: String,
    },
    /// Move a to-do from one list to another
    #[command(visible_alias = "m")]
    Move {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        name: String,
    },
    /// Show completed to-dos from the Logbook
    #[command(visible_alias = "c")]
    Completed {
        /// today, "this week", "this month" or YYYY-MM-DD
        #[arg(short, long, default_value = "today")]
        date: String,
        #[arg(long)]
        area: Option<String>,
        #[arg(long)]
        project: Option<String>,
        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// List the names of all lists
    #[command(visible_alias = "ls")]
    Lists,
    /// Print version information
    Version,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("THINGS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn connect(config: &ThingsConfig) -> Result<ThingsClient<Osascript>> {
    let runner = Osascript::discover(config.bridge_command.clone())?;
    debug!(command = ?runner.command(), "using bridge");
    Ok(ThingsClient::from_config(runner, config))
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config().context("load config")?;
    let command = cli.command.unwrap_or_else(|| Command::Show {
        list: config.today_list().to_string(),
        json: false,
    });

    match command {
        Command::Show { list, json } => print_fetch(connect(&config)?.todos(&list), json, true),
        Command::Add { list, name, tags } => {
            let list = list.unwrap_or_else(|| config.default_list().to_string());
            let outcome = connect(&config)?.add_todo(&list, &name, tags.as_deref())?;
            Ok(report(outcome))
        }
        Command::Delete { list, name } => {
            Ok(report(connect(&config)?.delete_todo(&list, &name)?))
        }
        Command::Rename {
            list,
            name,
            new_name,
        } => Ok(report(connect(&config)?.rename_todo(&list, &name, &new_name)?)),
        Command::Move { from, to, name } => {
            Ok(report(connect(&config)?.move_todo(&from, &to, &name)?))
        }
        Command::Completed {
            date,
            area,
            project,
            json,
        } => print_fetch(
            connect(&config)?.completed_todos_filtered(
                &date,
                area.as_deref(),
                project.as_deref(),
            ),
            json,
            false,
        ),
        Command::Lists => match connect(&config)?.list_names() {
            Ok(names) => {
                print_block(&format_list_names(&names));
                Ok(ExitCode::SUCCESS)
            }
            Err(ThingsError::Application(message)) => {
                eprintln!("{message}");
                Ok(ExitCode::FAILURE)
            }
            Err(err) => Err(err.into()),
        },
        Command::Version => {
            println!("things {}", version::FULL);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_fetch(
    result: Result<Vec<TaskItem>, ThingsError>,
    json: bool,
    hint: bool,
) -> Result<ExitCode> {
    let todos = match result {
        Ok(todos) => todos,
        Err(ThingsError::Application(message)) => {
            eprintln!("{message}");
            if hint {
                eprintln!("{LISTS_HINT}");
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(err.into()),
    };
    let out = if json {
        format_todos_jsonl(&todos)?
    } else {
        format_todos_for_display(&todos)
    };
    print_block(&out);
    Ok(ExitCode::SUCCESS)
}

fn print_block(text: &str) {
    if !text.is_empty() {
        println!("{text}");
    }
}

fn report(outcome: OperationOutcome) -> ExitCode {
    if outcome.success {
        println!("{}", format_outcome(&outcome));
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", format_outcome(&outcome));
        ExitCode::FAILURE
    }
}
