//! Argument parsing and record command dispatch.
//!
//! # Responsibility
//! - Parse `mapp <command> <action> [args]` with clap and fold every parse
//!   failure into the shared error taxonomy.
//! - Run one record action against the selected backend and return its JSON.
//!
//! # Invariants
//! - Nothing here prints or exits; `main` owns stdout and the exit status.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};
use mapp_core::{
    codec, BackendKind, CrudService, MappError, MappResult, OperationContext, Page, SharedStore,
};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::sync::Arc;

const DEFAULT_LIST_LIMIT: u32 = 50;
const KNOWN_COMMANDS: [&str; 4] = ["remote", "local", "serve", "help"];

#[derive(Debug, Parser)]
#[command(name = "mapp", version, about = "Single model CRUD over a remote service or a local store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Operate on the remote service at MAPP_CLIENT_HOST
    Remote {
        #[command(subcommand)]
        action: Action,
    },
    /// Operate on the SQLite store at MAPP_DB_FILE
    Local {
        #[command(subcommand)]
        action: Action,
    },
    /// Serve the local store over HTTP
    Serve {
        /// Listen port, defaults to MAPP_SERVER_PORT
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,
    },
}

/// One record action.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Create a single model from a JSON object
    Create { json: String },
    /// Read a single model by id
    Read { id: String },
    /// Replace a single model by id
    Update { id: String, json: String },
    /// Delete a single model by id
    Delete { id: String },
    /// List single models by id
    List {
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },
    /// Create the single_model table (local only)
    CreateTable,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Help or version text; exit status 0.
    Help(String),
    Serve { port: Option<u16> },
    Record { kind: BackendKind, action: Action },
}

/// Parses a full argument vector, program name included.
pub fn parse<I, T>(args: I) -> MappResult<Parsed>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if let Some(first) = args.get(1).and_then(|arg| arg.to_str()) {
        if !first.starts_with('-') && !KNOWN_COMMANDS.contains(&first) {
            return Err(MappError::UnknownCommand(first.to_string()));
        }
    }

    match Cli::try_parse_from(&args) {
        Ok(cli) => Ok(match cli.command {
            Command::Remote { action } => Parsed::Record {
                kind: BackendKind::Remote,
                action,
            },
            Command::Local { action } => Parsed::Record {
                kind: BackendKind::Local,
                action,
            },
            Command::Serve { port } => Parsed::Serve { port },
        }),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Ok(Parsed::Help(err.to_string())),
            _ => Err(classify_parse_error(&err, &args)),
        },
    }
}

/// Runs `action` against the backend selected by `kind`.
pub fn execute(
    kind: BackendKind,
    action: Action,
    ctx: &OperationContext,
    store: Arc<SharedStore>,
) -> MappResult<Value> {
    let service = CrudService::for_kind(kind, store);

    match action {
        Action::Create { json } => service.create(ctx, &json).map(|m| codec::to_value(&m)),
        Action::Read { id } => service.read(ctx, &id).map(|m| codec::to_value(&m)),
        Action::Update { id, json } => service
            .update(ctx, &id, &json)
            .map(|m| codec::to_value(&m)),
        Action::Delete { id } => {
            service.delete(ctx, &id)?;
            Ok(json!({
                "message": format!("deleted single model {id}"),
                "id": id,
            }))
        }
        Action::List { offset, limit } => service
            .list(ctx, Page::new(offset, limit))
            .map(|list| codec::list_to_value(&list)),
        Action::CreateTable => {
            let status = service.create_table(ctx)?;
            serde_json::to_value(status).map_err(|err| MappError::Marshal(err.to_string()))
        }
    }
}

fn classify_parse_error(err: &clap::Error, args: &[OsString]) -> MappError {
    match err.kind() {
        ErrorKind::InvalidSubcommand => {
            let action = match err.get(ContextKind::InvalidSubcommand) {
                Some(ContextValue::String(value)) => value.clone(),
                _ => first_line(err),
            };
            MappError::UnknownAction(action)
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
            let message = match args.get(1).and_then(|arg| arg.to_str()) {
                Some(command) => format!("missing action for '{command}'"),
                None => "missing command".to_string(),
            };
            MappError::MissingArgument(message)
        }
        ErrorKind::MissingRequiredArgument => MappError::MissingArgument(first_line(err)),
        _ => MappError::InvalidArgument(first_line(err)),
    }
}

fn first_line(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.trim_start_matches("error: ").to_string()
}
