//! `mapp` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and hand arguments to the dispatcher.
//! - Print results as pretty JSON and translate failures into exit status 1.

mod dispatch;

use dispatch::Parsed;
use log::error;
use mapp_core::server::{run_server, ServerState};
use mapp_core::{
    default_log_level, init_logging, AppConfig, ErrorBody, LogTarget, MappError, SharedStore,
};
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;

/// Level for one-shot commands when `MAPP_LOG_LEVEL` is unset; stdout stays JSON only.
const COMMAND_LOG_LEVEL: &str = "warn";

fn main() -> ExitCode {
    let config = AppConfig::from_env();

    let parsed = match dispatch::parse(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => return fail(&err),
    };

    match parsed {
        Parsed::Help(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Parsed::Serve { port } => {
            start_logging(&config, default_log_level());
            let port = port.unwrap_or(config.server_port);
            let store = Arc::new(SharedStore::new());
            let state = match ServerState::bootstrap(config.context, store) {
                Ok(state) => state,
                Err(err) => {
                    error!(
                        "event=server_start module=cli status=error error_code={} error={err}",
                        err.code()
                    );
                    return fail(&err);
                }
            };
            match run_server(state, port) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("event=server_stop module=cli status=error port={port} error={err}");
                    fail(&MappError::Http(format!("error serving on port {port}: {err}")))
                }
            }
        }
        Parsed::Record { kind, action } => {
            start_logging(&config, COMMAND_LOG_LEVEL);
            let store = Arc::new(SharedStore::new());
            match dispatch::execute(kind, action, &config.context, store) {
                Ok(value) => print_json(&value),
                Err(err) => fail(&err),
            }
        }
    }
}

fn start_logging(config: &AppConfig, fallback_level: &str) {
    let level = config.log_level.as_deref().unwrap_or(fallback_level);
    let target = match &config.log_dir {
        Some(dir) => LogTarget::Directory(dir.clone()),
        None => LogTarget::Stderr,
    };
    if let Err(err) = init_logging(level, target) {
        eprintln!("mapp: logging disabled: {err}");
    }
}

fn print_json(value: &Value) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => fail(&MappError::Marshal(err.to_string())),
    }
}

fn fail(err: &MappError) -> ExitCode {
    let body = err.to_body();
    match serde_json::to_string_pretty(&body) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{}", render_plain(&body)),
    }
    ExitCode::FAILURE
}

fn render_plain(body: &ErrorBody) -> String {
    format!("{}: {}", body.code, body.message)
}
