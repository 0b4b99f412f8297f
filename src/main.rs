// src/main.rs
//
// Operator entry point: runs one read-only command and prints the JSON response.
//
// Usage:
//   libraryhub [--config <file>] <books|authors|subjects|prices <book_id>|status>

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;

use libraryhub::application::controllers::{
    get_status, list_authors, list_books, list_prices_by_book, list_subjects, ApiResponse,
};
use libraryhub::application::state::AppState;
use libraryhub::db::{create_connection_pool, get_connection, initialize_database};
use libraryhub::{config, logging};

const DEFAULT_CONFIG_FILE: &str = "libraryhub.toml";

enum Command {
    Books,
    Authors,
    Subjects,
    Prices(i64),
    Status,
}

fn parse_args(args: &[String]) -> anyhow::Result<(Option<PathBuf>, Command)> {
    let mut config_path = None;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().ok_or_else(|| anyhow!("--config needs a file path"))?;
            config_path = Some(PathBuf::from(path));
        } else {
            rest.push(arg.as_str());
        }
    }

    let command = match rest.as_slice() {
        ["books"] => Command::Books,
        ["authors"] => Command::Authors,
        ["subjects"] => Command::Subjects,
        ["prices", book_id] => Command::Prices(
            book_id
                .parse()
                .with_context(|| format!("invalid book id `{book_id}`"))?,
        ),
        ["status"] | [] => Command::Status,
        other => bail!(
            "unknown command `{}`; expected books, authors, subjects, prices <book_id> or status",
            other.join(" ")
        ),
    };

    Ok((config_path, command))
}

fn print<T: Serialize>(response: &ApiResponse<T>) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, command) = parse_args(&args)?;

    // 1. CONFIGURATION
    let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let app_config =
        config::load(Some(config_path.as_path())).context("failed to load configuration")?;

    // 2. LOGGING
    logging::init_logging(&app_config.logging.level, app_config.logging.directory.as_deref())
        .map_err(|e| anyhow!(e))?;

    // 3. INFRASTRUCTURE
    let pool = create_connection_pool(&app_config.database)?;
    {
        let conn = get_connection(&pool)?;
        initialize_database(&conn)?;
    }

    // 4. APPLICATION STATE
    let state = AppState::new(pool, &app_config);

    // 5. DISPATCH
    let success = match command {
        Command::Books => {
            let response = list_books(&state).await;
            print(&response)?;
            response.is_success()
        }
        Command::Authors => {
            let response = list_authors(&state).await;
            print(&response)?;
            response.is_success()
        }
        Command::Subjects => {
            let response = list_subjects(&state).await;
            print(&response)?;
            response.is_success()
        }
        Command::Prices(book_id) => {
            let response = list_prices_by_book(&state, book_id).await;
            print(&response)?;
            response.is_success()
        }
        Command::Status => {
            let response = get_status(&state).await;
            print(&response)?;
            response.is_success()
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
