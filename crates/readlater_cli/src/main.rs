//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `readlater_core` linkage.
//! - Report schema and viewer counts for an in-memory or on-disk store.

use readlater_core::db::migrations::current_version;
use readlater_core::db::{open_db, open_db_in_memory};
use readlater_core::{SqliteViewerRepository, ViewerRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("readlater_core ping={}", readlater_core::ping());
    println!("readlater_core version={}", readlater_core::core_version());

    match probe(std::env::args().nth(1)) {
        Ok((schema_version, viewers)) => {
            println!("readlater_core schema_version={schema_version}");
            println!("readlater_core viewers={viewers}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("readlater_core error={err}");
            ExitCode::FAILURE
        }
    }
}

fn probe(db_path: Option<String>) -> Result<(u32, usize), Box<dyn std::error::Error>> {
    let conn = match db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let schema_version = current_version(&conn)?;
    let repo = SqliteViewerRepository::try_new(&conn)?;
    Ok((schema_version, repo.get_all()?.len()))
}
