//! CLI smoke probe.
//!
//! Loads `CoreConfig` from the environment, opens the configured database
//! and prints a superuser-scope summary. Exits non-zero on any failure.

use std::process::ExitCode;
use uuid::Uuid;
use waiter_core::db::migrations::current_version;
use waiter_core::{
    core_version, init_logging, CallerIdentity, CoreConfig, SqliteWaiterRepository, WaiterService,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("waiter_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let conn = config.open_database()?;
    let schema_version = current_version(&conn)?;
    let service = WaiterService::new(SqliteWaiterRepository::try_new(&conn)?);

    // The probe is not an authenticated principal; a superuser view lets it
    // report the full table size.
    let probe = CallerIdentity::superuser(Uuid::nil());
    let page = service.list(&probe, config.list_query(None, Some(0)))?;

    println!("waiter_core version={}", core_version());
    println!("waiter_core schema_version={schema_version}");
    println!("waiter_core waiters={}", page.count);
    log::info!(
        "event=cli_probe module=cli status=ok schema_version={schema_version} waiters={}",
        page.count
    );
    Ok(())
}
