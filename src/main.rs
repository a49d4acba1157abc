mod categorize;
mod config;
mod controller;
mod db;
mod models;
mod run;
mod stats;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = config::AppConfig::load()?;
    init_tracing(&config.log);

    let db_path = config.db_path()?;
    let db = db::Database::open(&db_path)?;
    db.seed_sample_invoices()?;

    let args: Vec<String> = std::env::args().collect();
    run::as_cli(&args, &db)
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
