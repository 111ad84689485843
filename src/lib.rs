//! Core of an Eisenhower-matrix study and time manager.
//!
//! - [`db`]: SQLite-backed task and subject stores
//! - [`coordinator`]: snapshot publishing and intent handling for front ends
//! - [`advisory`]: remote study advice fetch
//! - [`api`]: JSON HTTP surface over the coordinator
//! - [`scope`]: cancellation of screen-scoped work

pub mod advisory;
pub mod api;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod models;
pub mod scope;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::advisory::AdvisoryClient;
use crate::config::AppConfig;
use crate::coordinator::Coordinator;
use crate::db::Database;

/// Opens the configured database, runs migrations and performs the initial
/// load of both snapshots.
pub async fn bootstrap(config: &AppConfig) -> Result<Arc<Coordinator>> {
    let db = match &config.database_path {
        Some(path) => Database::open(path.clone())?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    let mut http = reqwest::Client::builder();
    if let Some(timeout) = config.http_timeout() {
        http = http.timeout(timeout);
    }
    let http = http.build().context("Failed to build HTTP client")?;
    let advisor = AdvisoryClient::with_client(config.advice_base_url.clone(), http);

    let coordinator = Arc::new(Coordinator::new(db, Arc::new(advisor)));
    coordinator
        .refresh()
        .await
        .context("Failed to load tasks and subjects")?;

    Ok(coordinator)
}
