//! Store/registry wiring shared by every subcommand: open each SQLite
//! file named in config, creating its parent directory on first run.

use std::path::Path;

use anyhow::Context as _;
use jobscout_accounts::AccountPool;
use jobscout_core::config::JobScoutConfig;
use jobscout_registry::ChannelRegistry;
use jobscout_store::{DocumentStore, RelationalStore};
use rusqlite::Connection;

fn open(path: &str) -> anyhow::Result<Connection> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating directory for {path}"))?;
    }
    Connection::open(path).with_context(|| format!("opening sqlite database at {path}"))
}

pub fn open_relational(config: &JobScoutConfig) -> anyhow::Result<RelationalStore> {
    Ok(RelationalStore::new(open(&config.store.relational_path)?)?)
}

pub fn open_documents(config: &JobScoutConfig) -> anyhow::Result<DocumentStore> {
    Ok(DocumentStore::new(open(&config.store.documents_path)?)?)
}

pub fn open_registry(config: &JobScoutConfig) -> anyhow::Result<ChannelRegistry> {
    Ok(ChannelRegistry::new(open(&config.store.channels_path)?)?)
}

pub fn open_accounts(config: &JobScoutConfig) -> anyhow::Result<AccountPool> {
    Ok(AccountPool::new(
        open(&config.store.accounts_path)?,
        config.accounts.max_joins_per_day_per_account,
        config.scraper.timezone(),
    )?)
}

pub fn open_scheduler(config: &JobScoutConfig) -> anyhow::Result<Connection> {
    open(&config.store.scheduler_path)
}
