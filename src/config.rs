//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::store::PoolSettings;

/// Runtime settings. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "inkpot", version, about = "A minimal article CMS")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "INKPOT_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// SQLite connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://inkpot.db?mode=rwc")]
    pub database_url: String,

    /// Upper bound on simultaneously open database connections.
    #[arg(long, env = "INKPOT_MAX_OPEN_CONNS", default_value_t = 25,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub max_open_conns: u32,

    /// Seconds an idle connection is kept before it is closed.
    #[arg(long, env = "INKPOT_CONN_IDLE_TIMEOUT_SECS", default_value_t = 300)]
    pub conn_idle_timeout_secs: u64,

    /// Seconds after which a connection is closed and replaced.
    #[arg(long, env = "INKPOT_CONN_MAX_LIFETIME_SECS", default_value_t = 300)]
    pub conn_max_lifetime_secs: u64,

    /// Seconds a single database statement may take.
    #[arg(long, env = "INKPOT_DB_TIMEOUT_SECS", default_value_t = 5)]
    pub db_timeout_secs: u64,
}

impl Config {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_open: self.max_open_conns,
            idle_timeout: Duration::from_secs(self.conn_idle_timeout_secs),
            max_lifetime: Duration::from_secs(self.conn_max_lifetime_secs),
        }
    }

    pub fn db_timeout(&self) -> Duration {
        Duration::from_secs(self.db_timeout_secs)
    }
}
