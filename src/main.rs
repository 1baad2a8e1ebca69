//! Mirror failover reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                  MIRROR PROXY                     │
//!   Client Request        │  ┌────────┐   ┌─────────┐   ┌──────────────────┐ │
//!   ──────────────────────┼─▶│ http   │──▶│ routing │──▶│ resilience       │ │
//!                         │  │ server │   │ gate +  │   │ failover         │ │
//!                         │  └───┬────┘   │ affinity│   └────────┬─────────┘ │
//!                         │      │        └────┬────┘            │           │
//!                         │      ▼             ▼                 ▼           │
//!                         │  ┌────────┐   ┌─────────┐   ┌──────────────────┐ │   Mirror
//!   Client Response       │  │ admin  │   │ static  │   │ dispatch +       │◀┼── sites
//!   ◀─────────────────────┼──│/__api__│   │platform │   │ html rewrite     │─┼─▶
//!                         │  └────────┘   └─────────┘   └──────────────────┘ │
//!                         │                                                   │
//!                         │  config · sites registry · health probe ·         │
//!                         │  observability · lifecycle                        │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mirror_proxy::config::{self, ProxyConfig};
use mirror_proxy::observability::{logging, metrics};
use mirror_proxy::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "mirror-proxy", version, about = "Sticky failover reverse proxy for mirror sites")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "MIRROR_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Mirror list, `name|url` pairs separated by commas
    #[arg(long, env = "PROXY_SITES")]
    sites: Option<String>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(short, long, env = "MIRROR_PROXY_BIND")]
    bind: Option<String>,

    /// Directory with the landing page and reserved assets
    #[arg(long, env = "MIRROR_PROXY_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "MIRROR_PROXY_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(sites) = self.sites {
            config.sites = Some(sites);
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(dir) = self.static_dir {
            config.platform.static_dir = Some(dir);
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ProxyConfig::default(),
    };
    let config = config::finalize(cli.apply(file_config))?;

    logging::init_logging(&config.observability);
    tracing::info!("mirror-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let registry = config.site_registry()?;
    for (index, site) in registry.iter() {
        tracing::info!(index, name = %site.name, url = %site.url, "Mirror site configured");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        sites = registry.len(),
        upstream_timeout_secs = config.upstream.request_timeout_secs,
        failover_on_upstream_502 = config.upstream.failover_on_upstream_502,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Already validated.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config, registry)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
