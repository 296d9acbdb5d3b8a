use anyhow::Context;
use clap::Parser;
use meshid_core::MeshIdConfig;
use meshid_daemon::{router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "meshid_daemon")]
#[command(about = "MeshCore identifier allocation and naming service", long_about = None)]
struct Args {
    /// Config file (TOML or YAML); searched in standard locations when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the config
    #[arg(short, long)]
    port: Option<u16>,

    /// Bind address, overriding the config
    #[arg(short, long)]
    bind: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "meshid_daemon=trace,meshid_core=debug,tower_http=debug"
    } else {
        "meshid_daemon=debug,meshid_core=info,tower_http=debug"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => MeshIdConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => MeshIdConfig::find_and_load().unwrap_or_else(|e| {
            tracing::warn!("{}, using defaults", e);
            MeshIdConfig::default()
        }),
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let state = AppState::from_config(&config)?;
    if state.sources.is_empty() {
        tracing::warn!("No node sources configured, every identifier will look free");
    }

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("meshid daemon listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
