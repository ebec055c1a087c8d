use anyhow::{Context, Result};
use article_digest::{api, config, logging, processing::SummaryService};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Summarize articles and PDFs with Gemini behind a small HTTP API.
#[derive(Debug, Parser)]
#[command(name = "article-digest", version, about)]
struct Cli {
    /// Address to bind (overrides `SERVER_HOST`).
    #[arg(long)]
    host: Option<IpAddr>,
    /// Port to bind (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
    /// HTML page served on `/` (overrides `FRONTEND_HTML_PATH`).
    #[arg(long)]
    frontend: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut config::Config) {
        if let Some(host) = self.host {
            config.server_host = host;
        }
        if let Some(port) = self.port {
            config.server_port = port;
        }
        if let Some(frontend) = self.frontend {
            config.frontend_path = frontend;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::init_config().context("failed to load configuration")?;
    cli.apply(&mut config);
    let _log_guard = logging::init_tracing(&config);
    tracing::debug!(
        model = %config.gemini_model,
        base_url = %config.gemini_base_url,
        language = %config.summary_language,
        frontend = %config.frontend_path.display(),
        log_file = %config.log_file.display(),
        api_key_present = config.has_api_key(),
        "Loaded configuration"
    );

    let service = Arc::new(SummaryService::from_config(&config));
    let app = api::create_router(service, &config);

    let addr = SocketAddr::new(config.server_host, config.server_port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;

    Ok(())
}
