//! tickerdash - stock tracking dashboard, console edition.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tickerdash_app::{
    install_panic_hook, metrics_report, AppConfig, AppContext, ConsoleSurface, Page, Shell,
};
use tickerdash_widgets::Surface;
use tracing::info;

/// Stock tracking dashboard
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TICKERDASH_CONFIG env var)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page to open, overriding the configured one
    #[arg(short, long, value_enum)]
    page: Option<Page>,

    /// Print collected metrics on exit
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = AppConfig::resolve_path(args.config);
    let mut config = AppConfig::load(&config_path)?;
    if let Some(page) = args.page {
        config.page = page;
    }

    tickerdash_telemetry::init_logging(config.telemetry.log_level.as_deref())?;
    info!("Starting tickerdash v{}", env!("CARGO_PKG_VERSION"));
    info!(
        config_path = %config_path.display(),
        page = %config.page,
        base_url = %config.api.base_url,
        "Configuration loaded"
    );

    let surface: Arc<dyn Surface> = Arc::new(ConsoleSurface::stdout());
    install_panic_hook(surface.clone());

    let page = config.page;
    let ctx = Arc::new(AppContext::new(config, surface)?);
    let shell = Shell::new(ctx);
    shell.run(page).await?;

    if args.metrics {
        print!("{}", metrics_report()?);
    }

    Ok(())
}
