use std::io;
use std::process::ExitCode;

use sales_dashboard::config::DashboardConfig;
use sales_dashboard::dashboard::{emit, Dashboard};
use sales_dashboard::loader::{connect, load};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    // stdout carries frames; logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,duckdb=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = DashboardConfig::from_env()?;
    info!(path = %config.store.path, read_only = config.store.read_only, "opening warehouse");
    let con = connect(&config.store)?;
    let dataset = load(&con)?;
    drop(con);

    let mut dashboard = Dashboard::new(dataset);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    emit(&mut out, &dashboard.frame())?;

    dashboard.serve(io::stdin().lock(), &mut out)?;
    info!("input closed, shutting down");
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "dashboard failed");
            ExitCode::FAILURE
        }
    }
}
