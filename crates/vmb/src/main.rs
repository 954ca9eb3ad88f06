use std::sync::Arc;

use vmb_core::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vmb_core::logging::init("vmb")?;

    let cfg = Arc::new(Config::load()?);
    tracing::info!(
        prefix = %cfg.command_prefix,
        error_report_threshold = cfg.error_report_threshold,
        "configuration loaded"
    );

    vmb_telegram::router::run_polling(cfg).await
}
