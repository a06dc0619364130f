mod config;
mod main_lib;
mod notifier;
mod scheduler;

use assessapp_core::portfolio::PortfolioServiceTrait;
use config::Config;
use main_lib::{build_context, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let context = build_context(&config).await?;

    tracing::info!(
        "Sources: [{}], alert transport: {}",
        context.source_ids.join(", "),
        context.transport_name
    );

    match context.portfolio_service.summary().await {
        Ok(summary) => tracing::info!(
            "Portfolio: {} active positions, total {:.2} {}, weighted EV {:.2}%",
            summary.position_weights.len(),
            summary.total_value,
            config.base_currency,
            summary.weighted_ev
        ),
        Err(e) => tracing::warn!("Could not compute portfolio summary: {}", e),
    }

    let handles = if config.enable_scheduler {
        scheduler::start_scheduler(context.scheduler.clone())
    } else {
        tracing::info!("Scheduler disabled");
        Vec::new()
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    for handle in handles {
        handle.abort();
    }
    drop(context);
    Ok(())
}
