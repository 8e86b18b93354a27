//! Seed command - initializes the model catalog and image set

use tracing::info;

use super::bootstrap;

pub async fn run() -> anyhow::Result<()> {
    let config = bootstrap();

    let state = crate::create_app_state_with_config(&config).await?;
    state.orchestrator.initialize().await?;

    info!("Store seeded");
    Ok(())
}
