use anyhow::{Context, Result};
use i18n_engine::config::AppConfig;
use i18n_engine::translator::Translator;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("i18n_engine=info".parse()?),
        )
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    info!(
        "Loading translations from {} ({} namespaces)",
        config.locales_dir.display(),
        config.namespaces.len()
    );

    let translator =
        Translator::new(config.translator_config()).context("Invalid translator configuration")?;
    translator.initialize().await;

    if let Some(error) = translator.initialization_error() {
        info!("Initialization finished with error: {}", error);
    }

    let keys: Vec<String> = std::env::args().skip(1).collect();
    if keys.is_empty() {
        let snapshot = serde_json::to_string_pretty(&translator.debug_info())
            .context("Failed to serialize debug snapshot")?;
        println!("{}", snapshot);
        return Ok(());
    }

    for key in &keys {
        println!("{} = {}", key, translator.translate(key));
    }
    Ok(())
}
