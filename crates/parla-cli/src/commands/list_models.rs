//! The `parla list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use parla_core::traits::ModelInfo;
use parla_providers::ollama::OllamaProvider;
use parla_providers::{create_provider, ProviderConfig};

pub async fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = parla_providers::config::load_config_from(config_path.as_deref())?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    let mut found_any = false;

    for name in names {
        if provider_filter.as_ref().is_some_and(|filter| filter != name) {
            continue;
        }

        let models: Vec<ModelInfo> = match &config.providers[name] {
            ProviderConfig::Ollama { base_url } => {
                match OllamaProvider::new(base_url)?.list_models_async().await {
                    Ok(models) => models,
                    Err(e) => {
                        tracing::warn!("{name}: {e:#}");
                        continue;
                    }
                }
            }
            other => match create_provider(name, other) {
                Ok(provider) => provider.available_models(),
                Err(e) => {
                    tracing::warn!("{name}: {e:#}");
                    continue;
                }
            },
        };

        if !models.is_empty() {
            found_any = true;
            let marker = if *name == config.default_provider { " (default)" } else { "" };
            println!("Provider: {name}{marker}");
            for model in &models {
                println!(
                    "  {} - {} ({}K context, ${:.5}/{:.5} per 1K tokens)",
                    model.id,
                    model.name,
                    model.max_context / 1000,
                    model.cost_per_1k_input,
                    model.cost_per_1k_output,
                );
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Set OPENAI_API_KEY or run `parla init` to create a config file.");
    }

    Ok(())
}
