use anyhow::Result;

use {
    apiconf_common::{ModelInfo, ProviderName},
    apiconf_providers::{descriptor, known_providers, static_catalog},
};

pub fn list_providers() {
    println!(
        "{:<14} {:<24} {:<22} {:<8} {}",
        "ID", "NAME", "MODEL FIELD", "CATALOG", "DEFAULT MODEL"
    );
    for d in known_providers() {
        println!(
            "{:<14} {:<24} {:<22} {:<8} {}",
            d.provider.as_str(),
            d.display_name,
            d.model_field.key(),
            d.catalog.as_str(),
            d.default_model_id.unwrap_or("-"),
        );
    }
}

pub fn list_models(provider: &str) -> Result<()> {
    let provider: ProviderName = provider.parse()?;
    let catalog = static_catalog(provider);
    if catalog.is_empty() {
        let kind = descriptor(provider).catalog.as_str();
        println!("{provider} has no compiled-in catalog (catalog: {kind}).");
        return Ok(());
    }

    println!(
        "{:<48} {:>9} {:>8} {:>8} {:>8}  FLAGS",
        "MODEL", "CONTEXT", "MAX OUT", "IN $/M", "OUT $/M"
    );
    for (id, info) in catalog {
        println!(
            "{:<48} {:>9} {:>8} {:>8} {:>8}  {}",
            id,
            info.context_window,
            info.max_tokens.map_or_else(|| "-".to_string(), |n| n.to_string()),
            price(info.input_price),
            price(info.output_price),
            flags(info),
        );
    }
    Ok(())
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |p| format!("{p:.2}"))
}

fn flags(info: &ModelInfo) -> String {
    let mut flags = Vec::new();
    if info.supports_images {
        flags.push("images");
    }
    if info.supports_computer_use {
        flags.push("computer-use");
    }
    if info.supports_prompt_cache {
        flags.push(if info.is_prompt_cache_optional {
            "cache(optional)"
        } else {
            "cache"
        });
    }
    flags.join(",")
}
