//! `askbase doctor` — Diagnose configuration health.

use askbase_config::AppConfig;
use std::path::PathBuf;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Askbase Doctor — Configuration Diagnostics");
    println!("=============================================\n");

    let mut issues = 0;

    let config_path = std::env::var("ASKBASE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("askbase.toml"));

    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!(
            "  ⚠️  No config file at {} — defaults will be used",
            config_path.display()
        );
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            println!("     base_url:        {}", config.base_url);
            println!("     model:           {}", config.model);
            println!("     embedding_model: {}", config.embedding_model);

            if config.has_api_key() {
                println!("  ✅ API key configured");
            } else {
                println!("  ❌ No API key — set ASKBASE_API_KEY or add api_key to config");
                issues += 1;
            }

            // Provider reachability: GET /models with a short timeout
            match check_provider(&config).await {
                Ok(status) if status < 500 => {
                    println!("  ✅ Provider reachable ({})", config.base_url);
                }
                Ok(status) => {
                    println!("  ⚠️  Provider returned status {status}");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider unreachable: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

async fn check_provider(config: &AppConfig) -> Result<u16, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?;

    let url = format!("{}/models", config.base_url.trim_end_matches('/'));
    let mut request = client.get(&url);
    if let Some(key) = &config.api_key {
        request = request.header("Authorization", format!("Bearer {key}"));
    }

    let response = request.send().await?;
    Ok(response.status().as_u16())
}
