//! Configuração interativa do Iberia Chronos.
//!
//! Este módulo implementa a configuração interativa usando dialoguer.

use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::types::config::{Config, MAX_MAP_ZOOM, MIN_MAP_ZOOM};
use crate::ChronosResult;

/// Executa a configuração interativa.
pub fn run_interactive_config(config_path: &Path) -> ChronosResult<()> {
    let theme = ColorfulTheme::default();

    println!("\n🔧 Iberia Chronos configuration\n");

    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Creating a new configuration...\n");
        Config::default_config()
    };

    loop {
        let options = vec![
            "General",
            "Gemini",
            "Map",
            "Save and exit",
            "Exit without saving",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What do you want to configure?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_gemini(&theme, &mut config)?,
            2 => configure_map(&theme, &mut config)?,
            3 => {
                config.save(config_path)?;
                println!("\n✓ Configuration saved to: {}\n", config_path.display());
                break;
            }
            4 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Really exit without saving?")
                    .default(false)
                    .interact()?
                {
                    println!("\nExiting without saving.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Configura opções gerais.
fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> ChronosResult<()> {
    println!("\n📋 General\n");

    let log_levels = vec!["error", "warn", "info", "debug", "trace"];
    let current_idx = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let log_level_idx = Select::with_theme(theme)
        .with_prompt("Log level")
        .items(&log_levels)
        .default(current_idx)
        .interact()?;

    config.general.log_level = log_levels[log_level_idx].to_string();

    let log_formats = vec!["text", "json"];
    let current_format_idx = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let log_format_idx = Select::with_theme(theme)
        .with_prompt("Log format")
        .items(&log_formats)
        .default(current_format_idx)
        .interact()?;

    config.general.log_format = log_formats[log_format_idx].to_string();

    println!("\n✓ General settings updated.\n");
    Ok(())
}

/// Configura o gerador Gemini.
fn configure_gemini(theme: &ColorfulTheme, config: &mut Config) -> ChronosResult<()> {
    println!("\n🤖 Gemini\n");

    let api_url: String = Input::with_theme(theme)
        .with_prompt("API base URL")
        .default(config.gemini.api_url.clone())
        .interact_text()?;
    config.gemini.api_url = api_url;

    let model: String = Input::with_theme(theme)
        .with_prompt("Model")
        .default(config.gemini.model.clone())
        .interact_text()?;
    config.gemini.model = model;

    let api_key_env: String = Input::with_theme(theme)
        .with_prompt("Environment variable holding the API key")
        .default(config.gemini.api_key_env.clone())
        .validate_with(|value: &String| -> Result<(), &str> {
            if value.trim().is_empty() {
                Err("the variable name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    config.gemini.api_key_env = api_key_env.trim().to_string();

    if config.gemini.api_key().is_none() {
        println!(
            "\n⚠ {} is not set; lookups will show the fallback map.",
            config.gemini.api_key_env
        );
    }

    println!("\n✓ Gemini settings updated.\n");
    Ok(())
}

/// Configura o mapa base.
fn configure_map(theme: &ColorfulTheme, config: &mut Config) -> ChronosResult<()> {
    println!("\n🗺  Map\n");

    let tile_url: String = Input::with_theme(theme)
        .with_prompt("Tile URL template")
        .default(config.map.tile_url.clone())
        .interact_text()?;
    config.map.tile_url = tile_url;

    let attribution: String = Input::with_theme(theme)
        .with_prompt("Attribution")
        .default(config.map.attribution.clone())
        .interact_text()?;
    config.map.attribution = attribution;

    let lat: f64 = Input::with_theme(theme)
        .with_prompt("Center latitude")
        .default(config.map.center[0])
        .validate_with(|value: &f64| -> Result<(), &str> {
            if (-85.0..=85.0).contains(value) {
                Ok(())
            } else {
                Err("latitude must be between -85 and 85")
            }
        })
        .interact_text()?;

    let lon: f64 = Input::with_theme(theme)
        .with_prompt("Center longitude")
        .default(config.map.center[1])
        .validate_with(|value: &f64| -> Result<(), &str> {
            if (-180.0..=180.0).contains(value) {
                Ok(())
            } else {
                Err("longitude must be between -180 and 180")
            }
        })
        .interact_text()?;
    config.map.center = [lat, lon];

    let zoom: u8 = Input::with_theme(theme)
        .with_prompt("Initial zoom (3-10)")
        .default(config.map.zoom)
        .validate_with(|value: &u8| -> Result<(), &str> {
            if (MIN_MAP_ZOOM..=MAX_MAP_ZOOM).contains(value) {
                Ok(())
            } else {
                Err("zoom must be between 3 and 10")
            }
        })
        .interact_text()?;
    config.map.zoom = zoom;

    println!("\n✓ Map settings updated.\n");
    Ok(())
}

/// Mostra resumo da configuração atual.
pub fn show_config_summary(config: &Config) {
    let key_status = if config.gemini.api_key().is_some() {
        "set"
    } else {
        "missing"
    };

    println!("\n📊 Configuration summary\n");
    println!("┌─────────────────────────────────────────┐");
    println!("│ General                                 │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Log level: {:<28} │", config.general.log_level);
    println!("│ Log format: {:<27} │", config.general.log_format);
    println!("├─────────────────────────────────────────┤");
    println!("│ Gemini                                  │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Model: {:<32} │", config.gemini.model);
    println!(
        "│ Key: {:<34} │",
        format!("{} ({})", config.gemini.api_key_env, key_status)
    );
    println!("├─────────────────────────────────────────┤");
    println!("│ Map                                     │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Center: {:<31} │",
        format!("{:.2}, {:.2}", config.map.center[0], config.map.center[1])
    );
    println!("│ Zoom: {:<33} │", config.map.zoom);
    println!("└─────────────────────────────────────────┘\n");
}
