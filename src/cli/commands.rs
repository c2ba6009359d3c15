//! Implementação dos comandos CLI do Iberia Chronos.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::map::{MapView, TileSource};
use crate::service::HistoryService;
use crate::shell::{parse_year, Shell};
use crate::tui::ExplorerApp;
use crate::types::config::{Config, DEFAULT_CONFIG_FILE};
use crate::types::history::{format_year, HistoryData};
use crate::{ChronosError, ChronosResult};

/// Inicializa a configuração no diretório indicado.
pub async fn init(path: Option<PathBuf>) -> ChronosResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(DEFAULT_CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'iberia-chronos config' to modify.");
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("Iberia Chronos initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Export your Gemini key: export {}=...",
        config.gemini.api_key_env
    );
    println!("  2. Check the setup: iberia-chronos doctor");
    println!("  3. Start exploring: iberia-chronos explore --year 711");

    Ok(())
}

/// Abre o explorador interativo.
pub async fn explore(year: &str, config: &Config, log_receiver: Receiver<String>) -> ChronosResult<()> {
    let year = parse_year(year)?;

    let service = Arc::new(HistoryService::from_config(config));
    let shell = Shell::new(service, year);

    let initial = shell.clone();
    tokio::spawn(async move {
        initial.load_history(year).await;
    });

    let runtime = tokio::runtime::Handle::current();
    let map = MapView::from_config(&config.map);
    let tiles = TileSource::from_config(&config.map);

    tokio::task::spawn_blocking(move || {
        ExplorerApp::new(shell, runtime, map, tiles, log_receiver)?.run()
    })
    .await
    .map_err(|e| ChronosError::other(format!("explorer task failed: {}", e)))?
}

/// Mostra as entidades de um ano.
pub async fn show(year: &str, json: bool, config: &Config) -> ChronosResult<()> {
    let year = parse_year(year)?;
    let data = fetch_with_spinner(year, config).await;

    if json {
        println!("{}", serde_json::to_string_pretty(data.as_ref())?);
        return Ok(());
    }

    print_history(&data);
    Ok(())
}

/// Exporta um ano como GeoJSON.
pub async fn export(year: &str, output: &Path, config: &Config) -> ChronosResult<()> {
    let year = parse_year(year)?;
    let data = fetch_with_spinner(year, config).await;

    let view = MapView::from_config(&config.map);
    let tiles = TileSource::from_config(&config.map);
    let geojson = view.to_geojson(&data, None, &tiles);

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, serde_json::to_string_pretty(&geojson)?)?;

    if data.is_fallback() {
        println!("⚠ No data for {}; exported the fallback area.", data.label);
    }
    println!(
        "✓ {} entities for {} exported to {}",
        data.entities.len(),
        data.label,
        output.display()
    );

    Ok(())
}

async fn fetch_with_spinner(year: i32, config: &Config) -> Arc<HistoryData> {
    let service = HistoryService::from_config(config);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Accessing history for {}...", format_year(year)));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let data = service.fetch_historical_data(year).await;
    spinner.finish_and_clear();
    data
}

fn print_history(data: &HistoryData) {
    println!("{} · {} entities\n", data.label, data.entities.len());

    for entity in &data.entities {
        println!("■ {} ({})", entity.name, entity.color);
        if !entity.description.is_empty() {
            println!("    {}", entity.description);
        }
        println!("    {} boundary points", entity.boundary_points.len());
    }

    if data.is_fallback() {
        println!();
        println!("⚠ Generation failed; showing the placeholder area.");
        println!("  Run 'iberia-chronos doctor' to check the Gemini setup.");
    }
}

/// Configura opções interativamente.
pub async fn config_cmd(config_path: &Path) -> ChronosResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Diagnostica problemas de configuração.
pub async fn doctor(config: &Config) -> ChronosResult<()> {
    println!("Diagnosing Iberia Chronos configuration...\n");

    let mut issues: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    println!("✓ Configuration loaded");

    if config.gemini.api_key().is_some() {
        println!("✓ API key found in {}", config.gemini.api_key_env);
    } else {
        issues.push(format!(
            "{} is not set - every lookup will show the fallback map",
            config.gemini.api_key_env
        ));
    }

    match reqwest::Url::parse(&config.gemini.api_url) {
        Ok(url) if url.scheme() == "https" => println!("✓ Endpoint: {}", url),
        Ok(url) => warnings.push(format!("Endpoint is not HTTPS: {}", url)),
        Err(e) => issues.push(format!("Invalid API URL '{}': {}", config.gemini.api_url, e)),
    }

    if config.gemini.model.trim().is_empty() {
        issues.push("No Gemini model configured".to_string());
    } else {
        println!("✓ Model: {}", config.gemini.model);
    }

    let template = &config.map.tile_url;
    if ["{z}", "{x}", "{y}"].iter().all(|p| template.contains(p)) {
        println!("✓ Tile template: {}", template);
    } else {
        warnings.push(format!("Tile template is missing {{z}}/{{x}}/{{y}}: {}", template));
    }

    if config.map.attribution.trim().is_empty() {
        warnings.push("Map attribution is empty".to_string());
    }

    if !(3..=10).contains(&config.map.zoom) {
        warnings.push(format!(
            "Zoom {} is outside 3-10 and will be clamped",
            config.map.zoom
        ));
    }

    println!();
    if issues.is_empty() && warnings.is_empty() {
        println!("✓ All good! Iberia Chronos is ready.");
    } else {
        if !warnings.is_empty() {
            println!("Warnings:");
            for warning in warnings {
                println!("  ⚠ {}", warning);
            }
        }
        if !issues.is_empty() {
            println!("Problems:");
            for issue in issues {
                println!("  ✗ {}", issue);
            }
        }
    }

    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("iberia-chronos {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Historical map of the Iberian Peninsula, 3000 BC to 2026 CE");
}
