//! Testes de integração para o serviço de busca e o cache por ano.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use iberia_chronos::generator::{parse_history_output, GenerationRequest, HistoryGenerator};
use iberia_chronos::service::HistoryService;
use iberia_chronos::types::history::{
    format_year, HistoryData, FALLBACK_ENTITY_NAME, MIN_BOUNDARY_POINTS,
};
use iberia_chronos::{ChronosError, ChronosResult};

/// Devolve texto fixo do modelo para cada ano e conta as chamadas.
struct ScriptedGenerator {
    calls: AtomicUsize,
    reply: fn(i32) -> Option<String>,
}

impl ScriptedGenerator {
    fn new(reply: fn(i32) -> Option<String>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> ChronosResult<HistoryData> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (self.reply)(request.year) {
            Some(text) => parse_history_output(&text, self.name()),
            None => Err(ChronosError::generator("scripted", "connection reset")),
        }
    }
}

fn al_andalus_711(year: i32) -> Option<String> {
    let body = serde_json::json!({
        "year": year,
        "label": format_year(year),
        "entities": [
            {
                "name": "Umayyad Caliphate",
                "color": "#15803d",
                "boundaryPoints": [[36.0, -6.5], [37.5, -1.0], [40.0, -0.5], [40.5, -7.0]],
                "description": "Tariq ibn Ziyad crosses the strait."
            },
            {
                "name": "Visigothic Kingdom",
                "color": "#b45309",
                "boundaryPoints": [[41.0, -8.5], [43.5, -8.0], [43.2, -2.0], [41.2, 0.5]],
                "description": "Roderic falls at Guadalete."
            },
            {
                "name": "Basques",
                "color": "#dc2626",
                "boundaryPoints": [[42.8, -2.8], [43.4, -2.8], [43.3, -1.3], [42.7, -1.5]],
                "description": "Independent mountain communities."
            }
        ]
    });
    Some(format!("```json\n{}\n```", body))
}

fn always_fails(_year: i32) -> Option<String> {
    None
}

fn too_few_points(year: i32) -> Option<String> {
    Some(format!(
        r##"{{"year": {}, "label": "{}", "entities": [{{"name": "Line", "color": "#000", "boundaryPoints": [[40.0, -3.0], [41.0, -2.0]], "description": ""}}]}}"##,
        year,
        format_year(year)
    ))
}

#[tokio::test]
async fn test_end_to_end_711() {
    let generator = ScriptedGenerator::new(al_andalus_711);
    let service = HistoryService::new(generator.clone());

    let data = service.fetch_historical_data(711).await;

    assert_eq!(data.year, 711);
    assert_eq!(data.label, "711 CE");
    assert!((1..=8).contains(&data.entities.len()));
    assert!(data
        .entities
        .iter()
        .all(|e| e.boundary_points.len() >= MIN_BOUNDARY_POINTS));
    assert!(!data.is_fallback());
    assert!(service.is_cached(711).await);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_repeated_fetch_is_served_from_cache() {
    let generator = ScriptedGenerator::new(al_andalus_711);
    let service = HistoryService::new(generator.clone());

    let first = service.fetch_historical_data(711).await;
    let second = service.fetch_historical_data(711).await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(generator.calls(), 1);

    let stats = service.cache_stats().await;
    assert_eq!(stats.size, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_failure_returns_fallback_and_is_retried() {
    let generator = ScriptedGenerator::new(always_fails);
    let service = HistoryService::new(generator.clone());

    let data = service.fetch_historical_data(-218).await;

    assert_eq!(data.year, -218);
    assert_eq!(data.label, "218 BC");
    assert_eq!(data.entities.len(), 1);
    let entity = &data.entities[0];
    assert_eq!(entity.name, FALLBACK_ENTITY_NAME);
    assert_eq!(entity.color, "#94a3b8");
    assert_eq!(
        entity.boundary_points,
        vec![[36.0, -9.0], [36.0, 3.0], [43.0, 3.0], [43.0, -9.0]]
    );
    assert_eq!(
        entity.description,
        "Connection error or data unavailable for this specific era."
    );

    assert!(!service.is_cached(-218).await);
    service.fetch_historical_data(-218).await;
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn test_degenerate_boundaries_degrade_to_fallback() {
    let service = HistoryService::new(ScriptedGenerator::new(too_few_points));

    let data = service.fetch_historical_data(1000).await;

    assert!(data.is_fallback());
    assert!(service.cached_years().await.is_empty());
}

#[tokio::test]
async fn test_years_are_cached_independently() {
    let generator = ScriptedGenerator::new(al_andalus_711);
    let service = HistoryService::new(generator.clone());

    let (a, b) = tokio::join!(
        service.fetch_historical_data(1492),
        service.fetch_historical_data(-3000)
    );

    assert_eq!(a.year, 1492);
    assert_eq!(b.label, "3000 BC");
    assert_eq!(service.cached_years().await, vec![-3000, 1492]);
    assert_eq!(generator.calls(), 2);
}
