//! Trait base para geradores de dados históricos.

use async_trait::async_trait;
use serde_json::json;

use crate::types::history::{
    format_year, HistoryData, MIN_BOUNDARY_POINTS, REGION_LAT_MAX, REGION_LAT_MIN,
    REGION_LON_MAX, REGION_LON_MIN,
};
use crate::{ChronosError, ChronosResult};

/// Número máximo de entidades pedidas ao modelo.
pub const MAX_ENTITIES: usize = 8;

/// Requisição de geração para um ano.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// ID único da requisição.
    pub request_id: String,

    /// Ano alvo (negativo = a.C.).
    pub year: i32,

    /// Ano formatado ("711 CE", "218 BC").
    pub year_label: String,
}

impl GenerationRequest {
    /// Cria uma nova requisição de geração.
    pub fn new(year: i32) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            year,
            year_label: format_year(year),
        }
    }
}

/// Backend de geração de texto capaz de sintetizar o mapa de um ano.
///
/// Implementações só conversam com o modelo remoto. Cache e fallback
/// ficam em [`crate::service::HistoryService`].
#[async_trait]
pub trait HistoryGenerator: Send + Sync {
    /// Retorna o nome do gerador.
    fn name(&self) -> &str;

    /// Gera as entidades de `request.year`.
    async fn generate(&self, request: &GenerationRequest) -> ChronosResult<HistoryData>;

    /// Constrói o prompt para a geração.
    fn build_prompt(&self, request: &GenerationRequest) -> String {
        let mut prompt = format!(
            "Year: {}. Geography: Iberian Peninsula.\n",
            request.year_label
        );

        prompt.push_str("Tasks:\n");
        prompt.push_str(&format!(
            "1. Identify major political entities (max {}).\n",
            MAX_ENTITIES
        ));
        prompt.push_str(&format!(
            "2. For each, provide a smooth boundary (12-18 points) following the peninsula's shape (Lat {}-{}, Lon {}-{}).\n",
            REGION_LAT_MIN, REGION_LAT_MAX, REGION_LON_MIN, REGION_LON_MAX
        ));
        prompt.push_str("3. Provide a brief (max 150 chars) historical summary.\n\n");
        prompt.push_str("Return strictly valid JSON. Priority: Speed and accuracy.");

        prompt
    }

    /// Schema anexado à requisição para o modelo devolver saída estruturada.
    fn response_schema(&self) -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "year": { "type": "INTEGER" },
                "label": { "type": "STRING" },
                "entities": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "color": { "type": "STRING" },
                            "boundaryPoints": {
                                "type": "ARRAY",
                                "items": {
                                    "type": "ARRAY",
                                    "items": { "type": "NUMBER" },
                                    "minItems": 2,
                                    "maxItems": 2
                                }
                            },
                            "description": { "type": "STRING" }
                        },
                        "required": ["name", "color", "boundaryPoints", "description"]
                    }
                }
            },
            "required": ["year", "label", "entities"]
        })
    }
}

/// Converte o texto devolvido pelo modelo em [`HistoryData`].
///
/// Busca o primeiro objeto JSON na saída, descarta texto ao redor
/// (cercas de markdown, por exemplo) e valida a estrutura mínima.
pub fn parse_history_output(output: &str, generator_name: &str) -> ChronosResult<HistoryData> {
    let json_start = output.find('{');
    let json_end = output.rfind('}');

    let data: HistoryData = match (json_start, json_end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&output[start..=end])
            .map_err(|e| {
                ChronosError::generator(generator_name, format!("Failed to parse JSON: {}", e))
            })?,
        _ => {
            return Err(ChronosError::generator(
                generator_name,
                "Response does not contain a JSON object",
            ))
        }
    };

    validate_history(&data, generator_name)?;
    Ok(data)
}

/// Rejeita respostas que não podem ser desenhadas.
fn validate_history(data: &HistoryData, generator_name: &str) -> ChronosResult<()> {
    if data.entities.is_empty() {
        return Err(ChronosError::generator(
            generator_name,
            "Response has no entities",
        ));
    }

    if let Some(entity) = data.entities.iter().find(|e| !e.is_drawable()) {
        return Err(ChronosError::generator(
            generator_name,
            format!(
                "Entity '{}' has {} boundary points (minimum {})",
                entity.name,
                entity.boundary_points.len(),
                MIN_BOUNDARY_POINTS
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockGenerator;

    #[async_trait]
    impl HistoryGenerator for MockGenerator {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(&self, request: &GenerationRequest) -> ChronosResult<HistoryData> {
            Ok(HistoryData::fallback(request.year))
        }
    }

    const VALID: &str = r##"{"year": 1492, "label": "1492 CE", "entities": [
        {"name": "Crown of Castile", "color": "#dc2626",
         "boundaryPoints": [[43.5, -8.0], [43.4, -2.0], [37.0, -1.8], [36.2, -5.6]],
         "description": "Granada falls in January."}
    ]}"##;

    #[test]
    fn test_build_prompt() {
        let generator = MockGenerator;
        let request = GenerationRequest::new(-218);

        let prompt = generator.build_prompt(&request);

        assert!(prompt.contains("Year: 218 BC"));
        assert!(prompt.contains("Iberian Peninsula"));
        assert!(prompt.contains("max 8"));
        assert!(prompt.contains("12-18 points"));
        assert!(prompt.contains("Lat 35.5-43.8, Lon -9.5-3.5"));
    }

    #[test]
    fn test_response_schema_requires_entity_fields() {
        let schema = MockGenerator.response_schema();
        let required = &schema["properties"]["entities"]["items"]["required"];
        assert_eq!(
            required,
            &json!(["name", "color", "boundaryPoints", "description"])
        );
        assert_eq!(schema["properties"]["year"]["type"], "INTEGER");
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = GenerationRequest::new(711);
        let b = GenerationRequest::new(711);
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.year_label, "711 CE");
    }

    #[test]
    fn test_parse_valid_output() {
        let data = parse_history_output(VALID, "mock").unwrap();
        assert_eq!(data.year, 1492);
        assert_eq!(data.entities.len(), 1);
    }

    #[test]
    fn test_parse_output_inside_code_fence() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert!(parse_history_output(&fenced, "mock").is_ok());
    }

    #[test]
    fn test_parse_output_without_json() {
        let err = parse_history_output("No JSON here", "mock").unwrap_err();
        assert!(err.to_string().contains("does not contain"));
    }

    #[test]
    fn test_parse_output_without_entities() {
        let result = parse_history_output(r#"{"year": 1, "label": "1 CE", "entities": []}"#, "mock");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_output_with_degenerate_polygon() {
        let raw = r#"{"year": 1, "label": "1 CE", "entities": [
            {"name": "Line", "color": "red", "boundaryPoints": [[40, -3], [41, -3]], "description": ""}
        ]}"#;
        let err = parse_history_output(raw, "mock").unwrap_err();
        assert!(err.to_string().contains("Line"));
    }
}
