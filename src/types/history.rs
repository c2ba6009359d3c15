//! Historical map data: entities, per-year result sets and the fallback value.

use serde::{Deserialize, Serialize};

/// Southern edge of the Iberian Peninsula region (latitude).
pub const REGION_LAT_MIN: f64 = 35.5;
/// Northern edge of the region (latitude).
pub const REGION_LAT_MAX: f64 = 43.8;
/// Western edge of the region (longitude).
pub const REGION_LON_MIN: f64 = -9.5;
/// Eastern edge of the region (longitude).
pub const REGION_LON_MAX: f64 = 3.5;

/// Name of the placeholder entity returned when no data could be generated.
pub const FALLBACK_ENTITY_NAME: &str = "Information Unavailable";
const FALLBACK_COLOR: &str = "#94a3b8";
const FALLBACK_DESCRIPTION: &str = "Connection error or data unavailable for this specific era.";
const FALLBACK_BOUNDARY: [[f64; 2]; 4] = [[36.0, -9.0], [36.0, 3.0], [43.0, 3.0], [43.0, -9.0]];

/// Minimum number of points for a drawable polygon.
pub const MIN_BOUNDARY_POINTS: usize = 3;

/// A political entity drawn as one polygon on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEntity {
    /// Display label.
    pub name: String,

    /// CSS color used for fill and stroke.
    pub color: String,

    /// Closed polygon as `[latitude, longitude]` pairs.
    pub boundary_points: Vec<[f64; 2]>,

    /// Short historical summary.
    pub description: String,
}

impl HistoricalEntity {
    /// Creates a new entity.
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        boundary_points: Vec<[f64; 2]>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            boundary_points,
            description: description.into(),
        }
    }

    /// Placeholder shown when generation fails. Covers the whole region.
    pub fn unavailable() -> Self {
        Self::new(
            FALLBACK_ENTITY_NAME,
            FALLBACK_COLOR,
            FALLBACK_BOUNDARY.to_vec(),
            FALLBACK_DESCRIPTION,
        )
    }

    /// Whether the boundary has enough points to form a polygon.
    pub fn is_drawable(&self) -> bool {
        self.boundary_points.len() >= MIN_BOUNDARY_POINTS
    }

    /// Arithmetic mean of the boundary points, used to place labels.
    pub fn label_anchor(&self) -> Option<[f64; 2]> {
        if self.boundary_points.is_empty() {
            return None;
        }
        let n = self.boundary_points.len() as f64;
        let (lat, lon) = self
            .boundary_points
            .iter()
            .fold((0.0, 0.0), |(lat, lon), p| (lat + p[0], lon + p[1]));
        Some([lat / n, lon / n])
    }
}

/// Entities for one year, in draw order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
    /// Signed year; negative values are BCE.
    pub year: i32,

    /// Display string such as "711 CE".
    pub label: String,

    /// Entities in z-order (first drawn first).
    pub entities: Vec<HistoricalEntity>,
}

impl HistoryData {
    /// Fallback value for `year`: a single placeholder entity.
    pub fn fallback(year: i32) -> Self {
        Self {
            year,
            label: format_year(year),
            entities: vec![HistoricalEntity::unavailable()],
        }
    }

    /// True when this is the placeholder produced by [`HistoryData::fallback`].
    pub fn is_fallback(&self) -> bool {
        self.entities.len() == 1 && self.entities[0].name == FALLBACK_ENTITY_NAME
    }

    /// Looks up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&HistoricalEntity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Formats a signed year as "N BC" or "N CE".
pub fn format_year(year: i32) -> String {
    if year < 0 {
        format!("{} BC", year.unsigned_abs())
    } else {
        format!("{} CE", year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_year() {
        assert_eq!(format_year(711), "711 CE");
        assert_eq!(format_year(-218), "218 BC");
        assert_eq!(format_year(0), "0 CE");
        assert_eq!(format_year(-3000), "3000 BC");
    }

    #[test]
    fn test_fallback_shape() {
        let data = HistoryData::fallback(-50);
        assert_eq!(data.year, -50);
        assert_eq!(data.label, "50 BC");
        assert_eq!(data.entities.len(), 1);
        assert_eq!(data.entities[0].name, "Information Unavailable");
        assert_eq!(data.entities[0].boundary_points.len(), 4);
        assert!(data.is_fallback());
    }

    #[test]
    fn test_entity_wire_format_uses_camel_case() {
        let entity = HistoricalEntity::new("Al-Andalus", "#16a34a", vec![[37.0, -4.0]], "Umayyad");
        let json = serde_json::to_value(&entity).unwrap();
        assert!(json.get("boundaryPoints").is_some());
        assert!(json.get("boundary_points").is_none());
    }

    #[test]
    fn test_parse_history_data() {
        let raw = r##"{
            "year": 711,
            "label": "711 CE",
            "entities": [{
                "name": "Visigothic Kingdom",
                "color": "#b45309",
                "boundaryPoints": [[42.0, -8.0], [42.0, 2.0], [37.0, -1.0]],
                "description": "Collapsing after Guadalete."
            }]
        }"##;

        let data: HistoryData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.year, 711);
        assert!(data.entities[0].is_drawable());
        assert!(!data.is_fallback());
        assert!(data.entity("Visigothic Kingdom").is_some());
    }

    #[test]
    fn test_point_with_three_coordinates_is_rejected() {
        let raw = r#"{"name":"X","color":"red","boundaryPoints":[[1,2,3]],"description":""}"#;
        assert!(serde_json::from_str::<HistoricalEntity>(raw).is_err());
    }

    #[test]
    fn test_label_anchor() {
        let entity = HistoricalEntity::unavailable();
        let [lat, lon] = entity.label_anchor().unwrap();
        assert!((lat - 39.5).abs() < 1e-9);
        assert!((lon + 3.0).abs() < 1e-9);
    }
}
