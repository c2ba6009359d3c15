//! GeoJSON export of a year's styled polygons.

use serde_json::{json, Value};

use crate::types::history::HistoryData;

use super::tiles::{tile_for, TileSource};
use super::view::MapView;

impl MapView {
    /// Builds a `FeatureCollection` with one Polygon feature per entity.
    ///
    /// Coordinates are emitted as `[lon, lat]` with the ring closed; the
    /// stored boundary is left as is. Entities with fewer than three points
    /// are skipped.
    pub fn to_geojson(
        &self,
        data: &HistoryData,
        selected_name: Option<&str>,
        tiles: &TileSource,
    ) -> Value {
        let features: Vec<Value> = self
            .styled(&data.entities, selected_name)
            .into_iter()
            .enumerate()
            .filter(|(_, polygon)| polygon.entity.is_drawable())
            .map(|(z_index, polygon)| {
                let mut ring: Vec<[f64; 2]> = polygon
                    .entity
                    .boundary_points
                    .iter()
                    .map(|[lat, lon]| [*lon, *lat])
                    .collect();
                if ring.first() != ring.last() {
                    if let Some(first) = ring.first().copied() {
                        ring.push(first);
                    }
                }

                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [ring]
                    },
                    "properties": {
                        "name": polygon.entity.name,
                        "description": polygon.entity.description,
                        "zIndex": z_index,
                        "stroke": polygon.style.color,
                        "stroke-width": polygon.style.weight,
                        "fill": polygon.style.fill_color,
                        "fill-opacity": polygon.style.fill_opacity,
                        "selected": selected_name == Some(polygon.entity.name.as_str())
                    }
                })
            })
            .collect();

        let [lat, lon] = self.center();
        let (x, y) = tile_for(lat, lon, self.zoom());

        json!({
            "type": "FeatureCollection",
            "year": data.year,
            "label": data.label,
            "center": [lon, lat],
            "zoom": self.zoom(),
            "tiles": [tiles.url_template()],
            "preview": tiles.tile_url(self.zoom(), x, y),
            "attribution": tiles.attribution(),
            "features": features
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::MapConfig;
    use crate::types::history::HistoricalEntity;

    fn sample() -> HistoryData {
        HistoryData {
            year: 1212,
            label: "1212 CE".to_string(),
            entities: vec![
                HistoricalEntity::new(
                    "Almohad Caliphate",
                    "#15803d",
                    vec![[36.0, -7.0], [36.0, -2.0], [38.5, -2.0], [38.5, -7.0]],
                    "Defeated at Las Navas de Tolosa.",
                ),
                HistoricalEntity::new("Broken", "#000", vec![[40.0, -3.0]], ""),
            ],
        }
    }

    #[test]
    fn test_feature_collection() {
        let config = MapConfig::default();
        let view = MapView::from_config(&config);
        let tiles = TileSource::from_config(&config);

        let geojson = view.to_geojson(&sample(), Some("Almohad Caliphate"), &tiles);

        assert_eq!(geojson["type"], "FeatureCollection");
        assert_eq!(geojson["label"], "1212 CE");
        assert_eq!(geojson["attribution"], config.attribution.as_str());

        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);

        let feature = &features[0];
        assert_eq!(feature["properties"]["selected"], true);
        assert_eq!(feature["properties"]["fill-opacity"], 0.8);

        let ring = feature["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], json!([-7.0, 36.0]));
        assert_eq!(ring[0], ring[4]);
    }

    #[test]
    fn test_source_data_is_untouched() {
        let data = sample();
        let before = data.clone();
        let config = MapConfig::default();
        MapView::from_config(&config).to_geojson(&data, None, &TileSource::from_config(&config));
        assert_eq!(data, before);
    }
}
