//! Polygon styling, hover state, hit testing and the visible viewport.

use geo::{Contains, LineString, Point, Polygon};

use crate::types::config::{MapConfig, MAX_MAP_ZOOM as MAX_ZOOM, MIN_MAP_ZOOM as MIN_ZOOM};
use crate::types::history::HistoricalEntity;

const BASE_FILL_OPACITY: f64 = 0.45;
const BASE_WEIGHT: f64 = 1.5;
const SELECTED_FILL_OPACITY: f64 = 0.8;
const SELECTED_WEIGHT: f64 = 4.0;
const HOVER_FILL_OPACITY: f64 = 0.7;
const HOVER_WEIGHT: f64 = 2.5;

/// Width of the viewport, in 256px tiles.
const TILES_ACROSS: f64 = 3.0;

/// Path options for one polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonStyle {
    /// Stroke color.
    pub color: String,
    /// Fill color.
    pub fill_color: String,
    /// Fill opacity in `[0, 1]`.
    pub fill_opacity: f64,
    /// Stroke weight in pixels.
    pub weight: f64,
    pub line_join: &'static str,
    pub line_cap: &'static str,
}

impl PolygonStyle {
    fn with_emphasis(color: &str, fill_opacity: f64, weight: f64) -> Self {
        Self {
            color: color.to_string(),
            fill_color: color.to_string(),
            fill_opacity,
            weight,
            line_join: "round",
            line_cap: "round",
        }
    }
}

/// How an entity is currently drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    Hovered,
    Selected,
}

/// An entity paired with its resolved style, in draw order.
#[derive(Debug, Clone)]
pub struct StyledPolygon<'a> {
    pub entity: &'a HistoricalEntity,
    pub emphasis: Emphasis,
    pub style: PolygonStyle,
}

/// Geographic extent shown on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl Viewport {
    /// Maps the center of cell `(col, row)` of a `cols x rows` grid to
    /// `(lat, lon)`. Row 0 is the northern edge.
    pub fn cell_to_geo(&self, col: u16, row: u16, cols: u16, rows: u16) -> Option<(f64, f64)> {
        if cols == 0 || rows == 0 || col >= cols || row >= rows {
            return None;
        }
        let fx = (f64::from(col) + 0.5) / f64::from(cols);
        let fy = (f64::from(row) + 0.5) / f64::from(rows);
        let lon = self.lon_min + fx * (self.lon_max - self.lon_min);
        let lat = self.lat_max - fy * (self.lat_max - self.lat_min);
        Some((lat, lon))
    }

    /// Whether `(lat, lon)` lies inside the viewport.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

/// Map view model: camera, hover state and styling rules.
///
/// Selection is owned by the shell and passed in by name; hover is purely
/// cosmetic and lives here.
#[derive(Debug, Clone)]
pub struct MapView {
    center: [f64; 2],
    zoom: u8,
    hovered: Option<usize>,
}

impl MapView {
    /// Creates a view centered on `[lat, lon]`.
    pub fn new(center: [f64; 2], zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            hovered: None,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.center, config.zoom)
    }

    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    /// Moves the center by a fraction of the current viewport span.
    pub fn pan(&mut self, dlat_fraction: f64, dlon_fraction: f64) {
        let span = self.lon_span();
        self.center[0] = (self.center[0] + dlat_fraction * span).clamp(-85.0, 85.0);
        self.center[1] = (self.center[1] + dlon_fraction * span).clamp(-180.0, 180.0);
    }

    /// Longitude span shown at the current zoom.
    fn lon_span(&self) -> f64 {
        360.0 / f64::from(1u32 << self.zoom) * TILES_ACROSS
    }

    /// Extent for a drawing surface whose height/width ratio is `aspect`.
    ///
    /// Latitude is compressed by `cos(lat)` the way a Web Mercator basemap
    /// appears near the center.
    pub fn viewport(&self, aspect: f64) -> Viewport {
        let lon_span = self.lon_span();
        let lat_span = lon_span * aspect * self.center[0].to_radians().cos();
        Viewport {
            lat_min: self.center[0] - lat_span / 2.0,
            lat_max: self.center[0] + lat_span / 2.0,
            lon_min: self.center[1] - lon_span / 2.0,
            lon_max: self.center[1] + lon_span / 2.0,
        }
    }

    /// Index of the hovered entity, if any.
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Sets the hovered entity. Returns whether it changed.
    pub fn set_hover(&mut self, index: Option<usize>) -> bool {
        let changed = self.hovered != index;
        self.hovered = index;
        changed
    }

    /// Updates hover from a pointer position.
    pub fn pointer_moved(&mut self, entities: &[HistoricalEntity], lat: f64, lon: f64) -> bool {
        let index = Self::hit_test(entities, lat, lon).map(|(i, _)| i);
        self.set_hover(index)
    }

    /// Clears hover when the entity list changes.
    pub fn reset_hover(&mut self) {
        self.hovered = None;
    }

    /// Resolves the style of entity `index`.
    pub fn style_for(
        &self,
        index: usize,
        entity: &HistoricalEntity,
        selected_name: Option<&str>,
    ) -> (Emphasis, PolygonStyle) {
        let emphasis = if selected_name == Some(entity.name.as_str()) {
            Emphasis::Selected
        } else if self.hovered == Some(index) {
            Emphasis::Hovered
        } else {
            Emphasis::Normal
        };

        let style = match emphasis {
            Emphasis::Selected => {
                PolygonStyle::with_emphasis(&entity.color, SELECTED_FILL_OPACITY, SELECTED_WEIGHT)
            }
            Emphasis::Hovered => {
                PolygonStyle::with_emphasis(&entity.color, HOVER_FILL_OPACITY, HOVER_WEIGHT)
            }
            Emphasis::Normal => {
                PolygonStyle::with_emphasis(&entity.color, BASE_FILL_OPACITY, BASE_WEIGHT)
            }
        };

        (emphasis, style)
    }

    /// Styles every entity, preserving draw order.
    pub fn styled<'a>(
        &self,
        entities: &'a [HistoricalEntity],
        selected_name: Option<&str>,
    ) -> Vec<StyledPolygon<'a>> {
        entities
            .iter()
            .enumerate()
            .map(|(index, entity)| {
                let (emphasis, style) = self.style_for(index, entity, selected_name);
                StyledPolygon {
                    entity,
                    emphasis,
                    style,
                }
            })
            .collect()
    }

    /// Topmost entity containing `(lat, lon)`, with its index.
    ///
    /// Entities later in the list are drawn on top, so the search runs from
    /// the end.
    pub fn hit_test(
        entities: &[HistoricalEntity],
        lat: f64,
        lon: f64,
    ) -> Option<(usize, &HistoricalEntity)> {
        let point = Point::new(lon, lat);
        entities
            .iter()
            .enumerate()
            .rev()
            .find(|(_, entity)| entity.is_drawable() && to_polygon(entity).contains(&point))
    }

    /// Entity clicked at `(lat, lon)`; the full record is handed to the shell.
    pub fn click<'a>(
        &self,
        entities: &'a [HistoricalEntity],
        lat: f64,
        lon: f64,
    ) -> Option<&'a HistoricalEntity> {
        Self::hit_test(entities, lat, lon).map(|(_, entity)| entity)
    }
}

/// Builds a planar polygon with x = longitude, y = latitude.
pub(crate) fn to_polygon(entity: &HistoricalEntity) -> Polygon<f64> {
    let ring: Vec<(f64, f64)> = entity
        .boundary_points
        .iter()
        .map(|[lat, lon]| (*lon, *lat))
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(name: &str, lat: f64, lon: f64, size: f64) -> HistoricalEntity {
        HistoricalEntity::new(
            name,
            "#ef4444",
            vec![
                [lat, lon],
                [lat, lon + size],
                [lat + size, lon + size],
                [lat + size, lon],
            ],
            format!("{} description", name),
        )
    }

    fn view() -> MapView {
        MapView::new([40.0, -3.7], 6)
    }

    #[test]
    fn test_base_style() {
        let entity = square("A", 38.0, -6.0, 2.0);
        let (emphasis, style) = view().style_for(0, &entity, None);

        assert_eq!(emphasis, Emphasis::Normal);
        assert_eq!(style.fill_opacity, 0.45);
        assert_eq!(style.weight, 1.5);
        assert_eq!(style.fill_color, "#ef4444");
        assert_eq!(style.line_join, "round");
    }

    #[test]
    fn test_selected_style_matches_by_name() {
        let entity = square("A", 38.0, -6.0, 2.0);
        let (emphasis, style) = view().style_for(0, &entity, Some("A"));

        assert_eq!(emphasis, Emphasis::Selected);
        assert_eq!(style.fill_opacity, 0.8);
        assert_eq!(style.weight, 4.0);
    }

    #[test]
    fn test_hover_applies_only_to_unselected() {
        let entities = vec![square("A", 38.0, -6.0, 2.0), square("B", 41.0, -2.0, 1.0)];
        let mut view = view();
        assert!(view.set_hover(Some(0)));
        assert!(!view.set_hover(Some(0)));

        let styled = view.styled(&entities, None);
        assert_eq!(styled[0].emphasis, Emphasis::Hovered);
        assert_eq!(styled[0].style.fill_opacity, 0.7);
        assert_eq!(styled[0].style.weight, 2.5);
        assert_eq!(styled[1].emphasis, Emphasis::Normal);

        let styled = view.styled(&entities, Some("A"));
        assert_eq!(styled[0].emphasis, Emphasis::Selected);
    }

    #[test]
    fn test_hover_reverts_on_exit() {
        let entities = vec![square("A", 38.0, -6.0, 2.0)];
        let mut view = view();

        assert!(view.pointer_moved(&entities, 39.0, -5.0));
        assert_eq!(view.hovered(), Some(0));

        assert!(view.pointer_moved(&entities, 42.0, 2.0));
        assert_eq!(view.hovered(), None);
        assert_eq!(view.styled(&entities, None)[0].style.fill_opacity, 0.45);
    }

    #[test]
    fn test_shared_names_highlight_together() {
        let entities = vec![square("Taifa", 38.0, -6.0, 1.0), square("Taifa", 41.0, -2.0, 1.0)];
        let styled = view().styled(&entities, Some("Taifa"));
        assert!(styled.iter().all(|p| p.emphasis == Emphasis::Selected));
    }

    #[test]
    fn test_click_returns_full_record() {
        let entities = vec![square("A", 38.0, -6.0, 2.0)];
        let clicked = view().click(&entities, 39.0, -5.0).unwrap();
        assert_eq!(clicked, &entities[0]);
        assert!(view().click(&entities, 30.0, -5.0).is_none());
    }

    #[test]
    fn test_topmost_entity_wins() {
        let entities = vec![square("Bottom", 37.0, -7.0, 4.0), square("Top", 38.0, -6.0, 1.0)];

        let (index, entity) = MapView::hit_test(&entities, 38.5, -5.5).unwrap();
        assert_eq!(index, 1);
        assert_eq!(entity.name, "Top");

        let (_, entity) = MapView::hit_test(&entities, 40.5, -3.5).unwrap();
        assert_eq!(entity.name, "Bottom");
    }

    #[test]
    fn test_degenerate_entities_are_not_hit() {
        let line = HistoricalEntity::new("Line", "red", vec![[38.0, -6.0], [40.0, -4.0]], "");
        assert!(MapView::hit_test(&[line], 39.0, -5.0).is_none());
    }

    #[test]
    fn test_viewport_centered() {
        let vp = view().viewport(0.5);
        assert!(((vp.lon_min + vp.lon_max) / 2.0 + 3.7).abs() < 1e-9);
        assert!(((vp.lat_min + vp.lat_max) / 2.0 - 40.0).abs() < 1e-9);
        assert!(vp.contains(40.0, -3.7));
        assert!((vp.lon_max - vp.lon_min - 16.875).abs() < 1e-9);
    }

    #[test]
    fn test_cell_to_geo_corners() {
        let vp = Viewport {
            lat_min: 30.0,
            lat_max: 50.0,
            lon_min: -10.0,
            lon_max: 10.0,
        };

        let (lat, lon) = vp.cell_to_geo(0, 0, 10, 10).unwrap();
        assert!((lat - 49.0).abs() < 1e-9);
        assert!((lon + 9.0).abs() < 1e-9);

        assert!(vp.cell_to_geo(10, 0, 10, 10).is_none());
        assert!(vp.cell_to_geo(0, 0, 0, 10).is_none());
    }

    #[test]
    fn test_zoom_limits_and_pan() {
        let mut view = MapView::new([40.0, -3.7], 20);
        assert_eq!(view.zoom(), 10);
        view.zoom_in();
        assert_eq!(view.zoom(), 10);

        let mut view = MapView::new([40.0, -3.7], 3);
        view.zoom_out();
        assert_eq!(view.zoom(), 3);

        let mut view = MapView::new([40.0, -3.7], 6);
        view.pan(0.0, 0.5);
        assert!(view.center()[1] > -3.7);
    }
}
