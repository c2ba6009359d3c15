//! Map view: polygon styling, hit testing, basemap tiles and export.

mod geojson;
mod tiles;
mod view;

pub use tiles::{tile_for, TileSource};
pub use view::{Emphasis, MapView, PolygonStyle, StyledPolygon, Viewport};

pub(crate) use view::to_polygon;
