//! Slippy-map tile source for the basemap.

use std::f64::consts::PI;

use crate::types::config::MapConfig;

const DEFAULT_SUBDOMAINS: [&str; 4] = ["a", "b", "c", "d"];
/// Deepest zoom any slippy-map provider serves.
pub const MAX_TILE_ZOOM: u8 = 24;

/// Read-only basemap tile source and its required attribution.
#[derive(Debug, Clone)]
pub struct TileSource {
    url_template: String,
    attribution: String,
    subdomains: Vec<String>,
    retina: bool,
}

impl TileSource {
    pub fn new(url_template: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            attribution: attribution.into(),
            subdomains: DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            retina: false,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.tile_url.clone(), config.attribution.clone())
    }

    /// Requests `@2x` tiles where the template has `{r}`.
    #[must_use]
    pub fn with_retina(mut self, retina: bool) -> Self {
        self.retina = retina;
        self
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    /// Expands the template for tile `(z, x, y)`.
    ///
    /// The subdomain rotates with `x + y`, matching what Leaflet does.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            let idx = (u64::from(x) + u64::from(y)) % self.subdomains.len() as u64;
            self.subdomains[idx as usize].as_str()
        };

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
            .replace("{r}", if self.retina { "@2x" } else { "" })
    }
}

/// Web Mercator tile containing `(lat, lon)` at `zoom`.
///
/// Zooms past [`MAX_TILE_ZOOM`] are clamped to it.
pub fn tile_for(lat: f64, lon: f64, zoom: u8) -> (u32, u32) {
    let zoom = zoom.min(MAX_TILE_ZOOM);
    let n = f64::from(1u32 << zoom);
    let lat = lat.clamp(-85.051_128_78, 85.051_128_78).to_radians();
    let x = ((lon + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();
    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}
