//! Tile URL templates for the time-partitioned radar tile server.

use crate::geo::TileId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Composite radar tiles from the Iowa Environmental Mesonet tile cache,
/// published every five minutes.
pub const DEFAULT_TEMPLATE: &str = "https://mesonet.agron.iastate.edu/cache/tile.py/1.0.0/ridge::USCOMP-{product}-{year}{month}{day}{hour}{minute}/{z}/{x}/{y}.png";

/// URL template with `{year}`, `{month}`, `{day}`, `{hour}`, `{minute}`,
/// `{z}`, `{x}`, `{y}` and `{product}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileTemplate(pub String);

impl Default for TileTemplate {
    fn default() -> Self {
        Self(DEFAULT_TEMPLATE.to_string())
    }
}

impl TileTemplate {
    #[allow(dead_code)]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Resolves the time and product placeholders, leaving `{z}/{x}/{y}`
    /// for per-tile expansion.
    pub fn at_time(&self, time: DateTime<Utc>, product: &str) -> TileTemplate {
        let resolved = self
            .0
            .replace("{year}", &time.format("%Y").to_string())
            .replace("{month}", &time.format("%m").to_string())
            .replace("{day}", &time.format("%d").to_string())
            .replace("{hour}", &time.format("%H").to_string())
            .replace("{minute}", &time.format("%M").to_string())
            .replace("{product}", product);
        TileTemplate(resolved)
    }

    /// Expands the tile address placeholders.
    pub fn tile_url(&self, tile: TileId) -> String {
        self.0
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    /// Fully expanded URL for one tile at one time.
    pub fn url(&self, time: DateTime<Utc>, product: &str, tile: TileId) -> String {
        self.at_time(time, product).tile_url(tile)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_template_expansion() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 9, 5, 0).unwrap();
        let url = TileTemplate::default().url(time, "N0Q", TileId::new(4, 3, 6));
        assert_eq!(
            url,
            "https://mesonet.agron.iastate.edu/cache/tile.py/1.0.0/ridge::USCOMP-N0Q-202405010905/4/3/6.png"
        );
    }

    #[test]
    fn test_partial_resolution_keeps_tile_placeholders() {
        let time = Utc.with_ymd_and_hms(2023, 12, 31, 23, 55, 0).unwrap();
        let template = TileTemplate::new("https://tiles/{year}/{month}/{day}/{hour}{minute}/{z}/{x}/{y}.png");
        let resolved = template.at_time(time, "EET");
        assert_eq!(resolved.as_str(), "https://tiles/2023/12/31/2355/{z}/{x}/{y}.png");
        assert_eq!(
            resolved.tile_url(TileId::new(5, 7, 12)),
            "https://tiles/2023/12/31/2355/5/7/12.png"
        );
    }
}
