//! Radar display modes.

use serde::{Deserialize, Serialize};

/// Radar product shown by the tile overlay.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RadarMode {
    /// Base reflectivity composite
    #[default]
    Reflectivity,
    /// Enhanced echo tops composite
    EchoTops,
}

impl RadarMode {
    pub fn label(&self) -> &'static str {
        match self {
            RadarMode::Reflectivity => "Reflectivity",
            RadarMode::EchoTops => "Echo Tops",
        }
    }

    /// Product code substituted for `{product}` in the tile template.
    pub fn product_code(&self) -> &'static str {
        match self {
            RadarMode::Reflectivity => "N0Q",
            RadarMode::EchoTops => "EET",
        }
    }

    /// Parses the short form used in URL parameters.
    pub fn from_param(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "reflectivity" | "n0q" => Some(RadarMode::Reflectivity),
            "echotops" | "eet" => Some(RadarMode::EchoTops),
            _ => None,
        }
    }

    pub fn all() -> &'static [RadarMode] {
        &[RadarMode::Reflectivity, RadarMode::EchoTops]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_param() {
        assert_eq!(RadarMode::from_param("EET"), Some(RadarMode::EchoTops));
        assert_eq!(RadarMode::from_param("reflectivity"), Some(RadarMode::Reflectivity));
        assert_eq!(RadarMode::from_param("velocity"), None);
    }
}
