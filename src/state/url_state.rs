//! URL parameters for shareable views.
//!
//! `?mode=eet&lightning=0&lat=35.2&lon=-97.4&zoom=6` restores the radar
//! mode, lightning toggle and map view on page load.

use crate::radar::RadarMode;

/// Parsed URL parameters.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UrlParams {
    pub mode: Option<RadarMode>,
    pub lightning: Option<bool>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub zoom: Option<f64>,
}

/// Parses a query string (with or without the leading `?`).
pub fn parse_query(query: &str) -> UrlParams {
    let mut params = UrlParams::default();

    let query = query.trim_start_matches('?');
    if query.is_empty() {
        return params;
    }

    for pair in query.split('&') {
        let mut kv = pair.splitn(2, '=');
        let key = kv.next().unwrap_or("");
        let value = kv.next().unwrap_or("");
        match key {
            "mode" => params.mode = RadarMode::from_param(value),
            "lightning" => {
                params.lightning = match value {
                    "1" | "true" | "on" => Some(true),
                    "0" | "false" | "off" => Some(false),
                    _ => None,
                }
            }
            "lat" => params.lat = value.parse().ok(),
            "lon" => params.lon = value.parse().ok(),
            "zoom" => params.zoom = value.parse().ok(),
            _ => {}
        }
    }

    params
}

/// Parse URL query parameters from the current browser URL.
#[cfg(target_arch = "wasm32")]
pub fn parse_from_url() -> UrlParams {
    let Some(search) = web_sys::window().and_then(|w| w.location().search().ok()) else {
        return UrlParams::default();
    };
    parse_query(&search)
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn parse_from_url() -> UrlParams {
    UrlParams::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_query() {
        let params = parse_query("?mode=eet&lightning=0&lat=35.2&lon=-97.4&zoom=6");
        assert_eq!(
            params,
            UrlParams {
                mode: Some(RadarMode::EchoTops),
                lightning: Some(false),
                lat: Some(35.2),
                lon: Some(-97.4),
                zoom: Some(6.0),
            }
        );
    }

    #[test]
    fn test_ignores_unknown_and_invalid() {
        let params = parse_query("foo=bar&lat=north&mode=velocity");
        assert_eq!(params, UrlParams::default());
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(parse_query(""), UrlParams::default());
        assert_eq!(parse_query("?"), UrlParams::default());
    }
}
