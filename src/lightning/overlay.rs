//! Strike markers with age-based styling and eviction.

use super::strike::Strike;
use crate::geo::BoundingBox;
use eframe::egui::Color32;

/// Lowest opacity a marker fades to before eviction.
const MIN_OPACITY: f32 = 0.2;

/// Color stops from fresh to old: white, yellow, orange, dark red.
const AGE_RAMP: [(u8, u8, u8); 4] = [(255, 255, 255), (255, 230, 40), (255, 130, 20), (150, 20, 20)];

/// Visual style of a marker at a given age.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub color: Color32,
    pub opacity: f32,
}

/// Computes the color/opacity of a strike `age_ms` old.
pub fn marker_style(age_ms: i64, max_age_ms: i64) -> MarkerStyle {
    let fraction = if max_age_ms <= 0 {
        1.0
    } else {
        (age_ms.max(0) as f32 / max_age_ms as f32).clamp(0.0, 1.0)
    };

    let segments = (AGE_RAMP.len() - 1) as f32;
    let position = fraction * segments;
    let index = (position.floor() as usize).min(AGE_RAMP.len() - 2);
    let t = position - index as f32;
    let (r0, g0, b0) = AGE_RAMP[index];
    let (r1, g1, b1) = AGE_RAMP[index + 1];
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;

    let opacity = 1.0 - fraction * (1.0 - MIN_OPACITY);
    let color = Color32::from_rgb(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1)).gamma_multiply(opacity);

    MarkerStyle { color, opacity }
}

/// Age of a strike at `now_ms`. Feed times are untrusted, so this saturates
/// instead of overflowing.
fn age_ms(now_ms: i64, strike: &Strike) -> i64 {
    now_ms.saturating_sub(strike.time)
}

/// Lightning overlay state: rendered markers plus ingestion bookkeeping.
pub struct StrikeOverlay {
    markers: Vec<Strike>,
    /// Newest strike time seen so far (epoch ms)
    last_seen: Option<i64>,
    /// Only strikes inside this box are rendered when filtering is on
    bounds: Option<BoundingBox>,
    max_age_ms: i64,
}

impl StrikeOverlay {
    pub fn new(max_age_ms: i64) -> Self {
        Self {
            markers: Vec::new(),
            last_seen: None,
            bounds: None,
            max_age_ms,
        }
    }

    /// Enables (`Some`) or disables (`None`) bounding box filtering.
    pub fn set_bounds(&mut self, bounds: Option<BoundingBox>) {
        self.bounds = bounds;
    }

    #[allow(dead_code)]
    pub fn last_seen(&self) -> Option<i64> {
        self.last_seen
    }

    #[allow(dead_code)]
    pub fn markers(&self) -> &[Strike] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Adds markers for the strikes in `batch` newer than anything seen
    /// before this batch, honoring the bounding box filter.
    ///
    /// Returns the number of markers added.
    pub fn ingest(&mut self, batch: &[Strike], now_ms: i64) -> usize {
        let threshold = self.last_seen;
        let mut added = 0;

        for strike in batch {
            if threshold.is_some_and(|seen| strike.time <= seen) {
                continue;
            }
            // Stale, or implausibly far in the future
            let age = age_ms(now_ms, strike);
            if age > self.max_age_ms || age < -self.max_age_ms {
                continue;
            }
            if let Some(bounds) = &self.bounds {
                if !bounds.contains(strike.lat, strike.lon) {
                    continue;
                }
            }
            self.markers.push(*strike);
            added += 1;
        }

        if let Some(newest) = batch.iter().map(|s| s.time).max() {
            self.last_seen = Some(self.last_seen.map_or(newest, |seen| seen.max(newest)));
        }

        if added > 0 {
            log::debug!("Rendered {} new strikes ({} on map)", added, self.markers.len());
        }
        added
    }

    /// Removes markers older than the maximum age. Returns how many were removed.
    pub fn sweep(&mut self, now_ms: i64) -> usize {
        let before = self.markers.len();
        let max_age = self.max_age_ms;
        self.markers.retain(|strike| age_ms(now_ms, strike) <= max_age);
        before - self.markers.len()
    }

    /// Drops all markers. The last-seen time is kept so old strikes are
    /// not replayed when the overlay is shown again.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Markers with their current style, oldest first.
    pub fn styled_markers(&self, now_ms: i64) -> impl Iterator<Item = (&Strike, MarkerStyle)> {
        let max_age = self.max_age_ms;
        self.markers
            .iter()
            .map(move |strike| (strike, marker_style(age_ms(now_ms, strike), max_age)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX_AGE: i64 = 10 * 60 * 1000;
    const NOW: i64 = 1_714_564_800_000;

    #[test]
    fn test_only_newer_than_last_seen_render() {
        let mut overlay = StrikeOverlay::new(MAX_AGE);
        let first = [Strike::new(35.0, -97.0, NOW - 3000), Strike::new(35.1, -97.1, NOW - 2000)];
        assert_eq!(overlay.ingest(&first, NOW), 2);
        assert_eq!(overlay.last_seen(), Some(NOW - 2000));

        let second = [
            Strike::new(35.2, -97.2, NOW - 2500),
            Strike::new(35.3, -97.3, NOW - 2000),
            Strike::new(35.4, -97.4, NOW - 1000),
        ];
        assert_eq!(overlay.ingest(&second, NOW), 1);
        assert_eq!(overlay.len(), 3);
        assert_eq!(overlay.markers().last(), Some(&Strike::new(35.4, -97.4, NOW - 1000)));
    }

    #[test]
    fn test_strikes_within_one_batch_share_threshold() {
        let mut overlay = StrikeOverlay::new(MAX_AGE);
        // Out-of-order strikes in a single batch are all newer than the
        // previous batch, so they all render.
        let batch = [Strike::new(35.0, -97.0, NOW - 1000), Strike::new(35.1, -97.1, NOW - 4000)];
        assert_eq!(overlay.ingest(&batch, NOW), 2);
    }

    #[test]
    fn test_bounding_box_filter() {
        let mut overlay = StrikeOverlay::new(MAX_AGE);
        overlay.set_bounds(Some(BoundingBox::new(30.0, 40.0, -100.0, -90.0)));

        let batch = [
            Strike::new(35.0, -95.0, NOW - 1000),
            Strike::new(45.0, -95.0, NOW - 900),
            Strike::new(35.0, -80.0, NOW - 800),
        ];
        assert_eq!(overlay.ingest(&batch, NOW), 1);
        assert_eq!(overlay.markers(), &[Strike::new(35.0, -95.0, NOW - 1000)]);
        // Out-of-box strikes still advance the last-seen time.
        assert_eq!(overlay.last_seen(), Some(NOW - 800));
    }

    #[test]
    fn test_filter_disabled_renders_all() {
        let mut overlay = StrikeOverlay::new(MAX_AGE);
        overlay.set_bounds(None);
        let batch = [Strike::new(35.0, -95.0, NOW - 1000), Strike::new(-20.0, 130.0, NOW - 900)];
        assert_eq!(overlay.ingest(&batch, NOW), 2);
    }

    #[test]
    fn test_sweep_removes_expired_markers() {
        let mut overlay = StrikeOverlay::new(MAX_AGE);
        let batch = [
            Strike::new(35.0, -97.0, NOW - MAX_AGE + 1000),
            Strike::new(35.1, -97.1, NOW - 1000),
        ];
        assert_eq!(overlay.ingest(&batch, NOW), 2);

        assert_eq!(overlay.sweep(NOW), 0);
        assert_eq!(overlay.sweep(NOW + 2000), 1);
        assert_eq!(overlay.markers(), &[Strike::new(35.1, -97.1, NOW - 1000)]);
    }

    #[test]
    fn test_stale_strikes_are_not_rendered() {
        let mut overlay = StrikeOverlay::new(MAX_AGE);
        assert_eq!(overlay.ingest(&[Strike::new(35.0, -97.0, NOW - MAX_AGE - 1)], NOW), 0);
    }

    #[test]
    fn test_extreme_feed_times_do_not_overflow() {
        let mut overlay = StrikeOverlay::new(MAX_AGE);
        assert_eq!(overlay.ingest(&[Strike::new(35.0, -97.0, i64::MIN)], NOW), 0);
        assert_eq!(overlay.ingest(&[Strike::new(35.0, -97.0, i64::MAX)], NOW), 0);
        assert!(overlay.is_empty());

        let mut overlay = StrikeOverlay::new(MAX_AGE);
        assert_eq!(overlay.ingest(&[Strike::new(35.0, -97.0, NOW - 1000)], NOW), 1);
        assert_eq!(overlay.sweep(i64::MIN), 0);
        assert_eq!(overlay.styled_markers(i64::MIN).count(), 1);
        assert_eq!(overlay.sweep(i64::MAX), 1);
    }

    #[test]
    fn test_clear_keeps_last_seen() {
        let mut overlay = StrikeOverlay::new(MAX_AGE);
        overlay.ingest(&[Strike::new(35.0, -97.0, NOW - 1000)], NOW);
        overlay.clear();
        assert!(overlay.is_empty());
        assert_eq!(overlay.ingest(&[Strike::new(35.0, -97.0, NOW - 1000)], NOW), 0);
    }

    #[test]
    fn test_marker_style_decays() {
        let fresh = marker_style(0, MAX_AGE);
        let mid = marker_style(MAX_AGE / 2, MAX_AGE);
        let old = marker_style(MAX_AGE, MAX_AGE);

        assert_eq!(fresh.opacity, 1.0);
        assert_eq!(fresh.color, Color32::WHITE);
        assert!(mid.opacity < fresh.opacity && mid.opacity > old.opacity);
        assert!((old.opacity - MIN_OPACITY).abs() < 1e-6);
        assert!(old.color.r() > old.color.g());
    }
}
