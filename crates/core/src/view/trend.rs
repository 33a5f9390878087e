use std::collections::VecDeque;

/// Number of points the trend window holds.
pub const TREND_LEN: usize = 7;
/// Offset of the short-term projection point appended with each reading.
pub const PROJECTION_DELTA: f64 = 6.0;
/// PM2.5 magnitude above which the trend renders as critical.
pub const CRITICAL_PM2_5: f64 = 150.0;
/// Trend shown at startup and restored on reset.
pub const BASELINE_TREND: [f64; TREND_LEN] = [31.0, 34.0, 32.0, 36.0, 35.0, 38.0, 37.0];
/// Illustrative ascending trend installed by the demo trigger.
pub const DEMO_TREND: [f64; TREND_LEN] = [60.0, 78.0, 95.0, 115.0, 138.0, 162.0, 185.0];

/// Fixed-length FIFO of recent PM2.5-derived magnitudes.
#[derive(Debug, Clone)]
pub struct TrendBuffer {
    points: VecDeque<f64>,
}

impl TrendBuffer {
    pub fn new() -> Self {
        Self {
            points: VecDeque::from(BASELINE_TREND),
        }
    }

    /// Append the reading's magnitude plus its projection point, evicting
    /// the oldest entries beyond the window.
    pub fn record(&mut self, pm2_5: f64) {
        self.push(pm2_5);
        self.push(pm2_5 + PROJECTION_DELTA);
    }

    /// Replace the window with the demo sequence.
    pub fn install_demo(&mut self) {
        self.points = VecDeque::from(DEMO_TREND);
    }

    /// Restore the baseline window.
    pub fn restore_baseline(&mut self) {
        self.points = VecDeque::from(BASELINE_TREND);
    }

    pub fn points(&self) -> Vec<f64> {
        self.points.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn push(&mut self, point: f64) {
        if self.points.len() == TREND_LEN {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }
}

impl Default for TrendBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_baseline() {
        let t = TrendBuffer::new();
        assert_eq!(t.points(), BASELINE_TREND.to_vec());
    }

    #[test]
    fn never_exceeds_window_length() {
        let mut t = TrendBuffer::new();
        for i in 0..50 {
            t.record(f64::from(i));
            assert_eq!(t.len(), TREND_LEN);
        }
    }

    #[test]
    fn evicts_oldest_first() {
        let mut t = TrendBuffer::new();
        t.record(100.0);
        let points = t.points();
        // The two oldest baseline points are gone; the new magnitude and
        // its projection sit at the end.
        assert_eq!(points.len(), TREND_LEN);
        assert_eq!(points[..5], BASELINE_TREND[2..]);
        assert_eq!(points[5], 100.0);
        assert_eq!(points[6], 100.0 + PROJECTION_DELTA);
    }

    #[test]
    fn demo_trend_ascends_past_critical() {
        let mut t = TrendBuffer::new();
        t.install_demo();
        let points = t.points();
        assert!(points.windows(2).all(|w| w[0] < w[1]));
        assert!(*points.last().unwrap() > CRITICAL_PM2_5);
    }

    #[test]
    fn baseline_restores_after_demo() {
        let mut t = TrendBuffer::new();
        t.install_demo();
        t.restore_baseline();
        assert_eq!(t.points(), BASELINE_TREND.to_vec());
    }
}
