//! View synchronization: projections of engine state into the models the
//! rendering layer consumes.
//!
//! `ViewSync` holds the only view-owned state — the trend window and the
//! resource counter. Everything else is derived from the alert mode on
//! every projection.

mod counter;
mod status;
mod trend;

pub use counter::ResourceCounter;
pub use status::{HardwareStatus, LinkState, MapState, PatrolState, SuppressorState};
pub use trend::{
    BASELINE_TREND, CRITICAL_PM2_5, DEMO_TREND, PROJECTION_DELTA, TREND_LEN, TrendBuffer,
};

use serde::Serialize;

use crate::types::{AlertMode, Coord, SensorReading, Verdict};

/// Everything the rendering layer needs, published after every state
/// change.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub mode: AlertMode,
    pub last_reading: Option<SensorReading>,
    pub last_verdict: Option<Verdict>,
    pub trend: Vec<f64>,
    pub map: MapState,
    pub hardware: HardwareStatus,
    pub litres_saved: u64,
    pub submissions: u64,
}

/// Mutable view state plus the projection that assembles a
/// `DashboardView` snapshot.
#[derive(Debug, Default)]
pub struct ViewSync {
    trend: TrendBuffer,
    counter: ResourceCounter,
}

impl ViewSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolved real submission extends the trend window.
    pub fn on_submission(&mut self, reading: &SensorReading) {
        self.trend.record(reading.pm2_5);
    }

    /// A demo trigger replaces the trend wholesale.
    pub fn on_demo(&mut self) {
        self.trend.install_demo();
    }

    /// A reset restores the baseline trend.
    pub fn on_reset(&mut self) {
        self.trend.restore_baseline();
    }

    /// Counter cadence tick; advances only outside critical. Returns
    /// true when the counter moved.
    pub fn on_counter_tick(&mut self, mode: AlertMode) -> bool {
        self.counter.tick(mode)
    }

    pub fn litres_saved(&self) -> u64 {
        self.counter.total()
    }

    pub fn trend_points(&self) -> Vec<f64> {
        self.trend.points()
    }

    /// Assemble the full dashboard snapshot for the current state.
    pub fn project(
        &self,
        mode: AlertMode,
        at: Coord,
        last_reading: Option<&SensorReading>,
        last_verdict: Option<&Verdict>,
        submissions: u64,
    ) -> DashboardView {
        DashboardView {
            mode,
            last_reading: last_reading.cloned(),
            last_verdict: last_verdict.cloned(),
            trend: self.trend.points(),
            map: MapState::derive(at, mode),
            hardware: HardwareStatus::derive(mode),
            litres_saved: self.counter.total(),
            submissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Coord {
        Coord {
            lat: 30.0,
            lon: 31.0,
        }
    }

    #[test]
    fn projection_mirrors_critical_mode() {
        let views = ViewSync::new();
        let snap = views.project(AlertMode::Critical, coord(), None, None, 3);
        assert!(snap.map.critical);
        assert_eq!(snap.hardware.network, LinkState::Overloaded);
        assert_eq!(snap.submissions, 3);
    }

    #[test]
    fn projection_mirrors_normal_mode() {
        let views = ViewSync::new();
        let snap = views.project(AlertMode::Monitoring, coord(), None, None, 1);
        assert!(!snap.map.critical);
        assert_eq!(snap.hardware.suppressors, SuppressorState::Idle);
        assert_eq!(snap.trend, BASELINE_TREND.to_vec());
    }

    #[test]
    fn demo_and_reset_swap_trend() {
        let mut views = ViewSync::new();
        views.on_demo();
        assert_eq!(views.trend_points(), DEMO_TREND.to_vec());
        views.on_reset();
        assert_eq!(views.trend_points(), BASELINE_TREND.to_vec());
    }
}
