use std::time::Duration;

use crate::types::Coord;

/// All engine tunables. Defaults match the reference deployment; every
/// field can be overridden through a `DUSTGUARD_*` environment variable
/// of the same name.
#[derive(Debug, Clone)]
pub struct GuardCfg {
    /// Fixed observation coordinate for the live feeds and the map.
    pub latitude: f64,
    pub longitude: f64,

    /// Per-request timeout for the live weather/pollution feeds (ms).
    pub feed_timeout_ms: u64,
    /// End-to-end bound on a classification request (ms).
    pub predict_timeout_ms: u64,

    /// Cadence of the water-saved counter (ms).
    pub counter_interval_ms: u64,
    /// Delay before reopening a dropped speech session (ms).
    pub voice_restart_delay_ms: u64,

    /// Inbound event channel capacity.
    pub event_buffer: usize,
}

impl Default for GuardCfg {
    fn default() -> Self {
        Self {
            latitude: 30.0444,
            longitude: 31.2357,
            feed_timeout_ms: 5_000,
            predict_timeout_ms: 8_000,
            counter_interval_ms: 1_000,
            voice_restart_delay_ms: 1_000,
            event_buffer: 256,
        }
    }
}

impl GuardCfg {
    /// Defaults with `DUSTGUARD_*` environment overrides applied.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            latitude: env_or("DUSTGUARD_LATITUDE", d.latitude),
            longitude: env_or("DUSTGUARD_LONGITUDE", d.longitude),
            feed_timeout_ms: env_or("DUSTGUARD_FEED_TIMEOUT_MS", d.feed_timeout_ms),
            predict_timeout_ms: env_or("DUSTGUARD_PREDICT_TIMEOUT_MS", d.predict_timeout_ms),
            counter_interval_ms: env_or("DUSTGUARD_COUNTER_INTERVAL_MS", d.counter_interval_ms),
            voice_restart_delay_ms: env_or(
                "DUSTGUARD_VOICE_RESTART_DELAY_MS",
                d.voice_restart_delay_ms,
            ),
            event_buffer: env_or("DUSTGUARD_EVENT_BUFFER", d.event_buffer),
        }
    }

    pub fn coord(&self) -> Coord {
        Coord {
            lat: self.latitude,
            lon: self.longitude,
        }
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_millis(self.feed_timeout_ms)
    }

    pub fn predict_timeout(&self) -> Duration {
        Duration::from_millis(self.predict_timeout_ms)
    }

    pub fn counter_interval(&self) -> Duration {
        Duration::from_millis(self.counter_interval_ms)
    }

    pub fn voice_restart_delay(&self) -> Duration {
        Duration::from_millis(self.voice_restart_delay_ms)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
