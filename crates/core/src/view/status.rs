use serde::Serialize;

use crate::types::{AlertMode, Coord};

/// Network link indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkState {
    Online,
    Overloaded,
}

/// Emission-suppression equipment indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuppressorState {
    Idle,
    Firing,
}

/// Patrol unit indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatrolState {
    Patrol,
    Tracking,
}

/// Display state of the three hardware subsystems — a pure function of
/// the alert mode, with no state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HardwareStatus {
    pub network: LinkState,
    pub suppressors: SuppressorState,
    pub patrols: PatrolState,
}

impl HardwareStatus {
    pub fn derive(mode: AlertMode) -> Self {
        if mode == AlertMode::Critical {
            Self {
                network: LinkState::Overloaded,
                suppressors: SuppressorState::Firing,
                patrols: PatrolState::Tracking,
            }
        } else {
            Self {
                network: LinkState::Online,
                suppressors: SuppressorState::Idle,
                patrols: PatrolState::Patrol,
            }
        }
    }
}

/// What the map surface consumes: the observed coordinate and whether to
/// render it critical. Mirrors the alert mode with no hysteresis.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MapState {
    pub latitude: f64,
    pub longitude: f64,
    pub critical: bool,
}

impl MapState {
    pub fn derive(at: Coord, mode: AlertMode) -> Self {
        Self {
            latitude: at.lat,
            longitude: at.lon,
            critical: mode == AlertMode::Critical,
        }
    }
}
