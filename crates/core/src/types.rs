use serde::Serialize;

pub use dustguard_feeds::source::{
    AirQualityFeed, AirQualityObs, Classifier, Coord, FeedError, InvalidReading, SensorReading,
    TrafficDensity, Verdict, VerdictOrigin, WeatherFeed, WeatherObs,
};

/// System alert mode — the single source of truth every dependent view
/// derives from. There is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum AlertMode {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// At least one submission attempted; no deployment indicated.
    Monitoring,
    /// Cleaning equipment deployment indicated or simulated.
    Critical,
}

impl std::fmt::Display for AlertMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Monitoring => "monitoring",
            Self::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Coarse intent recognized from a spoken utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceIntent {
    /// "activate / emergency / protocol" — arm the critical path.
    Emergency,
    /// "reset / normal / stable" — stand down from critical.
    Reset,
}

/// Inbound events driving the engine loop.
#[derive(Debug)]
pub enum EngineEvent {
    /// Acquire a live reading and submit it.
    SubmitLive,
    /// Generate a synthetic reading and submit it.
    SubmitSynthetic,
    /// Submit a caller-built reading (the form layer's path).
    Submit(SensorReading),
    /// Operator demo shortcut: inject the fixed severe scenario.
    DemoTrigger,
    /// Manual reset back to monitoring.
    Reset,
    /// Intent emitted by the voice listener.
    Voice(VoiceIntent),
}

/// What caused an alert mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    SubmissionStarted,
    Verdict,
    DemoTrigger,
    VoiceEmergency,
    VoiceReset,
    ManualReset,
}

/// A single applied mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AlertMode,
    pub to: AlertMode,
    pub cause: TransitionCause,
}
