use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Traffic load on the observed street. Variant names double as the wire
/// values the classifier expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficDensity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for TrafficDensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

/// One environmental snapshot — the canonical unit submitted for
/// classification. Field names are the wire payload shape; the struct
/// serializes directly into the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub street_id: u32,
    pub pm2_5: f64,
    pub pm10: f64,
    pub humidity: f64,
    pub temperature: f64,
    pub traffic_density: TrafficDensity,
    pub dust_index: f64,
}

/// A reading with a non-finite numeric field. Such readings are refused
/// before submission.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("non-finite `{field}` in sensor reading")]
pub struct InvalidReading {
    pub field: &'static str,
}

impl SensorReading {
    /// Every numeric field must be finite before the reading may be
    /// submitted to a classifier.
    pub fn validate(&self) -> Result<(), InvalidReading> {
        let fields = [
            ("pm2_5", self.pm2_5),
            ("pm10", self.pm10),
            ("humidity", self.humidity),
            ("temperature", self.temperature),
            ("dust_index", self.dust_index),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(InvalidReading { field });
            }
        }
        Ok(())
    }
}

/// Where a verdict came from. `Offline` and `Simulated` verdicts carry
/// the degraded/demo notice to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerdictOrigin {
    /// Returned by the classification service.
    Classifier,
    /// Deterministic fallback substituted after a classification failure.
    Offline,
    /// Injected by the demo trigger.
    Simulated,
}

/// Normalized outcome of a classification attempt: deploy/no-deploy plus
/// advisory text. Superseded by the next submission.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub cleaning_needed: bool,
    pub status: String,
    pub suggestion: String,
    pub origin: VerdictOrigin,
    pub decided_at: DateTime<Utc>,
}

impl Verdict {
    pub fn new(
        cleaning_needed: bool,
        status: impl Into<String>,
        suggestion: impl Into<String>,
        origin: VerdictOrigin,
    ) -> Self {
        Self {
            cleaning_needed,
            status: status.into(),
            suggestion: suggestion.into(),
            origin,
            decided_at: Utc::now(),
        }
    }
}

/// The fixed geographic coordinate the live feeds are queried for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// Current-conditions observation from the weather feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherObs {
    pub temperature: f64,
    pub humidity: f64,
}

/// Particulate composition observation from the air-quality feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityObs {
    pub pm2_5: f64,
    pub pm10: f64,
}

/// Error type for feed operations.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("feed not configured")]
    Unconfigured,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("malformed response: {0}")]
    MalformedResponse(&'static str),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Current-weather source queried by coordinate.
pub trait WeatherFeed: Send + Sync {
    fn name(&self) -> &str;

    fn current(
        &self,
        at: Coord,
    ) -> Pin<Box<dyn Future<Output = Result<WeatherObs, FeedError>> + Send + '_>>;
}

/// Air-composition source queried by the same coordinate.
pub trait AirQualityFeed: Send + Sync {
    fn name(&self) -> &str;

    fn current(
        &self,
        at: Coord,
    ) -> Pin<Box<dyn Future<Output = Result<AirQualityObs, FeedError>> + Send + '_>>;
}

/// Remote classification service deciding whether cleaning equipment
/// should be deployed for a reading.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    fn classify(
        &self,
        reading: SensorReading,
    ) -> Pin<Box<dyn Future<Output = Result<Verdict, FeedError>> + Send + '_>>;
}

// ── Mocks for tests ──

/// Mock weather feed — returns a fixed observation, or fails when built
/// with `offline()`.
#[derive(Debug, Clone)]
pub struct MockWeather {
    obs: Option<WeatherObs>,
}

impl MockWeather {
    pub fn returning(temperature: f64, humidity: f64) -> Self {
        Self {
            obs: Some(WeatherObs {
                temperature,
                humidity,
            }),
        }
    }

    pub fn offline() -> Self {
        Self { obs: None }
    }
}

impl WeatherFeed for MockWeather {
    fn name(&self) -> &str {
        "mock-weather"
    }

    fn current(
        &self,
        _at: Coord,
    ) -> Pin<Box<dyn Future<Output = Result<WeatherObs, FeedError>> + Send + '_>> {
        let obs = self.obs;
        Box::pin(async move {
            obs.ok_or_else(|| FeedError::RequestFailed("mock weather offline".into()))
        })
    }
}

/// Mock air-quality feed — fixed particulate observation or failure.
#[derive(Debug, Clone)]
pub struct MockAirQuality {
    obs: Option<AirQualityObs>,
}

impl MockAirQuality {
    pub fn returning(pm2_5: f64, pm10: f64) -> Self {
        Self {
            obs: Some(AirQualityObs { pm2_5, pm10 }),
        }
    }

    pub fn offline() -> Self {
        Self { obs: None }
    }
}

impl AirQualityFeed for MockAirQuality {
    fn name(&self) -> &str {
        "mock-air"
    }

    fn current(
        &self,
        _at: Coord,
    ) -> Pin<Box<dyn Future<Output = Result<AirQualityObs, FeedError>> + Send + '_>> {
        let obs = self.obs;
        Box::pin(async move {
            obs.ok_or_else(|| FeedError::RequestFailed("mock air feed offline".into()))
        })
    }
}

/// Mock classifier — returns a fixed verdict, or a fixed HTTP-style
/// failure when built with `failing()`.
pub struct MockClassifier {
    outcome: Result<(bool, String, String), u16>,
}

impl MockClassifier {
    /// Verdict with `cleaning_needed = true`.
    pub fn deploying(suggestion: impl Into<String>) -> Self {
        Self {
            outcome: Ok((true, "High pollution detected".into(), suggestion.into())),
        }
    }

    /// Verdict with `cleaning_needed = false`.
    pub fn clear(suggestion: impl Into<String>) -> Self {
        Self {
            outcome: Ok((false, "Air quality acceptable".into(), suggestion.into())),
        }
    }

    /// Every call fails with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            outcome: Err(status),
        }
    }
}

impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn classify(
        &self,
        _reading: SensorReading,
    ) -> Pin<Box<dyn Future<Output = Result<Verdict, FeedError>> + Send + '_>> {
        let outcome = self.outcome.clone();
        Box::pin(async move {
            match outcome {
                Ok((cleaning_needed, status, suggestion)) => Ok(Verdict::new(
                    cleaning_needed,
                    status,
                    suggestion,
                    VerdictOrigin::Classifier,
                )),
                Err(status) => Err(FeedError::Status {
                    status,
                    body: "mock classifier failure".into(),
                }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> SensorReading {
        SensorReading {
            street_id: 4,
            pm2_5: 130.0,
            pm10: 100.0,
            humidity: 34.0,
            temperature: 24.0,
            traffic_density: TrafficDensity::High,
            dust_index: 82.0,
        }
    }

    #[test]
    fn valid_reading_passes() {
        assert!(reading().validate().is_ok());
    }

    #[test]
    fn non_finite_field_is_refused() {
        let mut r = reading();
        r.humidity = f64::NAN;
        let err = r.validate().unwrap_err();
        assert_eq!(err.field, "humidity");

        let mut r = reading();
        r.pm2_5 = f64::INFINITY;
        assert_eq!(r.validate().unwrap_err().field, "pm2_5");
    }

    #[test]
    fn reading_serializes_with_wire_names() {
        let value = serde_json::to_value(reading()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "street_id",
            "pm2_5",
            "pm10",
            "humidity",
            "temperature",
            "traffic_density",
            "dust_index",
        ] {
            assert!(obj.contains_key(key), "missing wire field {key}");
        }
        assert_eq!(value["traffic_density"], "High");
    }

    #[tokio::test]
    async fn mock_classifier_verdicts() {
        let c = MockClassifier::deploying("wash the street");
        let v = c.classify(reading()).await.unwrap();
        assert!(v.cleaning_needed);
        assert_eq!(v.origin, VerdictOrigin::Classifier);
        assert_eq!(v.suggestion, "wash the street");

        let c = MockClassifier::clear("all good");
        let v = c.classify(reading()).await.unwrap();
        assert!(!v.cleaning_needed);
    }

    #[tokio::test]
    async fn mock_classifier_failure_carries_status() {
        let c = MockClassifier::failing(500);
        match c.classify(reading()).await {
            Err(FeedError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn offline_mocks_fail() {
        let at = Coord {
            lat: 30.0,
            lon: 31.0,
        };
        assert!(MockWeather::offline().current(at).await.is_err());
        assert!(MockAirQuality::offline().current(at).await.is_err());
        let obs = MockWeather::returning(24.0, 40.0).current(at).await.unwrap();
        assert_eq!(obs.temperature, 24.0);
    }
}
