//! reqwest-backed feed clients.
//!
//! `OpenWeatherClient` serves both live data sources (current weather and
//! air composition share one account and coordinate); `ClassifierClient`
//! talks to the dust-cleaning classification service.

use crate::source::{
    AirQualityFeed, AirQualityObs, Classifier, Coord, FeedError, SensorReading, Verdict,
    VerdictOrigin, WeatherFeed, WeatherObs,
};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const DEFAULT_WEATHER_BASE: &str = "https://api.openweathermap.org/data/2.5";

// ── Weather / air-pollution response types ──

#[derive(Deserialize)]
struct WeatherResponse {
    main: WeatherMain,
}

#[derive(Deserialize)]
struct WeatherMain {
    temp: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct PollutionResponse {
    list: Vec<PollutionEntry>,
}

#[derive(Deserialize)]
struct PollutionEntry {
    components: PollutionComponents,
}

#[derive(Deserialize)]
struct PollutionComponents {
    pm2_5: f64,
    pm10: f64,
}

// ── Classifier response type ──

#[derive(Deserialize)]
struct PredictionResponse {
    #[serde(rename = "cleaning needs")]
    cleaning_needs: String,
    status: String,
    suggestion: String,
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, FeedError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FeedError::RequestFailed(e.to_string()))
}

async fn status_error(resp: reqwest::Response) -> FeedError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(status, "feed returned non-success status");
    FeedError::Status { status, body }
}

/// Client for the OpenWeather-compatible current-weather and
/// air-pollution endpoints.
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, FeedError> {
        let base = base_url.unwrap_or_else(|| DEFAULT_WEATHER_BASE.to_owned());
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base.trim_end_matches('/').to_owned(),
            api_key,
        })
    }

    fn weather_endpoint(&self) -> String {
        format!("{}/weather", self.base_url)
    }

    fn pollution_endpoint(&self) -> String {
        format!("{}/air_pollution", self.base_url)
    }

    fn coord_query(&self, at: Coord) -> [(&'static str, String); 3] {
        [
            ("lat", at.lat.to_string()),
            ("lon", at.lon.to_string()),
            ("appid", self.api_key.clone()),
        ]
    }
}

impl WeatherFeed for OpenWeatherClient {
    fn name(&self) -> &str {
        "openweather"
    }

    fn current(
        &self,
        at: Coord,
    ) -> Pin<Box<dyn Future<Output = Result<WeatherObs, FeedError>> + Send + '_>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.weather_endpoint())
                .query(&self.coord_query(at))
                .query(&[("units", "metric")])
                .send()
                .await
                .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(status_error(resp).await);
            }

            let api: WeatherResponse = resp
                .json()
                .await
                .map_err(|_| FeedError::MalformedResponse("missing `main` block"))?;
            Ok(WeatherObs {
                temperature: api.main.temp,
                humidity: api.main.humidity,
            })
        })
    }
}

impl AirQualityFeed for OpenWeatherClient {
    fn name(&self) -> &str {
        "openweather-air"
    }

    fn current(
        &self,
        at: Coord,
    ) -> Pin<Box<dyn Future<Output = Result<AirQualityObs, FeedError>> + Send + '_>> {
        Box::pin(async move {
            let resp = self
                .client
                .get(self.pollution_endpoint())
                .query(&self.coord_query(at))
                .send()
                .await
                .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(status_error(resp).await);
            }

            let api: PollutionResponse = resp
                .json()
                .await
                .map_err(|_| FeedError::MalformedResponse("missing `list` block"))?;
            let entry = api
                .list
                .into_iter()
                .next()
                .ok_or(FeedError::MalformedResponse("empty `list`"))?;
            Ok(AirQualityObs {
                pm2_5: entry.components.pm2_5,
                pm10: entry.components.pm10,
            })
        })
    }
}

/// Client for the classification endpoint. POSTs the reading as the
/// canonical payload and normalizes the `"cleaning needs"` answer.
pub struct ClassifierClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ClassifierClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, FeedError> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Classifier for ClassifierClient {
    fn name(&self) -> &str {
        "dust-classifier"
    }

    fn classify(
        &self,
        reading: SensorReading,
    ) -> Pin<Box<dyn Future<Output = Result<Verdict, FeedError>> + Send + '_>> {
        Box::pin(async move {
            let resp = self
                .client
                .post(&self.endpoint)
                .json(&reading)
                .send()
                .await
                .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(status_error(resp).await);
            }

            let api: PredictionResponse = resp
                .json()
                .await
                .map_err(|_| FeedError::MalformedResponse("missing `cleaning needs` field"))?;

            Ok(Verdict::new(
                api.cleaning_needs.eq_ignore_ascii_case("yes"),
                api.status,
                api.suggestion,
                VerdictOrigin::Classifier,
            ))
        })
    }
}

/// Build an `OpenWeatherClient` from the environment.
/// Reads `DUSTGUARD_WEATHER_API_KEY`, optionally `DUSTGUARD_WEATHER_BASE_URL`.
/// Returns `None` if the key is not set.
pub fn weather_from_env(timeout: Duration) -> Option<OpenWeatherClient> {
    let api_key = std::env::var("DUSTGUARD_WEATHER_API_KEY").ok()?;
    let base_url = std::env::var("DUSTGUARD_WEATHER_BASE_URL").ok();
    OpenWeatherClient::new(api_key, base_url, timeout).ok()
}

/// Build a `ClassifierClient` from the environment.
/// Reads `DUSTGUARD_PREDICT_URL`. Returns `None` if not set.
pub fn classifier_from_env(timeout: Duration) -> Option<ClassifierClient> {
    let endpoint = std::env::var("DUSTGUARD_PREDICT_URL").ok()?;
    ClassifierClient::new(endpoint, timeout).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TrafficDensity;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn weather_endpoints_use_default_base() {
        let c = OpenWeatherClient::new("key".into(), None, TIMEOUT).unwrap();
        assert_eq!(
            c.weather_endpoint(),
            "https://api.openweathermap.org/data/2.5/weather"
        );
        assert_eq!(
            c.pollution_endpoint(),
            "https://api.openweathermap.org/data/2.5/air_pollution"
        );
    }

    #[test]
    fn base_url_override_trims_trailing_slash() {
        let c = OpenWeatherClient::new(
            "key".into(),
            Some("http://localhost:9000/ow/".into()),
            TIMEOUT,
        )
        .unwrap();
        assert_eq!(c.weather_endpoint(), "http://localhost:9000/ow/weather");
    }

    #[test]
    fn weather_response_parses() {
        let api: WeatherResponse =
            serde_json::from_str(r#"{"main":{"temp":24.5,"humidity":41.0},"wind":{}}"#).unwrap();
        assert_eq!(api.main.temp, 24.5);
        assert_eq!(api.main.humidity, 41.0);
    }

    #[test]
    fn weather_response_without_main_is_rejected() {
        let result: Result<WeatherResponse, _> = serde_json::from_str(r#"{"wind":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn pollution_response_parses_first_entry() {
        let api: PollutionResponse = serde_json::from_str(
            r#"{"list":[{"components":{"pm2_5":33.1,"pm10":58.7,"no2":12.0}}]}"#,
        )
        .unwrap();
        assert_eq!(api.list[0].components.pm2_5, 33.1);
        assert_eq!(api.list[0].components.pm10, 58.7);
    }

    #[test]
    fn prediction_response_maps_cleaning_needs() {
        let api: PredictionResponse = serde_json::from_str(
            r#"{"cleaning needs":"Yes","status":"High dust load","suggestion":"Deploy units"}"#,
        )
        .unwrap();
        assert!(api.cleaning_needs.eq_ignore_ascii_case("yes"));
        assert_eq!(api.status, "High dust load");

        let api: PredictionResponse = serde_json::from_str(
            r#"{"cleaning needs":"No","status":"ok","suggestion":"none"}"#,
        )
        .unwrap();
        assert!(!api.cleaning_needs.eq_ignore_ascii_case("yes"));
    }

    #[test]
    fn classifier_payload_is_the_reading() {
        let reading = SensorReading {
            street_id: 7,
            pm2_5: 55.0,
            pm10: 80.0,
            humidity: 44.0,
            temperature: 31.0,
            traffic_density: TrafficDensity::Medium,
            dust_index: 67.0,
        };
        let body = serde_json::to_value(&reading).unwrap();
        assert_eq!(body["street_id"], 7);
        assert_eq!(body["traffic_density"], "Medium");
        assert_eq!(body["dust_index"], 67.0);
    }

    #[test]
    fn classifier_endpoint_is_kept_verbatim() {
        let c = ClassifierClient::new(
            "https://dust-guard-ai-1.onrender.com/sample-predict/".into(),
            TIMEOUT,
        )
        .unwrap();
        assert_eq!(
            c.endpoint(),
            "https://dust-guard-ai-1.onrender.com/sample-predict/"
        );
    }
}
