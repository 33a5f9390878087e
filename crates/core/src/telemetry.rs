//! Sensor reading acquisition.
//!
//! Live acquisition queries the two configured feeds; any failure falls
//! back silently to synthetic generation, so acquisition never fails
//! outward. The demo path returns a fixed severe scenario.

use std::ops::Range;
use std::sync::Arc;

use rand::Rng;

use crate::types::{
    AirQualityFeed, Coord, FeedError, SensorReading, TrafficDensity, WeatherFeed,
};

/// Uniform draw ranges for synthetic readings.
pub const SYNTH_PM2_5: Range<f64> = 20.0..70.0;
pub const SYNTH_PM10: Range<f64> = 40.0..120.0;
pub const SYNTH_HUMIDITY: Range<f64> = 30.0..70.0;
pub const SYNTH_TEMPERATURE: Range<f64> = 15.0..40.0;
pub const SYNTH_DUST_INDEX: Range<f64> = 30.0..90.0;
pub const SYNTH_STREET_IDS: Range<u32> = 0..50;

/// Street ids assigned to live readings.
pub const LIVE_STREET_IDS: Range<u32> = 0..100;

/// The fixed severe-pollution scenario injected by the demo trigger.
pub const DEMO_READING: SensorReading = SensorReading {
    street_id: 7,
    pm2_5: 180.0,
    pm10: 240.0,
    humidity: 18.0,
    temperature: 39.0,
    traffic_density: TrafficDensity::High,
    dust_index: 165.0,
};

/// Obtains sensor readings for the engine.
pub struct Acquirer {
    weather: Option<Arc<dyn WeatherFeed>>,
    air: Option<Arc<dyn AirQualityFeed>>,
    coord: Coord,
}

impl Acquirer {
    pub fn new(
        weather: Option<Arc<dyn WeatherFeed>>,
        air: Option<Arc<dyn AirQualityFeed>>,
        coord: Coord,
    ) -> Self {
        Self {
            weather,
            air,
            coord,
        }
    }

    /// Live reading from the configured feeds. Any feed failure —
    /// transport, timeout, malformed payload, missing configuration —
    /// falls back to a synthetic reading.
    pub async fn acquire_live(&self) -> SensorReading {
        match self.try_live().await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!(error = %e, "live acquisition failed, falling back to synthetic");
                self.acquire_synthetic()
            }
        }
    }

    async fn try_live(&self) -> Result<SensorReading, FeedError> {
        let weather = self.weather.as_deref().ok_or(FeedError::Unconfigured)?;
        let air = self.air.as_deref().ok_or(FeedError::Unconfigured)?;

        let (w, aq) = tokio::try_join!(weather.current(self.coord), air.current(self.coord))?;

        // Dust index: mean of the two particulate readings, rounded.
        let dust_index = ((aq.pm2_5 + aq.pm10) / 2.0).round();

        Ok(SensorReading {
            street_id: rand::thread_rng().gen_range(LIVE_STREET_IDS),
            pm2_5: aq.pm2_5,
            pm10: aq.pm10,
            humidity: w.humidity,
            temperature: w.temperature,
            traffic_density: TrafficDensity::Medium,
            dust_index,
        })
    }

    /// Synthetic reading: independent uniform draws within the `SYNTH_*`
    /// ranges, traffic fixed to `Medium`.
    pub fn acquire_synthetic(&self) -> SensorReading {
        let mut rng = rand::thread_rng();
        SensorReading {
            street_id: rng.gen_range(SYNTH_STREET_IDS),
            pm2_5: rng.gen_range(SYNTH_PM2_5),
            pm10: rng.gen_range(SYNTH_PM10),
            humidity: rng.gen_range(SYNTH_HUMIDITY),
            temperature: rng.gen_range(SYNTH_TEMPERATURE),
            traffic_density: TrafficDensity::Medium,
            dust_index: rng.gen_range(SYNTH_DUST_INDEX),
        }
    }

    /// The demo scenario, used to exercise the critical path
    /// deterministically.
    pub fn acquire_demo() -> SensorReading {
        DEMO_READING
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dustguard_feeds::source::{MockAirQuality, MockWeather};

    fn coord() -> Coord {
        Coord {
            lat: 30.0,
            lon: 31.0,
        }
    }

    fn bare_acquirer() -> Acquirer {
        Acquirer::new(None, None, coord())
    }

    fn assert_synthetic_shape(r: &SensorReading) {
        assert!(r.validate().is_ok());
        assert!(SYNTH_PM2_5.contains(&r.pm2_5));
        assert!(SYNTH_PM10.contains(&r.pm10));
        assert!(SYNTH_HUMIDITY.contains(&r.humidity));
        assert!(SYNTH_TEMPERATURE.contains(&r.temperature));
        assert!(SYNTH_DUST_INDEX.contains(&r.dust_index));
        assert!(SYNTH_STREET_IDS.contains(&r.street_id));
        assert_eq!(r.traffic_density, TrafficDensity::Medium);
    }

    #[test]
    fn synthetic_readings_stay_in_range() {
        let acquirer = bare_acquirer();
        for _ in 0..200 {
            assert_synthetic_shape(&acquirer.acquire_synthetic());
        }
    }

    #[test]
    fn demo_reading_is_severe_and_fixed() {
        let r = Acquirer::acquire_demo();
        assert!(r.validate().is_ok());
        assert_eq!(r.traffic_density, TrafficDensity::High);
        assert!(r.pm2_5 > SYNTH_PM2_5.end);
        assert_eq!(r.pm2_5, Acquirer::acquire_demo().pm2_5);
    }

    #[tokio::test]
    async fn live_without_feeds_falls_back_to_synthetic() {
        let r = bare_acquirer().acquire_live().await;
        assert_synthetic_shape(&r);
    }

    #[tokio::test]
    async fn live_with_failing_feeds_falls_back_to_synthetic() {
        let acquirer = Acquirer::new(
            Some(Arc::new(MockWeather::offline())),
            Some(Arc::new(MockAirQuality::offline())),
            coord(),
        );
        let r = acquirer.acquire_live().await;
        assert_synthetic_shape(&r);
    }

    #[tokio::test]
    async fn live_with_one_failing_feed_falls_back_to_synthetic() {
        let acquirer = Acquirer::new(
            Some(Arc::new(MockWeather::returning(24.0, 40.0))),
            Some(Arc::new(MockAirQuality::offline())),
            coord(),
        );
        let r = acquirer.acquire_live().await;
        assert_synthetic_shape(&r);
    }

    #[tokio::test]
    async fn live_combines_both_observations() {
        let acquirer = Acquirer::new(
            Some(Arc::new(MockWeather::returning(28.5, 44.0))),
            Some(Arc::new(MockAirQuality::returning(33.0, 58.0))),
            coord(),
        );
        let r = acquirer.acquire_live().await;
        assert_eq!(r.temperature, 28.5);
        assert_eq!(r.humidity, 44.0);
        assert_eq!(r.pm2_5, 33.0);
        assert_eq!(r.pm10, 58.0);
        // mean of 33 and 58, rounded
        assert_eq!(r.dust_index, 46.0);
        assert!(LIVE_STREET_IDS.contains(&r.street_id));
    }
}
