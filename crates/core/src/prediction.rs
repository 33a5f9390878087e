//! Submission of readings to the classification service.
//!
//! Failures never surface to the caller: any classifier error or timeout
//! is replaced by the deterministic offline verdict, so a submission
//! always resolves to a displayable result.

use std::sync::Arc;
use std::time::Duration;

use crate::types::{Classifier, SensorReading, Verdict, VerdictOrigin};

/// Status shown with the offline fallback verdict.
pub const OFFLINE_STATUS: &str = "offline";
/// Advisory shown with the offline fallback verdict.
pub const OFFLINE_SUGGESTION: &str = "Classification service unreachable. Dispatch cleaning \
     units as a precaution and retry once connectivity is restored.";

/// Wraps an optional classifier with a timeout and the offline fallback.
pub struct Predictor {
    classifier: Option<Arc<dyn Classifier>>,
    timeout: Duration,
}

impl Predictor {
    pub fn new(classifier: Option<Arc<dyn Classifier>>, timeout: Duration) -> Self {
        Self {
            classifier,
            timeout,
        }
    }

    /// Classify a reading. Always returns a verdict.
    pub async fn classify(&self, reading: SensorReading) -> Verdict {
        let Some(classifier) = &self.classifier else {
            tracing::warn!("no classifier configured, substituting offline verdict");
            return offline_verdict();
        };

        match tokio::time::timeout(self.timeout, classifier.classify(reading)).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                tracing::warn!(
                    classifier = classifier.name(),
                    error = %e,
                    "classification failed, substituting offline verdict"
                );
                offline_verdict()
            }
            Err(_) => {
                tracing::warn!(
                    classifier = classifier.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "classification timed out, substituting offline verdict"
                );
                offline_verdict()
            }
        }
    }
}

fn offline_verdict() -> Verdict {
    Verdict::new(true, OFFLINE_STATUS, OFFLINE_SUGGESTION, VerdictOrigin::Offline)
}
