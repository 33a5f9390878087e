use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::shutdown::ShutdownGuard;
use crate::alert::machine::{AlertStateMachine, VerdictOutcome};
use crate::config::GuardCfg;
use crate::prediction::Predictor;
use crate::telemetry::Acquirer;
use crate::types::{
    AirQualityFeed, Classifier, EngineEvent, SensorReading, Transition, TransitionCause, Verdict,
    VerdictOrigin, VoiceIntent, WeatherFeed,
};
use crate::view::{DashboardView, ViewSync};

/// Advisory attached to the simulated demo verdict.
pub const DEMO_SUGGESTION: &str = "Simulated emergency: severe particulate load injected. \
     Deploy dust-cleaning units immediately.";
const DEMO_STATUS: &str = "simulated";

/// Central orchestrator. Owns every piece of mutable dashboard state and
/// handles one event at a time, so each submission fully resolves before
/// the next transition is applied.
pub struct Engine {
    cfg: Arc<GuardCfg>,
    shutdown: ShutdownGuard,
    event_rx: mpsc::Receiver<EngineEvent>,
    acquirer: Acquirer,
    predictor: Predictor,
    alerts: AlertStateMachine,
    views: ViewSync,
    last_reading: Option<SensorReading>,
    view_tx: watch::Sender<DashboardView>,
}

impl Engine {
    /// Create an engine. Returns (engine, event sender, snapshot
    /// receiver). Feed events into the sender; watch the receiver for
    /// dashboard snapshots.
    pub fn new(
        cfg: Arc<GuardCfg>,
        weather: Option<Arc<dyn WeatherFeed>>,
        air: Option<Arc<dyn AirQualityFeed>>,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> (
        Self,
        mpsc::Sender<EngineEvent>,
        watch::Receiver<DashboardView>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(cfg.event_buffer);
        let acquirer = Acquirer::new(weather, air, cfg.coord());
        let predictor = Predictor::new(classifier, cfg.predict_timeout());
        let alerts = AlertStateMachine::new();
        let views = ViewSync::new();
        let initial = views.project(alerts.mode(), cfg.coord(), None, None, 0);
        let (view_tx, view_rx) = watch::channel(initial);

        let engine = Self {
            cfg,
            shutdown: ShutdownGuard::new(),
            event_rx,
            acquirer,
            predictor,
            alerts,
            views,
            last_reading: None,
            view_tx,
        };
        (engine, event_tx, view_rx)
    }

    /// Returns the cancellation token for wiring up child tasks.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.token()
    }

    /// Run until cancelled. The counter interval is the only long-lived
    /// timer; it stops with the loop.
    pub async fn run(&mut self) {
        self.shutdown.spawn_signal_listener();
        let token = self.shutdown.token();

        let period = self.cfg.counter_interval();
        let mut counter = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        counter.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(lat = self.cfg.latitude, lon = self.cfg.longitude, "engine started");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("shutdown signal received, exiting engine loop");
                    break;
                }
                _ = counter.tick() => {
                    if self.views.on_counter_tick(self.alerts.mode()) {
                        self.publish();
                    }
                }
                event = self.event_rx.recv() => {
                    let Some(event) = event else { break };
                    self.handle_event(event).await;
                    self.publish();
                }
            }
        }

        tracing::info!(
            submissions = self.alerts.submissions(),
            litres_saved = self.views.litres_saved(),
            "engine stopped"
        );
    }

    async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::SubmitLive => {
                let reading = self.acquirer.acquire_live().await;
                self.submit(reading).await;
            }
            EngineEvent::SubmitSynthetic => {
                let reading = self.acquirer.acquire_synthetic();
                self.submit(reading).await;
            }
            EngineEvent::Submit(reading) => self.submit(reading).await,
            EngineEvent::DemoTrigger => self.trigger_demo(TransitionCause::DemoTrigger),
            EngineEvent::Reset => self.reset(TransitionCause::ManualReset),
            EngineEvent::Voice(VoiceIntent::Emergency) => {
                self.trigger_demo(TransitionCause::VoiceEmergency)
            }
            EngineEvent::Voice(VoiceIntent::Reset) => self.reset(TransitionCause::VoiceReset),
        }
    }

    /// One full submission: validate, arm monitoring, classify, apply
    /// the verdict, update the views.
    async fn submit(&mut self, reading: SensorReading) {
        if let Err(e) = reading.validate() {
            tracing::warn!(error = %e, street_id = reading.street_id, "refusing to submit invalid reading");
            return;
        }

        let (seq, armed) = self.alerts.begin_submission();
        if let Some(t) = armed {
            self.log_transition(&t);
        }
        tracing::debug!(seq, street_id = reading.street_id, pm2_5 = reading.pm2_5, "submitting reading");

        let verdict = self.predictor.classify(reading.clone()).await;
        match self.alerts.apply_verdict(seq, verdict) {
            VerdictOutcome::Applied(transition) => {
                self.views.on_submission(&reading);
                self.last_reading = Some(reading);
                if let Some(t) = transition {
                    self.log_transition(&t);
                }
            }
            VerdictOutcome::Stale => {
                tracing::debug!(seq, "stale verdict dropped");
            }
        }
    }

    /// Demo trigger (operator or voice): inject the fixed severe scenario
    /// and go critical immediately, independent of any in-flight
    /// submission outcome.
    fn trigger_demo(&mut self, cause: TransitionCause) {
        self.alerts.record_simulated(Verdict::new(
            true,
            DEMO_STATUS,
            DEMO_SUGGESTION,
            VerdictOrigin::Simulated,
        ));
        if let Some(t) = self.alerts.trigger_emergency(cause) {
            self.log_transition(&t);
        }
        self.views.on_demo();
        self.last_reading = Some(Acquirer::acquire_demo());
    }

    fn reset(&mut self, cause: TransitionCause) {
        match self.alerts.reset(cause) {
            Some(t) => {
                self.views.on_reset();
                self.log_transition(&t);
            }
            None => {
                tracing::debug!(mode = %self.alerts.mode(), "reset ignored outside critical");
            }
        }
    }

    fn log_transition(&self, t: &Transition) {
        tracing::info!(from = %t.from, to = %t.to, cause = ?t.cause, "alert mode changed");
    }

    fn publish(&self) {
        let snapshot = self.views.project(
            self.alerts.mode(),
            self.cfg.coord(),
            self.last_reading.as_ref(),
            self.alerts.last_verdict(),
            self.alerts.submissions(),
        );
        self.view_tx.send_replace(snapshot);
    }
}
