//! The alert state machine — sole owner of the system mode.
//!
//! Driven by verdicts, the demo trigger, voice intents and resets.
//! Verdicts are fenced by submission sequence number so a slow stale
//! response can never override a newer one.

use crate::types::{AlertMode, Transition, TransitionCause, Verdict};

/// Outcome of offering a resolved verdict to the machine.
#[derive(Debug, PartialEq, Eq)]
pub enum VerdictOutcome {
    /// Verdict accepted; the mode change, if any, is attached.
    Applied(Option<Transition>),
    /// A newer submission already resolved; the verdict was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct AlertStateMachine {
    mode: AlertMode,
    last_verdict: Option<Verdict>,
    /// Highest submission sequence whose verdict has been applied.
    applied_seq: u64,
    /// Total submissions started; doubles as the sequence allocator.
    submissions: u64,
}

impl AlertStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AlertMode {
        self.mode
    }

    pub fn last_verdict(&self) -> Option<&Verdict> {
        self.last_verdict.as_ref()
    }

    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    /// Allocate the next submission sequence number. The first attempt
    /// arms monitoring regardless of how the submission later resolves.
    pub fn begin_submission(&mut self) -> (u64, Option<Transition>) {
        self.submissions += 1;
        let armed = (self.mode == AlertMode::Idle)
            .then(|| self.shift(AlertMode::Monitoring, TransitionCause::SubmissionStarted));
        (self.submissions, armed)
    }

    /// Apply a resolved verdict. The winner is the highest sequence seen,
    /// not the last response to arrive.
    pub fn apply_verdict(&mut self, seq: u64, verdict: Verdict) -> VerdictOutcome {
        if seq <= self.applied_seq {
            return VerdictOutcome::Stale;
        }
        self.applied_seq = seq;

        let target = if verdict.cleaning_needed {
            AlertMode::Critical
        } else {
            AlertMode::Monitoring
        };
        self.last_verdict = Some(verdict);

        let transition = (self.mode != target).then(|| self.shift(target, TransitionCause::Verdict));
        VerdictOutcome::Applied(transition)
    }

    /// Demo trigger or voice emergency: force `Critical` from any mode.
    pub fn trigger_emergency(&mut self, cause: TransitionCause) -> Option<Transition> {
        (self.mode != AlertMode::Critical).then(|| self.shift(AlertMode::Critical, cause))
    }

    /// Manual or voice reset. Only `Critical → Monitoring` is defined;
    /// resets in other modes are no-ops.
    pub fn reset(&mut self, cause: TransitionCause) -> Option<Transition> {
        (self.mode == AlertMode::Critical).then(|| self.shift(AlertMode::Monitoring, cause))
    }

    /// Record a verdict for display without fencing (demo path).
    pub fn record_simulated(&mut self, verdict: Verdict) {
        self.last_verdict = Some(verdict);
    }

    fn shift(&mut self, to: AlertMode, cause: TransitionCause) -> Transition {
        let from = self.mode;
        self.mode = to;
        Transition { from, to, cause }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VerdictOrigin;

    fn verdict(cleaning_needed: bool) -> Verdict {
        Verdict::new(cleaning_needed, "ok", "advice", VerdictOrigin::Classifier)
    }

    #[test]
    fn starts_idle() {
        let m = AlertStateMachine::new();
        assert_eq!(m.mode(), AlertMode::Idle);
        assert!(m.last_verdict().is_none());
    }

    #[test]
    fn first_submission_arms_monitoring() {
        let mut m = AlertStateMachine::new();
        let (seq, armed) = m.begin_submission();
        assert_eq!(seq, 1);
        let t = armed.unwrap();
        assert_eq!(t.from, AlertMode::Idle);
        assert_eq!(t.to, AlertMode::Monitoring);
        assert_eq!(t.cause, TransitionCause::SubmissionStarted);

        // Later submissions do not re-arm.
        let (seq, armed) = m.begin_submission();
        assert_eq!(seq, 2);
        assert!(armed.is_none());
    }

    #[test]
    fn deploy_verdict_goes_critical() {
        let mut m = AlertStateMachine::new();
        let (seq, _) = m.begin_submission();
        match m.apply_verdict(seq, verdict(true)) {
            VerdictOutcome::Applied(Some(t)) => {
                assert_eq!(t.from, AlertMode::Monitoring);
                assert_eq!(t.to, AlertMode::Critical);
            }
            other => panic!("expected critical transition, got {other:?}"),
        }
        assert_eq!(m.mode(), AlertMode::Critical);
    }

    #[test]
    fn clear_verdict_rearms_monitoring_from_critical() {
        let mut m = AlertStateMachine::new();
        let (seq, _) = m.begin_submission();
        m.apply_verdict(seq, verdict(true));

        let (seq, _) = m.begin_submission();
        match m.apply_verdict(seq, verdict(false)) {
            VerdictOutcome::Applied(Some(t)) => assert_eq!(t.to, AlertMode::Monitoring),
            other => panic!("expected monitoring transition, got {other:?}"),
        }
    }

    #[test]
    fn clear_verdict_in_monitoring_updates_display_only() {
        let mut m = AlertStateMachine::new();
        let (seq, _) = m.begin_submission();
        let outcome = m.apply_verdict(seq, verdict(false));
        assert_eq!(outcome, VerdictOutcome::Applied(None));
        assert_eq!(m.mode(), AlertMode::Monitoring);
        assert!(!m.last_verdict().unwrap().cleaning_needed);
    }

    #[test]
    fn stale_verdict_is_dropped() {
        let mut m = AlertStateMachine::new();
        let (first, _) = m.begin_submission();
        let (second, _) = m.begin_submission();

        // The newer submission resolves first.
        m.apply_verdict(second, verdict(true));
        assert_eq!(m.mode(), AlertMode::Critical);

        // The older one arrives late and must not override.
        assert_eq!(m.apply_verdict(first, verdict(false)), VerdictOutcome::Stale);
        assert_eq!(m.mode(), AlertMode::Critical);
        assert!(m.last_verdict().unwrap().cleaning_needed);
    }

    #[test]
    fn emergency_fires_from_any_mode() {
        let mut m = AlertStateMachine::new();
        let t = m.trigger_emergency(TransitionCause::DemoTrigger).unwrap();
        assert_eq!(t.from, AlertMode::Idle);
        assert_eq!(m.mode(), AlertMode::Critical);

        // Already critical: no transition, mode unchanged.
        assert!(m.trigger_emergency(TransitionCause::VoiceEmergency).is_none());
        assert_eq!(m.mode(), AlertMode::Critical);
    }

    #[test]
    fn reset_only_leaves_critical() {
        let mut m = AlertStateMachine::new();
        assert!(m.reset(TransitionCause::ManualReset).is_none());
        assert_eq!(m.mode(), AlertMode::Idle);

        m.trigger_emergency(TransitionCause::DemoTrigger);
        let t = m.reset(TransitionCause::VoiceReset).unwrap();
        assert_eq!(t.to, AlertMode::Monitoring);
        assert_eq!(t.cause, TransitionCause::VoiceReset);
    }
}
