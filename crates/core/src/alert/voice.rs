//! Voice intent listening.
//!
//! A `SpeechSource` hands out recognition sessions producing transcribed
//! utterances; the listener classifies each one against two fixed keyword
//! sets and forwards matches into the engine event channel. Speech
//! recognition is an optional capability — running without a source is a
//! valid configuration, not an error.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::types::{EngineEvent, VoiceIntent};

/// Keywords that arm the emergency protocol.
pub const EMERGENCY_KEYWORDS: [&str; 3] = ["activate", "emergency", "protocol"];
/// Keywords that stand the system down.
pub const RESET_KEYWORDS: [&str; 3] = ["reset", "normal", "stable"];

/// A continuous speech-recognition capability. The utterance channel
/// closes when the underlying session ends; the listener reopens a new
/// session on its own.
pub trait SpeechSource: Send {
    fn name(&self) -> &str;

    fn open_session(&mut self) -> mpsc::Receiver<String>;
}

/// Classify one utterance by case-insensitive substring match. Emergency
/// keywords win over reset keywords; anything else is discarded.
pub fn classify_utterance(utterance: &str) -> Option<VoiceIntent> {
    let lower = utterance.to_lowercase();
    if EMERGENCY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(VoiceIntent::Emergency)
    } else if RESET_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(VoiceIntent::Reset)
    } else {
        None
    }
}

/// Drives a speech source until cancelled, forwarding recognized intents
/// into the engine event channel.
pub struct VoiceIntentListener;

impl VoiceIntentListener {
    /// Spawn the listener task. Returns `None` (and logs once) when no
    /// speech source is available.
    pub fn spawn(
        source: Option<Box<dyn SpeechSource>>,
        event_tx: mpsc::Sender<EngineEvent>,
        restart_delay: Duration,
        token: CancellationToken,
    ) -> Option<tokio::task::JoinHandle<()>> {
        let Some(mut source) = source else {
            tracing::info!("no speech source available, voice intents disabled");
            return None;
        };

        Some(tokio::spawn(async move {
            tracing::info!(source = source.name(), "voice intent listener started");
            loop {
                let mut session = source.open_session();
                loop {
                    tokio::select! {
                        _ = token.cancelled() => return,
                        utterance = session.recv() => {
                            let Some(utterance) = utterance else { break };
                            let Some(intent) = classify_utterance(&utterance) else { continue };
                            tracing::debug!(?intent, utterance = %utterance, "voice intent recognized");
                            if event_tx.send(EngineEvent::Voice(intent)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
                // Session ended; reopen after a short pause (continuous mode).
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(restart_delay) => {}
                }
            }
        }))
    }
}

/// Scripted speech source for tests and demos: replays its script in one
/// session, then hands out silent open sessions.
pub struct ScriptedSpeech {
    script: VecDeque<String>,
    parked: Vec<mpsc::Sender<String>>,
}

impl ScriptedSpeech {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            parked: Vec::new(),
        }
    }
}

impl SpeechSource for ScriptedSpeech {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open_session(&mut self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(16);
        if self.script.is_empty() {
            // Keep the sender alive so an exhausted script reads as a
            // silent, still-running session.
            self.parked.push(tx);
            return rx;
        }
        let script: Vec<String> = self.script.drain(..).collect();
        tokio::spawn(async move {
            for line in script {
                if tx.send(line).await.is_err() {
                    return;
                }
            }
        });
        rx
    }
}
