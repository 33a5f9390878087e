pub mod machine;
pub mod voice;

pub use machine::{AlertStateMachine, VerdictOutcome};
pub use voice::{ScriptedSpeech, SpeechSource, VoiceIntentListener};
