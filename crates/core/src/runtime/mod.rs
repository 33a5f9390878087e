mod engine;
mod shutdown;

pub use engine::{DEMO_SUGGESTION, Engine};
pub use shutdown::ShutdownGuard;
