pub mod config;
pub mod presenter;
pub mod types;

use std::sync::OnceLock;

use anyhow::Result;

pub use presenter::Emitter;
use config::OutputConfig;
use types::Envelope;

static CONFIG: OnceLock<OutputConfig> = OnceLock::new();

pub fn init(cfg: OutputConfig) {
    let _ = CONFIG.set(cfg);
}

pub fn current() -> OutputConfig {
    CONFIG.get().copied().unwrap_or_else(OutputConfig::from_env)
}

pub fn emit(env: &Envelope) -> Result<()> {
    Emitter::new(current()).emit(env)?;
    Ok(())
}
