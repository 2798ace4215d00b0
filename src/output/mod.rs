use anyhow::Result;
use serde::Serialize;

pub mod config;
pub mod presenter;
pub mod types;

pub use config::set_json_mode;
use config::OutputConfig;
use presenter::Emitter;
use types::Envelope;

pub fn emit_plan<T: Serialize>(op: &'static str, plan: &T) -> Result<()> {
    let env = Envelope::plan(op, plan)?;
    Emitter::from_env(OutputConfig::from_env()).emit(&env)?;
    Ok(())
}

pub fn emit_result<T: Serialize>(op: &'static str, result: &T) -> Result<()> {
    let env = Envelope::result(op, result)?;
    Emitter::from_env(OutputConfig::from_env()).emit(&env)?;
    Ok(())
}
