//! Embedded configuration
//!
//! The build script validates `machine.toml` and embeds it as a postcard
//! image; decoding it again on target cannot fail unless the image and
//! the core crate disagree on the format.

use pepsyn_core::config::{decode, MachineConfig};
use pepsyn_core::{ConfigError, PlanError, SynthesisPlan};

/// Configuration image produced by build.rs
static IMAGE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/machine.bin"));

/// Decode the embedded configuration
pub fn load() -> Result<MachineConfig, ConfigError> {
    decode(IMAGE)
}

/// Decode the configuration and compile its synthesis plan
pub fn load_plan() -> Result<(MachineConfig, SynthesisPlan), PlanError> {
    let config = load()?;
    let plan = SynthesisPlan::build(&config.device, &config.synthesis)?;
    Ok((config, plan))
}
