//! Configuration types
//!
//! The firmware build script parses `machine.toml` into these types,
//! validates them and embeds a postcard image that is decoded on target.

mod hardware;
mod types;

pub use hardware::{DeviceConfig, TubingConfig, MAX_SEGMENT_UL};
pub use types::{Decision, RunFlags, SynthesisConfig, MAX_LABEL_LEN};

pub use crate::ports::{PortMapping, PortMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::error::ConfigError;

/// Configuration image format version
pub const CONFIG_VERSION: u8 = 1;

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MachineConfig {
    pub version: u8,
    pub device: DeviceConfig,
    pub synthesis: SynthesisConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            device: DeviceConfig::default(),
            synthesis: SynthesisConfig::default(),
        }
    }
}

/// Decode a postcard configuration image
#[cfg(feature = "serde")]
pub fn decode(bytes: &[u8]) -> Result<MachineConfig, ConfigError> {
    let config: MachineConfig =
        postcard::from_bytes(bytes).map_err(|_| ConfigError::InvalidData)?;
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(config.version));
    }
    Ok(config)
}

/// Encode a configuration into `buf`, returning the used part
#[cfg(feature = "serde")]
pub fn encode<'a>(config: &MachineConfig, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
    postcard::to_slice(config, buf).map_err(|_| ConfigError::BufferTooSmall)
}
