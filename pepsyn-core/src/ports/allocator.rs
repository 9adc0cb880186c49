//! Port allocator

use heapless::FnvIndexMap;

use super::{FIRST_REAGENT_PORT, MAX_PORTS, RESERVED_PORTS};
use crate::error::ConfigError;
use crate::symbols::Symbol;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How reagent ports are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PortMode {
    /// Sequential from port 8 in order of first appearance
    #[default]
    Auto,
    /// Fixed mapping from configuration
    Manual,
}

/// One manual symbol-to-port entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PortMapping {
    pub symbol: Symbol,
    pub port: u8,
}

/// Injective mapping from reagent symbols to selector ports
///
/// Iteration follows insertion order, which is the order of first
/// appearance in the sequence.
#[derive(Debug, Clone, Default)]
pub struct PortAssignment {
    ports: FnvIndexMap<Symbol, u8, MAX_PORTS>,
}

impl PortAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: Symbol) -> Option<u8> {
        self.ports.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u8)> + '_ {
        self.ports.iter().map(|(s, p)| (*s, *p))
    }

    /// Ports in use, in assignment order
    pub fn ports(&self) -> impl Iterator<Item = u8> + '_ {
        self.ports.values().copied()
    }

    fn insert(&mut self, symbol: Symbol, port: u8) -> Result<(), ConfigError> {
        if self.ports.values().any(|&p| p == port) {
            return Err(ConfigError::DuplicatePort(port));
        }
        self.ports
            .insert(symbol, port)
            .map_err(|_| ConfigError::TooManyPorts(port))?;
        Ok(())
    }
}

/// Result of an allocation attempt
#[derive(Debug, Clone)]
pub enum Allocation {
    Assigned(PortAssignment),
    /// More distinct symbols than free ports; the sequence must be split
    Overflow { distinct: usize, available: usize },
}

/// Number of ports left for sequence reagents
pub fn available_slots(total_ports: u8) -> usize {
    total_ports.saturating_sub(RESERVED_PORTS) as usize
}

/// Assign ports to the distinct reagent symbols of one sequence part
///
/// `distinct` must already exclude symbols that do not need a port.
pub fn allocate(
    distinct: &[Symbol],
    mode: PortMode,
    total_ports: u8,
    manual: &[PortMapping],
) -> Result<Allocation, ConfigError> {
    let available = available_slots(total_ports);
    if distinct.len() > available {
        return Ok(Allocation::Overflow {
            distinct: distinct.len(),
            available,
        });
    }

    let mut assignment = PortAssignment::new();
    match mode {
        PortMode::Auto => {
            for (port, &symbol) in (FIRST_REAGENT_PORT..=total_ports).zip(distinct) {
                assignment.insert(symbol, port)?;
            }
        }
        PortMode::Manual => {
            for &symbol in distinct {
                let port = manual
                    .iter()
                    .find(|m| m.symbol == symbol)
                    .map(|m| m.port)
                    .ok_or(ConfigError::MissingPortMapping(symbol))?;
                if !(FIRST_REAGENT_PORT..=total_ports).contains(&port) {
                    return Err(ConfigError::PortOutOfRange { symbol, port });
                }
                assignment.insert(symbol, port)?;
            }
        }
    }

    Ok(Allocation::Assigned(assignment))
}
