//! PepSy - Peptide Synthesizer Firmware
//!
//! Main firmware binary for RP2040-based synthesizer controllers. The
//! synthesis is configured at build time from `machine.toml`; on boot the
//! plan is compiled, reported over the debug probe and executed.
//!
//! Board wiring:
//! - GPIO0: UART0 TX to the stream-selector actuator
//! - GPIO2-6: nitrogen, vent, reagent, waste and prime valves
//! - GPIO7: pump solenoid
//! - GPIO14/15: confirm and decline buttons (to ground)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pepsyn_core::report::write_plan;
use pepsyn_core::traits::{HardwareAdapter, Line, Operator};
use pepsyn_core::{Executor, SynthesisPlan};
use pepsyn_drivers::panel::PanelOperator;
use pepsyn_drivers::pump::SolenoidPump;
use pepsyn_drivers::selector::ViciSelector;
use pepsyn_drivers::valve::ValveManifold;
use pepsyn_drivers::Synthesizer;

use crate::console::{DefmtWriter, LoggingOperator};

mod config;
mod console;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();

// The plan is borrowed by the executor for the whole run
static PLAN: StaticCell<SynthesisPlan> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("PepSy firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let (machine, plan) = match config::load_plan() {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Invalid embedded configuration: {:?}", e);
            halt()
        }
    };
    let plan = PLAN.init(plan);
    info!(
        "Loaded '{=str}': {} steps in {} part(s)",
        machine.synthesis.label.as_str(),
        plan.total_steps(),
        plan.parts().len()
    );

    // Print the reservoir and step tables before anything moves
    let mut report = DefmtWriter::new();
    if write_plan(&mut report, plan).is_err() {
        warn!("Report truncated");
    }
    drop(report);

    // Stream selector: ASCII commands over UART0 TX (GPIO0)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = machine.device.valve_baud;
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 16]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, _rx) = uart.split();
    let selector = ViciSelector::new(tx, machine.device.total_ports);
    info!("Stream selector on UART0 at {} baud", machine.device.valve_baud);

    // Valve manifold, ordered as Line::ALL
    let device = &machine.device;
    let valves = ValveManifold::new(
        [
            Output::new(p.PIN_2, Level::Low),
            Output::new(p.PIN_3, Level::Low),
            Output::new(p.PIN_4, Level::Low),
            Output::new(p.PIN_5, Level::Low),
            Output::new(p.PIN_6, Level::Low),
        ],
        Line::ALL.map(|line| device.is_inverted(line)),
    );
    let pump = SolenoidPump::new(
        Output::new(p.PIN_7, Level::Low),
        device.pump_stroke_ul as u32,
    );
    let (valves, pump) = match (valves, pump) {
        (Ok(valves), Ok(pump)) => (valves, pump),
        (Err(e), _) | (_, Err(e)) => {
            error!("Fluidics init failed: {:?}", e);
            halt()
        }
    };
    let hardware = Synthesizer::new(selector, valves, pump, Delay);
    info!("Fluidics initialized");

    let panel = PanelOperator::new(
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
        Delay,
    );
    let operator = LoggingOperator::new(panel);

    run(plan, hardware, operator);
    halt()
}

/// Execute the plan to completion or the first fault
fn run<H, O>(plan: &SynthesisPlan, hardware: H, operator: O)
where
    H: HardwareAdapter,
    H::Error: Format,
    O: Operator,
{
    let mut executor = Executor::new(plan, hardware, operator);
    match executor.run() {
        Ok(()) => info!("Synthesis complete"),
        Err(e) => {
            error!("Synthesis aborted in {:?}: {:?}", executor.state(), e);
            warn!("Inspect the fluidics before resuming at the next residue");
        }
    }
}

/// Park the core; the run is over either way
fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
