//! Build script for pepsyn-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml and compiles the synthesis plan at build time
//! - Embeds the configuration as a postcard image

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pepsyn_core::config::{encode, MachineConfig, CONFIG_VERSION};
use pepsyn_core::SynthesisPlan;

/// Upper bound for the encoded configuration image
const MAX_IMAGE_SIZE: usize = 1024;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    setup_linker(&out_dir);
    let config = load_config();
    validate_plan(&config);
    write_image(&config, &out_dir);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

fn load_config() -> MachineConfig {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");
    if !config_path.exists() {
        fail(
            "machine.toml not found!",
            &[
                "The firmware requires a machine.toml configuration file.",
                "Please create one in the pepsyn-firmware directory.",
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read machine.toml", &[&e.to_string()]),
    };

    let config: MachineConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            let msg = e.to_string();
            let lines: Vec<&str> = msg.lines().collect();
            fail("Invalid machine.toml", &lines)
        }
    };

    if config.version != CONFIG_VERSION {
        fail(
            "Unsupported machine.toml version",
            &[&format!(
                "Found version {}, expected {}",
                config.version, CONFIG_VERSION
            )],
        );
    }

    config
}

/// Compile the sequence so every configuration problem fails the build
fn validate_plan(config: &MachineConfig) {
    let plan = match SynthesisPlan::build(&config.device, &config.synthesis) {
        Ok(plan) => plan,
        Err(e) => fail("Synthesis plan rejected", &[&format!("{:?}", e)]),
    };

    println!(
        "cargo:warning=machine.toml validated: {} steps in {} part(s)",
        plan.total_steps(),
        plan.parts().len()
    );
}

fn write_image(config: &MachineConfig, out_dir: &Path) {
    let mut buf = [0u8; MAX_IMAGE_SIZE];
    let image = match encode(config, &mut buf) {
        Ok(image) => image,
        Err(e) => fail("Failed to encode configuration", &[&format!("{:?}", e)]),
    };
    let mut f = File::create(out_dir.join("machine.bin")).unwrap();
    f.write_all(image).unwrap();
}

/// Abort the build with a boxed error message
fn fail(title: &str, details: &[&str]) -> ! {
    let body = details
        .iter()
        .flat_map(|d| d.lines())
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<58} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
