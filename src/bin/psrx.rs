// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use log::{error, info, warn};
use psrx_core::core::config::MachineConfig;
use psrx_core::core::save_state::SaveState;
use psrx_core::core::system::System;
use std::fs;
use std::path::PathBuf;

/// PlayStation (PSX) CPU core runner
#[derive(Parser)]
#[command(name = "psrx")]
#[command(about = "Run R3000A code on the PSX CPU core", long_about = None)]
struct Args {
    /// Path to PlayStation BIOS file (e.g., SCPH1001.BIN)
    #[arg(short = 'b', long)]
    bios: Option<PathBuf>,

    /// Machine configuration (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Raw program image copied into RAM
    #[arg(short = 'e', long)]
    exe: Option<PathBuf>,

    /// Load address of --exe
    #[arg(long, value_parser = parse_address, default_value = "0x80010000")]
    load_addr: u32,

    /// Entry point of --exe (defaults to the load address)
    #[arg(long, value_parser = parse_address)]
    entry: Option<u32>,

    /// Number of instructions to execute
    #[arg(short = 'n', long, default_value = "100000")]
    steps: u64,

    /// Write an execution trace to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Stop tracing after this many instructions
    #[arg(long)]
    trace_limit: Option<u64>,

    /// Log BIOS A/B function calls
    #[arg(long)]
    trace_kernel: bool,

    /// Restore this save state before running
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write a save state here after running
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Print the CPU state as JSON after running
    #[arg(long)]
    dump_state: bool,
}

fn parse_address(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env may set RUST_LOG for this checkout
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("psrx v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            MachineConfig::from_file(path)?
        }
        None => MachineConfig::default(),
    };
    if args.bios.is_some() {
        config.bios_path = args.bios.clone();
    }
    config.trace_kernel_calls |= args.trace_kernel;

    let mut system = System::new(config.clone());

    match &config.bios_path {
        Some(path) => {
            info!("Loading BIOS from: {}", path.display());
            if let Err(e) = system.load_bios(path) {
                error!("Failed to load BIOS: {}", e);
                return Err(e.into());
            }
        }
        None => warn!("No BIOS given; the BIOS region reads as zeros"),
    }

    if let Some(path) = &args.load_state {
        info!("Loading save state from: {}", path.display());
        let state = SaveState::load_from_file(path)?;
        system.restore(&state)?;
    }

    if let Some(path) = &args.exe {
        let image = fs::read(path)?;
        let entry = args.entry.unwrap_or(args.load_addr);
        system.load_program(args.load_addr, &image, entry)?;
    }

    if let Some(path) = &args.trace {
        system.enable_tracing(path, args.trace_limit)?;
    }

    info!("Starting emulation at 0x{:08X}", system.pc());
    let log_interval = (args.steps / 10).max(1);

    for i in 0..args.steps {
        if i % log_interval == 0 && i > 0 {
            info!(
                "Progress: {}/{} instructions | PC: 0x{:08X} | Cycles: {}",
                i,
                args.steps,
                system.pc(),
                system.cycles()
            );
        }

        if let Err(e) = system.step() {
            error!("Error at PC=0x{:08X}: {}", system.pc(), e);
            error!("Instruction count: {}", i);
            system.cpu().dump_registers();
            system.disable_tracing()?;
            return Err(e.into());
        }
    }

    system.disable_tracing()?;

    info!("Total instructions: {}", args.steps);
    info!("Total cycles: {}", system.cycles());
    info!("Final PC: 0x{:08X}", system.pc());

    let state = system.snapshot("psrx");

    if let Some(path) = &args.save_state {
        state.save_to_file(path)?;
        info!("Save state written to: {}", path.display());
    }

    if args.dump_state {
        println!("{}", serde_json::to_string_pretty(&state.cpu)?);
    }

    Ok(())
}
