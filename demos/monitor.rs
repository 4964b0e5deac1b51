// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! Connects to the first attached device, runs the handshake, and
//! prints derived control values as they change.
//!
//! ```sh
//! RUST_LOG=debug cargo run --features midir --example monitor
//! ```

use std::{
    thread,
    time::{Duration, Instant},
};

use vpc40::{
    midi::midir::{MidiPortScanner, PORT_NAME_PREFIXES},
    CycleArgs, Vpc40Controller,
};

const CYCLE_PERIOD: Duration = Duration::from_millis(4);

fn main() {
    pretty_env_logger::init();
    if let Err(err) = run() {
        log::error!("{err}");
    }
}

fn run() -> anyhow::Result<()> {
    let scanner = MidiPortScanner::new().map_err(|err| anyhow::anyhow!("{err}"))?;
    let port_names = scanner.port_names();
    if port_names.is_empty() {
        anyhow::bail!("No MIDI ports available");
    }
    println!("Available ports: {port_names:?}");
    let (mut source, mut sink) = scanner
        .connect(PORT_NAME_PREFIXES)
        .map_err(|err| anyhow::anyhow!("{err}"))?;

    let mut controller = Vpc40Controller::new();
    let mut last_cycle = Instant::now();
    let mut last_report = String::new();
    println!("Starting endless loop, press CTRL-C to exit...");
    for frame in 0u64.. {
        let now = Instant::now();
        let args = CycleArgs {
            frame,
            elapsed_seconds: now.duration_since(last_cycle).as_secs_f32(),
            // Rising edge on the very first cycle fires the identity
            // inquiry exactly once.
            inquire: frame == 0,
            self_test: false,
        };
        last_cycle = now;
        controller.process_cycle(&args, &mut source, &mut sink);

        let report = format!(
            "device {device_id:?} bank {bank} shift {shifted} master {master:.2} crossfader {crossfader:.2} cue {cue:.2}",
            device_id = controller.device_id(),
            bank = controller.current_bank(),
            shifted = controller.is_shifted(),
            master = controller.master_level(),
            crossfader = controller.crossfader_level(),
            cue = controller.cue_level(),
        );
        if report != last_report {
            println!("{report}");
            last_report = report;
        }

        thread::sleep(CYCLE_PERIOD);
    }
    Ok(())
}
