// SPDX-FileCopyrightText: The vpc40 authors
// SPDX-License-Identifier: MPL-2.0

//! `midir`-backed transport adapter.
//!
//! Bridges a pair of OS MIDI ports to [`MidiMessageSource`] and
//! [`MidiMessageSink`]. The `midir` input callback runs on its own
//! thread, so inbound messages are decoded there and handed to the
//! processing cycle through an unbounded channel.

use std::sync::mpsc;

use midir::{
    ConnectError, Ignore, InitError, MidiInput, MidiInputConnection, MidiOutput,
    MidiOutputConnection,
};
use thiserror::Error;

use super::{ControlMessage, MidiMessageSink, MidiMessageSource, TimeStamp};
use crate::{output::OutputError, OutputResult};

/// Port name prefixes the device registers under.
pub const PORT_NAME_PREFIXES: &[&str] = &["Akai APC40", "APC40"];

#[derive(Debug, Error)]
pub enum PortError {
    #[error("no matching port")]
    NoMatchingPort,
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    ConnectInput(#[from] ConnectError<MidiInput>),
    #[error(transparent)]
    ConnectOutput(#[from] ConnectError<MidiOutput>),
}

/// Inbound half of a connected port pair.
///
/// Dropping it closes the input connection.
#[allow(missing_debug_implementations)]
pub struct MidiInputGateway {
    messages: mpsc::Receiver<ControlMessage>,
    _connection: MidiInputConnection<mpsc::Sender<ControlMessage>>,
}

impl MidiMessageSource for MidiInputGateway {
    fn try_pop_message(&mut self) -> Option<ControlMessage> {
        self.messages.try_recv().ok()
    }
}

/// Outbound half of a connected port pair.
#[allow(missing_debug_implementations)]
pub struct MidiOutputGateway {
    connection: MidiOutputConnection,
}

impl MidiMessageSink for MidiOutputGateway {
    fn send_message(&mut self, message: &ControlMessage) -> OutputResult<()> {
        self.connection
            .send(&message.to_bytes())
            .map_err(|err| OutputError::Send {
                msg: err.to_string().into(),
            })
    }
}

/// Enumerates the OS MIDI ports and connects a matching input/output
/// pair.
#[allow(missing_debug_implementations)]
pub struct MidiPortScanner {
    input: MidiInput,
    output: MidiOutput,
}

impl MidiPortScanner {
    pub fn new() -> Result<Self, PortError> {
        let mut input = MidiInput::new("port scanner input")?;
        input.ignore(Ignore::None);
        let output = MidiOutput::new("port scanner output")?;
        Ok(Self { input, output })
    }

    /// Names of all input ports that also have an equally named output
    /// port.
    #[must_use]
    pub fn port_names(&self) -> Vec<String> {
        self.input
            .ports()
            .into_iter()
            .filter_map(|input_port| {
                let port_name = self.input.port_name(&input_port).ok()?;
                self.find_output_port(&port_name)?;
                Some(port_name)
            })
            .collect()
    }

    /// Connect the first port pair whose name starts with one of the
    /// given prefixes.
    pub fn connect(
        self,
        port_name_prefixes: &[&str],
    ) -> Result<(MidiInputGateway, MidiOutputGateway), PortError> {
        let mut matching = None;
        for input_port in self.input.ports() {
            let Ok(port_name) = self.input.port_name(&input_port) else {
                continue;
            };
            if !port_name_prefixes
                .iter()
                .any(|prefix| port_name.starts_with(prefix))
            {
                continue;
            }
            let Some(output_port) = self.find_output_port(&port_name) else {
                continue;
            };
            matching = Some((port_name, input_port, output_port));
            break;
        }
        let Some((port_name, input_port, output_port)) = matching else {
            return Err(PortError::NoMatchingPort);
        };
        log::info!("Connecting MIDI ports \"{port_name}\"");
        let (tx, rx) = mpsc::channel();
        let input_connection = self.input.connect(
            &input_port,
            &port_name,
            |stamp, bytes, tx| {
                // midir stamps with microseconds. Monotonic is all the
                // processing cycle needs.
                let Some(message) = ControlMessage::try_from_bytes(TimeStamp::new(stamp), bytes)
                else {
                    log::debug!("Dropping unsupported inbound message: {bytes:02x?}");
                    return;
                };
                if tx.send(message).is_err() {
                    log::debug!("Receiver is gone, dropping inbound message");
                }
            },
            tx,
        )?;
        let output_connection = self.output.connect(&output_port, &port_name)?;
        Ok((
            MidiInputGateway {
                messages: rx,
                _connection: input_connection,
            },
            MidiOutputGateway {
                connection: output_connection,
            },
        ))
    }

    fn find_output_port(&self, port_name: &str) -> Option<midir::MidiOutputPort> {
        self.output.ports().into_iter().find(|port| {
            self.output
                .port_name(port)
                .map_or(false, |name| name == port_name)
        })
    }
}
