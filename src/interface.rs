use log::{debug, info, warn};

use super::{
    device::{Elm327, Frame, Transport},
    obd2_device::Response,
    Error, Obd2Device, Result,
};

/// Mode 1 PID 0 (supported PIDs), used to check that the vehicle's bus answers
pub const BUS_PROBE_COMMAND: &str = "0100";

/// One adapter configuration command and what it is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupStep {
    pub command: &'static str,
    pub description: &'static str,
}

/// Configuration sent after the reset, in order
pub const SETUP_STEPS: &[SetupStep] = &[
    SetupStep {
        command: "AT E0",
        description: "set echo off",
    },
    SetupStep {
        command: "AT S0",
        description: "set white spaces off",
    },
    SetupStep {
        command: "AT SP A3",
        description: "set protocol to ISO 9141-2",
    },
    SetupStep {
        command: "AT IB 10",
        description: "set high speed CAN BUS",
    },
];

/// An OBD-II interface
///
/// Owns the adapter for the length of one session. Dropping it closes the transport.
pub struct Obd2<T: Transport> {
    device: Elm327<T>,
}

impl<T: Transport> Obd2Device for Obd2<T> {
    fn send(&mut self, command: &str) -> Result<Frame> {
        Ok(self.device.send(command)?)
    }
}

impl<T: Transport> Obd2<T> {
    pub fn new(transport: T) -> Self {
        Self {
            device: Elm327::new(transport),
        }
    }

    /// Reset the adapter and return its banner
    pub fn reset(&mut self) -> Result<String> {
        info!("Performing IC reset");
        self.device.purge_buffers()?;
        let banner = self.send("AT Z")?;
        debug!("reset: got response {:?}", banner);
        Ok(banner.into_text())
    }

    /// Send one configuration command; `Ok(false)` when the adapter did not acknowledge it
    ///
    /// A step that times out counts as not acknowledged.
    pub fn configure(&mut self, step: &SetupStep) -> Result<bool> {
        match self.command(step.command) {
            Ok(Response::Ok) => Ok(true),
            Ok(other) => {
                warn!("{} ({}) not acknowledged: {:?}", step.command, step.description, other);
                Ok(false)
            }
            Err(Error::Timeout { command, partial }) => {
                warn!("{} timed out (got {:?})", command, partial);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Ask the vehicle for its supported PIDs to see if the bus is up
    ///
    /// A probe that times out is reported as [Response::BusUnavailable].
    pub fn probe(&mut self) -> Result<Response> {
        match self.command(BUS_PROBE_COMMAND) {
            Err(Error::Timeout { partial, .. }) => {
                warn!("bus probe timed out (got {:?})", partial);
                Ok(Response::BusUnavailable(partial))
            }
            other => other,
        }
    }

    /// Release the adapter
    pub fn close(self) {
        info!("Closing adapter");
        drop(self.device.into_inner());
    }
}
