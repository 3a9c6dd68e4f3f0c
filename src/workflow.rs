//! The full diagnostic session: reset, configure, connect, read VIN and trouble codes
//!
//! Progress and results are written as plain text to the given output.

use std::io::Write;

use log::{info, warn};

use crate::{
    commands::{DtcReport, Obd2DataRetrieval},
    config::SessionConfig,
    connection::{ConnectionState, Establisher, SettleTimer},
    device::Transport,
    interface::SETUP_STEPS,
    lookup::DtcLookup,
    Error, Obd2, Result,
};

/// What a completed session read from the vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub vin: Option<String>,
    pub stored: DtcReport,
    pub pending: DtcReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(Summary),
    /// The bus never answered; nothing after the probes was sent
    ConnectionFailed,
}

/// Run a session over `adapter`, which is closed before returning on every path
///
/// Configuration steps that are not acknowledged are reported and skipped over. A bus that does
/// not come up ends the session early. Decoding errors end it with an error.
pub fn run<T, S, L, W>(
    mut adapter: Obd2<T>,
    timer: S,
    config: &SessionConfig,
    lookup: &L,
    out: &mut W,
) -> Result<Outcome>
where
    T: Transport,
    S: SettleTimer,
    L: DtcLookup + ?Sized,
    W: Write,
{
    let banner = adapter.reset()?;
    writeln!(out, "{}", banner.trim())?;

    for step in SETUP_STEPS {
        let status = if adapter.configure(step)? {
            "SUCCESS"
        } else {
            "FAILED"
        };
        writeln!(out, "{}: {} - {}", status, step.command, step.description)?;
    }

    print_info(out, "ELM Device Description", adapter.get_device_description())?;
    print_info(out, "ELM Device User Description", adapter.get_user_description())?;
    print_info(out, "Volt reading at OBDII Connector", adapter.get_voltage())?;

    writeln!(out, "CONNECTING TO CAN BUS FOR OBDII COMMUNICATION...")?;
    let mut establisher = Establisher::new(timer, config.settle_period, config.connect_tries);
    let state = establisher.establish(|| adapter.probe())?;
    info!(
        "Bus connection {:?} after {} probes",
        state,
        establisher.probes()
    );

    if state != ConnectionState::Connected {
        writeln!(out, "FAILED TO CONNECT TO CAN BUS")?;
        adapter.close();
        return Ok(Outcome::ConnectionFailed);
    }

    print_info(out, "USING CAN BUS Protocol", adapter.get_protocol())?;

    let vin = adapter.get_vin()?;
    writeln!(
        out,
        "Vehicle VIN: {}\n",
        vin.as_deref().unwrap_or("[NOT REPORTED]")
    )?;

    let stored = adapter.get_stored_dtcs(lookup)?;
    writeln!(out, "Stored errors:")?;
    writeln!(out, "{}", stored)?;

    let pending = adapter.get_pending_dtcs(lookup)?;
    writeln!(out, "Pending errors:")?;
    writeln!(out, "{}", pending)?;

    adapter.close();

    Ok(Outcome::Completed(Summary {
        vin,
        stored,
        pending,
    }))
}

/// Print an informational adapter reading; a timeout is reported instead of ending the session
fn print_info<W: Write>(out: &mut W, label: &str, value: Result<String>) -> Result<()> {
    match value {
        Ok(text) => writeln!(out, "{}: {}", label, text)?,
        Err(Error::Timeout { command, .. }) => {
            warn!("{} timed out", command);
            writeln!(out, "{}: [NO RESPONSE]", label)?;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}
