use crate::{device::Frame, Error, Result};

/// Printed by the adapter when no protocol gets an answer from the vehicle
pub const BUS_UNAVAILABLE_MARKER: &str = "UNABLE TO CONNECT";

/// Printed by the adapter when the vehicle answers nothing to a request
pub const NO_DATA_MARKER: &str = "NO DATA";

/// What a response means, decided once when it is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The adapter acknowledged the command
    Ok,
    /// The request reached the vehicle but nothing answered
    NoData,
    /// The adapter could not reach the vehicle's bus
    BusUnavailable(String),
    /// Anything else, e.g. data or an error message
    Other(String),
}

impl Response {
    pub fn classify(text: &str) -> Self {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        if text.contains(BUS_UNAVAILABLE_MARKER) {
            Self::BusUnavailable(text.to_owned())
        } else if lines.clone().last() == Some("OK") {
            Self::Ok
        } else if lines.any(|l| l == NO_DATA_MARKER) {
            Self::NoData
        } else {
            Self::Other(text.to_owned())
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// A higher-level API for using an OBD-II adapter
pub trait Obd2Device {
    /// Send a command and get the normalized response, complete or not
    fn send(&mut self, command: &str) -> Result<Frame>;

    /// Send a command and get its response text
    ///
    /// A response that did not end with the prompt is an [Error::Timeout].
    fn data_command(&mut self, command: &str) -> Result<String> {
        let frame = self.send(command)?;
        if frame.is_complete() {
            Ok(frame.into_text())
        } else {
            Err(Error::Timeout {
                command: command.to_owned(),
                partial: frame.into_text(),
            })
        }
    }

    /// Send a command and classify the response
    fn command(&mut self, command: &str) -> Result<Response> {
        self.data_command(command).map(|r| Response::classify(&r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_ok() {
        assert_eq!(Response::classify("OK\n"), Response::Ok);
        assert_eq!(Response::classify("AT E0\nOK\n"), Response::Ok);
        assert!(!Response::classify("OK\nELM327 v1.5\n").is_ok());
    }

    #[test]
    fn classify_bus_unavailable() {
        assert_eq!(
            Response::classify("SEARCHING...\nUNABLE TO CONNECT\n"),
            Response::BusUnavailable("SEARCHING...\nUNABLE TO CONNECT\n".to_owned())
        );
    }

    #[test]
    fn classify_no_data_and_other() {
        assert_eq!(Response::classify("NO DATA\n"), Response::NoData);
        assert_eq!(
            Response::classify("4100BE3FA813\n"),
            Response::Other("4100BE3FA813\n".to_owned())
        );
        assert_eq!(Response::classify(""), Response::Other(String::new()));
        assert_eq!(Response::classify("?\n"), Response::Other("?\n".to_owned()));
    }
}
