//! Byte-level access to an ELM327 adapter

mod elm327;
pub use elm327::{normalize, Elm327, Frame, FrameEnd, COMMAND_TERMINATOR, PROMPT};

pub mod mock;

mod serial_comm;
pub use serial_comm::{Transport, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};

#[cfg(feature = "serialport_comm")]
mod serialport_comm;
#[cfg(feature = "serialport_comm")]
pub use serialport_comm::SerialPort;

#[cfg(feature = "ftdi_comm")]
mod ftdi_comm;
#[cfg(feature = "ftdi_comm")]
pub use ftdi_comm::FTDIDevice;

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[cfg(feature = "ftdi_comm")]
    #[error("FTDI error: `{0:?}`")]
    Ftdi(ftdi::Error),
    #[cfg(feature = "serialport_comm")]
    #[error("Serial port error: `{0}`")]
    Serial(serialport::Error),
    #[error("IO error: `{0:?}`")]
    IO(std::io::Error),
    #[error("Communication error: `{0}`")]
    Communication(String),
}

#[cfg(feature = "ftdi_comm")]
impl From<ftdi::Error> for Error {
    fn from(e: ftdi::Error) -> Self {
        Error::Ftdi(e)
    }
}

#[cfg(feature = "serialport_comm")]
impl From<serialport::Error> for Error {
    fn from(e: serialport::Error) -> Self {
        Error::Serial(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IO(e)
    }
}
