//! Crate for reading the VIN and trouble codes from a car through an ELM327 adapter
//!
//! # Usage
//! ```no_run
//! use obd2_dtc::{commands::Obd2DataRetrieval, device::SerialPort, lookup::CodeTables, Obd2};
//!
//! fn main() -> Result<(), obd2_dtc::Error> {
//!     let port = SerialPort::new("/dev/ttyUSB0", 115_200, std::time::Duration::from_secs(60))?;
//!     let mut device = Obd2::new(port);
//!     println!("VIN: {:?}", device.get_vin()?);
//!     print!("{}", device.get_stored_dtcs(&CodeTables::standard())?);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod commands;

pub mod config;

pub mod connection;

pub mod device;

mod error;
pub use error::{DeviceError, Error};
use error::Result;

mod interface;
pub use interface::{Obd2, SetupStep, BUS_PROBE_COMMAND, SETUP_STEPS};

pub mod lookup;

mod obd2_device;
pub use obd2_device::{Obd2Device, Response, BUS_UNAVAILABLE_MARKER, NO_DATA_MARKER};

pub mod workflow;
