use std::path::PathBuf;
use std::time::Duration;

use crate::{
    connection::{DEFAULT_CONNECT_TRIES, DEFAULT_SETTLE_PERIOD},
    device::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT},
};

/// Settings for one diagnostic session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Serial device the adapter is attached to
    pub port: String,
    pub baud_rate: u32,
    /// Read and write timeout on the serial line
    pub timeout: Duration,
    /// Wait before every bus probe
    pub settle_period: Duration,
    /// Bus probes before giving up
    pub connect_tries: u32,
    /// JSON file with extra trouble code descriptions
    pub descriptions: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_TIMEOUT,
            settle_period: DEFAULT_SETTLE_PERIOD,
            connect_tries: DEFAULT_CONNECT_TRIES,
            descriptions: None,
        }
    }
}
