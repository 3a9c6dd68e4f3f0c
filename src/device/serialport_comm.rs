use super::serial_comm::Transport;
use super::Result;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Communicate with a serial device using the
/// serialport library
///
/// /dev/tty* or similar on unix-like systems
/// COM devices on Windows systems
pub struct SerialPort {
    device: Box<dyn serialport::SerialPort>,
}

impl SerialPort {
    /// Opens `path` at `baud_rate`, 8N1, with `timeout` applied to reads and writes
    pub fn new(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let device = serialport::new(path, baud_rate)
            .timeout(timeout)
            .parity(serialport::Parity::None)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .open()?;

        Ok(Self { device })
    }

    /// Name of the opened port, if the platform reports one
    pub fn name(&self) -> Option<String> {
        self.device.name()
    }
}

impl Transport for SerialPort {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.device.write_all(data)?;
        Ok(self.device.flush()?)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.device.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn purge_buffers(&mut self) -> Result<()> {
        Ok(self.device.clear(serialport::ClearBuffer::All)?)
    }
}
