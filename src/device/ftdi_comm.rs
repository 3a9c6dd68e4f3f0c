use super::serial_comm::Transport;
use super::Result;
use std::io::{Read, Write};
use std::time::{Duration, Instant};

/// Communicate with a USB to Serial FTDI device
/// with the FTDI library
///
/// FTDI reads return immediately when the chip has no data, so the read timeout is enforced here
/// by polling.
pub struct FTDIDevice {
    device: ftdi::Device,
    timeout: Duration,
}

impl FTDIDevice {
    /// Opens the first FT232R found on the bus
    pub fn new(baud_rate: u32, timeout: Duration) -> Result<Self> {
        let mut device = ftdi::find_by_vid_pid(0x0403, 0x6001)
            .interface(ftdi::Interface::A)
            .open()?;

        device.set_baud_rate(baud_rate)?;
        device.configure(ftdi::Bits::Eight, ftdi::StopBits::One, ftdi::Parity::None)?;
        device.usb_reset()?;

        Ok(Self { device, timeout })
    }
}

impl Transport for FTDIDevice {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        Ok(self.device.write_all(data)?)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        let start = Instant::now();
        while start.elapsed() < self.timeout {
            if self.device.read(&mut buf)? > 0 {
                return Ok(Some(buf[0]));
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(None)
    }

    fn purge_buffers(&mut self) -> Result<()> {
        Ok(self.device.usb_purge_buffers()?)
    }
}
