use std::time::Duration;

use super::Result;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Read and write timeout applied to the serial line
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A duplex byte stream to an ELM327 adapter
///
/// `read_byte` returns `Ok(None)` when the line has nothing more to give within the device's own
/// timeout. Callers treat that as the end of the current response.
pub trait Transport {
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
    fn read_byte(&mut self) -> Result<Option<u8>>;
    fn purge_buffers(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn purge_buffers(&mut self) -> Result<()> {
        (**self).purge_buffers()
    }
}
