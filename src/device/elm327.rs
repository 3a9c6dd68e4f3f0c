use log::{debug, trace};

use super::{Result, Transport};

/// Printed by the adapter when it is ready for the next command
pub const PROMPT: u8 = b'>';

/// Ends every command sent to the adapter
pub const COMMAND_TERMINATOR: u8 = b'\r';

/// How the read of a response came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEnd {
    /// The adapter printed its prompt
    Prompt,
    /// The transport ran dry before the prompt arrived
    Timeout,
}

/// A normalized response read from the adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    text: String,
    end: FrameEnd,
}

impl Frame {
    pub fn new(text: String, end: FrameEnd) -> Self {
        Self { text, end }
    }

    /// Response text with line endings normalized and blank lines removed
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn end(&self) -> FrameEnd {
        self.end
    }

    /// Whether the response was terminated by the prompt
    pub fn is_complete(&self) -> bool {
        self.end == FrameEnd::Prompt
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// An ELM327 OBD-II adapter
///
/// Commands to the device itself are indicated by sending "AT" followed by the command, while
/// plain strings of hex data indicate OBD-II requests to be sent to the vehicle. The responses of
/// the vehicle are echoed back as hex characters, and every response ends with the `>` prompt.
///
/// [Datasheet for v1.4b](https://www.elmelectronics.com/products/dsheets/)
pub struct Elm327<T: Transport> {
    device: T,
}

impl<T: Transport> Elm327<T> {
    pub fn new(device: T) -> Self {
        Self { device }
    }

    /// Send a command and read its whole response
    ///
    /// Exactly one write and one read up to the prompt; nothing is retried here.
    pub fn send(&mut self, command: &str) -> Result<Frame> {
        self.send_serial_str(command)?;
        let frame = self.read_frame()?;
        debug!("send: {:?} -> {:?}", command, frame);
        Ok(frame)
    }

    /// Read data until the ELM327's prompt character is printed
    ///
    /// The prompt signifies that the ELM327 is ready for another command and is never part of the
    /// returned text. If the transport runs out of data first, whatever arrived is returned with
    /// [FrameEnd::Timeout].
    pub fn read_frame(&mut self) -> Result<Frame> {
        let mut buf = Vec::new();
        let end = loop {
            match self.device.read_byte()? {
                Some(PROMPT) => break FrameEnd::Prompt,
                // the adapter pads some replies with NUL bytes; they carry no data
                Some(b'\0') => {}
                Some(b) => buf.push(b),
                None => break FrameEnd::Timeout,
            }
        };

        trace!(
            "read_frame: got {:?} ({:?})",
            String::from_utf8_lossy(&buf),
            end
        );

        Ok(Frame::new(normalize(&String::from_utf8_lossy(&buf)), end))
    }

    /// Drop anything the adapter sent that nobody asked for
    pub fn purge_buffers(&mut self) -> Result<()> {
        self.device.purge_buffers()
    }

    /// Give the transport back, e.g. to close it explicitly
    pub fn into_inner(self) -> T {
        self.device
    }

    /// Function for sending a raw string, followed by the command terminator
    fn send_serial_str(&mut self, data: &str) -> Result<()> {
        trace!("send_serial_str: sending {:?}", data);

        let mut bytes = Vec::with_capacity(data.len() + 1);
        bytes.extend_from_slice(data.as_bytes());
        bytes.push(COMMAND_TERMINATOR);
        self.device.write_all(&bytes)
    }
}

/// Convert carriage returns to newlines and collapse every run of newlines into one
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c == '\r' { '\n' } else { c };
        if c == '\n' && out.ends_with('\n') {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockTransport;

    #[test]
    fn reads_up_to_prompt() {
        let mut elm = Elm327::new(MockTransport::from_script(&[("AT S0", "OK\r\r>")]));
        let frame = elm.send("AT S0").unwrap();
        assert_eq!(frame.text(), "OK\n");
        assert!(frame.is_complete());
    }

    #[test]
    fn prompt_is_never_returned() {
        let mut elm = Elm327::new(MockTransport::from_script(&[(
            "0100",
            "SEARCHING...\r41 00 BE 3F A8 13\r\r>",
        )]));
        let frame = elm.send("0100").unwrap();
        assert!(!frame.text().contains('>'));
        assert_eq!(frame.text(), "SEARCHING...\n41 00 BE 3F A8 13\n");
    }

    #[test]
    fn stops_at_first_prompt() {
        let transport = MockTransport::new(|_| Some("OK\r>STALE\r>".to_owned()));
        let mut elm = Elm327::new(transport);
        assert_eq!(elm.send("AT E0").unwrap().text(), "OK\n");
        assert_eq!(elm.read_frame().unwrap().text(), "STALE\n");
    }

    #[test]
    fn timeout_returns_partial_frame() {
        let mut elm = Elm327::new(MockTransport::new(|_| Some("41 00 BE".to_owned())));
        let frame = elm.send("0100").unwrap();
        assert_eq!(frame.end(), FrameEnd::Timeout);
        assert_eq!(frame.text(), "41 00 BE");
    }

    #[test]
    fn silent_adapter_gives_empty_timeout() {
        let mut elm = Elm327::new(MockTransport::new(|_| None));
        let frame = elm.send("AT Z").unwrap();
        assert_eq!(frame, Frame::new(String::new(), FrameEnd::Timeout));
    }

    #[test]
    fn nul_bytes_are_skipped() {
        let mut elm = Elm327::new(MockTransport::new(|_| Some("\0OK\0\r\r>".to_owned())));
        assert_eq!(elm.send("AT E0").unwrap().text(), "OK\n");
    }

    #[test]
    fn nul_padding_inside_a_line_is_dropped() {
        let mut elm = Elm327::new(MockTransport::new(|_| Some("A\0B\r>".to_owned())));
        assert_eq!(elm.send("0100").unwrap().text(), "AB\n");
    }

    #[test]
    fn command_gets_terminator() {
        let transport = MockTransport::from_script(&[("AT RV", "12.6V\r\r>")]);
        let handle = transport.handle();
        let mut elm = Elm327::new(transport);
        elm.send("AT RV").unwrap();
        elm.send("AT RV").unwrap();
        assert_eq!(handle.commands(), vec!["AT RV", "AT RV"]);
    }

    #[test]
    fn normalize_collapses_blank_lines() {
        assert_eq!(normalize("\r\rELM327 v1.5\r\r"), "\nELM327 v1.5\n");
        assert_eq!(normalize("AT E0\r\nOK\r\n\r\n"), "AT E0\nOK\n");
        assert_eq!(normalize("a\n\n\n\nb"), "a\nb");
        assert_eq!(normalize("no newline"), "no newline");
    }

    #[test]
    fn normalize_never_leaves_double_newline() {
        let inputs = [
            "\r\n\r\n",
            "\r\r\r\r\r",
            "0: 49 02\r\r1: 57 4F\r\n\r\n\r\n2: 4C 46\r",
            "\n\r\n\rx\r\n\r\ny\n\n\r",
        ];
        for input in inputs {
            assert!(!normalize(input).contains("\n\n"), "{:?}", input);
        }
    }
}
