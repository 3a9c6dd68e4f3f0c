//! Scripted in-memory adapter
//!
//! Stands in for a real ELM327 when no vehicle is at hand. Every carriage-return-terminated
//! command written to it is passed to a responder, and the responder's reply is queued for
//! reading. An exhausted queue reads as a timeout.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use log::trace;

use super::{Result, Transport};

/// Produces the adapter's raw reply (including the trailing `>`) for a command
pub type Responder = Box<dyn FnMut(&str) -> Option<String> + Send>;

#[derive(Debug, Default)]
struct MockState {
    commands: Vec<String>,
    purges: usize,
    closed: bool,
}

/// Shared view of what a [MockTransport] has seen, usable after the transport is dropped
#[derive(Debug, Clone, Default)]
pub struct MockHandle(Arc<Mutex<MockState>>);

impl MockHandle {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Commands received so far, without their terminators
    pub fn commands(&self) -> Vec<String> {
        self.state().commands.clone()
    }

    /// Number of times the receive buffer was purged
    pub fn purges(&self) -> usize {
        self.state().purges
    }

    /// Whether the transport has been dropped
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

pub struct MockTransport {
    responder: Responder,
    pending: Vec<u8>,
    rx: VecDeque<u8>,
    handle: MockHandle,
}

impl MockTransport {
    pub fn new(responder: impl FnMut(&str) -> Option<String> + Send + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            pending: Vec::new(),
            rx: VecDeque::new(),
            handle: MockHandle::default(),
        }
    }

    /// Replies from a fixed table; commands missing from it get the adapter's `?` reply
    pub fn from_script(script: &[(&str, &str)]) -> Self {
        let script: Vec<(String, String)> = script
            .iter()
            .map(|(c, r)| (c.to_string(), r.to_string()))
            .collect();
        Self::new(move |cmd| {
            Some(
                script
                    .iter()
                    .find(|(c, _)| c == cmd)
                    .map(|(_, r)| r.clone())
                    .unwrap_or_else(|| "?\r\r>".to_owned()),
            )
        })
    }

    pub fn handle(&self) -> MockHandle {
        self.handle.clone()
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        for &b in data {
            if b != b'\r' {
                self.pending.push(b);
                continue;
            }
            let cmd = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            trace!("mock: received {:?}", cmd);
            self.handle.state().commands.push(cmd.clone());
            if let Some(reply) = (self.responder)(&cmd) {
                self.rx.extend(reply.bytes());
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.rx.pop_front())
    }

    fn purge_buffers(&mut self) -> Result<()> {
        self.rx.clear();
        self.handle.state().purges += 1;
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.handle.state().closed = true;
    }
}
