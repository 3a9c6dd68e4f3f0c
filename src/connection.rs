//! Bringing up the link between the adapter and the vehicle's bus
//!
//! After a reset the adapter may need a while to negotiate protocol and speed with the vehicle.
//! The [Establisher] waits a settle period, probes the bus, and repeats while the adapter reports
//! that it cannot connect, up to a fixed number of tries.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};

use crate::{obd2_device::Response, Error, Result};

pub const DEFAULT_SETTLE_PERIOD: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TRIES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Probing,
    Connected,
    Failed,
}

/// Waits out the settle period before each bus probe
pub trait SettleTimer {
    /// Block for `period`, or return [Error::Cancelled] if the wait is abandoned
    fn settle(&mut self, period: Duration) -> Result<()>;
}

impl<S: SettleTimer + ?Sized> SettleTimer for &mut S {
    fn settle(&mut self, period: Duration) -> Result<()> {
        (**self).settle(period)
    }
}

/// Cancels waits on every [ThreadTimer] holding a clone of it
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<(Mutex<bool>, Condvar)>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0 .0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout` unless cancelled first; returns whether it was cancelled
    fn wait(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.0;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (cancelled, _) = cvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled
    }
}

/// Settle timer that blocks the calling thread, counting down once a second
#[derive(Debug, Clone, Default)]
pub struct ThreadTimer {
    token: CancelToken,
}

impl ThreadTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancelToken) -> Self {
        Self { token }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }
}

impl SettleTimer for ThreadTimer {
    fn settle(&mut self, period: Duration) -> Result<()> {
        const TICK: Duration = Duration::from_secs(1);

        let mut remaining = period;
        while !remaining.is_zero() {
            debug!("settle: {:.0}s left", remaining.as_secs_f32().ceil());
            let step = remaining.min(TICK);
            if self.token.wait(step) {
                return Err(Error::Cancelled);
            }
            remaining -= step;
        }
        Ok(())
    }
}

/// Retry loop that probes the bus until it answers or the tries run out
pub struct Establisher<S: SettleTimer> {
    timer: S,
    settle_period: Duration,
    tries: u32,
    probes: u32,
    state: ConnectionState,
}

impl<S: SettleTimer> Establisher<S> {
    pub fn new(timer: S, settle_period: Duration, tries: u32) -> Self {
        Self {
            timer,
            settle_period,
            tries,
            probes: 0,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Number of probes issued so far
    pub fn probes(&self) -> u32 {
        self.probes
    }

    /// Run the probe cycle and return the terminal state
    ///
    /// Only [Response::BusUnavailable] counts as a failed probe. Once the state is
    /// [ConnectionState::Connected] or [ConnectionState::Failed] further calls return it without
    /// probing. A cancelled settle wait or a probe error leaves the establisher failed.
    pub fn establish<F>(&mut self, probe: F) -> Result<ConnectionState>
    where
        F: FnMut() -> Result<Response>,
    {
        if matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Failed
        ) {
            return Ok(self.state);
        }

        let result = self.run(probe);
        if result.is_err() {
            self.state = ConnectionState::Failed;
        }
        result
    }

    fn run<F>(&mut self, mut probe: F) -> Result<ConnectionState>
    where
        F: FnMut() -> Result<Response>,
    {
        let mut remaining = self.tries;
        self.state = ConnectionState::Probing;

        while remaining > 0 {
            remaining -= 1;
            self.timer.settle(self.settle_period)?;
            self.probes += 1;

            match probe()? {
                Response::BusUnavailable(raw) => {
                    warn!("bus unavailable ({:?}), {} tries left", raw, remaining);
                    if remaining > 0 {
                        info!("Trying to reconnect... ({})", remaining);
                    }
                }
                response => {
                    debug!("establish: bus answered {:?}", response);
                    self.state = ConnectionState::Connected;
                    return Ok(self.state);
                }
            }
        }

        self.state = ConnectionState::Failed;
        Ok(self.state)
    }
}
