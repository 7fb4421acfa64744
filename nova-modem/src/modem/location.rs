//! GNSS bring-up and the location request state machine.
//!
//! A request walks `GnssEnabling -> AwaitingFix` and ends in one of the
//! [`LocationStatus`] terminals, or in an error when the modem refuses to power
//! the receiver or rejects `+ULOC`. The receiver is never powered down again.

use super::NovaModem;
use crate::error::{ModemError, Result};
use crate::event::{EventSink, ModemEvent};
use crate::parser::{parse_location, LocationFix};
use crate::transport::ModemTransport;
use serde::Serialize;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// `+UGPIOC` settings powering the receiver: GPIO 23 as GNSS supply enable and
/// GPIO 24 as GNSS data ready.
const GNSS_GPIO_CONFIG: [&str; 2] = ["23,3", "24,4"];

/// How a location request that did not error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocationStatus {
    /// A `+UULOC` report arrived; the returned fix is fresh.
    Received,
    NoPacketContext,
    /// The packet data context went away before a report arrived.
    ContextDropped,
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationOutcome {
    /// The fresh fix, or the last known one when no report arrived.
    pub fix: Option<LocationFix>,
    pub status: LocationStatus,
}

impl LocationOutcome {
    pub fn is_fresh(&self) -> bool {
        self.status == LocationStatus::Received
    }
}

impl<T: ModemTransport, S: EventSink> NovaModem<T, S> {
    pub fn is_gnss_enabled(&self) -> bool {
        self.gnss_enabled
    }

    pub fn last_location(&self) -> Option<&LocationFix> {
        self.last_location.as_ref()
    }

    /// Requests a fix and blocks until it arrives, the packet data context drops,
    /// the configured wait timeout expires or `cancel` fires.
    ///
    /// Errors only when the request could not be made at all. In every other case
    /// the last known fix is kept and returned if no new one arrived.
    pub fn request_location(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<LocationOutcome> {
        self.enable_gnss()?;

        if !self.transport.ensure_context_active() {
            warn!("no packet data context, keeping last known location");
            return Ok(self.outcome(LocationStatus::NoPacketContext));
        }

        let previous = self.last_location.take();
        let timeout = self.config.timeouts.command;
        let param = self.config.location.request_param();
        let result = self.transport.send("+ULOC", Some(param.as_str()), timeout);
        if !result.is_ok() {
            self.last_location = previous;
            return Err(ModemError::LocationRequestFailed);
        }

        let status = self.await_fix(cancel);
        if status != LocationStatus::Received {
            self.last_location = previous;
        }
        info!(?status, "location request finished");

        Ok(self.outcome(status))
    }

    /// Like [`Self::request_location`] but never fails: errors are logged and the
    /// last known fix is returned.
    pub fn get_location(&mut self) -> Option<LocationFix> {
        match self.request_location(&CancellationToken::new()) {
            Ok(outcome) => outcome.fix,
            Err(err) => {
                error!(%err, "location request failed");
                self.last_location.clone()
            }
        }
    }

    /// Handles a `+UULOC` line. The new fix replaces the cached one.
    pub fn on_location_urc(&mut self, line: &str) -> Result<()> {
        let fix = parse_location(line)?;
        debug!(%fix, "received location");
        self.last_location = Some(fix);
        self.events.emit(ModemEvent::LocationReceived);

        Ok(())
    }

    fn enable_gnss(&mut self) -> Result<()> {
        if self.gnss_enabled {
            return Ok(());
        }

        let timeout = self.config.timeouts.command;
        for gpio in GNSS_GPIO_CONFIG {
            if !self.transport.send("+UGPIOC", Some(gpio), timeout).is_ok() {
                error!(gpio, "failed to enable GNSS module");
                return Err(ModemError::HardwareEnableFailed);
            }
        }
        self.gnss_enabled = true;
        info!("GNSS module enabled");

        Ok(())
    }

    fn await_fix(&mut self, cancel: &CancellationToken) -> LocationStatus {
        let deadline = Instant::now() + self.config.location.wait_timeout;

        loop {
            // A report that arrived during the last poll wins over everything else.
            if self.last_location.is_some() {
                return LocationStatus::Received;
            }
            if cancel.is_cancelled() {
                return LocationStatus::Cancelled;
            }
            if Instant::now() >= deadline {
                return LocationStatus::TimedOut;
            }
            if !self.transport.is_context_active() {
                return LocationStatus::ContextDropped;
            }

            let Some(line) = self.transport.poll_urc() else {
                continue;
            };
            if let Err(err) = self.dispatch_urc(&line) {
                warn!(%err, "ignoring malformed URC while waiting for location");
            }
        }
    }

    fn outcome(&self, status: LocationStatus) -> LocationOutcome {
        LocationOutcome {
            fix: self.last_location.clone(),
            status,
        }
    }
}
