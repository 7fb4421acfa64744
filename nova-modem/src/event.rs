use crate::transport::SocketId;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemEvent {
    LocationReceived,
    SocketClosed(SocketId),
    ContextDeactivated,
}

impl ModemEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ModemEvent::LocationReceived => "location.received",
            ModemEvent::SocketClosed(_) => "socket.closed",
            ModemEvent::ContextDeactivated => "network.disconnected",
        }
    }
}

/// Fire-and-forget notifications out of the driver. Every driver gets its own sink.
pub trait EventSink {
    fn emit(&self, event: ModemEvent);
}

impl EventSink for flume::Sender<ModemEvent> {
    fn emit(&self, event: ModemEvent) {
        let name = event.name();
        if self.send(event).is_err() {
            warn!(event = name, "event receiver dropped, discarding event");
        }
    }
}

/// Sink for callers that only want the events in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: ModemEvent) {
        info!(event = event.name(), ?event, "modem event");
    }
}
