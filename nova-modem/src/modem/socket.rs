use super::NovaModem;
use crate::error::{ModemError, Result};
use crate::event::EventSink;
use crate::parser::parse_socket_id;
use crate::transport::{ModemTransport, SocketId};
use tracing::{error, info};

/// `+USOCR` protocol number for TCP.
const TCP: &str = "6";

impl<T: ModemTransport, S: EventSink> NovaModem<T, S> {
    /// Socket used when no explicit id is given.
    pub fn socket_id(&self) -> SocketId {
        self.socket_id
    }

    pub fn set_socket_id(&mut self, socket_id: SocketId) {
        self.socket_id = socket_id;
    }

    /// Allocates a TCP socket on the modem and makes it the default socket.
    pub fn create_socket(&mut self) -> Result<SocketId> {
        let response = self.set("+USOCR", Some(TCP))?;
        let socket_id = parse_socket_id(&response)?;
        self.socket_id = socket_id;
        info!(%socket_id, "created socket");

        Ok(socket_id)
    }

    /// Connects the default socket. Uses the long connect timeout since link
    /// establishment happens as part of `+USOCO`.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let socket_id = self.socket_id;
        let param = format!("{socket_id},\"{host}\",{port}");
        let timeout = self.config.timeouts.connect;

        let result = self.transport.send("+USOCO", Some(param.as_str()), timeout);
        if !result.is_ok() {
            error!(%socket_id, host, port, "failed to connect socket");
            return Err(ModemError::Connect {
                socket_id,
                host: host.to_owned(),
                port,
            });
        }
        info!(%socket_id, host, port, "connect socket is successful");

        Ok(())
    }

    /// Closes `socket_id`, or the default socket. Failures are only logged so that
    /// callers can always continue with their cleanup.
    pub fn close(&mut self, socket_id: Option<SocketId>) {
        let socket_id = socket_id.unwrap_or(self.socket_id);
        let param = socket_id.to_string();
        let timeout = self.config.timeouts.close;

        let result = self.transport.send("+USOCL", Some(param.as_str()), timeout);
        if !result.is_ok() {
            error!(%socket_id, response = %result.response, "failed to close socket");
        }
    }

    /// Creates a socket, connects it and hands it to `f`. The socket is closed on
    /// every path once it exists, including when the connect is rejected.
    pub fn with_connected_socket<R>(
        &mut self,
        host: &str,
        port: u16,
        f: impl FnOnce(&mut Self, SocketId) -> R,
    ) -> Result<R> {
        let socket_id = self.create_socket()?;
        let outcome = self.connect(host, port).map(|()| f(self, socket_id));
        self.close(Some(socket_id));

        outcome
    }
}
