use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Final result code of an AT command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Ok,
    Error,
}

/// What every [`ModemTransport::send`] call returns: the final result code plus
/// whatever payload lines the modem printed before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub code: ResultCode,
    pub response: String,
}

impl CommandResult {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Ok,
            response: response.into(),
        }
    }

    pub fn error(response: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Error,
            response: response.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::Ok
    }
}

/// Socket slot on the modem, as handed out by `+USOCR`.
#[derive(
    Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct SocketId(pub u8);

/// The command/response channel the driver talks through.
///
/// Implementations enforce the per-command timeout themselves and fold transport
/// failures into [`ResultCode::Error`], so the driver only ever branches on the
/// result code.
pub trait ModemTransport {
    /// Sends `AT<command>[=<param>]` and waits for the final result code.
    fn send(
        &mut self,
        command: &str,
        param: Option<&str>,
        timeout: Duration,
    ) -> CommandResult;

    /// Sends a bare query such as `I` or `+COPS?` and returns its payload.
    fn query(&mut self, command: &str) -> String;

    /// Blocks for at most the transport read timeout and returns one unsolicited
    /// line, if any arrived.
    fn poll_urc(&mut self) -> Option<String>;

    fn is_context_active(&mut self) -> bool;

    /// Brings up the packet data context unless it is already active.
    fn ensure_context_active(&mut self) -> bool;
}

impl<T: ModemTransport + ?Sized> ModemTransport for Box<T> {
    fn send(
        &mut self,
        command: &str,
        param: Option<&str>,
        timeout: Duration,
    ) -> CommandResult {
        (**self).send(command, param, timeout)
    }

    fn query(&mut self, command: &str) -> String {
        (**self).query(command)
    }

    fn poll_urc(&mut self) -> Option<String> {
        (**self).poll_urc()
    }

    fn is_context_active(&mut self) -> bool {
        (**self).is_context_active()
    }

    fn ensure_context_active(&mut self) -> bool {
        (**self).ensure_context_active()
    }
}

/// Renders the command line without the trailing `\r`.
pub fn format_command(command: &str, param: Option<&str>) -> String {
    match param {
        Some(param) => format!("AT{command}={param}"),
        None => format!("AT{command}"),
    }
}
