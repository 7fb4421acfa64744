use crate::parser::LOCATION_URC_PREFIX;
use crate::transport::SocketId;

const SOCKET_CLOSED_PREFIX: &str = "+UUSOCL:";
const CONTEXT_DEACTIVATED_PREFIX: &str = "+UUPSDD:";
const REGISTRATION_PREFIX: &str = "+CEREG:";

/// Prefixes of lines the modem may emit on its own at any time.
const UNSOLICITED_PREFIXES: &[&str] = &[
    LOCATION_URC_PREFIX,
    SOCKET_CLOSED_PREFIX,
    CONTEXT_DEACTIVATED_PREFIX,
    "+UUSORD:",
    "+UUSORF:",
    REGISTRATION_PREFIX,
    "+CMTI:",
    "RING",
];

/// An unsolicited result code, routed by prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Urc {
    /// `+UULOC` payload with the prefix stripped.
    Location(String),
    SocketClosed(SocketId),
    ContextDeactivated,
    Other(String),
}

pub fn is_unsolicited(line: &str) -> bool {
    if line.starts_with(REGISTRATION_PREFIX) {
        return is_registration_urc(line);
    }

    UNSOLICITED_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// `+CEREG:` is both the answer to `+CEREG?` (`<n>,<stat>[,...]`) and a URC
/// (`<stat>[,"<tac>","<ci>",<act>]`). Only the URC lacks a bare second number.
pub fn is_registration_urc(line: &str) -> bool {
    let Some(rest) = line.trim().strip_prefix(REGISTRATION_PREFIX) else {
        return false;
    };

    match rest.split(',').nth(1) {
        None => true,
        Some(second) => second.trim().starts_with('"'),
    }
}

pub fn classify(line: &str) -> Urc {
    let line = line.trim();

    if let Some(payload) = line.strip_prefix(LOCATION_URC_PREFIX) {
        return Urc::Location(payload.trim().to_owned());
    }

    if let Some(id) = line
        .strip_prefix(SOCKET_CLOSED_PREFIX)
        .and_then(|id| id.trim().parse().ok())
    {
        return Urc::SocketClosed(SocketId(id));
    }

    if line.starts_with(CONTEXT_DEACTIVATED_PREFIX) {
        return Urc::ContextDeactivated;
    }

    Urc::Other(line.to_owned())
}
