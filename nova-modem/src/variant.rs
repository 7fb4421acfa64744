use derive_more::Display;
use serde::Serialize;

/// Identity marker reported by the older hardware revision.
pub const R404_MARKER: &str = "R404";

/// Hardware revision of the modem, fixed once the driver is constructed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModemVariant {
    R404,
    R410,
}

/// Derives the variant from the `ATI` identity string. Anything that does not carry
/// the R404 marker is treated as the newer R410.
pub fn classify(identity: &str) -> ModemVariant {
    if identity.contains(R404_MARKER) {
        ModemVariant::R404
    } else {
        ModemVariant::R410
    }
}
