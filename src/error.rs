//! Errors reported by the driver.

use core::fmt;

use crate::channel::{Channel, Role};

/// Errors returned by [`Ad5593r`](crate::Ad5593r) operations.
///
/// `E` is the bus error type and `P` the error type of the address-select
/// pin. Validation errors are raised before any bus or pin activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E, P> {
    /// The channel has not been configured for the role the operation needs.
    NotConfiguredForRole { channel: Channel, role: Role },
    /// No reference voltage has been set, so the converter range is unknown.
    ReferenceUndefined,
    /// The requested voltage lies outside the converter range.
    ValueOutOfRange,
    /// The bus transaction failed.
    Transport(E),
    /// The address-select pin could not be driven.
    AddressSelect(P),
}

impl<E: fmt::Debug, P: fmt::Debug> fmt::Display for Error<E, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotConfiguredForRole { channel, role } => {
                write!(f, "{} is not configured as {}", channel, role)
            }
            Error::ReferenceUndefined => f.write_str("reference voltage is not defined"),
            Error::ValueOutOfRange => f.write_str("voltage outside the converter range"),
            Error::Transport(e) => write!(f, "bus transaction failed: {:?}", e),
            Error::AddressSelect(e) => write!(f, "address select failed: {:?}", e),
        }
    }
}
