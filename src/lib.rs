#![cfg_attr(not(test), no_std)]

//! A driver for the AD5593R 8-channel configurable ADC/DAC/GPIO chip.
//!
//! The chip sits on a two-wire bus and every operation is a short, fixed
//! format register transaction. [`Ad5593r`] keeps a client-side copy of the
//! chip's configuration registers and of the last value seen on every
//! channel, so requests that cannot succeed are rejected before the bus is
//! touched.
//!
//! The driver talks to any [`embedded_hal::i2c::I2c`] implementation. For
//! platforms that only expose raw start/header/data/stop primitives, implement
//! [`I2CBus`] and wrap it in a [`FramedBus`].
//!
//! ```
//! # use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
//! use ad5593r::{Ad5593r, Channel};
//!
//! # let i2c = Mock::new(&[
//! #     Transaction::write(0x10, vec![0x0B, 0x02, 0x00]),
//! #     Transaction::write(0x10, vec![0x05, 0x00, 0x01]),
//! #     Transaction::write(0x10, vec![0x10, 0x8F, 0xFF]),
//! # ]);
//! let mut adac = Ad5593r::new(i2c);
//! adac.enable_internal_reference().unwrap();
//! adac.configure_output(Channel::CH0).unwrap();
//! adac.write_output(Channel::CH0, 2.5).unwrap();
//! # let (mut i2c, _) = adac.release();
//! # i2c.done();
//! ```
//!
//! Enable the `defmt` feature to get a diagnostic line for every operation.

/// Emits a `defmt` diagnostic line when the `defmt` feature is enabled.
macro_rules! diag {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "defmt")]
        defmt::$level!($($arg)+);
    };
}

pub mod channel;
pub mod driver;
pub mod error;
pub mod framed;
pub mod reference;
pub mod registers;

pub use channel::{Channel, ChannelConfig, ChannelValues, InvalidChannel, Role, RoleSet};
pub use driver::{Ad5593r, Config, NoSelect};
pub use error::Error;
pub use framed::{FramedBus, FramingError};
pub use reference::ReferenceState;

/// Represents data direction used for the R/W bit in the I2C header.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Read,
    Write,
}

/// Represents a low-level I2C bus that exposes the individual framing
/// primitives of a transaction.
///
/// [`FramedBus`] turns any implementor into an [`embedded_hal::i2c::I2c`].
pub trait I2CBus {
    /// An error type shared by every framing primitive.
    type Error: core::fmt::Debug;

    /// Initializes the [`I2CBus`]
    ///
    /// [`I2CBus`]: Self
    fn init(&self);

    /// Creates an I2C start (or repeated start) condition on the bus.
    fn start_condition(&self) -> Result<(), Self::Error>;

    /// Creates an I2C stop condition on the bus.
    fn stop_condition(&self) -> Result<(), Self::Error>;

    /// Sends an I2C header to the bus.
    ///
    /// Fails if no slave acknowledged `address`.
    fn send_header(&self, address: u8, direction: Direction) -> Result<(), Self::Error>;

    /// Sends data to an I2C slave.
    fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads data from an I2C slave.
    ///
    /// Every byte is acknowledged except the final one when `nack_last` is
    /// set, which tells the slave the read is over.
    fn read(&self, data: &mut [u8], nack_last: bool) -> Result<(), Self::Error>;
}
