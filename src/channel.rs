//! Channels, their roles and the values last seen on them.

use core::fmt;

use crate::registers;

/// One of the eight I/O pins of the chip.
///
/// A `Channel` always holds an index below [`Channel::COUNT`], so it can be
/// used to index per-channel arrays and build bit masks without further
/// checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(u8);

impl Channel {
    /// Number of channels on the chip.
    pub const COUNT: usize = 8;

    pub const CH0: Self = Self(0);
    pub const CH1: Self = Self(1);
    pub const CH2: Self = Self(2);
    pub const CH3: Self = Self(3);
    pub const CH4: Self = Self(4);
    pub const CH5: Self = Self(5);
    pub const CH6: Self = Self(6);
    pub const CH7: Self = Self(7);

    /// Returns the channel with the given index, or `None` if it is out of
    /// range.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Returns the channel index, `0..=7`.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns this channel's bit in a channel mask register.
    pub const fn mask(self) -> u8 {
        1 << self.0
    }

    /// Returns every channel in ascending order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (0..Self::COUNT as u8).map(Channel)
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::new(index).ok_or(InvalidChannel(index))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {}", self.0)
    }
}

/// A channel index outside `0..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannel(pub u8);

impl fmt::Display for InvalidChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no channel {} on the AD5593R", self.0)
    }
}

/// Function a channel can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Analog input.
    Adc,
    /// Analog output.
    Dac,
    /// Digital input.
    GeneralInput,
    /// Digital output.
    GeneralOutput,
}

impl Role {
    /// Pin-configuration register holding the channel mask for this role.
    pub const fn config_register(self) -> u8 {
        match self {
            Role::Adc => registers::ADC_CONFIG,
            Role::Dac => registers::DAC_CONFIG,
            Role::GeneralInput => registers::GPIO_READ_CONFIG,
            Role::GeneralOutput => registers::GPIO_WRITE_CONFIG,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Adc => "ADC",
            Role::Dac => "DAC",
            Role::GeneralInput => "GPI",
            Role::GeneralOutput => "GPO",
        })
    }
}

/// Roles assigned to every channel, one channel mask per role.
///
/// Each mask mirrors the matching pin-configuration register on the chip.
/// Roles are not exclusive: assigning a second role to a channel leaves the
/// first one in place.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RoleSet {
    adc: u8,
    dac: u8,
    gpi: u8,
    gpo: u8,
}

impl RoleSet {
    /// Creates a set with no roles assigned, matching the chip at power-up.
    pub const fn new() -> Self {
        Self {
            adc: 0,
            dac: 0,
            gpi: 0,
            gpo: 0,
        }
    }

    /// Returns the channel mask of `role`.
    pub const fn mask(&self, role: Role) -> u8 {
        match role {
            Role::Adc => self.adc,
            Role::Dac => self.dac,
            Role::GeneralInput => self.gpi,
            Role::GeneralOutput => self.gpo,
        }
    }

    /// Returns whether `channel` has been assigned `role`.
    pub const fn has(&self, channel: Channel, role: Role) -> bool {
        self.mask(role) & channel.mask() != 0
    }

    /// Returns the channels assigned `role`, in ascending order.
    pub fn channels(&self, role: Role) -> impl Iterator<Item = Channel> {
        let mask = self.mask(role);
        Channel::all().filter(move |channel| mask & channel.mask() != 0)
    }

    pub(crate) fn insert(&mut self, channel: Channel, role: Role) {
        let mask = match role {
            Role::Adc => &mut self.adc,
            Role::Dac => &mut self.dac,
            Role::GeneralInput => &mut self.gpi,
            Role::GeneralOutput => &mut self.gpo,
        };
        *mask |= channel.mask();
    }
}

/// Last value written to or read from every channel, per role.
///
/// `None` means no value has been seen since the driver was created.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelValues {
    /// Volts last read on each ADC channel.
    pub adc: [Option<f32>; Channel::COUNT],
    /// Volts last written to each DAC channel.
    pub dac: [Option<f32>; Channel::COUNT],
    /// Level last read on each general-purpose input.
    pub gpi: [Option<bool>; Channel::COUNT],
    /// Level last written to each general-purpose output.
    pub gpo: [Option<bool>; Channel::COUNT],
}

/// Whole-chip role assignment, one flag per channel and role.
///
/// Each array is indexed by channel: `adcs: [true, true, false, ..]` makes
/// channels 0 and 1 analog inputs. A channel should be flagged for one role
/// at most.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub adcs: [bool; Channel::COUNT],
    pub dacs: [bool; Channel::COUNT],
    pub gpis: [bool; Channel::COUNT],
    pub gpos: [bool; Channel::COUNT],
}
