//! AD5593R register map and byte-level framing.
//!
//! Every write to the chip starts with a pointer byte. Values below `0x10`
//! select a configuration register, which is then followed by a 16-bit big
//! endian payload. The other pointer bytes select a DAC input register or a
//! readback source.

use crate::channel::Channel;

/// Default 7-bit bus address, with the A0 pin pulled low.
pub const DEFAULT_ADDRESS: u8 = 0x10;

/// Full-scale code of the 12-bit converters.
pub const FULL_SCALE: u16 = 0x0FFF;

/// Voltage of the on-chip reference.
pub const INTERNAL_REFERENCE_VOLTS: f32 = 2.5;

// Configuration registers. The full map is listed; the driver only writes
// the sequence, control, pin-configuration and GPIO data registers.
pub const NOP: u8 = 0x00;
pub const ADC_SEQUENCE: u8 = 0x02; // Selects channels for conversion
pub const GP_CONTROL: u8 = 0x03; // ADC and DAC range control
pub const ADC_CONFIG: u8 = 0x04; // Pins acting as ADC inputs
pub const DAC_CONFIG: u8 = 0x05; // Pins acting as DAC outputs
pub const PULL_DOWN_CONFIG: u8 = 0x06;
pub const LDAC_MODE: u8 = 0x07;
pub const GPIO_WRITE_CONFIG: u8 = 0x08; // Pins acting as general-purpose outputs
pub const GPIO_WRITE_DATA: u8 = 0x09;
pub const GPIO_READ_CONFIG: u8 = 0x0A; // Pins acting as general-purpose inputs
pub const POWER_REF_CONTROL: u8 = 0x0B;
pub const OPEN_DRAIN_CONFIG: u8 = 0x0C;
pub const THREE_STATE_CONFIG: u8 = 0x0D;
pub const SOFT_RESET: u8 = 0x0F;

// Pointer bytes
pub const DAC_WRITE: u8 = 0x10; // | channel
pub const ADC_READBACK: u8 = 0x40;
pub const DAC_READBACK: u8 = 0x50; // | channel
pub const GPIO_READBACK: u8 = 0x60;
pub const REGISTER_READBACK: u8 = 0x70; // | register

/// `EN_REF` bit of the power-down/reference control register.
pub const ENABLE_REFERENCE: u16 = 1 << 9;

/// ADC range bit of the general-purpose control register, set for 2 x Vref.
pub const ADC_RANGE_DOUBLE: u16 = 1 << 5;

/// DAC range bit of the general-purpose control register, set for 2 x Vref.
pub const DAC_RANGE_DOUBLE: u16 = 1 << 4;

/// `REP` bit of the ADC sequence register.
pub const SEQUENCE_REPEAT: u8 = 0x02;

/// Tag bit set in the high byte of every DAC data word.
pub const DAC_DATA_TAG: u8 = 0x80;

/// Client-side copy of a 16-bit control register.
///
/// The chip has no single-bit update command, so a mutation always rewrites
/// the whole register. Keeping the last written word here lets one bit change
/// without a read-modify-write on the bus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRegister(u16);

impl ControlRegister {
    /// Creates a register holding the chip's power-on value of zero.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Returns the raw register word.
    pub const fn word(self) -> u16 {
        self.0
    }

    /// Returns whether every bit of `bits` is set.
    pub const fn is_set(self, bits: u16) -> bool {
        self.0 & bits == bits
    }

    /// Returns a copy with `bits` set or cleared.
    pub const fn with(self, bits: u16, on: bool) -> Self {
        if on {
            Self(self.0 | bits)
        } else {
            Self(self.0 & !bits)
        }
    }

    /// Builds the write transaction for this register at `pointer`.
    pub const fn frame(self, pointer: u8) -> [u8; 3] {
        [pointer, (self.0 >> 8) as u8, self.0 as u8]
    }
}

/// Builds a write to a pin-configuration or GPIO data register, whose payload
/// is a single channel mask in the low byte.
pub const fn mask_frame(pointer: u8, mask: u8) -> [u8; 3] {
    [pointer, 0x00, mask]
}

/// Builds the DAC input register write for `channel`.
pub const fn dac_frame(channel: Channel, code: u16) -> [u8; 3] {
    let index = channel.index();
    [
        DAC_WRITE | index,
        DAC_DATA_TAG | (index << 4) | ((code >> 8) as u8 & 0x0F),
        code as u8,
    ]
}

/// Builds the ADC sequence register write selecting `channel` alone.
pub const fn sequence_frame(channel: Channel) -> [u8; 3] {
    [ADC_SEQUENCE, SEQUENCE_REPEAT, channel.mask()]
}

/// Rebuilds the 12-bit data word of a two byte readback.
///
/// The upper nibble of the first byte carries a channel tag and is dropped.
pub const fn decode_word(bytes: [u8; 2]) -> u16 {
    ((bytes[0] as u16 & 0x0F) << 8) | bytes[1] as u16
}

/// Converts `volts` to a converter code for a full scale of `max`,
/// truncating towards zero.
///
/// `volts` must already lie within `0.0..=max`.
pub fn quantize(volts: f32, max: f32) -> u16 {
    let code = (volts / max * FULL_SCALE as f32) as u16;
    code.min(FULL_SCALE)
}

/// Converts a converter code back to volts for a full scale of `max`.
pub fn to_volts(code: u16, max: f32) -> f32 {
    max * code as f32 / FULL_SCALE as f32
}
