//! The AD5593R register adapter.

use core::convert::Infallible;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::i2c::{self, I2c};

use crate::channel::{Channel, ChannelConfig, ChannelValues, Role, RoleSet};
use crate::error::Error;
use crate::reference::ReferenceState;
use crate::registers::{self, ControlRegister};

type OpResult<T, I2C, A0> =
    Result<T, Error<<I2C as i2c::ErrorType>::Error, <A0 as digital::ErrorType>::Error>>;

/// Stand-in for the address-select pin when only one AD5593R is on the bus.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSelect;

impl digital::ErrorType for NoSelect {
    type Error = Infallible;
}

impl OutputPin for NoSelect {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Bus settings of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit address the device answers on while selected.
    pub address: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: registers::DEFAULT_ADDRESS,
        }
    }
}

/// AD5593R driver.
///
/// Owns the bus handle and, when several devices share the bus, the A0 pin
/// used to select this one. A0 is driven low for the duration of each
/// operation's bus traffic and high otherwise, so deselected devices answer
/// on the neighbouring address.
///
/// The driver mirrors the chip's configuration registers, the channel roles,
/// the reference state and the last value seen on every channel. Requests
/// that the cached state shows to be invalid fail before any bus activity.
#[derive(Debug)]
pub struct Ad5593r<I2C, A0 = NoSelect> {
    i2c: I2C,
    a0: Option<A0>,
    address: u8,
    roles: RoleSet,
    values: ChannelValues,
    reference: ReferenceState,
    gp_control: ControlRegister,
    power_ref: ControlRegister,
}

impl<I2C> Ad5593r<I2C, NoSelect>
where
    I2C: I2c,
{
    /// Creates a driver for the only AD5593R on the bus.
    pub fn new(i2c: I2C) -> Self {
        Self::build(i2c, None, Config::default())
    }
}

impl<I2C, A0> Ad5593r<I2C, A0>
where
    I2C: I2c,
    A0: OutputPin,
{
    /// Creates a driver for a device selected through its A0 pin.
    ///
    /// The pin is driven high straight away, leaving the device deselected
    /// until the first operation.
    pub fn with_address_select(i2c: I2C, a0: A0) -> OpResult<Self, I2C, A0> {
        Self::with_config(i2c, Some(a0), Config::default())
    }

    /// Creates a driver with explicit bus settings.
    pub fn with_config(i2c: I2C, a0: Option<A0>, config: Config) -> OpResult<Self, I2C, A0> {
        let mut adac = Self::build(i2c, a0, config);
        if let Some(pin) = adac.a0.as_mut() {
            pin.set_high().map_err(Error::AddressSelect)?;
        }
        Ok(adac)
    }

    fn build(i2c: I2C, a0: Option<A0>, config: Config) -> Self {
        Self {
            i2c,
            a0,
            address: config.address,
            roles: RoleSet::new(),
            values: ChannelValues::default(),
            reference: ReferenceState::new(),
            gp_control: ControlRegister::new(),
            power_ref: ControlRegister::new(),
        }
    }

    /// Destroys the driver, returning the bus and the A0 pin.
    pub fn release(self) -> (I2C, Option<A0>) {
        (self.i2c, self.a0)
    }

    /// 7-bit bus address the device is addressed on while selected.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Roles assigned so far.
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Values last written to or read from every channel.
    pub fn values(&self) -> &ChannelValues {
        &self.values
    }

    /// Reference voltage, its source and the range settings.
    pub fn reference(&self) -> &ReferenceState {
        &self.reference
    }

    /// Returns whether the chip's `EN_REF` bit was last written as set.
    ///
    /// This can differ from [`ReferenceState::is_internal`]: recording an
    /// external reference voltage does not touch the chip.
    pub fn internal_reference_enabled(&self) -> bool {
        self.power_ref.is_set(registers::ENABLE_REFERENCE)
    }

    /// Full-scale ADC input voltage, once a reference is defined.
    pub fn adc_max(&self) -> Option<f32> {
        self.reference.adc_max()
    }

    /// Full-scale DAC output voltage, once a reference is defined.
    pub fn dac_max(&self) -> Option<f32> {
        self.reference.dac_max()
    }

    /// Switches on the internal 2.5 V reference.
    pub fn enable_internal_reference(&mut self) -> OpResult<(), I2C, A0> {
        self.write_power_ref(true)?;
        self.reference.use_internal();
        diag!(debug, "internal reference on");
        Ok(())
    }

    /// Switches off the internal reference. ADC reads and DAC writes fail
    /// until [`set_reference_voltage`](Self::set_reference_voltage) is
    /// called.
    pub fn disable_internal_reference(&mut self) -> OpResult<(), I2C, A0> {
        self.write_power_ref(false)?;
        self.reference.clear();
        diag!(debug, "internal reference off");
        Ok(())
    }

    fn write_power_ref(&mut self, enable: bool) -> OpResult<(), I2C, A0> {
        let register = self.power_ref.with(registers::ENABLE_REFERENCE, enable);
        self.write(&register.frame(registers::POWER_REF_CONTROL))?;
        self.power_ref = register;
        Ok(())
    }

    /// Sets the ADC input range to 0..2 x Vref when `double` is set, and to
    /// 0..Vref otherwise.
    pub fn set_adc_range_double(&mut self, double: bool) -> OpResult<(), I2C, A0> {
        self.write_gp_control(registers::ADC_RANGE_DOUBLE, double)?;
        self.reference.set_adc_double(double);
        diag!(debug, "ADC range doubled: {}", double);
        Ok(())
    }

    /// Sets the DAC output range to 0..2 x Vref when `double` is set, and to
    /// 0..Vref otherwise.
    pub fn set_dac_range_double(&mut self, double: bool) -> OpResult<(), I2C, A0> {
        self.write_gp_control(registers::DAC_RANGE_DOUBLE, double)?;
        self.reference.set_dac_double(double);
        diag!(debug, "DAC range doubled: {}", double);
        Ok(())
    }

    fn write_gp_control(&mut self, bits: u16, on: bool) -> OpResult<(), I2C, A0> {
        let register = self.gp_control.with(bits, on);
        self.write(&register.frame(registers::GP_CONTROL))?;
        self.gp_control = register;
        Ok(())
    }

    /// Records the voltage of an externally supplied reference.
    ///
    /// Only the driver's range bookkeeping changes, the chip is not
    /// contacted. A non-positive voltage leaves the reference undefined.
    pub fn set_reference_voltage(&mut self, volts: f32) {
        self.reference.use_external(volts);
        diag!(debug, "reference set to {} V", volts);
    }

    /// Makes `channel` an analog output.
    pub fn configure_output(&mut self, channel: Channel) -> OpResult<(), I2C, A0> {
        self.assign(channel, Role::Dac)
    }

    /// Makes every flagged channel an analog output.
    pub fn configure_outputs(&mut self, channels: &[bool; Channel::COUNT]) -> OpResult<(), I2C, A0> {
        self.assign_all(channels, Role::Dac)
    }

    /// Makes `channel` an analog input.
    pub fn configure_input(&mut self, channel: Channel) -> OpResult<(), I2C, A0> {
        self.assign(channel, Role::Adc)
    }

    /// Makes every flagged channel an analog input.
    pub fn configure_inputs(&mut self, channels: &[bool; Channel::COUNT]) -> OpResult<(), I2C, A0> {
        self.assign_all(channels, Role::Adc)
    }

    /// Makes `channel` a general-purpose digital input.
    pub fn configure_general_input(&mut self, channel: Channel) -> OpResult<(), I2C, A0> {
        self.assign(channel, Role::GeneralInput)
    }

    /// Makes every flagged channel a general-purpose digital input.
    pub fn configure_general_inputs(
        &mut self,
        channels: &[bool; Channel::COUNT],
    ) -> OpResult<(), I2C, A0> {
        self.assign_all(channels, Role::GeneralInput)
    }

    /// Makes `channel` a general-purpose digital output.
    pub fn configure_general_output(&mut self, channel: Channel) -> OpResult<(), I2C, A0> {
        self.assign(channel, Role::GeneralOutput)
    }

    /// Makes every flagged channel a general-purpose digital output.
    pub fn configure_general_outputs(
        &mut self,
        channels: &[bool; Channel::COUNT],
    ) -> OpResult<(), I2C, A0> {
        self.assign_all(channels, Role::GeneralOutput)
    }

    /// Applies a whole-chip role assignment: ADCs, then DACs, then
    /// general-purpose inputs and outputs.
    ///
    /// Conflicting assignments are not detected; a channel flagged for two
    /// roles ends up configured for both.
    pub fn configure(&mut self, config: &ChannelConfig) -> OpResult<(), I2C, A0> {
        self.configure_inputs(&config.adcs)?;
        self.configure_outputs(&config.dacs)?;
        self.configure_general_inputs(&config.gpis)?;
        self.configure_general_outputs(&config.gpos)
    }

    fn assign(&mut self, channel: Channel, role: Role) -> OpResult<(), I2C, A0> {
        let mask = self.roles.mask(role) | channel.mask();
        self.write(&registers::mask_frame(role.config_register(), mask))?;
        self.roles.insert(channel, role);
        diag!(debug, "channel {} configured as {}", channel.index(), role);
        Ok(())
    }

    fn assign_all(&mut self, channels: &[bool; Channel::COUNT], role: Role) -> OpResult<(), I2C, A0> {
        for (channel, _) in Channel::all().zip(channels).filter(|(_, flagged)| **flagged) {
            self.assign(channel, role)?;
        }
        Ok(())
    }

    /// Drives DAC `channel` to `volts`.
    ///
    /// The voltage is converted to a 12-bit code, truncating towards zero.
    /// Fails without bus activity if the channel is not a DAC, if no
    /// reference is defined, or if `volts` lies outside `0..=dac_max`.
    pub fn write_output(&mut self, channel: Channel, volts: f32) -> OpResult<(), I2C, A0> {
        self.require(channel, Role::Dac)?;
        let max = self.defined(self.reference.dac_max())?;
        if !(0.0..=max).contains(&volts) {
            diag!(warn, "{} V is outside the DAC range of {} V", volts, max);
            return Err(Error::ValueOutOfRange);
        }

        let code = registers::quantize(volts, max);
        self.write(&registers::dac_frame(channel, code))?;
        self.values.dac[channel.slot()] = Some(volts);
        diag!(debug, "channel {} set to {} V", channel.index(), volts);
        Ok(())
    }

    /// Drives every DAC channel to its entry in `volts`, in ascending channel
    /// order. Entries for other channels are ignored.
    ///
    /// Stops at the first channel that fails.
    pub fn write_all_outputs(&mut self, volts: &[f32; Channel::COUNT]) -> OpResult<(), I2C, A0> {
        for channel in self.roles.channels(Role::Dac) {
            self.write_output(channel, volts[channel.slot()])?;
        }
        Ok(())
    }

    /// Reads back the value held by DAC `channel`.
    pub fn read_output(&mut self, channel: Channel) -> OpResult<f32, I2C, A0> {
        self.require(channel, Role::Dac)?;
        let max = self.defined(self.reference.dac_max())?;

        let mut buffer = [0u8; 2];
        self.transact(|i2c, address| {
            i2c.write_read(address, &[registers::DAC_READBACK | channel.index()], &mut buffer)
        })?;
        let volts = registers::to_volts(registers::decode_word(buffer), max);
        self.values.dac[channel.slot()] = Some(volts);
        diag!(debug, "channel {} holds {} V", channel.index(), volts);
        Ok(volts)
    }

    /// Converts ADC `channel` once and returns its voltage.
    ///
    /// Fails without bus activity if the channel is not an ADC or if no
    /// reference is defined.
    pub fn read_input(&mut self, channel: Channel) -> OpResult<f32, I2C, A0> {
        self.require(channel, Role::Adc)?;
        let max = self.defined(self.reference.adc_max())?;

        let sequence = registers::sequence_frame(channel);
        let mut buffer = [0u8; 2];
        self.transact(|i2c, address| {
            i2c.write(address, &sequence)?;
            i2c.write_read(address, &[registers::ADC_READBACK], &mut buffer)
        })?;
        let volts = registers::to_volts(registers::decode_word(buffer), max);
        self.values.adc[channel.slot()] = Some(volts);
        diag!(debug, "channel {} reads {} V", channel.index(), volts);
        Ok(volts)
    }

    /// Reads every ADC channel in ascending order.
    ///
    /// Returns the cached ADC values of all eight channels; channels that
    /// are not ADCs keep whatever was cached before, normally `None`.
    pub fn read_all_inputs(&mut self) -> OpResult<[Option<f32>; Channel::COUNT], I2C, A0> {
        for channel in self.roles.channels(Role::Adc) {
            self.read_input(channel)?;
        }
        Ok(self.values.adc)
    }

    /// Reads the level of every general-purpose input.
    ///
    /// Returns the cached levels of all eight channels; channels that are
    /// not general-purpose inputs are left untouched.
    pub fn read_all_general_inputs(&mut self) -> OpResult<[Option<bool>; Channel::COUNT], I2C, A0> {
        let mut buffer = [0u8; 2];
        self.transact(|i2c, address| {
            i2c.write_read(address, &[registers::GPIO_READBACK], &mut buffer)
        })?;
        let word = registers::decode_word(buffer);
        for channel in self.roles.channels(Role::GeneralInput) {
            self.values.gpi[channel.slot()] = Some((word >> channel.index()) & 1 == 1);
        }
        diag!(debug, "general inputs read {=u16:#x}", word);
        Ok(self.values.gpi)
    }

    /// Drives every general-purpose output to its entry in `levels`.
    ///
    /// All outputs are written in a single transaction. Entries for channels
    /// that are not general-purpose outputs are ignored.
    pub fn write_all_general_outputs(
        &mut self,
        levels: &[bool; Channel::COUNT],
    ) -> OpResult<(), I2C, A0> {
        let bits = self
            .roles
            .channels(Role::GeneralOutput)
            .filter(|channel| levels[channel.slot()])
            .fold(0u8, |bits, channel| bits | channel.mask());
        self.write(&registers::mask_frame(registers::GPIO_WRITE_DATA, bits))?;

        for channel in self.roles.channels(Role::GeneralOutput) {
            self.values.gpo[channel.slot()] = Some(levels[channel.slot()]);
        }
        diag!(debug, "general outputs set to {=u8:#x}", bits);
        Ok(())
    }

    fn require(&self, channel: Channel, role: Role) -> OpResult<(), I2C, A0> {
        if self.roles.has(channel, role) {
            Ok(())
        } else {
            diag!(warn, "channel {} is not configured as {}", channel.index(), role);
            Err(Error::NotConfiguredForRole { channel, role })
        }
    }

    fn defined(&self, max: Option<f32>) -> OpResult<f32, I2C, A0> {
        max.ok_or_else(|| {
            diag!(warn, "reference voltage is not defined");
            Error::ReferenceUndefined
        })
    }

    fn write(&mut self, bytes: &[u8]) -> OpResult<(), I2C, A0> {
        self.transact(|i2c, address| i2c.write(address, bytes))
    }

    /// Runs `f` against the bus with this device selected.
    ///
    /// A0 is released again even when `f` fails; the bus error takes
    /// precedence over a pin error in that case.
    fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut I2C, u8) -> Result<T, I2C::Error>,
    ) -> OpResult<T, I2C, A0> {
        if let Some(pin) = self.a0.as_mut() {
            pin.set_low().map_err(Error::AddressSelect)?;
        }
        let result = f(&mut self.i2c, self.address).map_err(Error::Transport);
        let deselect = match self.a0.as_mut() {
            Some(pin) => pin.set_high().map_err(Error::AddressSelect),
            None => Ok(()),
        };
        let value = result?;
        deselect?;
        Ok(value)
    }
}
