//! Reference voltage and converter ranges.

use crate::registers::INTERNAL_REFERENCE_VOLTS;

/// Reference voltage and the range settings derived from it.
///
/// The ADC input range and DAC output range are each either 0 to Vref or
/// 0 to 2 x Vref. The maximum of a range only exists once a positive
/// reference voltage is known.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReferenceState {
    volts: Option<f32>,
    internal: bool,
    adc_double: bool,
    dac_double: bool,
}

impl ReferenceState {
    /// Creates a state with no reference and both ranges at 1 x Vref, as
    /// the chip powers up.
    pub const fn new() -> Self {
        Self {
            volts: None,
            internal: false,
            adc_double: false,
            dac_double: false,
        }
    }

    /// Returns the reference voltage, if one is defined.
    pub fn volts(&self) -> Option<f32> {
        self.volts
    }

    /// Returns whether the voltage in use comes from the internal 2.5 V
    /// reference rather than from [`Ad5593r::set_reference_voltage`].
    ///
    /// [`Ad5593r::set_reference_voltage`]: crate::Ad5593r::set_reference_voltage
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Returns whether the ADC range is 0 to 2 x Vref.
    pub fn adc_double(&self) -> bool {
        self.adc_double
    }

    /// Returns whether the DAC range is 0 to 2 x Vref.
    pub fn dac_double(&self) -> bool {
        self.dac_double
    }

    /// Full-scale ADC input voltage.
    pub fn adc_max(&self) -> Option<f32> {
        self.volts.map(|volts| scaled(volts, self.adc_double))
    }

    /// Full-scale DAC output voltage.
    pub fn dac_max(&self) -> Option<f32> {
        self.volts.map(|volts| scaled(volts, self.dac_double))
    }

    /// Switches to the internal reference.
    pub(crate) fn use_internal(&mut self) {
        self.volts = Some(INTERNAL_REFERENCE_VOLTS);
        self.internal = true;
    }

    /// Switches to an external reference of `volts`. Anything but a finite,
    /// positive value leaves the reference undefined.
    pub(crate) fn use_external(&mut self, volts: f32) {
        self.volts = Some(volts).filter(|v| v.is_finite() && *v > 0.0);
        self.internal = false;
    }

    pub(crate) fn clear(&mut self) {
        self.volts = None;
        self.internal = false;
    }

    pub(crate) fn set_adc_double(&mut self, double: bool) {
        self.adc_double = double;
    }

    pub(crate) fn set_dac_double(&mut self, double: bool) {
        self.dac_double = double;
    }
}

fn scaled(volts: f32, double: bool) -> f32 {
    if double {
        2.0 * volts
    } else {
        volts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maxima_follow_reference_and_range() {
        let mut reference = ReferenceState::new();
        assert_eq!(reference.adc_max(), None);

        reference.set_adc_double(true);
        reference.use_external(1.0);
        assert_eq!(reference.adc_max(), Some(2.0));
        assert_eq!(reference.dac_max(), Some(1.0));

        reference.set_dac_double(true);
        assert_eq!(reference.dac_max(), Some(2.0));
    }

    #[test]
    fn invalid_reference_is_undefined() {
        let mut reference = ReferenceState::new();
        for volts in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            reference.use_external(volts);
            assert_eq!(reference.volts(), None);
            assert_eq!(reference.dac_max(), None);
        }
    }

    #[test]
    fn source_is_tracked_apart_from_voltage() {
        let mut reference = ReferenceState::new();
        reference.use_external(INTERNAL_REFERENCE_VOLTS);
        assert!(!reference.is_internal());

        reference.use_internal();
        assert!(reference.is_internal());
        assert_eq!(reference.volts(), Some(INTERNAL_REFERENCE_VOLTS));

        reference.clear();
        assert!(!reference.is_internal());
        assert_eq!(reference.adc_max(), None);
    }
}
