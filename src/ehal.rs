//! Ready-made blocking [`Bts7960Hal`] implementation over `embedded-hal`
//! traits.
//!
//! [`GpioPwmHal`] wires the capability contract to any platform exposing a
//! stateful output pin (the inhibit/enable line) and a PWM channel
//! implementing [`SetDutyCycle`]. `embedded-hal` has no ADC abstraction, so
//! the IS-pin reading comes from a small [`CurrentSenseAdc`] trait the
//! platform implements itself, typically as a thin wrapper around one ADC
//! channel.

use embedded_hal::digital::StatefulOutputPin;
use embedded_hal::pwm::SetDutyCycle;
use thiserror::Error;

use crate::Bts7960Hal;

/// One settled IS-pin voltage reading per call, in millivolts.
pub trait CurrentSenseAdc {
    type Error: core::fmt::Debug;

    fn measure_millivolts(&mut self) -> Result<u32, Self::Error>;
}

/// Error of [`GpioPwmHal`], tagging which underlying peripheral failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioPwmError<PinE, PwmE, AdcE> {
    /// The enable pin write or readback failed.
    #[error("enable pin error")]
    Pin(PinE),
    /// The PWM duty-cycle write failed.
    #[error("PWM error")]
    Pwm(PwmE),
    /// The current-sense ADC read failed.
    #[error("ADC error")]
    Adc(AdcE),
}

/// Blocking BTS7960 HAL built from `embedded-hal` pin and PWM primitives
/// plus a [`CurrentSenseAdc`].
///
/// [`SetDutyCycle`] offers no readback, so the duty-cycle getter returns the
/// last percentage written through this HAL. Frequency control is not
/// available through `embedded-hal`; platforms that support it should
/// implement the capability traits directly instead of using this adapter.
pub struct GpioPwmHal<EN, PWM, ADC> {
    enable_pin: EN,
    pwm: PWM,
    adc: ADC,
    duty_percentage: u8,
}

impl<EN, PWM, ADC> GpioPwmHal<EN, PWM, ADC> {
    pub fn new(enable_pin: EN, pwm: PWM, adc: ADC) -> Self {
        Self {
            enable_pin,
            pwm,
            adc,
            duty_percentage: 0,
        }
    }

    /// Releases the underlying peripherals.
    pub fn release(self) -> (EN, PWM, ADC) {
        (self.enable_pin, self.pwm, self.adc)
    }
}

impl<EN, PWM, ADC> Bts7960Hal for GpioPwmHal<EN, PWM, ADC>
where
    EN: StatefulOutputPin,
    PWM: SetDutyCycle,
    ADC: CurrentSenseAdc,
{
    type Error = GpioPwmError<EN::Error, PWM::Error, ADC::Error>;

    fn initialize_hardware(&mut self) -> Result<(), Self::Error> {
        // Bring-up must leave the output stage safe.
        self.enable_pin.set_low().map_err(GpioPwmError::Pin)?;
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(GpioPwmError::Pwm)?;
        self.duty_percentage = 0;
        Ok(())
    }

    fn deinitialize_hardware(&mut self) -> Result<(), Self::Error> {
        self.enable_pin.set_low().map_err(GpioPwmError::Pin)?;
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(GpioPwmError::Pwm)?;
        self.duty_percentage = 0;
        Ok(())
    }

    fn set_enable_pin_state(&mut self, state: bool) -> Result<(), Self::Error> {
        self.enable_pin
            .set_state(state.into())
            .map_err(GpioPwmError::Pin)
    }

    fn enable_pin_state(&mut self) -> Result<bool, Self::Error> {
        self.enable_pin.is_set_high().map_err(GpioPwmError::Pin)
    }

    fn measure_current_sense_voltage(&mut self) -> Result<u32, Self::Error> {
        self.adc.measure_millivolts().map_err(GpioPwmError::Adc)
    }

    fn set_pwm_signal_percentage(&mut self, percentage: u8) -> Result<(), Self::Error> {
        self.pwm
            .set_duty_cycle_percent(percentage)
            .map_err(GpioPwmError::Pwm)?;
        self.duty_percentage = percentage;
        Ok(())
    }

    fn pwm_signal_percentage(&mut self) -> Result<u8, Self::Error> {
        Ok(self.duty_percentage)
    }
}
