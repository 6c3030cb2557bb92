use super::bisync;
use crate::FrequencyStatus;

/// Hardware capabilities the driver needs from the target platform.
///
/// The caller owns the HAL instance, initializes whatever the implementation
/// itself needs before constructing the driver, and lends it to the driver
/// exclusively for the driver's lifetime. Each method performs one physical
/// operation and reports failure through `Self::Error`; the driver never
/// retries, it surfaces the error to the caller as
/// [`BtsError::Hal`](crate::BtsError::Hal).
#[bisync]
#[allow(async_fn_in_trait)]
pub trait Bts7960Hal {
    /// Platform error type carried through the driver unchanged.
    type Error: core::fmt::Debug;

    /// Brings up the pins, PWM generator and ADC channel the IC is wired to.
    async fn initialize_hardware(&mut self) -> Result<(), Self::Error>;

    /// Releases the hardware claimed by [`initialize_hardware`].
    ///
    /// May be a no-op on platforms where teardown is not required.
    ///
    /// [`initialize_hardware`]: Bts7960Hal::initialize_hardware
    async fn deinitialize_hardware(&mut self) -> Result<(), Self::Error>;

    /// Drives the inhibit/enable pin to the requested state.
    async fn set_enable_pin_state(&mut self, state: bool) -> Result<(), Self::Error>;

    /// Reads back the inhibit/enable pin state.
    async fn enable_pin_state(&mut self) -> Result<bool, Self::Error>;

    /// Samples the IS-pin voltage and returns it in millivolts.
    ///
    /// A single settled reading per call; any filtering or averaging is the
    /// implementation's concern.
    async fn measure_current_sense_voltage(&mut self) -> Result<u32, Self::Error>;

    /// Applies a PWM duty cycle, as an integer percentage in 0-100.
    ///
    /// The driver validates the range before delegating.
    async fn set_pwm_signal_percentage(&mut self, percentage: u8) -> Result<(), Self::Error>;

    /// Reads back the current PWM duty cycle, in 0-100.
    async fn pwm_signal_percentage(&mut self) -> Result<u8, Self::Error>;
}

/// Optional PWM-frequency capability.
///
/// Not every platform can retune the PWM carrier, so this lives in its own
/// trait: HALs that implement it gain the driver's frequency operations,
/// everyone else simply doesn't have them. There is no runtime "unsupported"
/// state.
#[bisync]
#[allow(async_fn_in_trait)]
pub trait FrequencyControl: Bts7960Hal {
    /// Requests a new PWM carrier frequency, in hertz.
    ///
    /// Returns the explicit three-way outcome; `Self::Error` is reserved for
    /// actual hardware failures.
    async fn set_pwm_signal_frequency(
        &mut self,
        frequency: u32,
    ) -> Result<FrequencyStatus, Self::Error>;

    /// Reads back the current PWM carrier frequency, in hertz.
    async fn pwm_signal_frequency(&mut self) -> Result<u32, Self::Error>;
}
