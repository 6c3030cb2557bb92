#![cfg_attr(not(any(test, feature = "std")), no_std)]
//! # BTS7960 Half-Bridge Driver
//!
//! This crate provides a platform-independent driver for the BTS7960
//! high-current PN half-bridge IC. All physical I/O goes through a
//! caller-supplied hardware abstraction (the [`Bts7960Hal`] trait), so the
//! driver runs unchanged on any MCU; what it contributes is the lifecycle
//! state machine, the power/duty-cycle surface, and the current-sense
//! arithmetic that turns a raw IS-pin millivolt reading into a calibrated
//! load current or a fault decision. Both asynchronous and blocking
//! operation are supported through a unified API, using the
//! [`bisync`](https://docs.rs/bisync) crate.
//!
//! ## Features
//!
//! *   **Bring-your-own HAL:** implement [`Bts7960Hal`] (or
//!     [`Bts7960HalAsync`]) for your platform; the [`ehal`] module offers a
//!     ready-made blocking implementation over `embedded-hal` pin and PWM
//!     traits.
//! *   **Unified Async/Blocking Support:** write the HAL once per mode and
//!     drive it with [`Bts7960`] or [`Bts7960Async`].
//! *   **Calibrated current sensing:** fault thresholds and the
//!     millivolt-to-milliamp scaling factor are derived once at
//!     initialization from the electrical constants in [`Config`].
//! *   **Optional PWM frequency control:** HALs that can retune the carrier
//!     implement the [`FrequencyControl`] extension trait; the two frequency
//!     operations only exist for those HALs.
//! *   **`defmt` and `log` Integration:** optional support for logging and
//!     debugging.
//! *   **Configurable software simulation:** [`MockHal`] implements the full
//!     capability set for tests and experimentation, no hardware required.
//!
//! ## Getting Started
//!
//! Instantiate the driver with an exclusive reference to your HAL, then
//! initialize it before use:
//!
//! ```rust
//! use bts7960::{Bts7960, MockHal};
//!
//! let mut hal = MockHal::new();
//! hal.current_sense_voltage = 150; // millivolts on the IS pin
//!
//! let mut drv = Bts7960::new(&mut hal);
//! drv.initialize()?;
//! drv.enable()?;
//! drv.set_power_percentage(40)?;
//!
//! let status = drv.status()?;
//! assert!(!status.fault);
//! # Ok::<(), bts7960::BtsError<bts7960::MockError>>(())
//! ```
//!
//! For async environments, use [`Bts7960Async`] with a HAL implementing
//! [`Bts7960HalAsync`]:
//!
//! ```rust
//! # async fn run() -> Result<(), bts7960::BtsError<bts7960::MockError>> {
//! use bts7960::{Bts7960Async, MockHalAsync};
//!
//! let mut hal = MockHalAsync::new();
//! let mut drv = Bts7960Async::new(&mut hal);
//! drv.initialize().await?;
//! drv.enable().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Warning!
//!
//! ***Caution!*** The BTS7960 switches tens of amperes. A wrong sense
//! resistor value in [`Config`] skews every current reading and fault
//! decision this driver makes, and a misconfigured HAL can leave the output
//! stage enabled. Proceed with care and always consult the BTS7960
//! datasheet.

#[macro_use]
pub(crate) mod fmt;

use thiserror::Error;

/// Default current-sense resistor value, in ohms.
pub const DEFAULT_CURRENT_SENSE_RESISTANCE: u32 = 1_000;
/// Default current-sense ratio `k` of the IC (nominal, per datasheet).
pub const DEFAULT_CURRENT_SENSE_RATIO: u16 = 8_500;
/// Default IS-pin current sourced in fault mode, in microamps.
pub const DEFAULT_CURRENT_IN_FAULT_MODE: u16 = 4_500;
/// Default fault-voltage tolerance, in percent.
pub const DEFAULT_FAULT_VOLTAGE_TOLERANCE: u8 = 5;

/// Errors returned by driver operations.
///
/// `Hal` wraps whatever error type the underlying HAL reports; everything
/// else originates in the driver itself. [`BtsError::FaultDetected`] is an
/// expected outcome the caller must handle, not a software failure.
#[derive(Debug, Error, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BtsError<HalE> {
    /// The HAL reported a failure for a delegated operation.
    #[error("HAL error")]
    Hal(HalE),
    /// An operation requiring an initialized driver was attempted first.
    #[error("driver is not initialized")]
    NotInitialized,
    /// The driver was asked to initialize a second time.
    #[error("driver is already initialized")]
    AlreadyInitialized,
    /// A power percentage outside the 0-100 range was rejected.
    #[error("power percentage outside of the 0-100 range")]
    InvalidPowerValue,
    /// The IS-pin voltage is in the fault band; the IC is signalling a fault
    /// or an overcurrent indistinguishable from one.
    #[error("fault reported on the current sense pin")]
    FaultDetected,
    /// The requested PWM frequency is below what the hardware can generate.
    #[error("PWM frequency too low for the hardware")]
    FrequencyTooLow,
    /// The requested PWM frequency is above what the hardware can generate.
    #[error("PWM frequency too high for the hardware")]
    FrequencyTooHigh,
}

/// Electrical constants the current-sense arithmetic is derived from.
///
/// All four values must be non-zero; a zero is a misconfiguration and is
/// rejected with a debug assertion at initialization, not at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Value of the external IS-pin sense resistor, in ohms.
    pub current_sense_resistance: u32,
    /// Current-sense ratio `k` relating load current to sense current.
    pub current_sense_ratio: u16,
    /// Current sourced on the IS pin while the IC is in fault mode, in
    /// microamps.
    pub current_in_fault_mode: u16,
    /// Accepted downward deviation from the fault voltage, in percent, for a
    /// reading to still be classified as a fault.
    pub fault_voltage_tolerance: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            current_sense_resistance: DEFAULT_CURRENT_SENSE_RESISTANCE,
            current_sense_ratio: DEFAULT_CURRENT_SENSE_RATIO,
            current_in_fault_mode: DEFAULT_CURRENT_IN_FAULT_MODE,
            fault_voltage_tolerance: DEFAULT_FAULT_VOLTAGE_TOLERANCE,
        }
    }
}

impl Config {
    /// Derives the fault thresholds and current-sense scaling factor.
    ///
    /// Integer arithmetic with truncating division throughout, so results
    /// are exact and reproducible on any target:
    ///
    /// ```rust
    /// use bts7960::{Config, Thresholds};
    ///
    /// let t = Config::default().thresholds();
    /// assert_eq!(
    ///     t,
    ///     Thresholds {
    ///         fault_voltage: 4_500,
    ///         fault_voltage_epsilon: 225,
    ///         fault_voltage_min: 4_275,
    ///         current_sense_multiplier: 8_500,
    ///     }
    /// );
    /// ```
    pub fn thresholds(&self) -> Thresholds {
        // U = I * R, current in microamps -> /10^3 to convert to millivolts.
        let fault_voltage =
            self.current_sense_resistance * u32::from(self.current_in_fault_mode) / 1_000;
        let fault_voltage_epsilon = fault_voltage * u32::from(self.fault_voltage_tolerance) / 100;
        Thresholds {
            fault_voltage,
            fault_voltage_epsilon,
            fault_voltage_min: fault_voltage - fault_voltage_epsilon,
            current_sense_multiplier: u32::from(self.current_sense_ratio)
                * self.current_sense_resistance
                / 1_000,
        }
    }
}

/// Values derived from a [`Config`] at initialization and cached for the
/// lifetime of the driver instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    /// Expected IS-pin voltage while the IC is in fault mode, in millivolts.
    pub fault_voltage: u32,
    /// `fault_voltage * tolerance / 100`, in millivolts.
    pub fault_voltage_epsilon: u32,
    /// Voltage at or above which a reading is classified as a fault, in
    /// millivolts.
    pub fault_voltage_min: u32,
    /// Multiplier converting an IS-pin millivolt reading into load current.
    pub current_sense_multiplier: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Calibration {
    pub(crate) config: Config,
    pub(crate) thresholds: Thresholds,
}

/// A single current/fault reading, produced per call and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Load current flowing through the half-bridge, in milliamps.
    pub current: u32,
    /// Whether the reading was classified as a fault. A fault reading is
    /// reported as [`BtsError::FaultDetected`] instead of a `Status`, so a
    /// returned `Status` always carries `false` here.
    pub fault: bool,
}

/// Outcome of a HAL frequency-set request.
///
/// Explicitly three-way so that the driver's mapping onto
/// [`BtsError::FrequencyTooLow`] / [`BtsError::FrequencyTooHigh`] has no
/// unreachable fallback arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrequencyStatus {
    /// The frequency was accepted and applied.
    InRange,
    /// The frequency is below what the hardware can generate.
    TooLow,
    /// The frequency is above what the hardware can generate.
    TooHigh,
}

/// Error type of [`MockHal`], reported when a capability is scripted to fail.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("mock HAL failure")]
pub struct MockError;

#[path = "."]
mod asynchronous {
    use bisync::asynchronous::*;
    mod hal;
    pub use hal::*;
    mod driver;
    pub use driver::*;
    mod mock;
    pub use mock::*;
}
pub use asynchronous::{
    Bts7960 as Bts7960Async, Bts7960Hal as Bts7960HalAsync,
    FrequencyControl as FrequencyControlAsync, MockHal as MockHalAsync,
};

#[path = "."]
mod blocking {
    use bisync::synchronous::*;
    #[allow(clippy::duplicate_mod)]
    mod hal;
    pub use hal::*;
    #[allow(clippy::duplicate_mod)]
    mod driver;
    pub use driver::*;
    #[allow(clippy::duplicate_mod)]
    mod mock;
    pub use mock::*;
}
pub use blocking::{Bts7960, Bts7960Hal, FrequencyControl, MockHal};

pub mod ehal;
