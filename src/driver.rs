use super::{Bts7960Hal, FrequencyControl, bisync};
use crate::{BtsError, Calibration, Config, FrequencyStatus, Status, Thresholds};

/// Driver for the BTS7960 half-bridge.
///
/// The driver borrows its HAL exclusively: the caller owns the HAL, must
/// keep it alive for the driver's whole lifetime, and gets it back once the
/// driver is dropped. A freshly constructed driver is uninitialized; every
/// operation except [`initialize`] fails with
/// [`BtsError::NotInitialized`] until initialization succeeds.
///
/// [`initialize`]: Bts7960::initialize
pub struct Bts7960<'hal, H> {
    hal: &'hal mut H,
    calibration: Option<Calibration>,
}

impl<'hal, H> Bts7960<'hal, H>
where
    H: Bts7960Hal,
{
    /// Creates an uninitialized driver over the given HAL.
    pub fn new(hal: &'hal mut H) -> Self {
        Self {
            hal,
            calibration: None,
        }
    }

    /// Whether [`initialize`](Bts7960::initialize) has completed.
    pub fn is_initialized(&self) -> bool {
        self.calibration.is_some()
    }

    /// The configuration applied at initialization, if any.
    pub fn config(&self) -> Option<&Config> {
        self.calibration.as_ref().map(|c| &c.config)
    }

    /// The thresholds derived at initialization, if any.
    pub fn thresholds(&self) -> Option<&Thresholds> {
        self.calibration.as_ref().map(|c| &c.thresholds)
    }

    /// Initializes the driver and the underlying hardware with the default
    /// electrical constants.
    ///
    /// Equivalent to [`initialize_with`](Bts7960::initialize_with) with
    /// [`Config::default`].
    #[bisync]
    pub async fn initialize(&mut self) -> Result<(), BtsError<H::Error>> {
        self.initialize_with(Config::default()).await
    }

    /// Initializes the driver and the underlying hardware with custom
    /// electrical constants.
    ///
    /// Hardware bring-up is delegated to the HAL first; if it fails the
    /// driver stays uninitialized. On success the fault thresholds and the
    /// current-sense multiplier are derived from `config` and cached until
    /// [`deinitialize`](Bts7960::deinitialize).
    ///
    /// All values in `config` must be non-zero; zeroes are a
    /// misconfiguration and trip a debug assertion rather than a runtime
    /// error.
    #[bisync]
    pub async fn initialize_with(&mut self, config: Config) -> Result<(), BtsError<H::Error>> {
        debug_assert!(
            config.current_sense_resistance != 0,
            "current sense resistance must be non-zero"
        );
        debug_assert!(
            config.current_sense_ratio != 0,
            "current sense ratio must be non-zero"
        );
        debug_assert!(
            config.current_in_fault_mode != 0,
            "fault mode current must be non-zero"
        );
        debug_assert!(
            config.fault_voltage_tolerance != 0,
            "fault voltage tolerance must be non-zero"
        );

        if self.calibration.is_some() {
            return Err(BtsError::AlreadyInitialized);
        }

        self.hal
            .initialize_hardware()
            .await
            .map_err(BtsError::Hal)?;

        let thresholds = config.thresholds();
        debug!(
            "bts7960 initialized: fault_voltage_min={} mV, current_sense_multiplier={}",
            thresholds.fault_voltage_min, thresholds.current_sense_multiplier
        );
        self.calibration = Some(Calibration { config, thresholds });

        Ok(())
    }

    /// De-initializes the driver, releasing the underlying hardware.
    ///
    /// If the HAL reports a teardown failure the driver stays initialized,
    /// since the hardware was not actually released.
    #[bisync]
    pub async fn deinitialize(&mut self) -> Result<(), BtsError<H::Error>> {
        if self.calibration.is_none() {
            return Err(BtsError::NotInitialized);
        }

        self.hal
            .deinitialize_hardware()
            .await
            .map_err(BtsError::Hal)?;

        self.calibration = None;
        debug!("bts7960 deinitialized");

        Ok(())
    }

    /// Enables the half-bridge output via the hardware enable pin.
    #[bisync]
    pub async fn enable(&mut self) -> Result<(), BtsError<H::Error>> {
        if self.calibration.is_none() {
            return Err(BtsError::NotInitialized);
        }

        self.hal
            .set_enable_pin_state(true)
            .await
            .map_err(BtsError::Hal)
    }

    /// Disables the half-bridge output via the hardware enable pin.
    #[bisync]
    pub async fn disable(&mut self) -> Result<(), BtsError<H::Error>> {
        if self.calibration.is_none() {
            return Err(BtsError::NotInitialized);
        }

        self.hal
            .set_enable_pin_state(false)
            .await
            .map_err(BtsError::Hal)
    }

    /// Checks whether the half-bridge output is currently enabled.
    #[bisync]
    pub async fn is_enabled(&mut self) -> Result<bool, BtsError<H::Error>> {
        if self.calibration.is_none() {
            return Err(BtsError::NotInitialized);
        }

        self.hal.enable_pin_state().await.map_err(BtsError::Hal)
    }

    /// Measures the current flowing through the half-bridge and checks for a
    /// fault.
    ///
    /// The IS pin encodes load current as a voltage across the external
    /// sense resistor, except in fault mode, where the IC sources a fixed
    /// current regardless of load. A reading at or above the
    /// tolerance-shrunk fault voltage is therefore indistinguishable from a
    /// genuine overcurrent and is always classified as a fault; below the
    /// threshold the reading is scaled by the cached multiplier into
    /// milliamps.
    ///
    /// ```rust
    /// use bts7960::{Bts7960, BtsError, MockHal};
    ///
    /// let mut hal = MockHal::new();
    /// hal.current_sense_voltage = 4_400; // inside the fault band
    ///
    /// let mut drv = Bts7960::new(&mut hal);
    /// drv.initialize()?;
    /// match drv.status() {
    ///     Err(BtsError::FaultDetected) => { /* shut the load down */ }
    ///     Ok(status) => println!("load current: {} mA", status.current),
    ///     Err(e) => return Err(e),
    /// }
    /// # Ok::<(), bts7960::BtsError<bts7960::MockError>>(())
    /// ```
    #[bisync]
    pub async fn status(&mut self) -> Result<Status, BtsError<H::Error>> {
        let thresholds = match self.calibration {
            Some(ref calibration) => calibration.thresholds,
            None => return Err(BtsError::NotInitialized),
        };

        let voltage = self
            .hal
            .measure_current_sense_voltage()
            .await
            .map_err(BtsError::Hal)?;

        if voltage >= thresholds.fault_voltage_min {
            warn!(
                "current sense voltage {} mV at or above fault threshold {} mV",
                voltage, thresholds.fault_voltage_min
            );
            return Err(BtsError::FaultDetected);
        }

        Ok(Status {
            current: thresholds.current_sense_multiplier * voltage,
            fault: false,
        })
    }

    /// Sets the output power as a PWM duty cycle percentage in 0-100.
    ///
    /// Values above 100 are rejected with
    /// [`BtsError::InvalidPowerValue`] without touching the HAL.
    #[bisync]
    pub async fn set_power_percentage(&mut self, percentage: u8) -> Result<(), BtsError<H::Error>> {
        if self.calibration.is_none() {
            return Err(BtsError::NotInitialized);
        }

        if percentage > 100 {
            return Err(BtsError::InvalidPowerValue);
        }

        self.hal
            .set_pwm_signal_percentage(percentage)
            .await
            .map_err(BtsError::Hal)
    }

    /// Reads back the output power as a PWM duty cycle percentage in 0-100.
    #[bisync]
    pub async fn power_percentage(&mut self) -> Result<u8, BtsError<H::Error>> {
        if self.calibration.is_none() {
            return Err(BtsError::NotInitialized);
        }

        self.hal
            .pwm_signal_percentage()
            .await
            .map_err(BtsError::Hal)
    }
}

/// Frequency operations, available only for HALs that implement
/// [`FrequencyControl`].
impl<'hal, H> Bts7960<'hal, H>
where
    H: FrequencyControl,
{
    /// Sets the PWM carrier frequency, in hertz.
    #[bisync]
    pub async fn set_output_frequency(&mut self, frequency: u32) -> Result<(), BtsError<H::Error>> {
        if self.calibration.is_none() {
            return Err(BtsError::NotInitialized);
        }

        match self
            .hal
            .set_pwm_signal_frequency(frequency)
            .await
            .map_err(BtsError::Hal)?
        {
            FrequencyStatus::InRange => Ok(()),
            FrequencyStatus::TooLow => Err(BtsError::FrequencyTooLow),
            FrequencyStatus::TooHigh => Err(BtsError::FrequencyTooHigh),
        }
    }

    /// Reads back the PWM carrier frequency, in hertz.
    #[bisync]
    pub async fn output_frequency(&mut self) -> Result<u32, BtsError<H::Error>> {
        if self.calibration.is_none() {
            return Err(BtsError::NotInitialized);
        }

        self.hal.pwm_signal_frequency().await.map_err(BtsError::Hal)
    }
}
