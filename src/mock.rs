use super::{Bts7960Hal, FrequencyControl, bisync, only_sync};
use crate::{FrequencyStatus, MockError};

/// Fully-configurable software simulation of a BTS7960 HAL, for testing and
/// playing with.
///
/// Every capability has a `fail_*` flag that scripts it to report
/// [`MockError`]; last-written values are stored in plain public fields so a
/// test can inspect them once the driver releases its borrow. Scripted
/// inputs (`current_sense_voltage`, the frequency limits) survive hardware
/// bring-up, so they can be arranged before the driver is constructed:
///
/// ```rust
/// use bts7960::{Bts7960, BtsError, MockHal};
///
/// let mut hal = MockHal::new();
/// hal.current_sense_voltage = 5_000;
///
/// let mut drv = Bts7960::new(&mut hal);
/// drv.initialize()?;
/// assert_eq!(drv.status(), Err(BtsError::FaultDetected));
/// # Ok::<(), bts7960::BtsError<bts7960::MockError>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockHal {
    pub fail_initialize: bool,
    pub fail_deinitialize: bool,
    pub fail_set_enable_pin: bool,
    pub fail_get_enable_pin: bool,
    pub fail_measure_voltage: bool,
    pub fail_set_duty: bool,
    pub fail_get_duty: bool,
    pub fail_set_frequency: bool,
    pub fail_get_frequency: bool,

    /// Lowest PWM frequency the simulated hardware accepts, in hertz.
    pub min_frequency: u32,
    /// Highest PWM frequency the simulated hardware accepts, in hertz.
    pub max_frequency: u32,

    pub enable_pin_state: bool,
    /// Scripted IS-pin reading, in millivolts.
    pub current_sense_voltage: u32,
    pub duty_percentage: u8,
    pub frequency: u32,
}

impl MockHal {
    /// Frequency floor of a freshly constructed mock, in hertz.
    pub const DEFAULT_MIN_FREQUENCY: u32 = 1_000;
    /// Frequency ceiling of a freshly constructed mock, in hertz.
    pub const DEFAULT_MAX_FREQUENCY: u32 = 100_000;

    /// Creates a mock with every capability succeeding and all hardware
    /// state zeroed.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for MockHal {
    fn default() -> Self {
        Self {
            fail_initialize: false,
            fail_deinitialize: false,
            fail_set_enable_pin: false,
            fail_get_enable_pin: false,
            fail_measure_voltage: false,
            fail_set_duty: false,
            fail_get_duty: false,
            fail_set_frequency: false,
            fail_get_frequency: false,
            min_frequency: Self::DEFAULT_MIN_FREQUENCY,
            max_frequency: Self::DEFAULT_MAX_FREQUENCY,
            enable_pin_state: false,
            current_sense_voltage: 0,
            duty_percentage: 0,
            frequency: Self::DEFAULT_MIN_FREQUENCY,
        }
    }
}

#[bisync]
impl Bts7960Hal for MockHal {
    type Error = MockError;

    async fn initialize_hardware(&mut self) -> Result<(), MockError> {
        if self.fail_initialize {
            return Err(MockError);
        }

        // Bring-up leaves the output stage safe; scripted inputs survive.
        self.enable_pin_state = false;
        self.duty_percentage = 0;
        Ok(())
    }

    async fn deinitialize_hardware(&mut self) -> Result<(), MockError> {
        if self.fail_deinitialize {
            return Err(MockError);
        }

        self.enable_pin_state = false;
        self.duty_percentage = 0;
        Ok(())
    }

    async fn set_enable_pin_state(&mut self, state: bool) -> Result<(), MockError> {
        if self.fail_set_enable_pin {
            return Err(MockError);
        }

        self.enable_pin_state = state;
        Ok(())
    }

    async fn enable_pin_state(&mut self) -> Result<bool, MockError> {
        if self.fail_get_enable_pin {
            return Err(MockError);
        }

        Ok(self.enable_pin_state)
    }

    async fn measure_current_sense_voltage(&mut self) -> Result<u32, MockError> {
        if self.fail_measure_voltage {
            return Err(MockError);
        }

        Ok(self.current_sense_voltage)
    }

    async fn set_pwm_signal_percentage(&mut self, percentage: u8) -> Result<(), MockError> {
        if self.fail_set_duty {
            return Err(MockError);
        }

        self.duty_percentage = percentage;
        Ok(())
    }

    async fn pwm_signal_percentage(&mut self) -> Result<u8, MockError> {
        if self.fail_get_duty {
            return Err(MockError);
        }

        Ok(self.duty_percentage)
    }
}

#[bisync]
impl FrequencyControl for MockHal {
    async fn set_pwm_signal_frequency(
        &mut self,
        frequency: u32,
    ) -> Result<FrequencyStatus, MockError> {
        if self.fail_set_frequency {
            return Err(MockError);
        }

        if frequency < self.min_frequency {
            return Ok(FrequencyStatus::TooLow);
        }
        if frequency > self.max_frequency {
            return Ok(FrequencyStatus::TooHigh);
        }

        self.frequency = frequency;
        Ok(FrequencyStatus::InRange)
    }

    async fn pwm_signal_frequency(&mut self) -> Result<u32, MockError> {
        if self.fail_get_frequency {
            return Err(MockError);
        }

        Ok(self.frequency)
    }
}
