use bts7960::{Bts7960, BtsError, Config, MockHal, Status};

/// Given a correctly initialized HAL instance,
/// When `initialize()` is called,
/// Then the driver is initialized with the default configuration and the
/// thresholds derived from it.
#[test]
fn initialize_populates_configuration_and_thresholds() {
    let mut hal = MockHal::new();
    let mut drv = Bts7960::new(&mut hal);

    drv.initialize().unwrap();

    assert!(drv.is_initialized());
    assert_eq!(drv.config(), Some(&Config::default()));

    let t = drv.thresholds().unwrap();
    assert_eq!(t.fault_voltage, 4_500);
    assert_eq!(t.fault_voltage_epsilon, 225);
    assert_eq!(t.fault_voltage_min, 4_275);
    assert_eq!(t.current_sense_multiplier, 8_500);
}

#[test]
fn initialize_with_custom_constants() {
    let config = Config {
        current_sense_resistance: 500,
        current_sense_ratio: 10_000,
        current_in_fault_mode: 4_500,
        fault_voltage_tolerance: 10,
    };

    let mut hal = MockHal::new();
    let mut drv = Bts7960::new(&mut hal);
    drv.initialize_with(config).unwrap();

    assert_eq!(drv.config(), Some(&config));
    let t = drv.thresholds().unwrap();
    assert_eq!(t.fault_voltage, 2_250);
    assert_eq!(t.fault_voltage_epsilon, 225);
    assert_eq!(t.fault_voltage_min, 2_025);
    assert_eq!(t.current_sense_multiplier, 5_000);
}

#[test]
fn operations_require_initialization() {
    let mut hal = MockHal::new();
    let mut drv = Bts7960::new(&mut hal);

    assert_eq!(drv.enable(), Err(BtsError::NotInitialized));
    assert_eq!(drv.disable(), Err(BtsError::NotInitialized));
    assert_eq!(drv.is_enabled(), Err(BtsError::NotInitialized));
    assert_eq!(drv.status(), Err(BtsError::NotInitialized));
    assert_eq!(drv.set_power_percentage(10), Err(BtsError::NotInitialized));
    assert_eq!(drv.power_percentage(), Err(BtsError::NotInitialized));
    assert_eq!(drv.set_output_frequency(10_000), Err(BtsError::NotInitialized));
    assert_eq!(drv.output_frequency(), Err(BtsError::NotInitialized));
}

/// Given an initialized driver,
/// When `initialize()` is called a second time,
/// Then the call is rejected without re-running hardware bring-up.
#[test]
fn second_initialize_is_rejected_without_touching_the_hal() {
    let mut hal = MockHal::new();
    let mut drv = Bts7960::new(&mut hal);

    drv.initialize().unwrap();
    drv.set_power_percentage(40).unwrap();

    assert_eq!(drv.initialize(), Err(BtsError::AlreadyInitialized));
    // Bring-up would have parked the duty cycle at zero.
    assert_eq!(drv.power_percentage(), Ok(40));
}

#[test]
fn failed_bring_up_leaves_driver_uninitialized() {
    let mut hal = MockHal::new();
    hal.fail_initialize = true;

    let mut drv = Bts7960::new(&mut hal);
    assert_eq!(drv.initialize(), Err(BtsError::Hal(bts7960::MockError)));
    assert!(!drv.is_initialized());
    assert!(drv.config().is_none());
    assert!(drv.thresholds().is_none());
}

#[test]
fn deinitialize_returns_driver_to_uninitialized() {
    let mut hal = MockHal::new();
    let mut drv = Bts7960::new(&mut hal);

    drv.initialize().unwrap();
    drv.deinitialize().unwrap();

    assert!(!drv.is_initialized());
    assert!(drv.config().is_none());
    assert!(drv.thresholds().is_none());
    assert_eq!(drv.deinitialize(), Err(BtsError::NotInitialized));
}

#[test]
fn lifecycle_can_repeat() {
    let mut hal = MockHal::new();
    let mut drv = Bts7960::new(&mut hal);

    drv.initialize().unwrap();
    drv.deinitialize().unwrap();
    drv.initialize().unwrap();
    assert!(drv.is_initialized());
}

/// Given a HAL whose teardown fails,
/// When `deinitialize()` is called,
/// Then the driver stays initialized and usable.
#[test]
fn failed_teardown_keeps_driver_initialized() {
    let mut hal = MockHal::new();
    hal.fail_deinitialize = true;

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().unwrap();

    assert_eq!(drv.deinitialize(), Err(BtsError::Hal(bts7960::MockError)));
    assert!(drv.is_initialized());
    assert!(drv.status().is_ok());
}

#[test]
fn enable_disable_round_trip() {
    let mut hal = MockHal::new();
    {
        let mut drv = Bts7960::new(&mut hal);
        drv.initialize().unwrap();

        drv.enable().unwrap();
        assert_eq!(drv.is_enabled(), Ok(true));

        drv.disable().unwrap();
        assert_eq!(drv.is_enabled(), Ok(false));
    }
    assert!(!hal.enable_pin_state);
}

#[test]
fn enable_pin_failures_surface_as_hal_errors() {
    let mut hal = MockHal::new();
    hal.fail_set_enable_pin = true;
    hal.fail_get_enable_pin = true;

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().unwrap();

    assert_eq!(drv.enable(), Err(BtsError::Hal(bts7960::MockError)));
    assert_eq!(drv.disable(), Err(BtsError::Hal(bts7960::MockError)));
    assert_eq!(drv.is_enabled(), Err(BtsError::Hal(bts7960::MockError)));
}

#[test]
fn current_scales_with_sense_voltage() {
    let mut hal = MockHal::new();
    hal.current_sense_voltage = 100;

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().unwrap();

    assert_eq!(
        drv.status(),
        Ok(Status {
            current: 850_000,
            fault: false,
        })
    );
}

#[test]
fn zero_voltage_reads_as_zero_current() {
    let mut hal = MockHal::new();

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().unwrap();

    assert_eq!(
        drv.status(),
        Ok(Status {
            current: 0,
            fault: false,
        })
    );
}

/// The fault boundary is inclusive: a reading exactly at the
/// tolerance-shrunk fault voltage is already a fault.
#[test]
fn fault_boundary_is_inclusive() {
    for (voltage, faulted) in [(4_274, false), (4_275, true), (4_276, true)] {
        let mut hal = MockHal::new();
        hal.current_sense_voltage = voltage;

        let mut drv = Bts7960::new(&mut hal);
        drv.initialize().unwrap();

        match drv.status() {
            Ok(status) => {
                assert!(!faulted, "voltage {voltage} should have faulted");
                assert_eq!(status.current, 8_500 * voltage);
            }
            Err(BtsError::FaultDetected) => {
                assert!(faulted, "voltage {voltage} should not have faulted");
            }
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }
}

#[test]
fn fault_threshold_follows_custom_configuration() {
    let config = Config {
        current_sense_resistance: 500,
        current_sense_ratio: 8_500,
        current_in_fault_mode: 4_500,
        fault_voltage_tolerance: 10,
    };

    // fault_voltage = 2250 mV, epsilon = 225 mV, minimum = 2025 mV.
    let mut hal = MockHal::new();
    hal.current_sense_voltage = 2_025;
    let mut drv = Bts7960::new(&mut hal);
    drv.initialize_with(config).unwrap();
    assert_eq!(drv.status(), Err(BtsError::FaultDetected));

    let mut hal = MockHal::new();
    hal.current_sense_voltage = 2_024;
    let mut drv = Bts7960::new(&mut hal);
    drv.initialize_with(config).unwrap();
    // multiplier = 8500 * 500 / 1000 = 4250
    assert_eq!(
        drv.status(),
        Ok(Status {
            current: 4_250 * 2_024,
            fault: false,
        })
    );
}

#[test]
fn measurement_failure_surfaces_as_hal_error() {
    let mut hal = MockHal::new();
    hal.fail_measure_voltage = true;

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().unwrap();
    assert_eq!(drv.status(), Err(BtsError::Hal(bts7960::MockError)));
}

#[test]
fn power_percentage_accepts_the_full_range() {
    let mut hal = MockHal::new();
    {
        let mut drv = Bts7960::new(&mut hal);
        drv.initialize().unwrap();

        drv.set_power_percentage(0).unwrap();
        assert_eq!(drv.power_percentage(), Ok(0));
        drv.set_power_percentage(100).unwrap();
        assert_eq!(drv.power_percentage(), Ok(100));
    }
    assert_eq!(hal.duty_percentage, 100);
}

/// Given an initialized driver with a duty cycle applied,
/// When an out-of-range percentage is requested,
/// Then the request is rejected and the HAL never sees it.
#[test]
fn out_of_range_power_is_rejected_before_delegation() {
    let mut hal = MockHal::new();
    {
        let mut drv = Bts7960::new(&mut hal);
        drv.initialize().unwrap();

        drv.set_power_percentage(40).unwrap();
        assert_eq!(drv.set_power_percentage(101), Err(BtsError::InvalidPowerValue));
        assert_eq!(drv.set_power_percentage(255), Err(BtsError::InvalidPowerValue));
        assert_eq!(drv.power_percentage(), Ok(40));
    }
    assert_eq!(hal.duty_percentage, 40);
}

#[test]
fn duty_cycle_failures_surface_as_hal_errors() {
    let mut hal = MockHal::new();
    hal.fail_set_duty = true;
    hal.fail_get_duty = true;

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().unwrap();

    assert_eq!(
        drv.set_power_percentage(10),
        Err(BtsError::Hal(bts7960::MockError))
    );
    assert_eq!(drv.power_percentage(), Err(BtsError::Hal(bts7960::MockError)));
}

#[test]
fn in_range_frequency_is_applied_and_read_back() {
    let mut hal = MockHal::new();
    {
        let mut drv = Bts7960::new(&mut hal);
        drv.initialize().unwrap();

        drv.set_output_frequency(50_000).unwrap();
        assert_eq!(drv.output_frequency(), Ok(50_000));
    }
    assert_eq!(hal.frequency, 50_000);
}

#[test]
fn out_of_range_frequencies_map_to_distinct_errors() {
    let mut hal = MockHal::new();
    {
        let mut drv = Bts7960::new(&mut hal);
        drv.initialize().unwrap();

        assert_eq!(drv.set_output_frequency(999), Err(BtsError::FrequencyTooLow));
        assert_eq!(
            drv.set_output_frequency(100_001),
            Err(BtsError::FrequencyTooHigh)
        );
    }
    // Rejected requests never reach the stored frequency.
    assert_eq!(hal.frequency, MockHal::DEFAULT_MIN_FREQUENCY);
}

#[test]
fn frequency_limits_are_configurable_on_the_mock() {
    let mut hal = MockHal::new();
    hal.min_frequency = 2_000;
    hal.max_frequency = 4_000;

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().unwrap();

    assert_eq!(drv.set_output_frequency(1_999), Err(BtsError::FrequencyTooLow));
    assert_eq!(drv.set_output_frequency(4_001), Err(BtsError::FrequencyTooHigh));
    drv.set_output_frequency(3_000).unwrap();
    assert_eq!(drv.output_frequency(), Ok(3_000));
}

#[test]
fn frequency_failures_surface_as_hal_errors() {
    let mut hal = MockHal::new();
    hal.fail_set_frequency = true;
    hal.fail_get_frequency = true;

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().unwrap();

    assert_eq!(
        drv.set_output_frequency(50_000),
        Err(BtsError::Hal(bts7960::MockError))
    );
    assert_eq!(drv.output_frequency(), Err(BtsError::Hal(bts7960::MockError)));
}
