//! Walks the blocking driver through a full lifecycle against the software
//! simulation: bring-up, enabling the output stage, duty-cycle control,
//! current sensing, a simulated fault, and teardown.
//!
//! Run with `cargo run --example lifecycle`.

use bts7960::{Bts7960, BtsError, MockHal};

fn main() {
    let mut hal = MockHal::new();
    hal.current_sense_voltage = 150; // millivolts on the IS pin

    {
        let mut drv = Bts7960::new(&mut hal);
        drv.initialize().expect("hardware bring-up");
        println!("initialized: {:?}", drv.thresholds().unwrap());

        drv.enable().expect("enable pin write");
        drv.set_power_percentage(40).expect("duty cycle write");
        println!(
            "output enabled at {} % duty",
            drv.power_percentage().expect("duty cycle read")
        );

        let status = drv.status().expect("current measurement");
        println!("load current: {} mA", status.current);

        drv.disable().expect("enable pin write");
        drv.deinitialize().expect("teardown");
    }

    // Push the IS pin into the fault band and run another cycle.
    hal.current_sense_voltage = 4_400;
    {
        let mut drv = Bts7960::new(&mut hal);
        drv.initialize().expect("hardware bring-up");
        drv.enable().expect("enable pin write");

        match drv.status() {
            Err(BtsError::FaultDetected) => {
                println!("fault detected, shutting the output down");
                drv.disable().expect("enable pin write");
            }
            other => println!("unexpected outcome: {other:?}"),
        }

        drv.deinitialize().expect("teardown");
    }
}
