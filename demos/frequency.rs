//! Exercises the optional PWM frequency control surface against the software
//! simulation, which accepts 1 kHz to 100 kHz by default.
//!
//! Run with `cargo run --example frequency`.

use bts7960::{Bts7960, BtsError, MockHal};

fn main() {
    let mut hal = MockHal::new();

    let mut drv = Bts7960::new(&mut hal);
    drv.initialize().expect("hardware bring-up");

    for requested in [500, 25_000, 250_000] {
        match drv.set_output_frequency(requested) {
            Ok(()) => println!("{requested} Hz applied"),
            Err(BtsError::FrequencyTooLow) => println!("{requested} Hz is too low"),
            Err(BtsError::FrequencyTooHigh) => println!("{requested} Hz is too high"),
            Err(e) => println!("frequency request failed: {e:?}"),
        }
    }

    println!(
        "carrier is now {} Hz",
        drv.output_frequency().expect("frequency read")
    );
    drv.deinitialize().expect("teardown");
}
