//! Pacing harness for the continuous run loop.
//!
//! Runs an endless counting loop for a fixed wall-clock window at several
//! clock settings and reports the measured instruction rate against the
//! target.
//!
//! ```sh
//! cargo run -p icmc-core --example pacing_harness
//! ```

#![allow(clippy::pedantic, clippy::nursery)]

use icmc_core::{opcode_word, CoreConfig, NullIo, Opcode, Processor, RunOutcome};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::thread;
use std::time::Duration;

const WINDOW: Duration = Duration::from_millis(500);
const CLOCKS_HZ: [u64; 4] = [0, 10_000_000, 1_000_000, 100_000];

fn counting_loop() -> Vec<u16> {
    // loop: inc R0 ; add R1, R1, R0 ; jmp loop
    vec![
        opcode_word(Opcode::IncDec),
        opcode_word(Opcode::Add) | (1 << 7) | (1 << 4),
        opcode_word(Opcode::Jmp),
        0,
    ]
}

fn measure(clock_hz: u64) -> RunOutcome {
    let mut processor = Processor::with_program(
        NullIo,
        CoreConfig {
            clock_hz,
            ..CoreConfig::default()
        },
        &counting_loop(),
    );
    let control = processor.control();
    control.arm();

    let runner = thread::spawn(move || processor.run_until_halt());
    thread::sleep(WINDOW);
    control.stop();

    runner.join().expect("run thread panicked")
}

fn format_rate(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.2}", n)
    }
}

fn main() {
    println!(
        "{:>12} | {:>12} | {:>12} | {:>8}",
        "target", "measured", "steps", "ratio"
    );
    for clock_hz in CLOCKS_HZ {
        let outcome = measure(clock_hz);
        let measured = outcome.instructions_per_second();
        let (target, ratio) = if clock_hz == 0 {
            ("unpaced".to_string(), "-".to_string())
        } else {
            (
                format_rate(clock_hz as f64),
                format!("{:.3}", measured / clock_hz as f64),
            )
        };
        println!(
            "{:>12} | {:>12} | {:>12} | {:>8}",
            target,
            format_rate(measured),
            outcome.steps,
            ratio
        );
    }
}
