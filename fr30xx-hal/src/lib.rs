#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]
#![allow(unsafe_op_in_unsafe_fn)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod pac;
pub mod pmu;
pub mod rcc;
pub mod time;

// Reexports
pub use embassy_hal_internal::{into_ref, Peripheral, PeripheralRef};

embassy_hal_internal::peripherals! {
    SYSTEM,
}

/// HAL configuration for FR30xx
pub mod config {
    use crate::rcc;

    /// HAL configuration passed when initializing.
    #[derive(Debug, Clone, Copy, Default)]
    #[non_exhaustive]
    pub struct Config {
        pub rcc: rcc::Config,
    }

    impl Config {
        pub const fn with_rcc(mut self, rcc: rcc::Config) -> Self {
            self.rcc = rcc;
            self
        }
    }
}
pub use config::Config;

/// Initialize the `fr30xx-hal` with the provided configuration.
///
/// This returns the peripheral singletons that can be used for creating drivers.
/// A clock configuration failure is returned after being latched into
/// `SW_DIAG`; only the steps completed before it are published.
///
/// This should only be called once at startup, otherwise it panics.
pub fn init(config: Config) -> Result<Peripherals, rcc::Error> {
    // Do this first, so that it panics if user is calling `init` a second time
    // before doing anything important.
    let p = Peripherals::take();

    unsafe {
        rcc::init(config.rcc)?;
    }
    Ok(p)
}

/// Performs a busy-wait delay for a specified number of microseconds, using the `cortex-m::asm::delay` function.
///
/// Before [`init`] publishes the clocks the core is assumed to run from the RC oscillator.
pub fn cortex_m_blocking_delay_us(us: u32) {
    let freq = rcc::try_clocks()
        .and_then(|c| c.core.to_hertz())
        .unwrap_or(rcc::CLK_RC24M_FREQ)
        .0 as u64;
    let cycles = freq * us as u64 / 1_000_000;
    cortex_m::asm::delay(cycles as u32);
}

/// Performs a busy-wait delay for a specified number of microseconds.
pub fn blocking_delay_us(us: u32) {
    #[cfg(feature = "time")]
    embassy_time::block_for(embassy_time::Duration::from_micros(us as u64));
    #[cfg(not(feature = "time"))]
    cortex_m_blocking_delay_us(us);
}

/// Busy-wait delay provider backed by [`blocking_delay_us`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Delay;

impl embedded_hal_1::delay::DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        blocking_delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        blocking_delay_us(us);
    }
}

impl embedded_hal_02::blocking::delay::DelayUs<u32> for Delay {
    fn delay_us(&mut self, us: u32) {
        blocking_delay_us(us);
    }
}

impl embedded_hal_02::blocking::delay::DelayMs<u32> for Delay {
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            blocking_delay_us(1_000);
        }
    }
}
