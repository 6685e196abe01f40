//! Clock and PLL configuration.
//!
//! [`ClockManager`] drives the SYSTEM clock registers. [`init`] runs the boot
//! configuration once and publishes the resulting [`Clocks`] for the
//! frequency getters below.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

mod clock;
pub use clock::*;

mod clock_config;
pub use clock_config::*;

mod clock_read;
pub use clock_read::PeripheralClock;

mod math;
pub use math::{aupll_divider, gcd, mul_mod, spll_divider, PllDivider, FRAC_FULL_SCALE};

mod pll;
pub use pll::*;

pub use crate::pac::system::vals;

use crate::time::Hertz;

#[cfg(test)]
mod tests;

/// Clock configuration error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A parameter is outside what the hardware accepts.
    /// Nothing was written.
    InvalidParameter { reason: &'static str },
    /// The PMU did not complete an out-of-line access to `reg`.
    Timeout { reg: u8 },
    /// Raw peripheral clock index with no matching domain.
    UnsupportedDomain { index: u8 },
}

impl Error {
    /// Compact code for the diagnostic latch.
    pub const fn code(&self) -> u16 {
        match self {
            Error::InvalidParameter { .. } => 0x0100,
            Error::Timeout { reg } => 0x0200 | *reg as u16,
            Error::UnsupportedDomain { index } => 0x0300 | *index as u16,
        }
    }
}

static CLOCK_FREQS: Mutex<CriticalSectionRawMutex, Cell<Option<Clocks>>> = Mutex::new(Cell::new(None));

/// Publish `freqs` for the getters in this module.
pub(crate) fn set_freqs(freqs: Clocks) {
    debug!("rcc: publishing {:?}", freqs);
    CLOCK_FREQS.lock(|f| f.set(Some(freqs)));
}

/// Published clock frequencies, `None` before [`crate::init`].
pub fn try_clocks() -> Option<Clocks> {
    CLOCK_FREQS.lock(|f| f.get())
}

/// Published clock frequencies.
///
/// Panics if called before [`crate::init`].
pub fn clocks() -> Clocks {
    match try_clocks() {
        Some(clocks) => clocks,
        None => panic!("rcc: clocks read before init"),
    }
}

/// MCU core clock.
pub fn get_core_clock() -> Option<Hertz> {
    clocks().core.to_hertz()
}

/// DSP clock.
pub fn get_dsp_clock() -> Option<Hertz> {
    clocks().dsp.to_hertz()
}

/// Core high-speed clock (crystal or RC).
pub fn get_core_hsclk() -> Option<Hertz> {
    clocks().core_hsclk.to_hertz()
}

/// SPLL output, `None` while powered down.
pub fn get_spll_clock() -> Option<Hertz> {
    clocks().spll.to_hertz()
}

/// AUPLL output, `None` while powered down.
pub fn get_aupll_clock() -> Option<Hertz> {
    clocks().aupll.to_hertz()
}

/// Low-power RC oscillator.
pub fn get_lprc_clock() -> Option<Hertz> {
    clocks().lprc.to_hertz()
}

/// Effective clock of a peripheral domain.
pub fn peripheral_clock(domain: PeripheralClock) -> Option<Hertz> {
    clock_read::read_peripheral_clock(crate::pac::SYSTEM, &clocks(), domain)
}

/// Same as [`peripheral_clock`], for a raw domain index.
pub fn peripheral_clock_by_index(index: u8) -> Result<Option<Hertz>, Error> {
    let domain = PeripheralClock::try_from(index)?;
    Ok(peripheral_clock(domain))
}

/// Apply the boot clock configuration and publish the result.
///
/// Every completed step is published as it finishes. On failure the error is
/// latched into `SW_DIAG`; a rejected configuration publishes nothing.
///
/// # Safety
///
/// Must run once, before any driver reads the clocks.
pub(crate) unsafe fn init(config: Config) -> Result<Clocks, Error> {
    let system = unsafe { crate::peripherals::SYSTEM::steal() };
    let mut rcc = ClockManager::new(system, crate::Delay, config.hse);

    match rcc.apply(&config) {
        Ok(()) => Ok(*rcc.clocks()),
        Err(e) => {
            error!("rcc: clock configuration failed: {:?}", e);
            rcc.latch_failure(e);
            Err(e)
        }
    }
}
