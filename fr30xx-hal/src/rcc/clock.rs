//! Clock types, constants, and the derived-clock record.

use crate::time::{Hertz, MaybeHertz};

// =============================================================================
// Constants
// =============================================================================

/// Board crystal. Override through [`super::Config::hse`] on other boards.
pub const HSE_VALUE: Hertz = Hertz(24_000_000);
/// Internal RC oscillator feeding the core high-speed clock.
// NOTE: untrimmed, ±3%
pub const CLK_RC24M_FREQ: Hertz = Hertz(24_000_000);
/// Fixed USB/auxiliary clock.
pub const CLK_FIXED_48M_FREQ: Hertz = Hertz(48_000_000);
/// Low-power RC oscillator.
pub const CLK_LPRC_FREQ: Hertz = Hertz(57_000);

/// Crystal start-up time after `XTAL_EN` is raised.
pub(crate) const XTAL_STARTUP_US: u32 = 1_000;
/// RC start-up time after `RC_EN` is raised.
pub(crate) const RC_STARTUP_US: u32 = 10;

// =============================================================================
// Sources
// =============================================================================

/// Source of the core high-speed clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoreHsSource {
    /// External crystal oscillator (HSE).
    Xtal,
    /// Internal RC oscillator.
    Rc,
}

/// Source of the MCU/DSP clock tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McuClockSource {
    /// `dsp = core_hsclk`, `core = core_hsclk / mcu_div`
    CoreHs,
    /// `dsp = spll / soc_div`, `core = dsp / mcu_div`
    Spll,
}

// =============================================================================
// Clocks struct
// =============================================================================

/// Derived clock frequencies.
///
/// A `NONE` entry means the clock is not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clocks {
    /// Core high-speed clock (crystal or RC).
    pub core_hsclk: MaybeHertz,
    /// System PLL output.
    pub spll: MaybeHertz,
    /// Audio PLL output.
    pub aupll: MaybeHertz,
    /// MCU core clock.
    pub core: MaybeHertz,
    /// DSP clock.
    pub dsp: MaybeHertz,
    // always 48M
    pub fixed_48m: MaybeHertz,
    pub lprc: MaybeHertz,
}

impl Clocks {
    /// State before any configuration call: only the free-running
    /// auxiliary oscillators are known.
    pub const RESET: Self = Self {
        core_hsclk: MaybeHertz::NONE,
        spll: MaybeHertz::NONE,
        aupll: MaybeHertz::NONE,
        core: MaybeHertz::NONE,
        dsp: MaybeHertz::NONE,
        fixed_48m: MaybeHertz::from_hz(CLK_FIXED_48M_FREQ.0),
        lprc: MaybeHertz::from_hz(CLK_LPRC_FREQ.0),
    };
}

impl Default for Clocks {
    fn default() -> Self {
        Self::RESET
    }
}
