//! SPLL / AUPLL parameters and analog start-up recipes.

use core::ops::RangeInclusive;

use embedded_hal_1::delay::DelayNs;

use super::math::{mul_mod, pll_freq, FRAC_FULL_SCALE};
use super::Error;
use crate::pac::system::Pll;
use crate::time::Hertz;

/// System PLL: `N + M / 65536` times the crystal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Spll {
    pub n: u8,
    pub m: u16,
}

impl Spll {
    pub const fn new(n: u8, m: u16) -> Self {
        Self { n, m }
    }

    /// Output frequency for the given crystal.
    pub fn freq(&self, hse: Hertz) -> Result<Hertz, Error> {
        let fraction = mul_mod(self.m as u32, hse.0, FRAC_FULL_SCALE).ok_or(Error::InvalidParameter {
            reason: "SPLL fraction out of range",
        })?;
        pll_freq(self.n, hse.0, fraction).map(Hertz)
    }
}

/// Audio PLL: `N + K / D` times the crystal, `K <= D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Aupll {
    pub n: u8,
    pub k: u32,
    pub d: u32,
}

impl Aupll {
    pub const fn new(n: u8, k: u32, d: u32) -> Self {
        Self { n, k, d }
    }

    pub(crate) fn check_fraction(&self) -> Result<(), Error> {
        if self.k > self.d {
            return Err(Error::InvalidParameter {
                reason: "AUPLL K exceeds D",
            });
        }
        Ok(())
    }

    /// Output frequency for the given crystal.
    ///
    /// Uses `K`/`D` as given, not the reduced fraction written to hardware.
    pub fn freq(&self, hse: Hertz) -> Result<Hertz, Error> {
        if self.k == 0 || self.d == 0 {
            return pll_freq(self.n, hse.0, 0).map(Hertz);
        }
        let fraction = mul_mod(self.k, hse.0, self.d).ok_or(Error::InvalidParameter {
            reason: "AUPLL fraction out of range",
        })?;
        pll_freq(self.n, hse.0, fraction).map(Hertz)
    }
}

// =============================================================================
// Analog recipes
// =============================================================================

/// One bias ramp: alternate `step_a`/`step_b`, then hold `settle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerRamp {
    pub step_a: u32,
    pub step_b: u32,
    pub settle: u32,
}

/// Analog constants of one PLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalogRecipe {
    pub analog0: u32,
    pub analog1: u32,
    pub power_down: u32,
    /// Ramp used when the fractional field is non-zero.
    pub fractional: PowerRamp,
    /// Ramp used for an integer multiplier.
    pub integer: PowerRamp,
}

impl AnalogRecipe {
    pub const fn ramp(&self, fractional: bool) -> &PowerRamp {
        if fractional {
            &self.fractional
        } else {
            &self.integer
        }
    }
}

const SPLL_ANALOG_CFG0: u32 = 0x3C8C_5B21;
const SPLL_ANALOG_CFG1: u32 = 0x0004_A31F;
const SPLL_ANALOG_POWER_DISABLE: u32 = 0x0000_0C00;
const SPLL_ANALOG_POWER_ENABLE_WITH_M_0: u32 = 0x0000_30F0;
const SPLL_ANALOG_POWER_ENABLE_WITH_M_7: u32 = 0x0000_37F0;
const SPLL_ANALOG_POWER_ENABLE_WITH_M_2: u32 = 0x0000_32F0;
const SPLL_ANALOG_POWER_ENABLE_WITHOUT_M_0: u32 = 0x0000_10F0;
const SPLL_ANALOG_POWER_ENABLE_WITHOUT_M_7: u32 = 0x0000_17F0;
const SPLL_ANALOG_POWER_ENABLE_WITHOUT_M_2: u32 = 0x0000_12F0;

const AUPLL_ANALOG_CFG0: u32 = 0x3C8C_5A21;
const AUPLL_ANALOG_CFG1: u32 = 0x0004_A21F;
const AUPLL_ANALOG_POWER_DISABLE: u32 = 0x0000_0C00;
const AUPLL_ANALOG_POWER_ENABLE_WITH_K_0: u32 = 0x0000_70F0;
const AUPLL_ANALOG_POWER_ENABLE_WITH_K_7: u32 = 0x0000_77F0;
const AUPLL_ANALOG_POWER_ENABLE_WITH_K_2: u32 = 0x0000_72F0;
const AUPLL_ANALOG_POWER_ENABLE_WITHOUT_K_0: u32 = 0x0000_50F0;
const AUPLL_ANALOG_POWER_ENABLE_WITHOUT_K_7: u32 = 0x0000_57F0;
const AUPLL_ANALOG_POWER_ENABLE_WITHOUT_K_2: u32 = 0x0000_52F0;

pub const SPLL_RECIPE: AnalogRecipe = AnalogRecipe {
    analog0: SPLL_ANALOG_CFG0,
    analog1: SPLL_ANALOG_CFG1,
    power_down: SPLL_ANALOG_POWER_DISABLE,
    fractional: PowerRamp {
        step_a: SPLL_ANALOG_POWER_ENABLE_WITH_M_0,
        step_b: SPLL_ANALOG_POWER_ENABLE_WITH_M_7,
        settle: SPLL_ANALOG_POWER_ENABLE_WITH_M_2,
    },
    integer: PowerRamp {
        step_a: SPLL_ANALOG_POWER_ENABLE_WITHOUT_M_0,
        step_b: SPLL_ANALOG_POWER_ENABLE_WITHOUT_M_7,
        settle: SPLL_ANALOG_POWER_ENABLE_WITHOUT_M_2,
    },
};

pub const AUPLL_RECIPE: AnalogRecipe = AnalogRecipe {
    analog0: AUPLL_ANALOG_CFG0,
    analog1: AUPLL_ANALOG_CFG1,
    power_down: AUPLL_ANALOG_POWER_DISABLE,
    fractional: PowerRamp {
        step_a: AUPLL_ANALOG_POWER_ENABLE_WITH_K_0,
        step_b: AUPLL_ANALOG_POWER_ENABLE_WITH_K_7,
        settle: AUPLL_ANALOG_POWER_ENABLE_WITH_K_2,
    },
    integer: PowerRamp {
        step_a: AUPLL_ANALOG_POWER_ENABLE_WITHOUT_K_0,
        step_b: AUPLL_ANALOG_POWER_ENABLE_WITHOUT_K_7,
        settle: AUPLL_ANALOG_POWER_ENABLE_WITHOUT_K_2,
    },
};

// =============================================================================
// Sequencers
// =============================================================================

/// Silicon-revision specific part of the PLL start-up.
///
/// Called with the divider already programmed and the reference clock gated;
/// the caller re-opens the reference clock and waits for lock afterwards.
pub trait PllSequencer {
    /// Integer multipliers this revision accepts.
    fn n_range(&self) -> RangeInclusive<u8>;

    /// Bring up the analog section of `pll`.
    fn power_up<D: DelayNs>(&self, pll: Pll, recipe: &AnalogRecipe, fractional: bool, delay: &mut D);

    fn check_n(&self, n: u8) -> Result<(), Error> {
        if self.n_range().contains(&n) {
            Ok(())
        } else {
            Err(Error::InvalidParameter {
                reason: "PLL N outside the supported range",
            })
        }
    }
}

/// Ramp iterations of the original silicon.
pub const RAMP_STEPS: u32 = 30;
/// Dwell per ramp step.
pub const RAMP_STEP_US: u32 = 20;
/// Single settle wait of the updated silicon.
pub const DIRECT_SETTLE_US: u32 = 50;

/// Original silicon: 30-step bias ramp before settling.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ramped;

impl PllSequencer for Ramped {
    fn n_range(&self) -> RangeInclusive<u8> {
        // `PllDiv.n` is 8 bits and holds up to 2N + 1 half steps
        6..=127
    }

    fn power_up<D: DelayNs>(&self, pll: Pll, recipe: &AnalogRecipe, fractional: bool, delay: &mut D) {
        let ramp = recipe.ramp(fractional);
        for _ in 0..RAMP_STEPS {
            pll.power().write_value(ramp.step_a);
            delay.delay_us(RAMP_STEP_US);
            pll.power().write_value(ramp.step_b);
            delay.delay_us(RAMP_STEP_US);
        }
        pll.power().write_value(ramp.settle);
    }
}

/// Updated silicon: one write of the settle pattern, no ramp.
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl PllSequencer for Direct {
    fn n_range(&self) -> RangeInclusive<u8> {
        6..=10
    }

    fn power_up<D: DelayNs>(&self, pll: Pll, recipe: &AnalogRecipe, fractional: bool, delay: &mut D) {
        pll.power().write_value(recipe.ramp(fractional).settle);
        delay.delay_us(DIRECT_SETTLE_US);
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "chip-update")] {
        /// Sequencer of the silicon revision selected at build time.
        pub type DefaultSequencer = Direct;
    } else {
        /// Sequencer of the silicon revision selected at build time.
        pub type DefaultSequencer = Ramped;
    }
}
