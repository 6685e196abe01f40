//! Clock configuration and the [`ClockManager`] that applies it.

use core::marker::PhantomData;

use embedded_hal_1::delay::DelayNs;

use super::clock_read::{read_peripheral_clock, PeripheralClock};
use super::math::{aupll_divider, spll_divider, PllDivider};
use super::pll::{AnalogRecipe, Aupll, DefaultSequencer, PllSequencer, Spll, AUPLL_RECIPE, SPLL_RECIPE};
use super::{set_freqs, try_clocks, Clocks, CoreHsSource, Error, McuClockSource};
use super::{CLK_RC24M_FREQ, HSE_VALUE, RC_STARTUP_US, XTAL_STARTUP_US};
use crate::pac::pmu::regs::OscCtrl;
use crate::pac::system::vals::McuClkSel;
use crate::pac::system::{Pll, System};
use crate::pmu::{Ool, OolPort};
use crate::time::{Hertz, MaybeHertz};
use crate::{pac, peripherals, Peripheral};

/// Upper bound of the caller-supplied PLL lock wait.
pub const PLL_LOCK_WAIT_MAX_US: u32 = 10;
/// Dwell between the analog start-up and re-opening the reference clock.
const PLL_REF_GATE_US: u32 = 20;
/// Dwell after re-opening the reference clock.
const PLL_REF_SETTLE_US: u32 = 100;

/// Marker written to `SW_DIAG` when boot clock configuration fails; the low
/// half carries [`Error::code`].
pub const DIAG_CLOCK_FAULT: u32 = 0xC10C_0000;

/// MCU/DSP/APB clock tree.
///
/// Dividers are written as `div - 1`: SOC/MCU take 1..=16, APB take 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTree {
    pub mcu_source: McuClockSource,
    pub soc_div: u8,
    pub mcu_div: u8,
    pub apb0_div: u8,
    pub apb1_div: u8,
    pub apb2_div: u8,
}

impl ClockTree {
    pub const fn new() -> Self {
        Self {
            mcu_source: McuClockSource::CoreHs,
            soc_div: 1,
            mcu_div: 1,
            apb0_div: 1,
            apb1_div: 1,
            apb2_div: 1,
        }
    }

    pub const fn with_mcu_source(mut self, mcu_source: McuClockSource) -> Self {
        self.mcu_source = mcu_source;
        self
    }

    pub const fn with_soc_div(mut self, soc_div: u8) -> Self {
        self.soc_div = soc_div;
        self
    }

    pub const fn with_mcu_div(mut self, mcu_div: u8) -> Self {
        self.mcu_div = mcu_div;
        self
    }

    pub const fn with_apb_divs(mut self, apb0: u8, apb1: u8, apb2: u8) -> Self {
        self.apb0_div = apb0;
        self.apb1_div = apb1;
        self.apb2_div = apb2;
        self
    }

    fn check(&self) -> Result<(), Error> {
        if !(1..=16).contains(&self.soc_div) || !(1..=16).contains(&self.mcu_div) {
            return Err(Error::InvalidParameter {
                reason: "SOC/MCU divider outside 1..=16",
            });
        }
        for div in [self.apb0_div, self.apb1_div, self.apb2_div] {
            if !(1..=4).contains(&div) {
                return Err(Error::InvalidParameter {
                    reason: "APB divider outside 1..=4",
                });
            }
        }
        Ok(())
    }
}

impl Default for ClockTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Boot clock configuration.
///
/// The default matches the FR3068E EVB: 24 MHz crystal, SPLL at 192 MHz,
/// AUPLL off, MCU and DSP on the undivided crystal.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct Config {
    /// Crystal frequency.
    pub hse: Hertz,
    /// Core high-speed clock source.
    pub core_hs: CoreHsSource,
    /// SPLL parameters, `None` to power it down.
    pub spll: Option<Spll>,
    /// AUPLL parameters, `None` to power it down.
    pub aupll: Option<Aupll>,
    pub tree: ClockTree,
    /// Extra PLL lock wait, clamped to [`PLL_LOCK_WAIT_MAX_US`].
    pub pll_timeout_us: u32,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            hse: HSE_VALUE,
            core_hs: CoreHsSource::Xtal,
            spll: Some(Spll::new(8, 0)),
            aupll: None,
            tree: ClockTree::new(),
            pll_timeout_us: PLL_LOCK_WAIT_MAX_US,
        }
    }

    pub const fn with_hse(mut self, hse: Hertz) -> Self {
        self.hse = hse;
        self
    }

    pub const fn with_core_hs(mut self, core_hs: CoreHsSource) -> Self {
        self.core_hs = core_hs;
        self
    }

    pub const fn with_spll(mut self, spll: Option<Spll>) -> Self {
        self.spll = spll;
        self
    }

    pub const fn with_aupll(mut self, aupll: Option<Aupll>) -> Self {
        self.aupll = aupll;
        self
    }

    pub const fn with_tree(mut self, tree: ClockTree) -> Self {
        self.tree = tree;
        self
    }

    pub const fn with_pll_timeout_us(mut self, timeout_us: u32) -> Self {
        self.pll_timeout_us = timeout_us;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PllId {
    Spll,
    Aupll,
}

impl PllId {
    fn regs(self, system: System) -> Pll {
        match self {
            PllId::Spll => system.spll(),
            PllId::Aupll => system.aupll(),
        }
    }

    fn recipe(self) -> &'static AnalogRecipe {
        match self {
            PllId::Spll => &SPLL_RECIPE,
            PllId::Aupll => &AUPLL_RECIPE,
        }
    }

    fn set_ref_en(self, osc: &mut OscCtrl, en: bool) {
        match self {
            PllId::Spll => osc.set_spll_ref_en(en),
            PllId::Aupll => osc.set_aupll_ref_en(en),
        }
    }
}

/// Owner of the SYSTEM clock registers and the derived clock state.
///
/// Every configuration call validates its arguments before the first
/// register access; an `InvalidParameter` error leaves both the hardware and
/// [`ClockManager::clocks`] untouched. Register sequences run with
/// interrupts masked.
///
/// A manager attached to the published clocks (see
/// [`ClockManager::with_published_clocks`]) starts from them and republishes
/// after every successful step, so the `rcc::get_*` getters follow runtime
/// reconfiguration.
pub struct ClockManager<'d, O: Ool, D: DelayNs, S: PllSequencer = DefaultSequencer> {
    regs: System,
    ool: O,
    delay: D,
    sequencer: S,
    hse: Hertz,
    clocks: Clocks,
    publishing: bool,
    _phantom: PhantomData<&'d mut peripherals::SYSTEM>,
}

impl<'d, D: DelayNs> ClockManager<'d, OolPort, D, DefaultSequencer> {
    /// Take over the SYSTEM block, with `hse` as the crystal frequency.
    ///
    /// The manager is attached to the published clocks.
    pub fn new(_system: impl Peripheral<P = peripherals::SYSTEM> + 'd, delay: D, hse: Hertz) -> Self {
        Self::from_parts(
            pac::SYSTEM,
            OolPort::from_regs(pac::SYSTEM),
            delay,
            DefaultSequencer::default(),
            hse,
        )
        .with_published_clocks()
    }
}

impl<'d, O: Ool, D: DelayNs, S: PllSequencer> ClockManager<'d, O, D, S> {
    /// Build a manager on an explicit register block and collaborators.
    pub fn from_parts(regs: System, ool: O, delay: D, sequencer: S, hse: Hertz) -> Self {
        Self {
            regs,
            ool,
            delay,
            sequencer,
            hse,
            clocks: Clocks::RESET,
            publishing: false,
            _phantom: PhantomData,
        }
    }

    /// Start from the published clocks, if any, and republish after every
    /// successful configuration step.
    pub fn with_published_clocks(mut self) -> Self {
        if let Some(clocks) = try_clocks() {
            self.clocks = clocks;
        }
        self.publishing = true;
        self
    }

    /// Current derived clock frequencies.
    pub fn clocks(&self) -> &Clocks {
        &self.clocks
    }

    pub fn hse(&self) -> Hertz {
        self.hse
    }

    /// Return the collaborators.
    pub fn release(self) -> (O, D) {
        (self.ool, self.delay)
    }

    /// Check a whole boot configuration against this silicon without
    /// touching hardware.
    pub fn check(&self, config: &Config) -> Result<(), Error> {
        if let Some(spll) = config.spll {
            self.sequencer.check_n(spll.n)?;
            spll_divider(spll.n, spll.m)?;
            spll.freq(config.hse)?;
        }
        if let Some(aupll) = config.aupll {
            aupll.check_fraction()?;
            self.sequencer.check_n(aupll.n)?;
            aupll_divider(aupll.n, aupll.k, aupll.d)?;
            aupll.freq(config.hse)?;
        }
        config.tree.check()?;
        if config.tree.mcu_source == McuClockSource::Spll && config.spll.is_none() {
            return Err(Error::InvalidParameter {
                reason: "MCU clock on SPLL but SPLL is powered down",
            });
        }
        Ok(())
    }

    /// Validate `config`, then apply source, SPLL, AUPLL and tree in order.
    ///
    /// `config.hse` replaces the crystal frequency of this manager. An MCU
    /// running from the SPLL is moved to the core high-speed clock while the
    /// SPLL is reprogrammed.
    pub fn apply(&mut self, config: &Config) -> Result<(), Error> {
        self.check(config)?;
        self.hse = config.hse;
        self.park_mcu();
        self.set_core_hs_source(config.core_hs)?;
        self.configure_spll(config.spll, config.pll_timeout_us)?;
        self.configure_aupll(config.aupll, config.pll_timeout_us)?;
        self.configure_tree(&config.tree)?;
        debug!("rcc: {:?}", self.clocks);
        Ok(())
    }

    /// Select the core high-speed clock, starting its oscillator if needed.
    pub fn set_core_hs_source(&mut self, source: CoreHsSource) -> Result<(), Error> {
        let freq = match source {
            CoreHsSource::Xtal => self.hse,
            CoreHsSource::Rc => CLK_RC24M_FREQ,
        };

        critical_section::with(|_| {
            let osc = self.ool.osc_ctrl()?;
            match source {
                CoreHsSource::Xtal if !osc.xtal_en() => {
                    self.ool.modify_osc_ctrl(|w| w.set_xtal_en(true))?;
                    self.delay.delay_us(XTAL_STARTUP_US);
                }
                CoreHsSource::Rc if !osc.rc_en() => {
                    self.ool.modify_osc_ctrl(|w| w.set_rc_en(true))?;
                    self.delay.delay_us(RC_STARTUP_US);
                }
                _ => {}
            }
            self.ool
                .modify_osc_ctrl(|w| w.set_hs_sel_rc(source == CoreHsSource::Rc))
        })?;

        self.clocks.core_hsclk = freq.into();
        self.derive_core_clocks();
        self.publish();
        debug!("rcc: core_hsclk {} Hz", freq.0);
        Ok(())
    }

    /// Configure the system PLL, `None` powers it down.
    ///
    /// `timeout_us` is an extra lock wait, clamped to [`PLL_LOCK_WAIT_MAX_US`].
    /// Rejected while the MCU clock is taken from the SPLL.
    pub fn configure_spll(&mut self, spll: Option<Spll>, timeout_us: u32) -> Result<(), Error> {
        if self.mcu_on_spll() {
            warn!("rcc: spll busy, mcu clock still selects it");
            return Err(Error::InvalidParameter {
                reason: "SPLL drives the MCU clock",
            });
        }

        let Some(spll) = spll else {
            self.regs.spll().power().write_value(SPLL_RECIPE.power_down);
            self.clocks.spll = MaybeHertz::NONE;
            self.derive_core_clocks();
            self.publish();
            debug!("rcc: spll off");
            return Ok(());
        };

        let (divider, freq) = match self.plan_spll(&spll) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("rcc: rejected spll n={} m={}: {:?}", spll.n, spll.m, e);
                return Err(e);
            }
        };

        critical_section::with(|_| self.start_pll(PllId::Spll, divider, timeout_us))?;

        self.clocks.spll = freq.into();
        self.derive_core_clocks();
        self.publish();
        debug!("rcc: spll {} Hz", freq.0);
        Ok(())
    }

    /// Configure the audio PLL, `None` powers it down.
    ///
    /// `timeout_us` is an extra lock wait, clamped to [`PLL_LOCK_WAIT_MAX_US`].
    pub fn configure_aupll(&mut self, aupll: Option<Aupll>, timeout_us: u32) -> Result<(), Error> {
        let Some(aupll) = aupll else {
            self.regs.aupll().power().write_value(AUPLL_RECIPE.power_down);
            self.clocks.aupll = MaybeHertz::NONE;
            self.publish();
            debug!("rcc: aupll off");
            return Ok(());
        };

        let (divider, freq) = match self.plan_aupll(&aupll) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("rcc: rejected aupll n={} k={} d={}: {:?}", aupll.n, aupll.k, aupll.d, e);
                return Err(e);
            }
        };

        critical_section::with(|_| self.start_pll(PllId::Aupll, divider, timeout_us))?;

        self.clocks.aupll = freq.into();
        self.publish();
        debug!("rcc: aupll {} Hz", freq.0);
        Ok(())
    }

    /// Program the MCU clock source and the SOC/MCU/APB dividers.
    pub fn configure_tree(&mut self, tree: &ClockTree) -> Result<(), Error> {
        tree.check()?;
        if tree.mcu_source == McuClockSource::Spll && self.clocks.spll.to_hertz().is_none() {
            return Err(Error::InvalidParameter {
                reason: "MCU clock on SPLL but SPLL is powered down",
            });
        }

        let sel = match tree.mcu_source {
            McuClockSource::CoreHs => McuClkSel::CoreHs,
            McuClockSource::Spll => McuClkSel::Spll,
        };

        critical_section::with(|_| {
            // dividers first, so the new source never runs undivided
            self.regs.socclk_ctl().modify(|w| {
                w.set_soc_div(tree.soc_div - 1);
                w.set_mcu_div(tree.mcu_div - 1);
                w.set_apb0_div(tree.apb0_div - 1);
                w.set_apb1_div(tree.apb1_div - 1);
                w.set_apb2_div(tree.apb2_div - 1);
            });
            self.regs.socclk_ctl().modify(|w| w.set_mcu_clk_sel(sel.to_bits()));
        });

        self.derive_core_clocks();
        self.publish();
        trace!("rcc: tree {:?}", tree);
        Ok(())
    }

    /// Effective frequency of a peripheral clock domain.
    pub fn peripheral_clock(&self, domain: PeripheralClock) -> Option<Hertz> {
        read_peripheral_clock(self.regs, &self.clocks, domain)
    }

    /// Latch `err` into `SW_DIAG` for a debugger to find.
    pub fn latch_failure(&self, err: Error) {
        self.regs.sw_diag().write_value(DIAG_CLOCK_FAULT | err.code() as u32);
    }

    fn plan_spll(&self, spll: &Spll) -> Result<(PllDivider, Hertz), Error> {
        self.sequencer.check_n(spll.n)?;
        let divider = spll_divider(spll.n, spll.m)?;
        let freq = spll.freq(self.hse)?;
        Ok((divider, freq))
    }

    fn plan_aupll(&self, aupll: &Aupll) -> Result<(PllDivider, Hertz), Error> {
        aupll.check_fraction()?;
        self.sequencer.check_n(aupll.n)?;
        let divider = aupll_divider(aupll.n, aupll.k, aupll.d)?;
        let freq = aupll.freq(self.hse)?;
        Ok((divider, freq))
    }

    fn start_pll(&mut self, id: PllId, divider: PllDivider, timeout_us: u32) -> Result<(), Error> {
        let pll = id.regs(self.regs);
        let recipe = id.recipe();

        self.ool.modify_osc_ctrl(|w| id.set_ref_en(w, false))?;

        pll.analog0().write_value(recipe.analog0);
        pll.analog1().write_value(recipe.analog1);
        pll.div().write(|w| {
            w.set_n(divider.n);
            w.set_frac(divider.frac);
        });
        pll.out().modify(|w| w.set_den(divider.den));

        self.sequencer
            .power_up(pll, recipe, divider.is_fractional(), &mut self.delay);

        self.delay.delay_us(PLL_REF_GATE_US);
        self.ool.modify_osc_ctrl(|w| id.set_ref_en(w, true))?;
        self.delay.delay_us(PLL_REF_SETTLE_US);
        // TODO: poll a lock-detect flag instead once one is documented for this block
        self.delay.delay_us(timeout_us.min(PLL_LOCK_WAIT_MAX_US));

        pll.out().modify(|w| w.set_div2_en(true));
        Ok(())
    }

    fn mcu_on_spll(&self) -> bool {
        McuClkSel::from_bits(self.regs.socclk_ctl().read().mcu_clk_sel()) == McuClkSel::Spll
    }

    /// Move the MCU onto the core high-speed clock, keeping its dividers.
    fn park_mcu(&mut self) {
        if !self.mcu_on_spll() {
            return;
        }
        critical_section::with(|_| {
            self.regs
                .socclk_ctl()
                .modify(|w| w.set_mcu_clk_sel(McuClkSel::CoreHs.to_bits()));
        });
        self.derive_core_clocks();
        self.publish();
        trace!("rcc: mcu parked on core_hsclk");
    }

    fn publish(&self) {
        if self.publishing {
            set_freqs(self.clocks);
        }
    }

    fn derive_core_clocks(&mut self) {
        let ctl = self.regs.socclk_ctl().read();
        let mcu_div = ctl.mcu_div() as u32 + 1;

        let (dsp, core) = match McuClkSel::from_bits(ctl.mcu_clk_sel()) {
            McuClkSel::CoreHs => {
                let hs = self.clocks.core_hsclk.to_hertz();
                (hs, hs.map(|f| f / mcu_div))
            }
            McuClkSel::Spll => {
                let soc_div = ctl.soc_div() as u32 + 1;
                let dsp = self.clocks.spll.to_hertz().map(|f| f / soc_div);
                (dsp, dsp.map(|f| f / mcu_div))
            }
        };

        self.clocks.dsp = dsp.into();
        self.clocks.core = core.into();
    }
}
