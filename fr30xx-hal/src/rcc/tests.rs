use embedded_hal_1::delay::DelayNs;

use super::*;
use crate::pac::pmu::regs::OscCtrl;
use crate::pac::pmu::PMU_REG_OSC_CTRL;
use crate::pac::system::System;
use crate::pmu::{Ool, OolPort};
use crate::time::{Hertz, MaybeHertz};

/// PMU register file that answers immediately and records writes.
struct MockOol {
    regs: [u8; 256],
    writes: Vec<(u8, u8)>,
}

impl MockOol {
    fn new() -> Self {
        Self {
            regs: [0; 256],
            writes: Vec::new(),
        }
    }

    fn with_osc(osc: OscCtrl) -> Self {
        let mut ool = Self::new();
        ool.regs[PMU_REG_OSC_CTRL as usize] = osc.0;
        ool
    }

    fn osc(&self) -> OscCtrl {
        OscCtrl(self.regs[PMU_REG_OSC_CTRL as usize])
    }
}

impl Ool for MockOol {
    fn read(&mut self, reg: u8) -> Result<u8, Error> {
        Ok(self.regs[reg as usize])
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        self.regs[reg as usize] = value;
        self.writes.push((reg, value));
        Ok(())
    }
}

/// Records every requested wait in microseconds.
#[derive(Default)]
struct MockDelay {
    us: Vec<u32>,
}

impl MockDelay {
    fn total_us(&self) -> u32 {
        self.us.iter().sum()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.us.push(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.us.push(us);
    }
}

fn system(image: &mut [u32; 64]) -> System {
    unsafe { System::from_ptr(image.as_mut_ptr() as *mut ()) }
}

fn snapshot(regs: System) -> [u32; 64] {
    let base = regs.as_ptr() as *const u32;
    core::array::from_fn(|i| unsafe { base.add(i).read_volatile() })
}

fn manager<'a, S: PllSequencer>(
    regs: System,
    ool: &'a mut MockOol,
    delay: &'a mut MockDelay,
    sequencer: S,
) -> ClockManager<'static, &'a mut MockOol, &'a mut MockDelay, S> {
    ClockManager::from_parts(regs, ool, delay, sequencer, HSE_VALUE)
}

fn xtal_running() -> OscCtrl {
    let mut osc = OscCtrl::default();
    osc.set_xtal_en(true);
    osc
}

#[test]
fn spll_integer_multiplier() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.configure_spll(Some(Spll::new(8, 0)), 10).unwrap();
    assert_eq!(rcc.clocks().spll, MaybeHertz::from_hz(192_000_000));
    drop(rcc);

    let spll = regs.spll();
    assert_eq!(spll.analog0().read(), SPLL_RECIPE.analog0);
    assert_eq!(spll.analog1().read(), SPLL_RECIPE.analog1);
    assert_eq!(spll.div().read().n(), 16);
    assert_eq!(spll.div().read().frac(), 0);
    assert_eq!(spll.power().read(), SPLL_RECIPE.integer.settle);
    assert!(spll.out().read().div2_en());

    // reference clock gated, then re-opened
    assert_eq!(ool.writes.len(), 2);
    assert!(!OscCtrl(ool.writes[0].1).spll_ref_en());
    assert!(ool.osc().spll_ref_en());
    assert!(!ool.osc().aupll_ref_en());
}

#[test]
fn spll_fraction_carries_into_integer() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.configure_spll(Some(Spll::new(8, 0x8000)), 10).unwrap();
    assert_eq!(rcc.clocks().spll, MaybeHertz::from_hz(192_000_000 + 12_000_183));
    drop(rcc);

    assert_eq!(regs.spll().div().read().n(), 17);
    assert_eq!(regs.spll().div().read().frac(), 1);
    assert_eq!(regs.spll().power().read(), SPLL_RECIPE.fractional.settle);
}

#[test]
fn ramped_timing() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    manager(regs, &mut ool, &mut delay, Ramped)
        .configure_spll(Some(Spll::new(8, 0)), 10)
        .unwrap();

    assert_eq!(delay.us.len(), 2 * RAMP_STEPS as usize + 3);
    assert!(delay.us[..60].iter().all(|&us| us == RAMP_STEP_US));
    assert_eq!(&delay.us[60..], &[20, 100, 10]);
    assert_eq!(delay.total_us(), 1_330);
}

#[test]
fn direct_timing() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    manager(regs, &mut ool, &mut delay, Direct)
        .configure_spll(Some(Spll::new(8, 0)), 10)
        .unwrap();

    assert_eq!(delay.us, vec![DIRECT_SETTLE_US, 20, 100, 10]);
    assert_eq!(regs.spll().power().read(), SPLL_RECIPE.integer.settle);
}

#[test]
fn lock_wait_is_clamped() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Direct);
    rcc.configure_spll(Some(Spll::new(8, 0)), 500).unwrap();
    rcc.configure_spll(Some(Spll::new(8, 0)), 3).unwrap();
    drop(rcc);

    assert_eq!(delay.us[3], PLL_LOCK_WAIT_MAX_US);
    assert_eq!(delay.us[7], 3);
}

#[test]
fn spll_rejects_small_n_without_side_effects() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    let res = rcc.configure_spll(Some(Spll::new(5, 0)), 10);
    assert!(matches!(res, Err(Error::InvalidParameter { .. })));
    assert_eq!(*rcc.clocks(), Clocks::RESET);
    drop(rcc);

    assert_eq!(snapshot(regs), [0u32; 64]);
    assert!(ool.writes.is_empty());
    assert!(delay.us.is_empty());
}

#[test]
fn direct_profile_limits_n() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Direct);
    assert!(rcc.configure_spll(Some(Spll::new(11, 0)), 10).is_err());
    assert!(rcc.configure_aupll(Some(Aupll::new(11, 0, 0)), 10).is_err());
    assert_eq!(*rcc.clocks(), Clocks::RESET);

    rcc.configure_spll(Some(Spll::new(10, 0)), 10).unwrap();
    assert_eq!(rcc.clocks().spll, MaybeHertz::from_hz(240_000_000));
}

#[test]
fn ramped_profile_n_fits_divider_field() {
    assert!(Ramped.check_n(127).is_ok());
    assert!(Ramped.check_n(128).is_err());
    // the largest accepted N plus a carried fraction still fits `PllDiv.n`
    assert_eq!(spll_divider(127, 0xFFFF).map(|d| d.n), Ok(255));
    assert_eq!(aupll_divider(127, 3, 4).map(|d| d.n), Ok(255));
}

#[test]
fn spll_power_down() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.configure_spll(Some(Spll::new(8, 0)), 10).unwrap();
    rcc.configure_spll(None, 10).unwrap();
    assert_eq!(rcc.clocks().spll, MaybeHertz::NONE);
    drop(rcc);

    assert_eq!(regs.spll().power().read(), SPLL_RECIPE.power_down);
    // only the start-up touched the PMU
    assert_eq!(ool.writes.len(), 2);
}

#[test]
fn aupll_zero_fraction() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.configure_aupll(Some(Aupll::new(7, 0, 0)), 10).unwrap();
    assert_eq!(rcc.clocks().aupll, MaybeHertz::from_hz(168_000_000));
    drop(rcc);

    let aupll = regs.aupll();
    assert_eq!(aupll.analog0().read(), AUPLL_RECIPE.analog0);
    assert_eq!(aupll.div().read().n(), 14);
    assert_eq!(aupll.div().read().frac(), 0);
    assert_eq!(aupll.out().read().den(), 0);
    assert_eq!(aupll.power().read(), AUPLL_RECIPE.integer.settle);
    assert!(ool.osc().aupll_ref_en());
    assert!(!ool.osc().spll_ref_en());
}

#[test]
fn aupll_reduced_fraction() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.configure_aupll(Some(Aupll::new(7, 3, 8)), 10).unwrap();
    // 7 * 24 MHz + 3/8 * 24 MHz
    assert_eq!(rcc.clocks().aupll, MaybeHertz::from_hz(177_000_000));
    drop(rcc);

    let aupll = regs.aupll();
    assert_eq!(aupll.div().read().n(), 14);
    assert_eq!(aupll.div().read().frac(), 49151);
    assert_eq!(aupll.out().read().den(), 3);
    assert_eq!(aupll.power().read(), AUPLL_RECIPE.fractional.settle);
}

#[test]
fn aupll_exact_half() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.configure_aupll(Some(Aupll::new(7, 1, 2)), 10).unwrap();
    assert_eq!(rcc.clocks().aupll, MaybeHertz::from_hz(180_000_000));
    drop(rcc);

    assert_eq!(regs.aupll().div().read().n(), 15);
    assert_eq!(regs.aupll().div().read().frac(), 0);
    assert_eq!(regs.aupll().power().read(), AUPLL_RECIPE.integer.settle);
}

#[test]
fn aupll_checks_k_before_n() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    // both K > D and N < 6: the fraction is reported
    let res = rcc.configure_aupll(Some(Aupll::new(3, 9, 8)), 10);
    assert_eq!(
        res,
        Err(Error::InvalidParameter {
            reason: "AUPLL K exceeds D"
        })
    );
    let res = rcc.configure_aupll(Some(Aupll::new(3, 1, 8)), 10);
    assert_eq!(
        res,
        Err(Error::InvalidParameter {
            reason: "PLL N outside the supported range"
        })
    );
    assert_eq!(*rcc.clocks(), Clocks::RESET);
    drop(rcc);

    assert_eq!(snapshot(regs), [0u32; 64]);
    assert!(ool.writes.is_empty());
    assert!(delay.us.is_empty());
}

#[test]
fn tree_on_spll_programs_dividers() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::with_osc(xtal_running());
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.set_core_hs_source(CoreHsSource::Xtal).unwrap();
    rcc.configure_spll(Some(Spll::new(8, 0)), 10).unwrap();
    let tree = ClockTree::new()
        .with_mcu_source(McuClockSource::Spll)
        .with_soc_div(4)
        .with_mcu_div(2)
        .with_apb_divs(1, 2, 3);
    rcc.configure_tree(&tree).unwrap();

    assert_eq!(rcc.clocks().dsp, MaybeHertz::from_hz(48_000_000));
    assert_eq!(rcc.clocks().core, MaybeHertz::from_hz(24_000_000));
    drop(rcc);

    let ctl = regs.socclk_ctl().read();
    assert_eq!(vals::McuClkSel::from_bits(ctl.mcu_clk_sel()), vals::McuClkSel::Spll);
    assert_eq!(ctl.soc_div(), 3);
    assert_eq!(ctl.mcu_div(), 1);
    assert_eq!(ctl.apb0_div(), 0);
    assert_eq!(ctl.apb1_div(), 1);
    assert_eq!(ctl.apb2_div(), 2);
}

#[test]
fn tree_on_core_hs_ignores_soc_div() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::with_osc(xtal_running());
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.set_core_hs_source(CoreHsSource::Xtal).unwrap();
    rcc.configure_tree(&ClockTree::new().with_soc_div(8).with_mcu_div(3))
        .unwrap();

    assert_eq!(rcc.clocks().dsp, MaybeHertz::from_hz(24_000_000));
    assert_eq!(rcc.clocks().core, MaybeHertz::from_hz(8_000_000));
}

#[test]
fn tree_rejects_bad_dividers() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    for tree in [
        ClockTree::new().with_soc_div(0),
        ClockTree::new().with_mcu_div(17),
        ClockTree::new().with_apb_divs(1, 5, 1),
        ClockTree::new().with_apb_divs(0, 1, 1),
        // SPLL is not running
        ClockTree::new().with_mcu_source(McuClockSource::Spll),
    ] {
        assert!(matches!(
            rcc.configure_tree(&tree),
            Err(Error::InvalidParameter { .. })
        ));
    }
    drop(rcc);

    assert_eq!(snapshot(regs), [0u32; 64]);
}

#[test]
fn core_hs_source_starts_oscillators() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.set_core_hs_source(CoreHsSource::Rc).unwrap();
    assert_eq!(rcc.clocks().core_hsclk, MaybeHertz::from_hz(24_000_000));
    rcc.set_core_hs_source(CoreHsSource::Xtal).unwrap();
    // both already running: no start-up wait
    rcc.set_core_hs_source(CoreHsSource::Rc).unwrap();
    rcc.set_core_hs_source(CoreHsSource::Xtal).unwrap();
    drop(rcc);

    assert_eq!(delay.us, vec![RC_STARTUP_US, XTAL_STARTUP_US]);
    let osc = ool.osc();
    assert!(osc.xtal_en());
    assert!(osc.rc_en());
    assert!(!osc.hs_sel_rc());
}

#[test]
fn ool_timeout_propagates() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut delay = MockDelay::default();

    let mut rcc = ClockManager::<'static, _, _, _>::from_parts(
        regs,
        OolPort::from_regs(regs),
        &mut delay,
        Ramped,
        HSE_VALUE,
    );
    assert_eq!(
        rcc.configure_spll(Some(Spll::new(8, 0)), 10),
        Err(Error::Timeout { reg: PMU_REG_OSC_CTRL })
    );
    assert_eq!(rcc.clocks().spll, MaybeHertz::NONE);
}

#[test]
fn boot_configuration_end_to_end() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.apply(&Config::default()).unwrap();

    let clocks = *rcc.clocks();
    assert_eq!(clocks.core_hsclk, MaybeHertz::from_hz(24_000_000));
    assert_eq!(clocks.spll, MaybeHertz::from_hz(192_000_000));
    assert_eq!(clocks.aupll, MaybeHertz::NONE);
    assert_eq!(clocks.core, MaybeHertz::from_hz(24_000_000));
    assert_eq!(clocks.dsp, MaybeHertz::from_hz(24_000_000));

    // UART on the core high-speed clock, undivided
    assert_eq!(
        rcc.peripheral_clock(PeripheralClock::Uart),
        Some(Hertz(24_000_000))
    );
    assert_eq!(
        rcc.peripheral_clock(PeripheralClock::Usb),
        Some(Hertz(48_000_000))
    );
    drop(rcc);

    assert_eq!(delay.us[0], XTAL_STARTUP_US);
    assert_eq!(regs.aupll().power().read(), AUPLL_RECIPE.power_down);
}

#[test]
fn apply_validates_before_writing() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    let config = Config::default().with_aupll(Some(Aupll::new(7, 9, 8)));
    assert!(rcc.apply(&config).is_err());

    let config = Config::default()
        .with_spll(None)
        .with_tree(ClockTree::new().with_mcu_source(McuClockSource::Spll));
    assert!(rcc.apply(&config).is_err());
    assert_eq!(*rcc.clocks(), Clocks::RESET);
    drop(rcc);

    assert_eq!(snapshot(regs), [0u32; 64]);
    assert!(ool.writes.is_empty());
    assert!(delay.us.is_empty());
}

#[test]
fn peripheral_readback_follows_muxes() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.apply(&Config::default()).unwrap();

    regs.clock_sel0().modify(|w| {
        w.set_uart(vals::PeriSel::SpllDiv2.to_bits());
        w.set_qspi0(vals::FastSel::Spll.to_bits());
    });
    regs.block_clock_div0().modify(|w| w.set_uart(1));
    regs.block_clock_div1().modify(|w| w.set_qspi0(3));
    regs.clock_sel1().modify(|w| {
        w.set_pdm(vals::AudioSel::Aupll.to_bits());
        w.set_i2s(vals::AudioSel::Fixed48m.to_bits());
    });
    regs.audio_clock_div().modify(|w| w.set_i2s(5));

    // 192 MHz / 2 / 2
    assert_eq!(
        rcc.peripheral_clock(PeripheralClock::Uart),
        Some(Hertz(48_000_000))
    );
    assert_eq!(
        rcc.peripheral_clock(PeripheralClock::Qspi0),
        Some(Hertz(48_000_000))
    );
    assert_eq!(
        rcc.peripheral_clock(PeripheralClock::I2s),
        Some(Hertz(8_000_000))
    );
    // AUPLL is off
    assert_eq!(rcc.peripheral_clock(PeripheralClock::Pdm), None);
    assert_eq!(
        rcc.peripheral_clock(PeripheralClock::Gpio),
        Some(Hertz(24_000_000))
    );
}

#[test]
fn raw_domain_index() {
    assert_eq!(PeripheralClock::try_from(0), Ok(PeripheralClock::Uart));
    assert_eq!(PeripheralClock::try_from(19), Ok(PeripheralClock::Usb));
    assert_eq!(
        PeripheralClock::try_from(20),
        Err(Error::UnsupportedDomain { index: 20 })
    );
    for (i, domain) in PeripheralClock::ALL.iter().enumerate() {
        assert_eq!(*domain as u8, i as u8);
    }
}

#[test]
fn failure_latch() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.latch_failure(Error::Timeout { reg: 0x12 });
    assert_eq!(regs.sw_diag().read(), 0xC10C_0212);
    rcc.latch_failure(Error::InvalidParameter { reason: "" });
    assert_eq!(regs.sw_diag().read(), DIAG_CLOCK_FAULT | 0x0100);
}

#[test]
fn apply_uses_config_crystal() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::new();
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    rcc.apply(&Config::default().with_hse(Hertz(40_000_000))).unwrap();

    assert_eq!(rcc.hse(), Hertz(40_000_000));
    assert_eq!(rcc.clocks().core_hsclk, MaybeHertz::from_hz(40_000_000));
    assert_eq!(rcc.clocks().spll, MaybeHertz::from_hz(320_000_000));
    assert_eq!(rcc.clocks().core, MaybeHertz::from_hz(40_000_000));
}

#[test]
fn spll_locked_while_mcu_runs_on_it() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::with_osc(xtal_running());
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    let boot = Config::default().with_tree(ClockTree::new().with_mcu_source(McuClockSource::Spll));
    rcc.apply(&boot).unwrap();
    let before = *rcc.clocks();

    for spll in [None, Some(Spll::new(10, 0))] {
        assert_eq!(
            rcc.configure_spll(spll, 10),
            Err(Error::InvalidParameter {
                reason: "SPLL drives the MCU clock"
            })
        );
    }
    assert_eq!(*rcc.clocks(), before);
    drop(rcc);

    assert_eq!(regs.spll().power().read(), SPLL_RECIPE.integer.settle);
    assert_eq!(regs.spll().div().read().n(), 16);
}

#[test]
fn apply_moves_mcu_off_spll_before_reprogramming() {
    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::with_osc(xtal_running());
    let mut delay = MockDelay::default();

    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped);
    let on_spll = ClockTree::new().with_mcu_source(McuClockSource::Spll);
    rcc.apply(&Config::default().with_tree(on_spll)).unwrap();
    assert_eq!(rcc.clocks().core, MaybeHertz::from_hz(192_000_000));

    rcc.apply(
        &Config::default()
            .with_spll(Some(Spll::new(10, 0)))
            .with_tree(on_spll),
    )
    .unwrap();
    assert_eq!(rcc.clocks().spll, MaybeHertz::from_hz(240_000_000));
    assert_eq!(rcc.clocks().core, MaybeHertz::from_hz(240_000_000));
    drop(rcc);

    assert_eq!(
        vals::McuClkSel::from_bits(regs.socclk_ctl().read().mcu_clk_sel()),
        vals::McuClkSel::Spll
    );
    assert_eq!(regs.spll().div().read().n(), 20);
}

// The only test that touches the published clocks.
#[test]
fn published_clocks_follow_reconfiguration() {
    let mut clocks = Clocks::RESET;
    clocks.core_hsclk = MaybeHertz::from_hz(24_000_000);
    clocks.spll = MaybeHertz::from_hz(192_000_000);
    clocks.core = MaybeHertz::from_hz(24_000_000);
    clocks.dsp = MaybeHertz::from_hz(24_000_000);
    set_freqs(clocks);

    assert_eq!(try_clocks(), Some(clocks));
    assert_eq!(get_core_clock(), Some(Hertz(24_000_000)));
    assert_eq!(get_dsp_clock(), Some(Hertz(24_000_000)));
    assert_eq!(get_core_hsclk(), Some(Hertz(24_000_000)));
    assert_eq!(get_spll_clock(), Some(Hertz(192_000_000)));
    assert_eq!(get_aupll_clock(), None);
    assert_eq!(get_lprc_clock(), Some(Hertz(57_000)));

    let mut image = [0u32; 64];
    let regs = system(&mut image);
    let mut ool = MockOol::with_osc(xtal_running());
    let mut delay = MockDelay::default();

    // boot with the MCU on the SPLL
    let on_spll = ClockTree::new().with_mcu_source(McuClockSource::Spll);
    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped).with_published_clocks();
    rcc.apply(&Config::default().with_tree(on_spll)).unwrap();
    drop(rcc);
    assert_eq!(get_core_clock(), Some(Hertz(192_000_000)));

    // a later manager starts from the running SPLL
    let mut rcc = manager(regs, &mut ool, &mut delay, Ramped).with_published_clocks();
    assert_eq!(rcc.clocks().spll, MaybeHertz::from_hz(192_000_000));
    rcc.configure_tree(&on_spll.with_mcu_div(2)).unwrap();
    assert_eq!(get_core_clock(), Some(Hertz(96_000_000)));

    rcc.configure_tree(&ClockTree::new()).unwrap();
    assert_eq!(get_core_clock(), Some(Hertz(24_000_000)));
    rcc.configure_spll(Some(Spll::new(10, 0)), 10).unwrap();
    rcc.configure_tree(&on_spll.with_mcu_div(2)).unwrap();

    assert_eq!(get_spll_clock(), Some(Hertz(240_000_000)));
    assert_eq!(get_dsp_clock(), Some(Hertz(240_000_000)));
    assert_eq!(get_core_clock(), Some(Hertz(120_000_000)));
    assert_eq!(try_clocks(), Some(*rcc.clocks()));
}
