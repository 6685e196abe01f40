//! Peripheral clock readback.
//!
//! Replays the SYSTEM mux and divider fields of a peripheral domain against
//! the cached PLL/oscillator frequencies. Nothing here writes hardware.

use super::{Clocks, Error};
use crate::pac::system::vals::{AudioSel, FastSel, PeriSel};
use crate::pac::system::System;
use crate::time::Hertz;

/// Peripheral clock domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PeripheralClock {
    Uart = 0,
    Gpio = 1,
    I2c = 2,
    Timer01 = 3,
    Timer23 = 4,
    SpiMaster0 = 5,
    SpiMaster1 = 6,
    SpiSlave = 7,
    SpiMasterX8 = 8,
    Can = 9,
    Sdio = 10,
    Ospi = 11,
    Qspi0 = 12,
    Qspi1 = 13,
    Display = 14,
    Psram = 15,
    Pdm = 16,
    I2s = 17,
    Spdif = 18,
    Usb = 19,
}

impl PeripheralClock {
    pub const ALL: [PeripheralClock; 20] = [
        PeripheralClock::Uart,
        PeripheralClock::Gpio,
        PeripheralClock::I2c,
        PeripheralClock::Timer01,
        PeripheralClock::Timer23,
        PeripheralClock::SpiMaster0,
        PeripheralClock::SpiMaster1,
        PeripheralClock::SpiSlave,
        PeripheralClock::SpiMasterX8,
        PeripheralClock::Can,
        PeripheralClock::Sdio,
        PeripheralClock::Ospi,
        PeripheralClock::Qspi0,
        PeripheralClock::Qspi1,
        PeripheralClock::Display,
        PeripheralClock::Psram,
        PeripheralClock::Pdm,
        PeripheralClock::I2s,
        PeripheralClock::Spdif,
        PeripheralClock::Usb,
    ];
}

impl TryFrom<u8> for PeripheralClock {
    type Error = Error;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(Error::UnsupportedDomain { index })
    }
}

fn spll_div2(regs: System, clocks: &Clocks) -> Option<Hertz> {
    if regs.spll().out().read().div2_en() {
        clocks.spll.to_hertz().map(|f| f / 2u32)
    } else {
        None
    }
}

fn aupll_div2(regs: System, clocks: &Clocks) -> Option<Hertz> {
    if regs.aupll().out().read().div2_en() {
        clocks.aupll.to_hertz().map(|f| f / 2u32)
    } else {
        None
    }
}

fn peri_source(regs: System, clocks: &Clocks, sel: u8) -> Option<Hertz> {
    match PeriSel::from_bits(sel) {
        PeriSel::CoreHs => clocks.core_hsclk.to_hertz(),
        PeriSel::SpllDiv2 => spll_div2(regs, clocks),
    }
}

fn fast_source(regs: System, clocks: &Clocks, sel: u8) -> Option<Hertz> {
    match FastSel::from_bits(sel) {
        FastSel::CoreHs => clocks.core_hsclk.to_hertz(),
        FastSel::Spll => clocks.spll.to_hertz(),
        FastSel::SpllDiv2 => spll_div2(regs, clocks),
        FastSel::Aupll => clocks.aupll.to_hertz(),
    }
}

fn audio_source(regs: System, clocks: &Clocks, sel: u8) -> Option<Hertz> {
    match AudioSel::from_bits(sel) {
        AudioSel::CoreHs => clocks.core_hsclk.to_hertz(),
        AudioSel::Aupll => clocks.aupll.to_hertz(),
        AudioSel::AupllDiv2 => aupll_div2(regs, clocks),
        AudioSel::Fixed48m => clocks.fixed_48m.to_hertz(),
    }
}

/// Effective frequency of `domain`, `None` if its selected source is not running.
pub(crate) fn read_peripheral_clock(regs: System, clocks: &Clocks, domain: PeripheralClock) -> Option<Hertz> {
    let sel0 = regs.clock_sel0().read();
    let sel1 = regs.clock_sel1().read();
    let div0 = regs.block_clock_div0().read();
    let div1 = regs.block_clock_div1().read();
    let div2 = regs.block_clock_div2().read();
    let audio = regs.audio_clock_div().read();

    let (source, div) = match domain {
        PeripheralClock::Uart => (peri_source(regs, clocks, sel0.uart()), div0.uart()),
        // debounce logic runs straight off the high-speed clock
        PeripheralClock::Gpio => (clocks.core_hsclk.to_hertz(), 0),
        PeripheralClock::I2c => (peri_source(regs, clocks, sel0.i2c()), div0.i2c()),
        PeripheralClock::Timer01 => (peri_source(regs, clocks, sel0.timer01()), div0.timer01()),
        PeripheralClock::Timer23 => (peri_source(regs, clocks, sel0.timer23()), div0.timer23()),
        PeripheralClock::SpiMaster0 => (peri_source(regs, clocks, sel0.spim0()), div0.spim0()),
        PeripheralClock::SpiMaster1 => (peri_source(regs, clocks, sel0.spim1()), div0.spim1()),
        PeripheralClock::SpiSlave => (peri_source(regs, clocks, sel0.spis()), div0.spis()),
        PeripheralClock::Can => (peri_source(regs, clocks, sel0.can()), div0.can()),
        PeripheralClock::SpiMasterX8 => (fast_source(regs, clocks, sel0.spim_x8()), div1.spim_x8()),
        PeripheralClock::Sdio => (fast_source(regs, clocks, sel0.sdio()), div1.sdio()),
        PeripheralClock::Ospi => (fast_source(regs, clocks, sel0.ospi()), div1.ospi()),
        PeripheralClock::Qspi0 => (fast_source(regs, clocks, sel0.qspi0()), div1.qspi0()),
        PeripheralClock::Qspi1 => (fast_source(regs, clocks, sel0.qspi1()), div1.qspi1()),
        PeripheralClock::Display => (fast_source(regs, clocks, sel0.display()), div2.display()),
        PeripheralClock::Psram => (fast_source(regs, clocks, sel0.psram()), div2.psram()),
        PeripheralClock::Pdm => (audio_source(regs, clocks, sel1.pdm()), audio.pdm()),
        PeripheralClock::I2s => (audio_source(regs, clocks, sel1.i2s()), audio.i2s()),
        PeripheralClock::Spdif => (audio_source(regs, clocks, sel1.spdif()), audio.spdif()),
        PeripheralClock::Usb => (clocks.fixed_48m.to_hertz(), 0),
    };

    source.map(|f| f / (div as u32 + 1))
}
