//! SYSTEM block: clock tree control, SPLL/AUPLL control, peripheral clock
//! muxes and dividers, PMU out-of-line access port.

use super::common::{Reg, R, RW};

#[derive(Copy, Clone, Eq, PartialEq)]
pub struct System {
    ptr: *mut u8,
}
unsafe impl Send for System {}
unsafe impl Sync for System {}

impl System {
    #[allow(clippy::missing_safety_doc)]
    #[inline(always)]
    pub const unsafe fn from_ptr(ptr: *mut ()) -> Self {
        Self { ptr: ptr as _ }
    }

    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut () {
        self.ptr as _
    }

    /// MCU clock source select and SOC/MCU/APB dividers.
    #[inline(always)]
    pub const fn socclk_ctl(self) -> Reg<regs::SocclkCtl, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x04usize) as _) }
    }

    /// System PLL.
    #[inline(always)]
    pub const fn spll(self) -> Pll {
        unsafe { Pll::from_ptr(self.ptr.add(0x10usize) as _) }
    }

    /// Audio PLL.
    #[inline(always)]
    pub const fn aupll(self) -> Pll {
        unsafe { Pll::from_ptr(self.ptr.add(0x30usize) as _) }
    }

    /// Source select of the general purpose and fast peripheral domains.
    #[inline(always)]
    pub const fn clock_sel0(self) -> Reg<regs::ClockSel0, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x50usize) as _) }
    }

    /// Source select of the audio domains.
    #[inline(always)]
    pub const fn clock_sel1(self) -> Reg<regs::ClockSel1, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x54usize) as _) }
    }

    #[inline(always)]
    pub const fn block_clock_div0(self) -> Reg<regs::BlockClockDiv0, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x60usize) as _) }
    }

    #[inline(always)]
    pub const fn block_clock_div1(self) -> Reg<regs::BlockClockDiv1, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x64usize) as _) }
    }

    #[inline(always)]
    pub const fn block_clock_div2(self) -> Reg<regs::BlockClockDiv2, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x68usize) as _) }
    }

    #[inline(always)]
    pub const fn audio_clock_div(self) -> Reg<regs::AudioClockDiv, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x6cusize) as _) }
    }

    /// PMU out-of-line access: address, write data, direction, start/busy.
    #[inline(always)]
    pub const fn ool_ctrl(self) -> Reg<regs::OolCtrl, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0xe0usize) as _) }
    }

    /// PMU out-of-line read data, valid once `OOL_CTRL.START` clears.
    #[inline(always)]
    pub const fn ool_rdata(self) -> Reg<u32, R> {
        unsafe { Reg::from_ptr(self.ptr.add(0xe4usize) as _) }
    }

    /// Software diagnostic scratch register, retained across warm reset.
    #[inline(always)]
    pub const fn sw_diag(self) -> Reg<u32, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0xfcusize) as _) }
    }
}

/// One PLL register cluster (`SPLLConfig0..4` / `AUPLLConfig0..4`).
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Pll {
    ptr: *mut u8,
}
unsafe impl Send for Pll {}
unsafe impl Sync for Pll {}

impl Pll {
    #[allow(clippy::missing_safety_doc)]
    #[inline(always)]
    pub const unsafe fn from_ptr(ptr: *mut ()) -> Self {
        Self { ptr: ptr as _ }
    }

    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut () {
        self.ptr as _
    }

    /// Analog configuration word 0 (vendor calibration value).
    #[inline(always)]
    pub const fn analog0(self) -> Reg<u32, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x00usize) as _) }
    }

    /// Analog configuration word 1 (vendor calibration value).
    #[inline(always)]
    pub const fn analog1(self) -> Reg<u32, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x04usize) as _) }
    }

    #[inline(always)]
    pub const fn div(self) -> Reg<regs::PllDiv, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x08usize) as _) }
    }

    /// Analog bias / power enable word.
    #[inline(always)]
    pub const fn power(self) -> Reg<u32, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x0cusize) as _) }
    }

    #[inline(always)]
    pub const fn out(self) -> Reg<regs::PllOut, RW> {
        unsafe { Reg::from_ptr(self.ptr.add(0x10usize) as _) }
    }
}

pub mod regs {
    use bitfield::bitfield;

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct SocclkCtl(u32);
        impl Debug;
        // 0: core high-speed clock, 1: SPLL.
        pub u8, mcu_clk_sel, set_mcu_clk_sel: 0, 0;
        pub u8, soc_div, set_soc_div: 7, 4;
        pub u8, mcu_div, set_mcu_div: 11, 8;
        pub u8, apb0_div, set_apb0_div: 13, 12;
        pub u8, apb1_div, set_apb1_div: 15, 14;
        pub u8, apb2_div, set_apb2_div: 17, 16;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct PllDiv(u32);
        impl Debug;
        // Integer multiplier, in half steps.
        pub u8, n, set_n: 7, 0;
        // Fractional multiplier, 16-bit resolution.
        pub u16, frac, set_frac: 31, 16;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct PllOut(u32);
        impl Debug;
        // Fraction denominator minus one (AUPLL only).
        pub u16, den, set_den: 15, 0;
        // Enable the divide-by-two output tap.
        pub div2_en, set_div2_en: 16;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct ClockSel0(u32);
        impl Debug;
        pub u8, uart, set_uart: 0, 0;
        pub u8, i2c, set_i2c: 1, 1;
        pub u8, timer01, set_timer01: 2, 2;
        pub u8, timer23, set_timer23: 3, 3;
        pub u8, spim0, set_spim0: 4, 4;
        pub u8, spim1, set_spim1: 5, 5;
        pub u8, spis, set_spis: 6, 6;
        pub u8, can, set_can: 7, 7;
        pub u8, spim_x8, set_spim_x8: 9, 8;
        pub u8, sdio, set_sdio: 11, 10;
        pub u8, ospi, set_ospi: 13, 12;
        pub u8, qspi0, set_qspi0: 15, 14;
        pub u8, qspi1, set_qspi1: 17, 16;
        pub u8, display, set_display: 19, 18;
        pub u8, psram, set_psram: 21, 20;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct ClockSel1(u32);
        impl Debug;
        pub u8, pdm, set_pdm: 1, 0;
        pub u8, i2s, set_i2s: 3, 2;
        pub u8, spdif, set_spdif: 5, 4;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct BlockClockDiv0(u32);
        impl Debug;
        pub u8, uart, set_uart: 3, 0;
        pub u8, i2c, set_i2c: 7, 4;
        pub u8, timer01, set_timer01: 11, 8;
        pub u8, timer23, set_timer23: 15, 12;
        pub u8, spim0, set_spim0: 19, 16;
        pub u8, spim1, set_spim1: 23, 20;
        pub u8, spis, set_spis: 27, 24;
        pub u8, can, set_can: 31, 28;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct BlockClockDiv1(u32);
        impl Debug;
        pub u8, spim_x8, set_spim_x8: 3, 0;
        pub u8, sdio, set_sdio: 7, 4;
        pub u8, ospi, set_ospi: 11, 8;
        pub u8, qspi0, set_qspi0: 15, 12;
        pub u8, qspi1, set_qspi1: 19, 16;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct BlockClockDiv2(u32);
        impl Debug;
        pub u8, display, set_display: 7, 0;
        pub u8, psram, set_psram: 11, 8;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct AudioClockDiv(u32);
        impl Debug;
        pub u8, pdm, set_pdm: 7, 0;
        pub u8, i2s, set_i2s: 15, 8;
        pub u8, spdif, set_spdif: 23, 16;
    }

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct OolCtrl(u32);
        impl Debug;
        pub u8, addr, set_addr: 7, 0;
        pub u8, wdata, set_wdata: 15, 8;
        // 1: write cycle, 0: read cycle.
        pub write, set_write: 16;
        // Set by software, cleared by hardware when the cycle completes.
        pub start, set_start: 31;
    }
}

pub mod vals {
    /// MCU clock mux (`SOCCLK_CTL.MCU_CLK_SEL`).
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum McuClkSel {
        CoreHs = 0,
        Spll = 1,
    }

    impl McuClkSel {
        #[inline(always)]
        pub const fn from_bits(val: u8) -> McuClkSel {
            match val & 0x01 {
                0 => McuClkSel::CoreHs,
                _ => McuClkSel::Spll,
            }
        }

        #[inline(always)]
        pub const fn to_bits(self) -> u8 {
            self as u8
        }
    }

    /// One-bit mux of the general purpose peripheral domains.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum PeriSel {
        CoreHs = 0,
        SpllDiv2 = 1,
    }

    impl PeriSel {
        #[inline(always)]
        pub const fn from_bits(val: u8) -> PeriSel {
            match val & 0x01 {
                0 => PeriSel::CoreHs,
                _ => PeriSel::SpllDiv2,
            }
        }

        #[inline(always)]
        pub const fn to_bits(self) -> u8 {
            self as u8
        }
    }

    /// Two-bit mux of the memory / display domains.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum FastSel {
        CoreHs = 0,
        Spll = 1,
        SpllDiv2 = 2,
        Aupll = 3,
    }

    impl FastSel {
        #[inline(always)]
        pub const fn from_bits(val: u8) -> FastSel {
            match val & 0x03 {
                0 => FastSel::CoreHs,
                1 => FastSel::Spll,
                2 => FastSel::SpllDiv2,
                _ => FastSel::Aupll,
            }
        }

        #[inline(always)]
        pub const fn to_bits(self) -> u8 {
            self as u8
        }
    }

    /// Two-bit mux of the audio domains.
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum AudioSel {
        CoreHs = 0,
        Aupll = 1,
        AupllDiv2 = 2,
        Fixed48m = 3,
    }

    impl AudioSel {
        #[inline(always)]
        pub const fn from_bits(val: u8) -> AudioSel {
            match val & 0x03 {
                0 => AudioSel::CoreHs,
                1 => AudioSel::Aupll,
                2 => AudioSel::AupllDiv2,
                _ => AudioSel::Fixed48m,
            }
        }

        #[inline(always)]
        pub const fn to_bits(self) -> u8 {
            self as u8
        }
    }
}
