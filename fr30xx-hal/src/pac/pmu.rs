//! PMU registers reached through the out-of-line (OOL) access port.
//!
//! These are byte-wide and are not memory mapped; see [`crate::pmu::Ool`].

/// Oscillator control: crystal/RC enables, core high-speed clock mux,
/// PLL reference clock gates.
pub const PMU_REG_OSC_CTRL: u8 = 0x12;

pub mod regs {
    use bitfield::bitfield;

    bitfield! {
        #[repr(transparent)]
        #[derive(Copy, Clone, Default, PartialEq, Eq)]
        pub struct OscCtrl(u8);
        impl Debug;
        pub xtal_en, set_xtal_en: 0;
        pub rc_en, set_rc_en: 1;
        // 0: crystal, 1: internal RC.
        pub hs_sel_rc, set_hs_sel_rc: 2;
        pub spll_ref_en, set_spll_ref_en: 4;
        pub aupll_ref_en, set_aupll_ref_en: 5;
    }
}
