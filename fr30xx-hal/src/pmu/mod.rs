//! PMU out-of-line (OOL) register access.
//!
//! The PMU register space is not memory mapped. Each byte is reached through a
//! small port in the SYSTEM block: software writes the address (and data, for a
//! write) into `OOL_CTRL` together with `START`, then waits for the hardware to
//! clear `START`.

use crate::pac::pmu::regs::OscCtrl;
use crate::pac::pmu::PMU_REG_OSC_CTRL;
use crate::pac::system::regs::OolCtrl;
use crate::pac::system::System;
use crate::rcc::Error;

/// Polls of `OOL_CTRL.START` before a transfer is declared lost.
const OOL_POLL_LIMIT: u32 = 1_000;

/// Byte-wide access to the PMU register space.
pub trait Ool {
    /// Read one PMU register.
    fn read(&mut self, reg: u8) -> Result<u8, Error>;

    /// Write one PMU register.
    fn write(&mut self, reg: u8, value: u8) -> Result<(), Error>;

    /// Read-modify-write one PMU register.
    fn modify<F>(&mut self, reg: u8, f: F) -> Result<(), Error>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read(reg)?;
        self.write(reg, f(value))
    }

    /// Read-modify-write the oscillator control register.
    fn modify_osc_ctrl<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut OscCtrl),
    {
        self.modify(PMU_REG_OSC_CTRL, |raw| {
            let mut osc = OscCtrl(raw);
            f(&mut osc);
            osc.0
        })
    }

    /// Read the oscillator control register.
    fn osc_ctrl(&mut self) -> Result<OscCtrl, Error> {
        self.read(PMU_REG_OSC_CTRL).map(OscCtrl)
    }
}

impl<T: Ool + ?Sized> Ool for &mut T {
    fn read(&mut self, reg: u8) -> Result<u8, Error> {
        T::read(self, reg)
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        T::write(self, reg, value)
    }
}

/// OOL port driver on top of the SYSTEM block.
pub struct OolPort {
    regs: System,
}

impl OolPort {
    pub(crate) fn from_regs(regs: System) -> Self {
        Self { regs }
    }

    fn transfer(&mut self, mut ctrl: OolCtrl) -> Result<(), Error> {
        ctrl.set_start(true);
        self.regs.ool_ctrl().write_value(ctrl);

        wait_while(|| self.regs.ool_ctrl().read().start(), OOL_POLL_LIMIT).map_err(|_| {
            warn!("pmu: ool transfer to {:#x} timed out", ctrl.addr());
            Error::Timeout { reg: ctrl.addr() }
        })
    }
}

impl Ool for OolPort {
    fn read(&mut self, reg: u8) -> Result<u8, Error> {
        let mut ctrl = OolCtrl::default();
        ctrl.set_addr(reg);
        ctrl.set_write(false);
        self.transfer(ctrl)?;
        Ok(self.regs.ool_rdata().read() as u8)
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        let mut ctrl = OolCtrl::default();
        ctrl.set_addr(reg);
        ctrl.set_wdata(value);
        ctrl.set_write(true);
        self.transfer(ctrl)
    }
}

/// Spins while `condition` holds, at most `limit` polls.
fn wait_while<F>(mut condition: F, limit: u32) -> Result<(), ()>
where
    F: FnMut() -> bool,
{
    for _ in 0..limit {
        if !condition() {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(())
}
