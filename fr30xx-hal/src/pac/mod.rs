//! FR30xx register blocks used by the clock engine.

#![allow(missing_docs)]

pub mod common;
pub mod pmu;
pub mod system;

pub const SYSTEM_REG_BASE: usize = 0xE005_0000;

pub const SYSTEM: system::System = unsafe { system::System::from_ptr(SYSTEM_REG_BASE as _) };
