// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! A PMC that lives in memory, for host tests.
//!
//! Status bits follow the configuration immediately: a PLL is locked as soon as
//! it has a multiplier, a programmable clock is ready as soon as it is enabled,
//! and so on. Individual status bits can be hung to model hardware that never
//! answers. Every register write is appended to an access log.

use core::cell::Cell;

use kernel::utilities::registers::{FieldValue, LocalRegisterCopy};
use kernel::ErrorCode;

use super::wait::ReadyWait;
use super::Clocks;
use crate::chip_specs::{Sama5d4xSpecs, SAMA5D4_XPLAINED_ULTRA};
use crate::pmc::{
    PmcRegisterInterface, ProgrammableClock, CKGR_MCFR, CKGR_MOR, CKGR_PLLAR, CKGR_UCKR, PMC_MCKR,
    PMC_PCK, PMC_PCR, PMC_PLLICPR, PMC_SR, SYSTEM_CLOCK,
};
use crate::sckc::SCKC_CR;

const LOG_CAPACITY: usize = 256;

/// A register write seen by the emulated PMC.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Access {
    Mckr(u32),
    Mor(u32),
    Pllar(u32),
    Pllicpr(u32),
    Uckr(u32),
    Scer(u32),
    Scdr(u32),
    Pck(ProgrammableClock, u32),
    /// PCR write with CMD clear, only selects the peripheral
    PcrSelect(u32),
    /// PCR write with CMD set
    PcrCommit(u32),
    SckcCr(u32),
}

pub(crate) struct EmulatedPmc {
    pub(crate) mckr: Cell<u32>,
    pub(crate) mor: Cell<u32>,
    pub(crate) pllar: Cell<u32>,
    pub(crate) pllicpr: Cell<u32>,
    pub(crate) uckr: Cell<u32>,
    pub(crate) scsr: Cell<u32>,
    pub(crate) pck: [Cell<u32>; 3],
    pub(crate) sckc_cr: Cell<u32>,
    /// One bit per peripheral ID
    pub(crate) peripherals: Cell<u128>,
    selected: Cell<u32>,
    hung_sr: Cell<u32>,
    hung_mcfr: Cell<bool>,
    stuck_scsr: Cell<u32>,
    log: [Cell<Option<Access>>; LOG_CAPACITY],
    log_len: Cell<usize>,
}

fn bits<R: kernel::utilities::registers::RegisterLongName>(value: FieldValue<u32, R>) -> u32 {
    u32::from(value)
}

impl EmulatedPmc {
    /// A PMC as the ROM code leaves it: master clock on the 12 MHz RC, PLLA
    /// off, every peripheral gated.
    pub(crate) fn new() -> Self {
        Self {
            mckr: Cell::new(bits(PMC_MCKR::CSS::MainClock)),
            mor: Cell::new(bits(CKGR_MOR::MOSCRCEN::SET)),
            pllar: Cell::new(bits(CKGR_PLLAR::PLLACOUNT.val(0x3F))),
            pllicpr: Cell::new(0),
            uckr: Cell::new(0),
            scsr: Cell::new(0),
            pck: [Cell::new(0), Cell::new(0), Cell::new(0)],
            sckc_cr: Cell::new(bits(SCKC_CR::RCEN::SET)),
            peripherals: Cell::new(0),
            selected: Cell::new(0),
            hung_sr: Cell::new(0),
            hung_mcfr: Cell::new(false),
            stuck_scsr: Cell::new(0),
            log: core::array::from_fn(|_| Cell::new(None)),
            log_len: Cell::new(0),
        }
    }

    /// Status bits in `field` never read as set from now on.
    pub(crate) fn hang(&self, field: FieldValue<u32, PMC_SR::Register>) {
        self.hung_sr.set(self.hung_sr.get() | bits(field));
    }

    /// CKGR_MCFR.MAINFRDY never reads as set from now on.
    pub(crate) fn hang_main_frequency_measure(&self) {
        self.hung_mcfr.set(true);
    }

    /// System clocks in `field` keep running when written to PMC_SCDR.
    pub(crate) fn stick(&self, field: FieldValue<u32, SYSTEM_CLOCK::Register>) {
        self.stuck_scsr.set(self.stuck_scsr.get() | bits(field));
    }

    pub(crate) fn is_peripheral_gate_open(&self, id: u32) -> bool {
        self.peripherals.get() & (1 << id) != 0
    }

    pub(crate) fn open_peripheral_gate(&self, id: u32) {
        self.peripherals.set(self.peripherals.get() | (1 << id));
    }

    pub(crate) fn logged(&self, index: usize) -> Option<Access> {
        self.log.get(index).and_then(Cell::get)
    }

    pub(crate) fn log_len(&self) -> usize {
        self.log_len.get()
    }

    pub(crate) fn clear_log(&self) {
        for entry in self.log.iter() {
            entry.set(None);
        }
        self.log_len.set(0);
    }

    /// Number of logged writes matching `predicate`.
    pub(crate) fn count(&self, predicate: impl Fn(Access) -> bool) -> usize {
        self.log
            .iter()
            .filter_map(Cell::get)
            .filter(|access| predicate(*access))
            .count()
    }

    fn record(&self, access: Access) {
        let index = self.log_len.get();
        if let Some(entry) = self.log.get(index) {
            entry.set(Some(access));
            self.log_len.set(index + 1);
        }
    }

    fn pcr_value(&self) -> u32 {
        let id = self.selected.get();
        let mut value = bits(PMC_PCR::PID.val(id));
        if self.is_peripheral_gate_open(id) {
            value |= bits(PMC_PCR::EN::SET);
        }
        value
    }

    fn status(&self) -> u32 {
        let mor: LocalRegisterCopy<u32, CKGR_MOR::Register> = LocalRegisterCopy::new(self.mor.get());
        let pllar: LocalRegisterCopy<u32, CKGR_PLLAR::Register> =
            LocalRegisterCopy::new(self.pllar.get());
        let uckr: LocalRegisterCopy<u32, CKGR_UCKR::Register> =
            LocalRegisterCopy::new(self.uckr.get());
        let scsr: LocalRegisterCopy<u32, SYSTEM_CLOCK::Register> =
            LocalRegisterCopy::new(self.scsr.get());
        let sckc_cr: LocalRegisterCopy<u32, SCKC_CR::Register> =
            LocalRegisterCopy::new(self.sckc_cr.get());

        let mut sr = bits(PMC_SR::MCKRDY::SET + PMC_SR::MOSCSELS::SET);
        if mor.is_set(CKGR_MOR::MOSCXTEN) {
            sr |= bits(PMC_SR::MOSCXTS::SET);
        }
        if mor.is_set(CKGR_MOR::MOSCRCEN) {
            sr |= bits(PMC_SR::MOSCRCS::SET);
        }
        if pllar.read(CKGR_PLLAR::MULA) != 0 {
            sr |= bits(PMC_SR::LOCKA::SET);
        }
        if uckr.is_set(CKGR_UCKR::UPLLEN) {
            sr |= bits(PMC_SR::LOCKU::SET);
        }
        if sckc_cr.is_set(SCKC_CR::OSCSEL) {
            sr |= bits(PMC_SR::OSCSELS::SET);
        }
        if scsr.is_set(SYSTEM_CLOCK::PCK0) {
            sr |= bits(PMC_SR::PCKRDY0::SET);
        }
        if scsr.is_set(SYSTEM_CLOCK::PCK1) {
            sr |= bits(PMC_SR::PCKRDY1::SET);
        }
        if scsr.is_set(SYSTEM_CLOCK::PCK2) {
            sr |= bits(PMC_SR::PCKRDY2::SET);
        }

        sr & !self.hung_sr.get()
    }
}

impl PmcRegisterInterface for EmulatedPmc {
    fn mckr(&self) -> LocalRegisterCopy<u32, PMC_MCKR::Register> {
        LocalRegisterCopy::new(self.mckr.get())
    }

    fn set_mckr(&self, value: LocalRegisterCopy<u32, PMC_MCKR::Register>) {
        self.record(Access::Mckr(value.get()));
        self.mckr.set(value.get());
    }

    fn mor(&self) -> LocalRegisterCopy<u32, CKGR_MOR::Register> {
        LocalRegisterCopy::new(self.mor.get())
    }

    fn set_mor(&self, value: LocalRegisterCopy<u32, CKGR_MOR::Register>) {
        self.record(Access::Mor(value.get()));
        // Writes without the password are ignored, and KEY always reads as 0
        if value.read(CKGR_MOR::KEY) == 0x37 {
            self.mor.set(CKGR_MOR::KEY.val(0).modify(value.get()));
        }
    }

    fn mcfr(&self) -> LocalRegisterCopy<u32, CKGR_MCFR::Register> {
        let mor: LocalRegisterCopy<u32, CKGR_MOR::Register> = LocalRegisterCopy::new(self.mor.get());
        if mor.is_set(CKGR_MOR::MOSCXTEN) && !self.hung_mcfr.get() {
            LocalRegisterCopy::new(bits(CKGR_MCFR::MAINFRDY::SET + CKGR_MCFR::MAINF.val(6000)))
        } else {
            LocalRegisterCopy::new(0)
        }
    }

    fn pllar(&self) -> LocalRegisterCopy<u32, CKGR_PLLAR::Register> {
        LocalRegisterCopy::new(self.pllar.get())
    }

    fn set_pllar(&self, value: LocalRegisterCopy<u32, CKGR_PLLAR::Register>) {
        self.record(Access::Pllar(value.get()));
        self.pllar.set(value.get());
    }

    fn set_pllicpr(&self, value: LocalRegisterCopy<u32, PMC_PLLICPR::Register>) {
        self.record(Access::Pllicpr(value.get()));
        self.pllicpr.set(value.get());
    }

    fn uckr(&self) -> LocalRegisterCopy<u32, CKGR_UCKR::Register> {
        LocalRegisterCopy::new(self.uckr.get())
    }

    fn set_uckr(&self, value: LocalRegisterCopy<u32, CKGR_UCKR::Register>) {
        self.record(Access::Uckr(value.get()));
        self.uckr.set(value.get());
    }

    fn sr(&self) -> LocalRegisterCopy<u32, PMC_SR::Register> {
        LocalRegisterCopy::new(self.status())
    }

    fn scsr(&self) -> LocalRegisterCopy<u32, SYSTEM_CLOCK::Register> {
        LocalRegisterCopy::new(self.scsr.get())
    }

    fn set_scer(&self, value: FieldValue<u32, SYSTEM_CLOCK::Register>) {
        self.record(Access::Scer(bits(value)));
        self.scsr.set(self.scsr.get() | bits(value));
    }

    fn set_scdr(&self, value: FieldValue<u32, SYSTEM_CLOCK::Register>) {
        self.record(Access::Scdr(bits(value)));
        let cleared = bits(value) & !self.stuck_scsr.get();
        self.scsr.set(self.scsr.get() & !cleared);
    }

    fn pck(&self, pck: ProgrammableClock) -> LocalRegisterCopy<u32, PMC_PCK::Register> {
        LocalRegisterCopy::new(self.pck[pck.index()].get())
    }

    fn set_pck(&self, pck: ProgrammableClock, value: LocalRegisterCopy<u32, PMC_PCK::Register>) {
        self.record(Access::Pck(pck, value.get()));
        self.pck[pck.index()].set(value.get());
    }

    fn pcr(&self) -> LocalRegisterCopy<u32, PMC_PCR::Register> {
        LocalRegisterCopy::new(self.pcr_value())
    }

    fn set_pcr(&self, value: LocalRegisterCopy<u32, PMC_PCR::Register>) {
        let id = value.read(PMC_PCR::PID);
        self.selected.set(id);
        if value.is_set(PMC_PCR::CMD) {
            self.record(Access::PcrCommit(value.get()));
            if value.is_set(PMC_PCR::EN) {
                self.peripherals.set(self.peripherals.get() | (1 << id));
            } else {
                self.peripherals.set(self.peripherals.get() & !(1 << id));
            }
        } else {
            self.record(Access::PcrSelect(value.get()));
        }
    }

    fn sckc_cr(&self) -> LocalRegisterCopy<u32, SCKC_CR::Register> {
        LocalRegisterCopy::new(self.sckc_cr.get())
    }

    fn set_sckc_cr(&self, value: LocalRegisterCopy<u32, SCKC_CR::Register>) {
        self.record(Access::SckcCr(value.get()));
        self.sckc_cr.set(value.get());
    }
}

/// A [ReadyWait] that keeps count of what it was asked to do and gives up
/// after `limit` polls.
pub(crate) struct CountingWait {
    pub(crate) waits: Cell<usize>,
    pub(crate) settles: Cell<usize>,
    pub(crate) settled_iterations: Cell<u32>,
    limit: usize,
}

impl CountingWait {
    pub(crate) fn new() -> Self {
        Self {
            waits: Cell::new(0),
            settles: Cell::new(0),
            settled_iterations: Cell::new(0),
            limit: 64,
        }
    }
}

impl ReadyWait for CountingWait {
    fn wait_until<F: FnMut() -> bool>(&self, mut ready: F) -> Result<(), ErrorCode> {
        self.waits.set(self.waits.get() + 1);
        for _ in 0..self.limit {
            if ready() {
                return Ok(());
            }
        }
        Err(ErrorCode::BUSY)
    }

    fn settle(&self, iterations: u32) {
        self.settles.set(self.settles.get() + 1);
        self.settled_iterations
            .set(self.settled_iterations.get() + iterations);
    }
}

pub(crate) type TestClocks<'a> = Clocks<'a, EmulatedPmc, Sama5d4xSpecs, CountingWait>;

/// Clocks for the Xplained Ultra crystals on top of `pmc`.
pub(crate) fn clocks(pmc: &EmulatedPmc) -> TestClocks<'_> {
    Clocks::new_with_wait(pmc, SAMA5D4_XPLAINED_ULTRA, CountingWait::new())
}
