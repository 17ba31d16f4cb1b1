// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Master clock (MCK) and processor clock.
//!
//! MCK is the selected source divided first by the prescaler (a power of two)
//! and then by the master clock divider. The processor clock runs MDIV times
//! faster than MCK.

use kernel::utilities::registers::{FieldValue, LocalRegisterCopy};
use kernel::ErrorCode;

use super::wait::ReadyWait;
use super::Clocks;
use crate::chip_specs::ChipSpecs;
use crate::pmc::{
    MasterClockDivider, MasterClockPrescaler, MasterClockSource, PllaOutputDivider,
    PmcRegisterInterface, PMC_MCKR,
};

impl<'a, Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait>
    Clocks<'a, Regs, Specs, Wait>
{
    /// Get the master clock frequency in Hz.
    ///
    /// The value is computed from the PMC configuration the first time and
    /// remembered until the clock tree changes. A master clock of 0 Hz is
    /// never trusted and is computed again on every query.
    pub fn get_master_clock(&self) -> u32 {
        match self.state.master_clock() {
            Some(frequency) if frequency != 0 => frequency,
            _ => {
                let frequency = self.compute_master_clock();
                self.state.remember_master_clock(frequency);
                frequency
            }
        }
    }

    fn compute_master_clock(&self) -> u32 {
        let mckr = self.registers.mckr();

        let source = match MasterClockSource::from_mckr(mckr) {
            MasterClockSource::SlowClock => self.get_slow_clock(),
            MasterClockSource::MainClock => self.get_main_clock(),
            MasterClockSource::PllaClock => self.get_plla_clock(),
            MasterClockSource::UpllClock => self.get_upll_clock(),
        };

        let prescaled = match MasterClockPrescaler::from_mckr(mckr) {
            Some(prescaler) => prescaler.divide(source),
            None => source,
        };

        MasterClockDivider::from_mckr(mckr).divide(prescaled)
    }

    /// Get the processor clock frequency in Hz: the master clock multiplied
    /// by the ratio of the master clock divider.
    pub fn get_processor_clock(&self) -> u32 {
        self.get_master_clock()
            .saturating_mul(self.get_mck_divider().ratio())
    }

    pub fn get_master_clock_source(&self) -> MasterClockSource {
        MasterClockSource::from_mckr(self.registers.mckr())
    }

    /// Get the master clock prescaler.
    ///
    /// # Returns
    ///
    /// + [Some]\(prescaler\): the current prescaler
    /// + [None]: PMC_MCKR.PRES holds the reserved encoding, which does not divide
    pub fn get_mck_prescaler(&self) -> Option<MasterClockPrescaler> {
        MasterClockPrescaler::from_mckr(self.registers.mckr())
    }

    pub fn get_mck_divider(&self) -> MasterClockDivider {
        MasterClockDivider::from_mckr(self.registers.mckr())
    }

    pub fn get_mck_plla_div(&self) -> PllaOutputDivider {
        if self.registers.mckr().is_set(PMC_MCKR::PLLADIV2) {
            PllaOutputDivider::DivideBy2
        } else {
            PllaOutputDivider::DivideBy1
        }
    }

    fn write_mckr(&self, field: FieldValue<u32, PMC_MCKR::Register>) -> Result<(), ErrorCode> {
        let mckr = self.registers.mckr();
        self.registers
            .set_mckr(LocalRegisterCopy::new(field.modify(mckr.get())));
        self.state.invalidate();

        self.wait_for_master_clock()
    }

    /// Run the master clock from the main clock.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MCKRDY. The new source
    /// is already written.
    pub fn switch_mck_to_main(&self) -> Result<(), ErrorCode> {
        self.write_mckr(MasterClockSource::MainClock.field_value())
    }

    /// Run the master clock from PLLA.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MCKRDY
    pub fn switch_mck_to_pll(&self) -> Result<(), ErrorCode> {
        self.write_mckr(MasterClockSource::PllaClock.field_value())
    }

    /// Run the master clock from the slow clock.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MCKRDY
    pub fn switch_mck_to_slck(&self) -> Result<(), ErrorCode> {
        self.write_mckr(MasterClockSource::SlowClock.field_value())
    }

    /// Run the master clock from the UTMI PLL. The UPLL must be enabled first.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MCKRDY
    pub fn switch_mck_to_upll(&self) -> Result<(), ErrorCode> {
        self.write_mckr(MasterClockSource::UpllClock.field_value())
    }

    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MCKRDY
    pub fn set_mck_prescaler(&self, prescaler: MasterClockPrescaler) -> Result<(), ErrorCode> {
        self.write_mckr(prescaler.field_value())
    }

    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MCKRDY
    pub fn set_mck_divider(&self, divider: MasterClockDivider) -> Result<(), ErrorCode> {
        self.write_mckr(divider.field_value())
    }

    /// Halve the PLLA output, or stop halving it.
    ///
    /// Nothing is written if PMC_MCKR.PLLADIV2 already matches `divider`.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MCKRDY
    pub fn set_mck_plla_div(&self, divider: PllaOutputDivider) -> Result<(), ErrorCode> {
        if self.get_mck_plla_div() == divider {
            return Ok(());
        }

        match divider {
            PllaOutputDivider::DivideBy1 => self.write_mckr(PMC_MCKR::PLLADIV2::CLEAR),
            PllaOutputDivider::DivideBy2 => self.write_mckr(PMC_MCKR::PLLADIV2::SET),
        }
    }
}
