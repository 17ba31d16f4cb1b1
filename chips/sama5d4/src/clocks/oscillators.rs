// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Slow clock and main clock oscillators.
//!
//! Both clocks can run from an on-chip RC oscillator or from a crystal fitted
//! on the board. The crystal frequencies come from the
//! [BoardOscillators](crate::chip_specs::BoardOscillators) the clock tree was
//! created with.

use kernel::utilities::registers::{FieldValue, LocalRegisterCopy};
use kernel::ErrorCode;

use super::wait::ReadyWait;
use super::Clocks;
use crate::chip_specs::ChipSpecs;
use crate::pmc::{MainClockOscillator, MasterClockSource, PmcRegisterInterface, CKGR_MCFR};
use crate::pmc::{CKGR_MOR, PMC_SR};
use crate::sckc::SlowClockOscillator;

/// Spin iterations after changing SCKC_CR.OSCSEL, long enough for the five
/// slow clock cycles the selection needs to resynchronize.
pub const SLOW_CLOCK_SETTLE_SPINS: u32 = 0x1000;

impl<'a, Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait>
    Clocks<'a, Regs, Specs, Wait>
{
    pub fn get_slow_clock_oscillator(&self) -> SlowClockOscillator {
        SlowClockOscillator::from_cr(self.registers.sckc_cr())
    }

    /// Get the slow clock frequency in Hz.
    pub fn get_slow_clock(&self) -> u32 {
        match self.get_slow_clock_oscillator() {
            SlowClockOscillator::InternalRc => Specs::SLOW_CLOCK_INT_OSC_HZ,
            SlowClockOscillator::ExternalCrystal => self.oscillators.slow_clock_ext_osc_hz,
        }
    }

    pub fn get_main_clock_oscillator(&self) -> MainClockOscillator {
        MainClockOscillator::from_mor(self.registers.mor())
    }

    /// Get the main clock frequency in Hz.
    pub fn get_main_clock(&self) -> u32 {
        match self.get_main_clock_oscillator() {
            MainClockOscillator::InternalRc => Specs::MAIN_CLOCK_INT_OSC_HZ,
            MainClockOscillator::ExternalCrystal => self.oscillators.main_clock_ext_osc_hz,
        }
    }

    /// Drive the slow clock from `oscillator`.
    ///
    /// The PMC cannot keep running the master clock from the slow clock while
    /// the selection changes. If it does, the master clock moves to the main
    /// clock for the duration of the change and comes back afterwards.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MCKRDY while moving
    /// the master clock. The master clock may be left on the main clock.
    pub fn select_slow_clock_oscillator(
        &self,
        oscillator: SlowClockOscillator,
    ) -> Result<(), ErrorCode> {
        let on_slow_clock = self.get_master_clock_source() == MasterClockSource::SlowClock;
        if on_slow_clock {
            self.switch_mck_to_main()?;
        }

        let cr = self.registers.sckc_cr();
        self.registers
            .set_sckc_cr(LocalRegisterCopy::new(oscillator.field_value().modify(cr.get())));
        self.state.invalidate();

        self.wait.settle(SLOW_CLOCK_SETTLE_SPINS);

        if on_slow_clock {
            self.switch_mck_to_slck()?;
        }

        Ok(())
    }

    /// Drive the slow clock from the 32768 Hz crystal.
    ///
    /// # Errors
    ///
    /// See [Clocks::select_slow_clock_oscillator].
    pub fn select_external_crystal(&self) -> Result<(), ErrorCode> {
        self.select_slow_clock_oscillator(SlowClockOscillator::ExternalCrystal)
    }

    /// Drive the slow clock from the 32 kHz RC oscillator.
    ///
    /// # Errors
    ///
    /// See [Clocks::select_slow_clock_oscillator].
    pub fn select_internal_crystal(&self) -> Result<(), ErrorCode> {
        self.select_slow_clock_oscillator(SlowClockOscillator::InternalRc)
    }

    fn write_mor(&self, field: FieldValue<u32, CKGR_MOR::Register>) {
        let mor = self.registers.mor();
        self.registers.set_mor(LocalRegisterCopy::new(
            (field + CKGR_MOR::KEY::PASSWD).modify(mor.get()),
        ));
    }

    /// Drive the main clock from the crystal.
    ///
    /// Does nothing if the crystal is already selected. Otherwise the crystal
    /// oscillator is started, and the main clock is switched over once its
    /// frequency has been measured.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on CKGR_MCFR.MAINFRDY,
    /// PMC_SR.MOSCSELS or PMC_SR.MCKRDY. Call again to retry the missing steps.
    pub fn select_external_osc(&self) -> Result<(), ErrorCode> {
        if self.get_main_clock_oscillator() == MainClockOscillator::ExternalCrystal {
            return Ok(());
        }

        self.write_mor(CKGR_MOR::MOSCXTEN::SET);

        self.wait
            .wait_until(|| self.registers.mcfr().is_set(CKGR_MCFR::MAINFRDY))?;

        self.write_mor(CKGR_MOR::MOSCSEL::ExternalCrystal);
        self.state.invalidate();

        self.wait_for_status(|sr| sr.is_set(PMC_SR::MOSCSELS))?;
        self.wait_for_master_clock()
    }

    /// Drive the main clock from the 12 MHz RC oscillator and stop the crystal
    /// oscillator.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.MOSCRCS or
    /// PMC_SR.MCKRDY
    pub fn select_internal_osc(&self) -> Result<(), ErrorCode> {
        self.wait_for_status(|sr| sr.is_set(PMC_SR::MOSCRCS))?;

        self.write_mor(CKGR_MOR::MOSCSEL::InternalRc);
        self.state.invalidate();

        self.wait_for_master_clock()?;

        self.write_mor(CKGR_MOR::MOSCXTEN::CLEAR);

        self.wait_for_master_clock()
    }

    /// Drive the main clock from `oscillator`.
    ///
    /// # Errors
    ///
    /// See [Clocks::select_external_osc] and [Clocks::select_internal_osc].
    pub fn select_main_clock_oscillator(
        &self,
        oscillator: MainClockOscillator,
    ) -> Result<(), ErrorCode> {
        match oscillator {
            MainClockOscillator::InternalRc => self.select_internal_osc(),
            MainClockOscillator::ExternalCrystal => self.select_external_osc(),
        }
    }
}
