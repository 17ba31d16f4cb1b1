// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System clocks: the programmable clock outputs PCK0 to PCK2 and the DDR
//! clock.
//!
//! System clocks are switched on through PMC_SCER and off through PMC_SCDR.
//! PMC_SCSR tells which ones are running.

use kernel::utilities::registers::LocalRegisterCopy;
use kernel::ErrorCode;

use super::wait::ReadyWait;
use super::Clocks;
use crate::chip_specs::ChipSpecs;
use crate::pmc::{PmcRegisterInterface, ProgrammableClock, ProgrammableClockSource};
use crate::pmc::{PMC_PCK, SYSTEM_CLOCK};

impl<'a, Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait>
    Clocks<'a, Regs, Specs, Wait>
{
    /// Select the source and prescaler of a programmable clock.
    ///
    /// The output is stopped first and is left stopped. The frequency of the
    /// output is the source frequency divided by `prescaler + 1`.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the output did not stop. Nothing is written in that case.
    pub fn configure_pck(
        &self,
        pck: ProgrammableClock,
        source: ProgrammableClockSource,
        prescaler: u8,
    ) -> Result<(), ErrorCode> {
        self.disable_pck(pck)?;

        self.registers.set_pck(
            pck,
            LocalRegisterCopy::new(u32::from(
                source.field_value() + PMC_PCK::PRES.val(u32::from(prescaler)),
            )),
        );

        Ok(())
    }

    /// Start a programmable clock output.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.PCKRDYx
    pub fn enable_pck(&self, pck: ProgrammableClock) -> Result<(), ErrorCode> {
        self.registers.set_scer(pck.system_clock());

        self.wait_for_status(|sr| pck.is_ready(sr))
    }

    /// Stop a programmable clock output.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SCSR.PCKx clearing
    pub fn disable_pck(&self, pck: ProgrammableClock) -> Result<(), ErrorCode> {
        self.registers.set_scdr(pck.system_clock());

        self.wait
            .wait_until(|| !pck.is_running(self.registers.scsr()))
    }

    pub fn is_pck_enabled(&self, pck: ProgrammableClock) -> bool {
        pck.is_running(self.registers.scsr())
    }

    /// Get the source of a programmable clock, or [None] if PMC_PCKx.CSS holds
    /// a reserved encoding.
    pub fn get_pck_source(&self, pck: ProgrammableClock) -> Option<ProgrammableClockSource> {
        ProgrammableClockSource::from_pck(self.registers.pck(pck))
    }

    pub fn get_pck_prescaler(&self, pck: ProgrammableClock) -> u8 {
        self.registers.pck(pck).read(PMC_PCK::PRES) as u8
    }

    /// Get the frequency of a programmable clock output in Hz.
    ///
    /// This is what the output runs at once enabled. A reserved source
    /// selection gives 0.
    pub fn get_pck_clock(&self, pck: ProgrammableClock) -> u32 {
        let register = self.registers.pck(pck);

        let source = match ProgrammableClockSource::from_pck(register) {
            Some(ProgrammableClockSource::SlowClock) => self.get_slow_clock(),
            Some(ProgrammableClockSource::MainClock) => self.get_main_clock(),
            Some(ProgrammableClockSource::PllaClock) => self.get_plla_clock(),
            Some(ProgrammableClockSource::UpllClock) => self.get_upll_clock(),
            Some(ProgrammableClockSource::MasterClock) => self.get_master_clock(),
            None => 0,
        };

        source / (register.read(PMC_PCK::PRES) + 1)
    }

    /// Start the DDR clock.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SCSR.DDRCK
    pub fn enable_ddr_clock(&self) -> Result<(), ErrorCode> {
        self.registers.set_scer(SYSTEM_CLOCK::DDRCK::SET);

        self.wait
            .wait_until(|| self.registers.scsr().is_set(SYSTEM_CLOCK::DDRCK))
    }

    /// Stop the DDR clock.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SCSR.DDRCK clearing
    pub fn disable_ddr_clock(&self) -> Result<(), ErrorCode> {
        self.registers.set_scdr(SYSTEM_CLOCK::DDRCK::SET);

        self.wait
            .wait_until(|| !self.registers.scsr().is_set(SYSTEM_CLOCK::DDRCK))
    }

    pub fn is_ddr_clock_enabled(&self) -> bool {
        self.registers.scsr().is_set(SYSTEM_CLOCK::DDRCK)
    }
}

#[cfg(test)]
mod tests {
    use super::super::emulated::{clocks, Access, EmulatedPmc};
    use super::*;
    use crate::pmc::{CKGR_PLLAR, CKGR_UCKR, PMC_MCKR, PMC_SR};

    fn pck_register(source: ProgrammableClockSource, prescaler: u32) -> u32 {
        u32::from(source.field_value() + PMC_PCK::PRES.val(prescaler))
    }

    #[test]
    fn configure_disables_before_writing() {
        let pmc = EmulatedPmc::new();
        pmc.scsr.set(u32::from(SYSTEM_CLOCK::PCK1::SET));
        let clocks = clocks(&pmc);

        assert_eq!(
            clocks.configure_pck(
                ProgrammableClock::Pck1,
                ProgrammableClockSource::MainClock,
                3
            ),
            Ok(())
        );

        assert_eq!(pmc.log_len(), 2);
        assert_eq!(
            pmc.logged(0),
            Some(Access::Scdr(u32::from(SYSTEM_CLOCK::PCK1::SET)))
        );
        assert_eq!(
            pmc.logged(1),
            Some(Access::Pck(
                ProgrammableClock::Pck1,
                pck_register(ProgrammableClockSource::MainClock, 3)
            ))
        );
        assert!(!clocks.is_pck_enabled(ProgrammableClock::Pck1));
        assert_eq!(
            clocks.get_pck_source(ProgrammableClock::Pck1),
            Some(ProgrammableClockSource::MainClock)
        );
        assert_eq!(clocks.get_pck_prescaler(ProgrammableClock::Pck1), 3);
    }

    #[test]
    fn configure_stops_if_the_output_keeps_running() {
        let pmc = EmulatedPmc::new();
        pmc.scsr.set(u32::from(SYSTEM_CLOCK::PCK0::SET));
        pmc.stick(SYSTEM_CLOCK::PCK0::SET);
        let clocks = clocks(&pmc);

        assert_eq!(
            clocks.configure_pck(
                ProgrammableClock::Pck0,
                ProgrammableClockSource::SlowClock,
                0
            ),
            Err(ErrorCode::BUSY)
        );
        assert_eq!(pmc.count(|access| matches!(access, Access::Pck(..))), 0);
    }

    #[test]
    fn enable_and_disable_follow_the_status_registers() {
        let pmc = EmulatedPmc::new();
        let clocks = clocks(&pmc);

        for pck in ProgrammableClock::ALL {
            assert_eq!(clocks.enable_pck(pck), Ok(()));
            assert!(clocks.is_pck_enabled(pck));
        }
        assert_eq!(
            pmc.logged(2),
            Some(Access::Scer(u32::from(SYSTEM_CLOCK::PCK2::SET)))
        );

        assert_eq!(clocks.disable_pck(ProgrammableClock::Pck0), Ok(()));
        assert!(!clocks.is_pck_enabled(ProgrammableClock::Pck0));
        assert!(clocks.is_pck_enabled(ProgrammableClock::Pck1));
    }

    #[test]
    fn hung_ready_bit_reports_busy() {
        let pmc = EmulatedPmc::new();
        pmc.hang(PMC_SR::PCKRDY2::SET);
        let clocks = clocks(&pmc);

        assert_eq!(clocks.enable_pck(ProgrammableClock::Pck2), Err(ErrorCode::BUSY));
        assert_eq!(clocks.enable_pck(ProgrammableClock::Pck1), Ok(()));
    }

    #[test]
    fn pck_frequency_divides_by_prescaler_plus_one() {
        let pmc = EmulatedPmc::new();
        let clocks = clocks(&pmc);

        pmc.pck[0].set(pck_register(ProgrammableClockSource::SlowClock, 0));
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck0), 32_000);

        pmc.pck[0].set(pck_register(ProgrammableClockSource::MainClock, 2));
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck0), 4_000_000);

        pmc.pck[0].set(pck_register(ProgrammableClockSource::MainClock, 255));
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck0), 46_875);
    }

    #[test]
    fn pck_sources() {
        let pmc = EmulatedPmc::new();
        pmc.pllar.set(u32::from(
            CKGR_PLLAR::ONE::SET + CKGR_PLLAR::MULA.val(87) + CKGR_PLLAR::DIVA.val(1),
        ));
        pmc.uckr.set(u32::from(CKGR_UCKR::UPLLEN::SET));
        pmc.mckr.set(u32::from(
            PMC_MCKR::CSS::MainClock + PMC_MCKR::PRES::ClockDiv2,
        ));
        let clocks = clocks(&pmc);

        pmc.pck[1].set(pck_register(ProgrammableClockSource::PllaClock, 0));
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck1), 1_056_000_000);

        pmc.pck[1].set(pck_register(ProgrammableClockSource::UpllClock, 9));
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck1), 48_000_000);

        pmc.pck[1].set(pck_register(ProgrammableClockSource::MasterClock, 1));
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck1), 3_000_000);

        pmc.pck[1].set(u32::from(PMC_PCK::CSS.val(6)));
        assert_eq!(clocks.get_pck_source(ProgrammableClock::Pck1), None);
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck1), 0);
    }

    #[test]
    fn pck_frequency_is_never_remembered() {
        let pmc = EmulatedPmc::new();
        let clocks = clocks(&pmc);

        pmc.pck[2].set(pck_register(ProgrammableClockSource::MainClock, 0));
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck2), 12_000_000);

        pmc.pck[2].set(pck_register(ProgrammableClockSource::MainClock, 1));
        assert_eq!(clocks.get_pck_clock(ProgrammableClock::Pck2), 6_000_000);
    }

    #[test]
    fn ddr_clock() {
        let pmc = EmulatedPmc::new();
        let clocks = clocks(&pmc);

        assert_eq!(clocks.enable_ddr_clock(), Ok(()));
        assert!(clocks.is_ddr_clock_enabled());
        assert_eq!(
            pmc.logged(0),
            Some(Access::Scer(u32::from(SYSTEM_CLOCK::DDRCK::SET)))
        );

        assert_eq!(clocks.disable_ddr_clock(), Ok(()));
        assert!(!clocks.is_ddr_clock_enabled());

        pmc.stick(SYSTEM_CLOCK::DDRCK::SET);
        assert_eq!(clocks.enable_ddr_clock(), Ok(()));
        assert_eq!(clocks.disable_ddr_clock(), Err(ErrorCode::BUSY));
    }
}
