// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! SAMA5D4x clock tree.
//!
//! The PMC derives every clock of the SoC from four sources: the slow clock
//! (32 kHz RC or crystal), the main clock (12 MHz RC or crystal), PLLA and the
//! UTMI PLL. [Clocks] reads the source selections and dividers back from the
//! hardware to compute frequencies, and wraps every reconfiguration in the
//! sequence the PMC requires.
//!
//! ```text
//!  slow clock ─┐
//!  main clock ─┼─> CSS ─> PRES (/2^k) ─> MDIV ─> MCK ─> peripherals (/1 or /2)
//!  PLLA ───────┤                 └─> processor clock
//!  UPLL ───────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use sama5d4::chip_specs::{PeripheralId, Sama5d4xSpecs, SAMA5D4_XPLAINED_ULTRA};
//! use sama5d4::clocks::Clocks;
//! use sama5d4::pmc::Sama5d4PmcRegisters;
//!
//! static PMC: Sama5d4PmcRegisters = Sama5d4PmcRegisters::new();
//! let clocks: Clocks<_, Sama5d4xSpecs> = Clocks::new(&PMC, SAMA5D4_XPLAINED_ULTRA);
//!
//! let mck_hz = clocks.get_master_clock();
//! clocks.enable_peripheral(PeripheralId::Twi0.id());
//! ```
//!
//! The master clock frequency is remembered after the first query. Every
//! method that changes the clock tree through [Clocks] forgets it again. Code
//! that reprograms the PMC behind the back of [Clocks] must call
//! [Clocks::invalidate].

pub mod master;
pub mod oscillators;
pub mod peripheral;
pub mod pll;
pub mod system;
pub mod wait;

#[cfg(test)]
mod emulated;

use core::marker::PhantomData;

use kernel::debug;
use kernel::utilities::cells::{MapCell, OptionalCell};
use kernel::utilities::registers::LocalRegisterCopy;
use kernel::ErrorCode;

use crate::chip_specs::{BoardOscillators, ChipSpecs};
use crate::pmc::{PmcRegisterInterface, ProgrammableClock, PMC_SR};

use self::peripheral::PcrPort;
use self::wait::{BusyWait, ReadyWait};

/// Every clock source whose frequency [Clocks::get_source_frequency] knows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClockSource {
    SlowClockInternal,
    SlowClockExternal,
    MainClockInternal,
    MainClockExternal,
    Plla,
    Upll,
    ProgrammableClockOutput(ProgrammableClock),
}

/// State of the clock tree that does not live in the PMC.
pub struct ClockTreeState {
    master_clock: OptionalCell<u32>,
}

impl ClockTreeState {
    pub const fn new() -> Self {
        Self {
            master_clock: OptionalCell::empty(),
        }
    }

    /// The remembered master clock frequency, if any.
    pub fn master_clock(&self) -> Option<u32> {
        self.master_clock.get()
    }

    fn remember_master_clock(&self, frequency: u32) {
        self.master_clock.set(frequency);
    }

    /// Forget the remembered master clock frequency.
    pub fn invalidate(&self) {
        self.master_clock.clear();
    }
}

/// Main clock tree structure
pub struct Clocks<'a, Regs, Specs, Wait = BusyWait> {
    registers: &'a Regs,
    wait: Wait,
    oscillators: BoardOscillators,
    state: ClockTreeState,
    pcr: MapCell<PcrPort<'a, Regs>>,
    _specs: PhantomData<Specs>,
}

impl<'a, Regs: PmcRegisterInterface, Specs: ChipSpecs> Clocks<'a, Regs, Specs, BusyWait> {
    /// Create the clock tree, waiting on the hardware for as long as it takes.
    pub fn new(registers: &'a Regs, oscillators: BoardOscillators) -> Self {
        Self::new_with_wait(registers, oscillators, BusyWait)
    }
}

impl<'a, Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait>
    Clocks<'a, Regs, Specs, Wait>
{
    /// Create the clock tree with a custom wait strategy.
    pub fn new_with_wait(registers: &'a Regs, oscillators: BoardOscillators, wait: Wait) -> Self {
        Self {
            registers,
            wait,
            oscillators,
            state: ClockTreeState::new(),
            pcr: MapCell::new(PcrPort::new(registers)),
            _specs: PhantomData,
        }
    }

    /// Crystal frequencies this clock tree was created with.
    pub fn board_oscillators(&self) -> BoardOscillators {
        self.oscillators
    }

    pub fn state(&self) -> &ClockTreeState {
        &self.state
    }

    /// Forget the remembered master clock frequency. The next query reads the
    /// configuration back from the PMC.
    pub fn invalidate(&self) {
        self.state.invalidate();
    }

    /// Frequency of `source`, in Hz.
    pub fn get_source_frequency(&self, source: ClockSource) -> u32 {
        match source {
            ClockSource::SlowClockInternal => Specs::SLOW_CLOCK_INT_OSC_HZ,
            ClockSource::SlowClockExternal => self.oscillators.slow_clock_ext_osc_hz,
            ClockSource::MainClockInternal => Specs::MAIN_CLOCK_INT_OSC_HZ,
            ClockSource::MainClockExternal => self.oscillators.main_clock_ext_osc_hz,
            ClockSource::Plla => self.get_plla_clock(),
            ClockSource::Upll => self.get_upll_clock(),
            ClockSource::ProgrammableClockOutput(pck) => self.get_pck_clock(pck),
        }
    }

    fn wait_for_status(
        &self,
        ready: impl Fn(LocalRegisterCopy<u32, PMC_SR::Register>) -> bool,
    ) -> Result<(), ErrorCode> {
        self.wait.wait_until(|| ready(self.registers.sr()))
    }

    fn wait_for_master_clock(&self) -> Result<(), ErrorCode> {
        self.wait_for_status(|sr| sr.is_set(PMC_SR::MCKRDY))
    }
}

/// On-device tests for the clock tree
///
/// These tests only read the clock tree and switch between sources that are
/// always available, so they can run on any board.
///
/// # Usage
///
/// Put the following line before **kernel::process::load_processes()** in the
/// board main file:
///
/// ```rust,ignore
/// sama5d4::clocks::tests::run(&clocks);
/// ```
///
/// If everything works as expected, the following message should be printed
/// on the kernel console:
///
/// ```text
/// ===============================================
/// Testing clocks...
/// Finished testing clocks. Everything is alright!
/// ===============================================
/// ```
pub mod tests {
    use super::*;
    use crate::pmc::MasterClockSource;

    /// Run the entire test suite.
    pub fn run<Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait>(
        clocks: &Clocks<Regs, Specs, Wait>,
    ) {
        debug!("");
        debug!("===============================================");
        debug!("Testing clocks...");

        let master_clock = clocks.get_master_clock();
        debug!("Master clock: {}Hz", master_clock);
        debug!("Processor clock: {}Hz", clocks.get_processor_clock());
        assert_ne!(0, master_clock);
        assert_eq!(
            master_clock * clocks.get_mck_divider().ratio(),
            clocks.get_processor_clock()
        );

        // Asking again gives the remembered value
        assert_eq!(Some(master_clock), clocks.state().master_clock());
        assert_eq!(master_clock, clocks.get_master_clock());

        // Forgetting it reads the same configuration back
        clocks.invalidate();
        assert_eq!(master_clock, clocks.get_master_clock());

        // Nothing should happen when switching to the current source
        let source = clocks.get_master_clock_source();
        let switched = match source {
            MasterClockSource::SlowClock => clocks.switch_mck_to_slck(),
            MasterClockSource::MainClock => clocks.switch_mck_to_main(),
            MasterClockSource::PllaClock => clocks.switch_mck_to_pll(),
            MasterClockSource::UpllClock => clocks.switch_mck_to_upll(),
        };
        assert_eq!(Ok(()), switched);
        assert_eq!(source, clocks.get_master_clock_source());
        assert_eq!(master_clock, clocks.get_master_clock());

        peripheral::tests::run(clocks);

        debug!("Finished testing clocks. Everything is alright!");
        debug!("===============================================");
        debug!("");
    }
}
