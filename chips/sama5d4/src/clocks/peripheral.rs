// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral clocks.
//!
//! Peripheral clocks are gated through the Peripheral Control Register (PCR),
//! which is an indirect register: a peripheral ID is first written to select
//! the peripheral, the configuration of that peripheral is then read back, and
//! a modified configuration is written with the command bit set. Two of these
//! sequences must never interleave, so every access goes through a single
//! [PcrPort] that [Clocks] lends out one transaction at a time.
//!
//! Peripheral drivers that only need to turn their own clock on and off can
//! hold a [PeripheralClock], which implements Tock's [ClockInterface].

use kernel::platform::chip::ClockInterface;
use kernel::utilities::registers::LocalRegisterCopy;

use super::wait::ReadyWait;
use super::Clocks;
use crate::chip_specs::{ChipSpecs, PeripheralId};
use crate::pmc::{PmcRegisterInterface, PMC_PCR};

/// Exclusive access to PMC_PCR.
pub(super) struct PcrPort<'a, Regs> {
    registers: &'a Regs,
}

impl<'a, Regs: PmcRegisterInterface> PcrPort<'a, Regs> {
    pub(super) const fn new(registers: &'a Regs) -> Self {
        Self { registers }
    }

    /// Select peripheral `id` and read its configuration back.
    fn select(&self, id: u32) -> LocalRegisterCopy<u32, PMC_PCR::Register> {
        self.registers
            .set_pcr(LocalRegisterCopy::new(u32::from(PMC_PCR::PID.val(id))));
        self.registers.pcr()
    }

    /// Write a configuration for the selected peripheral.
    fn commit(&self, configuration: LocalRegisterCopy<u32, PMC_PCR::Register>) {
        self.registers.set_pcr(LocalRegisterCopy::new(
            PMC_PCR::CMD::SET.modify(configuration.get()),
        ));
    }
}

impl<'a, Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait>
    Clocks<'a, Regs, Specs, Wait>
{
    fn check_peripheral_id(&self, id: u32) {
        assert!(
            id > 1 && id < Specs::PERIPHERAL_COUNT,
            "invalid peripheral ID {}",
            id
        );
    }

    /// Select peripheral `id`, read its configuration and hand both the port
    /// and the configuration to `f`.
    ///
    /// # Panics
    ///
    /// If called from within `f`.
    fn peripheral_transaction<F, R>(&self, id: u32, f: F) -> R
    where
        F: FnOnce(&PcrPort<'a, Regs>, LocalRegisterCopy<u32, PMC_PCR::Register>) -> R,
    {
        let result = self.pcr.map(|port| {
            let configuration = port.select(id);
            f(&*port, configuration)
        });

        match result {
            Some(result) => result,
            None => panic!("PMC_PCR transaction already in progress"),
        }
    }

    /// Start the clock of peripheral `id`.
    ///
    /// # Panics
    ///
    /// If `id` is not a valid peripheral ID for the chip.
    pub fn enable_peripheral(&self, id: u32) {
        self.check_peripheral_id(id);

        self.peripheral_transaction(id, |port, configuration| {
            port.commit(LocalRegisterCopy::new(
                PMC_PCR::EN::SET.modify(configuration.get()),
            ));
        });
    }

    /// Stop the clock of peripheral `id`. The configuration is written even
    /// if the clock is already stopped.
    ///
    /// # Panics
    ///
    /// If `id` is not a valid peripheral ID for the chip.
    pub fn disable_peripheral(&self, id: u32) {
        self.check_peripheral_id(id);

        self.peripheral_transaction(id, |port, configuration| {
            port.commit(LocalRegisterCopy::new(
                PMC_PCR::EN::CLEAR.modify(configuration.get()),
            ));
        });
    }

    /// # Panics
    ///
    /// If `id` is not a valid peripheral ID for the chip.
    pub fn is_peripheral_enabled(&self, id: u32) -> bool {
        self.check_peripheral_id(id);

        self.peripheral_transaction(id, |_, configuration| {
            configuration.is_set(PMC_PCR::EN)
        })
    }

    /// Get the clock frequency of peripheral `id` in Hz, 0 if no peripheral
    /// has this ID.
    ///
    /// # Panics
    ///
    /// If `id` is out of the peripheral ID range of the chip.
    pub fn get_peripheral_clock(&self, id: u32) -> u32 {
        self.check_peripheral_id(id);

        match Specs::peripheral_clock_divider(id) {
            0 => 0,
            divider => self.get_master_clock() / divider,
        }
    }

    /// Stop every peripheral clock.
    pub fn disable_all_peripherals(&self) {
        for id in 2..Specs::PERIPHERAL_COUNT {
            self.disable_peripheral(id);
        }
    }
}

/// Clock tree operations peripheral drivers need.
///
/// This can be used to control clocks without keeping a reference to the
/// generic [Clocks] struct.
pub trait Sama5d4Clocks {
    fn enable_peripheral_clock(&self, id: PeripheralId);
    fn disable_peripheral_clock(&self, id: PeripheralId);
    fn is_peripheral_clock_enabled(&self, id: PeripheralId) -> bool;

    /// Get the clock frequency of a peripheral in Hz.
    fn get_peripheral_clock_frequency(&self, id: PeripheralId) -> u32;
}

impl<'a, Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait> Sama5d4Clocks
    for Clocks<'a, Regs, Specs, Wait>
{
    fn enable_peripheral_clock(&self, id: PeripheralId) {
        self.enable_peripheral(id.id());
    }

    fn disable_peripheral_clock(&self, id: PeripheralId) {
        self.disable_peripheral(id.id());
    }

    fn is_peripheral_clock_enabled(&self, id: PeripheralId) -> bool {
        self.is_peripheral_enabled(id.id())
    }

    fn get_peripheral_clock_frequency(&self, id: PeripheralId) -> u32 {
        self.get_peripheral_clock(id.id())
    }
}

/// The clock of a single peripheral.
pub struct PeripheralClock<'a> {
    pub id: PeripheralId,
    clocks: &'a dyn Sama5d4Clocks,
}

impl<'a> PeripheralClock<'a> {
    pub const fn new(id: PeripheralId, clocks: &'a dyn Sama5d4Clocks) -> Self {
        Self { id, clocks }
    }

    pub fn get_frequency(&self) -> u32 {
        self.clocks.get_peripheral_clock_frequency(self.id)
    }
}

impl ClockInterface for PeripheralClock<'_> {
    fn is_enabled(&self) -> bool {
        self.clocks.is_peripheral_clock_enabled(self.id)
    }

    fn enable(&self) {
        self.clocks.enable_peripheral_clock(self.id);
    }

    fn disable(&self) {
        self.clocks.disable_peripheral_clock(self.id);
    }
}

/// On-device tests for peripheral clocks
///
/// Run as part of [crate::clocks::tests::run]. Only the TRNG clock is touched,
/// and it is restored afterwards.
pub mod tests {
    use super::*;
    use kernel::debug;

    pub fn run<Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait>(
        clocks: &Clocks<Regs, Specs, Wait>,
    ) {
        debug!("Testing peripheral clocks...");

        let trng = PeripheralClock::new(PeripheralId::Trng, clocks);
        let was_enabled = trng.is_enabled();

        trng.enable();
        assert!(trng.is_enabled());
        assert!(clocks.is_peripheral_enabled(PeripheralId::Trng.id()));

        trng.disable();
        assert!(!trng.is_enabled());

        // Disabling twice is harmless
        trng.disable();
        assert!(!trng.is_enabled());

        if was_enabled {
            trng.enable();
        }

        assert_eq!(clocks.get_master_clock() / 2, trng.get_frequency());

        debug!("Finished testing peripheral clocks.");
    }
}
