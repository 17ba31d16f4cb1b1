// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PLLA and UTMI PLL (UPLL).
//!
//! PLLA multiplies the main clock by MULA + 1 and divides it by DIVA. Its
//! output can further be halved by PMC_MCKR.PLLADIV2 before it reaches the
//! master clock or a programmable clock. The UPLL always runs at 40 times the
//! main crystal.
//!
//! # Usage
//!
//! ```rust,ignore
//! // 12 MHz crystal * 88 / 1 = 1056 MHz, halved to 528 MHz
//! clocks.set_plla(PllaConfig::new(87, 1))?;
//! clocks.set_mck_plla_div(PllaOutputDivider::DivideBy2)?;
//! clocks.switch_mck_to_pll()?;
//! ```

use kernel::utilities::registers::LocalRegisterCopy;
use kernel::ErrorCode;

use super::wait::ReadyWait;
use super::Clocks;
use crate::chip_specs::ChipSpecs;
use crate::pmc::{PllaOutputDivider, PmcRegisterInterface};
use crate::pmc::{CKGR_PLLAR, CKGR_UCKR, PMC_SR};

/// Ratio between the UPLL output and the main crystal.
pub const UPLL_MULTIPLIER: u32 = 40;

/// Widest MULA value
pub const PLLA_MULTIPLIER_MAX: u8 = 0x7F;
/// Widest PLLACOUNT value
pub const PLLA_COUNT_MAX: u8 = 0x3F;
/// Widest OUTA value
pub const PLLA_OUTPUT_RANGE_MAX: u8 = 0xF;

/// PLLA settings
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PllaConfig {
    /// MULA. The PLL multiplies by `multiplier + 1`. 0 disables the PLL.
    pub multiplier: u8,
    /// DIVA. 0 stops the PLL output.
    pub divider: u8,
    /// PLLACOUNT, slow clock cycles before PMC_SR.LOCKA is set
    pub count: u8,
    /// OUTA, the output frequency range
    pub output_range: u8,
    /// The whole PMC_PLLICPR word (ICPLLA, IPLL_PLLA and ICPUPLL). It is
    /// written as given, so it must carry the UPLL charge pump setting too.
    pub charge_pump: u32,
}

impl PllaConfig {
    /// Multiplier and divider with the longest lock time and the default
    /// analog settings.
    pub const fn new(multiplier: u8, divider: u8) -> Self {
        Self {
            multiplier,
            divider,
            count: PLLA_COUNT_MAX,
            output_range: 0,
            charge_pump: 0,
        }
    }

    /// Whether every field fits in its CKGR_PLLAR field.
    pub fn fits_pllar(&self) -> bool {
        self.multiplier <= PLLA_MULTIPLIER_MAX
            && self.count <= PLLA_COUNT_MAX
            && self.output_range <= PLLA_OUTPUT_RANGE_MAX
    }

    fn from_pllar(pllar: LocalRegisterCopy<u32, CKGR_PLLAR::Register>) -> Self {
        Self {
            multiplier: pllar.read(CKGR_PLLAR::MULA) as u8,
            divider: pllar.read(CKGR_PLLAR::DIVA) as u8,
            count: pllar.read(CKGR_PLLAR::PLLACOUNT) as u8,
            output_range: pllar.read(CKGR_PLLAR::OUTA) as u8,
            charge_pump: 0,
        }
    }

    /// Frequency produced from `input` Hz, before PLLADIV2.
    pub fn output_frequency(&self, input: u32) -> u32 {
        if self.divider == 0 {
            return 0;
        }

        let output = u64::from(input) * (u64::from(self.multiplier) + 1) / u64::from(self.divider);
        u32::try_from(output).unwrap_or(u32::MAX)
    }
}

impl<'a, Regs: PmcRegisterInterface, Specs: ChipSpecs, Wait: ReadyWait>
    Clocks<'a, Regs, Specs, Wait>
{
    /// Get the PLLA frequency in Hz, after PLLADIV2.
    ///
    /// The PLL input is the main clock as selected by CKGR_MOR.MOSCSEL,
    /// whatever the master clock runs from.
    pub fn get_plla_clock(&self) -> u32 {
        let config = PllaConfig::from_pllar(self.registers.pllar());
        let output = config.output_frequency(self.get_main_clock());

        match self.get_mck_plla_div() {
            PllaOutputDivider::DivideBy1 => output,
            PllaOutputDivider::DivideBy2 => output >> 1,
        }
    }

    /// Read the PLLA settings back from CKGR_PLLAR. PMC_PLLICPR is not read
    /// back, so `charge_pump` is 0.
    pub fn get_plla_config(&self) -> PllaConfig {
        PllaConfig::from_pllar(self.registers.pllar())
    }

    pub fn is_plla_locked(&self) -> bool {
        self.registers.sr().is_set(PMC_SR::LOCKA)
    }

    /// Program PLLA and wait for it to lock.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::INVAL]\): if a field of `config` does not fit in CKGR_PLLAR. Nothing is written in that case.
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.LOCKA
    pub fn set_plla(&self, config: PllaConfig) -> Result<(), ErrorCode> {
        if !config.fits_pllar() {
            return Err(ErrorCode::INVAL);
        }

        self.registers.set_pllar(LocalRegisterCopy::new(u32::from(
            CKGR_PLLAR::ONE::SET
                + CKGR_PLLAR::MULA.val(config.multiplier.into())
                + CKGR_PLLAR::OUTA.val(config.output_range.into())
                + CKGR_PLLAR::PLLACOUNT.val(config.count.into())
                + CKGR_PLLAR::DIVA.val(config.divider.into()),
        )));
        self.registers
            .set_pllicpr(LocalRegisterCopy::new(config.charge_pump));
        self.state.invalidate();

        self.wait_for_status(|sr| sr.is_set(PMC_SR::LOCKA))
    }

    /// Stop PLLA by clearing its multiplier. The divider is kept.
    pub fn disable_plla(&self) {
        let pllar = self.registers.pllar();
        self.registers
            .set_pllar(LocalRegisterCopy::new(CKGR_PLLAR::MULA.val(0).modify(pllar.get())));
        self.state.invalidate();
    }

    pub fn is_upll_enabled(&self) -> bool {
        self.registers.uckr().is_set(CKGR_UCKR::UPLLEN)
    }

    /// Get the UPLL frequency in Hz, 0 while it is disabled.
    ///
    /// This is also what the master clock and the programmable clocks see
    /// when they select the UPLL. Some SAMA5 board support code reports the
    /// main crystal frequency for a UPLL-driven master clock and 0 for a
    /// UPLL-driven programmable clock instead.
    pub fn get_upll_clock(&self) -> u32 {
        if self.is_upll_enabled() {
            self.oscillators
                .main_clock_ext_osc_hz
                .saturating_mul(UPLL_MULTIPLIER)
        } else {
            0
        }
    }

    /// Start the UPLL with the longest start-up time and wait for it to lock.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the wait strategy gave up on PMC_SR.LOCKU
    pub fn enable_upll(&self) -> Result<(), ErrorCode> {
        let uckr = self.registers.uckr();
        self.registers.set_uckr(LocalRegisterCopy::new(
            (CKGR_UCKR::UPLLEN::SET + CKGR_UCKR::UPLLCOUNT.val(0xF)).modify(uckr.get()),
        ));
        self.state.invalidate();

        self.wait_for_status(|sr| sr.is_set(PMC_SR::LOCKU))
    }

    pub fn disable_upll(&self) {
        let uckr = self.registers.uckr();
        self.registers
            .set_uckr(LocalRegisterCopy::new(CKGR_UCKR::UPLLEN::CLEAR.modify(uckr.get())));
        self.state.invalidate();
    }
}
