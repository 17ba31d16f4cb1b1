// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Power Management Controller (PMC) registers for the SAMA5D4x.
//!
//! This module only describes the hardware: the register block, the bitfields
//! and the field encodings. The clock tree logic built on top of it lives in
//! [crate::clocks]. All register accesses go through [PmcRegisterInterface] so
//! that the clock tree can also be driven by something other than the real
//! memory-mapped block.

use crate::sckc::{SckcRegisters, SCKC_BASE, SCKC_CR};

use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, FieldValue, LocalRegisterCopy, ReadOnly, ReadWrite,
    WriteOnly,
};
use kernel::utilities::StaticRef;

register_structs! {
    /// Power Management Controller
    pub PmcRegisters {
        /// System Clock Enable Register
        (0x000 => pmc_scer: WriteOnly<u32, SYSTEM_CLOCK::Register>),
        /// System Clock Disable Register
        (0x004 => pmc_scdr: WriteOnly<u32, SYSTEM_CLOCK::Register>),
        /// System Clock Status Register
        (0x008 => pmc_scsr: ReadOnly<u32, SYSTEM_CLOCK::Register>),
        (0x00C => _reserved0),
        /// UTMI Clock Register
        (0x01C => ckgr_uckr: ReadWrite<u32, CKGR_UCKR::Register>),
        /// Main Oscillator Register
        (0x020 => ckgr_mor: ReadWrite<u32, CKGR_MOR::Register>),
        /// Main Clock Frequency Register
        (0x024 => ckgr_mcfr: ReadOnly<u32, CKGR_MCFR::Register>),
        /// PLLA Register
        (0x028 => ckgr_pllar: ReadWrite<u32, CKGR_PLLAR::Register>),
        (0x02C => _reserved1),
        /// Master Clock Register
        (0x030 => pmc_mckr: ReadWrite<u32, PMC_MCKR::Register>),
        (0x034 => _reserved2),
        /// Programmable Clock Registers
        (0x040 => pmc_pck: [ReadWrite<u32, PMC_PCK::Register>; 3]),
        (0x04C => _reserved3),
        /// Status Register
        (0x068 => pmc_sr: ReadOnly<u32, PMC_SR::Register>),
        (0x06C => _reserved4),
        /// PLL Charge Pump Current Register
        (0x080 => pmc_pllicpr: ReadWrite<u32, PMC_PLLICPR::Register>),
        (0x084 => _reserved5),
        /// Peripheral Control Register
        (0x10C => pmc_pcr: ReadWrite<u32, PMC_PCR::Register>),
        (0x110 => @END),
    }
}

register_bitfields![u32,
    /// Shared by PMC_SCER, PMC_SCDR and PMC_SCSR
    pub SYSTEM_CLOCK [
        /// DDR clock
        DDRCK OFFSET(2) NUMBITS(1) [],
        /// LCD2x clock
        LCDCK OFFSET(3) NUMBITS(1) [],
        /// SMD clock
        SMDCK OFFSET(4) NUMBITS(1) [],
        /// USB host OHCI clocks
        UHP OFFSET(6) NUMBITS(1) [],
        /// USB device clock
        UDP OFFSET(7) NUMBITS(1) [],
        /// Programmable clock 0 output
        PCK0 OFFSET(8) NUMBITS(1) [],
        /// Programmable clock 1 output
        PCK1 OFFSET(9) NUMBITS(1) [],
        /// Programmable clock 2 output
        PCK2 OFFSET(10) NUMBITS(1) []
    ],
    pub CKGR_UCKR [
        /// UTMI PLL enable
        UPLLEN OFFSET(16) NUMBITS(1) [],
        /// UTMI PLL start-up time
        UPLLCOUNT OFFSET(20) NUMBITS(4) [],
        /// UTMI BIAS enable
        BIASEN OFFSET(24) NUMBITS(1) [],
        /// UTMI BIAS start-up time
        BIASCOUNT OFFSET(28) NUMBITS(4) []
    ],
    pub CKGR_MOR [
        /// 12 to 16 MHz crystal oscillator enable
        MOSCXTEN OFFSET(0) NUMBITS(1) [],
        /// 12 to 16 MHz crystal oscillator bypass
        MOSCXTBY OFFSET(1) NUMBITS(1) [],
        /// 12 MHz RC oscillator enable
        MOSCRCEN OFFSET(3) NUMBITS(1) [],
        /// Main crystal oscillator start-up time
        MOSCXTST OFFSET(8) NUMBITS(8) [],
        /// Write access password
        KEY OFFSET(16) NUMBITS(8) [
            PASSWD = 0x37
        ],
        /// Main oscillator selection
        MOSCSEL OFFSET(24) NUMBITS(1) [
            InternalRc = 0,
            ExternalCrystal = 1
        ],
        /// Clock failure detector enable
        CFDEN OFFSET(25) NUMBITS(1) []
    ],
    pub CKGR_MCFR [
        /// Main clock frequency, in slow clock cycles over 16 periods
        MAINF OFFSET(0) NUMBITS(16) [],
        /// Main clock frequency measure ready
        MAINFRDY OFFSET(16) NUMBITS(1) [],
        /// RC oscillator frequency measure
        RCMEAS OFFSET(20) NUMBITS(1) []
    ],
    pub CKGR_PLLAR [
        /// Divider A
        DIVA OFFSET(0) NUMBITS(8) [],
        /// PLLA counter
        PLLACOUNT OFFSET(8) NUMBITS(6) [],
        /// PLLA clock frequency range
        OUTA OFFSET(14) NUMBITS(4) [],
        /// PLLA multiplier
        MULA OFFSET(18) NUMBITS(7) [],
        /// Must be written to 1
        ONE OFFSET(29) NUMBITS(1) []
    ],
    pub PMC_MCKR [
        /// Master/processor clock source selection
        CSS OFFSET(0) NUMBITS(2) [
            SlowClock = 0,
            MainClock = 1,
            PllaClock = 2,
            UpllClock = 3
        ],
        /// Master/processor clock prescaler
        PRES OFFSET(4) NUMBITS(3) [
            Clock = 0,
            ClockDiv2 = 1,
            ClockDiv4 = 2,
            ClockDiv8 = 3,
            ClockDiv16 = 4,
            ClockDiv32 = 5,
            ClockDiv64 = 6
        ],
        /// Master clock division
        MDIV OFFSET(8) NUMBITS(2) [
            EqPck = 0,
            PckDiv2 = 1,
            PckDiv4 = 2,
            PckDiv3 = 3
        ],
        /// PLLA divisor by 2
        PLLADIV2 OFFSET(12) NUMBITS(1) []
    ],
    pub PMC_PCK [
        /// Programmable clock source selection
        CSS OFFSET(0) NUMBITS(3) [
            SlowClock = 0,
            MainClock = 1,
            PllaClock = 2,
            UpllClock = 3,
            MasterClock = 4
        ],
        /// Programmable clock prescaler, output is source / (PRES + 1)
        PRES OFFSET(4) NUMBITS(8) []
    ],
    pub PMC_SR [
        /// Main crystal oscillator status
        MOSCXTS OFFSET(0) NUMBITS(1) [],
        /// PLLA lock status
        LOCKA OFFSET(1) NUMBITS(1) [],
        /// Master clock status
        MCKRDY OFFSET(3) NUMBITS(1) [],
        /// UTMI PLL lock status
        LOCKU OFFSET(6) NUMBITS(1) [],
        /// Slow clock oscillator selection
        OSCSELS OFFSET(7) NUMBITS(1) [],
        /// Programmable clock ready status
        PCKRDY0 OFFSET(8) NUMBITS(1) [],
        PCKRDY1 OFFSET(9) NUMBITS(1) [],
        PCKRDY2 OFFSET(10) NUMBITS(1) [],
        /// Main oscillator selection status
        MOSCSELS OFFSET(16) NUMBITS(1) [],
        /// Main on-chip RC oscillator status
        MOSCRCS OFFSET(17) NUMBITS(1) [],
        /// Clock failure detector event
        CFDEV OFFSET(18) NUMBITS(1) [],
        /// Clock failure detector status
        CFDS OFFSET(19) NUMBITS(1) [],
        /// Clock failure detector fault output status
        FOS OFFSET(20) NUMBITS(1) []
    ],
    pub PMC_PLLICPR [
        /// Charge pump current PLLA
        ICPLLA OFFSET(0) NUMBITS(2) [],
        /// Engineering configuration PLLA
        IPLL_PLLA OFFSET(8) NUMBITS(3) [],
        /// Charge pump current UPLL
        ICPUPLL OFFSET(16) NUMBITS(4) []
    ],
    pub PMC_PCR [
        /// Peripheral ID
        PID OFFSET(0) NUMBITS(7) [],
        /// Command, 0 = read, 1 = write
        CMD OFFSET(12) NUMBITS(1) [],
        /// Enable
        EN OFFSET(28) NUMBITS(1) []
    ]
];

const PMC_BASE: StaticRef<PmcRegisters> =
    unsafe { StaticRef::new(0xF001_8000 as *const PmcRegisters) };

/// Master clock source, as selected by PMC_MCKR.CSS.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MasterClockSource {
    SlowClock,
    MainClock,
    PllaClock,
    UpllClock,
}

impl MasterClockSource {
    pub(crate) fn from_mckr(mckr: LocalRegisterCopy<u32, PMC_MCKR::Register>) -> Self {
        match mckr.read_as_enum(PMC_MCKR::CSS) {
            Some(PMC_MCKR::CSS::Value::SlowClock) => Self::SlowClock,
            Some(PMC_MCKR::CSS::Value::MainClock) => Self::MainClock,
            Some(PMC_MCKR::CSS::Value::PllaClock) => Self::PllaClock,
            // The field is two bits wide, every encoding is named
            Some(PMC_MCKR::CSS::Value::UpllClock) | None => Self::UpllClock,
        }
    }

    pub(crate) fn field_value(self) -> FieldValue<u32, PMC_MCKR::Register> {
        match self {
            Self::SlowClock => PMC_MCKR::CSS::SlowClock,
            Self::MainClock => PMC_MCKR::CSS::MainClock,
            Self::PllaClock => PMC_MCKR::CSS::PllaClock,
            Self::UpllClock => PMC_MCKR::CSS::UpllClock,
        }
    }
}

/// Master clock prescaler (PMC_MCKR.PRES). Each step halves the source.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MasterClockPrescaler {
    DivideBy1 = 0,
    DivideBy2 = 1,
    DivideBy4 = 2,
    DivideBy8 = 3,
    DivideBy16 = 4,
    DivideBy32 = 5,
    DivideBy64 = 6,
}

impl MasterClockPrescaler {
    /// Returns [None] for the reserved encoding.
    pub(crate) fn from_mckr(mckr: LocalRegisterCopy<u32, PMC_MCKR::Register>) -> Option<Self> {
        match mckr.read(PMC_MCKR::PRES) {
            0 => Some(Self::DivideBy1),
            1 => Some(Self::DivideBy2),
            2 => Some(Self::DivideBy4),
            3 => Some(Self::DivideBy8),
            4 => Some(Self::DivideBy16),
            5 => Some(Self::DivideBy32),
            6 => Some(Self::DivideBy64),
            _ => None,
        }
    }

    pub(crate) fn field_value(self) -> FieldValue<u32, PMC_MCKR::Register> {
        PMC_MCKR::PRES.val(self as u32)
    }

    /// Apply the prescaler to a source frequency.
    pub fn divide(self, frequency: u32) -> u32 {
        frequency >> (self as u32)
    }
}

/// Master clock division (PMC_MCKR.MDIV), the ratio between the processor
/// clock and the master clock.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MasterClockDivider {
    DivideBy1,
    DivideBy2,
    DivideBy3,
    DivideBy4,
}

impl MasterClockDivider {
    pub(crate) fn from_mckr(mckr: LocalRegisterCopy<u32, PMC_MCKR::Register>) -> Self {
        match mckr.read_as_enum(PMC_MCKR::MDIV) {
            Some(PMC_MCKR::MDIV::Value::EqPck) => Self::DivideBy1,
            Some(PMC_MCKR::MDIV::Value::PckDiv2) => Self::DivideBy2,
            Some(PMC_MCKR::MDIV::Value::PckDiv4) => Self::DivideBy4,
            Some(PMC_MCKR::MDIV::Value::PckDiv3) | None => Self::DivideBy3,
        }
    }

    pub(crate) fn field_value(self) -> FieldValue<u32, PMC_MCKR::Register> {
        match self {
            Self::DivideBy1 => PMC_MCKR::MDIV::EqPck,
            Self::DivideBy2 => PMC_MCKR::MDIV::PckDiv2,
            Self::DivideBy3 => PMC_MCKR::MDIV::PckDiv3,
            Self::DivideBy4 => PMC_MCKR::MDIV::PckDiv4,
        }
    }

    /// The integer ratio encoded by the divider.
    pub fn ratio(self) -> u32 {
        match self {
            Self::DivideBy1 => 1,
            Self::DivideBy2 => 2,
            Self::DivideBy3 => 3,
            Self::DivideBy4 => 4,
        }
    }

    /// Apply the divider to a prescaled frequency. Division by 3 truncates.
    pub fn divide(self, frequency: u32) -> u32 {
        match self {
            Self::DivideBy1 => frequency,
            Self::DivideBy2 => frequency >> 1,
            Self::DivideBy3 => frequency / 3,
            Self::DivideBy4 => frequency >> 2,
        }
    }
}

/// PLLA output halving (PMC_MCKR.PLLADIV2).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PllaOutputDivider {
    DivideBy1,
    DivideBy2,
}

/// Main clock oscillator, as selected by CKGR_MOR.MOSCSEL.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MainClockOscillator {
    /// On-chip 12 MHz RC oscillator
    InternalRc,
    /// 12 to 16 MHz crystal
    ExternalCrystal,
}

impl MainClockOscillator {
    pub(crate) fn from_mor(mor: LocalRegisterCopy<u32, CKGR_MOR::Register>) -> Self {
        if mor.is_set(CKGR_MOR::MOSCSEL) {
            Self::ExternalCrystal
        } else {
            Self::InternalRc
        }
    }
}

/// One of the three programmable clock outputs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProgrammableClock {
    Pck0 = 0,
    Pck1 = 1,
    Pck2 = 2,
}

impl ProgrammableClock {
    pub const ALL: [ProgrammableClock; 3] = [Self::Pck0, Self::Pck1, Self::Pck2];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn system_clock(self) -> FieldValue<u32, SYSTEM_CLOCK::Register> {
        match self {
            Self::Pck0 => SYSTEM_CLOCK::PCK0::SET,
            Self::Pck1 => SYSTEM_CLOCK::PCK1::SET,
            Self::Pck2 => SYSTEM_CLOCK::PCK2::SET,
        }
    }

    pub(crate) fn is_running(self, scsr: LocalRegisterCopy<u32, SYSTEM_CLOCK::Register>) -> bool {
        match self {
            Self::Pck0 => scsr.is_set(SYSTEM_CLOCK::PCK0),
            Self::Pck1 => scsr.is_set(SYSTEM_CLOCK::PCK1),
            Self::Pck2 => scsr.is_set(SYSTEM_CLOCK::PCK2),
        }
    }

    pub(crate) fn is_ready(self, sr: LocalRegisterCopy<u32, PMC_SR::Register>) -> bool {
        match self {
            Self::Pck0 => sr.is_set(PMC_SR::PCKRDY0),
            Self::Pck1 => sr.is_set(PMC_SR::PCKRDY1),
            Self::Pck2 => sr.is_set(PMC_SR::PCKRDY2),
        }
    }
}

/// Programmable clock source, as selected by PMC_PCKx.CSS.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ProgrammableClockSource {
    SlowClock,
    MainClock,
    PllaClock,
    UpllClock,
    MasterClock,
}

impl ProgrammableClockSource {
    /// Returns [None] for the reserved encodings.
    pub(crate) fn from_pck(pck: LocalRegisterCopy<u32, PMC_PCK::Register>) -> Option<Self> {
        match pck.read_as_enum(PMC_PCK::CSS) {
            Some(PMC_PCK::CSS::Value::SlowClock) => Some(Self::SlowClock),
            Some(PMC_PCK::CSS::Value::MainClock) => Some(Self::MainClock),
            Some(PMC_PCK::CSS::Value::PllaClock) => Some(Self::PllaClock),
            Some(PMC_PCK::CSS::Value::UpllClock) => Some(Self::UpllClock),
            Some(PMC_PCK::CSS::Value::MasterClock) => Some(Self::MasterClock),
            None => None,
        }
    }

    pub(crate) fn field_value(self) -> FieldValue<u32, PMC_PCK::Register> {
        match self {
            Self::SlowClock => PMC_PCK::CSS::SlowClock,
            Self::MainClock => PMC_PCK::CSS::MainClock,
            Self::PllaClock => PMC_PCK::CSS::PllaClock,
            Self::UpllClock => PMC_PCK::CSS::UpllClock,
            Self::MasterClock => PMC_PCK::CSS::MasterClock,
        }
    }
}

/// Raw access to the registers used by the clock tree.
///
/// Read-write registers are exchanged as [LocalRegisterCopy] values so that
/// callers can decode and build them with the bitfield definitions of this
/// module. Write-only registers take a [FieldValue].
pub trait PmcRegisterInterface {
    fn mckr(&self) -> LocalRegisterCopy<u32, PMC_MCKR::Register>;
    fn set_mckr(&self, value: LocalRegisterCopy<u32, PMC_MCKR::Register>);

    fn mor(&self) -> LocalRegisterCopy<u32, CKGR_MOR::Register>;
    fn set_mor(&self, value: LocalRegisterCopy<u32, CKGR_MOR::Register>);

    fn mcfr(&self) -> LocalRegisterCopy<u32, CKGR_MCFR::Register>;

    fn pllar(&self) -> LocalRegisterCopy<u32, CKGR_PLLAR::Register>;
    fn set_pllar(&self, value: LocalRegisterCopy<u32, CKGR_PLLAR::Register>);
    fn set_pllicpr(&self, value: LocalRegisterCopy<u32, PMC_PLLICPR::Register>);

    fn uckr(&self) -> LocalRegisterCopy<u32, CKGR_UCKR::Register>;
    fn set_uckr(&self, value: LocalRegisterCopy<u32, CKGR_UCKR::Register>);

    fn sr(&self) -> LocalRegisterCopy<u32, PMC_SR::Register>;

    fn scsr(&self) -> LocalRegisterCopy<u32, SYSTEM_CLOCK::Register>;
    fn set_scer(&self, value: FieldValue<u32, SYSTEM_CLOCK::Register>);
    fn set_scdr(&self, value: FieldValue<u32, SYSTEM_CLOCK::Register>);

    fn pck(&self, pck: ProgrammableClock) -> LocalRegisterCopy<u32, PMC_PCK::Register>;
    fn set_pck(&self, pck: ProgrammableClock, value: LocalRegisterCopy<u32, PMC_PCK::Register>);

    fn pcr(&self) -> LocalRegisterCopy<u32, PMC_PCR::Register>;
    fn set_pcr(&self, value: LocalRegisterCopy<u32, PMC_PCR::Register>);

    fn sckc_cr(&self) -> LocalRegisterCopy<u32, SCKC_CR::Register>;
    fn set_sckc_cr(&self, value: LocalRegisterCopy<u32, SCKC_CR::Register>);
}

/// The memory-mapped PMC and SCKC blocks of the SAMA5D4x.
pub struct Sama5d4PmcRegisters {
    pmc: StaticRef<PmcRegisters>,
    sckc: StaticRef<SckcRegisters>,
}

impl Sama5d4PmcRegisters {
    pub const fn new() -> Self {
        Self {
            pmc: PMC_BASE,
            sckc: SCKC_BASE,
        }
    }
}

impl PmcRegisterInterface for Sama5d4PmcRegisters {
    fn mckr(&self) -> LocalRegisterCopy<u32, PMC_MCKR::Register> {
        self.pmc.pmc_mckr.extract()
    }

    fn set_mckr(&self, value: LocalRegisterCopy<u32, PMC_MCKR::Register>) {
        self.pmc.pmc_mckr.set(value.get());
    }

    fn mor(&self) -> LocalRegisterCopy<u32, CKGR_MOR::Register> {
        self.pmc.ckgr_mor.extract()
    }

    fn set_mor(&self, value: LocalRegisterCopy<u32, CKGR_MOR::Register>) {
        self.pmc.ckgr_mor.set(value.get());
    }

    fn mcfr(&self) -> LocalRegisterCopy<u32, CKGR_MCFR::Register> {
        self.pmc.ckgr_mcfr.extract()
    }

    fn pllar(&self) -> LocalRegisterCopy<u32, CKGR_PLLAR::Register> {
        self.pmc.ckgr_pllar.extract()
    }

    fn set_pllar(&self, value: LocalRegisterCopy<u32, CKGR_PLLAR::Register>) {
        self.pmc.ckgr_pllar.set(value.get());
    }

    fn set_pllicpr(&self, value: LocalRegisterCopy<u32, PMC_PLLICPR::Register>) {
        self.pmc.pmc_pllicpr.set(value.get());
    }

    fn uckr(&self) -> LocalRegisterCopy<u32, CKGR_UCKR::Register> {
        self.pmc.ckgr_uckr.extract()
    }

    fn set_uckr(&self, value: LocalRegisterCopy<u32, CKGR_UCKR::Register>) {
        self.pmc.ckgr_uckr.set(value.get());
    }

    fn sr(&self) -> LocalRegisterCopy<u32, PMC_SR::Register> {
        self.pmc.pmc_sr.extract()
    }

    fn scsr(&self) -> LocalRegisterCopy<u32, SYSTEM_CLOCK::Register> {
        self.pmc.pmc_scsr.extract()
    }

    fn set_scer(&self, value: FieldValue<u32, SYSTEM_CLOCK::Register>) {
        self.pmc.pmc_scer.write(value);
    }

    fn set_scdr(&self, value: FieldValue<u32, SYSTEM_CLOCK::Register>) {
        self.pmc.pmc_scdr.write(value);
    }

    fn pck(&self, pck: ProgrammableClock) -> LocalRegisterCopy<u32, PMC_PCK::Register> {
        self.pmc.pmc_pck[pck.index()].extract()
    }

    fn set_pck(&self, pck: ProgrammableClock, value: LocalRegisterCopy<u32, PMC_PCK::Register>) {
        self.pmc.pmc_pck[pck.index()].set(value.get());
    }

    fn pcr(&self) -> LocalRegisterCopy<u32, PMC_PCR::Register> {
        self.pmc.pmc_pcr.extract()
    }

    fn set_pcr(&self, value: LocalRegisterCopy<u32, PMC_PCR::Register>) {
        self.pmc.pmc_pcr.set(value.get());
    }

    fn sckc_cr(&self) -> LocalRegisterCopy<u32, SCKC_CR::Register> {
        self.sckc.cr.extract()
    }

    fn set_sckc_cr(&self, value: LocalRegisterCopy<u32, SCKC_CR::Register>) {
        self.sckc.cr.set(value.get());
    }
}
