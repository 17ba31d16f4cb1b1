// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Slow Clock Controller (SCKC).
//!
//! The SCKC is a single control register inside the system controller. It
//! selects which 32 kHz oscillator drives the slow clock.

use kernel::utilities::registers::{register_bitfields, register_structs, LocalRegisterCopy};
use kernel::utilities::registers::{FieldValue, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    pub SckcRegisters {
        /// Slow Clock Controller Configuration Register
        (0x00 => pub(crate) cr: ReadWrite<u32, SCKC_CR::Register>),
        (0x04 => @END),
    }
}

register_bitfields![u32,
    pub SCKC_CR [
        /// Embedded 32 kHz RC oscillator enable
        RCEN OFFSET(0) NUMBITS(1) [],
        /// 32768 Hz crystal oscillator enable
        OSC32EN OFFSET(1) NUMBITS(1) [],
        /// 32768 Hz crystal oscillator bypass
        OSC32BYP OFFSET(2) NUMBITS(1) [],
        /// Slow clock oscillator selection
        OSCSEL OFFSET(3) NUMBITS(1) [
            Rc = 0,
            Xtal = 1
        ]
    ]
];

pub(crate) const SCKC_BASE: StaticRef<SckcRegisters> =
    unsafe { StaticRef::new(0xFC06_8650 as *const SckcRegisters) };

/// Slow clock oscillator, as selected by SCKC_CR.OSCSEL.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SlowClockOscillator {
    /// On-chip 32 kHz RC oscillator
    InternalRc,
    /// 32768 Hz crystal
    ExternalCrystal,
}

impl SlowClockOscillator {
    pub(crate) fn from_cr(cr: LocalRegisterCopy<u32, SCKC_CR::Register>) -> Self {
        match cr.read_as_enum(SCKC_CR::OSCSEL) {
            Some(SCKC_CR::OSCSEL::Value::Xtal) => Self::ExternalCrystal,
            Some(SCKC_CR::OSCSEL::Value::Rc) | None => Self::InternalRc,
        }
    }

    pub(crate) fn field_value(self) -> FieldValue<u32, SCKC_CR::Register> {
        match self {
            Self::InternalRc => SCKC_CR::OSCSEL::Rc,
            Self::ExternalCrystal => SCKC_CR::OSCSEL::Xtal,
        }
    }
}
