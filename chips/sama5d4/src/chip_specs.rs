// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Chip and board specific constants for the clock tree.
//!
//! Members of the SAMA5D4x family share the PMC but not necessarily the
//! peripheral list. [ChipSpecs] gathers everything the clock tree needs to know
//! about a given part. Crystal frequencies depend on the board and are passed
//! separately as [BoardOscillators].

/// Per-SoC clock tree constants.
pub trait ChipSpecs {
    /// Frequency of the on-chip slow clock RC oscillator, in Hz.
    const SLOW_CLOCK_INT_OSC_HZ: u32;
    /// Frequency of the on-chip main clock RC oscillator, in Hz.
    const MAIN_CLOCK_INT_OSC_HZ: u32;
    /// Number of peripheral IDs. Valid peripheral IDs are `2..PERIPHERAL_COUNT`.
    const PERIPHERAL_COUNT: u32;

    /// Divisor between the master clock and the clock of peripheral `id`.
    ///
    /// # Returns
    ///
    /// + 0: if no peripheral is assigned to `id`
    /// + the divisor otherwise
    fn peripheral_clock_divider(id: u32) -> u32;
}

/// Crystal frequencies fitted on a board, in Hz.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoardOscillators {
    pub slow_clock_ext_osc_hz: u32,
    pub main_clock_ext_osc_hz: u32,
}

/// SAMA5D4 Xplained Ultra
pub const SAMA5D4_XPLAINED_ULTRA: BoardOscillators = BoardOscillators {
    slow_clock_ext_osc_hz: 32_768,
    main_clock_ext_osc_hz: 12_000_000,
};

/// Peripheral identifiers of the SAMA5D4x.
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u32)]
pub enum PeripheralId {
    Sysc = 1,
    Arm = 2,
    Pit = 3,
    Wdt = 4,
    Piod = 5,
    Usart0 = 6,
    Usart1 = 7,
    Xdmac0 = 8,
    Icm = 9,
    Cpkcc = 10,
    Aes = 12,
    Aesb = 13,
    Tdes = 14,
    Sha = 15,
    Mpddrc = 16,
    Matrix1 = 17,
    Matrix0 = 18,
    Vdec = 19,
    Msadcc = 21,
    Hsmc = 22,
    Pioa = 23,
    Piob = 24,
    Pioc = 25,
    Pioe = 26,
    Uart0 = 27,
    Uart1 = 28,
    Usart2 = 29,
    Usart3 = 30,
    Usart4 = 31,
    Twi0 = 32,
    Twi1 = 33,
    Twi2 = 34,
    Hsmci0 = 35,
    Hsmci1 = 36,
    Spi0 = 37,
    Spi1 = 38,
    Spi2 = 39,
    Tc0 = 40,
    Tc1 = 41,
    Tc2 = 42,
    Pwm = 43,
    Adc = 44,
    Dbgu = 45,
    Uhphs = 46,
    Udphs = 47,
    Ssc0 = 48,
    Ssc1 = 49,
    Xdmac1 = 50,
    Lcdc = 51,
    Isi = 52,
    Trng = 53,
    Gmac0 = 54,
    Gmac1 = 55,
    Irq = 56,
    Sfc = 57,
    Smd = 61,
    Twi3 = 62,
    Sfr = 64,
    Aic = 65,
    Saic = 66,
    L2cc = 67,
}

impl PeripheralId {
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Returns [None] for IDs with no peripheral attached.
    pub fn from_id(id: u32) -> Option<Self> {
        use PeripheralId::*;
        Some(match id {
            1 => Sysc,
            2 => Arm,
            3 => Pit,
            4 => Wdt,
            5 => Piod,
            6 => Usart0,
            7 => Usart1,
            8 => Xdmac0,
            9 => Icm,
            10 => Cpkcc,
            12 => Aes,
            13 => Aesb,
            14 => Tdes,
            15 => Sha,
            16 => Mpddrc,
            17 => Matrix1,
            18 => Matrix0,
            19 => Vdec,
            21 => Msadcc,
            22 => Hsmc,
            23 => Pioa,
            24 => Piob,
            25 => Pioc,
            26 => Pioe,
            27 => Uart0,
            28 => Uart1,
            29 => Usart2,
            30 => Usart3,
            31 => Usart4,
            32 => Twi0,
            33 => Twi1,
            34 => Twi2,
            35 => Hsmci0,
            36 => Hsmci1,
            37 => Spi0,
            38 => Spi1,
            39 => Spi2,
            40 => Tc0,
            41 => Tc1,
            42 => Tc2,
            43 => Pwm,
            44 => Adc,
            45 => Dbgu,
            46 => Uhphs,
            47 => Udphs,
            48 => Ssc0,
            49 => Ssc1,
            50 => Xdmac1,
            51 => Lcdc,
            52 => Isi,
            53 => Trng,
            54 => Gmac0,
            55 => Gmac1,
            56 => Irq,
            57 => Sfc,
            61 => Smd,
            62 => Twi3,
            64 => Sfr,
            65 => Aic,
            66 => Saic,
            67 => L2cc,
            _ => return None,
        })
    }

    /// Whether the peripheral sits on the 64-bit AHB matrix and is clocked at
    /// the full master clock frequency.
    pub fn is_on_h64mx(self) -> bool {
        matches!(
            self,
            PeripheralId::Arm
                | PeripheralId::Xdmac0
                | PeripheralId::Cpkcc
                | PeripheralId::Aesb
                | PeripheralId::Mpddrc
                | PeripheralId::Matrix0
                | PeripheralId::Vdec
                | PeripheralId::Xdmac1
                | PeripheralId::Lcdc
                | PeripheralId::L2cc
        )
    }
}

impl From<PeripheralId> for u32 {
    fn from(id: PeripheralId) -> u32 {
        id.id()
    }
}

/// SAMA5D41/42/43/44
///
/// Peripherals behind the H32MX matrix are reported at MCK / 2. The board
/// bootstrap must leave PMC_MCKR.H32MXDIV set, which it has to anyway once
/// MCK runs above the 90 MHz H32MX limit. The clock tree never reads or
/// writes that bit.
pub struct Sama5d4xSpecs;

impl ChipSpecs for Sama5d4xSpecs {
    const SLOW_CLOCK_INT_OSC_HZ: u32 = 32_000;
    const MAIN_CLOCK_INT_OSC_HZ: u32 = 12_000_000;
    const PERIPHERAL_COUNT: u32 = 68;

    fn peripheral_clock_divider(id: u32) -> u32 {
        match PeripheralId::from_id(id) {
            None => 0,
            Some(peripheral) if peripheral.is_on_h64mx() => 1,
            Some(_) => 2,
        }
    }
}
