// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral implementations for the SAMA5D4x family (Cortex-A5).
//!
//! Only the Power Management Controller and the part of the Slow Clock
//! Controller it depends on are implemented.

#![no_std]

pub mod chip_specs;
pub mod clocks;
pub mod pmc;
pub mod sckc;
