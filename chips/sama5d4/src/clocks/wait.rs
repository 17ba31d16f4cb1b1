// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Strategies for waiting on PMC status bits.
//!
//! Every clock change on the PMC ends with polling a ready or lock bit. How long
//! to keep polling is a board decision, so [crate::clocks::Clocks] takes the
//! strategy as a type parameter:
//!
//! + [BusyWait] polls forever. If the hardware never answers, neither does the
//! caller.
//! + [BoundedWait] gives up after a fixed number of polls and reports
//! [ErrorCode::BUSY].

use kernel::ErrorCode;

/// A way of waiting for the hardware.
pub trait ReadyWait {
    /// Poll `ready` until it returns true.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::BUSY]\): if the strategy gave up before `ready` returned true.
    fn wait_until<F: FnMut() -> bool>(&self, ready: F) -> Result<(), ErrorCode>;

    /// Spin for `iterations` loop iterations without checking anything.
    fn settle(&self, iterations: u32);
}

/// Poll until the condition holds, however long that takes.
#[derive(Copy, Clone, Debug, Default)]
pub struct BusyWait;

impl ReadyWait for BusyWait {
    fn wait_until<F: FnMut() -> bool>(&self, mut ready: F) -> Result<(), ErrorCode> {
        while !ready() {
            core::hint::spin_loop();
        }
        Ok(())
    }

    fn settle(&self, iterations: u32) {
        for _ in 0..iterations {
            core::hint::spin_loop();
        }
    }
}

/// Poll at most `max_polls` times.
#[derive(Copy, Clone, Debug)]
pub struct BoundedWait {
    pub max_polls: usize,
}

impl BoundedWait {
    pub const fn new(max_polls: usize) -> Self {
        Self { max_polls }
    }
}

impl ReadyWait for BoundedWait {
    fn wait_until<F: FnMut() -> bool>(&self, mut ready: F) -> Result<(), ErrorCode> {
        for _ in 0..self.max_polls {
            if ready() {
                return Ok(());
            }
            core::hint::spin_loop();
        }

        Err(ErrorCode::BUSY)
    }

    fn settle(&self, iterations: u32) {
        BusyWait.settle(iterations);
    }
}
