#![doc = include_str ! ("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

pub mod api;
pub mod config;
pub mod error;
pub mod notif;
pub mod platform;
mod pnvm;
pub mod regs;

pub use config::{LoadStrategy, LoaderConfig};
pub use pnvm::{PnvmLoader, load, pnvm_file_name};

extern crate alloc;

use core::fmt;

/// Hardware variant identifier read from the device during bring-up.
///
/// An all-zero id means that there is no platform specific configuration
/// for this device and the PNVM step is skipped entirely.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SkuId(pub [u8; 3]);

impl SkuId {
    pub const EMPTY: SkuId = SkuId([0; 3]);

    pub const fn new(id: [u8; 3]) -> Self {
        Self(id)
    }

    /// True if all three bytes are zero.
    pub const fn is_empty(&self) -> bool {
        let SkuId([a, b, c]) = *self;
        a == 0 && b == 0 && c == 0
    }

    pub const fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl fmt::Debug for SkuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let SkuId([a, b, c]) = self;
        write!(f, "SkuId({a:02x}:{b:02x}:{c:02x})")
    }
}

impl From<[u8; 3]> for SkuId {
    fn from(value: [u8; 3]) -> Self {
        Self(value)
    }
}

/// Load state latch kept on the transport.
///
/// The loader moves it away from `NotAttempted` on the first call for a device
/// with a non-empty [`SkuId`] and never moves it back. Drivers reset it to
/// `NotAttempted` themselves when the device is detached and attached again.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PnvmState {
    #[default]
    NotAttempted,
    /// Attempted without handing any data to the transport, either because
    /// loading is disabled or because no PNVM file was found.
    Skipped,
    /// A PNVM image was handed to the transport.
    Loaded,
}

impl PnvmState {
    pub const fn is_attempted(self) -> bool {
        !matches!(self, PnvmState::NotAttempted)
    }
}
