use core::time::Duration;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// How long the firmware gets to answer the PNVM doorbell.
pub const MVM_UCODE_PNVM_TIMEOUT: Duration = Duration::from_millis(250);

/// What to do on the first load for a device.
///
/// Parses from and prints as `skip` and `file-based`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[strum(serialize_all = "kebab-case")]
pub enum LoadStrategy {
    /// Do not look for a PNVM file at all and only latch the load state.
    /// Firmware that predates PNVM files expects exactly this.
    #[default]
    Skip,
    /// Request `<fw_name_pre>.pnvm` from the firmware source and hand it to
    /// the transport. A missing file is treated like [`LoadStrategy::Skip`].
    FileBased,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    pub strategy: LoadStrategy,
    pub timeout: Duration,
}

impl LoaderConfig {
    pub const fn new() -> Self {
        Self {
            strategy: LoadStrategy::Skip,
            timeout: MVM_UCODE_PNVM_TIMEOUT,
        }
    }

    pub const fn with_strategy(self, strategy: LoadStrategy) -> Self {
        Self { strategy, ..self }
    }

    pub const fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new()
    }
}
