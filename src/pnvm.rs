use alloc::boxed::Box;
use alloc::string::String;

#[cfg(feature = "defmt")]
use defmt::{debug, trace};

use crate::api::{PNVM_INIT_COMPLETE, PnvmInitCompleteNtfy};
use crate::config::{LoadStrategy, LoaderConfig};
use crate::error::Error;
use crate::notif::{Handler, NotifWait, RxPacket};
use crate::platform::{Platform, Transport};
use crate::regs::{UREG_DOORBELL_TO_ISR6, UREG_DOORBELL_TO_ISR6_PNVM};
use crate::PnvmState;

/// Longest PNVM file name, not counting the terminator the firmware loader
/// of the host would append.
const MAX_PNVM_NAME_LENGTH: usize = 63;

/// Loads the PNVM with the default [`LoaderConfig`].
///
/// See [`PnvmLoader::load`].
pub fn load<P, W>(trans: &mut P, notif_wait: &W) -> Result<(), Error<<P as Transport>::Error>>
where
    P: Platform,
    W: NotifWait,
{
    PnvmLoader::default().load(trans, notif_wait)
}

/// Builds the PNVM file name from the firmware name prefix.
///
/// The prefix ends with a hyphen which becomes the dot of the extension:
/// `iwlwifi-ty-a0-gf-a0-` gives `iwlwifi-ty-a0-gf-a0.pnvm`. The result is cut
/// to 63 bytes, and the last byte of the prefix is only replaced if the
/// prefix itself fits.
pub fn pnvm_file_name(fw_name_pre: &str) -> String {
    let mut name = String::with_capacity(fw_name_pre.len() + 4);
    name.push_str(fw_name_pre);
    name.push_str("pnvm");

    if name.len() > MAX_PNVM_NAME_LENGTH {
        let mut end = MAX_PNVM_NAME_LENGTH;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }

    if let Some(last) = fw_name_pre.char_indices().next_back() {
        let (index, c) = last;
        if fw_name_pre.len() <= MAX_PNVM_NAME_LENGTH {
            name.replace_range(index..index + c.len_utf8(), ".");
        }
    }

    name
}

fn pnvm_complete(pkt: &RxPacket<'_>) -> bool {
    match PnvmInitCompleteNtfy::from_bytes(pkt.data) {
        Some(_ntfy) => {
            #[cfg(feature = "defmt")]
            debug!("PNVM complete notification received with status {}", _ntfy.status);

            #[cfg(feature = "debug-logs")]
            println!("pnvm: complete notification received with status {}", _ntfy.status);
        }
        None => {
            #[cfg(feature = "defmt")]
            debug!("PNVM complete notification received, {} byte payload", pkt.data.len());

            #[cfg(feature = "debug-logs")]
            println!("pnvm: complete notification received, {} byte payload", pkt.data.len());
        }
    }

    true
}

/// Loads the PNVM into a device and waits for the firmware to take it.
#[derive(Debug, Clone, Default)]
pub struct PnvmLoader {
    config: LoaderConfig,
}

impl PnvmLoader {
    pub const fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Makes the PNVM available to the firmware, rings the PNVM doorbell and
    /// blocks until the firmware answers with `PNVM_INIT_COMPLETE` or the
    /// configured timeout expires.
    ///
    /// 1. Devices with an empty SKU id have no PNVM and return right away.
    /// 2. The first call runs the configured [`LoadStrategy`] and latches
    ///    the load state, also when no PNVM file exists. Only a file the
    ///    transport rejects leaves it open. Later calls only re-apply the PNVM
    ///    the transport kept, and fail early if that fails.
    /// 3. The completion wait is armed before the doorbell is rung, so a fast
    ///    firmware cannot answer before anyone listens.
    ///
    /// The status in the completion notification is only logged.
    pub fn load<P, W>(&self, trans: &mut P, notif_wait: &W) -> Result<(), Error<<P as Transport>::Error>>
    where
        P: Platform,
        W: NotifWait,
    {
        if trans.sku_id().is_empty() {
            #[cfg(feature = "debug-logs")]
            println!("pnvm: empty sku id, nothing to load");

            return Ok(());
        }

        if trans.pnvm_state().is_attempted() {
            #[cfg(feature = "defmt")]
            trace!("load: re-applying pnvm");

            #[cfg(feature = "debug-logs")]
            println!("pnvm: already loaded, re-applying");

            trans.set_pnvm(None).map_err(Error::SetPnvm)?;
        } else {
            self.load_once(trans);
        }

        let handler: Handler = Box::new(pnvm_complete);
        let pnvm_wait = notif_wait.init_wait(&[PNVM_INIT_COMPLETE], Some(handler));

        trans.write_umac_prph(UREG_DOORBELL_TO_ISR6, UREG_DOORBELL_TO_ISR6_PNVM);

        notif_wait.wait(pnvm_wait, self.config.timeout)?;
        Ok(())
    }

    fn load_once<P: Platform>(&self, trans: &mut P) {
        match self.config.strategy {
            LoadStrategy::Skip => {
                #[cfg(feature = "defmt")]
                trace!("load: skipping pnvm file");

                trans.set_pnvm_state(PnvmState::Skipped);
            }
            LoadStrategy::FileBased => {
                let name = pnvm_file_name(trans.fw_name_pre());

                match trans.request_firmware(&name) {
                    Ok(image) => {
                        #[cfg(feature = "defmt")]
                        debug!("PNVM file {} loaded, {} bytes", name.as_str(), image.len());

                        #[cfg(feature = "debug-logs")]
                        println!("pnvm: file {name} loaded, {} bytes", image.len());

                        // a failed hand-over leaves the latch open so the
                        // next load tries the file again
                        if trans.set_pnvm(Some(image.as_slice())).is_ok() {
                            trans.set_pnvm_state(PnvmState::Loaded);
                        } else {
                            #[cfg(feature = "defmt")]
                            debug!("PNVM file {} rejected by the transport", name.as_str());

                            #[cfg(feature = "debug-logs")]
                            println!("pnvm: file {name} rejected by the transport");
                        }
                    }
                    Err(_err) => {
                        #[cfg(feature = "defmt")]
                        debug!(
                            "PNVM file {} not found {}",
                            name.as_str(),
                            defmt::Debug2Format(&_err)
                        );

                        #[cfg(feature = "debug-logs")]
                        println!("pnvm: file {name} not found {_err:?}");

                        // tried and failed, retrying on every load would not
                        // find it either
                        trans.set_pnvm_state(PnvmState::Skipped);
                    }
                }
            }
        }
    }
}
