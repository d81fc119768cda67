//! Waiting for firmware notifications.
//!
//! A caller arms a wait for a set of command ids before it triggers the
//! firmware, then blocks on it. The driver's RX path feeds every received
//! notification into the facility, which runs the handler of each matching
//! waiter and wakes the ones that are satisfied.

use alloc::boxed::Box;
use core::time::Duration;

use crate::api::{LEGACY_GROUP, def_id, group_id, wide_id};
pub use crate::error::WaitError;

#[cfg(feature = "std")]
mod waitq;
#[cfg(feature = "std")]
pub use waitq::{NotifWaitData, NotificationWait};

/// Maximum number of command ids a single wait can match.
pub const MAX_NOTIF_CMDS: usize = 5;

/// A notification as delivered by the RX path.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RxPacket<'a> {
    pub group_id: u8,
    pub cmd: u8,
    pub data: &'a [u8],
}

impl<'a> RxPacket<'a> {
    pub const fn new(group_id: u8, cmd: u8, data: &'a [u8]) -> Self {
        Self {
            group_id,
            cmd,
            data,
        }
    }

    pub const fn wide_id(&self) -> u16 {
        wide_id(self.group_id, self.cmd)
    }
}

/// Called for each matching packet. Returning `true` completes the wait,
/// `false` keeps it armed for the next matching packet.
pub type Handler = Box<dyn FnMut(&RxPacket<'_>) -> bool + Send>;

/// True if a waiter registered for `id` is interested in a packet with
/// `received` as its wide id. Legacy ids also match when the firmware sends
/// them in the long group.
pub const fn cmd_matches(id: u16, received: u16) -> bool {
    id == received || (group_id(id) == LEGACY_GROUP && def_id(id) == received)
}

/// A notification wait facility shared between the waiting context and the
/// driver's RX path.
pub trait NotifWait {
    /// Handle of an armed wait. Consumed by [`NotifWait::wait`]; dropping it
    /// without waiting disarms it.
    type Wait<'a>
    where
        Self: 'a;

    /// Arms a wait for any of `cmds`. Only the first [`MAX_NOTIF_CMDS`] ids
    /// are used. Without a handler the first matching packet completes the
    /// wait.
    fn init_wait(&self, cmds: &[u16], handler: Option<Handler>) -> Self::Wait<'_>;

    /// Blocks until the wait completes, is aborted or `timeout` elapses.
    fn wait<'a>(&'a self, wait: Self::Wait<'a>, timeout: Duration) -> Result<(), WaitError>;
}
