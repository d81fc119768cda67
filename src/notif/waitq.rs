use alloc::vec::Vec;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[cfg(feature = "defmt")]
use defmt::warn;

use super::{Handler, MAX_NOTIF_CMDS, NotifWait, RxPacket, WaitError, cmd_matches};

/// Blocking notification wait facility for hosted targets.
///
/// All armed waits share one list and one condition variable, so `notify`
/// can be called from any thread while other threads block in `wait`.
#[derive(Default)]
pub struct NotifWaitData {
    list: Mutex<WaitList>,
    waitq: Condvar,
}

#[derive(Default)]
struct WaitList {
    next_id: u64,
    waits: Vec<WaitEntry>,
}

struct WaitEntry {
    id: u64,
    cmds: Vec<u16>,
    handler: Option<Handler>,
    triggered: bool,
    aborted: bool,
}

impl WaitList {
    fn find(&self, id: u64) -> Option<&WaitEntry> {
        self.waits.iter().find(|entry| entry.id == id)
    }

    fn remove(&mut self, id: u64) -> Option<WaitEntry> {
        let index = self.waits.iter().position(|entry| entry.id == id)?;
        Some(self.waits.swap_remove(index))
    }
}

/// An armed wait on a [`NotifWaitData`].
///
/// Dropping it without calling [`NotifWaitData::wait`] removes it from the
/// list again.
#[must_use = "an armed wait does nothing unless waited on"]
pub struct NotificationWait<'a> {
    data: &'a NotifWaitData,
    id: u64,
}

impl Drop for NotificationWait<'_> {
    fn drop(&mut self) {
        self.data.lock().remove(self.id);
    }
}

impl NotifWaitData {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, WaitList> {
        self.list.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arms a wait for any of `cmds`. Ids past [`MAX_NOTIF_CMDS`] are ignored.
    pub fn init_wait(&self, cmds: &[u16], handler: Option<Handler>) -> NotificationWait<'_> {
        let n_cmds = if cmds.len() > MAX_NOTIF_CMDS {
            #[cfg(feature = "defmt")]
            warn!("init_wait: {} cmds, only {} are matched", cmds.len(), MAX_NOTIF_CMDS);

            #[cfg(feature = "debug-logs")]
            println!("notif: init_wait: {} cmds, only {MAX_NOTIF_CMDS} are matched", cmds.len());

            MAX_NOTIF_CMDS
        } else {
            cmds.len()
        };

        let mut list = self.lock();
        let id = list.next_id;
        list.next_id += 1;
        list.waits.push(WaitEntry {
            id,
            cmds: cmds[..n_cmds].to_vec(),
            handler,
            triggered: false,
            aborted: false,
        });

        NotificationWait { data: self, id }
    }

    /// Runs the handlers of all armed waits interested in `pkt` and wakes the
    /// waiting contexts if at least one of them completed.
    ///
    /// Returns whether any wait completed.
    pub fn notify(&self, pkt: &RxPacket<'_>) -> bool {
        let received = pkt.wide_id();
        let mut triggered = false;

        let mut list = self.lock();
        for entry in list.waits.iter_mut() {
            if entry.triggered || entry.aborted {
                continue;
            }

            if !entry.cmds.iter().any(|&id| cmd_matches(id, received)) {
                continue;
            }

            let done = match entry.handler.as_mut() {
                Some(handler) => handler(pkt),
                None => true,
            };
            if done {
                entry.triggered = true;
                triggered = true;
            }
        }
        drop(list);

        if triggered {
            self.waitq.notify_all();
        }
        triggered
    }

    /// Fails every currently armed wait with [`WaitError::Aborted`]. Waits
    /// armed afterwards are not affected.
    pub fn abort(&self) {
        let mut list = self.lock();
        for entry in list.waits.iter_mut() {
            entry.aborted = true;
        }
        drop(list);

        self.waitq.notify_all();
    }

    /// Disarms `wait` without waiting for it.
    pub fn remove(&self, wait: NotificationWait<'_>) {
        drop(wait);
    }

    /// Number of armed waits.
    pub fn pending(&self) -> usize {
        self.lock().waits.len()
    }

    /// Blocks until `wait` completes, is aborted, or `timeout` has elapsed.
    pub fn wait(&self, wait: NotificationWait<'_>, timeout: Duration) -> Result<(), WaitError> {
        debug_assert!(core::ptr::eq(self, wait.data));
        let id = wait.id;

        let list = self.lock();
        let (mut list, _) = self
            .waitq
            .wait_timeout_while(list, timeout, |list| {
                list.find(id)
                    .is_some_and(|entry| !entry.triggered && !entry.aborted)
            })
            .unwrap_or_else(PoisonError::into_inner);

        let entry = list.remove(id);
        drop(list);
        // already removed, the drop only has to find nothing
        drop(wait);

        match entry {
            Some(WaitEntry { aborted: true, .. }) => Err(WaitError::Aborted),
            Some(WaitEntry { triggered: true, .. }) => Ok(()),
            _ => Err(WaitError::Timeout),
        }
    }
}

impl NotifWait for NotifWaitData {
    type Wait<'a> = NotificationWait<'a>;

    fn init_wait(&self, cmds: &[u16], handler: Option<Handler>) -> Self::Wait<'_> {
        NotifWaitData::init_wait(self, cmds, handler)
    }

    fn wait<'a>(&'a self, wait: Self::Wait<'a>, timeout: Duration) -> Result<(), WaitError> {
        NotifWaitData::wait(self, wait, timeout)
    }
}
