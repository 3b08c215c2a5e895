use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::ChannelId;

/// Proof of exclusive access to a channel; the gate opens when dropped.
pub type GatePermit = OwnedMutexGuard<()>;

/// One mutual-exclusion lock per channel, created on first use.
///
/// At most one completion request may be in flight per channel. Callers
/// that find the gate held are expected to reject, not wait.
pub trait ChannelGate: Send + Sync {
    /// The channel's lock, created if absent.
    fn acquire(&self, channel_id: ChannelId) -> Arc<AsyncMutex<()>>;

    /// Whether the channel's lock is currently held. Never blocks.
    fn try_is_busy(&self, channel_id: ChannelId) -> bool {
        self.acquire(channel_id).try_lock().is_err()
    }

    /// Take the channel's lock if it is free.
    ///
    /// The check and the acquisition are one step, so two racing callers
    /// can never both get a permit.
    fn try_enter(&self, channel_id: ChannelId) -> Option<GatePermit> {
        self.acquire(channel_id).try_lock_owned().ok()
    }
}

/// [`ChannelGate`] backed by a map of locks. Entries are never removed.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<ChannelId, Arc<AsyncMutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of channels that have a lock.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChannelGate for LockRegistry {
    fn acquire(&self, channel_id: ChannelId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(channel_id).or_default())
    }
}
