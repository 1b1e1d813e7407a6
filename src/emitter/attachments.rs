//! Process-wide map from target identity to its emitter.
//!
//! Keyed by the target's address. Each entry keeps a weak reference to the
//! target, so an entry whose target has been dropped is recognised as stale
//! even when a new target is later allocated at the same address. Stale
//! entries are swept whenever a new emitter is attached.

use std::sync::{Arc, OnceLock, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::EventEmitter;
use crate::native::EventTarget;

struct Attachment {
    target: Weak<dyn EventTarget>,
    emitter: EventEmitter,
}

impl Attachment {
    fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }
}

static ATTACHMENTS: OnceLock<DashMap<usize, Attachment>> = OnceLock::new();

fn attachments() -> &'static DashMap<usize, Attachment> {
    ATTACHMENTS.get_or_init(DashMap::new)
}

fn target_key(target: &Arc<dyn EventTarget>) -> usize {
    Arc::as_ptr(target) as *const () as usize
}

/// The live emitter for `target`, or the one produced by `create`.
pub(crate) fn get_or_attach(
    target: &Arc<dyn EventTarget>,
    create: impl FnOnce() -> EventEmitter,
) -> EventEmitter {
    let key = target_key(target);
    if let Some(existing) = attachments().get(&key) {
        if existing.is_live() {
            return existing.emitter.clone();
        }
    }

    sweep();
    // Built outside the map lock: capability detection calls into the target.
    let emitter = create();
    match attachments().entry(key) {
        Entry::Occupied(mut entry) => {
            if entry.get().is_live() {
                return entry.get().emitter.clone();
            }
            entry.insert(Attachment {
                target: Arc::downgrade(target),
                emitter: emitter.clone(),
            });
        }
        Entry::Vacant(entry) => {
            entry.insert(Attachment {
                target: Arc::downgrade(target),
                emitter: emitter.clone(),
            });
        }
    }
    tracing::debug!(
        emitter = %emitter.id(),
        capability = %emitter.capability(),
        "emitter attached to target"
    );
    emitter
}

/// The emitter attached to `target`, without creating one.
pub fn lookup<T: EventTarget>(target: &Arc<T>) -> Option<EventEmitter> {
    let target: Arc<dyn EventTarget> = target.clone();
    attachments()
        .get(&target_key(&target))
        .filter(|attachment| attachment.is_live())
        .map(|attachment| attachment.emitter.clone())
}

/// Drop entries whose target is gone. Returns how many were removed.
pub fn sweep() -> usize {
    let map = attachments();
    let before = map.len();
    map.retain(|_, attachment| attachment.is_live());
    before.saturating_sub(map.len())
}

pub fn attached_count() -> usize {
    attachments().iter().filter(|it| it.is_live()).count()
}
