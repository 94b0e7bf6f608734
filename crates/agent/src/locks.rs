use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use jarvis_core::domain::conversation::ConversationId;

/// Keyed async mutex: one in-flight message per conversation.
#[derive(Default)]
pub struct ConversationLocks {
    slots: Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    pub async fn acquire(&self, id: &ConversationId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.retain(|key, slot| key == id || Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(id.clone()).or_default())
        };
        slot.lock_owned().await
    }

    pub async fn tracked(&self) -> usize {
        self.slots.lock().await.len()
    }
}
