use std::{collections::HashMap, sync::Arc};

use engine::EntityId;
use tokio::sync::Mutex;

use crate::{SessionId, step::ActiveWorkflow};

/// A destructive action waiting for a yes/no answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pending {
    DeletePurchase(EntityId),
    DeleteSale(EntityId),
    DeleteCost(EntityId),
    DeletePartnerTransaction(EntityId),
    ClearAll,
}

#[derive(Debug, Default)]
pub(crate) enum Session {
    #[default]
    Idle,
    InStep(Box<dyn ActiveWorkflow>),
    Confirm(Pending),
}

impl Session {
    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Per-conversation state.
///
/// A session is taken out of the map while one event is processed and put
/// back afterwards, so the map lock is never held across ledger I/O.
#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl SessionStore {
    pub(crate) async fn take(&self, id: SessionId) -> Session {
        let mut guard = self.inner.lock().await;
        guard.remove(&id).unwrap_or_default()
    }

    pub(crate) async fn put(&self, id: SessionId, session: Session) {
        let mut guard = self.inner.lock().await;
        if session.is_idle() {
            guard.remove(&id);
        } else {
            guard.insert(id, session);
        }
    }

    pub(crate) async fn is_idle(&self, id: SessionId) -> bool {
        let guard = self.inner.lock().await;
        guard.get(&id).is_none_or(Session::is_idle)
    }
}
