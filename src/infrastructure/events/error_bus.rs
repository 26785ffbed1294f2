use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

pub type ListenerId = u64;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// 型付き pub/sub チャンネル。ペイロードの形はチャンネルごとに固定。
///
/// Emission is synchronous and in registration order, against a snapshot
/// of the listeners taken at emit time: a listener unsubscribing (or
/// subscribing) during delivery does not affect the in-flight emit.
pub struct Channel<T> {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Listener<T>)>>,
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    /// 購読し、ドロップ時に必ず解除されるガードを返す。
    pub fn subscribe_scoped<F>(self: &Arc<Self>, listener: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Subscription {
            id: self.subscribe(listener),
            channel: Arc::clone(self),
        }
    }

    /// 現在の購読者へ登録順に同期配信する。
    pub fn emit(&self, payload: &T) {
        let snapshot: Vec<Listener<T>> = {
            let listeners = self
                .listeners
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in snapshot {
            listener(payload);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 購読ガード。スコープを抜けると（パニック経路を含め）解除される。
pub struct Subscription<T> {
    channel: Arc<Channel<T>>,
    id: ListenerId,
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.channel.unsubscribe(self.id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::Create => "create",
            OperationKind::Read => "read",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        };
        write!(f, "{label}")
    }
}

/// 権限エラーチャンネルのペイロード。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionErrorEvent {
    pub path: String,
    pub operation: OperationKind,
    pub message: String,
}

/// アプリ起動時に明示的に構築して配る型付きエラーバス。
///
/// Deep call stacks publish here instead of threading structured errors
/// through every intermediate return type.
pub struct ErrorBus {
    pub permission: Arc<Channel<PermissionErrorEvent>>,
}

impl ErrorBus {
    pub fn new() -> Self {
        Self {
            permission: Arc::new(Channel::new()),
        }
    }
}

impl Default for ErrorBus {
    fn default() -> Self {
        Self::new()
    }
}
