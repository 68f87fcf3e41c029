use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::types::{DataType, Message, ServiceDescriptor, ServiceType};

/// Anything that can be exposed to the node.
pub trait Service {
    fn descriptor(&self) -> &ServiceDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }
}

/// Latest-value slot: a write replaces any unread value and wakes waiters.
struct Mailbox<T> {
    slot: Mutex<Option<T>>,
    changed: Condvar,
}

impl<T> Mailbox<T> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            changed: Condvar::new(),
        }
    }

    fn put(&self, value: T) {
        let replaced = self.lock().replace(value).is_some();
        if replaced {
            tracing::trace!("unread value replaced");
        }
        self.changed.notify_all();
    }

    fn take(&self) -> Option<T> {
        self.lock().take()
    }

    /// Takes the pending value, waiting up to `timeout` when there is none.
    /// A zero timeout never waits.
    fn wait_take(&self, timeout: Duration) -> Option<T> {
        let mut slot = self.lock();
        if slot.is_some() || timeout.is_zero() {
            return slot.take();
        }
        let (mut slot, _) = self
            .changed
            .wait_timeout_while(slot, timeout, |slot| slot.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        slot.take()
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publisher side of a topic. Cloning yields another handle to the same
/// service.
pub struct PubService<T> {
    inner: Arc<PubInner<T>>,
}

struct PubInner<T> {
    descriptor: ServiceDescriptor,
    outgoing: Mailbox<Message<T>>,
    sequence: AtomicU64,
}

impl<T> Clone for PubService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PubService<T> {
    pub fn new(name: impl Into<String>, data: DataType) -> Self {
        Self {
            inner: Arc::new(PubInner {
                descriptor: ServiceDescriptor::new(name, ServiceType::Pub, data),
                outgoing: Mailbox::new(),
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// Queues `value` for the sender. Only the latest unsent value is kept.
    pub fn publish(&self, value: T) {
        let sequence = self.inner.sequence.fetch_add(1, Ordering::Relaxed);
        self.inner.outgoing.put(Message::new(value, sequence));
    }

    /// Sender side: the next value to put on the wire, if one arrives within
    /// `timeout`.
    pub fn take_outgoing(&self, timeout: Duration) -> Option<Message<T>> {
        self.inner.outgoing.wait_take(timeout)
    }
}

impl<T> Service for PubService<T> {
    fn descriptor(&self) -> &ServiceDescriptor {
        &self.inner.descriptor
    }
}

type ValueCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type MessageCallback<T> = Arc<dyn Fn(&Message<T>) + Send + Sync>;
type ExpiringCallback<T> = Arc<dyn Fn(&Message<T>) -> bool + Send + Sync>;

enum Callback<T> {
    Value(ValueCallback<T>),
    Message(MessageCallback<T>),
    /// Unregistered the first time it returns `false`.
    Expiring(ExpiringCallback<T>),
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        match self {
            Callback::Value(callback) => Callback::Value(Arc::clone(callback)),
            Callback::Message(callback) => Callback::Message(Arc::clone(callback)),
            Callback::Expiring(callback) => Callback::Expiring(Arc::clone(callback)),
        }
    }
}

/// Subscriber side of a topic. Cloning yields another handle to the same
/// service.
pub struct SubService<T> {
    inner: Arc<SubInner<T>>,
}

struct SubInner<T> {
    descriptor: ServiceDescriptor,
    incoming: Mailbox<T>,
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T> Clone for SubService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> SubService<T> {
    pub fn new(name: impl Into<String>, data: DataType) -> Self {
        Self {
            inner: Arc::new(SubInner {
                descriptor: ServiceDescriptor::new(name, ServiceType::Sub, data),
                incoming: Mailbox::new(),
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The pending value, if any. A zero `timeout` never waits; otherwise
    /// waits up to `timeout` for a delivery.
    pub fn receive(&self, timeout: Duration) -> Option<T> {
        self.inner.incoming.wait_take(timeout)
    }

    pub fn try_receive(&self) -> Option<T> {
        self.inner.incoming.take()
    }

    pub fn on_value<F>(&self, callback: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.callbacks().push(Callback::Value(Arc::new(callback)));
    }

    pub fn on_message<F>(&self, callback: F)
    where
        F: Fn(&Message<T>) + Send + Sync + 'static,
    {
        self.callbacks().push(Callback::Message(Arc::new(callback)));
    }

    /// Like [`SubService::on_message`], dropped once `callback` returns
    /// `false`.
    pub(crate) fn on_message_while<F>(&self, callback: F)
    where
        F: Fn(&Message<T>) -> bool + Send + Sync + 'static,
    {
        self.callbacks().push(Callback::Expiring(Arc::new(callback)));
    }

    /// Transport side: stores the value for `receive` and runs every
    /// registered callback in registration order.
    pub fn deliver(&self, message: Message<T>) {
        self.inner.incoming.put(message.data.clone());
        let callbacks = self.callbacks().clone();
        let mut expired = Vec::new();
        for callback in callbacks {
            match callback {
                Callback::Value(callback) => callback(&message.data),
                Callback::Message(callback) => callback(&message),
                Callback::Expiring(callback) => {
                    if !callback(&message) {
                        expired.push(callback);
                    }
                }
            }
        }
        if !expired.is_empty() {
            self.callbacks().retain(|registered| match registered {
                Callback::Expiring(callback) => {
                    !expired.iter().any(|gone| Arc::ptr_eq(gone, callback))
                }
                Callback::Value(_) | Callback::Message(_) => true,
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn callback_count(&self) -> usize {
        self.callbacks().len()
    }

    fn callbacks(&self) -> MutexGuard<'_, Vec<Callback<T>>> {
        self.inner
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Service for SubService<T> {
    fn descriptor(&self) -> &ServiceDescriptor {
        &self.inner.descriptor
    }
}
