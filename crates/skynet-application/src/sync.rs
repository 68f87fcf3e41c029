use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use crate::buffer::Buffer;
use crate::error::ApplicationError;
use crate::service::SubService;
use crate::types::Message;

type ValuesCallback<T> = Box<dyn Fn(Vec<T>) + Send + Sync>;
type MessagesCallback<T> = Box<dyn Fn(Vec<Message<T>>) + Send + Sync>;

enum Sink<T> {
    Values(ValuesCallback<T>),
    Messages(MessagesCallback<T>),
    Buffered(Buffer<Vec<Message<T>>>),
}

struct State<T> {
    pending: Mutex<Vec<Option<Message<T>>>>,
    sink: Sink<T>,
}

impl<T> State<T> {
    /// Stores the newest message for service `index`; once every service has
    /// one, hands the whole group to the sink and starts over.
    fn accept(&self, index: usize, message: Message<T>) {
        let group = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            pending[index] = Some(message);
            if pending.iter().any(Option::is_none) {
                return;
            }
            pending.iter_mut().filter_map(Option::take).collect::<Vec<_>>()
        };
        match &self.sink {
            Sink::Values(callback) => callback(group.into_iter().map(|m| m.data).collect()),
            Sink::Messages(callback) => callback(group),
            Sink::Buffered(buffer) => {
                if buffer.push(group).is_some() {
                    tracing::debug!("unread synchronized group dropped");
                }
            }
        }
    }
}

/// Joins several subscribers: emits one group holding a message from each
/// service, in service order, every time all of them have delivered.
///
/// A service that delivers twice before the group completes only keeps its
/// newest message.
pub struct Synchronizer<T> {
    state: Arc<State<T>>,
}

impl<T: Clone + Send + Sync + 'static> Synchronizer<T> {
    /// Groups are kept in a single-slot buffer and read with
    /// [`Synchronizer::next_group`], [`Synchronizer::next_values`] or by
    /// iterating.
    pub fn buffered(services: &[SubService<T>]) -> Self {
        Self::attach(services, Sink::Buffered(Buffer::new(NonZeroUsize::MIN)))
    }

    /// Every complete group's values are passed to `callback`.
    pub fn with_values<F>(services: &[SubService<T>], callback: F) -> Self
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        Self::attach(services, Sink::Values(Box::new(callback)))
    }

    /// Every complete group's messages are passed to `callback`.
    pub fn with_messages<F>(services: &[SubService<T>], callback: F) -> Self
    where
        F: Fn(Vec<Message<T>>) + Send + Sync + 'static,
    {
        Self::attach(services, Sink::Messages(Box::new(callback)))
    }

    fn attach(services: &[SubService<T>], sink: Sink<T>) -> Self {
        let state = Arc::new(State {
            pending: Mutex::new(vec![None; services.len()]),
            sink,
        });
        for (index, service) in services.iter().enumerate() {
            let state: Weak<State<T>> = Arc::downgrade(&state);
            service.on_message_while(move |message: &Message<T>| match state.upgrade() {
                Some(state) => {
                    state.accept(index, message.clone());
                    true
                }
                None => false,
            });
        }
        Self { state }
    }

    /// The next complete group, waiting up to `timeout` (forever when `None`).
    ///
    /// # Errors
    /// Returns [`ApplicationError::CallbackMode`] when groups go to a
    /// callback instead.
    pub fn next_group(
        &self,
        timeout: Option<Duration>,
    ) -> Result<Option<Vec<Message<T>>>, ApplicationError> {
        match &self.state.sink {
            Sink::Buffered(buffer) => Ok(buffer.pop(timeout)),
            Sink::Values(_) | Sink::Messages(_) => Err(ApplicationError::CallbackMode),
        }
    }

    /// Like [`Synchronizer::next_group`], keeping only the values.
    ///
    /// # Errors
    /// Returns [`ApplicationError::CallbackMode`] when groups go to a
    /// callback instead.
    pub fn next_values(&self, timeout: Option<Duration>) -> Result<Option<Vec<T>>, ApplicationError> {
        Ok(self
            .next_group(timeout)?
            .map(|group| group.into_iter().map(|m| m.data).collect()))
    }

    /// Endless iterator over message groups.
    ///
    /// # Errors
    /// Returns [`ApplicationError::CallbackMode`] when groups go to a
    /// callback instead.
    pub fn messages(self) -> Result<Messages<T>, ApplicationError> {
        self.ensure_buffered()?;
        Ok(Messages { sync: self })
    }

    /// Endless iterator over value groups.
    ///
    /// # Errors
    /// Returns [`ApplicationError::CallbackMode`] when groups go to a
    /// callback instead.
    pub fn values(self) -> Result<Values<T>, ApplicationError> {
        self.ensure_buffered()?;
        Ok(Values { sync: self })
    }

    fn ensure_buffered(&self) -> Result<(), ApplicationError> {
        match self.state.sink {
            Sink::Buffered(_) => Ok(()),
            Sink::Values(_) | Sink::Messages(_) => Err(ApplicationError::CallbackMode),
        }
    }
}

/// Blocks on each `next` until the next group completes.
pub struct Messages<T> {
    sync: Synchronizer<T>,
}

impl<T: Clone + Send + Sync + 'static> Iterator for Messages<T> {
    type Item = Vec<Message<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.sync.next_group(None).ok().flatten()
    }
}

/// Blocks on each `next` until the next group completes.
pub struct Values<T> {
    sync: Synchronizer<T>,
}

impl<T: Clone + Send + Sync + 'static> Iterator for Values<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.sync.next_values(None).ok().flatten()
    }
}

/// Synchronized value groups from `services`.
pub fn join<T: Clone + Send + Sync + 'static>(services: &[SubService<T>]) -> Values<T> {
    Values {
        sync: Synchronizer::buffered(services),
    }
}

/// Synchronized message groups from `services`.
pub fn join_messages<T: Clone + Send + Sync + 'static>(services: &[SubService<T>]) -> Messages<T> {
    Messages {
        sync: Synchronizer::buffered(services),
    }
}
