// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A typed observer table for named lifecycle events.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// An event that can be routed by a [`Dispatcher`].
pub trait Dispatchable {
    /// The discriminant listeners subscribe to.
    type Key: Copy + Eq + Hash + fmt::Debug;

    /// Returns the key this event is routed by.
    fn key(&self) -> Self::Key;
}

/// Whether a listener survives being fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerMode {
    /// Fires on every matching event until removed.
    On,
    /// Fires on the next matching event only, then is discarded.
    Once,
}

/// A handle identifying a registered listener, used to deregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<C, E, Err> = Box<dyn FnMut(&mut C, &E) -> Result<(), Err> + Send>;

struct Listener<C, E, Err> {
    id: ListenerId,
    mode: ListenerMode,
    callback: Callback<C, E, Err>,
}

/// Routes events to listeners registered for the event's key.
///
/// Listeners receive the owner's context `C` mutably, so the table is the
/// only thing that needs to know which component reacts to which event.
/// Within one key, listeners fire in registration order.
pub struct Dispatcher<E: Dispatchable, C, Err> {
    listeners: HashMap<E::Key, Vec<Listener<C, E, Err>>>,
    next_id: u64,
}

impl<E: Dispatchable, C, Err: fmt::Display> Dispatcher<E, C, Err> {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    /// Registers a listener that fires on every event with the given key.
    pub fn on(
        &mut self,
        key: E::Key,
        callback: impl FnMut(&mut C, &E) -> Result<(), Err> + Send + 'static,
    ) -> ListenerId {
        self.register(key, ListenerMode::On, Box::new(callback))
    }

    /// Registers a listener that fires on the next event with the given key only.
    pub fn once(
        &mut self,
        key: E::Key,
        callback: impl FnMut(&mut C, &E) -> Result<(), Err> + Send + 'static,
    ) -> ListenerId {
        self.register(key, ListenerMode::Once, Box::new(callback))
    }

    fn register(&mut self, key: E::Key, mode: ListenerMode, callback: Callback<C, E, Err>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(key).or_default().push(Listener { id, mode, callback });
        log::trace!("Registered {mode:?} listener {id:?} for {key:?}");
        id
    }

    /// Deregisters a listener. Returns `false` if it was not registered
    /// (already fired as a `Once` listener, or removed before).
    pub fn off(&mut self, id: ListenerId) -> bool {
        for entries in self.listeners.values_mut() {
            if let Some(pos) = entries.iter().position(|l| l.id == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deregisters every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Returns the number of listeners registered for `key`.
    pub fn listener_count(&self, key: E::Key) -> usize {
        self.listeners.get(&key).map_or(0, Vec::len)
    }

    /// Fires every listener registered for the event's key.
    ///
    /// A `Once` listener is removed from the table before it is invoked, so it
    /// never fires twice even if it fails. Every listener runs even when an
    /// earlier one fails; failures are logged and the first one is returned.
    ///
    /// # Returns
    ///
    /// The number of listeners that fired, or the first listener error.
    pub fn dispatch(&mut self, ctx: &mut C, event: &E) -> Result<usize, Err> {
        let key = event.key();
        let Some(entries) = self.listeners.get_mut(&key) else {
            return Ok(0);
        };

        let mut fired = 0;
        let mut first_error = None;
        let mut i = 0;
        while i < entries.len() {
            let result = if entries[i].mode == ListenerMode::Once {
                let mut listener = entries.remove(i);
                (listener.callback)(ctx, event)
            } else {
                let result = (entries[i].callback)(ctx, event);
                i += 1;
                result
            };
            fired += 1;
            if let Err(e) = result {
                log::error!("Listener for {key:?} failed: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(fired),
        }
    }
}

impl<E: Dispatchable, C, Err: fmt::Display> Default for Dispatcher<E, C, Err> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Dispatchable, C, Err> fmt::Debug for Dispatcher<E, C, Err> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("keys", &self.listeners.len())
            .field(
                "listeners",
                &self.listeners.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}
