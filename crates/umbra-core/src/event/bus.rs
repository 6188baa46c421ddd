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


//! A queue for events raised outside the code that handles them.

/// An unbounded multi-producer queue of events of type `T`.
///
/// Producers hold cloned [`flume::Sender`]s and may live on any thread; the
/// owner drains the queue at a point of its choosing, so handling always
/// happens on the owner's thread and in send order.
#[derive(Debug)]
pub struct EventBus<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventBus<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Queues an event. The owner holds the receiver, so this cannot fail
    /// while the bus is alive.
    pub fn publish(&self, event: T) {
        if self.sender.send(event).is_err() {
            log::error!("Event dropped: queue receiver is gone");
        }
    }

    /// A producer handle for code that does not own the bus.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Removes and returns every queued event, oldest first.
    ///
    /// Events queued while the result is being handled wait for the next drain.
    pub fn drain(&self) -> Vec<T> {
        let events: Vec<T> = self.receiver.try_iter().collect();
        if !events.is_empty() {
            log::trace!("Drained {} queued events", events.len());
        }
        events
    }
}

impl<T: Send + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
