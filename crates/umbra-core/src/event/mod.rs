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

//! Provides foundational primitives for event-driven communication.
//!
//! - [`EventBus`] is a generic MPSC channel the host uses to post events from
//!   anywhere, to be drained at a well-defined point of the frame.
//! - [`Dispatcher`] is the typed observer table that routes one drained event
//!   to every listener registered for its key, with `on`/`once` semantics.

mod bus;
mod dispatch;

pub use self::bus::EventBus;
pub use self::dispatch::{Dispatchable, Dispatcher, ListenerId, ListenerMode};
