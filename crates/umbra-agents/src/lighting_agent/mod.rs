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

//! Acts as the **[A]gent** for the lighting overlay of one open scene.
//!
//! The [`SceneSession`] is the only object the host talks to. It owns the
//! [`LightingAgent`] (every piece of session state), the [`HostHooks`]
//! intercept chains standing in for the host operations the overlay takes
//! over, and the lifecycle [`Dispatcher`](umbra_core::event::Dispatcher)
//! reacting to the host's scene events.

mod agent;
mod error;
mod frame;
mod hooks;
mod host;
mod lifecycle;
mod occlusion;
mod session;

pub use agent::LightingAgent;
pub use error::{HostError, LightingError};
pub use frame::{FrameReport, FrameStep};
pub use hooks::HostHooks;
pub use host::{OccludingToken, OcclusionMaskSprite, RoofSprite, SceneHost};
pub use lifecycle::{LifecycleDispatcher, LifecycleEvent};
pub use occlusion::OcclusionState;
pub use session::SceneSession;
