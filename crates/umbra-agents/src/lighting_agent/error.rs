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

use thiserror::Error;
use umbra_core::intercept::InterceptError;
use umbra_core::renderer::{RenderError, ResourceError};
use umbra_core::SettingsError;
use umbra_lanes::composite_lane::FramebufferError;
use umbra_lanes::mask_lane::MaskError;
use umbra_lanes::region_lane::RegionError;

/// The error type host operations return.
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while running a scene session.
#[derive(Debug, Error)]
pub enum LightingError {
    /// A mask could not be created or rebuilt.
    #[error(transparent)]
    Mask(#[from] MaskError),

    /// A region operation referenced a duplicate or unknown identifier.
    #[error(transparent)]
    Region(#[from] RegionError),

    /// The framebuffer could not be drawn or refreshed.
    #[error(transparent)]
    Framebuffer(#[from] FramebufferError),

    /// An intercept chain was misconfigured.
    #[error(transparent)]
    Intercept(#[from] InterceptError),

    /// Settings could not be loaded.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The graphics device failed outside of a lane.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// The session could not acquire the resources it needs. The scene stays
    /// non-functional until a new session is created.
    #[error(transparent)]
    Initialization(#[from] RenderError),

    /// A host operation failed.
    #[error("Host operation failed: {0}")]
    Host(#[source] HostError),

    /// Shared occlusion state was poisoned by a panicking subscriber.
    #[error("Occlusion state is poisoned")]
    StatePoisoned,
}
