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

use super::MaskHandle;
use thiserror::Error;
use umbra_core::renderer::ResourceError;

/// The error type a mask subscriber returns.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the [`MaskCache`](super::MaskCache).
#[derive(Debug, Error)]
pub enum MaskError {
    /// A mask with this name is already registered.
    #[error("A mask named '{0}' already exists")]
    DuplicateName(String),

    /// The handle does not refer to a registered mask.
    #[error("Unknown mask {0:?}")]
    UnknownMask(MaskHandle),

    /// An `updateStage` or `updateTexture` subscriber failed.
    #[error("Subscriber of mask '{mask}' failed: {source}")]
    Listener {
        /// The mask being rebuilt.
        mask: String,
        /// The subscriber's error.
        source: ListenerError,
    },

    /// The graphics device failed while the cache allocated or rendered.
    #[error("Device error on mask '{mask}': {source}")]
    Resource {
        /// The mask being rebuilt.
        mask: String,
        /// The device error.
        source: ResourceError,
    },
}
