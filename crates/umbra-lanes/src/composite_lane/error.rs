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
use umbra_core::renderer::ResourceError;

/// Errors raised by the framebuffer compositor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FramebufferError {
    /// `refresh` or sampling was requested before `draw` (or after `tear_down`).
    #[error("The lighting framebuffer has not been drawn")]
    NotDrawn,

    /// The graphics device failed.
    #[error("Framebuffer device error: {0}")]
    Resource(#[from] ResourceError),
}
