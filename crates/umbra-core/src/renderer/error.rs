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


//! Errors raised by graphics devices and by render-resource setup.

use crate::renderer::api::TextureId;
use std::fmt;

/// A device could not create, use or release a texture.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The handle was never issued or its texture was destroyed.
    InvalidTexture(TextureId),
    /// Zero width or height requested.
    EmptyExtent {
        /// Debug label of the requested texture.
        label: Option<String>,
    },
    /// The allocation would exceed the device's texture memory.
    OutOfMemory {
        /// Size of the refused allocation, in bytes.
        requested: usize,
    },
    /// A stage could not be drawn: degenerate geometry, non-finite values or
    /// an empty viewport. Nothing was written to the target.
    Rasterization(String),
    /// The device itself failed.
    Backend(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidTexture(id) => write!(f, "No live texture for {id:?}"),
            ResourceError::EmptyExtent { label } => write!(
                f,
                "Texture '{}' requested with an empty extent",
                label.as_deref().unwrap_or("<unlabeled>")
            ),
            ResourceError::OutOfMemory { requested } => {
                write!(f, "Texture memory exhausted ({requested} bytes refused)")
            }
            ResourceError::Rasterization(msg) => write!(f, "Cannot rasterize stage: {msg}"),
            ResourceError::Backend(msg) => write!(f, "Graphics device failure: {msg}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// A session could not get the render resources it needs to start.
#[derive(Debug)]
pub enum RenderError {
    /// Setup failed; the session must not be used.
    InitializationFailed(String),
    /// A required resource could not be provided.
    Resource(ResourceError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "Render setup failed: {msg}")
            }
            RenderError::Resource(err) => write!(f, "Render resource unavailable: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(err) => Some(err),
            RenderError::InitializationFailed(_) => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}
