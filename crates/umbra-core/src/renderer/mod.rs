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

//! Provides the public, backend-agnostic rendering contracts for the overlay pipeline.
//!
//! This module defines the "common language" for every GPU-side operation the
//! pipeline performs: texture descriptors, the [`Stage`] draw-content
//! description, the [`GraphicsDevice`] trait and the rendering error types.
//!
//! The 'what' of rendering lives here, while the 'how' is handled by a
//! concrete backend in `umbra-infra` which implements these traits. The lanes
//! and agents use only these contracts, never a specific graphics API.

pub mod api;
pub mod error;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::error::{RenderError, ResourceError};
pub use self::traits::GraphicsDevice;
