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

//! The composite lane: full-scene base textures, effect layer depth order,
//! the region depth pass and the illumination background sampler.

mod background;
mod depth;
mod error;
mod framebuffer;
mod layers;

pub use background::IlluminationBackground;
pub use depth::{DepthPass, DepthReport};
pub use error::FramebufferError;
pub use framebuffer::{FramebufferSlot, LightingFramebuffer};
pub use layers::{EffectLayer, EffectLayers, MeshContainer, SourceMesh};
