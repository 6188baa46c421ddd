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

use crate::math::{Extent2D, LinearRgba};
use crate::renderer::api::{CpuTexture, RenderTarget, Stage, TextureDescriptor, TextureId};
use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// The backend-agnostic GPU device used by every lane.
///
/// Implementations own all texture memory; callers only ever hold
/// [`TextureId`] handles. Every method takes `&self` so a single device can be
/// shared as an `Arc<dyn GraphicsDevice>` between the mask cache, the
/// framebuffer and the depth pass.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a new texture.
    /// ## Arguments
    /// * `descriptor` - A reference to a `TextureDescriptor` containing the texture configuration.
    /// ## Returns
    /// A `Result` containing the ID of the created texture or an error if the creation fails.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a texture.
    /// ## Arguments
    /// * `id` - The ID of the texture to be destroyed.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Returns the size of a live texture.
    fn texture_size(&self, id: TextureId) -> Result<Extent2D, ResourceError>;

    /// Renders a stage into a texture.
    /// ## Arguments
    /// * `target` - The texture and the scene-space viewport it covers.
    /// * `stage` - The draw commands and post-process filters to apply.
    /// * `clear` - When `Some`, the target is cleared to this color before drawing.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn render_stage(
        &self,
        target: &RenderTarget,
        stage: &Stage,
        clear: Option<LinearRgba>,
    ) -> Result<(), ResourceError>;

    /// Copies a texture's contents back to the CPU.
    fn read_texture(&self, id: TextureId) -> Result<CpuTexture, ResourceError>;

    /// Returns the number of textures currently alive on the device.
    fn live_texture_count(&self) -> usize;
}
