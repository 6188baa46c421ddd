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

use super::mask::Mask;
use super::{ListenerError, MaskDescriptor, MaskError, MaskFrame, MaskHandle, MaskStats};
use ahash::AHashMap;
use std::fmt;
use std::sync::Arc;
use umbra_core::math::{Extent2D, Rect};
use umbra_core::renderer::{GraphicsDevice, Stage, TextureId};

/// A named, lazily rebuilt set of GPU masks.
///
/// Producers never push textures into the cache. They subscribe to a mask's
/// `updateStage` / `updateTexture` events and the cache fires them the first
/// time a dirty mask is read. A mask is rebuilt at most once per dirty period
/// no matter how often it is read, and only the cache clears dirty flags.
pub struct MaskCache {
    device: Arc<dyn GraphicsDevice>,
    masks: Vec<Mask>,
    names: AHashMap<String, MaskHandle>,
    viewport: Rect,
    resolution: f32,
}

impl MaskCache {
    /// Creates an empty cache whose textures cover `viewport` at `resolution`
    /// texels per scene pixel.
    pub fn new(device: Arc<dyn GraphicsDevice>, viewport: Rect, resolution: f32) -> Self {
        Self {
            device,
            masks: Vec::new(),
            names: AHashMap::new(),
            viewport,
            resolution: resolution.max(f32::EPSILON),
        }
    }

    /// Registers a new mask. The mask starts dirty with an empty stage.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::DuplicateName`] if `name` is already registered.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        descriptor: MaskDescriptor,
    ) -> Result<MaskHandle, MaskError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(MaskError::DuplicateName(name));
        }
        let handle = MaskHandle(self.masks.len());
        log::debug!("Created mask '{name}' in groups {:?}", descriptor.groups);
        self.names.insert(name.clone(), handle);
        self.masks.push(Mask::new(name, descriptor));
        Ok(handle)
    }

    fn mask(&self, handle: MaskHandle) -> Result<&Mask, MaskError> {
        self.masks.get(handle.0).ok_or(MaskError::UnknownMask(handle))
    }

    fn mask_mut(&mut self, handle: MaskHandle) -> Result<&mut Mask, MaskError> {
        self.masks
            .get_mut(handle.0)
            .ok_or(MaskError::UnknownMask(handle))
    }

    /// Marks a mask dirty. Does not rebuild anything; repeated calls before
    /// the next read have the effect of one.
    pub fn invalidate(&mut self, handle: MaskHandle) -> Result<(), MaskError> {
        let mask = self.mask_mut(handle)?;
        mask.invalidate();
        log::trace!("Invalidated mask '{}'", mask.name);
        Ok(())
    }

    /// Marks every mask dirty.
    pub fn invalidate_all(&mut self) {
        self.masks.iter_mut().for_each(Mask::invalidate);
    }

    /// Subscribes to a mask's `updateStage` event, fired when a dirty mask is
    /// read and its stage must be repopulated.
    pub fn on_update_stage(
        &mut self,
        handle: MaskHandle,
        listener: impl FnMut(&mut MaskFrame<'_>) -> Result<(), ListenerError> + Send + 'static,
    ) -> Result<(), MaskError> {
        self.mask_mut(handle)?.stage_listeners.push(Box::new(listener));
        Ok(())
    }

    /// Subscribes to a mask's `updateTexture` event, fired right after
    /// `updateStage`. A subscriber is expected to render the stage and clear
    /// it; without any subscriber the cache does both itself.
    pub fn on_update_texture(
        &mut self,
        handle: MaskHandle,
        listener: impl FnMut(&mut MaskFrame<'_>) -> Result<(), ListenerError> + Send + 'static,
    ) -> Result<(), MaskError> {
        self.mask_mut(handle)?.texture_listeners.push(Box::new(listener));
        Ok(())
    }

    /// Returns the mask texture, rebuilding it first if the mask is dirty.
    ///
    /// # Errors
    ///
    /// Subscriber and device failures are returned as-is; the mask stays
    /// dirty and the next read retries.
    pub fn texture(&mut self, handle: MaskHandle) -> Result<TextureId, MaskError> {
        let size = self.texture_size();
        let viewport = self.viewport;
        let device = Arc::clone(&self.device);
        let mask = self.mask_mut(handle)?;
        if let (false, Some(texture)) = (mask.dirty, mask.texture) {
            return Ok(texture);
        }
        mask.rebuild(device.as_ref(), size, viewport)
    }

    /// Looks up a mask by name.
    pub fn handle(&self, name: &str) -> Option<MaskHandle> {
        self.names.get(name).copied()
    }

    /// Returns the mask's dirty flag.
    pub fn is_dirty(&self, handle: MaskHandle) -> Result<bool, MaskError> {
        Ok(self.mask(handle)?.dirty)
    }

    /// Returns the mask's pixel parameters.
    pub fn descriptor(&self, handle: MaskHandle) -> Result<&MaskDescriptor, MaskError> {
        Ok(&self.mask(handle)?.descriptor)
    }

    /// Returns the mask's rebuild counters.
    pub fn stats(&self, handle: MaskHandle) -> Result<MaskStats, MaskError> {
        Ok(self.mask(handle)?.stats)
    }

    /// Returns the masks of a post-process group, in creation order.
    pub fn group(&self, group: &str) -> Vec<MaskHandle> {
        self.masks
            .iter()
            .enumerate()
            .filter(|(_, m)| m.descriptor.in_group(group))
            .map(|(i, _)| MaskHandle(i))
            .collect()
    }

    /// Gives direct access to a mask's retained stage, e.g. to install filters.
    pub fn stage_mut(&mut self, handle: MaskHandle) -> Result<&mut Stage, MaskError> {
        Ok(&mut self.mask_mut(handle)?.stage)
    }

    /// The scene rect the mask textures cover.
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Texels per scene pixel.
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// The size every mask texture is allocated at.
    pub fn texture_size(&self) -> Extent2D {
        let scale = |v: f32| ((v * self.resolution).ceil() as u32).max(1);
        Extent2D::new(scale(self.viewport.width), scale(self.viewport.height))
    }

    /// Moves the masks onto a new scene rect.
    ///
    /// Textures are released and reallocated on next read. Masks that were
    /// already built are invalidated so their subscribers repaint them.
    pub fn resize(&mut self, viewport: Rect) {
        if viewport == self.viewport {
            return;
        }
        log::debug!(
            "Resizing {} masks to {}x{}",
            self.masks.len(),
            viewport.width,
            viewport.height
        );
        self.viewport = viewport;
        for mask in &mut self.masks {
            let built = mask.stats.rebuilds > 0;
            mask.release(self.device.as_ref());
            if built {
                mask.invalidate();
            }
        }
    }

    /// Releases every mask texture. Masks stay registered and dirty.
    pub fn tear_down(&mut self) {
        for mask in &mut self.masks {
            mask.release(self.device.as_ref());
        }
        log::debug!("Released textures of {} masks", self.masks.len());
    }

    /// Number of registered masks.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Returns `true` if no mask is registered.
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

impl fmt::Debug for MaskCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskCache")
            .field("masks", &self.masks.iter().map(|m| &m.name).collect::<Vec<_>>())
            .field("viewport", &self.viewport)
            .field("resolution", &self.resolution)
            .finish()
    }
}
