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

use super::{ListenerError, MaskError};
use std::borrow::Cow;
use umbra_core::math::{Extent2D, LinearRgba, Rect};
use umbra_core::renderer::{
    GraphicsDevice, RenderTarget, ResourceError, Stage, TextureDataType, TextureDescriptor,
    TextureFormat, TextureId,
};

/// An opaque handle to a registered mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskHandle(pub(crate) usize);

/// Pixel parameters of a mask, fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskDescriptor {
    /// Channel layout of the backing texture.
    pub format: TextureFormat,
    /// Storage type of each channel.
    pub data_type: TextureDataType,
    /// Color the texture is cleared to before every render.
    pub clear_color: LinearRgba,
    /// Post-process groups the mask belongs to, e.g. `"blur"`.
    pub groups: Vec<String>,
}

impl MaskDescriptor {
    /// Creates a descriptor that belongs to no group.
    pub fn new(format: TextureFormat, data_type: TextureDataType, clear_color: LinearRgba) -> Self {
        Self {
            format,
            data_type,
            clear_color,
            groups: Vec::new(),
        }
    }

    /// Adds the mask to a post-process group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Returns `true` if the mask belongs to `group`.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Counters describing a mask's rebuild history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskStats {
    /// Number of `invalidate` calls (including cache-wide invalidations).
    pub invalidations: u64,
    /// Number of completed rebuilds.
    pub rebuilds: u64,
    /// Number of rebuilds that fired the subscribers.
    pub subscriber_rebuilds: u64,
}

/// A subscriber to a mask's `updateStage` or `updateTexture` event.
pub type MaskListener = Box<dyn FnMut(&mut MaskFrame<'_>) -> Result<(), ListenerError> + Send>;

/// What a subscriber sees while its mask is rebuilt.
///
/// The frame borrows the mask's retained stage and the device for the
/// duration of one event, so a subscriber can populate the stage
/// (`updateStage`) or render it into the mask texture (`updateTexture`).
pub struct MaskFrame<'a> {
    pub(crate) name: &'a str,
    pub(crate) descriptor: &'a MaskDescriptor,
    pub(crate) stage: &'a mut Stage,
    pub(crate) target: RenderTarget,
    pub(crate) device: &'a dyn GraphicsDevice,
}

impl MaskFrame<'_> {
    /// The mask's name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The mask's pixel parameters.
    pub fn descriptor(&self) -> &MaskDescriptor {
        self.descriptor
    }

    /// The texture being rebuilt and the scene rect it covers.
    pub fn target(&self) -> RenderTarget {
        self.target
    }

    /// The retained stage.
    pub fn stage(&self) -> &Stage {
        self.stage
    }

    /// The retained stage, for writing draw commands.
    pub fn stage_mut(&mut self) -> &mut Stage {
        self.stage
    }

    /// Renders the stage into the mask texture, cleared to the mask's clear color.
    pub fn render(&mut self) -> Result<(), ResourceError> {
        self.device
            .render_stage(&self.target, self.stage, Some(self.descriptor.clear_color))
    }
}

pub(crate) struct Mask {
    pub(crate) name: String,
    pub(crate) descriptor: MaskDescriptor,
    pub(crate) dirty: bool,
    pub(crate) stage: Stage,
    pub(crate) texture: Option<TextureId>,
    pub(crate) stats: MaskStats,
    pub(crate) stage_listeners: Vec<MaskListener>,
    pub(crate) texture_listeners: Vec<MaskListener>,
}

impl Mask {
    pub(crate) fn new(name: String, descriptor: MaskDescriptor) -> Self {
        Self {
            name,
            descriptor,
            dirty: true,
            stage: Stage::new(),
            texture: None,
            stats: MaskStats::default(),
            stage_listeners: Vec::new(),
            texture_listeners: Vec::new(),
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.dirty = true;
        self.stats.invalidations += 1;
    }

    fn resource_error(&self, source: ResourceError) -> MaskError {
        MaskError::Resource {
            mask: self.name.clone(),
            source,
        }
    }

    fn ensure_texture(
        &mut self,
        device: &dyn GraphicsDevice,
        size: Extent2D,
    ) -> Result<TextureId, MaskError> {
        if let Some(texture) = self.texture {
            return Ok(texture);
        }
        let descriptor = TextureDescriptor {
            label: Some(Cow::Borrowed(self.name.as_str())),
            size,
            format: self.descriptor.format,
            data_type: self.descriptor.data_type,
        };
        let texture = device
            .create_texture(&descriptor)
            .map_err(|e| self.resource_error(e))?;
        log::debug!(
            "Allocated texture {texture:?} ({}x{}) for mask '{}'",
            size.width,
            size.height,
            self.name
        );
        self.texture = Some(texture);
        Ok(texture)
    }

    /// Runs the two-phase rebuild and clears the dirty flag on success.
    ///
    /// A mask that was never invalidated renders its (empty) stage without
    /// notifying subscribers. On failure the stage is discarded and the mask
    /// stays dirty.
    pub(crate) fn rebuild(
        &mut self,
        device: &dyn GraphicsDevice,
        size: Extent2D,
        viewport: Rect,
    ) -> Result<TextureId, MaskError> {
        let texture = self.ensure_texture(device, size)?;
        let notify = self.stats.invalidations > 0;

        let mut frame = MaskFrame {
            name: &self.name,
            descriptor: &self.descriptor,
            stage: &mut self.stage,
            target: RenderTarget { texture, viewport },
            device,
        };
        let result = if notify {
            fire(&mut frame, &mut self.stage_listeners, &mut self.texture_listeners)
        } else {
            frame.render().map_err(|source| MaskError::Resource {
                mask: frame.name.to_string(),
                source,
            })
        };

        match result {
            Ok(()) => {
                self.dirty = false;
                self.stats.rebuilds += 1;
                if notify {
                    self.stats.subscriber_rebuilds += 1;
                }
                log::debug!("Rebuilt mask '{}' into {texture:?}", self.name);
                Ok(texture)
            }
            Err(e) => {
                let discarded = self.stage.clear();
                log::warn!(
                    "Rebuild of mask '{}' failed, discarded {discarded} draw commands",
                    self.name
                );
                Err(e)
            }
        }
    }

    /// Releases the backing texture, leaving the mask dirty.
    pub(crate) fn release(&mut self, device: &dyn GraphicsDevice) {
        self.dirty = true;
        self.stage.clear();
        if let Some(texture) = self.texture.take() {
            if let Err(e) = device.destroy_texture(texture) {
                log::warn!("Failed to release texture of mask '{}': {e}", self.name);
            }
        }
    }
}

fn fire(
    frame: &mut MaskFrame<'_>,
    stage_listeners: &mut [MaskListener],
    texture_listeners: &mut [MaskListener],
) -> Result<(), MaskError> {
    for listener in stage_listeners.iter_mut() {
        listener(frame).map_err(|source| listener_error(frame.name, source))?;
    }

    if texture_listeners.is_empty() {
        frame.render().map_err(|source| MaskError::Resource {
            mask: frame.name.to_string(),
            source,
        })?;
        frame.stage_mut().clear();
        return Ok(());
    }

    for listener in texture_listeners.iter_mut() {
        listener(frame).map_err(|source| listener_error(frame.name, source))?;
    }
    Ok(())
}

fn listener_error(mask: &str, source: ListenerError) -> MaskError {
    MaskError::Listener {
        mask: mask.to_string(),
        source,
    }
}
