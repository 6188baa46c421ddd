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

use super::FramebufferError;
use crate::region_lane::Region;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use umbra_core::math::{Extent2D, LinearRgba, Rect};
use umbra_core::renderer::{
    GraphicsDevice, RenderTarget, Stage, TextureDataType, TextureDescriptor, TextureFormat,
    TextureId,
};

/// The full-scene textures owned by the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferSlot {
    /// RGBA8: darkness, global light, fog exploration, coverage.
    Lighting,
    /// RGB8: region background colors.
    ColorBackground,
}

impl FramebufferSlot {
    /// Every slot, in allocation order.
    pub const ALL: [FramebufferSlot; 2] = [FramebufferSlot::Lighting, FramebufferSlot::ColorBackground];

    fn format(self) -> TextureFormat {
        match self {
            FramebufferSlot::Lighting => TextureFormat::Rgba,
            FramebufferSlot::ColorBackground => TextureFormat::Rgb,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FramebufferSlot::Lighting => "lighting",
            FramebufferSlot::ColorBackground => "colorBackground",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Attachments {
    lighting: TextureId,
    background: TextureId,
}

impl Attachments {
    fn get(&self, slot: FramebufferSlot) -> TextureId {
        match slot {
            FramebufferSlot::Lighting => self.lighting,
            FramebufferSlot::ColorBackground => self.background,
        }
    }
}

/// The base textures downstream shading samples every frame.
///
/// Lifetime follows the scene's visual tree: [`draw`](Self::draw) when it is
/// built, [`tear_down`](Self::tear_down) when it is destroyed. In between,
/// [`refresh`](Self::refresh) repaints only when asked to.
pub struct LightingFramebuffer {
    device: Arc<dyn GraphicsDevice>,
    default_darkness: f32,
    default_background: LinearRgba,
    attachments: Option<Attachments>,
    dimensions: Rect,
    needs_paint: bool,
    paints: u64,
}

impl LightingFramebuffer {
    /// Creates an undrawn framebuffer that paints uncovered texels with the
    /// given defaults.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        default_darkness: f32,
        default_background: LinearRgba,
    ) -> Self {
        Self {
            device,
            default_darkness: default_darkness.clamp(0.0, 1.0),
            default_background,
            attachments: None,
            dimensions: Rect::ZERO,
            needs_paint: false,
            paints: 0,
        }
    }

    /// Allocates both textures sized to the scene rect, releasing any
    /// previous ones first. The next `refresh` paints regardless of `force`.
    pub fn draw(&mut self, dimensions: Rect) -> Result<(), FramebufferError> {
        self.release();
        let size = Extent2D::new(
            dimensions.width.max(0.0).ceil() as u32,
            dimensions.height.max(0.0).ceil() as u32,
        );
        let lighting = self.allocate(FramebufferSlot::Lighting, size)?;
        let background = match self.allocate(FramebufferSlot::ColorBackground, size) {
            Ok(texture) => texture,
            Err(e) => {
                if let Err(release) = self.device.destroy_texture(lighting) {
                    log::warn!("Failed to release lighting texture: {release}");
                }
                return Err(e);
            }
        };
        self.attachments = Some(Attachments {
            lighting,
            background,
        });
        self.dimensions = dimensions;
        self.needs_paint = true;
        log::info!(
            "Drew lighting framebuffer at {}x{}",
            size.width,
            size.height
        );
        Ok(())
    }

    fn allocate(&self, slot: FramebufferSlot, size: Extent2D) -> Result<TextureId, FramebufferError> {
        let descriptor = TextureDescriptor {
            label: Some(Cow::Borrowed(slot.label())),
            size,
            format: slot.format(),
            data_type: TextureDataType::UnsignedByte,
        };
        Ok(self.device.create_texture(&descriptor)?)
    }

    /// Repaints both textures from `regions` when `force` is set or the
    /// initial paint is pending.
    ///
    /// Regions are painted in `(elevation, id)` order over the defaults.
    ///
    /// # Returns
    ///
    /// `true` if the textures were repainted.
    pub fn refresh<'a>(
        &mut self,
        regions: impl IntoIterator<Item = &'a Region>,
        force: bool,
    ) -> Result<bool, FramebufferError> {
        let attachments = self.attachments.ok_or(FramebufferError::NotDrawn)?;
        if !force && !self.needs_paint {
            return Ok(false);
        }

        let mut ordered: Vec<&Region> = regions.into_iter().collect();
        ordered.sort_by(|a, b| {
            a.elevation()
                .total_cmp(&b.elevation())
                .then_with(|| a.id().cmp(b.id()))
        });

        let mut lighting = Stage::new();
        let mut background = Stage::new();
        for region in &ordered {
            let encoded = LinearRgba::new(
                region.darkness(),
                flag(region.global_light()),
                flag(region.fog_exploration()),
                1.0,
            );
            lighting.fill(region.shape().clone(), encoded);
            background.fill(region.shape().clone(), region.background());
        }

        let viewport = self.dimensions;
        self.device.render_stage(
            &RenderTarget {
                texture: attachments.lighting,
                viewport,
            },
            &lighting,
            Some(LinearRgba::new(self.default_darkness, 0.0, 0.0, 0.0)),
        )?;
        self.device.render_stage(
            &RenderTarget {
                texture: attachments.background,
                viewport,
            },
            &background,
            Some(self.default_background),
        )?;

        self.needs_paint = false;
        self.paints += 1;
        log::trace!("Painted lighting framebuffer with {} regions", ordered.len());
        Ok(true)
    }

    fn release(&mut self) {
        if let Some(attachments) = self.attachments.take() {
            for slot in FramebufferSlot::ALL {
                if let Err(e) = self.device.destroy_texture(attachments.get(slot)) {
                    log::warn!("Failed to release {} texture: {e}", slot.label());
                }
            }
        }
        self.needs_paint = false;
    }

    /// Releases every texture. The framebuffer holds no GPU resources afterwards.
    pub fn tear_down(&mut self) {
        if self.attachments.is_some() {
            log::info!("Tearing down lighting framebuffer");
        }
        self.release();
    }

    /// The texture in `slot`, or `None` when not drawn.
    pub fn texture(&self, slot: FramebufferSlot) -> Option<TextureId> {
        self.attachments.map(|a| a.get(slot))
    }

    /// Returns `true` between `draw` and `tear_down`.
    pub fn is_drawn(&self) -> bool {
        self.attachments.is_some()
    }

    /// The scene rect the textures cover.
    pub fn dimensions(&self) -> Rect {
        self.dimensions
    }

    /// Number of completed repaints.
    pub fn paint_count(&self) -> u64 {
        self.paints
    }
}

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl fmt::Debug for LightingFramebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightingFramebuffer")
            .field("attachments", &self.attachments)
            .field("dimensions", &self.dimensions)
            .field("needs_paint", &self.needs_paint)
            .finish()
    }
}
