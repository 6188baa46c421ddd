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
use umbra_core::math::{Extent2D, LinearRgba, Point2, Rect};
use umbra_core::renderer::{GraphicsDevice, TextureId};

/// The sprite that exposes the `ColorBackground` texture to illumination
/// shading.
///
/// It covers the scene rect and maps scene points to texels using
/// `screen_dimensions`, the texture's size in texels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IlluminationBackground {
    rect: Rect,
    screen_dimensions: Extent2D,
    texture: Option<TextureId>,
}

impl IlluminationBackground {
    /// Creates an unpositioned sampler with no texture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Covers `rect` and samples `texture`, which is `screen_dimensions` texels large.
    pub fn position(&mut self, rect: Rect, screen_dimensions: Extent2D, texture: Option<TextureId>) {
        self.rect = rect;
        self.screen_dimensions = screen_dimensions;
        self.texture = texture;
    }

    /// Detaches the sampled texture.
    pub fn detach(&mut self) {
        self.texture = None;
    }

    /// The covered scene rect.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The sampled texture's size in texels.
    pub fn screen_dimensions(&self) -> Extent2D {
        self.screen_dimensions
    }

    /// The sampled texture.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Samples the background color at a scene point.
    ///
    /// Returns `Ok(None)` for points outside the covered rect.
    pub fn sample(
        &self,
        device: &dyn GraphicsDevice,
        point: Point2,
    ) -> Result<Option<LinearRgba>, FramebufferError> {
        let texture = self.texture.ok_or(FramebufferError::NotDrawn)?;
        if !self.rect.contains_point(point) || self.screen_dimensions.is_empty() {
            return Ok(None);
        }
        let u = (point.x - self.rect.x) / self.rect.width;
        let v = (point.y - self.rect.y) / self.rect.height;
        let x = ((u * self.screen_dimensions.width as f32) as u32).min(self.screen_dimensions.width - 1);
        let y = ((v * self.screen_dimensions.height as f32) as u32).min(self.screen_dimensions.height - 1);
        Ok(device.read_texture(texture)?.texel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite_lane::{FramebufferSlot, LightingFramebuffer};
    use crate::region_lane::{Region, RegionSource, SourceId, SourceKind, SourceOwner};
    use std::sync::Arc;
    use umbra_infra::SoftwareDevice;

    #[test]
    fn samples_the_color_background() {
        let device = Arc::new(SoftwareDevice::new());
        let scene = Rect::new(100.0, 100.0, 8.0, 8.0);
        let mut fb = LightingFramebuffer::new(device.clone(), 0.0, LinearRgba::BLACK);
        fb.draw(scene).unwrap();
        let lit = Region::new(
            "lit",
            Rect::new(100.0, 100.0, 4.0, 8.0),
            RegionSource::new(SourceId(1), SourceKind::Light, SourceOwner::Scene),
        )
        .with_activity(true)
        .with_appearance(0.0, LinearRgba::rgb(0.0, 1.0, 0.0), 0.0);
        fb.refresh([&lit], true).unwrap();

        let mut sampler = IlluminationBackground::new();
        assert_eq!(
            sampler.sample(device.as_ref(), Point2::new(101.0, 101.0)),
            Err(FramebufferError::NotDrawn)
        );

        sampler.position(
            scene,
            Extent2D::new(8, 8),
            fb.texture(FramebufferSlot::ColorBackground),
        );
        let inside = sampler
            .sample(device.as_ref(), Point2::new(101.0, 101.0))
            .unwrap()
            .unwrap();
        assert_eq!(inside.g, 1.0);
        let outside_region = sampler
            .sample(device.as_ref(), Point2::new(107.0, 101.0))
            .unwrap()
            .unwrap();
        assert_eq!(outside_region.g, 0.0);
        assert_eq!(sampler.sample(device.as_ref(), Point2::new(0.0, 0.0)), Ok(None));
    }
}
