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

use super::HostError;
use umbra_core::math::{Point2, Rect};
use umbra_core::renderer::Filter;
use umbra_lanes::composite_lane::EffectLayers;
use umbra_lanes::region_lane::{PerceptionDelta, RegionSource};

/// A token whose surroundings reveal what is under foreground tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct OccludingToken {
    /// The token's document id.
    pub id: String,
    /// Center in scene pixels.
    pub center: Point2,
    /// Width in scene pixels.
    pub width: f32,
    /// Height in scene pixels.
    pub height: f32,
}

impl OccludingToken {
    /// Radius of the occlusion circle drawn around the token.
    pub fn occlusion_radius(&self) -> f32 {
        self.width.max(self.height)
    }
}

/// A roof tile's sprite, as produced by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RoofSprite {
    /// The tile's document id.
    pub tile: String,
    /// Area the sprite covers.
    pub rect: Rect,
}

/// The host's occlusion mask container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcclusionMaskSprite {
    /// Whether the host renders the container.
    pub renderable: bool,
    /// Per-token occlusion children.
    pub tokens: Vec<OccludingToken>,
    /// Per-roof occlusion children.
    pub roofs: Vec<RoofSprite>,
}

impl OcclusionMaskSprite {
    /// A non-renderable container with no children.
    pub fn placeholder() -> Self {
        Self::default()
    }
}

/// The host application, as seen by the lighting overlay.
///
/// Methods without a default are the host's own behavior for operations the
/// overlay wraps or reads; the defaulted ones are optional collaborators.
pub trait SceneHost: Send {
    /// The scene's pixel rect.
    fn scene_dimensions(&self) -> Rect;

    /// The four effect containers.
    fn effect_layers_mut(&mut self) -> &mut EffectLayers;

    /// Whether the foreground layer holds any tile.
    fn has_foreground_tiles(&self) -> bool;

    /// Receives the aggregate global light flag every frame.
    fn set_global_light(&mut self, global_light: bool);

    /// Updates vision and perception for the frame.
    fn update_perception(&mut self, delta: PerceptionDelta, force: bool);

    /// The host's own lighting draw pass.
    fn draw_effects(&mut self) -> Result<(), HostError>;

    /// The host's own light source initialization.
    fn initialize_light_sources(&mut self) -> Result<(), HostError>;

    /// Adds a region's source to the host's light source collection.
    fn register_light_source(&mut self, source: &RegionSource);

    /// The host's own global light computation. Returns whether it changed.
    fn compute_global_light(&mut self) -> bool {
        false
    }

    /// The host's own fog exploration query.
    fn fog_exploration(&self) -> bool {
        false
    }

    /// Notifies darkness-dependent effects (lighting and sounds).
    fn on_darkness_change(&mut self) {}

    /// The host's own occlusion update.
    fn update_occlusion(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    /// The host's own roof sprite lookup.
    fn roof_sprite(&mut self, _tile: &str) -> Option<RoofSprite> {
        None
    }

    /// The host's own occlusion shape drawing.
    fn draw_occlusion_shapes(&mut self, _tokens: &[OccludingToken]) {}

    /// The host's own occlusion mask construction.
    fn draw_occlusion_mask(&mut self) -> OcclusionMaskSprite {
        OcclusionMaskSprite {
            renderable: true,
            ..OcclusionMaskSprite::default()
        }
    }

    /// The host's blur configuration at the given radius.
    fn create_blur_filter(&self, radius: f32) -> Filter {
        Filter::Blur {
            radius,
            passes: 3,
            resolution: 1.0,
        }
    }

    /// Removes the host's own illumination background.
    fn detach_illumination_background(&mut self) {}
}
