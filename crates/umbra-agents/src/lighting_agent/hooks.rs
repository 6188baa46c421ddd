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

//! The host operations the overlay intercepts.

use super::frame::{self, FrameReport};
use super::{LightingAgent, LightingError, OccludingToken, OcclusionMaskSprite, RoofSprite};
use umbra_core::intercept::{InterceptChain, InterceptError};

type Chain<A, R> = InterceptChain<LightingAgent, A, R>;

/// One intercept chain per host operation the overlay takes over.
///
/// Each chain starts with the host's own behavior as its original.
/// [`HostHooks::install_core`] adds the overlay's strategies; hosts may add
/// their own wrappers on top.
#[derive(Debug)]
pub struct HostHooks {
    /// The per-frame lighting refresh, wrapped by the frame driver.
    pub refresh_lighting: Chain<(), Result<FrameReport, LightingError>>,
    /// Light source initialization, wrapped to register every region's source.
    pub initialize_light_sources: Chain<(), Result<(), LightingError>>,
    /// Global light computation, overridden to report no change.
    pub update_global_light: Chain<(), bool>,
    /// Fog exploration query, overridden to return the aggregate flag.
    pub fog_exploration: Chain<(), bool>,
    /// Occlusion update, wrapped to flag that it is running.
    pub update_occlusion: Chain<(), Result<(), LightingError>>,
    /// Roof sprite lookup, suppressed while occlusion updates.
    pub roof_sprite: Chain<String, Option<RoofSprite>>,
    /// Occlusion shape drawing, overridden to feed the occlusion mask.
    pub draw_occlusion_shapes: Chain<Vec<OccludingToken>, Result<(), LightingError>>,
    /// Occlusion mask construction, overridden with a placeholder.
    pub draw_occlusion_mask: Chain<(), OcclusionMaskSprite>,
}

impl HostHooks {
    /// Creates chains that only run the host's own behavior.
    pub fn new() -> Self {
        Self {
            refresh_lighting: InterceptChain::new(
                "refresh_lighting",
                |agent: &mut LightingAgent, _: ()| -> Result<FrameReport, LightingError> {
                    agent.host.draw_effects().map_err(LightingError::Host)?;
                    Ok(FrameReport::draw_pass())
                },
            ),
            initialize_light_sources: InterceptChain::new(
                "initialize_light_sources",
                |agent: &mut LightingAgent, _: ()| {
                    agent
                        .host
                        .initialize_light_sources()
                        .map_err(LightingError::Host)
                },
            ),
            update_global_light: InterceptChain::new(
                "update_global_light",
                |agent: &mut LightingAgent, _: ()| agent.host.compute_global_light(),
            ),
            fog_exploration: InterceptChain::new(
                "fog_exploration",
                |agent: &mut LightingAgent, _: ()| agent.host.fog_exploration(),
            ),
            update_occlusion: InterceptChain::new(
                "update_occlusion",
                |agent: &mut LightingAgent, _: ()| {
                    agent.host.update_occlusion().map_err(LightingError::Host)
                },
            ),
            roof_sprite: InterceptChain::new(
                "roof_sprite",
                |agent: &mut LightingAgent, tile: String| agent.host.roof_sprite(&tile),
            ),
            draw_occlusion_shapes: InterceptChain::new(
                "draw_occlusion_shapes",
                |agent: &mut LightingAgent, tokens: Vec<OccludingToken>| {
                    agent.host.draw_occlusion_shapes(&tokens);
                    Ok(())
                },
            ),
            draw_occlusion_mask: InterceptChain::new(
                "draw_occlusion_mask",
                |agent: &mut LightingAgent, _: ()| agent.host.draw_occlusion_mask(),
            ),
        }
    }

    /// Installs the overlay's strategies on every chain.
    ///
    /// # Errors
    ///
    /// Returns [`InterceptError::OverrideConflict`] if an overriding chain
    /// already carries an override.
    pub fn install_core(&mut self) -> Result<(), InterceptError> {
        self.update_global_light.override_with(|_, _| false)?;
        self.fog_exploration
            .override_with(|agent, _| agent.fog_exploration)?;

        self.initialize_light_sources.wrap(|agent, args, next| {
            next.call(agent, args)?;
            register_region_sources(agent);
            Ok(())
        });

        self.refresh_lighting
            .wrap(|agent, args, next| frame::drive(agent, |agent| next.call(agent, args)));

        self.update_occlusion.wrap(|agent, args, next| {
            agent.with_occlusion(|s| s.updating = true)?;
            let result = next.call(agent, args);
            agent.with_occlusion(|s| s.updating = false)?;
            result
        });

        self.roof_sprite.wrap(|agent, tile, next| {
            if agent.is_updating_occlusion() {
                return None;
            }
            next.call(agent, tile)
        });

        self.draw_occlusion_shapes.override_with(|agent, tokens| {
            let tiles = agent.host.has_foreground_tiles();
            let count = tokens.len();
            agent.with_occlusion(|s| {
                s.tokens = Some(tokens);
                s.foreground_tiles = tiles;
            })?;
            if tiles {
                agent.masks.invalidate(agent.occlusion_mask)?;
            }
            log::trace!("Stored {count} occluding tokens (foreground tiles: {tiles})");
            Ok(())
        })?;

        self.draw_occlusion_mask
            .override_with(|_, _| OcclusionMaskSprite::placeholder())?;

        log::debug!("Installed lighting strategies on host hooks");
        Ok(())
    }
}

impl Default for HostHooks {
    fn default() -> Self {
        Self::new()
    }
}

fn register_region_sources(agent: &mut LightingAgent) {
    let mut regions: Vec<_> = agent.regions.regions().collect();
    regions.sort_by(|a, b| a.id().cmp(b.id()));
    for region in &regions {
        agent.host.register_light_source(region.source());
    }
    log::debug!("Registered {} region light sources", regions.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting_agent::{HostError, SceneHost};
    use std::sync::Arc;
    use umbra_core::math::Rect;
    use umbra_core::LightingSettings;
    use umbra_infra::SoftwareDevice;
    use umbra_lanes::composite_lane::EffectLayers;
    use umbra_lanes::region_lane::{PerceptionDelta, RegionSource};

    #[derive(Default)]
    struct StubHost {
        layers: EffectLayers,
    }

    impl SceneHost for StubHost {
        fn scene_dimensions(&self) -> Rect {
            Rect::new(0.0, 0.0, 64.0, 64.0)
        }
        fn effect_layers_mut(&mut self) -> &mut EffectLayers {
            &mut self.layers
        }
        fn has_foreground_tiles(&self) -> bool {
            true
        }
        fn set_global_light(&mut self, _global_light: bool) {}
        fn update_perception(&mut self, _delta: PerceptionDelta, _force: bool) {}
        fn draw_effects(&mut self) -> Result<(), HostError> {
            Ok(())
        }
        fn initialize_light_sources(&mut self) -> Result<(), HostError> {
            Ok(())
        }
        fn register_light_source(&mut self, _source: &RegionSource) {}
        fn roof_sprite(&mut self, tile: &str) -> Option<RoofSprite> {
            Some(RoofSprite {
                tile: tile.to_owned(),
                rect: Rect::new(0.0, 0.0, 8.0, 8.0),
            })
        }
    }

    fn agent() -> LightingAgent {
        LightingAgent::new(
            Arc::new(SoftwareDevice::new()),
            Box::new(StubHost::default()),
            LightingSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn roof_sprites_are_hidden_while_occlusion_updates() {
        let mut agent = agent();
        let mut hooks = HostHooks::new();
        hooks.install_core().unwrap();

        assert!(hooks.roof_sprite.invoke(&mut agent, "roof".into()).is_some());
        agent.with_occlusion(|s| s.updating = true).unwrap();
        assert!(hooks.roof_sprite.invoke(&mut agent, "roof".into()).is_none());
    }

    #[test]
    fn installing_twice_conflicts() {
        let mut hooks = HostHooks::new();
        hooks.install_core().unwrap();

        assert_eq!(
            hooks.install_core(),
            Err(InterceptError::OverrideConflict {
                operation: "update_global_light"
            })
        );
    }

    #[test]
    fn originals_run_the_host_behavior() {
        let mut agent = agent();
        let mut hooks = HostHooks::new();

        assert!(hooks.draw_occlusion_mask.invoke(&mut agent, ()).renderable);
        assert_eq!(
            hooks.refresh_lighting.invoke(&mut agent, ()).unwrap(),
            FrameReport::draw_pass()
        );
        assert_eq!(agent.frames(), 0);
        assert!(!hooks.update_global_light.is_overridden());
    }
}
