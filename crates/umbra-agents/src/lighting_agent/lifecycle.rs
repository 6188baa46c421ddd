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

//! Lifecycle events and the listeners that keep the lanes in step with the
//! host's scene.

use super::{LightingAgent, LightingError};
use umbra_core::event::{Dispatchable, Dispatcher};
use umbra_core::renderer::Filter;
use umbra_lanes::composite_lane::{DepthPass, EffectLayer, FramebufferSlot, IlluminationBackground};
use umbra_lanes::region_lane::PerceptionDelta;

/// A point in the host scene's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// A scene is about to be drawn.
    SceneInit,
    /// The host created its effect containers.
    SceneGroupCreated,
    /// The host laid out the scene group; fired again on every resize.
    SceneGroupDrawn,
    /// The host released the scene group.
    SceneGroupTornDown,
    /// The scene was torn down.
    SceneTornDown,
    /// The scene finished its first draw.
    SceneReady,
    /// A lighting refresh completed.
    LightingRefreshed,
}

impl Dispatchable for LifecycleEvent {
    type Key = LifecycleEvent;

    fn key(&self) -> Self::Key {
        *self
    }
}

/// The lifecycle observer table, dispatching into the [`LightingAgent`].
pub type LifecycleDispatcher = Dispatcher<LifecycleEvent, LightingAgent, LightingError>;

pub(crate) fn install(dispatcher: &mut LifecycleDispatcher) {
    dispatcher.on(LifecycleEvent::SceneInit, |agent, _| scene_init(agent));

    dispatcher.once(LifecycleEvent::SceneGroupCreated, |agent, _| {
        agent.host.effect_layers_mut().disable_child_sorting();
        agent.host.detach_illumination_background();
        agent.illumination_background = Some(IlluminationBackground::new());
        log::info!("Effect containers prepared for depth sorting");
        Ok(())
    });

    dispatcher.once(LifecycleEvent::SceneGroupDrawn, |agent, _| {
        agent.depth_pass = Some(DepthPass::new());
        log::info!("Depth pass installed");
        Ok(())
    });
    dispatcher.on(LifecycleEvent::SceneGroupDrawn, |agent, _| scene_group_drawn(agent));

    dispatcher.on(LifecycleEvent::SceneGroupTornDown, |agent, _| {
        agent.framebuffer.tear_down();
        agent.masks.tear_down();
        if let Some(background) = agent.illumination_background.as_mut() {
            background.detach();
        }
        log::info!("Lighting resources released");
        Ok(())
    });

    dispatcher.on(LifecycleEvent::SceneTornDown, |agent, _| {
        agent.regions.reset();
        agent.undelivered = PerceptionDelta::none();
        agent.with_occlusion(|s| s.reset())?;
        log::info!("Region set cleared");
        Ok(())
    });

    dispatcher.on(LifecycleEvent::SceneReady, |agent, _| {
        agent.cullability_armed = true;
        Ok(())
    });

    dispatcher.on(LifecycleEvent::LightingRefreshed, |agent, _| {
        suspend_culling(agent);
        Ok(())
    });
}

fn scene_init(agent: &mut LightingAgent) -> Result<(), LightingError> {
    let resolution = agent.masks.resolution();
    let filter = match agent
        .host
        .create_blur_filter(agent.settings.occlusion_blur_radius)
    {
        Filter::Blur { radius, passes, .. } => Filter::Blur {
            radius,
            passes,
            resolution,
        },
    };
    for handle in agent.masks.group("blur") {
        agent.masks.stage_mut(handle)?.set_filters(vec![filter]);
    }
    agent.with_occlusion(|s| s.reset())?;
    log::info!("Scene initialised with blur {filter:?}");
    Ok(())
}

fn scene_group_drawn(agent: &mut LightingAgent) -> Result<(), LightingError> {
    let scene = agent.host.scene_dimensions();
    agent.masks.resize(scene);
    agent.framebuffer.draw(scene)?;

    if let Some(background) = agent.illumination_background.as_mut() {
        let texture = agent.framebuffer.texture(FramebufferSlot::ColorBackground);
        let dimensions = match texture {
            Some(id) => agent.device.texture_size(id)?,
            None => Default::default(),
        };
        background.position(scene, dimensions, texture);
    }
    log::info!("Scene group drawn at {}x{}", scene.width, scene.height);
    Ok(())
}

// Meshes stay drawable for one tick after the first refresh, so the host
// renders every source once before culling starts.
fn suspend_culling(agent: &mut LightingAgent) {
    if !agent.cullability_armed {
        return;
    }
    agent.cullability_armed = false;

    let mut suspended = Vec::new();
    let layers = agent.host.effect_layers_mut();
    for layer in EffectLayer::ALL {
        for mesh in layers.layer_mut(layer).meshes.iter_mut() {
            if mesh.cullable {
                mesh.cullable = false;
                suspended.push((layer, mesh.id));
            }
        }
    }
    log::debug!("Suspended culling on {} meshes", suspended.len());

    agent
        .ticker
        .schedule_once(agent.settings.cullable_restore_priority, move |agent| {
            let layers = agent.host.effect_layers_mut();
            for (layer, id) in suspended {
                if let Some(mesh) = layers
                    .layer_mut(layer)
                    .meshes
                    .iter_mut()
                    .find(|m| m.id == id)
                {
                    mesh.cullable = true;
                }
            }
        });
}
