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

// Umbra Sandbox
// Headless demo: a small scene with two lights, a darkness source and one
// occluding token, driven for a few frames.

use std::sync::Arc;

use anyhow::Result;
use umbra_agents::lighting_agent::{
    HostError, LifecycleEvent, OccludingToken, SceneHost, SceneSession,
};
use umbra_core::math::{LinearRgba, Point2, Rect, Shape};
use umbra_core::LightingSettings;
use umbra_infra::SoftwareDevice;
use umbra_lanes::composite_lane::{EffectLayer, EffectLayers, SourceMesh};
use umbra_lanes::region_lane::{
    PerceptionDelta, Region, RegionId, RegionSource, SourceId, SourceKind, SourceOwner,
};

const SCENE: Rect = Rect::new(0.0, 0.0, 640.0, 480.0);

/// A host that only logs what the overlay asks of it.
struct DemoHost {
    layers: EffectLayers,
    frame: u32,
}

impl DemoHost {
    fn new() -> Self {
        let mut layers = EffectLayers::default();
        for (i, layer) in EffectLayer::ALL.into_iter().enumerate() {
            let mut mesh = SourceMesh::new(i as u64, SourceId(i as u64 % 3));
            mesh.z_index = 3 - i as i32;
            layers.layer_mut(layer).meshes.push(mesh);
        }
        Self { layers, frame: 0 }
    }
}

impl SceneHost for DemoHost {
    fn scene_dimensions(&self) -> Rect {
        SCENE
    }

    fn effect_layers_mut(&mut self) -> &mut EffectLayers {
        &mut self.layers
    }

    fn has_foreground_tiles(&self) -> bool {
        true
    }

    fn set_global_light(&mut self, global_light: bool) {
        log::debug!("Host: global light {global_light}");
    }

    fn update_perception(&mut self, delta: PerceptionDelta, _force: bool) {
        if !delta.is_empty() {
            log::info!("Host: perception update {delta:?}");
        }
    }

    fn draw_effects(&mut self) -> Result<(), HostError> {
        self.frame += 1;
        if self.frame == 3 {
            return Err("effects shader not compiled yet".into());
        }
        Ok(())
    }

    fn initialize_light_sources(&mut self) -> Result<(), HostError> {
        log::info!("Host: initializing light sources");
        Ok(())
    }

    fn register_light_source(&mut self, source: &RegionSource) {
        log::info!("Host: registered {:?} source {:?}", source.kind, source.id);
    }

    fn on_darkness_change(&mut self) {
        log::info!("Host: darkness changed");
    }
}

fn source(id: u64, kind: SourceKind, owner: SourceOwner) -> RegionSource {
    RegionSource::new(SourceId(id), kind, owner)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let device = Arc::new(SoftwareDevice::new());
    let mut session = SceneSession::new(
        device.clone(),
        Box::new(DemoHost::new()),
        LightingSettings::default(),
    )?;

    let events = session.event_sender();
    for event in [
        LifecycleEvent::SceneInit,
        LifecycleEvent::SceneGroupCreated,
        LifecycleEvent::SceneGroupDrawn,
        LifecycleEvent::SceneReady,
    ] {
        events.send(event)?;
    }
    session.pump_events()?;

    let regions = session.agent_mut().regions_mut();
    regions.register(
        Region::new(
            "torch",
            Shape::circle(Point2::new(160.0, 120.0), 90.0),
            source(1, SourceKind::Light, SourceOwner::Token("hero".into())),
        )
        .with_activity(true)
        .with_appearance(0.2, LinearRgba::rgb(0.9, 0.7, 0.4), 1.0),
    )?;
    regions.register(
        Region::new(
            "sun",
            Rect::new(320.0, 0.0, 320.0, 480.0),
            source(2, SourceKind::Light, SourceOwner::AmbientLight("sun".into())),
        )
        .with_activity(true)
        .with_flags(true, false),
    )?;
    regions.register(
        Region::new(
            "crypt",
            Rect::new(0.0, 300.0, 200.0, 180.0),
            source(3, SourceKind::Darkness, SourceOwner::Scene),
        )
        .with_activity(true)
        .with_flags(false, true)
        .with_appearance(0.9, LinearRgba::BLACK, 0.0),
    )?;
    session.initialize_light_sources()?;

    session.draw_occlusion_shapes(vec![OccludingToken {
        id: "hero".into(),
        center: Point2::new(160.0, 120.0),
        width: 50.0,
        height: 50.0,
    }])?;

    for frame in 0..5 {
        if frame == 2 {
            session
                .agent_mut()
                .regions_mut()
                .set_active(&RegionId::new("sun"), false)?;
        }
        match session.refresh_lighting() {
            Ok(report) => log::info!("Frame {frame}: {:?}", report.steps),
            Err(e) => log::error!("Frame {frame} failed: {e}"),
        }
        session.tick();
    }

    let occlusion = session.occlusion_texture()?;
    log::info!(
        "Occlusion mask {:?}, global light {}, fog exploration {}",
        occlusion,
        session.agent().global_light(),
        session.fog_exploration()
    );
    if let Some(background) = session.agent().illumination_background() {
        let color = background.sample(&*device, Point2::new(160.0, 120.0))?;
        log::info!("Background under the torch: {color:?}");
    }

    session.handle(LifecycleEvent::SceneGroupTornDown)?;
    session.handle(LifecycleEvent::SceneTornDown)?;
    session.close();
    log::info!("Peak texture memory: {} bytes", device.peak_bytes());
    Ok(())
}
