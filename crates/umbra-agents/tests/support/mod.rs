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

//! A recording host shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use umbra_agents::lighting_agent::{HostError, OccludingToken, RoofSprite, SceneHost};
use umbra_agents::SceneSession;
use umbra_core::math::{Point2, Rect};
use umbra_core::LightingSettings;
use umbra_infra::SoftwareDevice;
use umbra_lanes::composite_lane::{EffectLayer, EffectLayers, SourceMesh};
use umbra_lanes::region_lane::{
    PerceptionDelta, Region, RegionSource, SourceId, SourceKind, SourceOwner,
};

pub const SCENE: Rect = Rect::new(0.0, 0.0, 200.0, 100.0);

/// One observable call the overlay made into the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SetGlobalLight(bool),
    DarknessChanged,
    UpdatePerception(PerceptionDelta),
    DrawEffects,
    InitializeLightSources,
    RegisterLightSource(SourceId),
    ComputeGlobalLight,
    UpdateOcclusion,
    RoofSprite(String),
    DrawOcclusionShapes(usize),
    DetachBackground,
}

/// Knobs and the call log, shared between a test and the host it handed over.
#[derive(Debug, Default)]
pub struct Probe {
    pub calls: Vec<HostCall>,
    pub foreground_tiles: bool,
    pub fail_draw: bool,
    pub scene: Option<Rect>,
}

pub type SharedProbe = Arc<Mutex<Probe>>;

pub struct RecordingHost {
    probe: SharedProbe,
    layers: EffectLayers,
}

impl RecordingHost {
    pub fn new() -> (Self, SharedProbe) {
        let probe = SharedProbe::default();
        let mut layers = EffectLayers::default();
        for (i, layer) in EffectLayer::ALL.into_iter().enumerate() {
            let id = i as u64 * 10;
            layers.layer_mut(layer).meshes.extend([
                SourceMesh::new(id + 1, SourceId(1)),
                SourceMesh::new(id + 2, SourceId(2)),
            ]);
        }
        let host = Self {
            probe: Arc::clone(&probe),
            layers,
        };
        (host, probe)
    }

    fn record(&self, call: HostCall) {
        self.probe.lock().unwrap().calls.push(call);
    }
}

impl SceneHost for RecordingHost {
    fn scene_dimensions(&self) -> Rect {
        self.probe.lock().unwrap().scene.unwrap_or(SCENE)
    }

    fn effect_layers_mut(&mut self) -> &mut EffectLayers {
        &mut self.layers
    }

    fn has_foreground_tiles(&self) -> bool {
        self.probe.lock().unwrap().foreground_tiles
    }

    fn set_global_light(&mut self, global_light: bool) {
        self.record(HostCall::SetGlobalLight(global_light));
    }

    fn update_perception(&mut self, delta: PerceptionDelta, _force: bool) {
        self.record(HostCall::UpdatePerception(delta));
    }

    fn draw_effects(&mut self) -> Result<(), HostError> {
        if self.probe.lock().unwrap().fail_draw {
            return Err("draw pass failed".into());
        }
        self.record(HostCall::DrawEffects);
        Ok(())
    }

    fn initialize_light_sources(&mut self) -> Result<(), HostError> {
        self.record(HostCall::InitializeLightSources);
        Ok(())
    }

    fn register_light_source(&mut self, source: &RegionSource) {
        self.record(HostCall::RegisterLightSource(source.id));
    }

    fn compute_global_light(&mut self) -> bool {
        self.record(HostCall::ComputeGlobalLight);
        true
    }

    fn on_darkness_change(&mut self) {
        self.record(HostCall::DarknessChanged);
    }

    fn update_occlusion(&mut self) -> Result<(), HostError> {
        self.record(HostCall::UpdateOcclusion);
        Ok(())
    }

    fn roof_sprite(&mut self, tile: &str) -> Option<RoofSprite> {
        self.record(HostCall::RoofSprite(tile.to_owned()));
        Some(RoofSprite {
            tile: tile.to_owned(),
            rect: Rect::new(0.0, 0.0, 50.0, 50.0),
        })
    }

    fn draw_occlusion_shapes(&mut self, tokens: &[OccludingToken]) {
        self.record(HostCall::DrawOcclusionShapes(tokens.len()));
    }

    fn detach_illumination_background(&mut self) {
        self.record(HostCall::DetachBackground);
    }
}

/// Opens a session over a fresh software device.
pub fn open_session(settings: LightingSettings) -> (SceneSession, SharedProbe, Arc<SoftwareDevice>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let device = Arc::new(SoftwareDevice::new());
    let (host, probe) = RecordingHost::new();
    let session = SceneSession::new(device.clone(), Box::new(host), settings)
        .expect("session should open on a software device");
    (session, probe, device)
}

/// Opens a session and runs the host's scene setup events.
pub fn drawn_session() -> (SceneSession, SharedProbe, Arc<SoftwareDevice>) {
    use umbra_agents::lighting_agent::LifecycleEvent;

    let (mut session, probe, device) = open_session(LightingSettings::default());
    for event in [
        LifecycleEvent::SceneInit,
        LifecycleEvent::SceneGroupCreated,
        LifecycleEvent::SceneGroupDrawn,
    ] {
        session.handle(event).expect("setup event should succeed");
    }
    probe.lock().unwrap().calls.clear();
    (session, probe, device)
}

pub fn calls(probe: &SharedProbe) -> Vec<HostCall> {
    std::mem::take(&mut probe.lock().unwrap().calls)
}

pub fn light(id: &str, source: u64, rect: Rect) -> Region {
    Region::new(
        id,
        rect,
        RegionSource::new(
            SourceId(source),
            SourceKind::Light,
            SourceOwner::Token(format!("token-{source}")),
        ),
    )
    .with_activity(true)
}

pub fn token(id: &str, x: f32, y: f32, size: f32) -> OccludingToken {
    OccludingToken {
        id: id.to_owned(),
        center: Point2::new(x, y),
        width: size,
        height: size,
    }
}
