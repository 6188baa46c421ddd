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

//! Integration tests for the lifecycle listeners and the session surface.

mod support;

use std::io::Write;
use std::sync::Arc;
use support::{calls, drawn_session, light, open_session, HostCall, RecordingHost, SCENE};
use umbra_agents::lighting_agent::{LifecycleEvent, LightingError};
use umbra_agents::SceneSession;
use umbra_core::math::{Extent2D, LinearRgba, Point2, Rect, Shape};
use umbra_core::renderer::{
    Filter, GraphicsDevice, RenderTarget, TextureDataType, TextureDescriptor, TextureFormat,
};
use umbra_core::LightingSettings;
use umbra_infra::SoftwareDevice;
use umbra_lanes::composite_lane::{EffectLayer, FramebufferSlot};
use umbra_lanes::region_lane::{
    Region, RegionError, RegionId, RegionSource, SourceId, SourceKind, SourceOwner,
};

fn all_cullable(session: &mut SceneSession) -> Vec<bool> {
    session
        .agent_mut()
        .host_mut()
        .effect_layers_mut()
        .meshes_mut()
        .map(|m| m.cullable)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scene setup
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_scene_init_configures_blur_at_mask_resolution() {
    let settings = LightingSettings {
        mask_resolution: 0.5,
        occlusion_blur_radius: 4.0,
        ..LightingSettings::default()
    };
    let (mut session, _probe, _device) = open_session(settings);

    session.handle(LifecycleEvent::SceneInit).unwrap();

    let handle = session.agent().occlusion_mask();
    let stage = session.agent_mut().masks_mut().stage_mut(handle).unwrap();
    assert_eq!(
        stage.filters(),
        &[Filter::Blur {
            radius: 4.0,
            passes: 3,
            resolution: 0.5,
        }]
    );
}

#[test]
fn test_scene_group_created_prepares_containers_once() {
    let (mut session, probe, _device) = open_session(LightingSettings::default());

    session.handle(LifecycleEvent::SceneGroupCreated).unwrap();
    session.handle(LifecycleEvent::SceneGroupCreated).unwrap();

    assert_eq!(calls(&probe), vec![HostCall::DetachBackground]);
    assert!(session.agent().illumination_background().is_some());
    let layers = session.agent_mut().host_mut().effect_layers_mut();
    for layer in EffectLayer::ALL {
        assert!(!layers.layer(layer).sortable_children);
    }
}

#[test]
fn test_scene_group_drawn_installs_depth_pass_once_and_follows_resizes() {
    let (mut session, probe, _device) = drawn_session();
    assert!(session.agent().depth_pass_installed());
    assert_eq!(
        session
            .dispatcher_mut()
            .listener_count(LifecycleEvent::SceneGroupDrawn),
        1
    );

    let framebuffer = session.agent().framebuffer();
    assert!(framebuffer.is_drawn());
    assert_eq!(framebuffer.dimensions(), SCENE);
    let background = session.agent().illumination_background().unwrap();
    assert_eq!(
        background.texture(),
        framebuffer.texture(FramebufferSlot::ColorBackground)
    );
    assert_eq!(background.screen_dimensions(), Extent2D::new(200, 100));

    let resized = Rect::new(0.0, 0.0, 300.0, 150.0);
    probe.lock().unwrap().scene = Some(resized);
    session.handle(LifecycleEvent::SceneGroupDrawn).unwrap();

    assert_eq!(session.agent().framebuffer().dimensions(), resized);
    assert_eq!(session.agent().masks().viewport(), resized);
    let background = session.agent().illumination_background().unwrap();
    assert_eq!(background.rect(), resized);
    assert_eq!(background.screen_dimensions(), Extent2D::new(300, 150));
}

#[test]
fn test_events_queued_on_the_bus_are_pumped_in_order() {
    let (mut session, _probe, _device) = open_session(LightingSettings::default());
    let sender = session.event_sender();
    sender.send(LifecycleEvent::SceneInit).unwrap();
    sender.send(LifecycleEvent::SceneGroupCreated).unwrap();
    sender.send(LifecycleEvent::SceneGroupDrawn).unwrap();

    assert_eq!(session.pump_events().unwrap(), 3);
    assert!(session.agent().depth_pass_installed());
    assert!(session.agent().framebuffer().is_drawn());
    assert_eq!(session.pump_events().unwrap(), 0);
}

#[test]
fn test_background_sampler_reads_region_colors() {
    let (mut session, _probe, device) = drawn_session();
    let tint = LinearRgba::rgb(0.0, 1.0, 0.0);
    session
        .agent_mut()
        .regions_mut()
        .register(
            light("grove", 1, Rect::new(0.0, 0.0, 50.0, 50.0)).with_appearance(0.5, tint, 0.0),
        )
        .unwrap();
    session.refresh_lighting().unwrap();

    let background = session.agent().illumination_background().unwrap();
    let inside = background
        .sample(&*device, Point2::new(10.0, 10.0))
        .unwrap()
        .unwrap();
    assert_eq!(inside, tint);
    let outside = background
        .sample(&*device, Point2::new(150.0, 80.0))
        .unwrap()
        .unwrap();
    assert_eq!(outside, LinearRgba::BLACK);
    assert!(background
        .sample(&*device, Point2::new(500.0, 10.0))
        .unwrap()
        .is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Teardown
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_group_teardown_releases_textures_and_redraw_restores_them() {
    let (mut session, _probe, device) = drawn_session();
    assert_eq!(device.live_texture_count(), 3);

    session.handle(LifecycleEvent::SceneGroupTornDown).unwrap();

    assert_eq!(device.live_texture_count(), 0);
    assert!(!session.agent().framebuffer().is_drawn());
    assert!(session
        .agent()
        .illumination_background()
        .unwrap()
        .texture()
        .is_none());

    session.occlusion_texture().unwrap();
    assert_eq!(device.live_texture_count(), 1);

    session.handle(LifecycleEvent::SceneGroupDrawn).unwrap();
    assert_eq!(device.live_texture_count(), 3);
    assert!(session.agent().framebuffer().is_drawn());
    assert!(session.refresh_lighting().is_ok());
}

#[test]
fn test_scene_teardown_forgets_every_region() {
    let (mut session, _probe, _device) = drawn_session();
    session
        .agent_mut()
        .regions_mut()
        .register(light("lamp", 1, Rect::new(0.0, 0.0, 10.0, 10.0)))
        .unwrap();
    session.refresh_lighting().unwrap();
    session
        .draw_occlusion_shapes(vec![support::token("t", 5.0, 5.0, 4.0)])
        .unwrap();

    session.handle(LifecycleEvent::SceneTornDown).unwrap();

    let lamp = RegionId::new("lamp");
    let regions = session.agent_mut().regions_mut();
    assert!(regions.is_empty());
    assert_eq!(
        regions.set_active(&lamp, false),
        Err(RegionError::Unknown(lamp.clone()))
    );
    assert!(regions
        .register(light("lamp", 1, Rect::new(0.0, 0.0, 10.0, 10.0)))
        .is_ok());
    assert!(session.agent().occluding_tokens().is_none());
}

#[test]
fn test_close_releases_every_texture_and_returns_the_host() {
    let (session, _probe, device) = drawn_session();
    assert!(device.live_texture_count() > 0);

    let mut host = session.close();

    assert_eq!(device.live_texture_count(), 0);
    assert_eq!(host.scene_dimensions(), SCENE);
    assert!(!host.effect_layers_mut().background_vision.sortable_children);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cullability fix-up
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_first_refresh_after_ready_suspends_culling_for_one_tick() {
    let (mut session, _probe, _device) = drawn_session();
    session
        .agent_mut()
        .host_mut()
        .effect_layers_mut()
        .layer_mut(EffectLayer::IlluminationLights)
        .meshes[0]
        .cullable = false;
    let before = all_cullable(&mut session);

    session.handle(LifecycleEvent::SceneReady).unwrap();
    assert!(session.agent().cullability_armed());
    session.refresh_lighting().unwrap();

    assert!(!session.agent().cullability_armed());
    assert!(all_cullable(&mut session).iter().all(|c| !c));
    assert_eq!(session.agent().pending_tasks(), 1);

    assert_eq!(session.tick(), 1);
    assert_eq!(all_cullable(&mut session), before);

    session.refresh_lighting().unwrap();
    assert_eq!(session.agent().pending_tasks(), 0);
    assert_eq!(all_cullable(&mut session), before);
}

#[test]
fn test_refresh_without_ready_leaves_culling_alone() {
    let (mut session, _probe, _device) = drawn_session();
    session.refresh_lighting().unwrap();

    assert_eq!(session.agent().pending_tasks(), 0);
    assert!(all_cullable(&mut session).iter().all(|c| *c));
}

// ─────────────────────────────────────────────────────────────────────────────
// Depth pass
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_depth_pass_skips_tiles_inactive_and_broken_regions() {
    let device = Arc::new(SoftwareDevice::new());
    let (host, _probe) = RecordingHost::new();
    let mut session =
        SceneSession::new(device.clone(), Box::new(host), LightingSettings::default()).unwrap();
    let target = RenderTarget {
        texture: device
            .create_texture(&TextureDescriptor {
                label: None,
                size: Extent2D::new(200, 100),
                format: TextureFormat::Red,
                data_type: TextureDataType::Float,
            })
            .unwrap(),
        viewport: SCENE,
    };
    assert!(session.render_depth(&target).is_none());

    session.handle(LifecycleEvent::SceneGroupDrawn).unwrap();
    let tile_source = RegionSource::new(
        SourceId(9),
        SourceKind::Light,
        SourceOwner::Tile("roof".into()),
    );
    let regions = session.agent_mut().regions_mut();
    regions
        .register(
            light("high", 1, Rect::new(0.0, 0.0, 20.0, 20.0))
                .with_appearance(0.0, LinearRgba::BLACK, 3.0),
        )
        .unwrap();
    regions
        .register(
            light("low", 2, Rect::new(10.0, 10.0, 20.0, 20.0))
                .with_appearance(0.0, LinearRgba::BLACK, 1.0),
        )
        .unwrap();
    regions
        .register(Region::new("dark", Rect::new(0.0, 0.0, 5.0, 5.0), tile_source.clone()))
        .unwrap();
    regions
        .register(
            Region::new("tile", Rect::new(0.0, 0.0, 5.0, 5.0), tile_source).with_activity(true),
        )
        .unwrap();
    regions
        .register(light("broken", 3, Rect::new(0.0, 0.0, 1.0, 1.0)))
        .unwrap();
    regions
        .set_shape(
            &RegionId::new("broken"),
            Shape::Polygon(vec![Point2::new(0.0, 0.0), Point2::new(5.0, 5.0)]),
        )
        .unwrap();

    let report = session.render_depth(&target).unwrap();

    assert_eq!(
        report.rendered,
        vec![RegionId::new("low"), RegionId::new("high")]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, RegionId::new("broken"));

    let texels = device.read_texture(target.texture).unwrap();
    assert_eq!(texels.texel(15, 15).unwrap().r, 3.0);
    assert_eq!(texels.texel(25, 25).unwrap().r, 1.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_session_fails_when_device_cannot_back_the_masks() {
    let device = Arc::new(SoftwareDevice::with_memory_limit(64));
    let (host, _probe) = RecordingHost::new();

    let err = SceneSession::new(device, Box::new(host), LightingSettings::default()).unwrap_err();

    assert!(matches!(err, LightingError::Initialization(_)));
}

#[test]
fn test_session_reads_settings_from_a_ron_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "(default_darkness: 0.25, occlusion_mask_name: \"radial\")").unwrap();
    let device = Arc::new(SoftwareDevice::new());
    let (host, _probe) = RecordingHost::new();

    let session = SceneSession::with_settings_file(device, Box::new(host), file.path()).unwrap();

    assert_eq!(session.agent().settings().default_darkness, 0.25);
    assert_eq!(
        session.agent().masks().handle("radial"),
        Some(session.agent().occlusion_mask())
    );
}

#[test]
fn test_missing_settings_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let device = Arc::new(SoftwareDevice::new());
    let (host, _probe) = RecordingHost::new();

    let err =
        SceneSession::with_settings_file(device, Box::new(host), dir.path().join("absent.ron"))
            .unwrap_err();

    assert!(matches!(err, LightingError::Settings(_)));
}
