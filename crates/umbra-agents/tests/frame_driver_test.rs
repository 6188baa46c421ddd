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

//! Integration tests for the per-frame lighting driver.

mod support;

use approx::assert_abs_diff_eq;
use support::{calls, drawn_session, light, open_session, HostCall};
use umbra_agents::lighting_agent::{FrameStep, LifecycleEvent, LightingError};
use umbra_core::math::{LinearRgba, Rect};
use umbra_core::renderer::GraphicsDevice;
use umbra_core::LightingSettings;
use umbra_lanes::composite_lane::{EffectLayer, FramebufferError, FramebufferSlot};
use umbra_lanes::region_lane::{PerceptionDelta, RegionId};

const TEXEL: f32 = 1.0 / 255.0;

// ─────────────────────────────────────────────────────────────────────────────
// Step ordering
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_frame_with_lighting_change_runs_compositor_before_draw() {
    let (mut session, probe, _device) = drawn_session();
    session
        .agent_mut()
        .regions_mut()
        .register(light("lamp", 1, Rect::new(10.0, 10.0, 50.0, 50.0)))
        .unwrap();

    let report = session.refresh_lighting().unwrap();

    assert_eq!(
        report.steps,
        vec![
            FrameStep::AggregatorRefresh,
            FrameStep::DarknessChanged,
            FrameStep::CompositorRefresh,
            FrameStep::PerceptionUpdate,
            FrameStep::DrawPass,
            FrameStep::DepthSort,
        ]
    );
    assert!(report.delta.refresh_lighting, "report keeps the raw delta");

    // The host sees the delta with the lighting flag already consumed.
    let expected_delta = PerceptionDelta {
        initialize_light_sources: true,
        refresh_vision: true,
        ..PerceptionDelta::none()
    };
    assert_eq!(
        calls(&probe),
        vec![
            HostCall::SetGlobalLight(false),
            HostCall::DarknessChanged,
            HostCall::UpdatePerception(expected_delta),
            HostCall::DrawEffects,
        ]
    );
    assert_eq!(session.agent().framebuffer().paint_count(), 1);
}

#[test]
fn test_quiet_frame_skips_compositor() {
    let (mut session, probe, _device) = drawn_session();
    session
        .agent_mut()
        .regions_mut()
        .register(light("lamp", 1, Rect::new(10.0, 10.0, 50.0, 50.0)))
        .unwrap();
    session.refresh_lighting().unwrap();
    calls(&probe);

    let report = session.refresh_lighting().unwrap();

    assert_eq!(
        report.steps,
        vec![
            FrameStep::AggregatorRefresh,
            FrameStep::PerceptionUpdate,
            FrameStep::DrawPass,
            FrameStep::DepthSort,
        ]
    );
    assert_eq!(
        calls(&probe),
        vec![
            HostCall::SetGlobalLight(false),
            HostCall::UpdatePerception(PerceptionDelta::none()),
            HostCall::DrawEffects,
        ]
    );
    assert_eq!(session.agent().framebuffer().paint_count(), 1);
    assert_eq!(session.agent().frames(), 2);
    assert_eq!(session.agent().last_frame(), Some(&report));
}

#[test]
fn test_depth_sort_can_be_disabled() {
    let settings = LightingSettings {
        depth_sort: false,
        ..LightingSettings::default()
    };
    let (mut session, _probe, _device) = open_session(settings);

    let report = session.refresh_lighting().unwrap();

    assert!(!report.ran(FrameStep::DepthSort));
    assert!(report.ran(FrameStep::DrawPass));
}

#[test]
fn test_frame_sorts_effect_meshes_by_depth() {
    let (mut session, _probe, _device) = drawn_session();
    {
        let layers = session.agent_mut().host_mut().effect_layers_mut();
        let meshes = &mut layers.layer_mut(EffectLayer::Coloration).meshes;
        meshes[0].z_index = 5;
        meshes[1].z_index = -1;
    }

    session.refresh_lighting().unwrap();

    let layers = session.agent_mut().host_mut().effect_layers_mut();
    let ids: Vec<u64> = layers
        .layer(EffectLayer::Coloration)
        .meshes
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![32, 31]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate flags
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_global_light_follows_active_regions() {
    let (mut session, probe, _device) = drawn_session();
    let regions = session.agent_mut().regions_mut();
    regions
        .register(light("sun", 1, Rect::new(0.0, 0.0, 20.0, 20.0)).with_flags(true, false))
        .unwrap();
    regions
        .register(light("candle", 2, Rect::new(40.0, 40.0, 20.0, 20.0)))
        .unwrap();

    session.refresh_lighting().unwrap();
    assert!(session.agent().global_light());
    assert!(calls(&probe).contains(&HostCall::SetGlobalLight(true)));

    session
        .agent_mut()
        .regions_mut()
        .set_active(&RegionId::new("sun"), false)
        .unwrap();
    let report = session.refresh_lighting().unwrap();

    assert!(!session.agent().global_light());
    assert!(report.ran(FrameStep::CompositorRefresh));
    let frame_calls = calls(&probe);
    assert_eq!(frame_calls[0], HostCall::SetGlobalLight(false));
    assert!(frame_calls.contains(&HostCall::DarknessChanged));
}

#[test]
fn test_fog_exploration_hook_reports_aggregate() {
    let (mut session, _probe, _device) = drawn_session();
    assert!(!session.fog_exploration());

    session
        .agent_mut()
        .regions_mut()
        .register(light("fog", 1, Rect::new(0.0, 0.0, 20.0, 20.0)).with_flags(false, true))
        .unwrap();
    session.refresh_lighting().unwrap();

    assert!(session.fog_exploration());
}

// ─────────────────────────────────────────────────────────────────────────────
// Compositor output
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compositor_encodes_region_darkness() {
    let (mut session, _probe, device) = drawn_session();
    session
        .agent_mut()
        .regions_mut()
        .register(
            light("dim", 1, Rect::new(10.0, 10.0, 50.0, 50.0)).with_appearance(
                0.75,
                LinearRgba::rgb(0.2, 0.4, 0.6),
                0.0,
            ),
        )
        .unwrap();

    session.refresh_lighting().unwrap();

    let framebuffer = session.agent().framebuffer();
    let lighting = framebuffer.texture(FramebufferSlot::Lighting).unwrap();
    let texels = device.read_texture(lighting).unwrap();
    let inside = texels.texel(20, 20).unwrap();
    assert_abs_diff_eq!(inside.r, 0.75, epsilon = TEXEL);
    assert_abs_diff_eq!(inside.a, 1.0, epsilon = TEXEL);
    let outside = texels.texel(150, 80).unwrap();
    assert_abs_diff_eq!(outside.r, 0.0, epsilon = TEXEL);
    assert_abs_diff_eq!(outside.a, 0.0, epsilon = TEXEL);

    let background = framebuffer.texture(FramebufferSlot::ColorBackground).unwrap();
    let texels = device.read_texture(background).unwrap();
    let inside = texels.texel(20, 20).unwrap();
    assert_abs_diff_eq!(inside.b, 0.6, epsilon = TEXEL);
}

// ─────────────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compositor_before_scene_group_drawn_fails_the_frame() {
    let (mut session, _probe, _device) = open_session(LightingSettings::default());
    session
        .agent_mut()
        .regions_mut()
        .register(light("lamp", 1, Rect::new(10.0, 10.0, 50.0, 50.0)))
        .unwrap();

    let err = session.refresh_lighting().unwrap_err();

    assert!(matches!(
        err,
        LightingError::Framebuffer(FramebufferError::NotDrawn)
    ));
    assert_eq!(session.agent().frames(), 0);
}

#[test]
fn test_draw_pass_failure_propagates() {
    let (mut session, probe, _device) = drawn_session();
    probe.lock().unwrap().fail_draw = true;

    let err = session.refresh_lighting().unwrap_err();

    assert!(matches!(err, LightingError::Host(_)));
    assert!(session.agent().last_frame().is_none());

    probe.lock().unwrap().fail_draw = false;
    assert!(session.refresh_lighting().is_ok());
}

#[test]
fn test_failed_frame_delta_reaches_the_host_on_the_next_frame() {
    let (mut session, probe, _device) = open_session(LightingSettings::default());
    session
        .agent_mut()
        .regions_mut()
        .register(light("lamp", 1, Rect::new(10.0, 10.0, 50.0, 50.0)))
        .unwrap();
    assert!(session.refresh_lighting().is_err());
    assert!(session.agent().undelivered_delta().initialize_light_sources);

    for event in [
        LifecycleEvent::SceneInit,
        LifecycleEvent::SceneGroupCreated,
        LifecycleEvent::SceneGroupDrawn,
    ] {
        session.handle(event).unwrap();
    }
    calls(&probe);

    let report = session.refresh_lighting().unwrap();

    assert!(report.delta.refresh_lighting);
    assert!(report.ran(FrameStep::CompositorRefresh));
    let expected_delta = PerceptionDelta {
        initialize_light_sources: true,
        refresh_vision: true,
        ..PerceptionDelta::none()
    };
    assert_eq!(
        calls(&probe),
        vec![
            HostCall::SetGlobalLight(false),
            HostCall::DarknessChanged,
            HostCall::UpdatePerception(expected_delta),
            HostCall::DrawEffects,
        ]
    );
    assert_eq!(session.agent().undelivered_delta(), PerceptionDelta::none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Redraw
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_quiet_frame_after_group_redraw_repaints_fresh_textures() {
    let (mut session, probe, device) = drawn_session();
    session
        .agent_mut()
        .regions_mut()
        .register(
            light("lamp", 1, Rect::new(10.0, 10.0, 50.0, 50.0)).with_appearance(
                0.75,
                LinearRgba::rgb(0.2, 0.4, 0.6),
                0.0,
            ),
        )
        .unwrap();
    session.refresh_lighting().unwrap();
    let old_background = session
        .agent()
        .framebuffer()
        .texture(FramebufferSlot::ColorBackground)
        .unwrap();

    session.handle(LifecycleEvent::SceneGroupTornDown).unwrap();
    session.handle(LifecycleEvent::SceneGroupDrawn).unwrap();
    calls(&probe);
    let report = session.refresh_lighting().unwrap();

    // Nothing changed in the region set: the repaint comes from the redraw.
    assert!(!report.ran(FrameStep::DarknessChanged));
    assert!(report.ran(FrameStep::CompositorRefresh));
    assert!(!calls(&probe).contains(&HostCall::DarknessChanged));
    assert_eq!(session.agent().framebuffer().paint_count(), 2);

    let framebuffer = session.agent().framebuffer();
    let background = framebuffer.texture(FramebufferSlot::ColorBackground).unwrap();
    assert_ne!(background, old_background);
    let texels = device.read_texture(background).unwrap();
    assert_abs_diff_eq!(texels.texel(20, 20).unwrap().b, 0.6, epsilon = TEXEL);
    let lighting = framebuffer.texture(FramebufferSlot::Lighting).unwrap();
    let texels = device.read_texture(lighting).unwrap();
    assert_abs_diff_eq!(texels.texel(20, 20).unwrap().r, 0.75, epsilon = TEXEL);

    let report = session.refresh_lighting().unwrap();
    assert!(!report.ran(FrameStep::CompositorRefresh));
    assert_eq!(session.agent().framebuffer().paint_count(), 2);
}
