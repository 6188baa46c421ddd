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

//! The per-frame driver wrapped around the host's lighting draw pass.

use super::{LightingAgent, LightingError};
use umbra_lanes::region_lane::PerceptionDelta;

/// One step of a driven frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    /// The region aggregator refreshed and produced the delta.
    AggregatorRefresh,
    /// Darkness-dependent effects were notified.
    DarknessChanged,
    /// The framebuffer was repainted.
    CompositorRefresh,
    /// The host updated perception.
    PerceptionUpdate,
    /// The host's draw pass ran.
    DrawPass,
    /// The effect layers were sorted into depth order.
    DepthSort,
}

/// What one frame did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// The delta produced by the aggregator, before the driver consumed any flag.
    pub delta: PerceptionDelta,
    /// The executed steps, in order.
    pub steps: Vec<FrameStep>,
}

impl FrameReport {
    /// A report for a bare draw pass.
    pub fn draw_pass() -> Self {
        Self {
            delta: PerceptionDelta::none(),
            steps: vec![FrameStep::DrawPass],
        }
    }

    /// Returns `true` if `step` ran.
    pub fn ran(&self, step: FrameStep) -> bool {
        self.steps.contains(&step)
    }
}

/// Drives one frame around `draw`, the host's draw pass.
///
/// Aggregator refresh, then (only when lighting must be refreshed) the
/// darkness notification, then the framebuffer repaint (forced by a lighting
/// change, or pending after a redraw), then the perception update, the draw
/// pass and the depth sort.
///
/// A frame that fails before the perception update keeps its delta; the
/// next frame merges it so the host never misses a change.
pub(crate) fn drive(
    agent: &mut LightingAgent,
    draw: impl FnOnce(&mut LightingAgent) -> Result<FrameReport, LightingError>,
) -> Result<FrameReport, LightingError> {
    let mut delta = agent.regions.refresh();
    delta.merge(std::mem::take(&mut agent.undelivered));
    let mut report = FrameReport {
        delta,
        steps: vec![FrameStep::AggregatorRefresh],
    };

    agent.global_light = agent.regions.global_light();
    agent.fog_exploration = agent.regions.fog_exploration();
    agent.host.set_global_light(agent.global_light);

    let force = delta.refresh_lighting;
    if force {
        agent.host.on_darkness_change();
        report.steps.push(FrameStep::DarknessChanged);
    }
    if force || agent.framebuffer.is_drawn() {
        match agent
            .framebuffer
            .refresh(agent.regions.active_regions(), force)
        {
            Ok(true) => report.steps.push(FrameStep::CompositorRefresh),
            Ok(false) => {}
            Err(e) => {
                agent.undelivered = delta;
                return Err(e.into());
            }
        }
    }
    delta.refresh_lighting = false;

    agent.host.update_perception(delta, true);
    report.steps.push(FrameStep::PerceptionUpdate);

    let inner = draw(agent)?;
    report.steps.extend(inner.steps);

    if agent.settings.depth_sort {
        agent.host.effect_layers_mut().sort_all();
        report.steps.push(FrameStep::DepthSort);
    }

    agent.frames += 1;
    log::trace!("Frame {}: {:?}", agent.frames, report.steps);
    Ok(report)
}
