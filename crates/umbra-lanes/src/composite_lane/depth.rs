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

use crate::region_lane::{Region, RegionId};
use umbra_core::math::LinearRgba;
use umbra_core::renderer::{GraphicsDevice, RenderTarget, ResourceError, Stage};

/// The outcome of one depth pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepthReport {
    /// Regions whose depth was written, in render order.
    pub rendered: Vec<RegionId>,
    /// Regions that failed and were left out of this frame.
    pub failed: Vec<(RegionId, ResourceError)>,
}

/// Renders active regions into the host's depth target.
///
/// Each region fills its shape with its elevation in the red channel.
/// Regions owned by tiles are skipped; tiles write their own depth.
#[derive(Debug, Default)]
pub struct DepthPass {
    frames: u64,
}

impl DepthPass {
    /// Creates a depth pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the depth of every active, non-tile region into `target`,
    /// lowest elevation first.
    ///
    /// A region that fails to render is logged and skipped; the rest of the
    /// pass continues.
    pub fn render<'a>(
        &mut self,
        device: &dyn GraphicsDevice,
        target: &RenderTarget,
        regions: impl IntoIterator<Item = &'a Region>,
    ) -> DepthReport {
        let mut ordered: Vec<&Region> = regions
            .into_iter()
            .filter(|r| r.is_active() && !r.source().is_tile())
            .collect();
        ordered.sort_by(|a, b| {
            a.elevation()
                .total_cmp(&b.elevation())
                .then_with(|| a.id().cmp(b.id()))
        });

        let mut report = DepthReport::default();
        let mut stage = Stage::new();
        for region in ordered {
            stage.fill(
                region.shape().clone(),
                LinearRgba::new(region.elevation(), 0.0, 0.0, 1.0),
            );
            match device.render_stage(target, &stage, None) {
                Ok(()) => report.rendered.push(region.id().clone()),
                Err(e) => {
                    log::warn!("Skipping depth of region '{}': {e}", region.id());
                    report.failed.push((region.id().clone(), e));
                }
            }
            stage.clear();
        }

        self.frames += 1;
        log::trace!(
            "Depth pass rendered {} regions, {} failed",
            report.rendered.len(),
            report.failed.len()
        );
        report
    }

    /// Number of passes rendered.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
