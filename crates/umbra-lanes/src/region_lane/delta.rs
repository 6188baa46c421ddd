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

/// What changed during one aggregator refresh.
///
/// Produced once per frame by [`RegionAggregator::refresh`](super::RegionAggregator::refresh)
/// and consumed by the frame driver in the same tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerceptionDelta {
    /// Light sources must be re-registered with the host.
    pub initialize_light_sources: bool,
    /// Lighting (and the framebuffer) must be repainted.
    pub refresh_lighting: bool,
    /// Vision must be recomputed.
    pub refresh_vision: bool,
    /// Occlusion must be recomputed.
    pub refresh_occlusion: bool,
}

impl PerceptionDelta {
    /// A delta with no flag set.
    pub const fn none() -> Self {
        Self {
            initialize_light_sources: false,
            refresh_lighting: false,
            refresh_vision: false,
            refresh_occlusion: false,
        }
    }

    /// Returns `true` if no flag is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    /// Sets every flag that is set in `other`.
    pub fn merge(&mut self, other: PerceptionDelta) {
        self.initialize_light_sources |= other.initialize_light_sources;
        self.refresh_lighting |= other.refresh_lighting;
        self.refresh_vision |= other.refresh_vision;
        self.refresh_occlusion |= other.refresh_occlusion;
    }
}

/// The scene-wide OR of the active regions' perception flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateFlags {
    /// OR of every active region's `global_light`.
    pub global_light: bool,
    /// OR of every active region's `fog_exploration`.
    pub fog_exploration: bool,
}

/// Folds the perception flags of `regions` with a boolean OR.
///
/// Stops early once both flags are set. The result does not depend on
/// iteration order.
pub fn aggregate_flags<'a>(regions: impl IntoIterator<Item = &'a super::Region>) -> AggregateFlags {
    let mut flags = AggregateFlags::default();
    for region in regions {
        flags.global_light |= region.global_light;
        flags.fog_exploration |= region.fog_exploration;
        if flags.global_light && flags.fog_exploration {
            break;
        }
    }
    flags
}
