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

use super::{
    aggregate_flags, AggregateFlags, PerceptionDelta, Region, RegionActivity, RegionChanges,
    RegionError, RegionId, RegionShape,
};
use ahash::AHashMap;
use umbra_core::math::LinearRgba;

/// The single source of truth for which lighting regions exist and which of
/// them are active.
///
/// The scene layer writes regions; the aggregator only records what changed
/// and turns it into a [`PerceptionDelta`] once per frame. It never changes a
/// region's activity on its own.
#[derive(Debug, Default)]
pub struct RegionAggregator {
    regions: AHashMap<RegionId, Region>,
    removed: Vec<RegionId>,
    aggregate: AggregateFlags,
    refreshed: bool,
}

impl RegionAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a region.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::Duplicate`] if the identifier is live.
    pub fn register(&mut self, mut region: Region) -> Result<(), RegionError> {
        if self.regions.contains_key(&region.id) {
            return Err(RegionError::Duplicate(region.id));
        }
        region.changes |= RegionChanges::CREATED;
        log::trace!("Registered region '{}' ({:?})", region.id, region.activity);
        self.regions.insert(region.id.clone(), region);
        Ok(())
    }

    /// Removes a region and returns it.
    pub fn remove(&mut self, id: &RegionId) -> Result<Region, RegionError> {
        let region = self
            .regions
            .remove(id)
            .ok_or_else(|| RegionError::Unknown(id.clone()))?;
        self.removed.push(region.id.clone());
        Ok(region)
    }

    fn region_mut(&mut self, id: &RegionId) -> Result<&mut Region, RegionError> {
        self.regions
            .get_mut(id)
            .ok_or_else(|| RegionError::Unknown(id.clone()))
    }

    /// Activates or deactivates a region.
    pub fn set_active(&mut self, id: &RegionId, active: bool) -> Result<(), RegionError> {
        let region = self.region_mut(id)?;
        let activity = RegionActivity::from(active);
        if region.activity != activity {
            region.activity = activity;
            region.changes |= RegionChanges::ACTIVITY;
        }
        Ok(())
    }

    /// Replaces a region's geometry. Its bounds are recomputed on refresh.
    pub fn set_shape(
        &mut self,
        id: &RegionId,
        shape: impl Into<RegionShape>,
    ) -> Result<(), RegionError> {
        let region = self.region_mut(id)?;
        region.shape = shape.into();
        region.changes |= RegionChanges::GEOMETRY;
        Ok(())
    }

    /// Sets a region's perception flags.
    pub fn set_flags(
        &mut self,
        id: &RegionId,
        global_light: bool,
        fog_exploration: bool,
    ) -> Result<(), RegionError> {
        let region = self.region_mut(id)?;
        if region.global_light != global_light || region.fog_exploration != fog_exploration {
            region.global_light = global_light;
            region.fog_exploration = fog_exploration;
            region.changes |= RegionChanges::FLAGS;
        }
        Ok(())
    }

    /// Sets a region's darkness (clamped to `0..=1`), background and elevation.
    pub fn set_appearance(
        &mut self,
        id: &RegionId,
        darkness: f32,
        background: LinearRgba,
        elevation: f32,
    ) -> Result<(), RegionError> {
        let region = self.region_mut(id)?;
        let darkness = darkness.clamp(0.0, 1.0);
        if region.darkness != darkness
            || region.background != background
            || region.elevation != elevation
        {
            region.darkness = darkness;
            region.background = background;
            region.elevation = elevation;
            region.changes |= RegionChanges::APPEARANCE;
        }
        Ok(())
    }

    /// Clears every region, pending removal and the aggregate flags.
    ///
    /// Every identifier issued so far is unknown afterwards.
    pub fn reset(&mut self) {
        log::debug!("Resetting region aggregator ({} regions)", self.regions.len());
        self.regions.clear();
        self.removed.clear();
        self.aggregate = AggregateFlags::default();
        self.refreshed = false;
    }

    /// Applies every pending change and reports what perception work it needs.
    pub fn refresh(&mut self) -> PerceptionDelta {
        let mut delta = PerceptionDelta::none();

        if !self.removed.is_empty() {
            log::trace!("{} regions removed since last refresh", self.removed.len());
            self.removed.clear();
            delta.initialize_light_sources = true;
            delta.refresh_lighting = true;
            delta.refresh_vision = true;
        }

        for region in self.regions.values_mut() {
            let changes = std::mem::take(&mut region.changes);
            if changes.is_empty() {
                continue;
            }
            if changes.contains(RegionChanges::GEOMETRY) {
                region.bounds = region.shape.bounds();
            }
            delta.merge(delta_for(changes, region.is_active()));
        }

        let aggregate = aggregate_flags(self.active_regions());
        if aggregate.global_light != self.aggregate.global_light {
            delta.refresh_lighting = true;
        }
        if aggregate.fog_exploration != self.aggregate.fog_exploration {
            delta.refresh_vision = true;
        }
        self.aggregate = aggregate;
        self.refreshed = true;

        log::trace!("Region refresh: {delta:?}, aggregate {aggregate:?}");
        delta
    }

    /// Iterates the active regions. Order is unspecified.
    pub fn active_regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values().filter(|r| r.is_active())
    }

    /// Iterates every registered region, active or not. Order is unspecified.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Looks up a region.
    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` if no region is registered.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Aggregate global light as of the last refresh (`false` before any).
    pub fn global_light(&self) -> bool {
        self.aggregate.global_light
    }

    /// Aggregate fog exploration as of the last refresh (`false` before any).
    pub fn fog_exploration(&self) -> bool {
        self.aggregate.fog_exploration
    }

    /// Both aggregate flags as of the last refresh.
    pub fn aggregate(&self) -> AggregateFlags {
        self.aggregate
    }

    /// Returns `true` once `refresh` has run since creation or the last reset.
    pub fn has_refreshed(&self) -> bool {
        self.refreshed
    }
}

fn delta_for(changes: RegionChanges, active: bool) -> PerceptionDelta {
    let mut delta = PerceptionDelta::none();
    if changes.contains(RegionChanges::CREATED) {
        delta.initialize_light_sources = true;
        delta.refresh_lighting = true;
        delta.refresh_vision = true;
    }
    if changes.contains(RegionChanges::ACTIVITY) {
        delta.refresh_lighting = true;
        delta.refresh_vision = true;
    }
    if changes.contains(RegionChanges::GEOMETRY)
        && (active || changes.contains(RegionChanges::ACTIVITY))
    {
        delta.refresh_lighting = true;
        delta.refresh_vision = true;
        delta.refresh_occlusion = true;
    }
    if active && changes.intersects(RegionChanges::FLAGS | RegionChanges::APPEARANCE) {
        delta.refresh_lighting = true;
    }
    delta
}
