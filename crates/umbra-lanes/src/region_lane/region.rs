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

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use umbra_core::math::{LinearRgba, Rect, Shape};

/// The geometry a region covers in scene pixels.
pub type RegionShape = Shape;

/// A stable, host-supplied region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(String);

impl RegionId {
    /// Creates an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An opaque identifier for the visual source that owns a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// What a source emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A light source.
    Light,
    /// A vision source.
    Vision,
    /// A darkness source, subtracting light.
    Darkness,
}

/// The scene object a source is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceOwner {
    /// A token, by document id.
    Token(String),
    /// A placed ambient light, by document id.
    AmbientLight(String),
    /// A tile, by document id. Tile regions are excluded from the depth pass.
    Tile(String),
    /// The scene itself.
    Scene,
}

/// The visual source that owns a region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionSource {
    /// The source's identifier.
    pub id: SourceId,
    /// What the source emits.
    pub kind: SourceKind,
    /// The scene object the source belongs to.
    pub owner: SourceOwner,
}

impl RegionSource {
    /// Creates a source descriptor.
    pub fn new(id: SourceId, kind: SourceKind, owner: SourceOwner) -> Self {
        Self { id, kind, owner }
    }

    /// Returns `true` if the source belongs to a tile.
    pub fn is_tile(&self) -> bool {
        matches!(self.owner, SourceOwner::Tile(_))
    }
}

/// Whether a registered region takes part in aggregation and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegionActivity {
    /// Registered but excluded.
    #[default]
    Inactive,
    /// Included in aggregation and rendering.
    Active,
}

impl From<bool> for RegionActivity {
    fn from(active: bool) -> Self {
        if active {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

/// A set of pending region changes, cleared by the aggregator's refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegionChanges(u8);

impl RegionChanges {
    /// No change.
    pub const NONE: Self = Self(0);
    /// The shape changed; cached bounds are stale.
    pub const GEOMETRY: Self = Self(1 << 0);
    /// `global_light` or `fog_exploration` changed.
    pub const FLAGS: Self = Self(1 << 1);
    /// Darkness, background or elevation changed.
    pub const APPEARANCE: Self = Self(1 << 2);
    /// The region was activated or deactivated.
    pub const ACTIVITY: Self = Self(1 << 3);
    /// The region was registered since the last refresh.
    pub const CREATED: Self = Self(1 << 4);

    /// Returns `true` if every change in `other` is present.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any change in `other` is present.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if nothing changed.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for RegionChanges {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RegionChanges {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A lighting region: one source's contribution to perception.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub(crate) id: RegionId,
    pub(crate) shape: RegionShape,
    pub(crate) bounds: Rect,
    pub(crate) source: RegionSource,
    pub(crate) global_light: bool,
    pub(crate) fog_exploration: bool,
    pub(crate) darkness: f32,
    pub(crate) background: LinearRgba,
    pub(crate) elevation: f32,
    pub(crate) activity: RegionActivity,
    pub(crate) changes: RegionChanges,
}

impl Region {
    /// Creates an inactive region with no flags, no darkness, a black
    /// background and zero elevation.
    pub fn new(id: impl Into<RegionId>, shape: impl Into<RegionShape>, source: RegionSource) -> Self {
        let shape = shape.into();
        Self {
            id: id.into(),
            bounds: shape.bounds(),
            shape,
            source,
            global_light: false,
            fog_exploration: false,
            darkness: 0.0,
            background: LinearRgba::BLACK,
            elevation: 0.0,
            activity: RegionActivity::Inactive,
            changes: RegionChanges::CREATED,
        }
    }

    /// Sets the activity.
    pub fn with_activity(mut self, activity: impl Into<RegionActivity>) -> Self {
        self.activity = activity.into();
        self
    }

    /// Sets the perception flags.
    pub fn with_flags(mut self, global_light: bool, fog_exploration: bool) -> Self {
        self.global_light = global_light;
        self.fog_exploration = fog_exploration;
        self
    }

    /// Sets darkness (clamped to `0..=1`), background and elevation.
    pub fn with_appearance(mut self, darkness: f32, background: LinearRgba, elevation: f32) -> Self {
        self.darkness = darkness.clamp(0.0, 1.0);
        self.background = background;
        self.elevation = elevation;
        self
    }

    /// The region's identifier.
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    /// The region's geometry.
    pub fn shape(&self) -> &RegionShape {
        &self.shape
    }

    /// The bounds cached at the last refresh (or at creation).
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The owning source.
    pub fn source(&self) -> &RegionSource {
        &self.source
    }

    /// Whether the region provides global light.
    pub fn global_light(&self) -> bool {
        self.global_light
    }

    /// Whether the region reveals explored fog.
    pub fn fog_exploration(&self) -> bool {
        self.fog_exploration
    }

    /// Darkness level in `0..=1`.
    pub fn darkness(&self) -> f32 {
        self.darkness
    }

    /// Background color painted under the region.
    pub fn background(&self) -> LinearRgba {
        self.background
    }

    /// Draw order and depth value.
    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Current activity.
    pub fn activity(&self) -> RegionActivity {
        self.activity
    }

    /// Returns `true` if the region is active.
    pub fn is_active(&self) -> bool {
        self.activity == RegionActivity::Active
    }

    /// Changes recorded since the last refresh.
    pub fn pending_changes(&self) -> RegionChanges {
        self.changes
    }
}
