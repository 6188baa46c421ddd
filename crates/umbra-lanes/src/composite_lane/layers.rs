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

use crate::region_lane::SourceId;
use std::cmp::Ordering;

/// A mesh the host draws for one source in one effect container.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMesh {
    /// Stable mesh identifier, the last sort tiebreaker.
    pub id: u64,
    /// The source the mesh renders.
    pub source: SourceId,
    /// Primary sort key.
    pub z_index: i32,
    /// Secondary sort key.
    pub sort_layer: i32,
    /// Tertiary sort key.
    pub sort: f32,
    /// Whether the host may skip drawing the mesh when it is off screen.
    pub cullable: bool,
}

impl SourceMesh {
    /// Creates a cullable mesh with all sort keys at zero.
    pub fn new(id: u64, source: SourceId) -> Self {
        Self {
            id,
            source,
            z_index: 0,
            sort_layer: 0,
            sort: 0.0,
            cullable: true,
        }
    }

    /// The fixed depth-sort comparison.
    pub fn depth_order(&self, other: &Self) -> Ordering {
        self.z_index
            .cmp(&other.z_index)
            .then(self.sort_layer.cmp(&other.sort_layer))
            .then(self.sort.total_cmp(&other.sort))
            .then(self.id.cmp(&other.id))
    }
}

/// One host effect container.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshContainer {
    /// The container's meshes, in draw order.
    pub meshes: Vec<SourceMesh>,
    /// Whether the host re-sorts the children on its own.
    pub sortable_children: bool,
}

impl Default for MeshContainer {
    fn default() -> Self {
        Self {
            meshes: Vec::new(),
            sortable_children: true,
        }
    }
}

impl MeshContainer {
    /// Sorts the meshes by [`SourceMesh::depth_order`], keeping the relative
    /// order of equal meshes.
    pub fn sort(&mut self) {
        self.meshes.sort_by(SourceMesh::depth_order);
    }
}

/// Identifies one of the four effect containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectLayer {
    /// Vision drawn under the scene.
    BackgroundVision,
    /// Lighting drawn under the scene.
    BackgroundLighting,
    /// Illumination light meshes.
    IlluminationLights,
    /// Coloration meshes.
    Coloration,
}

impl EffectLayer {
    /// All containers.
    pub const ALL: [EffectLayer; 4] = [
        EffectLayer::BackgroundVision,
        EffectLayer::BackgroundLighting,
        EffectLayer::IlluminationLights,
        EffectLayer::Coloration,
    ];
}

/// The host's four effect containers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectLayers {
    /// Vision drawn under the scene.
    pub background_vision: MeshContainer,
    /// Lighting drawn under the scene.
    pub background_lighting: MeshContainer,
    /// Illumination light meshes.
    pub illumination_lights: MeshContainer,
    /// Coloration meshes.
    pub coloration: MeshContainer,
}

impl EffectLayers {
    /// Borrows one container.
    pub fn layer(&self, layer: EffectLayer) -> &MeshContainer {
        match layer {
            EffectLayer::BackgroundVision => &self.background_vision,
            EffectLayer::BackgroundLighting => &self.background_lighting,
            EffectLayer::IlluminationLights => &self.illumination_lights,
            EffectLayer::Coloration => &self.coloration,
        }
    }

    /// Mutably borrows one container.
    pub fn layer_mut(&mut self, layer: EffectLayer) -> &mut MeshContainer {
        match layer {
            EffectLayer::BackgroundVision => &mut self.background_vision,
            EffectLayer::BackgroundLighting => &mut self.background_lighting,
            EffectLayer::IlluminationLights => &mut self.illumination_lights,
            EffectLayer::Coloration => &mut self.coloration,
        }
    }

    /// Iterates every container mutably.
    pub fn containers_mut(&mut self) -> impl Iterator<Item = &mut MeshContainer> {
        [
            &mut self.background_vision,
            &mut self.background_lighting,
            &mut self.illumination_lights,
            &mut self.coloration,
        ]
        .into_iter()
    }

    /// Iterates every mesh of every container mutably.
    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut SourceMesh> {
        self.containers_mut().flat_map(|c| c.meshes.iter_mut())
    }

    /// Turns off host-side child sorting on every container.
    pub fn disable_child_sorting(&mut self) {
        self.containers_mut().for_each(|c| c.sortable_children = false);
    }

    /// Sorts every container into deterministic depth order.
    pub fn sort_all(&mut self) {
        self.containers_mut().for_each(MeshContainer::sort);
    }
}
