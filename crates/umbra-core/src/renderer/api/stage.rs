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

//! Defines the retained draw content rendered into a texture.
//!
//! A [`Stage`] separates "what to draw" from "render it": producers append
//! transient [`DrawCommand`]s, a device renders the stage into a target, and
//! the producer then clears the commands so nothing outlives the render.
//! Post-process [`Filter`]s are part of the stage's configuration and survive
//! [`Stage::clear`].

use crate::math::{LinearRgba, Shape};

/// A single primitive drawing operation in scene pixel space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fills a shape with a solid color, replacing the covered texels.
    Fill {
        /// The shape to fill.
        shape: Shape,
        /// The fill color.
        color: LinearRgba,
    },
}

/// A post-process applied to the whole target after all commands are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    /// A separable box blur approximating a gaussian.
    Blur {
        /// Blur radius in scene pixels.
        radius: f32,
        /// Number of box passes; three passes approximate a gaussian closely.
        passes: u32,
        /// Texels per scene pixel of the target the filter runs on.
        resolution: f32,
    },
}

/// Retained draw content for a render-to-texture operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stage {
    commands: Vec<DrawCommand>,
    filters: Vec<Filter>,
}

impl Stage {
    /// Creates an empty stage with no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a solid fill.
    pub fn fill(&mut self, shape: impl Into<Shape>, color: LinearRgba) {
        self.commands.push(DrawCommand::Fill {
            shape: shape.into(),
            color,
        });
    }

    /// Appends an arbitrary command.
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Returns the draw commands in submission order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns the configured post-process filters.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Replaces the post-process filters.
    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
    }

    /// Returns `true` if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Destroys every draw command, keeping the filters.
    ///
    /// Returns the number of commands that were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.commands.len();
        self.commands.clear();
        removed
    }
}
