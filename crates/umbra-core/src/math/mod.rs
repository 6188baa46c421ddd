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

//! Provides foundational 2D mathematics for the overlay pipeline.
//!
//! The scene viewer works in a flat pixel space, so everything here is
//! two-dimensional: points, axis-aligned rectangles, fillable shapes, linear
//! colors, and integer extents for texture sizes.

pub mod color;
pub mod dimension;
pub mod geometry;

pub use self::color::LinearRgba;
pub use self::dimension::Extent2D;
pub use self::geometry::{Point2, Rect, Shape};

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;
