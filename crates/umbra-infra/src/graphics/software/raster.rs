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

//! Point-sampled rasterization of stage commands into `f32` texel buffers.

use umbra_core::math::{LinearRgba, Point2, Rect, Shape};
use umbra_core::renderer::{DrawCommand, Filter, ResourceError};

/// A mutable view of one texture's texels.
pub(crate) struct Canvas<'a> {
    pub texels: &'a mut [f32],
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub quantize: bool,
}

impl Canvas<'_> {
    fn write(&mut self, x: usize, y: usize, color: LinearRgba) {
        let start = (y * self.width + x) * self.channels;
        let rgba = color.to_array();
        for (c, value) in rgba.iter().enumerate().take(self.channels) {
            self.texels[start + c] = if self.quantize {
                value.clamp(0.0, 1.0)
            } else {
                *value
            };
        }
    }

    /// Overwrites every texel with `color`.
    pub fn clear(&mut self, color: LinearRgba) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.write(x, y, color);
            }
        }
    }

    /// Fills the texels whose centers fall inside `shape`.
    pub fn fill(&mut self, viewport: Rect, shape: &Shape, color: LinearRgba) {
        let sx = self.width as f32 / viewport.width;
        let sy = self.height as f32 / viewport.height;
        let bounds = shape.bounds();

        let x0 = (((bounds.x - viewport.x) * sx).floor().max(0.0)) as usize;
        let y0 = (((bounds.y - viewport.y) * sy).floor().max(0.0)) as usize;
        let x1 = (((bounds.right() - viewport.x) * sx).ceil().max(0.0) as usize).min(self.width);
        let y1 = (((bounds.bottom() - viewport.y) * sy).ceil().max(0.0) as usize).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point2::new(
                    viewport.x + (x as f32 + 0.5) / sx,
                    viewport.y + (y as f32 + 0.5) / sy,
                );
                if shape.contains_point(center) {
                    self.write(x, y, color);
                }
            }
        }
    }

    /// Applies a separable box blur `passes` times.
    pub fn blur(&mut self, radius: usize, passes: u32) {
        if radius == 0 {
            return;
        }
        let mut scratch = vec![0.0; self.texels.len()];
        for _ in 0..passes {
            box_pass(self.texels, &mut scratch, self.width, self.height, self.channels, radius, true);
            box_pass(&scratch, self.texels, self.width, self.height, self.channels, radius, false);
        }
    }
}

fn box_pass(
    src: &[f32],
    dst: &mut [f32],
    width: usize,
    height: usize,
    channels: usize,
    radius: usize,
    horizontal: bool,
) {
    let window = (2 * radius + 1) as f32;
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0;
                for k in 0..=2 * radius {
                    let offset = k as isize - radius as isize;
                    let (sx, sy) = if horizontal {
                        ((x as isize + offset).clamp(0, width as isize - 1) as usize, y)
                    } else {
                        (x, (y as isize + offset).clamp(0, height as isize - 1) as usize)
                    };
                    sum += src[(sy * width + sx) * channels + c];
                }
                dst[(y * width + x) * channels + c] = sum / window;
            }
        }
    }
}

/// Rejects commands the rasterizer cannot draw, before anything is written.
pub(crate) fn validate(command: &DrawCommand) -> Result<(), ResourceError> {
    let DrawCommand::Fill { shape, color } = command;
    let finite = |p: &Point2| p.x.is_finite() && p.y.is_finite();
    let color_ok = color.to_array().iter().all(|v| v.is_finite());
    let shape_ok = match shape {
        Shape::Rect(r) => {
            [r.x, r.y, r.width, r.height].iter().all(|v| v.is_finite())
                && r.width >= 0.0
                && r.height >= 0.0
        }
        Shape::Circle { center, radius } => finite(center) && radius.is_finite() && *radius >= 0.0,
        Shape::Polygon(points) => points.len() >= 3 && points.iter().all(finite),
    };
    if shape_ok && color_ok {
        Ok(())
    } else {
        Err(ResourceError::Rasterization(format!(
            "degenerate shape {shape:?}"
        )))
    }
}

/// The texel radius of a blur filter on a target with `texels_per_pixel` density.
pub(crate) fn blur_radius(filter: &Filter, texels_per_pixel: f32) -> (usize, u32) {
    match *filter {
        Filter::Blur {
            radius,
            passes,
            resolution,
        } => {
            let texels = (radius * resolution * texels_per_pixel).round();
            (texels.max(0.0) as usize, passes)
        }
    }
}
