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

//! Defines data structures related to GPU texture resources.

use crate::math::{Extent2D, LinearRgba, Rect};
use std::borrow::Cow;

/// The channel layout of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// A single red channel. Used for scalar masks (occlusion, depth).
    Red,
    /// Red and green channels.
    Rg,
    /// Red, green and blue channels.
    Rgb,
    /// Red, green, blue and alpha channels.
    Rgba,
}

impl TextureFormat {
    /// Returns the number of channels stored per texel.
    pub const fn channel_count(&self) -> usize {
        match self {
            TextureFormat::Red => 1,
            TextureFormat::Rg => 2,
            TextureFormat::Rgb => 3,
            TextureFormat::Rgba => 4,
        }
    }
}

/// The scalar type of each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDataType {
    /// 8-bit normalized unsigned integer (`0..=255` mapped to `0.0..=1.0`).
    UnsignedByte,
    /// 32-bit float.
    Float,
}

impl TextureDataType {
    /// Returns the byte size of one channel.
    pub const fn bytes_per_channel(&self) -> usize {
        match self {
            TextureDataType::UnsignedByte => 1,
            TextureDataType::Float => 4,
        }
    }
}

/// A descriptor used to create a [`TextureId`].
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The dimensions of the texture in texels.
    pub size: Extent2D,
    /// The channel layout.
    pub format: TextureFormat,
    /// The scalar type of each channel.
    pub data_type: TextureDataType,
}

impl TextureDescriptor<'_> {
    /// Returns the number of bytes a texture with this descriptor occupies.
    pub fn byte_size(&self) -> usize {
        self.size.area() * self.format.channel_count() * self.data_type.bytes_per_channel()
    }
}

/// A texture plus the region of scene space it covers.
///
/// Stages are described in scene pixel coordinates; the viewport maps that
/// space onto the full extent of the target texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    /// The texture that receives the rendered content.
    pub texture: TextureId,
    /// The scene-space rectangle mapped onto the texture.
    pub viewport: Rect,
}

/// A CPU-side copy of a texture's texels, as returned by a read-back.
#[derive(Debug, Clone)]
pub struct CpuTexture {
    /// The raw texel data, tightly packed row by row.
    pub pixels: Vec<u8>,
    /// The size of the texture.
    pub size: Extent2D,
    /// The channel layout of the texel data.
    pub format: TextureFormat,
    /// The scalar type of each channel.
    pub data_type: TextureDataType,
}

impl CpuTexture {
    /// Gets the row size in bytes.
    pub fn row_size(&self) -> usize {
        self.size.width as usize * self.format.channel_count() * self.data_type.bytes_per_channel()
    }

    /// Decodes the texel at `(x, y)` into a linear color.
    ///
    /// Missing channels read as `0.0`, except alpha which reads as `1.0`.
    /// Returns `None` when the coordinate is out of bounds.
    pub fn texel(&self, x: u32, y: u32) -> Option<LinearRgba> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let channels = self.format.channel_count();
        let bpc = self.data_type.bytes_per_channel();
        let start = y as usize * self.row_size() + x as usize * channels * bpc;
        let mut out = [0.0, 0.0, 0.0, 1.0];
        for (c, slot) in out.iter_mut().enumerate().take(channels) {
            let offset = start + c * bpc;
            *slot = match self.data_type {
                TextureDataType::UnsignedByte => self.pixels[offset] as f32 / 255.0,
                TextureDataType::Float => {
                    let bytes = [
                        self.pixels[offset],
                        self.pixels[offset + 1],
                        self.pixels[offset + 2],
                        self.pixels[offset + 3],
                    ];
                    f32::from_le_bytes(bytes)
                }
            };
        }
        Some(LinearRgba::from_array(out))
    }
}

/// An opaque handle to a GPU texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_byte_size() {
        let desc = TextureDescriptor {
            label: None,
            size: Extent2D::new(4, 2),
            format: TextureFormat::Rgb,
            data_type: TextureDataType::Float,
        };
        assert_eq!(desc.byte_size(), 4 * 2 * 3 * 4);
    }

    #[test]
    fn texel_decodes_single_channel_bytes() {
        let tex = CpuTexture {
            pixels: vec![0, 255, 51, 102],
            size: Extent2D::new(2, 2),
            format: TextureFormat::Red,
            data_type: TextureDataType::UnsignedByte,
        };
        assert_eq!(tex.texel(1, 0).map(|c| c.r), Some(1.0));
        assert_eq!(tex.texel(0, 1).map(|c| c.r), Some(0.2));
        assert_eq!(tex.texel(0, 0).map(|c| c.a), Some(1.0));
        assert!(tex.texel(2, 0).is_none());
    }

    #[test]
    fn texel_decodes_float_channels() {
        let mut pixels = Vec::new();
        for v in [0.25f32, 0.5] {
            pixels.extend_from_slice(&v.to_le_bytes());
        }
        let tex = CpuTexture {
            pixels,
            size: Extent2D::new(1, 1),
            format: TextureFormat::Rg,
            data_type: TextureDataType::Float,
        };
        let c = tex.texel(0, 0).unwrap();
        assert_eq!((c.r, c.g, c.b), (0.25, 0.5, 0.0));
    }
}
