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

//! The mask lane: named GPU masks rebuilt lazily from retained stages.
//!
//! A mask goes through a two-phase rebuild when it is read while dirty:
//! `updateStage` subscribers describe what to draw, then `updateTexture`
//! subscribers render it and drop the transient draw commands.

mod cache;
mod error;
mod mask;

pub use cache::MaskCache;
pub use error::{ListenerError, MaskError};
pub use mask::{MaskDescriptor, MaskFrame, MaskHandle, MaskListener, MaskStats};
