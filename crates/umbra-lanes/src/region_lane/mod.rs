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

//! The region lane: the live set of lighting regions and the perception
//! state aggregated over them.

mod aggregator;
mod delta;
mod error;
mod region;

pub use aggregator::RegionAggregator;
pub use delta::{aggregate_flags, AggregateFlags, PerceptionDelta};
pub use error::RegionError;
pub use region::{
    Region, RegionActivity, RegionChanges, RegionId, RegionShape, RegionSource, SourceId,
    SourceKind, SourceOwner,
};
