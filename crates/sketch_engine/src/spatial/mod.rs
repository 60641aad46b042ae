//! Spatial partitioning data structures
//!
//! Provides the region tree the Scene rebuilds every frame from object
//! positions, answering "which objects lie inside this rectangle".

mod rtree;

pub use rtree::{RegionEntry, RegionNode, RegionTree};
