//! 体积数据、体素分辨率和距离场.

mod field;
mod io;
mod spacing;
mod volume;

pub use field::DistanceField;
pub use spacing::VoxelSpacing;
pub use volume::{GrayVolume, VolumeSource};
