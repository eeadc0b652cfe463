//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::{DistanceField, GrayVolume, VolumeSource, VoxelSpacing};

pub use crate::{transform, Edt, EdtParams, LineMinimizer, Schedule};

pub use crate::{EdtError, EdtResult};

pub use crate::consts::gray::{BLACK, GRAY, WHITE};
pub use crate::consts::{ElemType, DEFAULT_THRESHOLD};
pub use crate::Classifier;
