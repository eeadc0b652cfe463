#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 三维精确欧氏距离变换 (EDT).
//!
//! 对一个 8-bit 灰度体积, 按阈值把每个体素分为前景或背景,
//! 再对每个前景体素求它到最近背景体素的欧氏距离 (以物理单位计, 允许各向异性分辨率).
//! 背景体素的距离恒为 0.
//!
//! 算法为 Saito-Toriwaki 的三遍可分离扫描, 每一遍都在多个工作线程上并行执行,
//! 相邻两遍之间有完整的同步屏障.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 用法
//!
//! ```
//! use edt_berry::{transform, EdtParams, GrayVolume, VoxelSpacing};
//!
//! let mut volume = GrayVolume::filled((1, 5, 5), 255);
//! volume[(0, 2, 2)] = 0;
//!
//! let params = EdtParams::default().with_spacing(VoxelSpacing::unit());
//! let field = transform(&volume, &params).unwrap();
//! assert_eq!(field.distance(2, 2, 0), 0.0);
//! assert!((field.max_distance() - 8.0f32.sqrt()).abs() < 1e-6);
//! ```
//!
//! # 注意
//!
//! 1. 体积数据内部以 `(z, h, w)` 布局存储; 对外的 `distance(x, y, z)` 按 `(w, h, z)` 取值.
//! 2. 不存在背景体素的体积会在分配任何缓冲区之前被拒绝 ([`EdtError::NoBackground`]).
//! 3. 工作线程 panic 不会传播到调用方, 而是以 [`EdtError::WorkerPanicked`] 返回.
//!
//! # 开发计划
//!
//! ### 三遍可分离扫描 ✅
//!
//! 实现位于 `edt-berry/src/edt/scan.rs`.
//!
//! ### 抛物线下包络 O(n) 求解 ✅
//!
//! 实现位于 `edt-berry/src/edt/envelope.rs`.
//!
//! ### 轮转 / rayon 两种调度 ✅
//!
//! 实现位于 `edt-berry/src/edt/schedule.rs`.
//!
//! ### nifti 读取 & npy 写出 ✅
//!
//! 实现位于 `edt-berry/src/data/io.rs`.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 体积数据, 体素分辨率和距离场.
mod data;

pub use data::{DistanceField, GrayVolume, VolumeSource, VoxelSpacing};

pub mod classify;
pub mod consts;

pub use classify::Classifier;

pub mod edt;

pub use edt::{available_workers, transform, Edt, LineMinimizer, Pass, Schedule};

mod error;

pub use error::{EdtError, EdtResult};

mod params;

pub use params::EdtParams;

pub mod prelude;
