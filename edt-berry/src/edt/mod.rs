//! Saito-Toriwaki 三遍可分离欧氏距离变换.
//!
//! 1. 第一遍沿 x 方向逐行求最近背景的平方距离;
//! 2. 第二遍沿 y 方向逐列求 `min (g + Δy² · wy)`, 得到切片内的二维平方距离;
//! 3. 第三遍沿 z 方向逐线求 `min (h + Δz² · wz)`, 得到三维平方距离;
//! 4. 最后背景置 0, 前景开方, 并统计最大距离.
//!
//! 相邻两遍之间存在完整的同步屏障: 后一遍读取的是前一遍在 **整个** 体积上写入的结果.

pub mod envelope;
mod finish;
pub mod scan;
mod schedule;

use std::fmt;
use std::time::Instant;

use itertools::iproduct;
use log::{debug, info};
use ndarray::{Array3, ArrayViewMut2, Axis};
use ordered_float::OrderedFloat;

use crate::error::{EdtError, EdtResult};
use crate::{Classifier, DistanceField, EdtParams, VolumeSource, VoxelSpacing};

pub use schedule::{available_workers, Schedule};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 扫描阶段.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Pass {
    /// 第一遍, x 方向.
    First,

    /// 第二遍, y 方向.
    Second,

    /// 第三遍, z 方向.
    Third,

    /// 开方并统计最大值.
    Finish,
}

impl Pass {
    /// 简短标记, 用于线程命名.
    #[inline]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::First => "p1",
            Self::Second => "p2",
            Self::Third => "p3",
            Self::Finish => "fin",
        }
    }
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("pass 1 (x)"),
            Self::Second => f.write_str("pass 2 (y)"),
            Self::Third => f.write_str("pass 3 (z)"),
            Self::Finish => f.write_str("finish"),
        }
    }
}

/// 第二、三遍扫描中一维最小化的求解方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LineMinimizer {
    /// 直接 O(n²) 求解. 第三遍会限制在非 0 窗口内.
    #[default]
    Direct,

    /// 抛物线下包络, O(n).
    Envelope,
}

impl LineMinimizer {
    /// 第二遍: 对单列 `g` 求解, 结果写入 `out`.
    #[inline]
    pub fn column(&self, g: &[f32], wy: f64, out: &mut [f32]) {
        match self {
            Self::Direct => scan::scan_column(g, wy, out),
            Self::Envelope => envelope::lower_envelope(g, wy, out),
        }
    }

    /// 第三遍: 对单条 z 方向线求解, 只更新前景位置, 结果写入 `out`.
    #[inline]
    pub fn depth_line(&self, line: &[f32], foreground: &[bool], wz: f64, out: &mut [f32]) {
        match self {
            Self::Direct => scan::scan_depth_line(line, foreground, wz, out),
            Self::Envelope => envelope::envelope_depth_line(line, foreground, wz, out),
        }
    }
}

/// 距离变换引擎.
///
/// 由已验证的 [`EdtParams`] 构建, 可以对多个体积重复运行.
#[derive(Clone, Debug)]
pub struct Edt {
    classifier: Classifier,
    spacing: VoxelSpacing,
    schedule: Schedule,
    minimizer: LineMinimizer,
}

impl Edt {
    /// 验证参数并构建引擎. 参数非法时返回对应的 `Err`.
    pub fn new(params: &EdtParams) -> EdtResult<Self> {
        let classifier = params.validate()?;
        Ok(Self {
            classifier,
            spacing: params.spacing(),
            schedule: params.schedule(),
            minimizer: params.minimizer(),
        })
    }

    /// 本引擎使用的分类器.
    #[inline]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// 对 `volume` 运行距离变换.
    ///
    /// # 返回值
    ///
    /// - 体积为空时返回 `Err(EdtError::EmptyVolume)`;
    /// - 最大平方距离超出 `f32` 范围时返回 `Err(EdtError::DistanceOverflow)`;
    /// - 不存在背景体素时返回 `Err(EdtError::NoBackground)`;
    /// - 任一遍扫描中工作线程失败时返回对应的 `Err`;
    /// - 否则返回距离场.
    ///
    /// 前三种错误在分配距离缓冲区之前检出.
    pub fn run<V>(&self, volume: &V) -> EdtResult<DistanceField>
    where
        V: VolumeSource + Sync + ?Sized,
    {
        let shape = volume.shape();
        if volume.is_empty() {
            return Err(EdtError::EmptyVolume(shape));
        }
        if !(self.spacing.max_squared_distance(shape) as f32).is_finite() {
            return Err(EdtError::DistanceOverflow(shape));
        }
        if !self.has_background(volume) {
            return Err(EdtError::NoBackground);
        }
        info!(
            "EDT on {shape:?} (z, h, w), spacing {:?}, {:?}, {:?}",
            self.spacing, self.schedule, self.minimizer
        );

        let [wx, wy, wz] = self.spacing.weights();
        let cls = &self.classifier;
        let minimizer = self.minimizer;

        // 三遍扫描共用该缓冲区.
        let mut field = Array3::<f32>::zeros(shape);

        self.timed(Pass::First, slices(&mut field), |z, slice| {
            scan::first_pass_slice(volume, z, cls, wx, slice)
        })?;
        self.timed(Pass::Second, slices(&mut field), |_, slice| {
            scan::second_pass_slice(wy, minimizer, slice)
        })?;
        self.timed(Pass::Third, lanes(&mut field), |y, lane| {
            scan::third_pass_lane(volume, y, cls, wz, minimizer, lane)
        })?;
        let maxima = self.timed(Pass::Finish, slices(&mut field), |z, slice| {
            finish::finish_slice(volume, z, cls, slice)
        })?;

        let max = maxima
            .into_iter()
            .map(OrderedFloat)
            .max()
            .map_or(0.0, |m| m.0);
        debug!("max distance {max}");
        Ok(DistanceField::new(field, max))
    }

    /// 是否存在至少一个背景体素?
    fn has_background<V: VolumeSource + ?Sized>(&self, volume: &V) -> bool {
        let (d, h, w) = volume.shape();
        iproduct!(0..d, 0..h, 0..w)
            .any(|(z, y, x)| self.classifier.is_background(volume.sample(x, y, z)))
    }

    /// 调度一遍扫描并记录耗时.
    fn timed<T, R, F>(&self, pass: Pass, units: Vec<(usize, T)>, op: F) -> EdtResult<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(usize, T) -> R + Sync,
    {
        let since = Instant::now();
        let ans = self.schedule.run(pass, units, op)?;
        debug!("{pass} done in {:?}", since.elapsed());
        Ok(ans)
    }
}

/// 按 z 拆分: 每个单元为一层 `(h, w)` 切片.
#[inline]
fn slices(field: &mut Array3<f32>) -> Vec<(usize, ArrayViewMut2<'_, f32>)> {
    field.axis_iter_mut(Axis(0)).enumerate().collect()
}

/// 按 y 拆分: 每个单元为一个 `(z, w)` 的 xz 平面.
#[inline]
fn lanes(field: &mut Array3<f32>) -> Vec<(usize, ArrayViewMut2<'_, f32>)> {
    field.axis_iter_mut(Axis(1)).enumerate().collect()
}

/// 以参数 `params` 对 `volume` 运行一次距离变换.
///
/// 等价于 `Edt::new(params)?.run(volume)`.
pub fn transform<V>(volume: &V, params: &EdtParams) -> EdtResult<DistanceField>
where
    V: VolumeSource + Sync + ?Sized,
{
    Edt::new(params)?.run(volume)
}
