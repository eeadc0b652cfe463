use std::ops::Index;

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

use crate::Idx3d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 距离变换的结果: 与输入同形状的 `f32` 距离场, 以及最大距离.
///
/// 背景体素的距离恰好为 `0.0`; 前景体素的距离为到最近背景体素中心的欧氏距离,
/// 单位与 [`crate::VoxelSpacing`] 一致. 底层按 `(z, h, w)` 组织.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceField {
    data: Array3<f32>,
    max: f32,
}

impl DistanceField {
    #[inline]
    pub(crate) fn new(data: Array3<f32>, max: f32) -> Self {
        Self { data, max }
    }

    /// 获取 `(x, y, z)` 处的距离. 越界时 panic.
    #[inline]
    pub fn distance(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[(z, y, x)]
    }

    /// 获取 `(z, h, w)` 处的距离. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx3d) -> Option<f32> {
        self.data.get(pos).copied()
    }

    /// 全体素最大距离, 可作为显示/归一化的上界. 若不存在前景则为 `0.0`.
    #[inline]
    pub fn max_distance(&self) -> f32 {
        self.max
    }

    /// 切片宽度.
    #[inline]
    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// 切片高度.
    #[inline]
    pub fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// 切片个数.
    #[inline]
    pub fn depth(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// 形状, 按照 `(z, h, w)` 给出.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        (self.depth(), self.height(), self.width())
    }

    /// 获取第 `z_index` 层距离切片视图. 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获取能按升序迭代所有距离切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, f32>> {
        self.data.axis_iter(Axis(0))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 消费自我, 获得底层数组.
    #[inline]
    pub fn into_inner(self) -> Array3<f32> {
        self.data
    }
}

impl Index<Idx3d> for DistanceField {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}
