use std::ops::{Index, IndexMut};

use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut3, Axis};

use crate::error::{EdtError, EdtResult};
use crate::Idx3d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 距离变换的输入: 由 `depth` 个 `width × height` 的 8-bit 切片组成的只读体积数据.
///
/// 坐标按照 `(x, y, z)` 给出, 其中 `x < width`, `y < height`, `z < depth`.
/// 变换期间数据会被多个线程同时读取, 因此实现者应保证 `sample` 无副作用.
pub trait VolumeSource {
    /// 切片宽度 (x 方向体素个数).
    fn width(&self) -> usize;

    /// 切片高度 (y 方向体素个数).
    fn height(&self) -> usize;

    /// 切片个数 (z 方向体素个数).
    fn depth(&self) -> usize;

    /// 获取 `(x, y, z)` 处的体素值. 越界时 panic.
    fn sample(&self, x: usize, y: usize, z: usize) -> u8;

    /// 形状, 按照 `(z, h, w)` 给出.
    #[inline]
    fn shape(&self) -> Idx3d {
        (self.depth(), self.height(), self.width())
    }

    /// 体素个数.
    #[inline]
    fn size(&self) -> usize {
        self.depth() * self.height() * self.width()
    }

    /// 是否存在为 0 的维度?
    #[inline]
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// `(z, h, w)` 布局的视图直接作为输入.
impl VolumeSource for ArrayView3<'_, u8> {
    #[inline]
    fn width(&self) -> usize {
        self.len_of(Axis(2))
    }

    #[inline]
    fn height(&self) -> usize {
        self.len_of(Axis(1))
    }

    #[inline]
    fn depth(&self) -> usize {
        self.len_of(Axis(0))
    }

    #[inline]
    fn sample(&self, x: usize, y: usize, z: usize) -> u8 {
        self[(z, y, x)]
    }
}

/// `(z, h, w)` 布局的数组直接作为输入.
impl VolumeSource for Array3<u8> {
    #[inline]
    fn width(&self) -> usize {
        self.len_of(Axis(2))
    }

    #[inline]
    fn height(&self) -> usize {
        self.len_of(Axis(1))
    }

    #[inline]
    fn depth(&self) -> usize {
        self.len_of(Axis(0))
    }

    #[inline]
    fn sample(&self, x: usize, y: usize, z: usize) -> u8 {
        self[(z, y, x)]
    }
}

/// 拥有所有权的 8-bit 灰度体积数据.
///
/// 底层按 `(z, h, w)` 组织, 即第一维为切片, 第二维向下增长, 第三维向右增长.
/// 通过 [`Index`] 访问时也使用该顺序; 通过 [`VolumeSource::sample`] 访问时使用 `(x, y, z)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GrayVolume {
    data: Array3<u8>,
}

impl GrayVolume {
    /// 由 `(z, h, w)` 布局的数组直接创建.
    #[inline]
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// 创建形状为 `(z, h, w)`, 所有体素均为 `value` 的体积数据.
    #[inline]
    pub fn filled(shape: Idx3d, value: u8) -> Self {
        Self::new(Array3::from_elem(shape, value))
    }

    /// 由 `slices.len()` 个行优先存储的 `width × height` 切片创建体积数据.
    ///
    /// 如果某个切片的像素数不等于 `width * height`, 返回 `Err(EdtError::SliceSize)`.
    pub fn from_slices<S: AsRef<[u8]>>(
        width: usize,
        height: usize,
        slices: &[S],
    ) -> EdtResult<Self> {
        let expected = width * height;
        let mut buf = Vec::with_capacity(expected * slices.len());
        for (index, sli) in slices.iter().map(AsRef::as_ref).enumerate() {
            if sli.len() != expected {
                return Err(EdtError::SliceSize {
                    index,
                    expected,
                    found: sli.len(),
                });
            }
            buf.extend_from_slice(sli);
        }

        // 长度已检查过, 该操作不会生成 `Err`, 可直接 unwrap.
        let data = Array3::from_shape_vec((slices.len(), height, width), buf).unwrap();
        Ok(Self::new(data))
    }

    /// 获取第 `z_index` 层切片视图. 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, u8> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获取能按升序迭代所有切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ArrayView2<'_, u8>> {
        self.data.axis_iter(Axis(0))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.data.view_mut()
    }

    /// 消费自我, 获得底层数组.
    #[inline]
    pub fn into_inner(self) -> Array3<u8> {
        self.data
    }
}

impl VolumeSource for GrayVolume {
    #[inline]
    fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    #[inline]
    fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    #[inline]
    fn depth(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    #[inline]
    fn sample(&self, x: usize, y: usize, z: usize) -> u8 {
        self.data[(z, y, x)]
    }
}

impl Index<Idx3d> for GrayVolume {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx3d> for GrayVolume {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}
