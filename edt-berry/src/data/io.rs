//! 体积数据的读取与距离场的保存.

use std::path::Path;

use ndarray::Ix3;
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use super::{DistanceField, GrayVolume, VoxelSpacing};
use crate::error::{EdtError, EdtResult};

impl GrayVolume {
    /// 打开 nii 文件格式的三维 8-bit 体积数据, 同时从 header 中读取体素分辨率.
    ///
    /// 非 `u8` 类型的数据会按照 nifti 的规则转换为 `u8`.
    ///
    /// # 返回值
    ///
    /// - 读取失败时返回 `Err(EdtError::Nifti)`;
    /// - 数据不是三维时返回 `Err(EdtError::UnsupportedShape)`;
    /// - header 中的 `pixdim` 非法时返回 `Err(EdtError::InvalidSpacing)`;
    /// - 否则返回体积数据和体素分辨率.
    pub fn open<P: AsRef<Path>>(path: P) -> EdtResult<(Self, VoxelSpacing)> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;

        // [_, W, H, z, ..]
        let [_, sx, sy, sz, ..] = obj.header().pixdim;
        let spacing = VoxelSpacing::new(sx as f64, sy as f64, sz as f64)?;

        let data = obj.into_volume().into_ndarray::<u8>()?;
        let shape = data.shape().to_vec();
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| EdtError::UnsupportedShape(shape))?;

        // [W, H, z] -> [z, H, W].
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());

        Ok((Self::new(data), spacing))
    }
}

impl DistanceField {
    /// 将距离场按 `(z, h, w)` 布局写入 `path` 处的 `.npy` 文件.
    pub fn write_npy<P: AsRef<Path>>(&self, path: P) -> EdtResult<()> {
        ndarray_npy::write_npy(path, &self.data())?;
        Ok(())
    }
}
