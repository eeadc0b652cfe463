use crate::error::{EdtError, EdtResult};
use crate::Idx3d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单个体素在三个方向上的物理尺寸 (一般以毫米为单位).
///
/// `x` 为切片宽度方向, `y` 为切片高度方向, `z` 为相邻切片方向.
/// 三个值都必须是正的有限实数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VoxelSpacing {
    x: f64,
    y: f64,
    z: f64,
}

impl VoxelSpacing {
    /// 构建体素分辨率. 如果存在非正数或非有限值, 返回 `Err(EdtError::InvalidSpacing)`.
    pub fn new(x: f64, y: f64, z: f64) -> EdtResult<Self> {
        let ans = Self { x, y, z };
        ans.validate()?;
        Ok(ans)
    }

    /// 三个方向尺寸均为 `s` 的各向同性分辨率.
    #[inline]
    pub fn isotropic(s: f64) -> EdtResult<Self> {
        Self::new(s, s, s)
    }

    /// 单位各向同性分辨率.
    #[inline]
    pub const fn unit() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }

    /// 检查三个分量的合法性.
    ///
    /// 每个分量必须是正的有限实数, 且其平方转换为 `f32` 后仍是正规数.
    /// 反序列化得到的值不经过 [`Self::new`], 因此运行前会再调用一次本方法.
    pub fn validate(&self) -> EdtResult<()> {
        for (axis, value) in [('x', self.x), ('y', self.y), ('z', self.z)] {
            if !(value.is_finite() && value > 0.0 && ((value * value) as f32).is_normal()) {
                return Err(EdtError::InvalidSpacing { axis, value });
            }
        }
        Ok(())
    }

    /// width 方向 (x) 的体素尺寸.
    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// height 方向 (y) 的体素尺寸.
    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// 切片方向 (z) 的体素尺寸.
    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// 三个方向的平方权重 `[x², y², z²]`. 距离变换只需要这三个值.
    #[inline]
    pub fn weights(&self) -> [f64; 3] {
        [self.x * self.x, self.y * self.y, self.z * self.z]
    }

    /// 形状为 `(z, h, w)` 的体积中可能出现的最大平方距离 (对角线长度的平方).
    pub fn max_squared_distance(&self, (d, h, w): Idx3d) -> f64 {
        [(w, self.x), (h, self.y), (d, self.z)]
            .into_iter()
            .map(|(n, s)| n.saturating_sub(1) as f64 * s)
            .map(|l| l * l)
            .sum()
    }

    /// 分辨率在三个方向上是否各向同性?
    #[inline]
    pub fn is_isotropic(&self) -> bool {
        self.x == self.y && self.y == self.z
    }

    /// 体素体积.
    #[inline]
    pub fn voxel(&self) -> f64 {
        self.x * self.y * self.z
    }
}

impl Default for VoxelSpacing {
    #[inline]
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::VoxelSpacing;
    use crate::EdtError;

    #[test]
    fn test_spacing_invalid_input() {
        for (x, y, z) in [
            (0.0, 1.0, 1.0),
            (1.0, -1.0, 1.0),
            (1.0, 1.0, f64::NAN),
            (f64::INFINITY, 1.0, 1.0),
        ] {
            assert!(matches!(
                VoxelSpacing::new(x, y, z),
                Err(EdtError::InvalidSpacing { .. })
            ));
        }

        let err = VoxelSpacing::new(1.0, 1.0, 0.0).unwrap_err();
        assert!(matches!(err, EdtError::InvalidSpacing { axis: 'z', .. }));
    }

    /// 平方后在 `f32` 中上溢或下溢的分辨率被拒绝.
    #[test]
    fn test_spacing_squared_range() {
        for value in [1e20, 1e-25, 1e-20, f64::MAX.sqrt()] {
            assert!(matches!(
                VoxelSpacing::new(1.0, value, 1.0),
                Err(EdtError::InvalidSpacing { axis: 'y', .. })
            ));
        }
        assert!(VoxelSpacing::isotropic(1e18).is_ok());
        assert!(VoxelSpacing::isotropic(1e-18).is_ok());
    }

    #[test]
    fn test_max_squared_distance() {
        let s = VoxelSpacing::new(0.5, 2.0, 3.0).unwrap();
        // (3 * 0.5)² + (1 * 2)² + (4 * 3)²
        assert_eq!(s.max_squared_distance((5, 2, 4)), 2.25 + 4.0 + 144.0);
        assert_eq!(s.max_squared_distance((1, 1, 1)), 0.0);
        assert_eq!(s.max_squared_distance((0, 0, 0)), 0.0);
    }

    #[test]
    fn test_spacing_weights() {
        let s = VoxelSpacing::new(0.5, 2.0, 3.0).unwrap();
        assert_eq!(s.weights(), [0.25, 4.0, 9.0]);
        assert!(!s.is_isotropic());
        assert!(VoxelSpacing::default().is_isotropic());
        assert_eq!(VoxelSpacing::isotropic(2.0).unwrap().voxel(), 8.0);
    }
}
