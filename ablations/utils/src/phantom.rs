//! 合成体积 (phantom). 前景为白色, 背景为黑色.

use edt_berry::consts::gray::{BLACK, WHITE};
use edt_berry::{GrayVolume, Idx3d};
use ndarray::Array3;

/// 中心为前景球体, 其余为背景. `radius` 以体素为单位.
pub fn ball(size: usize, radius: f64) -> GrayVolume {
    let c = (size as f64 - 1.0) / 2.0;
    let r2 = radius * radius;
    from_fn((size, size, size), |(z, y, x)| {
        let (dz, dy, dx) = (z as f64 - c, y as f64 - c, x as f64 - c);
        dz * dz + dy * dy + dx * dx <= r2
    })
}

/// 除最外一层体素以外全为前景.
pub fn hollow_box(size: usize) -> GrayVolume {
    let last = size.saturating_sub(1);
    from_fn((size, size, size), |(z, y, x)| {
        [z, y, x].iter().all(|&i| i != 0 && i != last)
    })
}

/// 仅在体积中心有一个背景体素, 其余均为前景.
///
/// 这是第二、三遍扫描中最坏的情况: 几乎所有线都需要完整求解.
pub fn single_seed(size: usize) -> GrayVolume {
    let c = size / 2;
    from_fn((size, size, size), |pos| pos != (c, c, c))
}

/// 随机前景/背景, 约 `1 / bg_rate` 的体素为背景. 对同一 `seed` 结果固定.
///
/// 保证 `(0, 0, 0)` 为背景.
pub fn noise(size: usize, bg_rate: u64, seed: u64) -> GrayVolume {
    let mut state = seed;
    let mut v = from_fn((size, size, size), |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) % bg_rate.max(1) != 0
    });
    if size > 0 {
        v[(0, 0, 0)] = BLACK;
    }
    v
}

/// 以 `(z, h, w)` 形状和前景谓词构建体积.
fn from_fn<F: FnMut(Idx3d) -> bool>(shape: Idx3d, mut foreground: F) -> GrayVolume {
    GrayVolume::new(Array3::from_shape_fn(shape, |pos| {
        if foreground(pos) {
            WHITE
        } else {
            BLACK
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edt_berry::VolumeSource;

    fn count_bg(v: &GrayVolume) -> usize {
        v.data().iter().filter(|s| **s == BLACK).count()
    }

    #[test]
    fn test_phantoms() {
        let b = ball(9, 3.0);
        assert_eq!(b.shape(), (9, 9, 9));
        assert_eq!(b[(4, 4, 4)], WHITE);
        assert_eq!(b[(0, 0, 0)], BLACK);

        assert_eq!(count_bg(&hollow_box(4)), 64 - 8);
        assert_eq!(count_bg(&single_seed(5)), 1);

        let n = noise(6, 4, 42);
        assert_eq!(n, noise(6, 4, 42));
        assert_eq!(n[(0, 0, 0)], BLACK);
    }
}
