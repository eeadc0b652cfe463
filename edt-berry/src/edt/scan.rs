//! 单条线上的平方距离计算.
//!
//! 三遍扫描分别沿 x, y, z 方向进行. 每个函数只处理一条一维的线, 线与线之间相互独立,
//! 因此可以在 [`super::schedule`] 中任意分配给工作线程.
//!
//! 中间结果均为 **平方** 距离, 且已乘上对应方向的平方权重 (`w = s²`).
//! `f32::INFINITY` 表示 "该方向上未找到背景", 在后续最小化中自然被吸收.

use ndarray::{ArrayView1, ArrayViewMut1, ArrayViewMut2, Axis};

use super::LineMinimizer;
use crate::{Classifier, VolumeSource};

/// 计算 `g + delta² · w`. 在 `f64` 中计算, 再转换为 `f32`.
#[inline]
pub(crate) fn parabola(g: f32, delta: usize, w: f64) -> f32 {
    let d = delta as f64;
    (g as f64 + d * d * w) as f32
}

/// 求 `min_i (seg[i] + (at - (offset + i))² · w)`.
///
/// `seg` 为原始线上从 `offset` 开始的一段. 若 `seg` 为空, 返回 `f32::INFINITY`.
#[inline]
fn min_parabola(seg: &[f32], offset: usize, at: usize, w: f64) -> f32 {
    seg.iter()
        .enumerate()
        .map(|(i, &g)| parabola(g, at.abs_diff(offset + i), w))
        .fold(f32::INFINITY, f32::min)
}

/// 该线是否全为 0?
///
/// 第二遍和第三遍扫描之后, 值为 0 当且仅当对应体素是背景, 因此全 0 的线无需再处理.
#[inline]
pub fn is_zero_line(line: &[f32]) -> bool {
    line.iter().all(|&v| v == 0.0)
}

/// 第一遍扫描 (x 方向, 单行).
///
/// `background` 为该行每个体素是否为背景. 对每个位置向两侧寻找最近的背景,
/// 取较小的平方偏移乘以 `wx` 写入 `out`. 背景体素自身偏移为 0.
/// 若整行都没有背景, 则整行写入 `f32::INFINITY`.
///
/// 当 `background` 与 `out` 长度不同时 panic.
pub fn scan_row(background: &[bool], wx: f64, out: &mut [f32]) {
    assert_eq!(background.len(), out.len(), "行长度不一致");

    for (x1, o) in out.iter_mut().enumerate() {
        // 包含自身.
        let after = background[x1..].iter().position(|&b| b);
        let before = background[..x1].iter().rposition(|&b| b).map(|x2| x1 - x2);
        *o = match after.into_iter().chain(before).min() {
            Some(delta) => parabola(0.0, delta, wx),
            None => f32::INFINITY,
        };
    }
}

/// 第二遍扫描 (y 方向, 单列), 直接 O(n²) 求解.
///
/// 对每个 `y1` 计算 `h[y1] = min_y2 (g[y2] + (y1 - y2)² · wy)`.
///
/// 当 `g` 与 `h` 长度不同时 panic.
pub fn scan_column(g: &[f32], wy: f64, h: &mut [f32]) {
    assert_eq!(g.len(), h.len(), "列长度不一致");

    for (y1, h1) in h.iter_mut().enumerate() {
        *h1 = min_parabola(g, 0, y1, wy);
    }
}

/// 第三遍扫描的有效窗口 `[z_start, z_stop]`.
///
/// `z_start` 为第一个非 0 位置, 若不在边界则再向前扩展一格;
/// `z_stop` 为最后一个非 0 位置, 若不在边界则再向后扩展一格.
/// 窗口之外只有 0 值, 而离窗口内任意点最近的 0 值已被扩展的那一格覆盖.
///
/// 若整条线全为 0, 返回 `None`.
pub fn depth_window(line: &[f32]) -> Option<(usize, usize)> {
    let first = line.iter().position(|&v| v != 0.0)?;
    let last = line.iter().rposition(|&v| v != 0.0)?;
    Some((first.saturating_sub(1), (last + 1).min(line.len() - 1)))
}

/// 第三遍扫描 (z 方向, 单条 `(x, y)` 线), 在 [`depth_window`] 限定的范围内直接求解.
///
/// 只有 `foreground` 为 `true` 的位置被重新计算:
/// `out[z1] = min_{z2 ∈ [min(z_start, z1), max(z_stop, z1)]} (line[z2] + (z1 - z2)² · wz)`.
/// 其它位置保持 `line` 的原值.
///
/// 当三者长度不同时 panic.
pub fn scan_depth_line(line: &[f32], foreground: &[bool], wz: f64, out: &mut [f32]) {
    assert_eq!(line.len(), foreground.len(), "线长度不一致");
    out.copy_from_slice(line);

    let Some((z_start, z_stop)) = depth_window(line) else {
        return;
    };
    for z1 in foreground
        .iter()
        .enumerate()
        .filter_map(|(z, &f)| f.then_some(z))
    {
        let (lo, hi) = (z_start.min(z1), z_stop.max(z1));
        out[z1] = min_parabola(&line[lo..=hi], lo, z1, wz);
    }
}

/// 与 [`scan_depth_line`] 相同, 但对整条线求最小值, 不做窗口限制.
pub fn scan_depth_line_full(line: &[f32], foreground: &[bool], wz: f64, out: &mut [f32]) {
    assert_eq!(line.len(), foreground.len(), "线长度不一致");
    out.copy_from_slice(line);

    for z1 in foreground
        .iter()
        .enumerate()
        .filter_map(|(z, &f)| f.then_some(z))
    {
        out[z1] = min_parabola(line, 0, z1, wz);
    }
}

/// 将一维视图拷贝到缓冲区.
#[inline]
fn load(buf: &mut [f32], src: ArrayView1<'_, f32>) {
    buf.iter_mut().zip(src.iter()).for_each(|(d, s)| *d = *s);
}

/// 将缓冲区写回一维视图.
#[inline]
fn store(mut dst: ArrayViewMut1<'_, f32>, buf: &[f32]) {
    dst.iter_mut().zip(buf.iter()).for_each(|(d, s)| *d = *s);
}

/// 第一遍扫描: 处理第 `z` 层切片 `slice` (`(h, w)` 布局) 的所有行.
pub(crate) fn first_pass_slice<V: VolumeSource + ?Sized>(
    volume: &V,
    z: usize,
    classifier: &Classifier,
    wx: f64,
    mut slice: ArrayViewMut2<'_, f32>,
) {
    let w = slice.len_of(Axis(1));
    let mut background = vec![false; w];
    let mut buf = vec![0.0f32; w];

    for (y, row) in slice.outer_iter_mut().enumerate() {
        for (x, b) in background.iter_mut().enumerate() {
            *b = classifier.is_background(volume.sample(x, y, z));
        }
        scan_row(&background, wx, &mut buf);
        store(row, &buf);
    }
}

/// 第二遍扫描: 处理一层切片 `slice` (`(h, w)` 布局) 的所有列.
pub(crate) fn second_pass_slice(
    wy: f64,
    minimizer: LineMinimizer,
    mut slice: ArrayViewMut2<'_, f32>,
) {
    let h = slice.len_of(Axis(0));
    let mut g = vec![0.0f32; h];
    let mut out = vec![0.0f32; h];

    for col in slice.axis_iter_mut(Axis(1)) {
        load(&mut g, col.view());
        if is_zero_line(&g) {
            continue;
        }
        minimizer.column(&g, wy, &mut out);
        store(col, &out);
    }
}

/// 第三遍扫描: 处理第 `y` 行对应的 xz 平面 `lane` (`(z, w)` 布局) 的所有 z 方向线.
pub(crate) fn third_pass_lane<V: VolumeSource + ?Sized>(
    volume: &V,
    y: usize,
    classifier: &Classifier,
    wz: f64,
    minimizer: LineMinimizer,
    mut lane: ArrayViewMut2<'_, f32>,
) {
    let d = lane.len_of(Axis(0));
    let mut line = vec![0.0f32; d];
    let mut foreground = vec![false; d];
    let mut out = vec![0.0f32; d];

    for (x, col) in lane.axis_iter_mut(Axis(1)).enumerate() {
        load(&mut line, col.view());
        if is_zero_line(&line) {
            continue;
        }
        for (z, f) in foreground.iter_mut().enumerate() {
            *f = classifier.is_foreground(volume.sample(x, y, z));
        }
        minimizer.depth_line(&line, &foreground, wz, &mut out);
        store(col, &out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 简单的线性同余伪随机数. 保证测试可复现.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }
    }

    #[test]
    fn test_scan_row_basic() {
        let bg = [false, false, true, false, false, false, true];
        let mut out = [0.0f32; 7];
        scan_row(&bg, 1.0, &mut out);
        assert_eq!(out, [4.0, 1.0, 0.0, 1.0, 4.0, 1.0, 0.0]);

        scan_row(&bg, 0.25, &mut out);
        assert_eq!(out, [1.0, 0.25, 0.0, 0.25, 1.0, 0.25, 0.0]);
    }

    /// 只有一侧有背景时, 仅由该侧决定.
    #[test]
    fn test_scan_row_one_side() {
        let bg = [true, false, false, false];
        let mut out = [0.0f32; 4];
        scan_row(&bg, 1.0, &mut out);
        assert_eq!(out, [0.0, 1.0, 4.0, 9.0]);

        let bg = [false, false, true];
        let mut out = [0.0f32; 3];
        scan_row(&bg, 2.0, &mut out);
        assert_eq!(out, [8.0, 2.0, 0.0]);
    }

    #[test]
    fn test_scan_row_all_foreground() {
        let mut out = [0.0f32; 5];
        scan_row(&[false; 5], 1.0, &mut out);
        assert!(out.iter().all(|v| *v == f32::INFINITY));

        // 空行不做任何事.
        scan_row(&[], 1.0, &mut []);
    }

    #[test]
    fn test_scan_column() {
        let inf = f32::INFINITY;
        let g = [inf, inf, 4.0, inf, inf];
        let mut h = [0.0f32; 5];
        scan_column(&g, 1.0, &mut h);
        assert_eq!(h, [8.0, 5.0, 4.0, 5.0, 8.0]);

        let g = [0.0, 9.0, 9.0, 9.0, 0.0];
        scan_column(&g, 1.0, &mut h);
        assert_eq!(h, [0.0, 1.0, 4.0, 1.0, 0.0]);

        let g = [inf; 5];
        scan_column(&g, 1.0, &mut h);
        assert!(h.iter().all(|v| *v == inf));
    }

    #[test]
    fn test_depth_window() {
        assert_eq!(depth_window(&[0.0, 0.0, 0.0]), None);
        assert_eq!(depth_window(&[1.0, 2.0, 3.0]), Some((0, 2)));
        assert_eq!(depth_window(&[0.0, 1.0, 0.0]), Some((0, 2)));
        assert_eq!(depth_window(&[0.0, 0.0, 1.0, 2.0, 0.0, 0.0]), Some((1, 4)));
        assert_eq!(depth_window(&[5.0]), Some((0, 0)));
        assert_eq!(depth_window(&[0.0, 0.0, 0.0, 7.0]), Some((2, 3)));
    }

    /// 两端为背景的单列, 中间三个前景.
    #[test]
    fn test_scan_depth_line_both_ends() {
        // 第二遍结束后的值: 前景体素在平面内没有背景.
        let inf = f32::INFINITY;
        let line = [0.0, inf, inf, inf, 0.0];
        let fg = [false, true, true, true, false];
        let mut out = [0.0f32; 5];
        scan_depth_line(&line, &fg, 1.0, &mut out);
        assert_eq!(out, [0.0, 1.0, 4.0, 1.0, 0.0]);
    }

    /// 窗口版本与全范围版本的结果必须逐位一致.
    ///
    /// 穷举长度不超过 9 的所有前景/背景模式, 覆盖背景贴近两端以及位于内部的情况.
    #[test]
    fn test_window_equals_full_range() {
        let mut rng = Lcg(0x5eed);
        for len in 1..=9usize {
            for mask in 0u32..(1 << len) {
                let fg: Vec<bool> = (0..len).map(|i| mask & (1 << i) != 0).collect();
                for wz in [1.0, 0.3, 7.5] {
                    let line: Vec<f32> = fg
                        .iter()
                        .map(|&f| match (f, rng.next() % 5) {
                            (false, _) => 0.0,
                            (true, 0) => f32::INFINITY,
                            (true, r) => (r * (1 + rng.next() % 40)) as f32 * 0.37,
                        })
                        .collect();
                    let (mut a, mut b) = (vec![0.0; len], vec![0.0; len]);
                    scan_depth_line(&line, &fg, wz, &mut a);
                    scan_depth_line_full(&line, &fg, wz, &mut b);
                    assert_eq!(a, b, "line = {line:?}, wz = {wz}");
                }
            }
        }
    }
}
