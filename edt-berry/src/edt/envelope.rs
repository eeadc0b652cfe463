//! 抛物线下包络 (Felzenszwalb & Huttenlocher) 求解一维最小化.
//!
//! 对 `f` 上的每个位置 `q` 求 `min_p (f[p] + (q - p)² · w)`, 复杂度为 O(n).
//! 结果与 [`super::scan`] 中的直接求解在浮点误差范围内一致.

use super::scan::parabola;

/// 计算 `f` 的加权下包络, 写入 `out`.
///
/// `f` 中的 `f32::INFINITY` 不参与包络构建; 若 `f` 全为无穷, `out` 全为无穷.
///
/// 当 `f` 与 `out` 长度不同时 panic.
pub fn lower_envelope(f: &[f32], w: f64, out: &mut [f32]) {
    assert_eq!(f.len(), out.len(), "线长度不一致");

    // 下包络中各抛物线的顶点位置, 以及每条抛物线起作用区间的左边界.
    let mut v: Vec<usize> = Vec::with_capacity(f.len());
    let mut z: Vec<f64> = Vec::with_capacity(f.len());

    for q in (0..f.len()).filter(|&q| f[q].is_finite()) {
        let (fq, qf) = (f[q] as f64, q as f64);
        loop {
            let Some(&p) = v.last() else {
                v.push(q);
                z.push(f64::NEG_INFINITY);
                break;
            };
            let (fp, pf) = (f[p] as f64, p as f64);
            // 两条抛物线的交点.
            let s = ((fq + w * qf * qf) - (fp + w * pf * pf)) / (2.0 * w * (qf - pf));
            if s > z[z.len() - 1] {
                v.push(q);
                z.push(s);
                break;
            }
            v.pop();
            z.pop();
        }
    }

    if v.is_empty() {
        out.fill(f32::INFINITY);
        return;
    }

    let mut k = 0usize;
    for (q, o) in out.iter_mut().enumerate() {
        while k + 1 < v.len() && z[k + 1] < q as f64 {
            k += 1;
        }
        *o = parabola(f[v[k]], q.abs_diff(v[k]), w);
    }
}

/// 第三遍扫描 (z 方向) 的下包络版本.
///
/// 只有 `foreground` 为 `true` 的位置取包络值, 其它位置保持 `line` 的原值.
pub fn envelope_depth_line(line: &[f32], foreground: &[bool], wz: f64, out: &mut [f32]) {
    assert_eq!(line.len(), foreground.len(), "线长度不一致");

    lower_envelope(line, wz, out);
    for ((o, &l), &fg) in out.iter_mut().zip(line).zip(foreground) {
        if !fg {
            *o = l;
        }
    }
}
