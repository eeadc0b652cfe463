use ndarray::ArrayViewMut2;

use crate::{Classifier, VolumeSource};

/// 收尾: 处理第 `z` 层切片 `slice` (`(h, w)` 布局).
///
/// 背景体素置 0, 前景体素取平方根. 返回该切片前景距离的最大值 (无前景时为 `0.0`).
pub(crate) fn finish_slice<V: VolumeSource + ?Sized>(
    volume: &V,
    z: usize,
    classifier: &Classifier,
    mut slice: ArrayViewMut2<'_, f32>,
) -> f32 {
    let mut max = 0.0f32;
    for ((y, x), d) in slice.indexed_iter_mut() {
        if classifier.is_background(volume.sample(x, y, z)) {
            *d = 0.0;
        } else {
            *d = d.sqrt();
            max = max.max(*d);
        }
    }
    max
}
