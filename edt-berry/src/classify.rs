//! 体素前景/背景判定.

use crate::consts::ElemType;

/// 体素分类器, 由阈值 `threshold` 和反转标记 `inverse` 组成.
///
/// 判定规则为 `(sample < threshold) XOR inverse`, 即默认情况下低于阈值的体素为背景.
/// 三遍扫描与最后的求根步骤共用同一个分类器实例, 保证判定结果在各阶段完全一致.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Classifier {
    threshold: u8,
    inverse: bool,
}

impl Classifier {
    /// 构建分类器.
    #[inline]
    pub const fn new(threshold: u8, inverse: bool) -> Self {
        Self { threshold, inverse }
    }

    /// 阈值.
    #[inline]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// 是否反转判定.
    #[inline]
    pub const fn inverse(&self) -> bool {
        self.inverse
    }

    /// 体素值 `sample` 是否为背景?
    #[inline]
    pub const fn is_background(&self, sample: u8) -> bool {
        (sample < self.threshold) ^ self.inverse
    }

    /// 体素值 `sample` 是否为前景?
    #[inline]
    pub const fn is_foreground(&self, sample: u8) -> bool {
        !self.is_background(sample)
    }

    /// 获取体素值 `sample` 的类型.
    #[inline]
    pub const fn classify(&self, sample: u8) -> ElemType {
        if self.is_background(sample) {
            ElemType::Background
        } else {
            ElemType::Foreground
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Classifier;

    #[test]
    fn test_classifier_threshold() {
        let c = Classifier::new(128, false);
        assert!(c.is_background(0));
        assert!(c.is_background(127));
        assert!(c.is_foreground(128));
        assert!(c.is_foreground(255));

        // 阈值为 0 时不存在背景.
        let c = Classifier::new(0, false);
        assert!((0..=255u8).all(|s| c.is_foreground(s)));
    }

    /// `inverse` 恰好翻转判定结果.
    #[test]
    fn test_classifier_inverse_complement() {
        for t in 0..=255u8 {
            let (c, ci) = (Classifier::new(t, false), Classifier::new(t, true));
            for s in 0..=255u8 {
                assert_eq!(c.is_background(s), !ci.is_background(s));
                assert_eq!(c.classify(s).is_background(), ci.classify(s).is_foreground());
            }
        }
    }

    /// 灰度取反后, 阈值 `T` 的正向判定与阈值 `256 - T` 的反向判定等价.
    #[test]
    fn test_classifier_mirrored_threshold() {
        for t in 1..=255u8 {
            let c = Classifier::new(t, false);
            let mirrored = Classifier::new((256 - t as u16) as u8, true);
            for s in 0..=255u8 {
                assert_eq!(c.is_background(s), mirrored.is_background(255 - s));
            }
        }
    }
}
