//! 距离变换参数.

use num::ToPrimitive;

use crate::consts::DEFAULT_THRESHOLD;
use crate::error::{EdtError, EdtResult};
use crate::{Classifier, LineMinimizer, Schedule, VoxelSpacing};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 距离变换参数.
///
/// 构造时不做检查, 由 [`EdtParams::validate`] (或 [`crate::Edt::new`]) 统一验证.
///
/// ```
/// use edt_berry::{EdtParams, LineMinimizer, VoxelSpacing};
///
/// let params = EdtParams::default()
///     .with_threshold(100)
///     .with_spacing(VoxelSpacing::new(0.7, 0.7, 5.0).unwrap())
///     .with_minimizer(LineMinimizer::Envelope);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdtParams {
    threshold: i32,
    inverse: bool,
    spacing: VoxelSpacing,
    schedule: Schedule,
    minimizer: LineMinimizer,
}

impl Default for EdtParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            inverse: false,
            spacing: VoxelSpacing::unit(),
            schedule: Schedule::default(),
            minimizer: LineMinimizer::default(),
        }
    }
}

impl EdtParams {
    /// 以全部字段构造.
    pub fn new(
        threshold: i32,
        inverse: bool,
        spacing: VoxelSpacing,
        schedule: Schedule,
        minimizer: LineMinimizer,
    ) -> Self {
        Self {
            threshold,
            inverse,
            spacing,
            schedule,
            minimizer,
        }
    }

    /// 设置阈值.
    #[inline]
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    /// 设置是否反转前景/背景.
    #[inline]
    pub fn with_inverse(mut self, inverse: bool) -> Self {
        self.inverse = inverse;
        self
    }

    /// 设置体素分辨率.
    #[inline]
    pub fn with_spacing(mut self, spacing: VoxelSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// 设置调度方式.
    #[inline]
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// 设置一维最小化方式.
    #[inline]
    pub fn with_minimizer(mut self, minimizer: LineMinimizer) -> Self {
        self.minimizer = minimizer;
        self
    }

    /// 阈值.
    #[inline]
    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// 是否反转.
    #[inline]
    pub fn inverse(&self) -> bool {
        self.inverse
    }

    /// 体素分辨率.
    #[inline]
    pub fn spacing(&self) -> VoxelSpacing {
        self.spacing
    }

    /// 调度方式.
    #[inline]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// 一维最小化方式.
    #[inline]
    pub fn minimizer(&self) -> LineMinimizer {
        self.minimizer
    }

    /// 验证参数. 成功时返回对应的分类器.
    ///
    /// 依次检查阈值、体素分辨率和线程数, 返回遇到的第一个错误.
    pub fn validate(&self) -> EdtResult<Classifier> {
        let threshold = self
            .threshold
            .to_u8()
            .ok_or(EdtError::ThresholdOutOfRange(self.threshold))?;
        self.spacing.validate()?;
        if self.schedule.workers() == 0 {
            return Err(EdtError::ZeroThreads);
        }
        Ok(Classifier::new(threshold, self.inverse))
    }
}

#[cfg(test)]
mod tests {
    use super::EdtParams;
    use crate::{EdtError, LineMinimizer, Schedule, VoxelSpacing};

    #[test]
    fn test_default() {
        let p = EdtParams::default();
        assert_eq!(p.threshold(), 128);
        assert!(!p.inverse());
        assert_eq!(p.spacing(), VoxelSpacing::unit());
        assert_eq!(p.minimizer(), LineMinimizer::Direct);
        assert!(p.schedule().workers() >= 1);

        let c = p.validate().unwrap();
        assert_eq!(c.threshold(), 128);
        assert!(!c.inverse());
    }

    #[test]
    fn test_threshold_range() {
        for t in [0, 1, 255] {
            assert_eq!(
                EdtParams::default()
                    .with_threshold(t)
                    .validate()
                    .unwrap()
                    .threshold() as i32,
                t
            );
        }
        for t in [-1, 256, i32::MIN, i32::MAX] {
            let err = EdtParams::default().with_threshold(t).validate().unwrap_err();
            assert!(matches!(err, EdtError::ThresholdOutOfRange(v) if v == t));
        }
    }

    #[test]
    fn test_invalid_spacing() {
        let p = EdtParams::default().with_spacing(VoxelSpacing::new(0.5, 0.5, 3.0).unwrap());
        assert!(p.validate().is_ok());

        assert!(matches!(
            VoxelSpacing::new(1.0, 0.0, 1.0),
            Err(EdtError::InvalidSpacing { axis: 'y', .. })
        ));
    }

    #[test]
    fn test_zero_threads() {
        let p = EdtParams::default().with_schedule(Schedule::RoundRobin(0));
        assert!(matches!(p.validate(), Err(EdtError::ZeroThreads)));

        // 阈值错误优先.
        let p = p.with_threshold(300);
        assert!(matches!(p.validate(), Err(EdtError::ThresholdOutOfRange(300))));
    }

    #[test]
    fn test_inverse_passes_through() {
        let c = EdtParams::default()
            .with_inverse(true)
            .with_threshold(10)
            .validate()
            .unwrap();
        assert!(c.inverse());
        assert!(c.is_background(200));
        assert!(c.is_foreground(3));
    }
}
