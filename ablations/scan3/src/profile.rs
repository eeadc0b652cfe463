//! 变体运行统计.

use std::time::{Duration, Instant};

/// 单个变体的数据统计.
///
/// 每次运行以 `run_start()` 开始, 以 `run_elapsed()` 或 `count_failed()` 结束.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 成功完成的运行次数.
    runs: u64,

    /// 运行失败的次数.
    failed: u64,

    /// 成功运行处理的体素总数.
    voxels: u64,

    /// 本次运行的开始时刻.
    since: Instant,

    /// 成功运行花费的总时间.
    run_time: Duration,

    /// 最耗时的一次运行.
    most: Option<Duration>,

    /// 与参考结果的最大绝对误差.
    max_error: f32,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            runs: 0,
            failed: 0,
            voxels: 0,
            since: Instant::now(),
            run_time: Duration::ZERO,
            most: None,
            max_error: 0.0,
        }
    }

    /// 开始一次计时.
    #[inline]
    pub fn run_start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束一次成功运行的计时. `voxels` 为该次运行处理的体素数.
    #[inline]
    pub fn run_elapsed(&mut self, voxels: usize) {
        let d = self.since.elapsed();
        self.run_time += d;
        self.runs += 1;
        self.voxels += voxels as u64;
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
    }

    /// 记录一次失败运行. 失败运行不计入耗时.
    #[inline]
    pub fn count_failed(&mut self) {
        self.failed += 1;
    }

    /// 记录一次与参考结果的比较.
    #[inline]
    pub fn record_error(&mut self, err: f32) {
        self.max_error = self.max_error.max(err);
    }

    /// 获得成功运行次数.
    #[inline]
    pub fn get_runs(&self) -> u64 {
        self.runs
    }

    /// 获得失败运行次数.
    #[inline]
    pub fn get_failed(&self) -> u64 {
        self.failed
    }

    /// 以微秒为单位获得总运行时间.
    #[inline]
    pub fn get_run_time_us(&self) -> u64 {
        self.run_time.as_micros() as u64
    }

    /// 以微秒为单位获得平均运行时间.
    #[inline]
    pub fn get_avg_run_time_us(&self) -> Option<f64> {
        match self.runs {
            0 => None,
            runs => Some(self.get_run_time_us() as f64 / runs as f64),
        }
    }

    /// 平均每微秒处理的体素数.
    #[inline]
    pub fn get_throughput(&self) -> Option<f64> {
        match self.get_run_time_us() {
            0 => None,
            us => Some(self.voxels as f64 / us as f64),
        }
    }

    /// 获取最耗时的一次运行所消耗的时间. 如果不存在运行, 则返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }

    /// 与参考结果的最大绝对误差.
    #[inline]
    pub fn get_max_error(&self) -> f32 {
        self.max_error
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Profile;

    #[test]
    fn test_profile_counts() {
        let mut p = Profile::new();
        assert_eq!(p.get_avg_run_time_us(), None);
        assert_eq!(p.get_most_time_consuming(), None);

        for _ in 0..3 {
            p.run_start();
            p.run_elapsed(1000);
        }
        p.count_failed();
        p.record_error(1e-6);
        p.record_error(0.0);

        assert_eq!(p.get_runs(), 3);
        assert_eq!(p.get_failed(), 1);
        assert_eq!(p.get_max_error(), 1e-6);
        assert!(p.get_avg_run_time_us().is_some());
        assert!(p.get_most_time_consuming().unwrap().as_micros() as u64 <= p.get_run_time_us());
    }
}
