//! 单遍扫描的并行调度.
//!
//! 每一遍扫描都被拆分为若干互不重叠的 "单元" (第一、二遍为切片, 第三遍为 xz 平面),
//! 每个单元带有自己的索引. 调度器为本遍新建一组工作线程, 分发所有单元,
//! 并在全部完成后返回. 这构成了相邻两遍之间的同步屏障.
//!
//! 单元持有底层缓冲区互不相交的可变视图, 因此一遍之内无需任何锁.

use std::thread;

use log::trace;

use super::Pass;
use crate::error::{EdtError, EdtResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use std::panic::{self, AssertUnwindSafe};
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 获得可并行核心数.
pub fn available_workers() -> usize {
    thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 工作线程调度方式. 参数为每一遍扫描使用的线程数.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Schedule {
    /// 固定 `n` 个线程, 第 `i` 个单元交给第 `i mod n` 个线程.
    RoundRobin(usize),

    /// 每遍新建一个 `n` 线程的 `rayon` 线程池, 由其动态分配单元.
    #[cfg(feature = "rayon")]
    Rayon(usize),
}

impl Schedule {
    /// 以可并行核心数为线程数的 [`Schedule::RoundRobin`].
    #[inline]
    pub fn round_robin() -> Self {
        Self::RoundRobin(available_workers())
    }

    /// 以可并行核心数为线程数的 [`Schedule::Rayon`].
    #[cfg(feature = "rayon")]
    #[inline]
    pub fn rayon() -> Self {
        Self::Rayon(available_workers())
    }

    /// 每遍扫描使用的线程数.
    #[inline]
    pub fn workers(&self) -> usize {
        match *self {
            Self::RoundRobin(n) => n,
            #[cfg(feature = "rayon")]
            Self::Rayon(n) => n,
        }
    }

    /// 运行一遍扫描. `units` 中每一项为 `(单元索引, 单元)`,
    /// `op` 会被以 `op(索引, 单元)` 的形式对每个单元恰好调用一次.
    ///
    /// 返回所有 `op` 的返回值, 顺序不作保证. 任一工作线程 panic 时,
    /// 等待其余线程结束后返回 `Err(EdtError::WorkerPanicked)`.
    pub(crate) fn run<T, R, F>(&self, pass: Pass, units: Vec<(usize, T)>, op: F) -> EdtResult<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(usize, T) -> R + Sync,
    {
        match *self {
            Self::RoundRobin(n) => run_round_robin(n, pass, units, op),
            #[cfg(feature = "rayon")]
            Self::Rayon(n) => run_rayon(n, pass, units, op),
        }
    }
}

impl Default for Schedule {
    #[inline]
    fn default() -> Self {
        Self::round_robin()
    }
}

/// 轮转分配, 每个线程一个桶.
fn run_round_robin<T, R, F>(n: usize, pass: Pass, units: Vec<(usize, T)>, op: F) -> EdtResult<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync,
{
    if n == 0 {
        return Err(EdtError::ZeroThreads);
    }
    let total = units.len();
    let mut buckets: Vec<Vec<(usize, T)>> = (0..n).map(|_| Vec::new()).collect();
    for (idx, unit) in units {
        buckets[idx % n].push((idx, unit));
    }

    thread::scope(|s| {
        let op = &op;
        let mut handles = Vec::with_capacity(n);
        for (worker, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let handle = thread::Builder::new()
                .name(format!("edt-{}-{worker}", pass.tag()))
                .spawn_scoped(s, move || {
                    trace!("{pass}: worker {worker} takes {} units", bucket.len());
                    bucket
                        .into_iter()
                        .map(|(idx, unit)| op(idx, unit))
                        .collect::<Vec<R>>()
                })?;
            handles.push(handle);
        }

        // 必须 join 所有线程, 不能在第一个错误处提前返回.
        let mut ans = Vec::with_capacity(total);
        let mut panicked = false;
        for handle in handles {
            match handle.join() {
                Ok(mut part) => ans.append(&mut part),
                Err(_) => panicked = true,
            }
        }
        if panicked {
            Err(EdtError::WorkerPanicked { pass })
        } else {
            Ok(ans)
        }
    })
}

/// 借助 `rayon` 线程池运行.
#[cfg(feature = "rayon")]
fn run_rayon<T, R, F>(n: usize, pass: Pass, units: Vec<(usize, T)>, op: F) -> EdtResult<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync,
{
    if n == 0 {
        return Err(EdtError::ZeroThreads);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .thread_name(move |i| format!("edt-{}-{i}", pass.tag()))
        .build()
        .map_err(|e| EdtError::ThreadPool(e.to_string()))?;

    trace!("{pass}: {} units on a pool of {n}", units.len());
    panic::catch_unwind(AssertUnwindSafe(|| {
        pool.install(|| {
            units
                .into_par_iter()
                .map(|(idx, unit)| op(idx, unit))
                .collect::<Vec<R>>()
        })
    }))
    .map_err(|_| EdtError::WorkerPanicked { pass })
}

#[cfg(test)]
mod tests {
    use super::{available_workers, Schedule};
    use crate::edt::Pass;
    use crate::EdtError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn schedules() -> Vec<Schedule> {
        let mut ans = vec![
            Schedule::RoundRobin(1),
            Schedule::RoundRobin(3),
            Schedule::RoundRobin(64),
        ];
        #[cfg(feature = "rayon")]
        ans.extend([Schedule::Rayon(1), Schedule::Rayon(4)]);
        ans
    }

    #[test]
    fn test_every_unit_once() {
        for s in schedules() {
            let hit = AtomicUsize::new(0);
            let units: Vec<(usize, usize)> = (0..37).map(|i| (i, i * 2)).collect();
            let mut ans = s
                .run(Pass::First, units, |idx, unit| {
                    hit.fetch_add(1, Ordering::Relaxed);
                    assert_eq!(unit, idx * 2);
                    idx
                })
                .unwrap();
            ans.sort_unstable();
            assert_eq!(ans, (0..37).collect::<Vec<_>>());
            assert_eq!(hit.load(Ordering::Relaxed), 37);
        }
    }

    /// 第 `i` 个单元必须由第 `i mod n` 个线程处理.
    #[test]
    fn test_round_robin_assignment() {
        let units: Vec<(usize, ())> = (0..10).map(|i| (i, ())).collect();
        let names = Schedule::RoundRobin(3)
            .run(Pass::Second, units, |idx, _| {
                (idx, std::thread::current().name().map(str::to_owned))
            })
            .unwrap();
        for (idx, name) in names {
            assert_eq!(name.unwrap(), format!("edt-p2-{}", idx % 3));
        }
    }

    #[test]
    fn test_worker_panic_is_reported() {
        for s in schedules() {
            let units: Vec<(usize, ())> = (0..8).map(|i| (i, ())).collect();
            let err = s
                .run(Pass::Third, units, |idx, _| {
                    if idx == 5 {
                        panic!("injected failure");
                    }
                })
                .unwrap_err();
            assert!(matches!(err, EdtError::WorkerPanicked { pass: Pass::Third }));
        }
    }

    #[test]
    fn test_zero_threads() {
        let err = Schedule::RoundRobin(0)
            .run(Pass::First, vec![(0, ())], |_, _| ())
            .unwrap_err();
        assert!(matches!(err, EdtError::ZeroThreads));
        assert!(available_workers() >= 1);
        assert!(Schedule::default().workers() >= 1);
    }
}
