//! 从环境变量读取实验配置.

use std::env;

/// 默认体积边长.
pub const DEFAULT_SIZE: usize = 64;

/// 默认每个变体的重复次数.
pub const DEFAULT_ROUNDS: usize = 3;

/// 消融实验配置.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AblationConfig {
    /// 合成体积的边长, 体积形状为 `(size, size, size)`.
    pub size: usize,

    /// 每个变体重复运行的次数.
    pub rounds: usize,

    /// 每一遍扫描使用的线程数.
    pub threads: usize,
}

impl AblationConfig {
    /// 读取配置.
    ///
    /// 1. 若环境变量 `$EDT_ABLATION_SIZE` 为正整数, 则以其为边长, 否则为 [`DEFAULT_SIZE`];
    /// 2. 若环境变量 `$EDT_ABLATION_ROUNDS` 为正整数, 则以其为重复次数, 否则为 [`DEFAULT_ROUNDS`];
    /// 3. 线程数为可并行核心数.
    pub fn from_env() -> Self {
        Self {
            size: positive_var("EDT_ABLATION_SIZE").unwrap_or(DEFAULT_SIZE),
            rounds: positive_var("EDT_ABLATION_ROUNDS").unwrap_or(DEFAULT_ROUNDS),
            threads: crate::cpus(),
        }
    }
}

impl Default for AblationConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            rounds: DEFAULT_ROUNDS,
            threads: crate::cpus(),
        }
    }
}

/// 读取正整数环境变量. 未设置或无法解析时返回 `None`.
fn positive_var(key: &str) -> Option<usize> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}
