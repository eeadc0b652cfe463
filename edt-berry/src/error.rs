//! 运行时错误.

use crate::edt::Pass;
use crate::Idx3d;

/// 距离变换的运行时错误.
///
/// 参数错误总是在分配距离缓冲区之前被检出; 工作线程错误会中止整个变换,
/// 已部分写入的缓冲区被直接丢弃.
#[derive(Debug, thiserror::Error)]
pub enum EdtError {
    /// 阈值不在 `[0, 255]` 范围内.
    #[error("阈值 {0} 不在 [0, 255] 范围内")]
    ThresholdOutOfRange(i32),

    /// 某个方向的体素分辨率不是正的有限实数, 或其平方在 `f32` 中不是正规数
    /// (上溢为无穷或下溢为 0/次正规数).
    ///
    /// `axis` 为 `'x'`, `'y'` 或 `'z'`.
    #[error("{axis} 方向体素分辨率 {value} 非法")]
    InvalidSpacing {
        /// 出错的方向.
        axis: char,
        /// 出错的值.
        value: f64,
    },

    /// 体积数据至少有一个维度为 0. 形状按 `(z, h, w)` 给出.
    #[error("体积数据 {0:?} 为空")]
    EmptyVolume(Idx3d),

    /// 以切片序列构造体积时, 第 `index` 个切片的像素数与 `expected` 不符.
    #[error("第 {index} 个切片的像素数为 {found}, 应为 {expected}")]
    SliceSize {
        /// 切片索引.
        index: usize,
        /// 期望的像素数 (宽 × 高).
        expected: usize,
        /// 实际的像素数.
        found: usize,
    },

    /// 在给定分辨率下, 该形状体积的最大平方距离超出 `f32` 范围. 形状按 `(z, h, w)` 给出.
    #[error("体积数据 {0:?} 在当前分辨率下的平方距离超出 f32 范围")]
    DistanceOverflow(Idx3d),

    /// 工作线程数为 0.
    #[error("工作线程数不能为 0")]
    ZeroThreads,

    /// 整个体积中不存在背景体素, 最近背景距离无定义.
    #[error("体积中不存在背景体素")]
    NoBackground,

    /// 某一遍扫描中有工作线程 panic. 该次变换的结果不可用.
    #[error("{pass} 中工作线程异常终止")]
    WorkerPanicked {
        /// 出错的扫描阶段.
        pass: Pass,
    },

    /// 无法启动工作线程.
    #[error("无法启动工作线程: {0}")]
    Spawn(#[from] std::io::Error),

    /// 无法构建 `rayon` 线程池.
    #[error("无法构建线程池: {0}")]
    ThreadPool(String),

    /// 读取 nifti 文件失败.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// nifti 数据不是三维的. 参数为实际形状.
    #[error("不支持的数据形状 {0:?}, 仅支持三维数据")]
    UnsupportedShape(Vec<usize>),

    /// 写出 npy 文件失败.
    #[error(transparent)]
    Npy(#[from] ndarray_npy::WriteNpyError),
}

/// 距离变换运行时结果.
pub type EdtResult<T> = Result<T, EdtError>;
