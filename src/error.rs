use thiserror::Error;

/// 库层统一错误类型：可预期的失败用封闭的枚举表达，
/// 算法不变量违规一律走 debug_assert，不进入错误通道。
#[derive(Debug, Error)]
pub enum SeqanError {
    /// 空的序列集合（索引构建前即拒绝）
    #[error("empty sequence set")]
    EmptyInput,

    /// 空模式串
    #[error("empty pattern")]
    EmptyPattern,

    /// 带状对齐的对角线区间排除了所有合法路径
    #[error("band [{lower}, {upper}] excludes every alignment path")]
    InvalidBand { lower: i64, upper: i64 },

    /// 其他非法参数（如 q-gram 目录尺寸溢出）
    #[error("invalid parameter: {0}")]
    InvalidParams(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, SeqanError>;
