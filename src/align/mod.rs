pub mod cigar;
pub mod global;
pub mod local;
pub mod scoring;

use rayon::prelude::*;

use crate::error::Result;
use self::scoring::Scoring;

/// 自由端隙配置：一个运行时结构覆盖全部 16 种组合。
/// top/bottom 指 DP 矩阵的首/末行（a 在竖轴、b 在横轴）：
/// free_top/free_bottom 免除 b 上的前导/尾随隙（D 段），
/// free_left/free_right 免除 a 上的（I 段）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignConfig {
    pub free_top: bool,
    pub free_left: bool,
    pub free_right: bool,
    pub free_bottom: bool,
}

impl AlignConfig {
    /// 标准全局对齐：四端都计分
    pub fn none() -> Self {
        Self::default()
    }

    /// overlap 对齐：四端都免罚
    pub fn overlap() -> Self {
        Self { free_top: true, free_left: true, free_right: true, free_bottom: true }
    }
}

/// 对角线带 [lower, upper]：单元 (i, j) 在带内当且仅当 lower ≤ j-i ≤ upper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub lower: i64,
    pub upper: i64,
}

impl Band {
    pub fn new(lower: i64, upper: i64) -> Self {
        Self { lower, upper }
    }
}

/// 全局对齐结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub score: i32,
    pub cigar: String,
}

/// 局部对齐结果：分数、编辑脚本与两条序列上的半开区间
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalAlignment {
    pub score: i32,
    pub cigar: String,
    pub query_start: usize,
    pub query_end: usize,
    pub ref_start: usize,
    pub ref_end: usize,
}

/// 长度 len 的隙段分数（加性负分模型）
#[inline]
pub(crate) fn gap_run(sc: &Scoring, len: usize) -> i32 {
    if len == 0 {
        0
    } else {
        sc.gap_open + (len as i32 - 1) * sc.gap_extend
    }
}

/// 成批全局对齐：序列对相互独立，rayon 按对并行
pub fn align_batch(
    pairs: &[(&[u8], &[u8])],
    sc: &Scoring,
    cfg: AlignConfig,
    band: Option<Band>,
) -> Vec<Result<Alignment>> {
    pairs
        .par_iter()
        .map(|&(a, b)| global::global_align(a, b, sc, cfg, band))
        .collect()
}
