//! # seqan-rust
//!
//! 受 [SeqAn](https://www.seqan.de/) 启发的 Rust 版序列索引与对齐工具箱。
//!
//! 本 crate 围绕多序列文本提供一组可组合的核心算法：
//!
//! - **广义后缀数组**：Skew-7（DC7 差分覆盖）构建，多序列哨兵编码
//! - **增强后缀数组遍历**：自底向上 lcp 区间迭代，MUM / 超极大重复 /
//!   极大重复（Weiner 链分桶计数）
//! - **嵌套 q-gram 索引**：按需展开的多层目录，稀疏桶自动压缩
//! - **对齐**：Gotoh 仿射隙全局对齐（运行时自由端隙配置、带约束）
//!   与 Smith-Waterman 局部对齐（岛号 top-K），CIGAR 输出
//!
//! ## 快速示例
//!
//! ```rust
//! use seqan_rust::index::esa::EsaIndex;
//! use seqan_rust::index::traverse;
//! use seqan_rust::util::alphabet::Alphabet;
//!
//! let seqs: [&[u8]; 2] = [b"MISSISSIPPI", b"MISSOURI"];
//! let idx = EsaIndex::from_seqs(&seqs, Alphabet::Byte).unwrap();
//! for mum in traverse::mums(&idx, 3) {
//!     let p = mum.occurrences[0];
//!     let repr = &idx.text().suffix(p)[..mum.rep_len];
//!     let s = idx.text().alphabet().decode(repr);
//!     println!("MUM: {}", String::from_utf8_lossy(&s));
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`io`] — FASTA 文件解析
//! - [`index`] — 多序列文本、后缀数组、LCP、遍历、q-gram 索引
//! - [`align`] — 打分方案与全局 / 局部对齐
//! - [`util`] — 字母表编码 / 解码
//! - [`error`] — 库层统一错误类型

pub mod align;
pub mod error;
pub mod index;
pub mod io;
pub mod util;
