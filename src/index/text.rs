use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqanError};
use crate::util::alphabet::Alphabet;

/// 多序列集合中的一个后缀起点：(序列编号, 序列内偏移)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeqPos {
    pub seq: u32,
    pub pos: u32,
}

impl SeqPos {
    pub fn new(seq: u32, pos: u32) -> Self {
        Self { seq, pos }
    }
}

/// 多序列文本：所有序列按序数编码后首尾相接，
/// limits 表记录每条序列的起始偏移（limits[m] = 总长）。
/// 全局位置 ↔ (seqId, localPos) 的互换通过 limits 上的二分完成。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiText {
    concat: Vec<u8>,
    limits: Vec<u32>,
    alphabet: Alphabet,
}

impl MultiText {
    /// 由原始字节序列集合构建（逐条做序数编码）。
    /// 空集合立即报错；允许个别序列为空。
    pub fn from_seqs(seqs: &[&[u8]], alphabet: Alphabet) -> Result<Self> {
        if seqs.is_empty() {
            return Err(SeqanError::EmptyInput);
        }
        let total: usize = seqs.iter().map(|s| s.len()).sum();
        let mut concat = Vec::with_capacity(total);
        let mut limits = Vec::with_capacity(seqs.len() + 1);
        for seq in seqs {
            limits.push(concat.len() as u32);
            concat.extend(seq.iter().map(|&b| alphabet.ordinal(b)));
        }
        limits.push(concat.len() as u32);
        Ok(Self { concat, limits, alphabet })
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// 序列条数
    pub fn num_seqs(&self) -> usize {
        self.limits.len() - 1
    }

    /// 所有序列的总长度
    pub fn total_len(&self) -> usize {
        self.concat.len()
    }

    /// 第 k 条序列的序数切片
    pub fn seq(&self, k: usize) -> &[u8] {
        let lo = self.limits[k] as usize;
        let hi = self.limits[k + 1] as usize;
        &self.concat[lo..hi]
    }

    pub fn seq_len(&self, k: usize) -> usize {
        (self.limits[k + 1] - self.limits[k]) as usize
    }

    /// 后缀切片：自 p 起到所属序列末尾为止（不跨序列边界）
    pub fn suffix(&self, p: SeqPos) -> &[u8] {
        let lo = self.limits[p.seq as usize] as usize + p.pos as usize;
        let hi = self.limits[p.seq as usize + 1] as usize;
        &self.concat[lo..hi]
    }

    /// 全局位置 → (seqId, localPos)
    pub fn locate(&self, global: usize) -> SeqPos {
        debug_assert!(global < self.concat.len());
        // limits 升序，二分找所属序列
        let k = match self.limits.binary_search(&(global as u32)) {
            Ok(mut i) => {
                // 空序列会产生重复的 limit 值，取最后一个相等项
                while i + 1 < self.limits.len() - 1 && self.limits[i + 1] as usize == global {
                    i += 1;
                }
                i
            }
            Err(i) => i - 1,
        };
        SeqPos::new(k as u32, (global - self.limits[k] as usize) as u32)
    }

    /// (seqId, localPos) → 全局位置
    pub fn global(&self, p: SeqPos) -> usize {
        self.limits[p.seq as usize] as usize + p.pos as usize
    }

    /// p 的前驱字符（序列内）；位于序列首时返回 None
    pub fn left_char(&self, p: SeqPos) -> Option<u8> {
        if p.pos == 0 {
            None
        } else {
            Some(self.concat[self.global(p) - 1])
        }
    }

    pub fn concat(&self) -> &[u8] {
        &self.concat
    }

    pub fn limits(&self) -> &[u32] {
        &self.limits
    }
}
