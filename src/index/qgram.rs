use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqanError};
use crate::index::text::{MultiText, SeqPos};

/// 目录尺寸上限（σ^q 槽位数）：超过即拒绝，防止指数爆炸
const MAX_DIR_SIZE: usize = 1 << 22;

/// 目录槽位。start/end 是 positions 纤维上的绝对区间 [start, end)。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum DirEntry {
    /// 尚未加工的桶：位置按文本序
    Leaf { start: u32, end: u32 },
    /// 已按完整后缀排序的桶：查询直接二分
    Sorted { start: u32, end: u32 },
    /// 指向嵌套子目录，子目录按更深一层的 q 个符号细分本桶
    SubDir { dir: u32, start: u32, end: u32 },
}

impl DirEntry {
    fn range(self) -> (usize, usize) {
        match self {
            DirEntry::Leaf { start, end }
            | DirEntry::Sorted { start, end }
            | DirEntry::SubDir { start, end, .. } => (start as usize, end as usize),
        }
    }
}

/// 一层目录：σ^q 个槽位，offset 为本层哈希窗口在后缀内的起始偏移
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DirLevel {
    entries: Vec<DirEntry>,
    offset: u32,
}

/// 展开与压缩的调节参数
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QGramParams {
    /// 桶大小超过该值才值得建子目录，否则整桶排序
    pub min_suf_count: usize,
    /// 最大嵌套层数（每层 q 个符号）
    pub max_lcp: usize,
    /// 子目录非空槽位少于该值时压缩为排序桶
    pub min_dir_size: usize,
}

impl Default for QGramParams {
    fn default() -> Self {
        Self { min_suf_count: 16, max_lcp: 8, min_dir_size: 4 }
    }
}

/// 嵌套 q-gram 索引：顶层一趟计数排序建根目录，深层目录按需展开。
///
/// 查询沿模式逐层下钻；任何终端都落在一段完整排序的区间上做二分，
/// 或退化为对桶的线性验证扫描，因此截断哈希造成的碰撞不会漏报或误报。
/// 目录结构只增不改：已展开的桶对后续查询直接复用。
#[derive(Debug, Serialize, Deserialize)]
pub struct QGramIndex {
    text: MultiText,
    q: usize,
    sigma: usize,
    /// 全局位置纤维；各目录槽位都是它上面的区间
    positions: Vec<u32>,
    dirs: Vec<DirLevel>,
    params: QGramParams,
}

impl QGramIndex {
    pub fn build(text: MultiText, q: usize, params: QGramParams) -> Result<Self> {
        if q == 0 {
            return Err(SeqanError::InvalidParams("q must be positive".into()));
        }
        let sigma = text.alphabet().size();
        let dir_size = match sigma.checked_pow(q as u32) {
            Some(s) if s <= MAX_DIR_SIZE => s,
            _ => {
                return Err(SeqanError::InvalidParams(format!(
                    "q-gram directory would need {}^{} slots",
                    sigma, q
                )))
            }
        };

        // 只索引剩余长度 ≥ q 的位置：根目录哈希从不截断
        let mut grams: Vec<u32> = Vec::new();
        for k in 0..text.num_seqs() {
            let len = text.seq_len(k);
            let base = text.limits()[k] as usize;
            for i in 0..len.saturating_sub(q - 1) {
                grams.push((base + i) as u32);
            }
        }

        // 计数排序（稳定，桶内保持文本序）
        let mut counts = vec![0u32; dir_size + 1];
        for &g in &grams {
            counts[trunc_hash(&text, sigma, q, g as usize, 0) + 1] += 1;
        }
        for h in 0..dir_size {
            counts[h + 1] += counts[h];
        }
        let mut positions = vec![0u32; grams.len()];
        let mut cursors = counts.clone();
        for &g in &grams {
            let h = trunc_hash(&text, sigma, q, g as usize, 0);
            positions[cursors[h] as usize] = g;
            cursors[h] += 1;
        }
        let entries = (0..dir_size)
            .map(|h| DirEntry::Leaf { start: counts[h], end: counts[h + 1] })
            .collect();

        Ok(Self {
            text,
            q,
            sigma,
            positions,
            dirs: vec![DirLevel { entries, offset: 0 }],
            params,
        })
    }

    pub fn text(&self) -> &MultiText {
        &self.text
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// 模式的全部出现位置（升序）。模式按索引字母表编码后匹配；
    /// 需要 len ≥ q（更短的模式无法通过 q-gram 目录定位）。
    /// 首次触及的大桶会在查询路径上展开或排序，故需要 `&mut self`。
    pub fn equal_range(&mut self, pattern: &[u8]) -> Result<Vec<SeqPos>> {
        if pattern.is_empty() {
            return Err(SeqanError::EmptyPattern);
        }
        if pattern.len() < self.q {
            return Err(SeqanError::InvalidParams(format!(
                "pattern length {} below q-gram width {}",
                pattern.len(),
                self.q
            )));
        }
        let pat = self.text.alphabet().encode(pattern);
        let plen = pat.len();
        let mut dir = 0usize;
        loop {
            let off = self.dirs[dir].offset as usize;
            let rem = plen - off;

            if rem < self.q {
                // 模式在本层中途耗尽：其匹配分布在一段连续槽位里，
                // 槽位下可能已有子结构，不能整段重排，线性验证收尾
                let width = self.sigma.pow((self.q - rem) as u32);
                let h_lo = pad_hash(self.sigma, self.q, &pat[off..]);
                let (s, _) = self.dirs[dir].entries[h_lo].range();
                let (_, e) = self.dirs[dir].entries[h_lo + width - 1].range();
                return Ok(self.scan_verify(s, e, &pat));
            }

            let h = exact_hash(self.sigma, &pat[off..off + self.q]);
            let entry = self.dirs[dir].entries[h];
            match entry {
                DirEntry::Sorted { start, end } => {
                    return Ok(self.search_sorted(start as usize, end as usize, &pat));
                }
                DirEntry::SubDir { dir: child, start, end } => {
                    if rem == self.q {
                        // 模式恰在层边界耗尽；桶已有子结构，线性验证
                        return Ok(self.scan_verify(start as usize, end as usize, &pat));
                    }
                    dir = child as usize;
                }
                DirEntry::Leaf { start, end } => {
                    let (s, e) = (start as usize, end as usize);
                    let count = e - s;
                    let depth = off / self.q + 1;
                    if rem == self.q
                        || count <= self.params.min_suf_count
                        || count < 4
                        || depth >= self.params.max_lcp
                    {
                        self.sort_range(s, e);
                        self.dirs[dir].entries[h] = DirEntry::Sorted { start, end };
                        return Ok(self.search_sorted(s, e, &pat));
                    }
                    self.expand_node(dir, h);
                    // 槽位已改写为 Sorted 或 SubDir，重走本层
                }
            }
        }
    }

    /// 把 Leaf 桶细分为下一层目录；非空槽位太少则压缩为排序桶
    fn expand_node(&mut self, dir: usize, slot: usize) {
        let DirEntry::Leaf { start, end } = self.dirs[dir].entries[slot] else {
            return;
        };
        let (s, e) = (start as usize, end as usize);
        let child_off = self.dirs[dir].offset as usize + self.q;
        let dir_size = self.dirs[dir].entries.len();

        let mut counts = vec![0u32; dir_size + 1];
        for &g in &self.positions[s..e] {
            counts[trunc_hash(&self.text, self.sigma, self.q, g as usize, child_off) + 1] += 1;
        }
        let distinct = counts[1..].iter().filter(|&&c| c > 0).count();
        if distinct < self.params.min_dir_size {
            self.sort_range(s, e);
            self.dirs[dir].entries[slot] = DirEntry::Sorted { start, end };
            return;
        }

        for h in 0..dir_size {
            counts[h + 1] += counts[h];
        }
        let mut scratch = vec![0u32; e - s];
        let mut cursors = counts.clone();
        for &g in &self.positions[s..e] {
            let h = trunc_hash(&self.text, self.sigma, self.q, g as usize, child_off);
            scratch[cursors[h] as usize] = g;
            cursors[h] += 1;
        }
        self.positions[s..e].copy_from_slice(&scratch);

        let entries = (0..dir_size)
            .map(|h| DirEntry::Leaf {
                start: start + counts[h],
                end: start + counts[h + 1],
            })
            .collect();
        let child = self.dirs.len() as u32;
        self.dirs.push(DirLevel { entries, offset: child_off as u32 });
        self.dirs[dir].entries[slot] = DirEntry::SubDir { dir: child, start, end };
    }

    /// 桶整体按 (完整后缀, 序列号降序) 排序
    fn sort_range(&mut self, s: usize, e: usize) {
        let text = &self.text;
        self.positions[s..e].sort_unstable_by(|&ga, &gb| {
            let pa = text.locate(ga as usize);
            let pb = text.locate(gb as usize);
            text.suffix(pa).cmp(text.suffix(pb)).then(pb.seq.cmp(&pa.seq))
        });
    }

    /// 在已排序区间上二分出与模式前缀相等的子区间
    fn search_sorted(&self, s: usize, e: usize, pat: &[u8]) -> Vec<SeqPos> {
        let text = &self.text;
        let range = &self.positions[s..e];
        // 比完整模式短的后缀排在一切真实匹配之前
        let below = |&g: &u32| {
            let sfx = text.suffix(text.locate(g as usize));
            if sfx.len() >= pat.len() {
                sfx[..pat.len()] < *pat
            } else {
                sfx <= &pat[..sfx.len()]
            }
        };
        let not_above = |&g: &u32| {
            let sfx = text.suffix(text.locate(g as usize));
            if sfx.len() >= pat.len() {
                sfx[..pat.len()] <= *pat
            } else {
                sfx <= &pat[..sfx.len()]
            }
        };
        let lo = range.partition_point(below);
        let hi = range.partition_point(not_above);
        let mut out: Vec<SeqPos> =
            range[lo..hi].iter().map(|&g| text.locate(g as usize)).collect();
        out.sort_unstable();
        out
    }

    /// 退化路径：线性扫描桶并逐个验证完整模式
    fn scan_verify(&self, s: usize, e: usize, pat: &[u8]) -> Vec<SeqPos> {
        let text = &self.text;
        let mut out: Vec<SeqPos> = self.positions[s..e]
            .iter()
            .map(|&g| text.locate(g as usize))
            .filter(|&p| text.suffix(p).starts_with(pat))
            .collect();
        out.sort_unstable();
        out
    }
}

/// 截断左对齐哈希：后缀在 [off, off+q) 窗口上的 σ 进制值，
/// 窗口越过序列末尾的部分以 0 补齐
fn trunc_hash(text: &MultiText, sigma: usize, q: usize, global: usize, off: usize) -> usize {
    let sfx = text.suffix(text.locate(global));
    let tail: &[u8] = sfx.get(off..).unwrap_or(&[]);
    let mut h = 0usize;
    for k in 0..q {
        h = h * sigma + tail.get(k).map_or(0, |&c| c as usize);
    }
    h
}

/// 完整 q 个符号的精确哈希
fn exact_hash(sigma: usize, win: &[u8]) -> usize {
    win.iter().fold(0usize, |h, &c| h * sigma + c as usize)
}

/// 不足 q 个符号的模式尾部哈希（低位补 0，即所覆盖槽位区间的下界）
fn pad_hash(sigma: usize, q: usize, tail: &[u8]) -> usize {
    let mut h = exact_hash(sigma, tail);
    for _ in tail.len()..q {
        h *= sigma;
    }
    h
}
