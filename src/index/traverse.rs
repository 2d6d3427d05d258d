use crate::index::esa::EsaIndex;
use crate::index::text::{MultiText, SeqPos};

/// 虚拟后缀树节点：SA 上的 lcp 区间 [begin, end)，rep_len 为节点深度
/// （区间内相邻后缀 LCP 的最小值）。节点从不物化成指针树。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcpInterval {
    pub rep_len: usize,
    pub begin: usize,
    pub end: usize,
}

/// 自底向上的后序遍历迭代器：单趟线性扫描 LCP 数组，
/// 显式栈保存 (lcp, 左边界) 帧，LCP 上升开帧、下降关帧。
/// 栈深等于树深而非文本长度；叶子不单独产出，根（lcp=0）不产出。
pub struct BottomUp<'a> {
    lcp: &'a [u32],
    n: usize,
    i: usize,
    lb: usize,
    stack: Vec<(usize, usize)>,
}

impl<'a> BottomUp<'a> {
    pub fn new(lcp: &'a [u32]) -> Self {
        Self { lcp, n: lcp.len(), i: 1, lb: 0, stack: vec![(0, 0)] }
    }
}

impl Iterator for BottomUp<'_> {
    type Item = LcpInterval;

    fn next(&mut self) -> Option<LcpInterval> {
        while self.i <= self.n {
            let l = if self.i < self.n { self.lcp[self.i] as usize } else { 0 };
            if let Some(&(top_l, top_lb)) = self.stack.last() {
                if top_l > l {
                    self.stack.pop();
                    self.lb = top_lb;
                    return Some(LcpInterval { rep_len: top_l, begin: top_lb, end: self.i });
                }
                if l > top_l {
                    self.stack.push((l, self.lb));
                }
            }
            self.i += 1;
            self.lb = self.i - 1;
        }
        None
    }
}

/// MUM：在每条序列中恰好出现一次、且左右均不可延伸的公共子串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mum {
    pub rep_len: usize,
    /// 每条序列一个出现位置，按序列号升序
    pub occurrences: Vec<SeqPos>,
}

/// 重复子串及其全部出现位置（supermax 枚举用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    pub rep_len: usize,
    pub occurrences: Vec<SeqPos>,
}

/// 极大重复节点：rep_len 深度下跨子节点、左字符互异的出现对计数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxRepeat {
    pub rep_len: usize,
    pub begin: usize,
    pub end: usize,
    pub pairs: u64,
}

/// 一个极大重复出现对
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatPair {
    pub rep_len: usize,
    pub a: SeqPos,
    pub b: SeqPos,
}

/// 左邻字符键：序列首没有前驱，赋予按序列唯一的负键，
/// 使边界出现天然与一切真实字符互异。
fn left_key(text: &MultiText, p: SeqPos) -> i64 {
    match text.left_char(p) {
        Some(c) => c as i64,
        None => -1 - p.seq as i64,
    }
}

/// 前驱字符不全相同（全相同则可整体左延，节点不左极大）
fn left_diverse(text: &MultiText, rows: &[SeqPos]) -> bool {
    let first = match text.left_char(rows[0]) {
        None => return true,
        Some(c) => c,
    };
    rows[1..].iter().any(|&p| text.left_char(p) != Some(first))
}

/// MUM 枚举：后序遍历中筛选出现次数 == 序列数、每序列恰一次、
/// rep_len ≥ min_len 且左极大的节点。右极大由分支节点性质自动保证。
pub fn mums(index: &EsaIndex, min_len: usize) -> Vec<Mum> {
    let min_len = min_len.max(1);
    let text = index.text();
    let m = text.num_seqs();
    let mut out = Vec::new();
    if m < 2 {
        return out;
    }
    for iv in BottomUp::new(index.lcp()) {
        if iv.rep_len < min_len || iv.end - iv.begin != m {
            continue;
        }
        let rows = &index.gsa()[iv.begin..iv.end];
        let mut seen = vec![false; m];
        let mut unique = true;
        for p in rows {
            let k = p.seq as usize;
            if seen[k] {
                unique = false;
                break;
            }
            seen[k] = true;
        }
        if !unique || !left_diverse(text, rows) {
            continue;
        }
        let mut occ = rows.to_vec();
        occ.sort_by_key(|p| p.seq);
        out.push(Mum { rep_len: iv.rep_len, occurrences: occ });
    }
    out
}

/// 超极大重复枚举：节点的所有子节点均为叶（任何右延伸至多出现一次）
/// 且区间内左邻字符两两互异（任何左延伸至多出现一次）。
pub fn supermax_repeats(index: &EsaIndex, min_len: usize) -> Vec<Repeat> {
    let min_len = min_len.max(1);
    let lcp = index.lcp();
    let n = lcp.len();
    let mut out = Vec::new();
    // (lcp, 左边界, 是否含内部子节点)
    let mut stack: Vec<(usize, usize, bool)> = vec![(0, 0, false)];
    let mut i = 1usize;
    while i <= n {
        let l = if i < n { lcp[i] as usize } else { 0 };
        let mut lb = i - 1;
        let mut popped = false;
        while stack.last().map_or(false, |f| f.0 > l) {
            let (tl, tlb, saw_node) = stack.pop().unwrap();
            lb = tlb;
            popped = true;
            if let Some(top) = stack.last_mut() {
                top.2 = true;
            }
            if !saw_node && tl >= min_len {
                let rows = &index.gsa()[tlb..i];
                if left_chars_pairwise_distinct(index.text(), rows) {
                    out.push(Repeat { rep_len: tl, occurrences: rows.to_vec() });
                }
            }
        }
        let top_l = stack.last().map_or(0, |f| f.0);
        if l > top_l {
            // 刚关掉的子节点归属于新开的帧
            stack.push((l, lb, popped));
        }
        i += 1;
    }
    out
}

fn left_chars_pairwise_distinct(text: &MultiText, rows: &[SeqPos]) -> bool {
    let mut keys: Vec<i64> = rows.iter().map(|&p| left_key(text, p)).collect();
    keys.sort_unstable();
    keys.windows(2).all(|w| w[0] != w[1])
}

/// Weiner 链分桶：左邻字符 → 计数，键升序
type Buckets = Vec<(i64, u64)>;

struct Summary {
    begin: usize,
    end: usize,
    buckets: Buckets,
}

fn bucket_total(b: &Buckets) -> u64 {
    b.iter().map(|x| x.1).sum()
}

/// 两个子分区间左字符互异的出现对数：总积减去同字符积
fn cross(a: &Buckets, b: &Buckets) -> u64 {
    let mut same = 0u64;
    let (mut x, mut y) = (0usize, 0usize);
    while x < a.len() && y < b.len() {
        match a[x].0.cmp(&b[y].0) {
            std::cmp::Ordering::Less => x += 1,
            std::cmp::Ordering::Greater => y += 1,
            std::cmp::Ordering::Equal => {
                same += a[x].1 * b[y].1;
                x += 1;
                y += 1;
            }
        }
    }
    bucket_total(a) * bucket_total(b) - same
}

fn merge_buckets(acc: &mut Buckets, add: Buckets) {
    let mut out = Vec::with_capacity(acc.len() + add.len());
    let (mut x, mut y) = (0usize, 0usize);
    while x < acc.len() || y < add.len() {
        if y >= add.len() || (x < acc.len() && acc[x].0 < add[y].0) {
            out.push(acc[x]);
            x += 1;
        } else if x >= acc.len() || add[y].0 < acc[x].0 {
            out.push(add[y]);
            y += 1;
        } else {
            out.push((acc[x].0, acc[x].1 + add[y].1));
            x += 1;
            y += 1;
        }
    }
    *acc = out;
}

/// 极大重复计数：后序遍历中逐子合并分桶，合并前统计跨子、
/// 左字符互异的出现对（即该节点深度下的极大重复对）。
pub fn max_repeats(index: &EsaIndex, min_len: usize) -> Vec<MaxRepeat> {
    let min_len = min_len.max(1);
    let text = index.text();
    let gsa = index.gsa();
    let mut pending: Vec<Summary> = Vec::new();
    let mut out = Vec::new();
    for iv in BottomUp::new(index.lcp()) {
        // 栈顶所有 begin ≥ iv.begin 的摘要即本节点的内部子节点
        let mut children: Vec<Summary> = Vec::new();
        while pending.last().map_or(false, |s| s.begin >= iv.begin) {
            children.push(pending.pop().unwrap());
        }
        children.reverse();

        let mut acc: Buckets = Vec::new();
        let mut pairs = 0u64;
        let mut row = iv.begin;
        let mut next = children.into_iter().peekable();
        while row < iv.end {
            if next.peek().map_or(false, |c| c.begin == row) {
                let c = next.next().unwrap();
                pairs += cross(&acc, &c.buckets);
                row = c.end;
                merge_buckets(&mut acc, c.buckets);
            } else {
                // 未被内部子节点覆盖的行是叶子
                let leaf: Buckets = vec![(left_key(text, gsa[row]), 1)];
                pairs += cross(&acc, &leaf);
                merge_buckets(&mut acc, leaf);
                row += 1;
            }
        }
        if iv.rep_len >= min_len && pairs > 0 {
            out.push(MaxRepeat { rep_len: iv.rep_len, begin: iv.begin, end: iv.end, pairs });
        }
        pending.push(Summary { begin: iv.begin, end: iv.end, buckets: acc });
    }
    out
}

/// 全部极大重复对的总数
pub fn count_repeats(index: &EsaIndex, min_len: usize) -> u64 {
    max_repeats(index, min_len).iter().map(|r| r.pairs).sum()
}

/// 极大重复对的显式枚举。输出规模与对数成正比，只宜用于
/// 小输入或已知对数可控的场景；大文本请用 `count_repeats`。
pub fn max_repeat_pairs(index: &EsaIndex, min_len: usize) -> Vec<RepeatPair> {
    let min_len = min_len.max(1);
    let text = index.text();
    let gsa = index.gsa();
    // 与 max_repeats 同构，但分桶携带具体位置
    struct PosSummary {
        begin: usize,
        end: usize,
        buckets: Vec<(i64, Vec<SeqPos>)>,
    }
    fn merge_pos(acc: &mut Vec<(i64, Vec<SeqPos>)>, add: Vec<(i64, Vec<SeqPos>)>) {
        for (k, mut v) in add {
            match acc.binary_search_by_key(&k, |x| x.0) {
                Ok(i) => acc[i].1.append(&mut v),
                Err(i) => acc.insert(i, (k, v)),
            }
        }
    }
    let mut pending: Vec<PosSummary> = Vec::new();
    let mut out = Vec::new();
    for iv in BottomUp::new(index.lcp()) {
        let mut children: Vec<PosSummary> = Vec::new();
        while pending.last().map_or(false, |s| s.begin >= iv.begin) {
            children.push(pending.pop().unwrap());
        }
        children.reverse();

        let mut acc: Vec<(i64, Vec<SeqPos>)> = Vec::new();
        let mut row = iv.begin;
        let mut next = children.into_iter().peekable();
        while row < iv.end {
            let child = if next.peek().map_or(false, |c| c.begin == row) {
                let c = next.next().unwrap();
                row = c.end;
                c.buckets
            } else {
                let b = vec![(left_key(text, gsa[row]), vec![gsa[row]])];
                row += 1;
                b
            };
            if iv.rep_len >= min_len {
                for (ka, va) in &acc {
                    for (kb, vb) in &child {
                        if ka != kb {
                            for &pa in va {
                                for &pb in vb {
                                    out.push(RepeatPair { rep_len: iv.rep_len, a: pa, b: pb });
                                }
                            }
                        }
                    }
                }
            }
            merge_pos(&mut acc, child);
        }
        pending.push(PosSummary { begin: iv.begin, end: iv.end, buckets: acc });
    }
    out
}
