use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqanError};
use crate::index::{lcp, skew7};
use crate::index::text::{MultiText, SeqPos};
use crate::util::alphabet::Alphabet;

/// 索引构建的出处信息（来源文件、命令行、时间戳），随索引一并落盘
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub source_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// 增强后缀数组索引：广义后缀数组（(seqId, localPos) 对）+ LCP 数组。
///
/// 构建时给第 k 条序列追加唯一哨兵符号 m-k（小于一切常规符号、随 k 递减），
/// 这一编码恰好实现跨序列边界的比较规则：后缀不会与自己序列之外的内容
/// 比较，公共前缀耗尽时先按剩余长度（短者在前）、再按序列号降序定序。
/// SA、LCP 与文本同生共灭：重建文本即重建全部纤维。
#[derive(Debug, Serialize, Deserialize)]
pub struct EsaIndex {
    text: MultiText,
    gsa: Vec<SeqPos>,
    lcp: Vec<u32>,
    meta: IndexMeta,
}

impl EsaIndex {
    /// 从原始字节序列集合构建（编码 + SA + LCP）
    pub fn from_seqs(seqs: &[&[u8]], alphabet: Alphabet) -> Result<Self> {
        Self::build(MultiText::from_seqs(seqs, alphabet)?)
    }

    pub fn build(text: MultiText) -> Result<Self> {
        let m = text.num_seqs();
        if m == 0 {
            return Err(SeqanError::EmptyInput);
        }
        let n = text.total_len();

        // 哨兵文本：常规符号整体上移 m+1，序列 k 以唯一哨兵 m-k 结尾
        let shift = m as u32 + 1;
        let mut st: Vec<u32> = Vec::with_capacity(n + m);
        for k in 0..m {
            st.extend(text.seq(k).iter().map(|&o| o as u32 + shift));
            st.push((m - k) as u32);
        }

        let sa = skew7::suffix_array(&st);
        let lcp_all = lcp::kasai(&st, &sa);

        // 哨兵后缀首字符最小且互不相同，必然占据 SA 的前 m 项
        let mut gsa = Vec::with_capacity(n);
        let mut lcp = Vec::with_capacity(n);
        for r in m..sa.len() {
            gsa.push(Self::locate_skew(&text, sa[r] as usize));
            lcp.push(lcp_all[r]);
        }
        debug_assert!(lcp.first().map_or(true, |&l| l == 0));

        Ok(Self { text, gsa, lcp, meta: IndexMeta::default() })
    }

    /// 哨兵文本位置 → (seqId, localPos)。
    /// 序列 k 在哨兵文本中占据 [limits[k]+k, limits[k+1]+k)。
    fn locate_skew(text: &MultiText, s: usize) -> SeqPos {
        let limits = text.limits();
        let m = text.num_seqs();
        let mut lo = 0usize;
        let mut hi = m;
        while lo < hi {
            let mid = (lo + hi) / 2;
            if s >= limits[mid + 1] as usize + mid + 1 {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let local = s - limits[lo] as usize - lo;
        debug_assert!(local < text.seq_len(lo), "sentinel position in GSA");
        SeqPos::new(lo as u32, local as u32)
    }

    pub fn text(&self) -> &MultiText {
        &self.text
    }

    /// 广义后缀数组（按后缀字典序）
    pub fn gsa(&self) -> &[SeqPos] {
        &self.gsa
    }

    /// 相邻后缀的最长公共前缀长度；lcp[0] = 0
    pub fn lcp(&self) -> &[u32] {
        &self.lcp
    }

    pub fn len(&self) -> usize {
        self.gsa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gsa.is_empty()
    }

    /// 第 r 个后缀的序数切片（到所属序列末尾为止）
    pub fn suffix(&self, r: usize) -> &[u8] {
        self.text.suffix(self.gsa[r])
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = meta;
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let mut f = std::fs::File::create(path)?;
        bincode::serialize_into(&mut f, self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let idx: Self = bincode::deserialize_from(f)?;
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    /// 参考实现：逐对比较后缀切片，等长同内容时按序列号降序
    fn brute_gsa(text: &MultiText) -> Vec<SeqPos> {
        let mut all: Vec<SeqPos> = Vec::new();
        for k in 0..text.num_seqs() {
            for i in 0..text.seq_len(k) {
                all.push(SeqPos::new(k as u32, i as u32));
            }
        }
        all.sort_by(|&a, &b| match text.suffix(a).cmp(text.suffix(b)) {
            Ordering::Equal => b.seq.cmp(&a.seq),
            o => o,
        });
        all
    }

    fn brute_lcp(text: &MultiText, gsa: &[SeqPos]) -> Vec<u32> {
        let mut lcp = vec![0u32; gsa.len()];
        for r in 1..gsa.len() {
            let a = text.suffix(gsa[r - 1]);
            let b = text.suffix(gsa[r]);
            lcp[r] = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count() as u32;
        }
        lcp
    }

    fn lcg_seq(len: usize, seed: u32) -> Vec<u8> {
        let bases = [b'A', b'C', b'G', b'T'];
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                bases[(x >> 16) as usize % 4]
            })
            .collect()
    }

    #[test]
    fn empty_set_is_rejected() {
        assert!(matches!(
            EsaIndex::from_seqs(&[], Alphabet::Dna5),
            Err(SeqanError::EmptyInput)
        ));
    }

    #[test]
    fn all_empty_sequences_give_empty_index() {
        let idx = EsaIndex::from_seqs(&[b"", b""], Alphabet::Dna5).unwrap();
        assert!(idx.is_empty());
        assert!(idx.lcp().is_empty());
    }

    #[test]
    fn single_sequence_matches_brute_force() {
        let idx = EsaIndex::from_seqs(&[b"MISSISSIPPI"], Alphabet::Byte).unwrap();
        assert_eq!(idx.gsa(), brute_gsa(idx.text()).as_slice());
        assert_eq!(idx.lcp(), brute_lcp(idx.text(), idx.gsa()).as_slice());
    }

    #[test]
    fn multi_sequence_matches_brute_force() {
        let s1 = lcg_seq(120, 11);
        let s2 = lcg_seq(75, 22);
        let s3 = lcg_seq(40, 33);
        let idx =
            EsaIndex::from_seqs(&[&s1, &s2, &s3], Alphabet::Dna5).unwrap();
        assert_eq!(idx.len(), 235);
        assert_eq!(idx.gsa(), brute_gsa(idx.text()).as_slice());
        assert_eq!(idx.lcp(), brute_lcp(idx.text(), idx.gsa()).as_slice());
    }

    #[test]
    fn identical_sequences_tie_break_by_seq_desc() {
        // 两条相同序列：同内容后缀必须按序列号降序排列
        let idx = EsaIndex::from_seqs(&[b"ACAC", b"ACAC"], Alphabet::Dna).unwrap();
        assert_eq!(idx.gsa(), brute_gsa(idx.text()).as_slice());
        for r in 1..idx.len() {
            let a = idx.gsa()[r - 1];
            let b = idx.gsa()[r];
            if idx.text().suffix(a) == idx.text().suffix(b) {
                assert!(a.seq > b.seq, "tie at rank {}", r);
            }
        }
    }

    #[test]
    fn save_load_roundtrip() {
        let idx = EsaIndex::from_seqs(&[b"ACGTACGT", b"TTTT"], Alphabet::Dna5).unwrap();
        let dir = std::env::temp_dir().join("seqan_rust_esa_test.esa");
        let path = dir.to_str().unwrap();
        idx.save_to_file(path).unwrap();
        let back = EsaIndex::load_from_file(path).unwrap();
        assert_eq!(back.gsa(), idx.gsa());
        assert_eq!(back.lcp(), idx.lcp());
        let _ = std::fs::remove_file(path);
    }
}
