/// Kasai 线性 LCP 构建：lcp[r] = SA[r-1] 与 SA[r] 两个后缀的最长公共前缀长度，
/// lcp[0] = 0。利用 h 每步至多减一的性质做 O(n) 扫描。
pub fn kasai(text: &[u32], sa: &[u32]) -> Vec<u32> {
    let n = text.len();
    debug_assert_eq!(sa.len(), n);
    let mut rank = vec![0u32; n];
    for (r, &p) in sa.iter().enumerate() {
        rank[p as usize] = r as u32;
    }
    let mut lcp = vec![0u32; n];
    let mut h = 0usize;
    for p in 0..n {
        let r = rank[p] as usize;
        if r == 0 {
            h = 0;
            continue;
        }
        let q = sa[r - 1] as usize;
        while p + h < n && q + h < n && text[p + h] == text[q + h] {
            h += 1;
        }
        lcp[r] = h as u32;
        h = h.saturating_sub(1);
    }
    lcp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::skew7::suffix_array;

    fn brute_lcp(text: &[u32], sa: &[u32]) -> Vec<u32> {
        let mut lcp = vec![0u32; sa.len()];
        for r in 1..sa.len() {
            let a = &text[sa[r - 1] as usize..];
            let b = &text[sa[r] as usize..];
            lcp[r] = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count() as u32;
        }
        lcp
    }

    #[test]
    fn kasai_matches_brute_force() {
        let mut x = 99u32;
        for len in [1usize, 2, 13, 60, 180] {
            let text: Vec<u32> = (0..len)
                .map(|_| {
                    x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                    1 + (x >> 16) % 3
                })
                .collect();
            let sa = suffix_array(&text);
            assert_eq!(kasai(&text, &sa), brute_lcp(&text, &sa), "len={}", len);
        }
    }
}
