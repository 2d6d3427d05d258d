use std::cmp::Ordering;

/// DC7 差分覆盖：残差类 {1, 2, 4} mod 7
const DC7: [bool; 7] = [false, true, true, false, true, false, false];

/// 残差类对 (a, b) 的比较步长表：最小的 d，使得 (a+d) 与 (b+d) 同时落在样本类中。
/// 归并比较最多看 d ≤ 6 个字符，随后用一个已知样本秩收尾。
const DC7_DELTA: [[usize; 7]; 7] = [
    [1, 1, 2, 1, 4, 4, 2],
    [1, 0, 0, 1, 0, 3, 3],
    [2, 0, 0, 6, 0, 6, 2],
    [1, 1, 6, 1, 5, 6, 5],
    [4, 0, 0, 5, 0, 4, 5],
    [4, 3, 6, 6, 4, 3, 3],
    [2, 3, 2, 5, 5, 3, 2],
];

/// 低于该长度直接朴素排序，递归到此为止
const NAIVE_CUTOFF: usize = 50;

/// Skew-7 后缀数组构建。
///
/// 约定：顶层输入的符号值必须 ≥ 1；0 由递归内部保留作类块分隔符和
/// 越界填充。多序列场景由调用方（`esa`）注入每条序列唯一的哨兵符号，
/// 这同时保证了任意两个后缀在填充语义下可区分。
pub fn suffix_array(text: &[u32]) -> Vec<u32> {
    debug_assert!(text.iter().all(|&c| c >= 1));
    dc7(text)
}

fn dc7(text: &[u32]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    if n < NAIVE_CUTOFF {
        let mut sa: Vec<u32> = (0..n as u32).collect();
        sa.sort_unstable_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
        return sa;
    }

    // 1. 采样：类 1、2、4，按类分块、块内位置升序
    let mut sample: Vec<u32> = Vec::with_capacity(3 * n / 7 + 3);
    for class in [1usize, 2, 4] {
        let mut i = class;
        while i < n {
            sample.push(i as u32);
            i += 7;
        }
    }

    // 2. 七元组排序
    let mut sorted = sample.clone();
    sorted.sort_unstable_by(|&a, &b| cmp_heptet(text, a as usize, b as usize));

    // 3. 命名
    let mut name_of = vec![0u32; n];
    let mut names = 1u32;
    name_of[sorted[0] as usize] = 1;
    for w in 1..sorted.len() {
        if cmp_heptet(text, sorted[w - 1] as usize, sorted[w] as usize) != Ordering::Equal {
            names += 1;
        }
        name_of[sorted[w] as usize] = names;
    }

    // 样本秩；多出的 7 个槽位让 a+d 的查表无需边界判断（越界 = 秩 0 = 已穷尽）
    let mut rank = vec![0u32; n + 7];
    if (names as usize) == sorted.len() {
        // 名字唯一：七元组排序已经是样本后缀的全序
        for &p in &sample {
            rank[p as usize] = name_of[p as usize];
        }
    } else {
        // 递归：改名串按类分块，块间插入显式分隔符 0，
        // 使递归串的后缀比较不会越过类块边界产生错序
        let mut rec: Vec<u32> = Vec::with_capacity(sample.len() + 3);
        let mut pos_of: Vec<u32> = Vec::with_capacity(sample.len() + 3);
        for class in [1usize, 2, 4] {
            let mut i = class;
            while i < n {
                rec.push(name_of[i]);
                pos_of.push(i as u32);
                i += 7;
            }
            rec.push(0);
            pos_of.push(u32::MAX);
        }
        let rec_sa = dc7(&rec);
        let mut r = 1u32;
        for &ri in &rec_sa {
            let p = pos_of[ri as usize];
            if p != u32::MAX {
                rank[p as usize] = r;
                r += 1;
            }
        }
    }

    // 4. 非样本类 0/3/5/6：各自分区排序（≤6 个字符 + 一个样本秩）
    let mut lists: Vec<Vec<u32>> = Vec::with_capacity(5);
    for class in [0usize, 3, 5, 6] {
        let mut part: Vec<u32> = Vec::with_capacity(n / 7 + 1);
        let mut i = class;
        while i < n {
            part.push(i as u32);
            i += 7;
        }
        part.sort_unstable_by(|&a, &b| cmp_suffix(text, &rank, a as usize, b as usize));
        lists.push(part);
    }

    // 样本分区按秩排序即得
    let mut by_rank = sample;
    by_rank.sort_unstable_by_key(|&p| rank[p as usize]);
    lists.push(by_rank);

    // 5. 五路归并
    let mut cursors = [0usize; 5];
    let mut sa = Vec::with_capacity(n);
    for _ in 0..n {
        let mut best: Option<usize> = None;
        for l in 0..5 {
            if cursors[l] >= lists[l].len() {
                continue;
            }
            best = match best {
                None => Some(l),
                Some(bl) => {
                    let a = lists[l][cursors[l]] as usize;
                    let b = lists[bl][cursors[bl]] as usize;
                    if cmp_suffix(text, &rank, a, b) == Ordering::Less {
                        Some(l)
                    } else {
                        Some(bl)
                    }
                }
            };
        }
        let bl = best.expect("five-way merge exhausted early");
        sa.push(lists[bl][cursors[bl]]);
        cursors[bl] += 1;
    }
    sa
}

#[inline]
fn char_at(text: &[u32], i: usize) -> u32 {
    if i < text.len() {
        text[i]
    } else {
        0
    }
}

fn cmp_heptet(text: &[u32], a: usize, b: usize) -> Ordering {
    for k in 0..7 {
        let ca = char_at(text, a + k);
        let cb = char_at(text, b + k);
        if ca != cb {
            return ca.cmp(&cb);
        }
    }
    Ordering::Equal
}

/// 任意两个后缀的 O(1) 比较：查表取步长 d，比较至多 d 个字符，
/// 再用 (a+d, b+d) 处的样本秩收尾。
fn cmp_suffix(text: &[u32], rank: &[u32], a: usize, b: usize) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let d = DC7_DELTA[a % 7][b % 7];
    debug_assert!(DC7[(a + d) % 7] && DC7[(b + d) % 7]);
    for k in 0..d {
        let ca = char_at(text, a + k);
        let cb = char_at(text, b + k);
        if ca != cb {
            return ca.cmp(&cb);
        }
    }
    rank[a + d].cmp(&rank[b + d])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_sa(text: &[u32]) -> Vec<u32> {
        let n = text.len();
        let mut sa: Vec<u32> = (0..n as u32).collect();
        sa.sort_by(|&a, &b| text[a as usize..].cmp(&text[b as usize..]));
        sa
    }

    fn make_text(len: usize, sigma: u32, seed: u32) -> Vec<u32> {
        let mut x = seed;
        let mut v = Vec::with_capacity(len);
        for _ in 0..len {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            v.push(1 + (x >> 16) % sigma);
        }
        v
    }

    #[test]
    fn sa_empty() {
        assert!(suffix_array(&[]).is_empty());
    }

    #[test]
    fn sa_basic() {
        // A C G T -> 2 3 4 5, 哨兵 1 结尾
        let text = [2u32, 3, 4, 5, 1];
        assert_eq!(suffix_array(&text), vec![4, 0, 1, 2, 3]);
    }

    #[test]
    fn sa_matches_naive_on_small_random_texts() {
        for len in 1..=40 {
            for seed in [7u32, 1_234_567, 42] {
                let text = make_text(len, 4, seed);
                assert_eq!(suffix_array(&text), naive_sa(&text), "len={} seed={}", len, seed);
            }
        }
    }

    #[test]
    fn sa_matches_naive_above_cutoff() {
        for len in [NAIVE_CUTOFF, 70, 113, 200, 500] {
            for sigma in [2u32, 4, 20] {
                let text = make_text(len, sigma, len as u32 * 31 + sigma);
                assert_eq!(suffix_array(&text), naive_sa(&text), "len={} sigma={}", len, sigma);
            }
        }
    }

    #[test]
    fn sa_handles_long_runs() {
        // 低复杂度文本逼出递归分支：名字大量重复
        let mut text = vec![2u32; 300];
        text.extend_from_slice(&[3; 200]);
        for (i, t) in text.iter_mut().enumerate() {
            if i % 53 == 0 {
                *t = 4;
            }
        }
        text.push(1);
        assert_eq!(suffix_array(&text), naive_sa(&text));
    }

    #[test]
    fn sa_periodic_text() {
        let mut text: Vec<u32> = (0..400).map(|i| 2 + (i % 3) as u32).collect();
        text.push(1);
        assert_eq!(suffix_array(&text), naive_sa(&text));
    }
}
