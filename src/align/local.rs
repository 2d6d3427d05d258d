use crate::align::cigar::ops_to_cigar;
use crate::align::global::{ext, NEG_INF};
use crate::align::scoring::Scoring;
use crate::align::{Band, LocalAlignment};
use crate::error::{Result, SeqanError};

#[derive(Debug, Clone, Copy)]
struct Island {
    best: i32,
    bi: usize,
    bj: usize,
}

/// 最优局部对齐（Smith-Waterman 仿射隙）
pub fn local_align(a: &[u8], b: &[u8], sc: &Scoring) -> LocalAlignment {
    local_align_topk(a, b, sc, None, 1)
        .ok()
        .and_then(|mut v| if v.is_empty() { None } else { Some(v.remove(0)) })
        .unwrap_or_default()
}

/// top-K 局部对齐。每个正分单元归属一个"岛"——延伸自同一起点的
/// 得分区域；岛号随胜出的前驱传播，新的正分起点开新岛。按岛取
/// 各自的峰值单元回溯，返回按分数降序的前 K 个。两条路径汇流时
/// 归并入先到的岛，因此相互重叠的次优对齐可能被峰值吸收。
pub fn local_align_topk(
    a: &[u8],
    b: &[u8],
    sc: &Scoring,
    band: Option<Band>,
    k: usize,
) -> Result<Vec<LocalAlignment>> {
    if let Some(bd) = band {
        if bd.lower > bd.upper {
            return Err(SeqanError::InvalidBand { lower: bd.lower, upper: bd.upper });
        }
    }
    let m = a.len();
    let n = b.len();
    if m == 0 || n == 0 || k == 0 {
        return Ok(Vec::new());
    }

    let cols = n + 1;
    let size = (m + 1) * cols;
    // h 的 0 既是矩阵边界也是"随处可以重新起步"的地板
    let mut h = vec![0i32; size];
    let mut e = vec![NEG_INF; size];
    let mut f = vec![NEG_INF; size];
    let mut island = vec![0u32; size];
    let mut islands: Vec<Island> = vec![Island { best: 0, bi: 0, bj: 0 }];
    let (lower, upper) = band.map_or((-(m as i64), n as i64), |bd| (bd.lower, bd.upper));
    let (go, ge) = (sc.gap_open, sc.gap_extend);

    for i in 1..=m {
        let j_lo = 1.max(i as i64 + lower);
        let j_hi = (n as i64).min(i as i64 + upper);
        if j_lo > j_hi {
            continue;
        }
        for j in j_lo as usize..=j_hi as usize {
            let idx = i * cols + j;
            let diag = idx - cols - 1;
            let up = idx - cols;
            let left = idx - 1;
            let e_val = ext(h[up], go).max(ext(e[up], ge));
            let f_val = ext(h[left], go).max(ext(f[left], ge));
            let d_val = ext(h[diag], sc.score(a[i - 1], b[j - 1]));
            let val = 0.max(d_val).max(e_val).max(f_val);
            h[idx] = val;
            e[idx] = e_val;
            f[idx] = f_val;
            if val == 0 {
                continue;
            }
            // 岛号从胜出的前驱继承，对角优先；从 0 起步的开新岛
            let id = if val == d_val {
                if island[diag] != 0 {
                    island[diag]
                } else {
                    islands.push(Island { best: 0, bi: 0, bj: 0 });
                    (islands.len() - 1) as u32
                }
            } else if val == e_val {
                island[up]
            } else {
                island[left]
            };
            island[idx] = id;
            let isl = &mut islands[id as usize];
            if val > isl.best {
                *isl = Island { best: val, bi: i, bj: j };
            }
        }
    }

    let mut order: Vec<usize> = (1..islands.len()).filter(|&i| islands[i].best > 0).collect();
    order.sort_by_key(|&i| (-(islands[i].best as i64), islands[i].bi, islands[i].bj));
    order.truncate(k);

    let eq = |x: i32, want: i32| x > NEG_INF / 2 && x == want;
    let mut out = Vec::with_capacity(order.len());
    for id in order {
        let Island { best, bi, bj } = islands[id];
        let mut ops: Vec<u8> = Vec::new();
        let (mut i, mut j) = (bi, bj);
        // 0 = 主状态，1 = 竖隙链，2 = 水平隙链
        let mut state = 0u8;
        loop {
            let idx = i * cols + j;
            match state {
                0 => {
                    if h[idx] == 0 {
                        break;
                    }
                    let d = idx - cols - 1;
                    if i > 0 && j > 0 && eq(ext(h[d], sc.score(a[i - 1], b[j - 1])), h[idx]) {
                        ops.push(b'M');
                        i -= 1;
                        j -= 1;
                    } else if eq(e[idx], h[idx]) {
                        state = 1;
                    } else {
                        state = 2;
                    }
                }
                1 => {
                    ops.push(b'I');
                    let cur = e[idx];
                    i -= 1;
                    let up = i * cols + j;
                    if !eq(ext(e[up], ge), cur) {
                        state = 0;
                    }
                }
                _ => {
                    ops.push(b'D');
                    let cur = f[idx];
                    j -= 1;
                    let left = i * cols + j;
                    if !eq(ext(f[left], ge), cur) {
                        state = 0;
                    }
                }
            }
        }
        ops.reverse();
        out.push(LocalAlignment {
            score: best,
            cigar: ops_to_cigar(&ops),
            query_start: i,
            query_end: bi,
            ref_start: j,
            ref_end: bj,
        });
    }
    Ok(out)
}
