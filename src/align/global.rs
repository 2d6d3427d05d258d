use crate::align::cigar::ops_to_cigar;
use crate::align::scoring::Scoring;
use crate::align::{gap_run, AlignConfig, Alignment, Band};
use crate::error::{Result, SeqanError};

/// 负无穷哨兵：取 i32::MIN/4 而非 MIN，留出加法余量避免回绕
pub(crate) const NEG_INF: i32 = i32::MIN / 4;

/// 受保护的加法：已穷尽的状态保持穷尽
#[inline]
pub(crate) fn ext(x: i32, d: i32) -> i32 {
    if x <= NEG_INF / 2 {
        NEG_INF
    } else {
        x + d
    }
}

#[inline]
fn max3(a: i32, b: i32, c: i32) -> i32 {
    a.max(b).max(c)
}

/// 可复用的 DP 缓冲：三张展平矩阵（对角 / 水平隙 / 竖直隙）
pub struct DpBuffer {
    mm: Vec<i32>,
    hh: Vec<i32>,
    vv: Vec<i32>,
}

impl DpBuffer {
    pub fn new() -> Self {
        Self { mm: Vec::new(), hh: Vec::new(), vv: Vec::new() }
    }

    fn reset(&mut self, size: usize) {
        self.mm.clear();
        self.mm.resize(size, NEG_INF);
        self.hh.clear();
        self.hh.resize(size, NEG_INF);
        self.vv.clear();
        self.vv.resize(size, NEG_INF);
    }
}

impl Default for DpBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Diag,
    Horiz,
    Vert,
}

/// Gotoh 仿射隙全局对齐。a 在矩阵竖轴、b 在横轴；
/// 自由端隙由 `cfg` 在运行时决定，带约束由 `band` 给出（None = 全矩阵）。
/// 回溯不存方向矩阵，而是按 DP 递推逐格重比较。
pub fn global_align(
    a: &[u8],
    b: &[u8],
    sc: &Scoring,
    cfg: AlignConfig,
    band: Option<Band>,
) -> Result<Alignment> {
    global_align_with_buf(a, b, sc, cfg, band, &mut DpBuffer::new())
}

pub fn global_align_with_buf(
    a: &[u8],
    b: &[u8],
    sc: &Scoring,
    cfg: AlignConfig,
    band: Option<Band>,
    buf: &mut DpBuffer,
) -> Result<Alignment> {
    let m = a.len();
    let n = b.len();

    // 带校验先行：必须同时覆盖起点对角线 0 和终点对角线 n-m
    if let Some(bd) = band {
        let end_diag = n as i64 - m as i64;
        if bd.lower > bd.upper
            || bd.lower > 0
            || bd.upper < 0
            || bd.lower > end_diag
            || bd.upper < end_diag
        {
            return Err(SeqanError::InvalidBand { lower: bd.lower, upper: bd.upper });
        }
    }

    // 退化输入：纯隙对齐，不摊开矩阵
    if m == 0 || n == 0 {
        if m == 0 && n == 0 {
            return Ok(Alignment { score: 0, cigar: String::new() });
        }
        return Ok(if m == 0 {
            let free = cfg.free_top || cfg.free_bottom;
            Alignment {
                score: if free { 0 } else { gap_run(sc, n) },
                cigar: format!("{}D", n),
            }
        } else {
            let free = cfg.free_left || cfg.free_right;
            Alignment {
                score: if free { 0 } else { gap_run(sc, m) },
                cigar: format!("{}I", m),
            }
        });
    }

    let cols = n + 1;
    buf.reset((m + 1) * cols);
    let (mm, hh, vv) = (&mut buf.mm, &mut buf.hh, &mut buf.vv);
    let (lower, upper) = band.map_or((-(m as i64), n as i64), |bd| (bd.lower, bd.upper));
    let (go, ge) = (sc.gap_open, sc.gap_extend);

    mm[0] = 0;
    for j in 1..=n.min(upper as usize) {
        hh[j] = if cfg.free_top { 0 } else { gap_run(sc, j) };
    }
    for i in 1..=m.min((-lower) as usize) {
        vv[i * cols] = if cfg.free_left { 0 } else { gap_run(sc, i) };
    }

    for i in 1..=m {
        let j_lo = 1.max(i as i64 + lower) as usize;
        let j_hi = n.min((i as i64 + upper) as usize);
        for j in j_lo..=j_hi {
            let idx = i * cols + j;
            let diag = idx - cols - 1;
            let up = idx - cols;
            let left = idx - 1;
            mm[idx] = ext(max3(mm[diag], hh[diag], vv[diag]), sc.score(a[i - 1], b[j - 1]));
            hh[idx] = ext(mm[left].max(vv[left]), go).max(ext(hh[left], ge));
            vv[idx] = ext(mm[up].max(hh[up]), go).max(ext(vv[up], ge));
        }
    }

    // 终点：右下角，或在自由的末行/末列上取最优
    let best3 = |i: usize, j: usize| {
        let idx = i * cols + j;
        max3(mm[idx], hh[idx], vv[idx])
    };
    let (mut ei, mut ej) = (m, n);
    let mut best = best3(m, n);
    if cfg.free_bottom {
        for j in 0..=n {
            if best3(m, j) > best {
                best = best3(m, j);
                ei = m;
                ej = j;
            }
        }
    }
    if cfg.free_right {
        for i in 0..=m {
            if best3(i, n) > best {
                best = best3(i, n);
                ei = i;
                ej = n;
            }
        }
    }

    // 回溯（逆序累积操作）：先补上自由端的尾随隙段
    let mut ops: Vec<u8> = Vec::with_capacity(m + n);
    for _ in ej..n {
        ops.push(b'D');
    }
    for _ in ei..m {
        ops.push(b'I');
    }
    let (mut i, mut j) = (ei, ej);
    let idx = i * cols + j;
    let mut state = if mm[idx] >= hh[idx] && mm[idx] >= vv[idx] {
        State::Diag
    } else if hh[idx] >= vv[idx] {
        State::Horiz
    } else {
        State::Vert
    };
    let eq = |x: i32, want: i32| x > NEG_INF / 2 && x == want;
    while i > 0 && j > 0 {
        let idx = i * cols + j;
        match state {
            State::Diag => {
                ops.push(b'M');
                let want = mm[idx] - sc.score(a[i - 1], b[j - 1]);
                i -= 1;
                j -= 1;
                let d = i * cols + j;
                state = if eq(mm[d], want) {
                    State::Diag
                } else if eq(hh[d], want) {
                    State::Horiz
                } else {
                    State::Vert
                };
            }
            State::Horiz => {
                ops.push(b'D');
                let cur = hh[idx];
                j -= 1;
                let l = i * cols + j;
                state = if eq(ext(hh[l], ge), cur) {
                    State::Horiz
                } else if eq(ext(mm[l], go), cur) {
                    State::Diag
                } else {
                    State::Vert
                };
            }
            State::Vert => {
                ops.push(b'I');
                let cur = vv[idx];
                i -= 1;
                let u = i * cols + j;
                state = if eq(ext(vv[u], ge), cur) {
                    State::Vert
                } else if eq(ext(mm[u], go), cur) {
                    State::Diag
                } else {
                    State::Horiz
                };
            }
        }
    }
    // 首行/首列上剩余的前导隙段
    for _ in 0..j {
        ops.push(b'D');
    }
    for _ in 0..i {
        ops.push(b'I');
    }
    ops.reverse();

    Ok(Alignment { score: best, cigar: ops_to_cigar(&ops) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::cigar::replay_score;

    /// 独立参考实现：同一套约定的三矩阵 Gotoh，仅算分不回溯
    fn ref_score(a: &[u8], b: &[u8], sc: &Scoring, cfg: AlignConfig) -> i32 {
        const NI: i64 = i64::MIN / 4;
        let ext = |x: i64, d: i64| if x <= NI / 2 { NI } else { x + d };
        let (m, n) = (a.len(), b.len());
        let mut mm = vec![vec![NI; n + 1]; m + 1];
        let mut hh = vec![vec![NI; n + 1]; m + 1];
        let mut vv = vec![vec![NI; n + 1]; m + 1];
        mm[0][0] = 0;
        for j in 1..=n {
            hh[0][j] = if cfg.free_top { 0 } else { gap_run(sc, j) as i64 };
        }
        for i in 1..=m {
            vv[i][0] = if cfg.free_left { 0 } else { gap_run(sc, i) as i64 };
        }
        for i in 1..=m {
            for j in 1..=n {
                let d = mm[i - 1][j - 1].max(hh[i - 1][j - 1]).max(vv[i - 1][j - 1]);
                mm[i][j] = ext(d, sc.score(a[i - 1], b[j - 1]) as i64);
                hh[i][j] = ext(mm[i][j - 1].max(vv[i][j - 1]), sc.gap_open as i64)
                    .max(ext(hh[i][j - 1], sc.gap_extend as i64));
                vv[i][j] = ext(mm[i - 1][j].max(hh[i - 1][j]), sc.gap_open as i64)
                    .max(ext(vv[i - 1][j], sc.gap_extend as i64));
            }
        }
        let best3 = |i: usize, j: usize| mm[i][j].max(hh[i][j]).max(vv[i][j]);
        let mut best = best3(m, n);
        if cfg.free_bottom {
            for j in 0..=n {
                best = best.max(best3(m, j));
            }
        }
        if cfg.free_right {
            for i in 0..=m {
                best = best.max(best3(i, n));
            }
        }
        best as i32
    }

    fn lcg_ords(len: usize, seed: u32) -> Vec<u8> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((x >> 16) % 4) as u8
            })
            .collect()
    }

    fn all_configs() -> Vec<AlignConfig> {
        (0..16u8)
            .map(|bits| AlignConfig {
                free_top: bits & 1 != 0,
                free_left: bits & 2 != 0,
                free_right: bits & 4 != 0,
                free_bottom: bits & 8 != 0,
            })
            .collect()
    }

    #[test]
    fn identical_sequences_align_all_match() {
        let sc = Scoring::simple(4, 1, -1, -2, -1);
        let a = [0u8, 1, 2, 3, 0];
        let got = global_align(&a, &a, &sc, AlignConfig::none(), None).unwrap();
        assert_eq!(got.score, 5);
        assert_eq!(got.cigar, "5M");
    }

    #[test]
    fn single_gap_in_shorter_sequence() {
        let sc = Scoring::simple(4, 1, -1, -2, -1);
        // a = ACGT, b = ACT: G 处在 b 中开隙
        let a = [0u8, 1, 2, 3];
        let b = [0u8, 1, 3];
        let got = global_align(&a, &b, &sc, AlignConfig::none(), None).unwrap();
        assert_eq!(got.score, 1);
        assert_eq!(got.cigar, "2M1I1M");
    }

    #[test]
    fn gattaca_score_matches_reference_and_replays() {
        let dna = crate::util::alphabet::Alphabet::Dna;
        let a = dna.encode(b"GATTACA");
        let b = dna.encode(b"GCATGCU");
        let sc = Scoring::simple(4, 1, -1, -2, -1);
        for cfg in all_configs() {
            let got = global_align(&a, &b, &sc, cfg, None).unwrap();
            assert_eq!(got.score, ref_score(&a, &b, &sc, cfg), "cfg={:?}", cfg);
            assert_eq!(
                replay_score(&got.cigar, &a, &b, &sc, cfg).unwrap(),
                got.score,
                "cfg={:?} cigar={}",
                cfg,
                got.cigar
            );
        }
    }

    #[test]
    fn all_free_end_combinations_match_reference_on_random_pairs() {
        let sc = Scoring::simple(4, 2, -2, -3, -1);
        for seed in [1u32, 17, 333] {
            let a = lcg_ords(23, seed);
            let b = lcg_ords(31, seed.wrapping_mul(13));
            for cfg in all_configs() {
                let got = global_align(&a, &b, &sc, cfg, None).unwrap();
                assert_eq!(got.score, ref_score(&a, &b, &sc, cfg), "seed={} cfg={:?}", seed, cfg);
                assert_eq!(replay_score(&got.cigar, &a, &b, &sc, cfg).unwrap(), got.score);
            }
        }
    }

    #[test]
    fn covering_band_equals_unbanded() {
        let sc = Scoring::simple(4, 1, -1, -2, -1);
        let a = lcg_ords(40, 7);
        let b = lcg_ords(35, 91);
        let full = Band::new(-(a.len() as i64), b.len() as i64);
        for cfg in all_configs() {
            let unbanded = global_align(&a, &b, &sc, cfg, None).unwrap();
            let banded = global_align(&a, &b, &sc, cfg, Some(full)).unwrap();
            assert_eq!(banded.score, unbanded.score, "cfg={:?}", cfg);
        }
    }

    #[test]
    fn narrow_band_result_is_a_valid_alignment() {
        let sc = Scoring::simple(4, 1, -1, -2, -1);
        let a = lcg_ords(50, 3);
        let b = lcg_ords(46, 71);
        let band = Band::new(-8, 4);
        let cfg = AlignConfig::none();
        let banded = global_align(&a, &b, &sc, cfg, Some(band)).unwrap();
        let unbanded = global_align(&a, &b, &sc, cfg, None).unwrap();
        assert!(banded.score <= unbanded.score);
        assert_eq!(replay_score(&banded.cigar, &a, &b, &sc, cfg).unwrap(), banded.score);
    }

    #[test]
    fn invalid_bands_are_rejected_before_filling() {
        let sc = Scoring::simple(4, 1, -1, -2, -1);
        let a = lcg_ords(10, 1);
        let b = lcg_ords(14, 2); // end_diag = 4
        for bd in [
            Band::new(1, 5),   // 不含 0
            Band::new(-5, -1), // 不含 0 也不含 4
            Band::new(-3, 2),  // 不含 4
            Band::new(3, -3),  // lower > upper
        ] {
            assert!(matches!(
                global_align(&a, &b, &sc, AlignConfig::none(), Some(bd)),
                Err(SeqanError::InvalidBand { .. })
            ));
        }
        assert!(global_align(&a, &b, &sc, AlignConfig::none(), Some(Band::new(-2, 4))).is_ok());
    }

    #[test]
    fn empty_inputs_are_pure_gap_alignments() {
        let sc = Scoring::simple(4, 1, -1, -2, -1);
        let e: [u8; 0] = [];
        let b = [0u8, 1, 2];
        let got = global_align(&e, &b, &sc, AlignConfig::none(), None).unwrap();
        assert_eq!(got.score, gap_run(&sc, 3));
        assert_eq!(got.cigar, "3D");
        let free = global_align(
            &e,
            &b,
            &sc,
            AlignConfig { free_top: true, ..AlignConfig::none() },
            None,
        )
        .unwrap();
        assert_eq!(free.score, 0);
        let both = global_align(&e, &e, &sc, AlignConfig::none(), None).unwrap();
        assert_eq!(both.score, 0);
        assert_eq!(both.cigar, "");
    }

    #[test]
    fn affine_gaps_prefer_one_long_gap() {
        // 开隙贵、延隙便宜：两个单隙应并成一个长隙
        let sc = Scoring::simple(4, 1, -2, -5, -1);
        let a = [0u8, 1, 2, 3, 0, 1];
        let b = [0u8, 1, 0, 1];
        let got = global_align(&a, &b, &sc, AlignConfig::none(), None).unwrap();
        assert_eq!(got.cigar, "2M2I2M");
        assert_eq!(got.score, 4 + gap_run(&sc, 2));
    }
}
