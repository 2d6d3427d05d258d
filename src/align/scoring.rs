use crate::error::{Result, SeqanError};

/// 打分方案：序数对的稠密替换矩阵 + 仿射隙罚分。
/// 隙分数为加性负分：长度 L 的隙计 gap_open + (L-1)·gap_extend。
#[derive(Debug, Clone)]
pub struct Scoring {
    size: usize,
    table: Vec<i32>,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Scoring {
    /// 对角 match、其余 mismatch 的简单方案
    pub fn simple(size: usize, matc: i32, mismatch: i32, gap_open: i32, gap_extend: i32) -> Self {
        let mut table = vec![mismatch; size * size];
        for i in 0..size {
            table[i * size + i] = matc;
        }
        Self { size, table, gap_open, gap_extend }
    }

    pub fn from_matrix(size: usize, table: Vec<i32>, gap_open: i32, gap_extend: i32) -> Result<Self> {
        if table.len() != size * size {
            return Err(SeqanError::InvalidParams(format!(
                "substitution matrix needs {}x{} entries, got {}",
                size,
                size,
                table.len()
            )));
        }
        Ok(Self { size, table, gap_open, gap_extend })
    }

    /// BLOSUM62，按 `PROTEIN_SYMBOLS` 的序数顺序（含 X 行列，一律 -1）
    pub fn blosum62(gap_open: i32, gap_extend: i32) -> Self {
        const N: usize = 21;
        let mut table = vec![-1i32; N * N];
        for (i, row) in BLOSUM62.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                table[i * N + j] = v;
            }
        }
        Self { size: N, table, gap_open, gap_extend }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        self.table[a as usize * self.size + b as usize]
    }

    /// 单项改写（对称位置需要各自设置）
    pub fn set_score(&mut self, a: u8, b: u8, v: i32) {
        self.table[a as usize * self.size + b as usize] = v;
    }
}

/// 20x20 BLOSUM62 核心，行列顺序 A R N D C Q E G H I L K M F P S T W Y V
#[rustfmt::skip]
const BLOSUM62: [[i32; 20]; 20] = [
    [ 4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0],
    [-1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3],
    [-2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3],
    [-2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3],
    [ 0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1],
    [-1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2],
    [-1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2],
    [ 0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3],
    [-2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3],
    [-1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3],
    [-1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1],
    [-1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2],
    [-1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1],
    [-2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1],
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2],
    [ 1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2],
    [ 0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0],
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3],
    [-2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1],
    [ 0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4],
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::alphabet::Alphabet;

    #[test]
    fn simple_scheme() {
        let sc = Scoring::simple(4, 1, -1, -2, -1);
        assert_eq!(sc.score(0, 0), 1);
        assert_eq!(sc.score(0, 3), -1);
        assert_eq!(sc.gap_open, -2);
    }

    #[test]
    fn blosum62_spot_checks() {
        let sc = Scoring::blosum62(-11, -1);
        let ord = |c: u8| Alphabet::Protein.ordinal(c);
        assert_eq!(sc.score(ord(b'W'), ord(b'W')), 11);
        assert_eq!(sc.score(ord(b'A'), ord(b'A')), 4);
        assert_eq!(sc.score(ord(b'E'), ord(b'D')), 2);
        assert_eq!(sc.score(ord(b'W'), ord(b'C')), -2);
        assert_eq!(sc.score(ord(b'X'), ord(b'A')), -1);
        // 对称性
        for a in 0..21u8 {
            for b in 0..21u8 {
                assert_eq!(sc.score(a, b), sc.score(b, a));
            }
        }
    }

    #[test]
    fn from_matrix_validates_dimensions() {
        assert!(Scoring::from_matrix(3, vec![0; 8], -1, -1).is_err());
        assert!(Scoring::from_matrix(3, vec![0; 9], -1, -1).is_ok());
    }

    #[test]
    fn set_score_overrides_single_entry() {
        let mut sc = Scoring::simple(4, 1, -1, -2, -1);
        sc.set_score(1, 2, 5);
        assert_eq!(sc.score(1, 2), 5);
        assert_eq!(sc.score(2, 1), -1);
    }
}
