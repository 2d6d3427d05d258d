use serde::{Deserialize, Serialize};

/// 氨基酸字母表的符号顺序（BLOSUM 行列顺序），外加 X 表示未知残基。
pub const PROTEIN_SYMBOLS: &[u8; 21] = b"ARNDCQEGHILKMFPSTWYVX";

/// 固定字母表：一次性解析成序数编码，内层循环不再做字符分发。
///
/// - `Dna`：{A,C,G,T}，其他字符并入 A（建议对含 N 的数据用 `Dna5`）
/// - `Dna5`：{A,C,G,T,N}，未知字符并入 N
/// - `Protein`：20 种氨基酸 + X
/// - `Byte`：原始字节，序数即字节值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alphabet {
    Dna,
    Dna5,
    Protein,
    Byte,
}

impl Alphabet {
    /// 字母表大小（序数取值范围 [0, size)）
    pub fn size(self) -> usize {
        match self {
            Alphabet::Dna => 4,
            Alphabet::Dna5 => 5,
            Alphabet::Protein => 21,
            Alphabet::Byte => 256,
        }
    }

    /// 字符 → 序数
    #[inline]
    pub fn ordinal(self, b: u8) -> u8 {
        match self {
            Alphabet::Dna => match b.to_ascii_uppercase() {
                b'A' => 0,
                b'C' => 1,
                b'G' => 2,
                b'T' | b'U' => 3,
                _ => 0,
            },
            Alphabet::Dna5 => match b.to_ascii_uppercase() {
                b'A' => 0,
                b'C' => 1,
                b'G' => 2,
                b'T' | b'U' => 3,
                _ => 4, // map others to N
            },
            Alphabet::Protein => {
                let up = b.to_ascii_uppercase();
                PROTEIN_SYMBOLS
                    .iter()
                    .position(|&s| s == up)
                    .unwrap_or(20) as u8
            }
            Alphabet::Byte => b,
        }
    }

    /// 序数 → 字符（用于回显/调试输出）
    #[inline]
    pub fn symbol(self, ord: u8) -> u8 {
        match self {
            Alphabet::Dna => match ord {
                0 => b'A',
                1 => b'C',
                2 => b'G',
                _ => b'T',
            },
            Alphabet::Dna5 => match ord {
                0 => b'A',
                1 => b'C',
                2 => b'G',
                3 => b'T',
                _ => b'N',
            },
            Alphabet::Protein => {
                let i = (ord as usize).min(20);
                PROTEIN_SYMBOLS[i]
            }
            Alphabet::Byte => ord,
        }
    }

    /// 批量编码
    pub fn encode(self, seq: &[u8]) -> Vec<u8> {
        seq.iter().map(|&b| self.ordinal(b)).collect()
    }

    /// 批量解码
    pub fn decode(self, ords: &[u8]) -> Vec<u8> {
        ords.iter().map(|&o| self.symbol(o)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna5_roundtrip() {
        let seq = b"ACGTNacgtn";
        let enc = Alphabet::Dna5.encode(seq);
        assert_eq!(enc, vec![0, 1, 2, 3, 4, 0, 1, 2, 3, 4]);
        assert_eq!(Alphabet::Dna5.decode(&enc), b"ACGTNACGTN");
    }

    #[test]
    fn dna_maps_unknown_to_a() {
        assert_eq!(Alphabet::Dna.ordinal(b'N'), 0);
        assert_eq!(Alphabet::Dna.ordinal(b'U'), 3);
    }

    #[test]
    fn protein_ordinals_match_symbol_table() {
        for (i, &s) in PROTEIN_SYMBOLS.iter().enumerate() {
            assert_eq!(Alphabet::Protein.ordinal(s) as usize, i);
            assert_eq!(Alphabet::Protein.symbol(i as u8), s);
        }
        assert_eq!(Alphabet::Protein.ordinal(b'?'), 20);
    }

    #[test]
    fn byte_is_identity() {
        for b in [0u8, 17, 128, 255] {
            assert_eq!(Alphabet::Byte.ordinal(b), b);
            assert_eq!(Alphabet::Byte.symbol(b), b);
        }
        assert_eq!(Alphabet::Byte.size(), 256);
    }
}
