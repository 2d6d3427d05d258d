use crate::align::{gap_run, AlignConfig};
use crate::align::scoring::Scoring;
use crate::error::{Result, SeqanError};

/// 操作序列 → 游程压缩的 CIGAR 字符串（如 "3M1I2M"）
pub fn ops_to_cigar(ops: &[u8]) -> String {
    let mut cigar = String::new();
    if ops.is_empty() {
        return cigar;
    }
    let mut cur = ops[0];
    let mut count = 1usize;
    for &op in &ops[1..] {
        if op == cur {
            count += 1;
        } else {
            cigar.push_str(&format!("{}{}", count, cur as char));
            cur = op;
            count = 1;
        }
    }
    cigar.push_str(&format!("{}{}", count, cur as char));
    cigar
}

/// CIGAR 字符串 → (操作, 长度) 游程表
pub fn parse_cigar(cigar: &str) -> Vec<(u8, usize)> {
    let mut out = Vec::new();
    let mut num = 0usize;
    for c in cigar.bytes() {
        if c.is_ascii_digit() {
            num = num * 10 + (c - b'0') as usize;
        } else {
            out.push((c, num));
            num = 0;
        }
    }
    out
}

/// 按打分方案重放 CIGAR，返回该编辑脚本的对齐分。
/// M 消耗双方、I 消耗 a（b 中开隙）、D 消耗 b（a 中开隙）；
/// 自由端隙按配置把首/尾隙段计零分。脚本必须恰好耗尽两条序列。
pub fn replay_score(
    cigar: &str,
    a: &[u8],
    b: &[u8],
    sc: &Scoring,
    cfg: AlignConfig,
) -> Result<i32> {
    let runs = parse_cigar(cigar);
    let mut score = 0i64;
    let (mut i, mut j) = (0usize, 0usize);
    for (idx, &(op, len)) in runs.iter().enumerate() {
        let first = idx == 0;
        let last = idx == runs.len() - 1;
        match op {
            b'M' => {
                if i + len > a.len() || j + len > b.len() {
                    return Err(SeqanError::InvalidParams("cigar overruns sequences".into()));
                }
                for k in 0..len {
                    score += sc.score(a[i + k], b[j + k]) as i64;
                }
                i += len;
                j += len;
            }
            b'I' => {
                let free = (first && cfg.free_left) || (last && cfg.free_right);
                if !free {
                    score += gap_run(sc, len) as i64;
                }
                i += len;
            }
            b'D' => {
                let free = (first && cfg.free_top) || (last && cfg.free_bottom);
                if !free {
                    score += gap_run(sc, len) as i64;
                }
                j += len;
            }
            _ => {
                return Err(SeqanError::InvalidParams(format!(
                    "unsupported cigar op '{}'",
                    op as char
                )))
            }
        }
    }
    if i != a.len() || j != b.len() {
        return Err(SeqanError::InvalidParams("cigar does not span both sequences".into()));
    }
    Ok(score as i32)
}
