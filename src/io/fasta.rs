use anyhow::{bail, Result};
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// 一次性读入整个 FASTA 文件。
/// 索引和对齐都需要完整驻留内存的序列，这里不做流式解析。
/// 容忍 CRLF、行内空白和序列前的空行；碱基统一转大写。
pub fn read_fasta(path: impl AsRef<Path>) -> Result<Vec<FastaRecord>> {
    let path = path.as_ref();
    let fh = std::fs::File::open(path)
        .map_err(|e| anyhow::anyhow!("cannot open FASTA '{}': {}", path.display(), e))?;
    let records = parse_fasta(std::io::BufReader::new(fh))?;
    if records.is_empty() {
        bail!("FASTA file '{}' contains no sequences", path.display());
    }
    Ok(records)
}

pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<FastaRecord>> {
    let mut records: Vec<FastaRecord> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(header) = line.strip_prefix('>') {
            let mut parts = header.trim().splitn(2, char::is_whitespace);
            let id = parts.next().unwrap_or("").to_string();
            let desc = parts
                .next()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            records.push(FastaRecord { id, desc, seq: Vec::new() });
        } else {
            let Some(rec) = records.last_mut() else {
                // 首个 header 之前只允许空白
                if line.trim().is_empty() {
                    continue;
                }
                bail!("sequence data before first FASTA header");
            };
            for &b in line.as_bytes() {
                if !b.is_ascii_whitespace() {
                    rec.seq.push(b.to_ascii_uppercase());
                }
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_simple_fasta() {
        let data = b">chr1 first\nACgTNN\n>chr2\nAAA\n";
        let recs = parse_fasta(Cursor::new(&data[..])).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].id, "chr1");
        assert_eq!(recs[0].desc.as_deref(), Some("first"));
        assert_eq!(recs[0].seq, b"ACGTNN");
        assert_eq!(recs[1].id, "chr2");
        assert_eq!(recs[1].desc, None);
        assert_eq!(recs[1].seq, b"AAA");
    }

    #[test]
    fn parse_fasta_with_crlf_and_whitespace() {
        let data = b"\n>chr1 desc\r\nAC g t n\r\n acgt\r\n>chr2 \r\n N N N \r\n";
        let recs = parse_fasta(Cursor::new(&data[..])).unwrap();
        assert_eq!(recs[0].seq, b"ACGTNACGT");
        assert_eq!(recs[1].id, "chr2");
        assert_eq!(recs[1].seq, b"NNN");
    }

    #[test]
    fn reject_data_before_header() {
        let data = b"ACGT\n>chr1\nACGT\n";
        assert!(parse_fasta(Cursor::new(&data[..])).is_err());
    }
}
