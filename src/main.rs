use anyhow::Result;
use clap::{Parser, Subcommand};

use seqan_rust::align::{self, scoring::Scoring, AlignConfig, Band};
use seqan_rust::index::esa::{EsaIndex, IndexMeta};
use seqan_rust::index::qgram::{QGramIndex, QGramParams};
use seqan_rust::index::text::MultiText;
use seqan_rust::index::traverse;
use seqan_rust::io::fasta;
use seqan_rust::util::alphabet::Alphabet;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "seqan-rust", author, version, about = "Sequence indexing and alignment toolkit inspired by SeqAn", arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an enhanced suffix array index from a FASTA file
    Index {
        /// Input FASTA file
        fasta: String,
        /// Output path for the index
        #[arg(short, long, default_value = "out.esa")]
        output: String,
        /// Alphabet: dna, dna5, protein or byte
        #[arg(short, long, default_value = "dna5")]
        alphabet: String,
    },
    /// Enumerate repeats from a saved index
    Repeats {
        /// Path to a saved .esa index
        #[arg(short = 'i', long = "index")]
        index: String,
        /// Kind of repeat: mums, supermax or maxrepeats
        #[arg(short, long, default_value = "mums")]
        kind: String,
        /// Minimal repeat length
        #[arg(short = 'l', long = "min-len", default_value_t = 20)]
        min_len: usize,
    },
    /// Locate a pattern with an on-the-fly q-gram index
    Locate {
        /// Input FASTA file
        fasta: String,
        /// Pattern to search (plain text)
        pattern: String,
        /// q-gram width
        #[arg(short, long, default_value_t = 4)]
        q: usize,
        /// Alphabet: dna, dna5, protein or byte
        #[arg(short, long, default_value = "dna5")]
        alphabet: String,
    },
    /// Align query sequences against the first target sequence
    Align {
        /// Query FASTA file
        query: String,
        /// Target FASTA file (first record is used)
        target: String,
        /// Local alignment instead of global
        #[arg(long)]
        local: bool,
        /// Alphabet: dna, dna5, protein or byte; protein uses BLOSUM62
        #[arg(short, long, default_value = "dna5")]
        alphabet: String,
        #[arg(long = "match", default_value_t = 2, allow_hyphen_values = true)]
        match_score: i32,
        #[arg(long = "mismatch", default_value_t = -2, allow_hyphen_values = true)]
        mismatch_score: i32,
        #[arg(long = "gap-open", default_value_t = -4, allow_hyphen_values = true)]
        gap_open: i32,
        #[arg(long = "gap-ext", default_value_t = -1, allow_hyphen_values = true)]
        gap_extend: i32,
        /// Band as lower,upper diagonals (e.g. "-16,16")
        #[arg(long, allow_hyphen_values = true)]
        band: Option<String>,
        /// Do not penalize leading/trailing gaps (overlap alignment)
        #[arg(long)]
        free_ends: bool,
        #[arg(short = 't', long = "threads", default_value_t = 0)]
        threads: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Index { fasta, output, alphabet } => {
            run_index(&fasta, &output, parse_alphabet(&alphabet)?)
        }
        Commands::Repeats { index, kind, min_len } => run_repeats(&index, &kind, min_len),
        Commands::Locate { fasta, pattern, q, alphabet } => {
            run_locate(&fasta, &pattern, q, parse_alphabet(&alphabet)?)
        }
        Commands::Align {
            query,
            target,
            local,
            alphabet,
            match_score,
            mismatch_score,
            gap_open,
            gap_extend,
            band,
            free_ends,
            threads,
        } => {
            let alphabet = parse_alphabet(&alphabet)?;
            let scoring = match alphabet {
                Alphabet::Protein => Scoring::blosum62(gap_open, gap_extend),
                _ => Scoring::simple(
                    alphabet.size(),
                    match_score,
                    mismatch_score,
                    gap_open,
                    gap_extend,
                ),
            };
            let band = band.as_deref().map(parse_band).transpose()?;
            run_align(&query, &target, local, alphabet, scoring, band, free_ends, threads)
        }
    }
}

fn parse_alphabet(name: &str) -> Result<Alphabet> {
    match name.to_ascii_lowercase().as_str() {
        "dna" => Ok(Alphabet::Dna),
        "dna5" => Ok(Alphabet::Dna5),
        "protein" => Ok(Alphabet::Protein),
        "byte" => Ok(Alphabet::Byte),
        other => anyhow::bail!("unknown alphabet '{}'", other),
    }
}

fn parse_band(s: &str) -> Result<Band> {
    let (lo, hi) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("band must be 'lower,upper', got '{}'", s))?;
    Ok(Band::new(lo.trim().parse()?, hi.trim().parse()?))
}

fn load_text(path: &str, alphabet: Alphabet) -> Result<MultiText> {
    let records = fasta::read_fasta(path)?;
    let seqs: Vec<&[u8]> = records.iter().map(|r| r.seq.as_slice()).collect();
    Ok(MultiText::from_seqs(&seqs, alphabet)?)
}

fn run_index(fasta_path: &str, output: &str, alphabet: Alphabet) -> Result<()> {
    let text = load_text(fasta_path, alphabet)?;
    println!("input:     {}", fasta_path);
    println!("sequences: {}", text.num_seqs());
    println!("total_len: {}", text.total_len());

    let mut idx = EsaIndex::build(text)?;
    idx.set_meta(IndexMeta {
        source_file: Some(fasta_path.to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });
    idx.save_to_file(output)
        .map_err(|e| anyhow::anyhow!("cannot write index to '{}': {}", output, e))?;
    println!("index saved: {}", output);
    Ok(())
}

fn run_repeats(index_path: &str, kind: &str, min_len: usize) -> Result<()> {
    let idx = EsaIndex::load_from_file(index_path)
        .map_err(|e| anyhow::anyhow!("cannot load index '{}': {}", index_path, e))?;
    let alphabet = idx.text().alphabet();
    let show = |p: seqan_rust::index::text::SeqPos, len: usize| {
        let repr = &idx.text().suffix(p)[..len];
        String::from_utf8_lossy(&alphabet.decode(repr)).into_owned()
    };
    match kind {
        "mums" => {
            for m in traverse::mums(&idx, min_len) {
                let occ: Vec<String> =
                    m.occurrences.iter().map(|p| format!("{}:{}", p.seq, p.pos)).collect();
                println!("{}\t{}\t{}", m.rep_len, show(m.occurrences[0], m.rep_len), occ.join(","));
            }
        }
        "supermax" => {
            for r in traverse::supermax_repeats(&idx, min_len) {
                let occ: Vec<String> =
                    r.occurrences.iter().map(|p| format!("{}:{}", p.seq, p.pos)).collect();
                println!("{}\t{}\t{}", r.rep_len, show(r.occurrences[0], r.rep_len), occ.join(","));
            }
        }
        "maxrepeats" => {
            let nodes = traverse::max_repeats(&idx, min_len);
            for node in &nodes {
                println!(
                    "{}\t{}\t{} pairs",
                    node.rep_len,
                    show(idx.gsa()[node.begin], node.rep_len),
                    node.pairs
                );
            }
            let total: u64 = nodes.iter().map(|n| n.pairs).sum();
            println!("total: {} pairs", total);
        }
        other => anyhow::bail!("unknown repeat kind '{}'", other),
    }
    Ok(())
}

fn run_locate(fasta_path: &str, pattern: &str, q: usize, alphabet: Alphabet) -> Result<()> {
    let text = load_text(fasta_path, alphabet)?;
    let mut idx = QGramIndex::build(text, q, QGramParams::default())?;
    let hits = idx.equal_range(pattern.as_bytes())?;
    for p in &hits {
        println!("{}\t{}", p.seq, p.pos);
    }
    println!("{} occurrence(s)", hits.len());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_align(
    query_path: &str,
    target_path: &str,
    local: bool,
    alphabet: Alphabet,
    scoring: Scoring,
    band: Option<Band>,
    free_ends: bool,
    threads: usize,
) -> Result<()> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;
    }
    let queries = fasta::read_fasta(query_path)?;
    let targets = fasta::read_fasta(target_path)?;
    let target = alphabet.encode(&targets[0].seq);
    let encoded: Vec<Vec<u8>> = queries.iter().map(|r| alphabet.encode(&r.seq)).collect();

    if local {
        for (rec, q) in queries.iter().zip(&encoded) {
            let hit = align::local::local_align(q, &target, &scoring);
            println!(
                "{}\t{}\t{}\tq[{}..{}]\tt[{}..{}]",
                rec.id,
                hit.score,
                hit.cigar,
                hit.query_start,
                hit.query_end,
                hit.ref_start,
                hit.ref_end
            );
        }
        return Ok(());
    }

    let cfg = if free_ends { AlignConfig::overlap() } else { AlignConfig::none() };
    let pairs: Vec<(&[u8], &[u8])> =
        encoded.iter().map(|q| (q.as_slice(), target.as_slice())).collect();
    for (rec, res) in queries.iter().zip(align::align_batch(&pairs, &scoring, cfg, band)) {
        let aln = res.map_err(|e| anyhow::anyhow!("alignment of '{}' failed: {}", rec.id, e))?;
        println!("{}\t{}\t{}", rec.id, aln.score, aln.cigar);
    }
    Ok(())
}
