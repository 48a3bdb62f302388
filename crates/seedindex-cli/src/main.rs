use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use needletail::parse_fastx_file;
use seedindex_lib::builder::enumerate::SeedEncoder;
use seedindex_lib::constants::{
    DEFAULT_COMPLEXITY_CUT, DEFAULT_LOAD_FACTOR, DEFAULT_MINIMIZER_WINDOW, DEFAULT_SEEDP_BITS,
    DEFAULT_SHAPE,
};
use seedindex_lib::{EnumConfig, Index, IndexBuilder, IndexConfig, MaskingAlgo, Shape};
use std::io::{BufWriter, Write};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "seedindex")]
#[command(version = "0.1.0")]
#[command(about = "Partitioned seed index for DNA similarity search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Reference and index parameters shared by all subcommands
#[derive(Args)]
struct IndexArgs {
    /// Reference FASTA/FASTQ file (may be gzipped)
    #[arg(short, long)]
    reference: String,

    /// Seed shape, e.g. 111010010100110111
    #[arg(short, long, default_value = DEFAULT_SHAPE)]
    shape: String,

    /// Partition bits (2^bits partitions)
    #[arg(short = 'p', long, default_value_t = DEFAULT_SEEDP_BITS)]
    seedp_bits: u32,

    /// Number of threads (0 = all available cores)
    #[arg(short = 't', long, default_value = "0")]
    threads: usize,

    /// Minimizer window over seed positions (1 = index every seed)
    #[arg(short = 'w', long, default_value_t = DEFAULT_MINIMIZER_WINDOW)]
    minimizer_window: usize,

    /// Minimum seed complexity (0 = no filter)
    #[arg(long, default_value_t = DEFAULT_COMPLEXITY_CUT)]
    complexity_cut: f64,

    /// Masking of lowercase reference letters (none, soft-mask)
    #[arg(long, default_value = "none")]
    masking: MaskingAlgo,

    /// Hash table slots per distinct seed
    #[arg(long, default_value_t = DEFAULT_LOAD_FACTOR)]
    load_factor: f64,

    /// Fraction of distinct seeds whose largest groups are left out (0 = keep all)
    #[arg(long, default_value = "0")]
    repetitive_cutoff: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index and report its statistics
    Build {
        #[command(flatten)]
        index: IndexArgs,
    },

    /// Build an index and report the seed hits of query sequences
    Query {
        #[command(flatten)]
        index: IndexArgs,

        /// Query FASTA/FASTQ file
        #[arg(short, long)]
        query: String,

        /// Output TSV file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Build an index and verify that every reference seed is found at its position
    Check {
        #[command(flatten)]
        index: IndexArgs,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing: use RUST_LOG if set, otherwise default to info
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { index } => {
            build_command(&index)?;
        }
        Commands::Query { index, query, output } => {
            query_command(&index, &query, output.as_deref())?;
        }
        Commands::Check { index } => {
            check_command(&index)?;
        }
    }

    Ok(())
}

impl IndexArgs {
    fn config(&self) -> anyhow::Result<IndexConfig> {
        let shape = Shape::parse(&self.shape)
            .with_context(|| format!("Invalid seed shape '{}'", self.shape))?;
        let config = IndexConfig {
            seedp_bits: self.seedp_bits,
            num_threads: self.threads,
            load_factor: self.load_factor,
            repetitive_cutoff: self.repetitive_cutoff,
            seed_encoding: EnumConfig {
                minimizer_window: self.minimizer_window,
                complexity_cut: self.complexity_cut,
                masking: self.masking,
                ..EnumConfig::new(shape)
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn build(&self) -> anyhow::Result<Index> {
        let builder = IndexBuilder::new(self.config()?)?;
        let start = Instant::now();
        let index = builder.build_from_fasta(&self.reference)?;
        info!("Index built in {:.2?}", start.elapsed());
        Ok(index)
    }
}

/// Build an index from FASTA/FASTQ input
fn build_command(args: &IndexArgs) -> anyhow::Result<()> {
    info!("Building seed index...");
    info!("  Reference: {}", args.reference);

    let index = args.build()?;
    index.print_summary();

    Ok(())
}

/// Report query seed hits as TSV: query, query position, target, target position
fn query_command(args: &IndexArgs, query: &str, output: Option<&str>) -> anyhow::Result<()> {
    let index = args.build()?;

    let out: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path).with_context(|| format!("Failed to create {}", path))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut out = BufWriter::new(out);

    let mut reader = parse_fastx_file(query)
        .with_context(|| format!("Failed to open query file: {}", query))?;

    let start = Instant::now();
    let mut num_queries = 0usize;
    let mut num_hits = 0usize;
    let mut queries_with_hits = 0usize;
    while let Some(record) = reader.next() {
        let record = record.with_context(|| format!("Failed to parse query record in {}", query))?;
        let id = String::from_utf8_lossy(record.id());
        let name = id.split_whitespace().next().unwrap_or_default();
        num_queries += 1;

        let matches = index.seed_matches(&record.seq());
        if !matches.is_empty() {
            queries_with_hits += 1;
        }
        for m in &matches {
            let Some((target, offset)) = index.locate(m.target_pos) else {
                continue;
            };
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                name,
                m.query_pos,
                index.reference().name(target),
                offset
            )?;
            num_hits += 1;
        }
    }
    out.flush()?;

    info!("Query Results:");
    info!("  Queries: {}", num_queries);
    info!("  Queries with hits: {}", queries_with_hits);
    info!("  Seed hits: {}", num_hits);
    info!("  Time: {:.2?}", start.elapsed());

    Ok(())
}

/// Verify every reference seed against the index
fn check_command(args: &IndexArgs) -> anyhow::Result<()> {
    let index = args.build()?;
    let reference = index.reference();
    let encoder = SeedEncoder::new(index.seed_encoding());

    info!("Checking index...");
    let start = Instant::now();
    let mut num_checked = 0u64;
    let mut num_missing = 0u64;
    let mut num_repetitive = 0u64;
    for id in 0..reference.num_sequences() {
        for (seed, pos) in encoder.seeds(reference.sequence(id), reference.start(id)) {
            num_checked += 1;
            match index.contains(seed) {
                Some(entries) if entries.iter().any(|e| e.pos == pos) => {}
                Some(_) => {
                    num_missing += 1;
                    if num_missing <= 10 {
                        warn!("Seed {:#x} at {}:{} not in its group", seed, reference.name(id), pos - reference.start(id));
                    }
                }
                // repetitive seeds are intentionally absent
                None if index.stats().repetitive_cutoff.is_some() => num_repetitive += 1,
                None => {
                    num_missing += 1;
                    if num_missing <= 10 {
                        warn!("Seed {:#x} at {}:{} not found", seed, reference.name(id), pos - reference.start(id));
                    }
                }
            }
        }
    }

    info!("Check Results:");
    info!("  Seeds checked: {}", num_checked);
    info!("  Left out as repetitive: {}", num_repetitive);
    info!("  Missing: {}", num_missing);
    info!("  Time: {:.2?}", start.elapsed());

    if num_missing > 0 {
        anyhow::bail!("{} of {} seeds were not found in the index", num_missing, num_checked);
    }
    info!("Index check passed");

    Ok(())
}
