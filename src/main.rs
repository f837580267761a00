//! FastExpected CLI entry point
//!
//! Computes the expected contact density curve and per-chromosome scale
//! factors from a binned contact list.

use clap::{Parser, Subcommand, ValueEnum};
use fast_expected::core::{ChromosomeSet, DensityAccumulator, NormalizationType};
use fast_expected::formats;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

/// Normalization label carried through to the output (CLI enum)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum NormArg {
    /// Raw observed counts
    #[default]
    #[value(name = "NONE")]
    None,
    /// Vanilla coverage
    #[value(name = "VC")]
    Vc,
    /// Square root vanilla coverage
    #[value(name = "VC_SQRT")]
    VcSqrt,
    /// Knight-Ruiz
    #[value(name = "KR")]
    Kr,
    /// SCALE
    #[value(name = "SCALE")]
    Scale,
}

impl From<NormArg> for NormalizationType {
    fn from(arg: NormArg) -> Self {
        match arg {
            NormArg::None => NormalizationType::None,
            NormArg::Vc => NormalizationType::Vc,
            NormArg::VcSqrt => NormalizationType::VcSqrt,
            NormArg::Kr => NormalizationType::Kr,
            NormArg::Scale => NormalizationType::Scale,
        }
    }
}

#[derive(Parser)]
#[command(name = "fast-expected")]
#[command(about = "Genome-wide expected contact density for Hi-C")]
#[command(version)]
#[command(author = "FastExpected Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the expected curve and scale factors from binned contacts
    Compute {
        /// Chromosome sizes file (name, length)
        chrom_sizes: PathBuf,
        /// Contact list: chrom binX binY [count]
        contacts: PathBuf,
        /// Output file for the expected curve (default: expected.tsv)
        output: Option<PathBuf>,
        /// Bin size in base pairs
        #[arg(short = 'b', long, default_value = "10000")]
        bin_size: u64,
        /// Normalization that produced the counts
        #[arg(short = 'n', long, value_enum, default_value = "NONE")]
        norm: NormArg,
        /// Number of threads
        #[arg(short = 't', long, default_value = "1")]
        threads: usize,
        /// Output file for per-chromosome scale factors
        #[arg(short = 's', long = "scale-factors")]
        scale_factors: Option<PathBuf>,
    },
}

fn load_genome(path: &PathBuf) -> anyhow::Result<ChromosomeSet> {
    eprintln!("Loading chromosome sizes: {:?}", path);
    let genome = ChromosomeSet::from_chrom_sizes_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load chromosome sizes: {}", e))?;
    eprintln!("Chromosomes loaded: {}", genome.without_all().count());
    Ok(genome)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Compute {
            chrom_sizes,
            contacts,
            output,
            bin_size,
            norm,
            threads,
            scale_factors,
        } => {
            let genome = load_genome(&chrom_sizes)?;
            let mut accumulator = DensityAccumulator::new(&genome, bin_size, norm.into())?;

            eprintln!("Accumulating contacts: {:?} (bin size {})", contacts, bin_size);
            let stats = formats::accumulate_contacts(&contacts, &genome, &accumulator, threads)?;

            let expected = accumulator.expected_function()?;
            let output_path = output.unwrap_or_else(|| PathBuf::from("expected.tsv"));
            formats::write_expected_tsv(&expected, BufWriter::new(File::create(&output_path)?))?;
            if let Some(path) = &scale_factors {
                formats::write_scale_factors_tsv(
                    &expected,
                    &genome,
                    BufWriter::new(File::create(path)?),
                )?;
            }

            eprintln!("\n=== Expected Density ===");
            eprintln!("Total records:   {}", stats.total);
            eprintln!("Accepted:        {}", stats.accepted);
            eprintln!("Unknown chrom:   {}", stats.unknown_chrom);
            eprintln!("Filtered:        {}", stats.filtered);
            eprintln!("Malformed:       {}", stats.malformed);
            eprintln!("Distance bins:   {}", expected.len());
            eprintln!("Scale factors:   {}", expected.norm_factors().len());
            eprintln!("Output:          {:?}", output_path);
            eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
        }
    }

    Ok(())
}
