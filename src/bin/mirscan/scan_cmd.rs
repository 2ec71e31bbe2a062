//! CLI subcommand for `mirscan scan` (microRNA against UTR target scanning).
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use log::{debug, info};
use mirscan::*;

/// Options for the `scan` subcommand.
#[derive(Debug, Args)]
pub struct ScanCmd {
    /// microRNA FASTA file (every record is scanned).
    #[arg(value_name="MIRNA_FASTA")]
    pub mirnas: PathBuf,
    /// UTR FASTA file (every record is scanned).
    #[arg(value_name="UTR_FASTA")]
    pub utrs: PathBuf,
    /// Minimum alignment score.
    #[arg(long = "sc", default_value_t=140.0)]
    pub score_threshold: f64,
    /// Hits must have an energy below this value (kcal/mol).
    #[arg(long = "en", default_value_t=1.0, allow_negative_numbers=true)]
    pub energy_threshold: f64,
    /// Multiplier for pair scores in the microRNA 5' region.
    #[arg(long, default_value_t=4.0)]
    pub scale: f32,
    /// Gap open penalty (negative).
    #[arg(long = "go", default_value_t=-9, allow_negative_numbers=true)]
    pub gap_open: i32,
    /// Gap extension penalty (negative).
    #[arg(long = "ge", default_value_t=-4, allow_negative_numbers=true)]
    pub gap_extend: i32,
    /// Require a clean seed match at microRNA positions 2-8.
    #[arg(long)]
    pub strict: bool,
    /// Skip energy estimation.
    #[arg(long)]
    pub noenergy: bool,
    /// Length of the 5' region that receives --scale.
    #[arg(long, default_value_t=8)]
    pub five_prime_length: usize,
    /// Pair scoring scheme.
    #[arg(long, value_enum, default_value_t=SchemeChoice::Complementary)]
    pub scheme: SchemeChoice,
    /// Watson–Crick pair score (complementary) or match score (identity).
    #[arg(long, default_value_t=5)]
    pub match_score: i32,
    /// Mismatch score.
    #[arg(long, default_value_t=-3, allow_negative_numbers=true)]
    pub mismatch: i32,
    /// G:U wobble pair score (complementary only).
    #[arg(long, default_value_t=2, allow_negative_numbers=true)]
    pub wobble: i32,
    /// Scan the microRNA as written instead of reading it 3'→5'.
    #[arg(long)]
    pub no_reverse_query: bool,
    /// Write the text report here instead of stdout.
    #[arg(long, value_name="FILE")]
    pub out: Option<PathBuf>,
    /// Also write a tab-separated hit table.
    #[arg(long, value_name="FILE")]
    pub tsv: Option<PathBuf>,
    /// Also write a tab-separated per-pair summary table.
    #[arg(long, value_name="FILE")]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemeChoice { Complementary, Identity }

impl ScanCmd {
    fn params(&self) -> ScanParams {
        let scheme = match self.scheme {
            SchemeChoice::Complementary => ScoringScheme::Complementary {
                watson_crick: self.match_score, wobble: self.wobble, mismatch: self.mismatch,
            },
            SchemeChoice::Identity => ScoringScheme::Identity { match_score: self.match_score, mismatch: self.mismatch },
        };
        let orientation = if self.no_reverse_query {
            QueryOrientation::FivePrimeFirst
        } else {
            QueryOrientation::ThreePrimeFirst
        };
        ScanParams {
            scheme,
            gap_open: self.gap_open,
            gap_extend: self.gap_extend,
            scale: self.scale,
            five_prime_length: self.five_prime_length,
            score_threshold: self.score_threshold,
            energy_threshold: self.energy_threshold,
            strict: self.strict,
            energy_enabled: !self.noenergy,
            orientation,
            ..Default::default()
        }
    }
}

fn create(path: &PathBuf) -> Result<BufWriter<File>> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    Ok(BufWriter::new(f))
}

pub fn run(cmd: ScanCmd) -> Result<()> {
    let params = cmd.params();
    params.validate()?;

    let mut mirnas = read_fasta(&cmd.mirnas).with_context(|| format!("read FASTA: {}", cmd.mirnas.display()))?;
    let utrs = read_fasta(&cmd.utrs).with_context(|| format!("read FASTA: {}", cmd.utrs.display()))?;
    if params.orientation == QueryOrientation::ThreePrimeFirst {
        mirnas = mirnas.iter().map(FastaRecord::reversed).collect();
    }
    info!("{} microRNA(s), {} UTR(s)", mirnas.len(), utrs.len());
    debug!("{:?}", params);

    let text: Box<dyn Write> = match &cmd.out {
        Some(p) => Box::new(create(p)?),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut reporter = MultiReporter::new();
    reporter.push(TextReporter::new(text, &params));
    if cmd.tsv.is_some() || cmd.summary.is_some() {
        let hits: Box<dyn Write> = match &cmd.tsv {
            Some(p) => Box::new(create(p)?),
            None => Box::new(io::sink()),
        };
        let summaries: Option<Box<dyn Write>> = match &cmd.summary {
            Some(p) => Some(Box::new(create(p)?)),
            None => None,
        };
        reporter.push(TsvReporter::new(hits, summaries, &params)?);
    }

    let estimator = StackingEnergy::default();
    let summaries = scan_records(&mirnas, &utrs, &params, &estimator, &mut reporter)?;
    let total: usize = summaries.iter().map(|s| s.hits).sum();
    info!("{} pair(s) scanned, {} hit(s) reported", summaries.len(), total);
    Ok(())
}
