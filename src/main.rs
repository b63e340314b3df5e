//! dogmatui - Central Dogma Simulator
//!
//! Animates DNA → mRNA → protein and protein → mRNA → DNA in the terminal.
//!
//! ## Usage
//!
//! ```bash
//! dogmatui ATGTTTTAA                       # interactive
//! dogmatui --protein 'MKV*' --strategy gc_rich
//! dogmatui ATGTTTTAA -o -                  # print results, no TUI
//! ```
//!
//! ## Keys
//!
//! - `s`: start, `space`: pause/resume, `n`: step, `r`: reset
//! - `+`/`-`: speed
//! - `:dna SEQ`, `:protein SEQ`, `:q`, `:h`

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use dogmatui::codon_select::Strategy;
use dogmatui::codon_usage::CodonFrequencyTable;
use dogmatui::config::SimulationConfig;
use dogmatui::controller::run_app;
use dogmatui::genetic_code::CodonTable;
use dogmatui::logging::{self, LogTarget};
use dogmatui::model::AppState;
use dogmatui::playback::PlaybackMode;
use dogmatui::progress::ProgressStore;
use dogmatui::session::Session;
use dogmatui::ui::glyphs;

/// Width of wrapped sequences in CLI output.
const REPORT_WIDTH: usize = 60;

/// Runs CLI mode: simulate at once and write the results.
fn run_cli_mode(session: &mut Session, output: &str) -> Result<()> {
    let report = session.simulate()?.report(REPORT_WIDTH);

    if output == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(report.as_bytes())?;
    } else {
        let mut file = std::fs::File::create(output)
            .with_context(|| format!("Cannot create output file {}", output))?;
        file.write_all(report.as_bytes())?;
        eprintln!("Wrote results to {}", output);
    }

    Ok(())
}

/// Playback mode for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Advance on a timer
    Auto,
    /// Advance one item per key press
    Step,
}

impl From<ModeArg> for PlaybackMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Auto => PlaybackMode::Auto,
            ModeArg::Step => PlaybackMode::Step,
        }
    }
}

/// Codon selection strategy for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Uniform choice among synonymous codons
    Random,
    /// Most frequent codon
    MostCommon,
    /// Codon with the highest GC content
    GcRich,
    /// Codon with the lowest GC content
    GcPoor,
    /// Weighted draw following codon usage
    Balanced,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Random => Strategy::Random,
            StrategyArg::MostCommon => Strategy::MostCommon,
            StrategyArg::GcRich => Strategy::GcRich,
            StrategyArg::GcPoor => Strategy::GcPoor,
            StrategyArg::Balanced => Strategy::Balanced,
        }
    }
}

/// dogmatui - An interactive simulator of the central dogma
///
/// When run without -o/--output, opens the interactive TUI.
/// With -o/--output, runs in CLI mode and writes the results to a file (or stdout with "-").
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// DNA coding sequence (or protein with --protein)
    sequence: Option<String>,

    /// Treat SEQUENCE as a protein and reverse-translate it
    #[arg(short = 'p', long = "protein")]
    protein: bool,

    /// Output file (enables CLI mode). Use "-" for stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Duration of a whole animation in milliseconds
    #[arg(short = 's', long = "speed")]
    speed: Option<u64>,

    /// Playback mode
    #[arg(short = 'm', long = "mode", value_enum)]
    mode: Option<ModeArg>,

    /// Codon selection strategy for reverse translation
    #[arg(long = "strategy", value_enum)]
    strategy: Option<StrategyArg>,

    /// Longest protein accepted
    #[arg(long = "max-protein-length")]
    max_protein_length: Option<usize>,

    /// Codon table JSON file (standard code if missing or unreadable)
    #[arg(long = "codon-table")]
    codon_table: Option<PathBuf>,

    /// Settings JSON file; flags override its values
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Progress file (default: dogmatui-progress.json in the temp directory)
    #[arg(long = "progress")]
    progress: Option<PathBuf>,

    /// Seed for reproducible codon choices
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Use plain ASCII markers
    #[arg(long = "ascii")]
    ascii: bool,

    /// Log file for interactive mode (default: random name in the temp directory)
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)
                .with_context(|| format!("Cannot load config {}", path.display()))?,
            None => SimulationConfig::default(),
        };
        if let Some(speed) = self.speed {
            config.speed_ms = speed;
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy.into();
        }
        if let Some(max) = self.max_protein_length {
            config.max_protein_length = max;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.simulation_config()?;

    let cli_mode = args.output.is_some();
    let target = if cli_mode {
        LogTarget::Stderr
    } else {
        LogTarget::File(args.log_file.clone().unwrap_or_else(logging::default_log_path))
    };
    logging::init(&target, if cli_mode { "warn" } else { "info" })?;

    let usage = CodonFrequencyTable::bundled();
    usage.check();
    let table = CodonTable::load_or_standard(args.codon_table.as_ref())?;
    let mut session = Session::new(config, table, usage);

    if let Some(raw) = &args.sequence {
        if args.protein {
            session.load_protein(raw)?;
        } else {
            session.load_dna(raw)?;
        }
    }

    // CLI mode: output to file/stdout
    if let Some(output) = &args.output {
        if args.sequence.is_none() {
            anyhow::bail!("CLI mode needs a SEQUENCE argument");
        }
        run_cli_mode(&mut session, output)?;
    } else {
        let progress_path = args
            .progress
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("dogmatui-progress.json"));
        let state = AppState::new(session, ProgressStore::open(progress_path), glyphs::select(!args.ascii));
        run_app(state, true)?;
    }

    Ok(())
}
