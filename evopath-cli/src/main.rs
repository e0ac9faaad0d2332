mod common;
mod loader;
mod reports;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use common::split_csv;
use evopath_engine::{
    Attribute, EvolutionEngine, EvolutionId, SearchFilter, SearchOutcome, WorkRate,
};
use loader::{FileLoader, load_catalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Coloured card listing
    Console,
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "evopath", version)]
#[command(about = "Explore every evolution path for a roster of player cards")]
struct Args {
    /// Roster file: CSV rows, or JSON player records when the extension is .json
    #[arg(long, required_unless_present = "list_evolutions")]
    roster: Option<PathBuf>,

    /// Evolution catalog JSON (defaults to the bundled catalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Evolution ids to search with (comma-separated, default: all)
    #[arg(long, default_value = "")]
    evolutions: String,

    /// List the catalog's evolutions and exit
    #[arg(long)]
    list_evolutions: bool,

    /// JSON filter file; flags below override its fields
    #[arg(long)]
    filter: Option<PathBuf>,

    /// Keep cards whose name contains this text
    #[arg(long)]
    name: Option<String>,

    /// Keep cards that took at least one of these evolutions (comma-separated ids)
    #[arg(long)]
    wanted_evolutions: Option<String>,

    /// Minimum rating, e.g. `--min ovr=85` (repeatable)
    #[arg(long = "min", value_name = "ATTR=VALUE")]
    min: Vec<String>,

    /// Keep cards playing one of these positions (comma-separated)
    #[arg(long)]
    positions: Option<String>,

    /// Keep cards holding one of these traits (comma-separated)
    #[arg(long)]
    traits: Option<String>,

    /// Keep cards with exactly this plus-trait (`None` for cards without one)
    #[arg(long)]
    plus_trait: Option<String>,

    /// Required attacking work rate
    #[arg(long)]
    att_wr: Option<WorkRate>,

    /// Required defensive work rate
    #[arg(long)]
    def_wr: Option<WorkRate>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if maybe_list_evolutions(&args)? {
        return Ok(());
    }

    let Some(roster) = args.roster.clone() else {
        bail!("--roster is required");
    };
    let filter = build_filter(&args)?;
    let selection = split_csv(&args.evolutions);
    let engine = EvolutionEngine::new(FileLoader::new(roster, args.catalog.clone()));

    let start_time = Instant::now();
    let outcome = engine.search(&filter, &selection)?;
    write_report(&args, &outcome, start_time.elapsed())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn maybe_list_evolutions(args: &Args) -> Result<bool> {
    if !args.list_evolutions {
        return Ok(false);
    }
    let catalog = load_catalog(args.catalog.as_deref())?;
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available evolutions:")?;
    for evolution in &catalog {
        writeln!(
            output_target.writer(),
            "  {:22} - {} ({} coins)",
            evolution.id.as_str(),
            evolution.name,
            evolution.cost
        )?;
        if args.verbose {
            for requirement in &evolution.requirements {
                writeln!(output_target.writer(), "      requires {requirement}")?;
            }
            for upgrade in &evolution.upgrades {
                writeln!(output_target.writer(), "      grants {upgrade}")?;
            }
        }
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn parse_min(entry: &str) -> Result<(Attribute, u8)> {
    let Some((key, value)) = entry.split_once('=') else {
        bail!("expected ATTR=VALUE, got `{entry}`");
    };
    let attribute = Attribute::from_key(key.trim())
        .with_context(|| format!("unknown attribute `{}`", key.trim()))?;
    let value: u8 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid minimum for {attribute}: `{}`", value.trim()))?;
    Ok((attribute, value))
}

fn tag_set(raw: &str) -> BTreeSet<String> {
    split_csv(raw).into_iter().collect()
}

fn build_filter(args: &Args) -> Result<SearchFilter> {
    let mut filter = match &args.filter {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            SearchFilter::from_json(&text)
                .with_context(|| format!("invalid filter {}", path.display()))?
        }
        None => SearchFilter::default(),
    };

    if let Some(name) = &args.name {
        filter.name = Some(name.clone());
    }
    if let Some(wanted) = &args.wanted_evolutions {
        filter.evolutions = Some(
            split_csv(wanted)
                .into_iter()
                .map(EvolutionId::new)
                .collect(),
        );
    }
    for entry in &args.min {
        let (attribute, value) = parse_min(entry)?;
        filter = filter.with_min(attribute, value);
    }
    if let Some(positions) = &args.positions {
        filter.positions = Some(tag_set(positions));
    }
    if let Some(traits) = &args.traits {
        filter.traits = Some(tag_set(traits));
    }
    if let Some(plus_trait) = &args.plus_trait {
        filter.plus_trait = Some(plus_trait.clone());
    }
    if args.att_wr.is_some() {
        filter.attacking_work_rate = args.att_wr;
    }
    if args.def_wr.is_some() {
        filter.defensive_work_rate = args.def_wr;
    }

    if filter.is_unconstrained() {
        log::debug!("no filter criteria set; keeping every evolved card");
    }
    Ok(filter)
}

fn write_report(args: &Args, outcome: &SearchOutcome, duration: Duration) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, outcome)?,
        ReportFormat::Markdown => reports::generate_markdown_report(&mut output_target, outcome)?,
        ReportFormat::Csv => reports::generate_csv_report(&mut output_target, outcome)?,
        ReportFormat::Console => {
            reports::generate_console_report(&mut output_target, outcome, duration)?;
        }
    }
    output_target.flush_inner()?;
    if let Some(path) = &args.output {
        log::info!("report written to {}", path.display());
        if args.report == ReportFormat::Console {
            println!("{} {}", "📄 Report written to".green(), path.display());
        }
    }
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
