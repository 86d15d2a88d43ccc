use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use co2_trends::parser::ParseReport;
use co2_trends::{ParseOptions, Sample, Store};
use co2_trends::{aggregate, sample, storage};
use log::LevelFilter;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "co2",
    version,
    about = "Load, aggregate & classify trends in per-country CO2 emission data"
)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,
    /// Only print errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Emission table (`region;code;name;Y_1970;...`).
    #[arg(short, long, global = true, default_value = "co2.csv")]
    input: PathBuf,
    /// JSON file with parse options; flags below override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Field delimiter.
    #[arg(long, global = true)]
    delimiter: Option<char>,
    /// Prefix of year columns in the header.
    #[arg(long, global = true)]
    year_prefix: Option<String>,
    /// Raw value divided by this gives gigatonnes.
    #[arg(long, global = true)]
    unit_divisor: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dataset overview and the global total for a year.
    Summary {
        /// Year for the global total (default: last year in the data).
        #[arg(short, long)]
        year: Option<i32>,
        /// Print the summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// One country's value and trend.
    Country(QueryArgs),
    /// One region's aggregate and trend.
    Region(QueryArgs),
    /// List regions with member counts.
    Regions,
    /// Export the normalized table.
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Country code or region name.
    key: String,
    /// Query year (default: last year in the data).
    #[arg(short, long)]
    year: Option<i32>,
    /// Print the sample as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Output path.
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, _) => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn parse_options(args: &SourceArgs) -> Result<ParseOptions> {
    let mut opts = match &args.config {
        Some(p) => ParseOptions::from_json_file(p)?,
        None => ParseOptions::default(),
    };
    if let Some(d) = args.delimiter {
        opts = opts.with_delimiter(d);
    }
    if let Some(p) = &args.year_prefix {
        opts = opts.with_year_prefix(p.clone());
    }
    if let Some(u) = args.unit_divisor {
        opts = opts.with_unit_divisor(u);
    }
    opts.validate()?;
    Ok(opts)
}

fn fmt_gt(v: f64) -> String {
    if v.is_finite() {
        // Up to 4 decimals, then trim trailing zeros and trailing dot.
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        "NA".to_string()
    }
}

fn resolve_year(store: &Store, year: Option<i32>) -> Result<i32> {
    match year {
        Some(y) => Ok(y),
        None => store
            .year_range()
            .map(|(_, hi)| hi)
            .ok_or_else(|| anyhow::anyhow!("dataset has no years")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let opts = parse_options(&cli.source)?;
    let (store, report) = Store::from_path(&cli.source.input, &opts)
        .with_context(|| format!("load {}", cli.source.input.display()))?;

    match cli.cmd {
        Command::Summary { year, json } => cmd_summary(&store, &report, year, json),
        Command::Country(args) => {
            let year = resolve_year(&store, args.year)?;
            let s = sample::entity_sample(&store, &args.key, year)
                .ok_or_else(|| anyhow::anyhow!("unknown country code: {}", args.key))?;
            print_sample(&s, args.json)
        }
        Command::Region(args) => {
            let year = resolve_year(&store, args.year)?;
            let s = sample::region_sample(&store, &args.key, year)
                .ok_or_else(|| anyhow::anyhow!("unknown region: {}", args.key))?;
            print_sample(&s, args.json)
        }
        Command::Regions => {
            for r in store.list_regions() {
                println!("{}\t{}", r, store.region_members(r).len());
            }
            Ok(())
        }
        Command::Convert(args) => cmd_convert(&store, args),
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    entities: usize,
    regions: usize,
    years: Option<(i32, i32)>,
    report: &'a ParseReport,
    year: i32,
    global_total: f64,
}

fn cmd_summary(store: &Store, report: &ParseReport, year: Option<i32>, json: bool) -> Result<()> {
    let year = resolve_year(store, year)?;
    let global_total = aggregate::global_total(store, year);
    if json {
        let summary = Summary {
            entities: store.len(),
            regions: store.list_regions().len(),
            years: store.year_range(),
            report,
            year,
            global_total,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!("entities: {}", store.len());
    println!("regions:  {}", store.list_regions().len());
    match store.year_range() {
        Some((lo, hi)) => println!("years:    {}-{}", lo, hi),
        None => println!("years:    none"),
    }
    println!(
        "rows read={} dropped={} duplicates={} uncertain cells={}",
        report.rows_read, report.rows_dropped, report.duplicate_ids, report.uncertain_cells
    );
    println!("global total {}: {} Gt", year, fmt_gt(global_total));
    Ok(())
}

fn print_sample(s: &Sample, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(s)?);
        return Ok(());
    }
    match s {
        Sample::Entity(e) => {
            let value = match e.record {
                Some(r) if !r.uncertainty => format!("{} Gt", fmt_gt(r.absolute)),
                Some(_) => "uncertain".to_string(),
                None => "no data".to_string(),
            };
            println!("{} ({}) {} {}: {}", e.name, e.id, e.region, e.year, value);
        }
        Sample::Region(r) => {
            println!(
                "{} {}: {} Gt from {} countries",
                r.region,
                r.year,
                fmt_gt(r.aggregate.absolute),
                r.aggregate.member_count
            );
        }
    }
    let t = s.trend();
    println!(
        "trend ({}y regression): {} slope={} Gt/yr confidence={}",
        co2_trends::trend::TRAILING_WINDOW,
        t.label.as_str(),
        fmt_gt(t.slope),
        t.confidence.as_str()
    );
    Ok(())
}

fn cmd_convert(store: &Store, args: ConvertArgs) -> Result<()> {
    let path = &args.out;
    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("json"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(store, path)?,
        "json" => storage::save_json(store, path)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} entities to {}", store.len(), path.display());
    Ok(())
}
