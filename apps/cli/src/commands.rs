//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

use clipscout_core::{HarvestConfig, HarvestResult, PageInput, ProgressReporter, harvest};
use clipscout_export::Format;
use clipscout_extract::{Extractor, ThumbnailPolicy};
use clipscout_fetch::HttpFetcher;
use clipscout_shared::{
    AppConfig, DiagnosticTrace, ExtractOptions, FetchOptions, ThumbnailOptions, ThumbnailSource,
    VideoRecord, init_config, load_config,
};
use clipscout_thumbnails::{HttpProbe, ImageProbe, OfflineProbe, ThumbnailSynthesizer};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ClipScout: pull clip records out of stock-footage listing pages.
#[derive(Parser)]
#[command(
    name = "clipscout",
    version,
    about = "Extract structured video clip records from stock-footage listing pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// How records are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    fn export(self) -> Option<Format> {
        match self {
            Self::Table => None,
            Self::Json => Some(Format::Json),
            Self::Csv => Some(Format::Csv),
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch a listing page and extract clips from it.
    Extract {
        /// Listing page URL.
        url: String,

        #[command(flatten)]
        opts: HarvestArgs,
    },

    /// Extract clips from a saved page or rendered DOM snapshot.
    Parse {
        /// HTML file on disk.
        file: PathBuf,

        #[command(flatten)]
        opts: HarvestArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags shared by `extract` and `parse`.
#[derive(Args, Clone, Debug)]
pub(crate) struct HarvestArgs {
    /// Number of records to return (1-50). Defaults to `extraction.default_count`.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write records to this file instead of stdout.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Thumbnail post-pass: keep, placeholder, random or provider.
    #[arg(long, default_value = "keep")]
    pub thumbnails: ThumbnailPolicy,

    /// Never probe image providers; missing thumbnails become placeholders.
    #[arg(long)]
    pub offline: bool,

    /// Print the diagnostic trace after the records.
    #[arg(long)]
    pub trace: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "clipscout=info",
        1 => "clipscout=debug",
        _ => "clipscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract { url, opts } => {
            let parsed = Url::parse(&url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;
            cmd_harvest(PageInput::Url(parsed), &opts).await
        }
        Command::Parse { file, opts } => {
            if !file.is_file() {
                return Err(eyre!("'{}' is not a file", file.display()));
            }
            cmd_harvest(PageInput::File(file), &opts).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_harvest(input: PageInput, opts: &HarvestArgs) -> Result<()> {
    let config = load_config()?;
    let harvest_config = HarvestConfig {
        input,
        count: opts.count.unwrap_or(config.extraction.default_count),
        policy: opts.thumbnails,
    };

    let fetcher = HttpFetcher::new(&FetchOptions::from(&config))?;
    let extract_opts = ExtractOptions::try_from(&config)?;
    let thumb_opts = ThumbnailOptions::from(&config);

    info!(
        input = %harvest_config.input,
        count = harvest_config.count,
        policy = %harvest_config.policy,
        offline = opts.offline,
        "starting extraction"
    );

    if opts.offline || !thumb_opts.probe {
        let synthesizer = ThumbnailSynthesizer::new(OfflineProbe, thumb_opts);
        let extractor = Extractor::new(extract_opts, synthesizer);
        run_harvest(&harvest_config, &fetcher, &extractor, opts).await
    } else {
        let probe = HttpProbe::new(thumb_opts.probe_timeout)?;
        let extractor = Extractor::new(extract_opts, ThumbnailSynthesizer::new(probe, thumb_opts));
        run_harvest(&harvest_config, &fetcher, &extractor, opts).await
    }
}

async fn run_harvest<P: ImageProbe>(
    config: &HarvestConfig,
    fetcher: &HttpFetcher,
    extractor: &Extractor<P>,
    opts: &HarvestArgs,
) -> Result<()> {
    let reporter = CliProgress::new();
    let result = harvest(config, fetcher, extractor, &reporter)
        .await
        .inspect_err(|_| reporter.clear())?;

    if result.records.is_empty() {
        eprintln!("No records found on {}.", config.input);
    }

    match (&opts.out, opts.format.export()) {
        (Some(path), format) => {
            let format = format
                .or_else(|| Format::from_path(path))
                .unwrap_or(Format::Csv);
            clipscout_export::write(&result.records, format, path)?;
            eprintln!("  Wrote {} records to {}", result.records.len(), path.display());
        }
        (None, Some(format)) => {
            println!("{}", clipscout_export::render(&result.records, format)?);
        }
        (None, None) => print_table(&result.records),
    }

    print_summary(&result);

    if opts.trace {
        if opts.format == OutputFormat::Json {
            eprintln!("{}", serde_json::to_string_pretty(&result.trace)?);
        } else {
            print_trace(&result.trace);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

const TITLE_WIDTH: usize = 40;

fn print_table(records: &[VideoRecord]) {
    if records.is_empty() {
        return;
    }
    println!("{:<14} {:<TITLE_WIDTH$} {:<4} VIDEO URL", "ID", "TITLE", "LANG");
    for r in records {
        println!(
            "{:<14} {:<TITLE_WIDTH$} {:<4} {}",
            clip(&r.id, 14),
            clip(&r.title, TITLE_WIDTH),
            r.language,
            r.video_url
        );
    }
}

/// Shorten to `max` characters, marking the cut with an ellipsis.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn print_summary(result: &HarvestResult) {
    let stats = &result.stats;
    eprintln!();
    eprintln!(
        "  Strategy:   {}",
        result.strategy.map(|s| s.name()).unwrap_or("none")
    );
    eprintln!("  Records:    {}", stats.total);
    eprintln!("  With title: {}", stats.with_title);
    eprintln!("  Thumbnails: {} found on page", stats.with_discovered_thumbnail);
    eprintln!("  Page size:  {} bytes", result.bytes);
    eprintln!("  Time:       {:.1}s", result.elapsed.as_secs_f64());

    if let Some(sample) = result.records.first() {
        eprintln!();
        eprintln!("  Sample record:");
        eprintln!("    ID:          {}", sample.id);
        eprintln!("    Title:       {}", sample.title);
        eprintln!("    Description: {}", clip(&sample.description, 80));
        eprintln!("    Video URL:   {}", sample.video_url);
        eprintln!("    Thumbnail:   {}", sample.thumbnail_url);
        eprintln!("    Language:    {}", sample.language);
    }
    eprintln!();
}

fn print_trace(trace: &DiagnosticTrace) {
    eprintln!("  Strategies:");
    for attempt in &trace.attempts {
        let mark = if Some(attempt.strategy) == trace.selected { "*" } else { " " };
        eprint!("   {mark} {:<17} {:>3} candidates", attempt.strategy.name(), attempt.candidates);
        if let Some(detail) = &attempt.detail {
            eprint!(" via {detail}");
        }
        if let Some(error) = &attempt.error {
            eprint!(" (error: {error})");
        }
        eprintln!();
    }

    if let Some(c) = &trace.correlation {
        eprintln!(
            "  Correlation: {} urls, {} ids, {} contained, {} positional",
            c.urls, c.ids, c.contained, c.positional
        );
    }

    if !trace.skipped.is_empty() {
        let reasons: Vec<String> = trace
            .skipped
            .iter()
            .map(|s| format!("#{} {:?}", s.candidate, s.reason).to_lowercase())
            .collect();
        eprintln!("  Skipped:    {}", reasons.join(", "));
    }

    let count = |source: ThumbnailSource| trace.thumbnails.iter().filter(|t| t.source == source).count();
    eprintln!(
        "  Thumbnails: {} discovered, {} primary, {} fallback, {} placeholder, {} random",
        count(ThumbnailSource::Discovered),
        count(ThumbnailSource::Primary),
        count(ThumbnailSource::Fallback),
        count(ThumbnailSource::Placeholder),
        count(ThumbnailSource::Random),
    );
    eprintln!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _result: &HarvestResult) {
        self.clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_flags() {
        let cli = Cli::try_parse_from([
            "clipscout",
            "parse",
            "page.html",
            "-n",
            "5",
            "--format",
            "csv",
            "--thumbnails",
            "placeholder",
            "--offline",
        ])
        .unwrap();
        let Command::Parse { file, opts } = cli.command else {
            panic!("expected parse command");
        };
        assert_eq!(file, PathBuf::from("page.html"));
        assert_eq!(opts.count, Some(5));
        assert_eq!(opts.format, OutputFormat::Csv);
        assert_eq!(opts.thumbnails, ThumbnailPolicy::Placeholder);
        assert!(opts.offline);
        assert!(!opts.trace);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let parsed =
            Cli::try_parse_from(["clipscout", "extract", "https://artlist.io", "--thumbnails", "maybe"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn clip_marks_truncation() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("Sunset over the ocean", 10), "Sunset ov…");
    }
}
