use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use audio_fingerprint::analysis::classifier::AudioCategory;
use audio_fingerprint::analysis::{AnalysisReport, BatchItem, ClipAnalyzer};
use audio_fingerprint::catalog::{
    ingest, Catalog, CatalogRecord, JsonCatalog, MetadataUpdate, SongId, SongMetadata,
};
use audio_fingerprint::config::AppConfig;
use audio_fingerprint::search::{DuplicatePair, Metric, ScoreKind, SearchEngine, SearchMatch};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "fingerprint_cli",
    about = "Fingerprint, classify and search a catalog of WAV clips"
)]
struct Cli {
    /// JSON config file (missing or malformed files fall back to defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Catalog file, overriding catalog.path from the config
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    /// Log analysis and catalog activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fingerprint and classify files without storing them
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Fingerprint files and store them in the catalog
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Title for the stored song (single file only; defaults to the file stem)
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
    },
    /// List catalog entries sorted by title
    List {
        /// Only songs whose title, artist or file name contains this text
        #[arg(long)]
        name: Option<String>,
        /// Only songs with this category label (e.g. "speech")
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one catalog entry in full
    Show { id: u64 },
    /// Rank catalog entries against a file or a stored song
    Search {
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        file: Option<PathBuf>,
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        top_k: Option<usize>,
        /// euclidean, manhattan or cosine
        #[arg(long)]
        metric: Option<Metric>,
    },
    /// List pairs of songs closer than the duplicate threshold
    Duplicates {
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Songs most similar to a stored song
    Recommend {
        id: u64,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Edit the title and/or artist of a stored song
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
    },
    /// Remove a song from the catalog
    Delete { id: u64 },
    /// Song count, per-category counts and total duration
    Stats,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = cli
        .config
        .as_ref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default();
    if let Some(path) = cli.catalog {
        config.catalog.path = path;
    }
    config.validate().context("validating configuration")?;

    let out = Output { json: cli.json };

    match cli.command {
        Commands::Analyze { files } => run_analyze(&config, &files, out),
        Commands::Ingest {
            files,
            title,
            artist,
        } => run_ingest(&config, &files, title, artist, out),
        Commands::List { name, category } => run_list(&config, name, category, out),
        Commands::Show { id } => run_show(&config, SongId(id)),
        Commands::Search {
            file,
            id,
            top_k,
            metric,
        } => run_search(&config, file, id.map(SongId), top_k, metric, out),
        Commands::Duplicates { threshold } => run_duplicates(&config, threshold, out),
        Commands::Recommend { id, top_k } => run_recommend(&config, SongId(id), top_k, out),
        Commands::Update { id, title, artist } => {
            run_update(&config, SongId(id), MetadataUpdate { title, artist })
        }
        Commands::Delete { id } => run_delete(&config, SongId(id)),
        Commands::Stats => run_stats(&config, out),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn analyzer(config: &AppConfig) -> Result<ClipAnalyzer> {
    config.analyzer().context("building analyzer")
}

fn open_catalog(config: &AppConfig) -> Result<JsonCatalog> {
    let path = &config.catalog.path;
    JsonCatalog::open(path).with_context(|| format!("opening catalog {}", path.display()))
}

#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> Vec<String>) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            for line in text() {
                println!("{line}");
            }
        }
        Ok(())
    }
}

fn run_analyze(config: &AppConfig, files: &[PathBuf], out: Output) -> Result<ExitCode> {
    let items = analyzer(config)?.analyze_batch(files);
    let payload: Vec<AnalyzePayload> = items.iter().map(AnalyzePayload::from).collect();

    out.emit(&payload, || {
        payload
            .iter()
            .map(|item| match (&item.report, &item.error) {
                (Some(report), _) => format!(
                    "{}\t{}\tconfidence={:.2}\tframes={}\tduration={:.2}s",
                    item.path.display(),
                    report.classification.category,
                    report.classification.confidence,
                    report.fingerprint.num_frames,
                    report.fingerprint.duration
                ),
                (None, error) => format!(
                    "{}\terror: {}",
                    item.path.display(),
                    error.as_deref().unwrap_or_default()
                ),
            })
            .collect()
    })?;

    Ok(batch_exit_code(&items))
}

fn run_ingest(
    config: &AppConfig,
    files: &[PathBuf],
    title: Option<String>,
    artist: Option<String>,
    out: Output,
) -> Result<ExitCode> {
    if title.is_some() && files.len() > 1 {
        bail!("--title can only be used when ingesting a single file");
    }

    let items = analyzer(config)?.analyze_batch(files);
    let catalog = open_catalog(config)?;
    let mut stored = Vec::new();

    for item in &items {
        let report = match &item.result {
            Ok(report) => report.clone(),
            Err(err) => {
                eprintln!("Skipping {}: {}", item.path.display(), err);
                continue;
            }
        };

        let mut metadata = SongMetadata::for_path(&item.path, report.sample_rate);
        if let Some(title) = &title {
            metadata = metadata.with_title(title.clone());
        }
        if let Some(artist) = &artist {
            metadata = metadata.with_artist(artist.clone());
        }

        let id = ingest(&catalog, metadata, report)
            .with_context(|| format!("storing {}", item.path.display()))?;
        stored.push(RecordPayload::from(&catalog.get(id)?));
    }

    out.emit(&stored, || {
        stored
            .iter()
            .map(|record| format!("Ingested {}\t{}\t{}", record.id, record.title, record.category))
            .collect()
    })?;

    Ok(batch_exit_code(&items))
}

fn run_list(
    config: &AppConfig,
    name: Option<String>,
    category: Option<String>,
    out: Output,
) -> Result<ExitCode> {
    let catalog = open_catalog(config)?;

    let category = category
        .map(|label| {
            AudioCategory::from_label(&label).ok_or_else(|| anyhow!("unknown category '{label}'"))
        })
        .transpose()?;

    let mut records = match &name {
        Some(keyword) => catalog.find_by_name(keyword),
        None => catalog.records(),
    }?;
    if let Some(category) = category {
        records.retain(|record| record.category == category);
    }
    records.sort_by(|a, b| a.metadata.title.cmp(&b.metadata.title));

    let payload: Vec<RecordPayload> = records.iter().map(RecordPayload::from).collect();
    out.emit(&payload, || {
        if payload.is_empty() {
            return vec!["No songs in catalog".to_string()];
        }
        payload.iter().map(RecordPayload::line).collect()
    })?;
    Ok(ExitCode::SUCCESS)
}

fn run_show(config: &AppConfig, id: SongId) -> Result<ExitCode> {
    let catalog = open_catalog(config)?;
    let record = catalog.get(id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(ExitCode::SUCCESS)
}

fn run_search(
    config: &AppConfig,
    file: Option<PathBuf>,
    id: Option<SongId>,
    top_k: Option<usize>,
    metric: Option<Metric>,
    out: Output,
) -> Result<ExitCode> {
    let catalog = open_catalog(config)?;
    let engine = SearchEngine::new(&catalog);
    let top_k = top_k.unwrap_or(config.search.top_k);
    let metric = match metric {
        Some(metric) => metric,
        None => config.search.metric()?,
    };

    let matches = match (file, id) {
        (Some(path), _) => {
            let report: AnalysisReport = analyzer(config)?
                .analyze_file(&path)
                .with_context(|| format!("analysing {}", path.display()))?;
            engine.search_fingerprint(&report.fingerprint, top_k, metric)
        }
        (None, Some(id)) => {
            let record = catalog.get(id)?;
            engine.search(&record.vector(), top_k, metric)
        }
        (None, None) => bail!("either --file or --id is required"),
    }?;

    emit_matches(&matches, out)
}

fn run_duplicates(config: &AppConfig, threshold: Option<f64>, out: Output) -> Result<ExitCode> {
    let catalog = open_catalog(config)?;
    let threshold = threshold.unwrap_or(config.search.duplicate_threshold);
    let pairs = SearchEngine::new(&catalog).find_duplicates(threshold)?;

    let payload: Vec<DuplicatePayload> = pairs.iter().map(DuplicatePayload::from).collect();
    out.emit(&payload, || {
        if payload.is_empty() {
            return vec![format!("No duplicates below {threshold}")];
        }
        payload
            .iter()
            .map(|pair| {
                format!(
                    "{} {}\t{} {}\tdistance={:.6}",
                    pair.first.id, pair.first.title, pair.second.id, pair.second.title, pair.distance
                )
            })
            .collect()
    })?;
    Ok(ExitCode::SUCCESS)
}

fn run_recommend(
    config: &AppConfig,
    id: SongId,
    top_k: Option<usize>,
    out: Output,
) -> Result<ExitCode> {
    let catalog = open_catalog(config)?;
    let matches = SearchEngine::new(&catalog)
        .recommend(id, top_k.unwrap_or(config.search.top_k))?;
    emit_matches(&matches, out)
}

fn run_update(config: &AppConfig, id: SongId, update: MetadataUpdate) -> Result<ExitCode> {
    if update.is_empty() {
        bail!("nothing to update: pass --title and/or --artist");
    }
    let catalog = open_catalog(config)?;
    catalog.update_metadata(id, &update)?;
    println!("Updated {id}");
    Ok(ExitCode::SUCCESS)
}

fn run_delete(config: &AppConfig, id: SongId) -> Result<ExitCode> {
    let catalog = open_catalog(config)?;
    if catalog.delete(id)? {
        println!("Deleted {id}");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("No catalog record with id {id}");
        Ok(ExitCode::from(2))
    }
}

fn run_stats(config: &AppConfig, out: Output) -> Result<ExitCode> {
    let catalog = open_catalog(config)?;
    let stats = catalog.stats()?;
    out.emit(&stats, || {
        let mut lines = vec![
            format!("songs: {}", stats.total_songs),
            format!("total duration: {:.2}s", stats.total_duration),
        ];
        lines.extend(
            stats
                .by_category
                .iter()
                .map(|(label, count)| format!("{label}: {count}")),
        );
        lines
    })?;
    Ok(ExitCode::SUCCESS)
}

fn emit_matches(matches: &[SearchMatch], out: Output) -> Result<ExitCode> {
    let payload: Vec<MatchPayload> = matches.iter().map(MatchPayload::from).collect();
    out.emit(&payload, || {
        if payload.is_empty() {
            return vec!["No matches".to_string()];
        }
        payload
            .iter()
            .map(|m| {
                let label = match m.kind {
                    ScoreKind::Distance => "distance",
                    ScoreKind::Similarity => "similarity",
                };
                format!("#{} {}\t{}\t{}={:.6}", m.rank, m.id, m.title, label, m.score)
            })
            .collect()
    })?;
    Ok(ExitCode::SUCCESS)
}

/// 0 when every file was analysed, 2 when some failed
fn batch_exit_code(items: &[BatchItem]) -> ExitCode {
    if items.iter().all(|item| item.result.is_ok()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

#[derive(Serialize)]
struct AnalyzePayload<'a> {
    path: &'a PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a BatchItem> for AnalyzePayload<'a> {
    fn from(item: &'a BatchItem) -> Self {
        Self {
            path: &item.path,
            report: item.result.as_ref().ok(),
            error: item.result.as_ref().err().map(|err| err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct RecordPayload {
    id: SongId,
    title: String,
    artist: Option<String>,
    category: AudioCategory,
    duration: f64,
    file_path: PathBuf,
}

impl RecordPayload {
    fn line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{:.2}s",
            self.id,
            self.title,
            self.artist.as_deref().unwrap_or("-"),
            self.category,
            self.duration
        )
    }
}

impl From<&CatalogRecord> for RecordPayload {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            id: record.id,
            title: record.metadata.title.clone(),
            artist: record.metadata.artist.clone(),
            category: record.category,
            duration: record.fingerprint.duration,
            file_path: record.metadata.file_path.clone(),
        }
    }
}

#[derive(Serialize)]
struct MatchPayload {
    rank: usize,
    id: SongId,
    title: String,
    category: AudioCategory,
    score: f64,
    kind: ScoreKind,
}

impl From<&SearchMatch> for MatchPayload {
    fn from(m: &SearchMatch) -> Self {
        Self {
            rank: m.rank,
            id: m.id,
            title: m.record.metadata.title.clone(),
            category: m.record.category,
            score: m.score,
            kind: m.kind,
        }
    }
}

#[derive(Serialize)]
struct DuplicatePayload {
    first: RecordPayload,
    second: RecordPayload,
    distance: f64,
}

impl From<&DuplicatePair> for DuplicatePayload {
    fn from(pair: &DuplicatePair) -> Self {
        Self {
            first: RecordPayload::from(&pair.first),
            second: RecordPayload::from(&pair.second),
            distance: pair.distance,
        }
    }
}
