use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use pixrank_core::{CorpusItem, Descriptor};
use pixrank_similarity::{
    describe_corpus, CannyDetector, FeatureExtractor, Metric, Ranking, RankingReport, Region,
    RetrievalConfig, RetrievalPipeline,
};
use pixrank_storage::{scan_directory, EmbeddingTable, ImageLoader};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Bottom entries shown by the scene program unless --bottom is given
const SCENE_BOTTOM: usize = 5;

/// Rank a collection of images by visual similarity to a target
#[derive(Parser, Debug)]
#[command(name = "pixrank")]
#[command(about = "Content-based image retrieval", long_about = None)]
struct Cli {
    /// JSON file with bin counts, weights and thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Also show the N most dissimilar entries
    #[arg(long, global = true)]
    bottom: Option<usize>,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Show per-term contributions to each distance
    #[arg(long, global = true)]
    explain: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Center pixel patch compared by sum of squared differences
    Baseline(ImageArgs),
    /// rg-chromaticity histogram compared by histogram intersection
    Histogram(ImageArgs),
    /// Top and bottom half RGB histograms, fused intersection distance
    MultiHistogram(ImageArgs),
    /// Whole-image RGB histogram plus gradient magnitude histogram
    TextureColor(ImageArgs),
    /// Rank the rows of an embedding CSV against one of its own rows
    Embedding {
        /// Identifier of the target row
        target_id: String,
        /// Embedding CSV (identifier,v1,...,vn)
        csv: PathBuf,
        /// Number of matches to show
        k: usize,
        #[arg(long, value_enum, default_value_t = EmbeddingMetric::Cosine)]
        metric: EmbeddingMetric,
    },
    /// Warm-scene cues plus embeddings, weighted distance
    Scene {
        target: PathBuf,
        dir: PathBuf,
        /// Embedding CSV keyed by file name
        csv: PathBuf,
        k: usize,
    },
    /// Write flat descriptors for a directory as an embedding CSV
    Extract {
        dir: PathBuf,
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = FeatureKind::Chromaticity)]
        feature: FeatureKind,
    },
}

#[derive(clap::Args, Debug)]
struct ImageArgs {
    /// Target image
    target: PathBuf,
    /// Directory of corpus images
    dir: PathBuf,
    /// Number of matches to show
    k: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EmbeddingMetric {
    Cosine,
    Ssd,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FeatureKind {
    Patch,
    Chromaticity,
    Rgb,
    Texture,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Baseline(args) => run_images(
            &cli,
            args,
            FeatureExtractor::center_patch(&config),
            Metric::SumSquared,
        ),
        Command::Histogram(args) => run_images(
            &cli,
            args,
            FeatureExtractor::chromaticity(&config),
            Metric::HistogramIntersection,
        ),
        Command::MultiHistogram(args) => run_images(
            &cli,
            args,
            FeatureExtractor::top_bottom_rgb(&config),
            Metric::FusedHistogram(config.fusion),
        ),
        Command::TextureColor(args) => run_images(
            &cli,
            args,
            FeatureExtractor::texture_color(&config),
            Metric::FusedHistogram(config.fusion),
        ),
        Command::Embedding {
            target_id,
            csv,
            k,
            metric,
        } => run_embedding(&cli, target_id, csv, *k, *metric),
        Command::Scene { target, dir, csv, k } => run_scene(&cli, &config, target, dir, csv, *k),
        Command::Extract { dir, out, feature } => run_extract(&config, dir, out, *feature),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RetrievalConfig> {
    let Some(path) = path else {
        return Ok(RetrievalConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = RetrievalConfig::from_json(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn run_images(
    cli: &Cli,
    args: &ImageArgs,
    extractor: FeatureExtractor,
    metric: Metric,
) -> anyhow::Result<()> {
    let pipeline = RetrievalPipeline::new(extractor, metric)?.with_explain(cli.explain);
    rank_directory(cli, &pipeline, &args.target, &args.dir, args.k, cli.bottom.unwrap_or(0))
}

fn rank_directory(
    cli: &Cli,
    pipeline: &RetrievalPipeline,
    target: &Path,
    dir: &Path,
    k: usize,
    bottom: usize,
) -> anyhow::Result<()> {
    let loader = ImageLoader::new();
    let item = CorpusItem::from_path(target);
    let corpus = scan_directory(dir)
        .with_context(|| format!("Failed to read corpus directory {}", dir.display()))?;
    info!("Ranking {} images against {}", corpus.len(), item.id);

    let query = pipeline
        .describe_query(&item, &loader)
        .with_context(|| format!("Failed to describe target {}", target.display()))?;
    let ranking = pipeline.rank_images(&query, &corpus, &loader);
    print_report(cli, &item.id, pipeline.metric(), &ranking, k, bottom)
}

fn run_embedding(
    cli: &Cli,
    target_id: &str,
    csv: &Path,
    k: usize,
    metric: EmbeddingMetric,
) -> anyhow::Result<()> {
    let table = EmbeddingTable::read_csv(csv)
        .with_context(|| format!("Failed to load embeddings from {}", csv.display()))?;
    let entries = table.entries();
    let metric = match metric {
        EmbeddingMetric::Cosine => Metric::Cosine,
        EmbeddingMetric::Ssd => Metric::SumSquared,
    };

    let pipeline = RetrievalPipeline::new(FeatureExtractor::embedding(Arc::new(table)), metric)?
        .with_explain(cli.explain);
    let query = pipeline
        .describe_query(&CorpusItem::new(target_id, target_id), &ImageLoader::new())
        .with_context(|| format!("Failed to describe target {}", target_id))?;
    let ranking = pipeline.rank_descriptors(&query, entries);
    print_report(cli, target_id, pipeline.metric(), &ranking, k, cli.bottom.unwrap_or(0))
}

fn run_scene(
    cli: &Cli,
    config: &RetrievalConfig,
    target: &Path,
    dir: &Path,
    csv: &Path,
    k: usize,
) -> anyhow::Result<()> {
    let table = EmbeddingTable::read_csv(csv)
        .with_context(|| format!("Failed to load embeddings from {}", csv.display()))?;
    let extractor = FeatureExtractor::warm_scene(
        config,
        Arc::new(CannyDetector::new(config.edges)),
        Arc::new(table),
    );
    let pipeline =
        RetrievalPipeline::new(extractor, Metric::WeightedScene(config.scene))?.with_explain(cli.explain);
    rank_directory(cli, &pipeline, target, dir, k, cli.bottom.unwrap_or(SCENE_BOTTOM))
}

fn run_extract(
    config: &RetrievalConfig,
    dir: &Path,
    out: &Path,
    feature: FeatureKind,
) -> anyhow::Result<()> {
    let extractor = match feature {
        FeatureKind::Patch => FeatureExtractor::center_patch(config),
        FeatureKind::Chromaticity => FeatureExtractor::chromaticity(config),
        FeatureKind::Rgb => FeatureExtractor::region_rgb(config, Region::Whole),
        FeatureKind::Texture => FeatureExtractor::gradient_magnitude(config),
    };
    let corpus = scan_directory(dir)
        .with_context(|| format!("Failed to read corpus directory {}", dir.display()))?;
    info!("Extracting {} from {} images", extractor.name(), corpus.len());

    let (entries, skipped) = describe_corpus(&extractor, &corpus, &ImageLoader::new());
    let mut table = EmbeddingTable::new();
    for entry in entries {
        match entry.descriptor {
            Descriptor::Flat(vector) => {
                table.insert(entry.id, vector);
            }
            Descriptor::Composite(_) => warn!("Skipping {}: not a flat descriptor", entry.id),
        }
    }
    table
        .write_csv(out)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!(
        "Wrote {} descriptors to {} ({} skipped)",
        table.len(),
        out.display(),
        skipped.len()
    );
    Ok(())
}

fn print_report(
    cli: &Cli,
    query: &str,
    metric: &Metric,
    ranking: &Ranking,
    k: usize,
    bottom: usize,
) -> anyhow::Result<()> {
    let report = RankingReport::new(query, metric.name(), ranking, k, bottom);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Top {} matches for {} ({}):", report.top.len(), report.query, report.metric);
    for result in &report.top {
        println!("{}", result);
    }
    if !report.bottom.is_empty() {
        println!();
        println!("Bottom {} matches:", report.bottom.len());
        for result in &report.bottom {
            println!("{}", result);
        }
    }
    if !report.skipped.is_empty() {
        println!();
        println!("Skipped {} entries:", report.skipped.len());
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.id, skipped.reason);
        }
    }
    Ok(())
}
