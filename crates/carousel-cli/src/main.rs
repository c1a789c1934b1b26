use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use carousel_contracts::events::EventLog;
use carousel_contracts::models::{AspectRatio, ImageModel, ImageSize, ModelRegistry};
use carousel_contracts::pricing::{CostEstimate, PriceTable};
use carousel_contracts::prompts::{build_content_prompt, BRAND_PROMPT, DEFAULT_POST_CONTENT};
use carousel_engine::{
    BatchPlan, BatchProgress, BatchRunner, GenerationRequest, GenerationResult, GeneratorConfig,
    ImageGenerator, Logo, DEFAULT_FILE_PREFIX, MAX_IMAGES_PER_BATCH,
};
use clap::{Parser, Subcommand};

const DEFAULT_LOGO_PNG: &[u8] = include_bytes!("../assets/default_logo.png");

#[derive(Debug, Parser)]
#[command(
    name = "carousel-rs",
    version,
    about = "Generate branded carousel slides with Gemini image models"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one or more slides from the same post content.
    Generate(GenerateArgs),
    /// Show the estimated cost of a batch without generating anything.
    Estimate(EstimateArgs),
    /// List the supported image models.
    Models,
}

#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Output directory for slides and events.jsonl
    #[arg(long)]
    out: PathBuf,
    /// Post content in TITLE / SUBTITLE / BODY / CTA BUTTON form
    #[arg(long, conflicts_with = "content_file")]
    content: Option<String>,
    #[arg(long)]
    content_file: Option<PathBuf>,
    /// Replaces the built-in brand guidelines
    #[arg(long)]
    brand_prompt_file: Option<PathBuf>,
    #[arg(long, default_value = "gemini-3-pro-image-preview")]
    model: ImageModel,
    #[arg(long, default_value = "1:1")]
    aspect_ratio: AspectRatio,
    /// 1K, 2K or 4K; only gemini-3-pro-image-preview uses it (default 2K)
    #[arg(long)]
    image_size: Option<ImageSize>,
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_IMAGES_PER_BATCH))
    )]
    count: u32,
    /// PNG or JPEG logo; the bundled logo is used when omitted
    #[arg(long)]
    logo: Option<PathBuf>,
    #[arg(long, default_value = DEFAULT_FILE_PREFIX)]
    prefix: String,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "GEMINI_API_BASE")]
    api_base: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,
}

#[derive(Debug, Parser)]
struct EstimateArgs {
    #[arg(long, default_value = "gemini-3-pro-image-preview")]
    model: ImageModel,
    #[arg(long)]
    image_size: Option<ImageSize>,
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_IMAGES_PER_BATCH))
    )]
    count: u32,
}

fn main() {
    dotenv::dotenv().ok();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("carousel-rs error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Estimate(args) => run_estimate(&args),
        Command::Models => {
            for line in model_lines(&ModelRegistry::default()) {
                println!("{line}");
            }
            Ok(0)
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<i32> {
    let api_key = args
        .api_key
        .clone()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| non_empty_env("GEMINI_API_KEY"))
        .unwrap_or_default();
    let config = GeneratorConfig::new(api_key)?
        .with_api_base(args.api_base.as_deref().unwrap_or_default())
        .with_request_timeout(Duration::from_secs(args.timeout));

    let content = resolve_content(args.content.as_deref(), args.content_file.as_deref())?;
    let brand_prompt = match args.brand_prompt_file.as_deref() {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed reading brand prompt {}", path.display()))?,
        None => BRAND_PROMPT.to_string(),
    };
    let logo = load_logo(args.logo.as_deref())?;
    let request = GenerationRequest::new(
        brand_prompt,
        build_content_prompt(&content),
        logo,
        args.model,
        args.aspect_ratio,
        args.image_size,
    );
    for warning in request.warnings() {
        eprintln!("warning: {warning}");
    }

    let prices = PriceTable::default();
    if let Some(estimate) = prices.estimate(request.model(), request.image_size(), args.count) {
        println!("{}", format_estimate(&estimate));
    }

    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let generator = ImageGenerator::new(config);
    let plan = BatchPlan::new(args.count, &args.out).with_file_prefix(&args.prefix);
    let outcome = BatchRunner::new(&generator)
        .with_price_table(prices.clone())
        .with_events(EventLog::new(events_path))
        .run(&request, &plan, |progress| match progress {
            BatchProgress::Started { index, count } => {
                println!("Generating image {index} of {count}...");
            }
            BatchProgress::Saved { path, .. } => {
                println!("Saved {}", path.display());
            }
        });

    match outcome {
        Ok(results) => {
            println!("All images generated successfully!");
            let estimate = prices.estimate(request.model(), request.image_size(), args.count);
            println!("{}", format_summary(request.model(), &results, estimate.as_ref()));
            Ok(0)
        }
        Err(err) => {
            if !err.completed.is_empty() {
                eprintln!("Slides saved before the failure:");
                for result in &err.completed {
                    eprintln!("  {}", result.output_path().display());
                }
            }
            Err(err.into())
        }
    }
}

fn run_estimate(args: &EstimateArgs) -> Result<i32> {
    let image_size = if args.model.supports_image_size() {
        Some(args.image_size.unwrap_or_default())
    } else {
        None
    };
    let Some(estimate) = PriceTable::default().estimate(args.model, image_size, args.count) else {
        anyhow::bail!("no price listed for {}", args.model);
    };
    println!("Model: {}", args.model);
    if let Some(size) = image_size {
        println!("Resolution: {size}");
    }
    println!("{}", format_estimate(&estimate));
    println!("Estimated cost. Actual billing may vary.");
    Ok(0)
}

/// `--content` and `--content-file` are mutually exclusive; with neither, the
/// sample post is used.
fn resolve_content(content: Option<&str>, content_file: Option<&Path>) -> Result<String> {
    match (content, content_file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed reading content {}", path.display())),
        (None, None) => Ok(DEFAULT_POST_CONTENT.to_string()),
    }
}

fn load_logo(path: Option<&Path>) -> Result<Logo> {
    match path {
        Some(path) => {
            Logo::open(path).with_context(|| format!("failed loading logo {}", path.display()))
        }
        None => Logo::from_bytes(DEFAULT_LOGO_PNG).context("bundled default logo is unreadable"),
    }
}

fn format_estimate(estimate: &CostEstimate) -> String {
    format!(
        "Estimated cost: ${} per image, ${} total for {} image(s)",
        estimate.per_image_usd, estimate.total_usd, estimate.images
    )
}

fn format_summary(
    model: ImageModel,
    results: &[GenerationResult],
    estimate: Option<&CostEstimate>,
) -> String {
    let mut summary = format!(
        "Total images generated: {} | Model used: {model}",
        results.len()
    );
    if let Some(estimate) = estimate {
        summary.push_str(&format!(
            " | Estimated price: ${} (${} per image)",
            estimate.total_usd, estimate.per_image_usd
        ));
    }
    summary
}

fn model_lines(registry: &ModelRegistry) -> Vec<String> {
    registry
        .list()
        .map(|spec| {
            let resolution = if spec.supports_image_size {
                ImageSize::ALL
                    .iter()
                    .map(|size| size.as_str())
                    .collect::<Vec<_>>()
                    .join("|")
            } else {
                "managed by model".to_string()
            };
            format!(
                "{}\t{}\tprovider={} convention={} resolution={resolution}",
                spec.model,
                spec.label,
                spec.provider,
                spec.convention.as_str()
            )
        })
        .collect()
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
