//! armrest CLI — armrest and desk height assessment from a photo.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use armrest::{
    classify_record, AssessConfig, Assessor, AssessmentRecord, NoopSink, ScratchDir, Side,
    StaticEnvironment, StaticPose,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "armrest")]
#[command(about = "Assess armrest and desk height against the resting elbow from a side photo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess one image using recorded pose and object detections.
    Assess(CliAssessArgs),

    /// Classify a stored result record.
    Classify {
        /// Path to the result record (JSON).
        #[arg(long)]
        record: PathBuf,

        /// Optional configuration file (JSON); only the classifier section is used.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration as JSON.
    DefaultConfig,

    /// Remove every file from a scratch directory.
    CleanScratch {
        #[arg(long)]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CliAssessArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Recorded pose landmarks (JSON, normalized coordinates per side).
    #[arg(long)]
    pose: PathBuf,

    /// Recorded object detections (JSON array of labeled boxes).
    #[arg(long)]
    objects: PathBuf,

    /// Arm to assess; overrides the configuration file.
    #[arg(long, value_enum)]
    side: Option<SideArg>,

    /// Configuration file (JSON). Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the result record and verdict (JSON). Printed when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the annotated image.
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// Directory for intermediate images.
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Path to write a versioned debug dump (JSON).
    #[arg(long)]
    debug_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SideArg {
    Left,
    Right,
}

impl SideArg {
    fn to_core(self) -> Side {
        match self {
            Self::Left => Side::Left,
            Self::Right => Side::Right,
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assess(args) => run_assess(&args),
        Commands::Classify { record, config } => run_classify(&record, config.as_deref()),
        Commands::DefaultConfig => run_default_config(),
        Commands::CleanScratch { dir } => run_clean_scratch(&dir),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<AssessConfig> {
    match path {
        Some(p) => AssessConfig::from_json_file(p).map_err(|e| -> CliError {
            format!("Failed to load config {}: {}", p.display(), e).into()
        }),
        None => Ok(AssessConfig::default()),
    }
}

// ── assess ─────────────────────────────────────────────────────────────

fn run_assess(args: &CliAssessArgs) -> CliResult<()> {
    tracing::info!("Loading image: {}", args.image.display());

    let frame = image::open(&args.image)
        .map_err(|e| -> CliError {
            format!("Failed to open image {}: {}", args.image.display(), e).into()
        })?
        .to_rgb8();
    let (w, h) = frame.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(side) = args.side {
        config.side = side.to_core();
    }

    let pose = StaticPose::from_json_file(&args.pose)?;
    let objects = StaticEnvironment::from_json_file(&args.objects)?;
    let assessor = Assessor::new(config, &pose, &objects);

    let scratch = match &args.scratch_dir {
        Some(dir) => {
            let name = args
                .image
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("frame");
            Some(ScratchDir::new(dir, name)?)
        }
        None => None,
    };
    let sink: &dyn armrest::DiagnosticSink = match &scratch {
        Some(s) => s,
        None => &NoopSink,
    };

    let (assessment, dump) = if args.debug_json.is_some() {
        let (a, mut d) = assessor.assess_with_debug(&frame, sink);
        d.image.path = Some(args.image.display().to_string());
        (a, Some(d))
    } else {
        (assessor.assess_with_sink(&frame, sink), None)
    };

    tracing::info!("Verdict: {}", assessment.verdict);

    let output = serde_json::json!({
        "record": assessment.record,
        "verdict": assessment.verdict,
    });
    let json = serde_json::to_string_pretty(&output)?;
    match &args.out {
        Some(out) => {
            std::fs::write(out, &json)?;
            tracing::info!("Results written to {}", out.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = &args.annotated {
        assessment.annotated.save(path)?;
        tracing::info!("Annotated image written to {}", path.display());
    }

    if let (Some(path), Some(dump)) = (&args.debug_json, dump) {
        dump.write_json(path)?;
        tracing::info!("Debug dump written to {}", path.display());
    }

    Ok(())
}

// ── classify ───────────────────────────────────────────────────────────

fn run_classify(record_path: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let record = AssessmentRecord::from_json_file(record_path).map_err(|e| -> CliError {
        format!("Failed to load record {}: {}", record_path.display(), e).into()
    })?;
    let verdict = classify_record(&record, &config.classifier);
    println!("{verdict}");
    Ok(())
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&AssessConfig::default())?);
    Ok(())
}

// ── clean-scratch ──────────────────────────────────────────────────────

fn run_clean_scratch(dir: &Path) -> CliResult<()> {
    ScratchDir::clean(dir)?;
    tracing::info!("Cleaned {}", dir.display());
    Ok(())
}
