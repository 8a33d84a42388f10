use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use open_interview::config::{BackendKind, Config};
use open_interview::generation::prompts::InterviewType;
use open_interview::manager::{InterviewManager, InterviewRequest};

/// Generate mock-interview Q&A content from a job description and a resume,
/// exported as a .docx document and per-question voice files.
#[derive(Debug, Parser)]
#[command(name = "open-interview", version)]
struct Cli {
    /// Job description: literal text or a .txt/.pdf path
    #[arg(long)]
    jd: String,

    /// Candidate resume: literal text or a .txt/.pdf path
    #[arg(long)]
    resume: String,

    /// Position the candidate is applying for
    #[arg(long)]
    position: String,

    /// Interview type tag (unknown tags fall back to the general interview)
    #[arg(long, default_value = "generalQAs")]
    interview_type: String,

    /// Generation backend
    #[arg(long, default_value = "claude")]
    engine: String,

    /// Output language
    #[arg(long, default_value = "English")]
    language: String,

    /// Minimum sentences per generated answer
    #[arg(long, default_value_t = 6)]
    max_sentence: u32,

    /// Root directory for the generated artifact trees
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Number of generation rounds to aggregate
    #[arg(long, default_value_t = 1)]
    iteration: u32,

    /// Optional interviewer resume: literal text or a .txt/.pdf path
    #[arg(long)]
    interviewer_resume: Option<String>,

    /// Extra instructions appended to the system prompt
    #[arg(long)]
    custom_instructions: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let backend: BackendKind = cli.engine.parse()?;
    let config = Config::from_env(backend)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("open_interview={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("open-interview v{}", env!("CARGO_PKG_VERSION"));

    let manager = InterviewManager::new(&config)?;

    let mut request = InterviewRequest::new(
        cli.jd,
        cli.resume,
        cli.position,
        InterviewType::from_tag(&cli.interview_type),
    );
    request.language = cli.language;
    request.max_sentence = cli.max_sentence;
    request.output_dir = cli.output_dir.clone();
    request.iteration = cli.iteration;
    request.interviewer_resume = cli.interviewer_resume;
    request.custom_instructions = cli.custom_instructions;

    let mapping = manager.generate_interview(request).await?;

    info!(
        entries = mapping.len(),
        output = %cli.output_dir.display(),
        "interview generation finished"
    );
    Ok(())
}
