use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use studypack::audio::FfmpegEngine;
use studypack::config::{Config, LanguageMode};
use studypack::pipeline::Pipeline;
use studypack::request::{
    PackagedArchive, StudyRequest, StudyResponse, VideoUpload, VIDEO_CONTENT_TYPE,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "studypack")]
#[command(version, about = "Turn lecture videos into study material using AI")]
#[command(
    long_about = "Transcribe lecture videos with OpenAI Whisper, then build page-by-page summaries, quiz questions, and a running course summary with Google Gemini. Everything lands in one zip archive."
)]
struct Cli {
    /// Lecture videos in course order
    #[arg(required = true)]
    videos: Vec<PathBuf>,

    /// Output archive path
    #[arg(short, long, default_value = "results.zip")]
    output: PathBuf,

    /// Questions per quiz (a multiple of 3 between 3 and 21)
    #[arg(short = 'n', long, default_value_t = 9)]
    questions: usize,

    /// Treat the audio as hinglish (mixed Hindi and English)
    #[arg(long)]
    hinglish: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp4") => VIDEO_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

fn print_summary(output: &Path, archive: &PackagedArchive) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                     Study Material Ready                       ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Archive:  {}", output.display());
    println!("  Size:     {:.1} KB", archive.bytes.len() as f64 / 1024.0);
    if let Ok(zip) = zip::ZipArchive::new(Cursor::new(&archive.bytes)) {
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort_unstable();
        println!("  Contents:");
        for name in names {
            println!("    {}", name);
        }
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    for video in &cli.videos {
        if !video.exists() {
            anyhow::bail!("Video file not found: {}", video.display());
        }
    }

    FfmpegEngine::check().await?;

    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    let pipeline = Pipeline::from_config(&config)?;

    let language_mode = if cli.hinglish {
        LanguageMode::Hinglish
    } else {
        LanguageMode::Standard
    };

    let mut uploads = Vec::with_capacity(cli.videos.len());
    for video in &cli.videos {
        let data = tokio::fs::read(video)
            .await
            .with_context(|| format!("Failed to read {}", video.display()))?;
        let file_name = video
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "lecture.mp4".to_string());
        uploads.push(VideoUpload {
            content_type: content_type_for(video).to_string(),
            file_name,
            data,
        });
    }

    info!("Lectures:  {}", uploads.len());
    info!("Questions: {}", cli.questions);
    info!("Mode:      {}", language_mode);
    info!("Output:    {}", cli.output.display());

    let request = StudyRequest {
        uploads,
        total_questions: cli.questions,
        language_mode,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message("Processing lectures...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let response = pipeline.process(request).await;
    spinner.finish_and_clear();

    match response {
        StudyResponse::Archive(archive) => {
            tokio::fs::write(&cli.output, &archive.bytes)
                .await
                .with_context(|| format!("Failed to write {}", cli.output.display()))?;
            print_summary(&cli.output, &archive);
            if let Some(error) = archive.error {
                anyhow::bail!(
                    "Processing stopped early: {}. Finished lectures were saved to {}",
                    error,
                    cli.output.display()
                );
            }
            Ok(())
        }
        StudyResponse::Error(error) => anyhow::bail!("{}", error.message),
    }
}
