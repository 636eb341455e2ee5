use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dubsync_core::{AnnotatedSegment, AppConfig, Device, EncodingMode};
use dubsync_sync::{Pipeline, Segmenter};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "dubsync.toml";

#[derive(Parser)]
#[command(name = "dubsync", about = "Dub a video and resynchronize it to the new speech")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full dubbing pipeline on a video
    Run {
        video: PathBuf,
        /// Output video path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Encoding mode, overrides the config file
        #[arg(long)]
        mode: Option<EncodingMode>,
    },
    /// Segment a Whisper-style JSON transcript into subtitles
    Segment {
        transcript: PathBuf,
        /// Write the SRT here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {path:?}")),
        None if Path::new(DEFAULT_CONFIG).exists() => AppConfig::load_from_file(Path::new(DEFAULT_CONFIG))
            .with_context(|| format!("failed to load config from {DEFAULT_CONFIG:?}")),
        None => Ok(AppConfig::default()),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")
}

/// True when `nvidia-smi` lists at least one GPU.
fn cuda_available() -> bool {
    match Command::new("nvidia-smi").arg("-L").output() {
        Ok(out) => out.status.success() && !out.stdout.is_empty(),
        Err(_) => false,
    }
}

fn default_output(config: &AppConfig, video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    config
        .general
        .work_dir
        .join(format!("{stem}_{}.mp4", config.tts.engine))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    init_tracing(&config.general.log_level)?;

    match cli.command {
        Commands::Run {
            video,
            output,
            mode,
        } => {
            if let Some(mode) = mode {
                config.render.mode = mode;
            }
            let device = config.general.device_setting()?.resolve(cuda_available);
            std::fs::create_dir_all(&config.general.work_dir).with_context(|| {
                format!("failed to create work dir {:?}", config.general.work_dir)
            })?;
            let output = output.unwrap_or_else(|| default_output(&config, &video));

            tracing::info!(%device, "dubsync starting");
            let pipeline = Pipeline::from_config(config, device)
                .await
                .context("failed to initialize engines")?;
            let report = pipeline.run(&video, &output).await;
            pipeline.shutdown().await;

            if let Some(e) = report.error {
                return Err(anyhow::Error::new(e).context(format!("dubbing {video:?} failed")));
            }
            tracing::info!(
                output = %report.output.display(),
                segments = report.segments,
                silent = report.silent_lines,
                encoder = ?report.encoder,
                "done"
            );
            for artifact in &report.artifacts {
                tracing::info!("subtitles: {}", artifact.display());
            }
        }
        Commands::Segment { transcript, output } => {
            let json = std::fs::read_to_string(&transcript)
                .with_context(|| format!("failed to read transcript {transcript:?}"))?;
            let parsed = dubsync_engine::parse_whisper_json(&json)
                .with_context(|| format!("failed to parse transcript {transcript:?}"))?;
            let segments: Vec<AnnotatedSegment> = Segmenter::new(config.segmenter.clone())
                .segment(&parsed.chunks, Some(parsed.text.as_str()))
                .into_iter()
                .map(AnnotatedSegment::from_tagged)
                .collect();
            if segments.is_empty() {
                tracing::warn!("no dialogue in {}", transcript.display());
            }
            let srt = dubsync_core::to_srt(&segments);
            match output {
                Some(path) => {
                    std::fs::write(&path, srt)
                        .with_context(|| format!("failed to write {path:?}"))?;
                    tracing::info!(segments = segments.len(), "wrote {}", path.display());
                }
                None => print!("{srt}"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "dubsync", "--config", "my.toml", "run", "in.mp4", "-o", "out.mp4", "--mode", "quality",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        match cli.command {
            Commands::Run {
                video,
                output,
                mode,
            } => {
                assert_eq!(video, PathBuf::from("in.mp4"));
                assert_eq!(output, Some(PathBuf::from("out.mp4")));
                assert_eq!(mode, Some(EncodingMode::Quality));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_cli_parses_segment() {
        let cli = Cli::try_parse_from(["dubsync", "segment", "t.json"]).unwrap();
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Commands::Segment { output: None, .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["dubsync", "run", "in.mp4", "--mode", "turbo"]).is_err());
    }

    #[test]
    fn test_default_output_uses_stem_and_tts_engine() {
        let config = AppConfig::default();
        let out = default_output(&config, Path::new("/videos/talk.mkv"));
        assert_eq!(out, config.general.work_dir.join("talk_null.mp4"));
    }

    #[test]
    fn test_device_resolution() {
        let config = AppConfig::default();
        let setting = config.general.device_setting().unwrap();
        assert_eq!(setting.resolve(|| false), Device::Cpu);
        assert_eq!(setting.resolve(|| true), Device::Cuda(0));
    }
}
