//! Demo binary: reads a mono 16kHz WAV file, drives one `StreamProcessor`
//! over its samples, and prints every `CascadeResult` as it's produced.

use anyhow::{bail, Context, Result};
use futures::{pin_mut, stream, StreamExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use cascade_vad_config::{load_settings, Settings};
use cascade_vad_core::{EnergyInference, SampleFormat};
use cascade_vad_engine::CascadeResult;
use cascade_vad_stream::{StreamProcessor, StreamProcessorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let Some(path) = args.get(1) else {
        bail!("usage: file-runner <path-to-wav>");
    };

    let env = std::env::var("CASCADE_VAD_ENV").ok();
    let settings = load_settings(env.as_deref()).unwrap_or_else(|e| {
        eprintln!("warning: failed to load configuration ({e}), using defaults");
        Settings::default()
    });
    init_tracing(&settings);

    tracing::info!(path, "opening WAV file");
    let mut reader = hound::WavReader::open(path).with_context(|| format!("opening {path}"))?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.sample_rate != 16_000 || spec.bits_per_sample != 16 {
        bail!(
            "expected mono 16-bit PCM at 16kHz, got {} channel(s), {} Hz, {} bits",
            spec.channels,
            spec.sample_rate,
            spec.bits_per_sample
        );
    }

    let pcm_bytes: Vec<u8> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<i16>, _>>()
        .context("reading samples")?
        .into_iter()
        .flat_map(i16::to_le_bytes)
        .collect();

    let processor_config = StreamProcessorConfig {
        vad: settings.engine.vad,
        interruption: settings.engine.interruption,
        channel_capacity: settings.engine.channel_capacity,
        energy_gate_db: settings.engine.energy_gate_db,
    };
    let mut processor = StreamProcessor::open(processor_config, Box::new(EnergyInference::default()));

    const CHUNK_BYTES: usize = 4096;
    let chunks: Vec<_> = pcm_bytes
        .chunks(CHUNK_BYTES)
        .map(|c| (c.to_vec(), SampleFormat::PcmS16Le))
        .collect();
    let input = stream::iter(chunks);

    let out = processor.process_stream(input);
    pin_mut!(out);

    let mut segment_count = 0u64;
    while let Some(result) = out.next().await {
        match result? {
            CascadeResult::Frame { timestamp_ms, .. } => {
                tracing::debug!(timestamp_ms, "frame: no speech");
            }
            CascadeResult::Segment { segment } => {
                segment_count += 1;
                tracing::info!(
                    start_ms = segment.start_timestamp_ms,
                    end_ms = segment.end_timestamp_ms,
                    samples = segment.audio.len(),
                    "speech segment"
                );
            }
            CascadeResult::Interruption { event } => {
                tracing::info!(
                    timestamp_ms = event.timestamp_ms,
                    interrupted_state = ?event.interrupted_state,
                    confidence = event.confidence,
                    "interruption"
                );
            }
        }
    }

    let stats = processor.stats();
    tracing::info!(
        segments = segment_count,
        total_chunks_processed = stats.total_chunks_processed,
        average_processing_time_ms = stats.average_processing_time_ms,
        error_rate = stats.error_rate,
        "done"
    );

    Ok(())
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("cascade_vad={}", settings.observability.log_level).into());

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
