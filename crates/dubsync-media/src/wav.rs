use dubsync_core::MediaError;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Write mono f32 samples followed by `pad_seconds` of silence.
pub fn write_padded_wav(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    pad_seconds: f64,
) -> Result<(), MediaError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).map_err(wav_err)?;
    for sample in samples {
        writer.write_sample(*sample).map_err(wav_err)?;
    }
    let padding = (sample_rate as f64 * pad_seconds.max(0.0)) as usize;
    for _ in 0..padding {
        writer.write_sample(0.0f32).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;
    Ok(())
}

/// Decode a WAV file into mono f32 samples, averaging channels.
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32), MediaError> {
    let mut reader = WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(wav_err)?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1) as u32)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(wav_err)?
        }
    };

    let mono = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };
    Ok((mono, spec.sample_rate))
}

fn wav_err(e: hound::Error) -> MediaError {
    MediaError::Wav(e.to_string())
}
