//! WAV input boundary

use std::io::Read;

use anyhow::{bail, Context};

/// A mono sample stream and its sampling rate
#[derive(Clone, Debug)]
pub struct Recording {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Load the first (left) channel of a WAV file
///
/// Integer samples are scaled to `[-1.0, 1.0)`; the decoder's
/// statistics adapt to the actual signal level, so the scale choice
/// only matters for log readability.
pub fn load(path: &str) -> Result<Recording, anyhow::Error> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("unable to open input \"{}\"", path))?;
    read_stream(reader).with_context(|| format!("unable to read input \"{}\"", path))
}

fn read_stream<R>(mut reader: hound::WavReader<R>) -> Result<Recording, anyhow::Error>
where
    R: Read,
{
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("WAV header declares zero channels");
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .step_by(channels)
            .collect::<Result<_, _>>()
            .context("bad float sample data")?,
        hound::SampleFormat::Int => {
            let amplitude = (1i64 << spec.bits_per_sample.saturating_sub(1)) as f32;
            reader
                .samples::<i32>()
                .step_by(channels)
                .map(|sa| sa.map(|value| value as f32 / amplitude))
                .collect::<Result<_, _>>()
                .context("bad integer sample data")?
        }
    };

    Ok(Recording {
        samples,
        sample_rate: spec.sample_rate,
    })
}
