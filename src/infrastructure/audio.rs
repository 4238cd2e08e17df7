use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
#[error("audio encoding failed: {0}")]
pub struct EncodeError(String);

/// Change playback speed by resampling.
///
/// The result is meant to be written at the original sample rate, so a
/// `speed` of 2.0 halves the sample count and plays twice as fast.
pub fn apply_speed(samples: &[f32], speed: f32) -> Vec<f32> {
    if (speed - 1.0).abs() < f32::EPSILON || samples.is_empty() || speed <= 0.0 {
        return samples.to_vec();
    }

    let out_len = ((samples.len() as f64) / speed as f64).round().max(1.0) as usize;
    let step = if out_len > 1 {
        (samples.len() - 1) as f64 / (out_len - 1) as f64
    } else {
        0.0
    };

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx];
            let b = samples.get(idx + 1).copied().unwrap_or(a);
            a + (b - a) * frac
        })
        .collect()
}

/// Encode mono f32 samples as a 16-bit PCM WAV file held in memory
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, EncodeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| EncodeError(e.to_string()))?;
        for &s in samples {
            // f32 [-1.0, 1.0] -> i16
            let s16 = (s * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            writer
                .write_sample(s16)
                .map_err(|e| EncodeError(e.to_string()))?;
        }
        writer.finalize().map_err(|e| EncodeError(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
