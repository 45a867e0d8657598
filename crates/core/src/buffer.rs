//! Component A: frame-aligned ring buffer.
//!
//! Bridges arbitrary-size input chunks to fixed-size, exactly-timestamped
//! [`AudioFrame`]s. Append is push-only; frames are pulled out one at a
//! time with [`FrameAlignedBuffer::pop_frame`], never blocking.

use crate::audio::{pcm16le_to_f32, pcm32fle_to_f32, AudioFrame, SampleFormat, FRAME_SAMPLES, SAMPLE_RATE_HZ};
use crate::error::{Error, Result};

/// Monotonic append-only buffer that yields exactly [`FRAME_SAMPLES`]-sized
/// frames via `pop_frame`, plus one final zero-padded frame via `flush`.
///
/// Not thread-safe by design — one buffer belongs to exactly one logical
/// stream, matching the rest of the pipeline's single-owner frame flow.
#[derive(Debug, Default)]
pub struct FrameAlignedBuffer {
    samples: Vec<f32>,
    /// Count of samples appended to `samples` (before popped samples are
    /// dropped from the front).
    total_samples_written: u64,
    /// Count of samples already handed out in a popped or flushed frame.
    total_samples_consumed: u64,
}

impl FrameAlignedBuffer {
    /// Create an empty buffer starting at stream position 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes in `format`. A no-op for an empty slice. Fails with
    /// `Error::InvalidInput` if `bytes.len()` is not a whole number of
    /// samples for `format`.
    pub fn append(&mut self, bytes: &[u8], format: SampleFormat) -> Result<()> {
        let width = format.sample_bytes();
        if bytes.is_empty() {
            return Ok(());
        }
        if bytes.len() % width != 0 {
            return Err(Error::InvalidInput(format!(
                "byte length {} is not a multiple of sample width {width} for {format:?}",
                bytes.len()
            )));
        }

        let new_samples = match format {
            SampleFormat::PcmS16Le => pcm16le_to_f32(bytes),
            SampleFormat::PcmF32Le => pcm32fle_to_f32(bytes),
        };
        self.total_samples_written += new_samples.len() as u64;
        self.samples.extend(new_samples);
        Ok(())
    }

    /// Return the next full frame if one is available, else `None`. Never
    /// blocks; callers poll until this returns `None`.
    pub fn pop_frame(&mut self) -> Option<AudioFrame> {
        if self.samples.len() < FRAME_SAMPLES {
            return None;
        }
        let start_ms = self.total_samples_consumed * 1000 / u64::from(SAMPLE_RATE_HZ);
        let mut frame_samples = [0.0f32; FRAME_SAMPLES];
        frame_samples.copy_from_slice(&self.samples[..FRAME_SAMPLES]);
        self.samples.drain(..FRAME_SAMPLES);
        self.total_samples_consumed += FRAME_SAMPLES as u64;
        Some(AudioFrame::new(frame_samples, start_ms))
    }

    /// Called once at stream close: returns a final frame zero-padded on
    /// the right if any residual samples remain, else `None`.
    pub fn flush(&mut self) -> Option<AudioFrame> {
        if self.samples.is_empty() {
            return None;
        }
        let start_ms = self.total_samples_consumed * 1000 / u64::from(SAMPLE_RATE_HZ);
        let mut frame_samples = [0.0f32; FRAME_SAMPLES];
        frame_samples[..self.samples.len()].copy_from_slice(&self.samples);
        let consumed = self.samples.len() as u64;
        self.samples.clear();
        self.total_samples_consumed += consumed;
        Some(AudioFrame::new(frame_samples, start_ms))
    }

    /// Total samples ever appended.
    pub fn total_samples_written(&self) -> u64 {
        self.total_samples_written
    }

    /// Total samples handed out via `pop_frame`/`flush`.
    pub fn total_samples_consumed(&self) -> u64 {
        self.total_samples_consumed
    }

    /// Samples buffered but not yet popped or flushed.
    pub fn pending_samples(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm16_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn partial_append_yields_no_frame() {
        let mut buf = FrameAlignedBuffer::new();
        let bytes = pcm16_bytes(&[0; 100]);
        buf.append(&bytes, SampleFormat::PcmS16Le).unwrap();
        assert!(buf.pop_frame().is_none());
    }

    #[test]
    fn exact_frame_pops_once() {
        let mut buf = FrameAlignedBuffer::new();
        let bytes = pcm16_bytes(&vec![0i16; FRAME_SAMPLES]);
        buf.append(&bytes, SampleFormat::PcmS16Le).unwrap();
        let frame = buf.pop_frame().unwrap();
        assert_eq!(frame.start_timestamp_ms, 0);
        assert!(buf.pop_frame().is_none());
    }

    #[test]
    fn timestamps_advance_across_frames() {
        let mut buf = FrameAlignedBuffer::new();
        let bytes = pcm16_bytes(&vec![0i16; FRAME_SAMPLES * 2]);
        buf.append(&bytes, SampleFormat::PcmS16Le).unwrap();
        let first = buf.pop_frame().unwrap();
        let second = buf.pop_frame().unwrap();
        assert_eq!(first.start_timestamp_ms, 0);
        assert_eq!(second.start_timestamp_ms, 32);
    }

    #[test]
    fn leftover_samples_carry_across_appends() {
        let mut buf = FrameAlignedBuffer::new();
        let first = pcm16_bytes(&vec![0i16; FRAME_SAMPLES - 10]);
        buf.append(&first, SampleFormat::PcmS16Le).unwrap();
        assert!(buf.pop_frame().is_none());
        let second = pcm16_bytes(&vec![0i16; 10]);
        buf.append(&second, SampleFormat::PcmS16Le).unwrap();
        assert!(buf.pop_frame().is_some());
        assert!(buf.pop_frame().is_none());
    }

    #[test]
    fn flush_zero_pads_residual_samples() {
        let mut buf = FrameAlignedBuffer::new();
        let bytes = pcm16_bytes(&vec![1i16; 256]);
        buf.append(&bytes, SampleFormat::PcmS16Le).unwrap();
        let frame = buf.flush().unwrap();
        assert_eq!(frame.as_slice().len(), FRAME_SAMPLES);
        assert_ne!(frame.as_slice()[0], 0.0);
        assert_eq!(frame.as_slice()[255 + 1], 0.0);
        assert!(buf.flush().is_none());
    }

    #[test]
    fn s1_silent_input_yields_62_frames_then_one_flush() {
        let mut buf = FrameAlignedBuffer::new();
        let bytes = pcm16_bytes(&vec![0i16; 32000]);
        buf.append(&bytes, SampleFormat::PcmS16Le).unwrap();
        let mut count = 0;
        while let Some(frame) = buf.pop_frame() {
            assert_eq!(frame.start_timestamp_ms, (count as u64) * 32);
            count += 1;
        }
        assert_eq!(count, 62);
        let last = buf.flush().unwrap();
        assert_eq!(last.start_timestamp_ms, 1984);
        assert!(buf.flush().is_none());
    }

    #[test]
    fn misaligned_bytes_rejected() {
        let mut buf = FrameAlignedBuffer::new();
        let err = buf.append(&[0u8; 3], SampleFormat::PcmS16Le).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn empty_append_is_a_no_op() {
        let mut buf = FrameAlignedBuffer::new();
        buf.append(&[], SampleFormat::PcmS16Le).unwrap();
        assert!(buf.pop_frame().is_none());
        assert_eq!(buf.total_samples_written(), 0);
    }
}
