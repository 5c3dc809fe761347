//! Default input device capture (cpal). The audio callback only appends
//! mono samples to a shared ring; the render thread does the FFT.

use crate::spectrum::SpectrumAnalyzer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use vj_core::{band_energies_from_bytes, AudioBridge, BandEnergies, FFT_SIZE};

/// Most recent `capacity` mono samples.
pub struct SampleRing {
    buf: VecDeque<f32>,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(sample);
    }

    pub fn copy_into(&self, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.buf.iter().copied());
    }
}

pub type SharedSamples = Arc<Mutex<SampleRing>>;

pub fn shared_samples() -> SharedSamples {
    Arc::new(Mutex::new(SampleRing::new(FFT_SIZE)))
}

/// Open the default input device. `None` (logged) when no device or stream
/// is available; the engine then sees silence.
pub fn start_capture(shared: SharedSamples) -> Option<cpal::Stream> {
    let host = cpal::default_host();
    let Some(device) = host.default_input_device() else {
        log::warn!("[audio] no input device; running without audio");
        return None;
    };
    let config = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("[audio] no input config: {}", e);
            return None;
        }
    };
    let channels = config.channels() as usize;
    log::info!(
        "[audio] capturing from {} ({} ch, {} Hz)",
        device.name().unwrap_or_else(|_| "unknown".into()),
        channels,
        config.sample_rate().0
    );

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_input::<f32>(&device, &config.into(), channels, shared),
        cpal::SampleFormat::I16 => build_input::<i16>(&device, &config.into(), channels, shared),
        cpal::SampleFormat::U16 => build_input::<u16>(&device, &config.into(), channels, shared),
        other => {
            log::warn!("[audio] unsupported sample format {:?}", other);
            return None;
        }
    };
    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            log::warn!("[audio] could not open input stream: {}", e);
            return None;
        }
    };
    if let Err(e) = stream.play() {
        log::warn!("[audio] could not start input stream: {}", e);
        return None;
    }
    Some(stream)
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    shared: SharedSamples,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let Ok(mut ring) = shared.lock() else {
                return;
            };
            for frame in data.chunks(channels) {
                let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                ring.push(sum / frame.len() as f32);
            }
        },
        |err| log::warn!("[audio] input stream error: {}", err),
        None,
    )
}

/// Render-thread side: snapshot the ring and reduce it to band energies.
pub struct CaptureBridge {
    shared: SharedSamples,
    analyzer: SpectrumAnalyzer,
    scratch: Vec<f32>,
}

impl CaptureBridge {
    pub fn new(shared: SharedSamples) -> Self {
        Self {
            shared,
            analyzer: SpectrumAnalyzer::new(),
            scratch: Vec::with_capacity(FFT_SIZE),
        }
    }
}

impl AudioBridge for CaptureBridge {
    fn sample(&mut self) -> BandEnergies {
        match self.shared.lock() {
            Ok(ring) => ring.copy_into(&mut self.scratch),
            Err(_) => self.scratch.clear(),
        }
        band_energies_from_bytes(self.analyzer.process(&self.scratch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_keeps_only_the_newest_samples() {
        let mut ring = SampleRing::new(3);
        for s in [1.0, 2.0, 3.0, 4.0, 5.0] {
            ring.push(s);
        }
        let mut out = Vec::new();
        ring.copy_into(&mut out);
        assert_eq!(out, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn empty_ring_reads_as_silence() {
        let mut bridge = CaptureBridge::new(shared_samples());
        assert_eq!(bridge.sample(), BandEnergies::SILENCE);
    }
}
