use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, SampleRate, SupportedStreamConfig, SupportedStreamConfigRange,
};
use log::{error, info, warn};

use crate::{
    engine::renderer::{connect, EngineHandle},
    error::{Error, Result},
    params::EffectParameters,
};

fn init_err(context: &str, err: impl std::fmt::Display) -> Error {
    Error::Initialization(format!("{context}: {err}"))
}

/// The default config if it is f32, otherwise the closest f32 one the device
/// offers.
///
/// Ranges with the default channel count come first. The default sample rate
/// is kept when the range allows it and clamped into the range when not.
fn pick_f32_config(
    default: SupportedStreamConfig,
    ranges: impl IntoIterator<Item = SupportedStreamConfigRange>,
) -> Option<SupportedStreamConfig> {
    if default.sample_format() == SampleFormat::F32 {
        return Some(default);
    }

    let mut ranges: Vec<_> = ranges
        .into_iter()
        .filter(|range| range.sample_format() == SampleFormat::F32)
        .collect();
    ranges.sort_by_key(|range| range.channels() != default.channels());

    let rate = default.sample_rate().0;
    ranges.into_iter().find_map(|range| {
        let clamped = rate.clamp(range.min_sample_rate().0, range.max_sample_rate().0);
        range.try_with_sample_rate(SampleRate(clamped))
    })
}

/// The system's default output device, playing a [`Renderer`](super::Renderer).
///
/// Dropping it stops the stream.
pub struct OutputDevice {
    _stream: cpal::Stream,
    sample_rate: u32,
    channels: u16,
}

impl OutputDevice {
    /// Open the default output device and start streaming.
    ///
    /// Streams are always f32. When the default config uses another format,
    /// the device's f32 configs are searched instead. Every failure is
    /// reported as [`Error::Initialization`].
    pub fn open(params: &EffectParameters) -> Result<(Self, EngineHandle)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Initialization("no default output device available".into()))?;
        let default = device
            .default_output_config()
            .map_err(|e| init_err("failed to fetch default output config", e))?;

        let default_format = default.sample_format();
        let supported = if default_format == SampleFormat::F32 {
            default
        } else {
            warn!("default output format is {default_format:?}, looking for an f32 config");
            let ranges = device
                .supported_output_configs()
                .map_err(|e| init_err("failed to list output configs", e))?;
            pick_f32_config(default, ranges).ok_or_else(|| {
                Error::Initialization(format!(
                    "no f32 output config available (default format {default_format:?})"
                ))
            })?
        };

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        let config = supported.config();

        let (mut renderer, handle) = connect(sample_rate as f32, params);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    renderer.render(data, channels as usize);
                },
                |err| error!("output stream error: {err}"),
                None,
            )
            .map_err(|e| init_err("failed to build output stream", e))?;
        stream
            .play()
            .map_err(|e| init_err("failed to start output stream", e))?;

        info!("output device open: {sample_rate} Hz, {channels} channels");

        Ok((
            Self {
                _stream: stream,
                sample_rate,
                channels,
            },
            handle,
        ))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
