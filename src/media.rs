use anyhow::Ok;
use ffmpeg::encoder;
use ffmpeg::util::frame::{audio::Audio, video::Video};
use ffmpeg_next::{
    self as ffmpeg, channel_layout, codec, decoder, filter, format, media, picture, rescale,
    software, Dictionary, Error, Packet, Rational, Rescale,
};
use image::RgbaImage;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::compose::composite_frame;
use crate::error::OverlayError;
use crate::layers::Layer;

static INIT: OnceLock<Result<(), Error>> = OnceLock::new();

pub(crate) fn init() -> anyhow::Result<()> {
    (*INIT.get_or_init(|| {
        let result = ffmpeg::init();
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
        result
    }))?;
    Ok(())
}

/// What the render needs to know about a source video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MediaInfo {
    pub width: u32,
    pub height: u32,
    /// Seconds.
    pub duration: f64,
    pub has_audio: bool,
}

pub(crate) fn probe(input_path: &Path) -> anyhow::Result<MediaInfo> {
    let input = format::input(input_path)?;
    let video_stream = input
        .streams()
        .best(media::Type::Video)
        .ok_or(anyhow::anyhow!(Error::StreamNotFound))?;
    let decoder = codec::context::Context::from_parameters(video_stream.parameters())?
        .decoder()
        .video()?;

    let duration = if input.duration() > 0 {
        input.duration().rescale(rescale::TIME_BASE, (1, 1000)) as f64 / 1000.0
    } else {
        video_stream.duration() as f64 * f64::from(video_stream.time_base())
    };

    let info = MediaInfo {
        width: decoder.width(),
        height: decoder.height(),
        duration: duration.max(0.0),
        has_audio: input.streams().best(media::Type::Audio).is_some(),
    };
    debug!(path = %input_path.display(), ?info, "Probed input");
    Ok(info)
}

/// Audio encoding for one output.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AudioTarget {
    pub codec: codec::Id,
    pub name: &'static str,
    /// Output sample rate; the source rate when `None`.
    pub rate: Option<i32>,
    pub mono: bool,
    /// Bits per second; the source bit rate when `None`.
    pub bit_rate: Option<usize>,
    /// Container extension for a standalone audio file.
    pub extension: &'static str,
}

impl AudioTarget {
    pub(crate) const AAC: Self = Self {
        codec: codec::Id::AAC,
        name: "AAC encoder",
        rate: None,
        mono: false,
        bit_rate: None,
        extension: "m4a",
    };

    /// 16 kHz mono AAC at 32 kbit/s. Keeps an hour of speech near 14 MB.
    pub(crate) const SPEECH: Self = Self {
        codec: codec::Id::AAC,
        name: "AAC encoder",
        rate: Some(16_000),
        mono: true,
        bit_rate: Some(32_000),
        extension: "m4a",
    };
}

/// Stream start time in seconds. Unset start times count as zero.
fn stream_start(start_time: i64, time_base: Rational) -> f64 {
    // AV_NOPTS_VALUE
    if start_time == i64::MIN {
        return 0.0;
    }
    start_time as f64 * f64::from(time_base)
}

trait Transcoder {
    fn flush_filter_graph(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn receive_and_process_filtered_frames(
        &mut self,
        _output: &mut format::context::Output,
        _output_stream_time_base: Rational,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    fn send_packet_to_decoder(&mut self, packet: &Packet) -> anyhow::Result<()>;

    fn send_eof_to_decoder(&mut self) -> anyhow::Result<()>;

    fn receive_and_process_decoded_frames(
        &mut self,
        output: &mut format::context::Output,
        output_stream_time_base: Rational,
    ) -> anyhow::Result<()>;

    fn send_eof_to_encoder(&mut self) -> anyhow::Result<()>;

    fn receive_and_process_encoded_packets(
        &mut self,
        output: &mut format::context::Output,
        output_stream_time_base: Rational,
    ) -> anyhow::Result<()>;
}

/// Decodes video, composites overlay layers onto every frame, re-encodes as H.264.
struct VideoTranscoder<'a> {
    output_stream_index: usize,
    decoder: decoder::Video,
    encoder: encoder::Video,
    to_rgba: software::scaling::Context,
    to_yuv: software::scaling::Context,
    input_time_base: Rational,
    /// Source start time, subtracted so `t` starts at zero.
    start: f64,
    layers: &'a [Layer],
    end_time: Option<f64>,
    frames: u64,
}

impl<'a> VideoTranscoder<'a> {
    fn new(
        input_stream: &format::stream::Stream,
        output: &mut format::context::Output,
        output_stream_index: usize,
        layers: &'a [Layer],
        end_time: Option<f64>,
    ) -> anyhow::Result<Self> {
        let global_header = output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);
        let codec_params = input_stream.parameters();
        let decoder = codec::context::Context::from_parameters(codec_params)?
            .decoder()
            .video()?;

        let codec = encoder::find(codec::Id::H264)
            .ok_or_else(|| OverlayError::media_tool_missing("H.264 encoder"))?;
        let mut output_stream = output.add_stream(codec)?;
        let mut encoder = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        // 4:2:0 chroma needs even dimensions.
        let out_width = (decoder.width() & !1).max(2);
        let out_height = (decoder.height() & !1).max(2);
        encoder.set_height(out_height);
        encoder.set_width(out_width);
        encoder.set_aspect_ratio(decoder.aspect_ratio());
        encoder.set_format(format::Pixel::YUV420P);
        encoder.set_frame_rate(decoder.frame_rate());
        encoder.set_time_base(input_stream.time_base());
        output_stream.set_parameters(&encoder);

        if global_header {
            encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let mut opts = Dictionary::new();
        opts.set("preset", "medium");

        let opened_encoder = encoder.open_with(opts)?;
        output_stream.set_parameters(&opened_encoder);

        let to_rgba = software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            format::Pixel::RGBA,
            decoder.width(),
            decoder.height(),
            software::scaling::Flags::BILINEAR,
        )?;
        let to_yuv = software::scaling::Context::get(
            format::Pixel::RGBA,
            decoder.width(),
            decoder.height(),
            format::Pixel::YUV420P,
            out_width,
            out_height,
            software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            output_stream_index,
            decoder,
            encoder: opened_encoder,
            to_rgba,
            to_yuv,
            input_time_base: input_stream.time_base(),
            start: stream_start(input_stream.start_time(), input_stream.time_base()),
            layers,
            end_time,
            frames: 0,
        })
    }

    fn overlay(&mut self, decoded: &Video, t: f64) -> anyhow::Result<Video> {
        let mut rgba = Video::empty();
        self.to_rgba.run(decoded, &mut rgba)?;
        let mut canvas = frame_to_image(&rgba)?;
        composite_frame(&mut canvas, self.layers, t)?;
        image_to_frame(&canvas, &mut rgba);

        let mut yuv = Video::empty();
        self.to_yuv.run(&rgba, &mut yuv)?;
        Ok(yuv)
    }
}

/// Copy an RGBA frame into a tightly packed image, dropping row padding.
fn frame_to_image(frame: &Video) -> anyhow::Result<RgbaImage> {
    let width = frame.width();
    let height = frame.height();
    let stride = frame.stride(0);
    let row = width as usize * 4;
    let data = frame.data(0);

    let mut pixels = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        pixels.extend_from_slice(&data[y * stride..y * stride + row]);
    }
    RgbaImage::from_raw(width, height, pixels).ok_or(anyhow::anyhow!("Failed to create image buffer"))
}

fn image_to_frame(image: &RgbaImage, frame: &mut Video) {
    let stride = frame.stride(0);
    let row = image.width() as usize * 4;
    let data = frame.data_mut(0);
    for (y, pixels) in image.as_raw().chunks_exact(row).enumerate() {
        data[y * stride..y * stride + row].copy_from_slice(pixels);
    }
}

impl Transcoder for VideoTranscoder<'_> {
    fn send_packet_to_decoder(&mut self, packet: &Packet) -> anyhow::Result<()> {
        self.decoder
            .send_packet(packet)
            .map_err(anyhow::Error::from)
    }

    fn send_eof_to_decoder(&mut self) -> anyhow::Result<()> {
        self.decoder.send_eof().map_err(anyhow::Error::from)
    }

    fn receive_and_process_decoded_frames(
        &mut self,
        output: &mut format::context::Output,
        output_stream_time_base: Rational,
    ) -> anyhow::Result<()> {
        let mut decoded = Video::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let timestamp = decoded
                .timestamp()
                .or(decoded.pts())
                .ok_or(anyhow::anyhow!("No timestamp"))?;
            let t = timestamp as f64 * f64::from(self.input_time_base) - self.start;
            if self.end_time.is_some_and(|end| t >= end) {
                continue;
            }

            let mut frame = self.overlay(&decoded, t)?;
            frame.set_pts(Some(timestamp));
            frame.set_kind(picture::Type::None);
            self.encoder.send_frame(&frame)?;
            self.frames += 1;
            if self.frames % 250 == 0 {
                debug!(frames = self.frames, t, "Rendering");
            }
            self.receive_and_process_encoded_packets(output, output_stream_time_base)?;
        }
        Ok(())
    }

    fn send_eof_to_encoder(&mut self) -> anyhow::Result<()> {
        info!(frames = self.frames, "Video frames encoded");
        self.encoder.send_eof().map_err(anyhow::Error::from)
    }

    fn receive_and_process_encoded_packets(
        &mut self,
        output: &mut format::context::Output,
        output_stream_time_base: Rational,
    ) -> anyhow::Result<()> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.output_stream_index);
            packet.rescale_ts(self.input_time_base, output_stream_time_base);
            packet.write_interleaved(output)?;
        }
        Ok(())
    }
}

struct AudioTranscoder {
    output_stream_index: usize,
    decoder: decoder::Audio,
    encoder: encoder::Audio,
    filter_graph: filter::Graph,
    encoder_time_base: Rational,
    input_time_base: Rational,
    start: f64,
    end_time: Option<f64>,
}

impl AudioTranscoder {
    fn new(
        input_stream: &format::stream::Stream,
        output: &mut format::context::Output,
        output_stream_index: usize,
        target: AudioTarget,
        end_time: Option<f64>,
    ) -> anyhow::Result<Self> {
        let global_header = output
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);
        let codec_params = input_stream.parameters();
        let mut decoder = codec::context::Context::from_parameters(codec_params)?
            .decoder()
            .audio()?;

        if global_header {
            decoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let codec = encoder::find(target.codec)
            .ok_or_else(|| OverlayError::media_tool_missing(target.name))?
            .audio()?;
        let mut output_stream = output.add_stream(codec)?;
        let context = codec::context::Context::from_parameters(output_stream.parameters())?;
        let mut encoder = context.encoder().audio()?;

        if global_header {
            encoder.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let channel_layout = if target.mono {
            channel_layout::ChannelLayout::MONO
        } else {
            codec
                .channel_layouts()
                .map(|layouts| layouts.best(decoder.channel_layout().channels()))
                .unwrap_or(channel_layout::ChannelLayout::STEREO)
        };
        let rate = target.rate.unwrap_or(decoder.rate() as i32);
        let encoder_time_base = Rational(1, rate);

        encoder.set_channel_layout(channel_layout);
        encoder.set_rate(rate);
        encoder.set_format(
            codec
                .formats()
                .ok_or(anyhow::anyhow!("Unknown supported formats"))?
                .next()
                .ok_or(anyhow::anyhow!("Failed to get sample format"))?,
        );
        match target.bit_rate {
            Some(bit_rate) => encoder.set_bit_rate(bit_rate),
            None => {
                encoder.set_bit_rate(decoder.bit_rate());
                encoder.set_max_bit_rate(decoder.max_bit_rate());
            }
        }
        encoder.set_time_base(encoder_time_base);
        output_stream.set_time_base(encoder_time_base);

        let opened_encoder = encoder.open_as(codec)?;
        output_stream.set_parameters(&opened_encoder);

        // aresample pins the sink time base to 1/rate, matching the encoder.
        let filter_spec = format!("aresample={rate}");
        let filter_graph = Self::filter_graph(
            &filter_spec,
            &decoder,
            input_stream.time_base(),
            &opened_encoder,
        )?;

        Ok(Self {
            output_stream_index,
            decoder,
            encoder: opened_encoder,
            filter_graph,
            encoder_time_base,
            input_time_base: input_stream.time_base(),
            start: stream_start(input_stream.start_time(), input_stream.time_base()),
            end_time,
        })
    }

    fn filter_graph(
        spec: &str,
        decoder: &codec::decoder::Audio,
        input_time_base: Rational,
        encoder: &codec::encoder::Audio,
    ) -> anyhow::Result<filter::Graph> {
        let mut filter_graph = filter::Graph::new();

        let args = format!(
            "time_base={}:sample_rate={}:sample_fmt={}:channel_layout=0x{:x}",
            input_time_base,
            decoder.rate(),
            decoder.format().name(),
            decoder.channel_layout().bits()
        );

        filter_graph.add(
            &filter::find("abuffer").ok_or_else(|| OverlayError::media_tool_missing("abuffer filter"))?,
            "in",
            &args,
        )?;
        filter_graph.add(
            &filter::find("abuffersink")
                .ok_or_else(|| OverlayError::media_tool_missing("abuffersink filter"))?,
            "out",
            "",
        )?;

        {
            let mut out = filter_graph
                .get("out")
                .ok_or(anyhow::anyhow!("Failed to get filter"))?;
            out.set_sample_format(encoder.format());
            out.set_channel_layout(encoder.channel_layout());
            out.set_sample_rate(encoder.rate());
        }

        filter_graph.output("in", 0)?.input("out", 0)?.parse(spec)?;
        filter_graph.validate()?;

        debug!(graph = %filter_graph.dump(), "Audio filter graph");

        if let Some(codec) = encoder.codec() {
            if !codec
                .capabilities()
                .contains(ffmpeg::codec::capabilities::Capabilities::VARIABLE_FRAME_SIZE)
            {
                filter_graph
                    .get("out")
                    .ok_or(anyhow::anyhow!("Failed to get filter"))?
                    .sink()
                    .set_frame_size(encoder.frame_size());
            }
        }

        Ok(filter_graph)
    }

    fn add_frame_to_filter_graph(&mut self, frame: &Audio) -> anyhow::Result<()> {
        self.filter_graph
            .get("in")
            .ok_or(anyhow::anyhow!("Failed to get filter"))?
            .source()
            .add(frame)
            .map_err(|e| anyhow::anyhow!(e))
    }
}

impl Transcoder for AudioTranscoder {
    fn flush_filter_graph(&mut self) -> anyhow::Result<()> {
        self.filter_graph
            .get("in")
            .ok_or(anyhow::anyhow!("Failed to get filter"))?
            .source()
            .flush()
            .map_err(|e| anyhow::anyhow!(e))
    }

    fn receive_and_process_filtered_frames(
        &mut self,
        output: &mut format::context::Output,
        output_stream_time_base: Rational,
    ) -> anyhow::Result<()> {
        let mut frame = Audio::empty();
        while self
            .filter_graph
            .get("out")
            .ok_or(anyhow::anyhow!("Failed to get filter"))?
            .sink()
            .frame(&mut frame)
            .is_ok()
        {
            self.encoder.send_frame(&frame)?;
            self.receive_and_process_encoded_packets(output, output_stream_time_base)?;
        }
        Ok(())
    }

    fn send_packet_to_decoder(&mut self, packet: &Packet) -> anyhow::Result<()> {
        self.decoder
            .send_packet(packet)
            .map_err(anyhow::Error::from)
    }

    fn send_eof_to_decoder(&mut self) -> anyhow::Result<()> {
        self.decoder.send_eof().map_err(anyhow::Error::from)
    }

    fn receive_and_process_decoded_frames(
        &mut self,
        output: &mut format::context::Output,
        output_stream_time_base: Rational,
    ) -> anyhow::Result<()> {
        let mut frame = Audio::empty();
        while self.decoder.receive_frame(&mut frame).is_ok() {
            let timestamp = frame
                .timestamp()
                .or(frame.pts())
                .ok_or(anyhow::anyhow!("No timestamp"))?;
            let t = timestamp as f64 * f64::from(self.input_time_base) - self.start;
            if self.end_time.is_some_and(|end| t >= end) {
                continue;
            }
            frame.set_pts(Some(timestamp));
            self.add_frame_to_filter_graph(&frame)?;
            self.receive_and_process_filtered_frames(output, output_stream_time_base)?;
        }
        Ok(())
    }

    fn send_eof_to_encoder(&mut self) -> anyhow::Result<()> {
        self.encoder.send_eof().map_err(anyhow::Error::from)
    }

    fn receive_and_process_encoded_packets(
        &mut self,
        output: &mut format::context::Output,
        output_stream_time_base: Rational,
    ) -> anyhow::Result<()> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.output_stream_index);
            packet.rescale_ts(self.encoder_time_base, output_stream_time_base);
            packet.write_interleaved(output)?;
        }
        Ok(())
    }
}

/// One decode → (overlay) → encode pass over a source file.
pub(crate) struct TranscodeJob<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    /// Stop after this many seconds of source.
    pub limit: Option<f64>,
    /// Overlay layers for the video stream; `None` drops video entirely.
    pub video: Option<&'a [Layer]>,
    /// Audio encoding; `None` drops audio entirely.
    pub audio: Option<AudioTarget>,
}

pub(crate) fn transcode(job: &TranscodeJob<'_>) -> anyhow::Result<()> {
    let mut input = format::input(job.input)?;
    let mut output = format::output(job.output)?;
    let mut transcoders: HashMap<usize, Box<dyn Transcoder + '_>> = HashMap::new();

    let best_video = input.streams().best(media::Type::Video).map(|s| s.index());
    let best_audio = input.streams().best(media::Type::Audio).map(|s| s.index());

    let mut stream_mapping: HashMap<usize, usize> = HashMap::new();
    let mut output_stream_index = 0;
    for ist in input.streams() {
        let ist_index = ist.index();
        let transcoder: Box<dyn Transcoder + '_> = if Some(ist_index) == best_video {
            match job.video {
                Some(layers) => Box::new(VideoTranscoder::new(
                    &ist,
                    &mut output,
                    output_stream_index,
                    layers,
                    job.limit,
                )?),
                None => continue,
            }
        } else if Some(ist_index) == best_audio {
            match job.audio {
                Some(target) => Box::new(AudioTranscoder::new(
                    &ist,
                    &mut output,
                    output_stream_index,
                    target,
                    job.limit,
                )?),
                None => continue,
            }
        } else {
            continue;
        };
        transcoders.insert(ist_index, transcoder);
        stream_mapping.insert(ist_index, output_stream_index);
        output_stream_index += 1;
    }

    if transcoders.is_empty() {
        return Err(anyhow::anyhow!(
            "{} has no stream to transcode",
            job.input.display()
        ));
    }

    output.set_metadata(input.metadata().to_owned());
    output.write_header()?;

    let mut output_stream_time_base = vec![Rational(0, 0); output.nb_streams() as _];
    for (ost_index, time_base) in output_stream_time_base.iter_mut().enumerate() {
        *time_base = output
            .stream(ost_index)
            .ok_or(anyhow::anyhow!(Error::StreamNotFound))?
            .time_base();
    }
    debug!(
        input = %job.input.display(),
        output = %job.output.display(),
        streams = transcoders.len(),
        limit = ?job.limit,
        "Transcoding"
    );

    let mut finished: HashSet<usize> = HashSet::new();
    for (ist, packet) in input.packets() {
        let ist_index = ist.index();
        let Some(&ost_index) = stream_mapping.get(&ist_index) else {
            continue;
        };
        if let (Some(limit), Some(pts)) = (job.limit, packet.pts().or(packet.dts())) {
            let start_pts = match ist.start_time() {
                i64::MIN => 0,
                start => start,
            };
            let end_pts = start_pts + ((limit * 1000.0) as i64).rescale((1, 1000), ist.time_base());
            if pts >= end_pts {
                finished.insert(ist_index);
                if finished.len() == stream_mapping.len() {
                    break;
                }
                continue;
            }
        }

        let ost_time_base = output_stream_time_base[ost_index];
        if let Some(transcoder) = transcoders.get_mut(&ist_index) {
            transcoder.send_packet_to_decoder(&packet)?;
            transcoder.receive_and_process_decoded_frames(&mut output, ost_time_base)?;
        }
    }

    for (ist_index, transcoder) in transcoders.iter_mut() {
        let ost_time_base = output_stream_time_base[stream_mapping[ist_index]];
        transcoder.send_eof_to_decoder()?;
        transcoder.receive_and_process_decoded_frames(&mut output, ost_time_base)?;
        transcoder.flush_filter_graph()?;
        transcoder.receive_and_process_filtered_frames(&mut output, ost_time_base)?;
        transcoder.send_eof_to_encoder()?;
        transcoder.receive_and_process_encoded_packets(&mut output, ost_time_base)?;
    }

    output.write_trailer()?;

    Ok(())
}

/// Render `layers` over the source video into an H.264/AAC file.
pub(crate) fn render(
    input_path: &Path,
    output_path: &Path,
    layers: &[Layer],
    limit: Option<f64>,
) -> anyhow::Result<()> {
    transcode(&TranscodeJob {
        input: input_path,
        output: output_path,
        limit,
        video: Some(layers),
        audio: Some(AudioTarget::AAC),
    })
}

/// Write the source's audio track as compact speech audio for transcription.
pub(crate) fn extract_audio(
    input_path: &Path,
    wav_path: &Path,
    limit: Option<f64>,
) -> anyhow::Result<()> {
    transcode(&TranscodeJob {
        input: input_path,
        output: wav_path,
        limit,
        video: None,
        audio: Some(AudioTarget::SPEECH),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_image_roundtrip_respects_stride() {
        init().unwrap();
        let mut frame = Video::new(format::Pixel::RGBA, 3, 2);
        let stride = frame.stride(0);
        assert!(stride >= 12);
        {
            let data = frame.data_mut(0);
            for y in 0..2 {
                for x in 0..12 {
                    data[y * stride + x] = (y * 12 + x) as u8;
                }
            }
        }

        let image = frame_to_image(&frame).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.as_raw()[12], 12);
        assert_eq!(image.get_pixel(2, 1).0, [20, 21, 22, 23]);

        let mut copy = Video::new(format::Pixel::RGBA, 3, 2);
        image_to_frame(&image, &mut copy);
        assert_eq!(&copy.data(0)[stride..stride + 12], &frame.data(0)[stride..stride + 12]);
    }

    #[test]
    fn test_audio_targets() {
        assert_eq!(AudioTarget::SPEECH.rate, Some(16_000));
        assert!(AudioTarget::SPEECH.mono);
        assert_eq!(AudioTarget::AAC.rate, None);
        assert_eq!(AudioTarget::AAC.bit_rate, None);
    }

    #[test]
    fn test_speech_target_fits_upload_limit() {
        let speech = AudioTarget::SPEECH;
        assert_eq!(speech.codec, codec::Id::AAC);
        assert_eq!(speech.extension, "m4a");
        let bytes_per_hour = speech.bit_rate.unwrap() as u64 / 8 * 3600;
        assert!(bytes_per_hour < crate::transcribe::MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_stream_start() {
        assert_eq!(stream_start(i64::MIN, Rational(1, 90_000)), 0.0);
        assert_eq!(stream_start(0, Rational(1, 1000)), 0.0);
        assert_eq!(stream_start(1536, Rational(1, 1024)), 1.5);
        assert_eq!(stream_start(-1024, Rational(1, 1024)), -1.0);
    }

    #[test]
    fn test_probe_missing_file() {
        init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(probe(&dir.path().join("missing.mp4")).is_err());
    }
}
