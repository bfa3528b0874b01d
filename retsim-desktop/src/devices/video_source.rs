#[cfg(feature = "video")]
use ac_ffmpeg::{
    codec::{
        video::{
            frame::{PixelFormat, VideoFrame},
            scaler::{Algorithm, VideoFrameScaler},
            VideoDecoder,
        },
        Decoder,
    },
    format::{
        demuxer::{Demuxer, DemuxerWithCodecParameters},
        io::IO,
    },
};
#[cfg(feature = "video")]
use std::fs::File;
use std::io;
use std::path::Path;

use retsim::*;

/// Decodes the first video stream of a file into RGB frames.
///
/// Every decoded frame goes through the ffmpeg scaler into packed `rgb24`, whatever the
/// pixel format of the stream.
pub struct VideoSource {
    #[cfg(feature = "video")]
    demuxer: DemuxerWithCodecParameters<File>,
    #[cfg(feature = "video")]
    video_stream_index: usize,
    #[cfg(feature = "video")]
    video_decoder: VideoDecoder,
    #[cfg(feature = "video")]
    video_scaler: VideoFrameScaler,
    finished: bool,
}

#[cfg(feature = "video")]
fn video_error<E: std::fmt::Display>(err: E) -> Error {
    Error::Io(io::Error::new(io::ErrorKind::Other, err.to_string()))
}

impl VideoSource {
    #[cfg(feature = "video")]
    pub fn open<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let file = File::open(&path)?;

        // Create demuxer for accessing streams.
        let io = IO::from_seekable_read_stream(file);
        let demuxer = Demuxer::builder()
            .build(io)
            .map_err(video_error)?
            .find_stream_info(None)
            .map_err(|(_, err)| video_error(err))?;

        // Locate video stream and create a decoder.
        let (video_stream_index, video_params) = demuxer
            .codec_parameters()
            .iter()
            .enumerate()
            .find(|(_, params)| params.is_video_codec())
            .ok_or_else(|| video_error(format!("no video stream in {:?}", path)))?;
        let video_params = video_params
            .as_video_codec_parameters()
            .ok_or_else(|| video_error("unsupported video stream"))?;
        log::info!(
            "[video] {:?}: {}x{} {} ({})",
            path,
            video_params.width(),
            video_params.height(),
            video_params.pixel_format().name(),
            video_params.decoder_name().unwrap_or("n/a")
        );
        let video_decoder = VideoDecoder::from_codec_parameters(video_params)
            .map_err(video_error)?
            .build()
            .map_err(video_error)?;

        use std::str::FromStr;
        let target_format = PixelFormat::from_str("rgb24")
            .map_err(|err| video_error(format!("no rgb24 pixel format: {:?}", err)))?;
        let video_scaler = VideoFrameScaler::builder()
            .source_width(video_params.width())
            .source_height(video_params.height())
            .source_pixel_format(video_params.pixel_format())
            .target_width(video_params.width())
            .target_height(video_params.height())
            .target_pixel_format(target_format)
            .algorithm(Algorithm::FastBilinear)
            .build()
            .map_err(video_error)?;

        Ok(VideoSource {
            demuxer,
            video_stream_index,
            video_decoder,
            video_scaler,
            finished: false,
        })
    }

    #[cfg(not(feature = "video"))]
    pub fn open<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        Err(Error::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("cannot open {:?}: video feature is disabled", path),
        )))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[cfg(feature = "video")]
    fn decode_next(&mut self) -> Result<Option<Frame>, Error> {
        loop {
            if let Some(frame) = self.video_decoder.take().map_err(video_error)? {
                let rgb_frame = self.video_scaler.scale(&frame).map_err(video_error)?;
                return Self::convert(&rgb_frame).map(Some);
            }
            // Demux packets until the decoder has been fed.
            let mut fed = false;
            while let Some(packet) = self.demuxer.take().map_err(video_error)? {
                if packet.stream_index() == self.video_stream_index {
                    self.video_decoder.push(packet).map_err(video_error)?;
                    fed = true;
                    break;
                }
            }
            if !fed {
                return Ok(None);
            }
        }
    }

    #[cfg(feature = "video")]
    fn convert(rgb_frame: &VideoFrame) -> Result<Frame, Error> {
        let width = rgb_frame.width() as u32;
        let height = rgb_frame.height() as u32;
        let planes = rgb_frame.planes();
        let plane0 = planes
            .first()
            .ok_or_else(|| video_error("scaled frame without pixel data"))?;
        pack_rgb_lines(plane0.lines(), width, height)
    }
}

impl FrameSource for VideoSource {
    #[cfg(feature = "video")]
    fn next_frame(&mut self) -> Result<Frame, Error> {
        if self.finished {
            return Err(Error::InputUnavailable);
        }
        match self.decode_next() {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => {
                log::info!("[video] end of stream");
                self.finished = true;
                Err(Error::InputUnavailable)
            }
            Err(err) => {
                log::warn!("[video] skipping frame: {}", err);
                Err(Error::InputUnavailable)
            }
        }
    }

    #[cfg(not(feature = "video"))]
    fn next_frame(&mut self) -> Result<Frame, Error> {
        Err(Error::InputUnavailable)
    }
}

///
/// Copies packed `rgb24` lines into a frame, dropping the line padding ffmpeg adds for
/// alignment.
///
/// Missing or short lines are reported as [Error::DimensionMismatch].
///
pub fn pack_rgb_lines<'a, I>(lines: I, width: u32, height: u32) -> Result<Frame, Error>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let row_bytes = width as usize * 3;
    let mut rgb = try_alloc::<u8>(row_bytes * height as usize, "rgb frame")?;
    let mut rows = 0;
    for (line, row) in lines.into_iter().zip(rgb.chunks_exact_mut(row_bytes.max(1))) {
        let pixels = line.get(..row_bytes).ok_or(Error::DimensionMismatch {
            expected: (width, height),
            actual: ((line.len() / 3) as u32, height),
        })?;
        row.copy_from_slice(pixels);
        rows += 1;
    }
    if rows < height as usize && row_bytes > 0 {
        return Err(Error::DimensionMismatch {
            expected: (width, height),
            actual: (width, rows as u32),
        });
    }
    Frame::from_raw(width, height, rgb).ok_or(Error::DimensionMismatch {
        expected: (width, height),
        actual: (width, rows as u32),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_padding_is_dropped() {
        // 2x2 frame, lines padded to 8 bytes
        let lines: Vec<&[u8]> = vec![
            &[255, 0, 0, 0, 255, 0, 99, 99],
            &[0, 0, 255, 10, 20, 30, 99, 99],
        ];
        let frame = pack_rgb_lines(lines, 2, 2).unwrap();
        assert_eq!(frame.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(frame.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(frame.get_pixel(0, 1).0, [0, 0, 255]);
        assert_eq!(frame.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_short_planes_are_errors() {
        // a line narrower than the frame, e.g. a chroma plane handed over by mistake
        let narrow: Vec<&[u8]> = vec![&[1, 2, 3], &[4, 5, 6]];
        match pack_rgb_lines(narrow, 2, 2) {
            Err(Error::DimensionMismatch { expected, .. }) => assert_eq!(expected, (2, 2)),
            other => panic!("unexpected {:?}", other),
        }

        let missing: Vec<&[u8]> = vec![&[1, 2, 3, 4, 5, 6]];
        assert!(pack_rgb_lines(missing, 2, 2).is_err());
    }

    #[cfg(not(feature = "video"))]
    #[test]
    fn test_disabled_feature() {
        assert!(VideoSource::open("clip.mp4").is_err());
    }
}
