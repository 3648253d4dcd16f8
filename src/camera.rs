use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::DynamicImage;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::FourCC;

use crate::image_decode;

type ConverterFunction = Box<
	dyn Fn(&[u8], u32, u32) -> io::Result<DynamicImage>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetFrameSize {
	pub width: u32,
	pub height: u32,
}

impl Default for TargetFrameSize {
	fn default() -> TargetFrameSize {
		return TargetFrameSize { width: 640, height: 480 };
	}
}

/// Source of camera frames
pub enum Camera<'a> {
	V4l {
		index: u32,
		stream: v4l::prelude::MmapStream<'a>,
		format: v4l::Format,
		converter: ConverterFunction,
	},
	TestFrames {
		frames: VecDeque<io::Result<DynamicImage>>,
		released: Arc<AtomicUsize>,
	},
}

pub fn device_path(index: u32) -> String {
	return format!("/dev/video{}", index);
}

fn unavailable_error() -> io::Error {
	return io::Error::new(
		io::ErrorKind::NotFound,
		"No camera could be opened");
}

fn end_of_frames_error() -> io::Error {
	return io::Error::new(
		io::ErrorKind::NotFound,
		"End of test frames reached");
}

// lower resolution decodes faster, so take the size closest to the target
// and on ties the one enumerated first
fn choose_framesize(
	formats: &[(FourCC, v4l::FrameSize)], target: &TargetFrameSize)
-> Option<(FourCC, u32, u32)> {
	let mut best: Option<(u32, FourCC, u32, u32)> = None;
	for (fourcc, framesize) in formats {
		for discrete in framesize.size.to_discrete() {
			log::trace!("Available format: {} {}", fourcc, discrete);
			let diff_h = target.height.abs_diff(discrete.height);
			let diff_w = target.width.abs_diff(discrete.width);
			let score =
				diff_h * diff_h + diff_w * diff_w + diff_h * diff_w;
			let better = match best {
				Some((best_score, ..)) => score < best_score,
				None => true,
			};
			if better {
				best = Some((
					score, *fourcc,
					discrete.width, discrete.height));
			}
		}
	}
	return best.map(|(_, fourcc, width, height)| (fourcc, width, height));
}

fn negotiate_format(dev: &v4l::Device, target: &TargetFrameSize)
-> io::Result<v4l::Format> {
	let mut formats = vec![];
	for fourcc in [FourCC::new(b"YUYV"), FourCC::new(b"MJPG")] {
		for framesize in dev.enum_framesizes(fourcc)? {
			formats.push((fourcc, framesize));
		}
	}
	let (fourcc, width, height) = choose_framesize(&formats, target)
		.ok_or_else(|| io::Error::new(
			io::ErrorKind::InvalidInput,
			"No camera format supported"))?;
	let mut format = dev.format()?;
	format.fourcc = fourcc;
	format.width = width;
	format.height = height;
	log::debug!("Requesting camera format: {:?}", format);
	let format = dev.set_format(&format)?;
	log::debug!("Camera format set: {:?}", format);
	if format.fourcc != fourcc {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("Camera refused format {}", fourcc)));
	}
	return Ok(format);
}

fn converter_for_fourcc(fourcc: &FourCC) -> io::Result<ConverterFunction> {
	if *fourcc == FourCC::new(b"YUYV") {
		return Ok(Box::new(image_decode::yuv422_to_image));
	}
	if *fourcc == FourCC::new(b"MJPG") {
		return Ok(Box::new(image_decode::compressed_to_image));
	}
	return Err(io::Error::new(
		io::ErrorKind::InvalidInput,
		format!("No converter for camera format {}", fourcc)));
}

impl<'a> Camera<'a> {
	/// Open the v4l device `/dev/video<index>`
	///
	/// The device is configured with the YUYV or MJPG frame size closest
	/// to `target` and one frame is read to warm the stream up.
	pub fn open(index: u32, target: &TargetFrameSize)
	-> io::Result<Camera<'a>> {
		let mut dev = v4l::Device::with_path(device_path(index))?;
		let buffer_count = 4;
		let format = negotiate_format(&dev, target)?;
		let converter = converter_for_fourcc(&format.fourcc)?;
		let mut stream = v4l::prelude::MmapStream::with_buffers(
			&mut dev,
			v4l::buffer::Type::VideoCapture,
			buffer_count)?;
		stream.next()?; // warmup
		return Ok(Camera::V4l {
			index: index,
			stream: stream,
			format: format,
			converter: converter,
		});
	}

	/// Probe `indices` in order and return the first camera that opens
	///
	/// Every index is tried once. If none of them opens, an
	/// `io::ErrorKind::NotFound` error is returned.
	///
	/// ```
	/// use qrcode_recorder::{Camera, TargetFrameSize};
	///
	/// let res = Camera::open_first(&[], &TargetFrameSize::default());
	/// assert_eq!(res.err().unwrap().kind(), std::io::ErrorKind::NotFound);
	/// ```
	pub fn open_first(indices: &[u32], target: &TargetFrameSize)
	-> io::Result<Camera<'a>> {
		for &index in indices {
			match Camera::open(index, target) {
				Ok(camera) => {
					log::info!("Camera {} opened", index);
					return Ok(camera);
				},
				Err(e) => {
					log::warn!("Could not open camera {}: {}", index, e);
				},
			};
		}
		return Err(unavailable_error());
	}

	/// Create a `Camera` which hands out prepared frames
	///
	/// Each call to `read_frame` returns the next entry. Once the
	/// entries are used up, every read fails with
	/// `io::ErrorKind::NotFound`. `released` is incremented when the
	/// camera is released.
	///
	/// ```
	/// use std::collections::VecDeque;
	/// use std::io;
	/// use std::sync::Arc;
	/// use std::sync::atomic::{AtomicUsize, Ordering};
	/// use image::DynamicImage;
	/// use qrcode_recorder::Camera;
	///
	/// let released = Arc::new(AtomicUsize::new(0));
	/// let frames = VecDeque::from([
	///     Ok(DynamicImage::new_luma8(4, 4)),
	///     Err(io::Error::new(io::ErrorKind::TimedOut, "")),
	/// ]);
	/// let mut camera = Camera::with_test_frames(frames, released.clone());
	/// assert_eq!(camera.read_frame().unwrap().width(), 4);
	/// assert_eq!(camera.read_frame().unwrap_err().kind(),
	///            io::ErrorKind::TimedOut);
	/// assert_eq!(camera.read_frame().unwrap_err().kind(),
	///            io::ErrorKind::NotFound);
	/// camera.release();
	/// assert_eq!(released.load(Ordering::SeqCst), 1);
	/// ```
	pub fn with_test_frames(
		frames: VecDeque<io::Result<DynamicImage>>,
		released: Arc<AtomicUsize>)
	-> Camera<'a> {
		return Camera::TestFrames {
			frames: frames,
			released: released,
		};
	}

	/// Grab the next frame and convert it to an image
	pub fn read_frame(&mut self) -> io::Result<DynamicImage> {
		return match self {
			Camera::V4l {
				stream,
				format,
				converter,
				..
			} => {
				let (buf, _meta) = stream.next()?;
				(converter)(buf, format.width, format.height)
			},
			Camera::TestFrames { frames, .. } => {
				match frames.pop_front() {
					Some(frame) => frame,
					None => Err(end_of_frames_error()),
				}
			},
		};
	}

	/// Stop streaming and hand the device back
	pub fn release(self) {
		match self {
			Camera::V4l { index, stream, .. } => {
				drop(stream);
				log::debug!("Camera {} released", index);
			},
			Camera::TestFrames { released, .. } => {
				released.fetch_add(1, Ordering::SeqCst);
			},
		};
	}
}
