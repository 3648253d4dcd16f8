use std::io;

use ffimage::color::Rgb;
use ffimage::iter::{BytesExt, ColorConvertExt, PixelsExt};
use ffimage_yuv::{yuv::Yuv, yuv422::Yuv422};
use image::DynamicImage;

fn conversion_error() -> io::Error {
	return io::Error::new(
		io::ErrorKind::InvalidInput,
		"Failed to convert frame to image",
	);
}

/// Convert a packed YUYV (4:2:2) buffer into an RGB image
pub fn yuv422_to_image(
	src: &[u8],
	width: u32,
	height: u32,
) -> io::Result<DynamicImage> {
	let mut rgb = vec![0; (width * height * 3) as usize];
	src.iter()
		.copied()
		.pixels::<Yuv422<u8, 0, 2, 1, 3>>()
		.colorconvert::<[Yuv<u8>; 2]>()
		.flatten()
		.colorconvert::<Rgb<u8>>()
		.bytes()
		.write(&mut rgb);
	return image::RgbImage::from_vec(width, height, rgb)
		.map(DynamicImage::ImageRgb8)
		.ok_or_else(conversion_error);
}

/// Decode a compressed frame (MJPG and friends), guessing the format
/// from its header. The dimensions are taken from the data itself.
pub fn compressed_to_image(
	src: &[u8],
	_width: u32,
	_height: u32,
) -> io::Result<DynamicImage> {
	return image::load_from_memory(src).map_err(|e| {
		log::debug!("Compressed frame rejected: {}", e);
		conversion_error()
	});
}

/// Pack an image into the `0RGB` words a preview window expects
pub fn to_0rgb(img: &DynamicImage) -> Vec<u32> {
	return img
		.to_rgb8()
		.pixels()
		.map(|p| {
			(u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) |
				u32::from(p[2])
		})
		.collect();
}
