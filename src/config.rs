use std::path::PathBuf;
use std::time::Duration;

use crate::camera::TargetFrameSize;

pub struct ScannerConfig {
	/// probed in order, each maps to `/dev/video<N>`
	pub camera_indices: Vec<u32>,
	pub frame_size: TargetFrameSize,
	pub output_path: PathBuf,
	/// pause after a failed frame read
	pub retry_delay: Duration,
	pub window_title: String,
}

impl Default for ScannerConfig {
	fn default() -> ScannerConfig {
		return ScannerConfig {
			camera_indices: vec![0, 1, 2],
			frame_size: TargetFrameSize::default(),
			output_path: PathBuf::from("qr_escaneados.xlsx"),
			retry_delay: Duration::from_millis(100),
			window_title: "QR scanner - press Q to quit".to_string(),
		};
	}
}

#[cfg(test)]
mod tests {
	use super::ScannerConfig;

	#[test]
	fn defaults() {
		let config = ScannerConfig::default();
		assert_eq!(config.camera_indices, vec![0, 1, 2]);
		assert!(config.output_path.is_relative());
		assert_eq!(config.frame_size.width, 640);
		assert_eq!(config.frame_size.height, 480);
	}
}
