use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::camera::Camera;
use crate::config::ScannerConfig;
use crate::decode::{Detection, Detector};
use crate::export::{TableExport, XlsxExport};
use crate::preview::Preview;
use crate::record::{ScanLog, ScanRecord};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
	Interrupted,
	QuitKey,
	PreviewFailed(String),
}

#[derive(Debug)]
pub struct RunSummary {
	pub records: Vec<ScanRecord>,
	pub frames: u64,
	pub stop: StopReason,
}

/// Capture-detect-record loop
///
/// Owns the camera and the preview for the whole run and releases both
/// when `run` returns.
pub struct Scanner<'a, E: TableExport> {
	camera: Camera<'a>,
	detector: Detector,
	preview: Preview,
	export: E,
	log: ScanLog,
	interrupt: Arc<AtomicBool>,
	retry_delay: Duration,
	frames: u64,
}

impl<'a, E: TableExport> Scanner<'a, E> {
	pub fn new(
		camera: Camera<'a>,
		detector: Detector,
		preview: Preview,
		export: E,
		interrupt: Arc<AtomicBool>)
	-> Scanner<'a, E> {
		return Scanner {
			camera: camera,
			detector: detector,
			preview: preview,
			export: export,
			log: ScanLog::new(),
			interrupt: interrupt,
			retry_delay: Duration::from_millis(100),
			frames: 0,
		};
	}

	pub fn with_retry_delay(mut self, delay: Duration) -> Scanner<'a, E> {
		self.retry_delay = delay;
		return self;
	}

	/// Scan until interrupted or asked to quit
	///
	/// ```
	/// use std::collections::VecDeque;
	/// use std::io;
	/// use std::sync::Arc;
	/// use std::sync::atomic::{AtomicBool, AtomicUsize};
	/// use image::DynamicImage;
	/// use qrcode_recorder::*;
	///
	/// struct Discard;
	/// impl TableExport for Discard {
	///     fn write_table(&mut self, _: &[ScanRecord]) -> io::Result<()> {
	///         Ok(())
	///     }
	///     fn location(&self) -> String { String::new() }
	/// }
	///
	/// let released = Arc::new(AtomicUsize::new(0));
	/// let frames = (0..2).map(|_| Ok(DynamicImage::new_luma8(4, 4)));
	/// let camera = Camera::with_test_frames(frames.collect(), released.clone());
	/// let detector = Detector::with_test_results(VecDeque::from([
	///     vec![Ok("A".to_string())],
	///     vec![Ok("A".to_string()), Ok("B".to_string())],
	/// ]));
	/// let preview = Preview::headless(Some(2), released);
	/// let interrupt = Arc::new(AtomicBool::new(false));
	/// let summary = Scanner::new(camera, detector, preview, Discard, interrupt)
	///     .run();
	/// assert_eq!(summary.stop, StopReason::QuitKey);
	/// assert_eq!(summary.records.len(), 2);
	/// ```
	pub fn run(mut self) -> RunSummary {
		let stop = self.scan_loop();
		let Scanner { camera, preview, log: scan_log, frames, .. } = self;
		camera.release();
		preview.close();
		return RunSummary {
			records: scan_log.into_records(),
			frames: frames,
			stop: stop,
		};
	}

	fn scan_loop(&mut self) -> StopReason {
		loop {
			if self.interrupt.load(Ordering::SeqCst) {
				log::info!("Interrupted");
				return StopReason::Interrupted;
			}
			let frame = match self.camera.read_frame() {
				Ok(f) => f,
				Err(e) => {
					log::warn!("Failed to read frame: {}", e);
					thread::sleep(self.retry_delay);
					continue;
				},
			};
			self.frames += 1;
			for detection in self.detector.detect(&frame) {
				self.record(detection);
			}
			if let Err(e) = self.preview.show(&frame) {
				log::error!("Preview failed: {}", e);
				return StopReason::PreviewFailed(e.to_string());
			}
			if self.preview.quit_requested() {
				log::info!("Quit requested");
				return StopReason::QuitKey;
			}
		}
	}

	// a failed write keeps the record in memory, the next new payload
	// writes the whole table again
	fn record(&mut self, detection: Detection) {
		let now = Local::now().naive_local();
		match self.log.insert(detection, now) {
			Some(record) => {
				log::info!(
					"[{}] {} ({})",
					record.sequence, record.payload, record.symbol);
			},
			None => return,
		};
		if let Err(e) = self.export.write_table(self.log.records()) {
			log::error!(
				"Failed to save {}: {}", self.export.location(), e);
		}
	}
}

impl<'a> Scanner<'a, XlsxExport> {
	/// Open the first available camera and scan into the configured
	/// xlsx file with a preview window
	///
	/// Fails with `io::ErrorKind::NotFound` when no camera opens. The
	/// output file is not touched in that case.
	pub fn from_config(config: &ScannerConfig, interrupt: Arc<AtomicBool>)
	-> io::Result<Scanner<'a, XlsxExport>> {
		let camera = Camera::open_first(
			&config.camera_indices, &config.frame_size)?;
		let scanner = Scanner::new(
			camera,
			Detector::new(),
			Preview::window(&config.window_title),
			XlsxExport::new(&config.output_path),
			interrupt)
			.with_retry_delay(config.retry_delay);
		return Ok(scanner);
	}
}
