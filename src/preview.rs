use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::DynamicImage;
use minifb::{Key, Window, WindowOptions};

use crate::image_decode;

/// Live view of the camera feed, also the place the quit key is read
pub enum Preview {
	Window {
		title: String,
		window: Option<Window>,
	},
	Headless {
		shown: usize,
		quit_after: Option<usize>,
		fail_at: Option<usize>,
		closed: Arc<AtomicUsize>,
	},
}

fn window_error(e: minifb::Error) -> io::Error {
	return io::Error::new(io::ErrorKind::Other, e.to_string());
}

impl Preview {
	/// The window is opened with the size of the first frame shown
	pub fn window(title: &str) -> Preview {
		return Preview::Window {
			title: title.to_string(),
			window: None,
		};
	}

	/// A preview without a window
	///
	/// `quit_requested` turns true once `quit_after` frames were shown,
	/// and `closed` is incremented when the preview is closed.
	pub fn headless(quit_after: Option<usize>, closed: Arc<AtomicUsize>)
	-> Preview {
		return Preview::Headless {
			shown: 0,
			quit_after: quit_after,
			fail_at: None,
			closed: closed,
		};
	}

	/// A headless preview whose `show` fails once `shown` frames were shown
	pub fn failing(shown: usize, closed: Arc<AtomicUsize>) -> Preview {
		return Preview::Headless {
			shown: 0,
			quit_after: None,
			fail_at: Some(shown),
			closed: closed,
		};
	}

	pub fn show(&mut self, img: &DynamicImage) -> io::Result<()> {
		match self {
			Preview::Window { title, window } => {
				let width = img.width() as usize;
				let height = img.height() as usize;
				if window.is_none() {
					let opened = Window::new(
						title.as_str(), width, height,
						WindowOptions::default())
						.map_err(window_error)?;
					log::debug!(
						"Preview window opened at {}x{}",
						width, height);
					*window = Some(opened);
				}
				if let Some(w) = window {
					w.update_with_buffer(
						&image_decode::to_0rgb(img),
						width, height)
						.map_err(window_error)?;
				}
			},
			Preview::Headless { shown, fail_at, .. } => {
				if *fail_at == Some(*shown) {
					return Err(io::Error::new(
						io::ErrorKind::BrokenPipe,
						"Preview display went away"));
				}
				*shown += 1;
			},
		};
		return Ok(());
	}

	/// True once `q` was pressed or the window was closed
	pub fn quit_requested(&self) -> bool {
		return match self {
			Preview::Window { window: Some(w), .. } => {
				!w.is_open() || w.is_key_down(Key::Q)
			},
			Preview::Window { window: None, .. } => false,
			Preview::Headless { shown, quit_after, .. } => {
				quit_after.map_or(false, |n| *shown >= n)
			},
		};
	}

	pub fn close(self) {
		match self {
			Preview::Window { window, .. } => {
				if window.is_some() {
					drop(window);
					log::debug!("Preview window closed");
				}
			},
			Preview::Headless { closed, .. } => {
				closed.fetch_add(1, Ordering::SeqCst);
			},
		};
	}
}
