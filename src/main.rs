use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use qrcode_recorder::{register_interrupt, Scanner, ScannerConfig, StopReason};

fn wait_for_enter() {
	println!("\nPress Enter to close...");
	let mut line = String::new();
	if let Err(e) = io::stdin().read_line(&mut line) {
		log::debug!("Failed to read stdin: {}", e);
	}
}

fn main() {
	env_logger::Builder::from_env(
		env_logger::Env::default().default_filter_or("info")).init();
	let config = ScannerConfig::default();

	println!("Starting QR scanner");
	println!("New codes are saved to {}", config.output_path.display());
	println!("Press Ctrl+C or 'q' in the camera window to stop");

	let interrupt = Arc::new(AtomicBool::new(false));
	if let Err(e) = register_interrupt(&interrupt) {
		log::warn!("Ctrl+C will not stop the scanner: {}", e);
	}

	let scanner = match Scanner::from_config(&config, interrupt) {
		Ok(s) => s,
		Err(e) => {
			println!("Failed to open a camera: {}", e);
			wait_for_enter();
			return;
		},
	};
	let summary = scanner.run();

	match &summary.stop {
		StopReason::Interrupted => println!("\nStopped by Ctrl+C"),
		StopReason::QuitKey => println!("\nStopped from the camera window"),
		StopReason::PreviewFailed(e) => {
			println!("\nCamera window failed: {}", e);
		},
	};
	if summary.records.is_empty() {
		println!("No QR-Codes scanned");
	} else {
		println!(
			"{} QR-Codes scanned in {} frames",
			summary.records.len(), summary.frames);
		println!("Saved to {}", config.output_path.display());
	}
	wait_for_enter();
}
