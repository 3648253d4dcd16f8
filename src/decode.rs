use std::collections::VecDeque;

use image::DynamicImage;
use rxing::BarcodeFormat;

/// Label for symbols found by the QR decoder
pub const QR_SYMBOL: &str = "QRCODE";

type DefaultDecoder = bardecoder::Decoder<
	image::DynamicImage,
	image::ImageBuffer<image::Luma<u8>, Vec<u8>>,
	String>;

/// A decoded symbol
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Detection {
	pub payload: String,
	pub symbol: String,
}

impl Detection {
	pub fn qr(payload: &str) -> Detection {
		return Detection {
			payload: payload.to_string(),
			symbol: QR_SYMBOL.to_string(),
		};
	}
}

/// Finds QR-Codes with bardecoder and every other symbology with rxing
pub enum Detector {
	Image {
		qr: DefaultDecoder,
	},
	TestResults {
		results: VecDeque<Vec<Result<String, anyhow::Error>>>,
	},
}

/// Type label of a symbology, spelled the way zbar names them
pub fn symbol_label(format: &BarcodeFormat) -> String {
	let label = match format {
		BarcodeFormat::QR_CODE => QR_SYMBOL,
		BarcodeFormat::EAN_13 => "EAN13",
		BarcodeFormat::EAN_8 => "EAN8",
		BarcodeFormat::UPC_A => "UPCA",
		BarcodeFormat::UPC_E => "UPCE",
		BarcodeFormat::CODE_128 => "CODE128",
		BarcodeFormat::CODE_93 => "CODE93",
		BarcodeFormat::CODE_39 => "CODE39",
		BarcodeFormat::CODABAR => "CODABAR",
		BarcodeFormat::ITF => "I25",
		BarcodeFormat::PDF_417 => "PDF417",
		BarcodeFormat::RSS_14 => "DATABAR",
		BarcodeFormat::RSS_EXPANDED => "DATABAR_EXP",
		other => return format!("{:?}", other),
	};
	return label.to_string();
}

// a symbol that fails error correction or is not valid text
// only costs that symbol, never the frame
fn decoded_results_to_detections(
	results: Vec<Result<String, anyhow::Error>>)
-> Vec<Detection> {
	let mut detections = Vec::new();
	for r in results {
		match r {
			Ok(payload) => {
				detections.push(Detection::qr(&payload));
			},
			Err(e) => {
				log::warn!("Skipping undecodable QR-Code: {}", e);
			},
		};
	}
	return detections;
}

fn detect_any_symbology(img: &DynamicImage) -> Vec<Detection> {
	let luma = img.to_luma8();
	let (width, height) = luma.dimensions();
	let results = match rxing::helpers::detect_multiple_in_luma(
			luma.into_raw(), width, height) {
		Ok(r) => r,
		Err(e) => {
			// nothing found is reported as an error as well
			log::trace!("rxing: {}", e);
			return Vec::new();
		},
	};
	return results
		.iter()
		.map(|r| Detection {
			payload: r.getText().to_string(),
			symbol: symbol_label(r.getBarcodeFormat()),
		})
		.collect();
}

// one entry per payload, the first decoder to report it wins
fn merge(mut detections: Vec<Detection>, more: Vec<Detection>)
-> Vec<Detection> {
	for d in more {
		if !detections.iter().any(|seen| seen.payload == d.payload) {
			detections.push(d);
		}
	}
	return detections;
}

impl Detector {
	pub fn new() -> Detector {
		return Detector::Image {
			qr: bardecoder::default_decoder(),
		};
	}

	/// Create a `Detector` from prepared decode results
	///
	/// Each call to `detect` ignores the frame and consumes the next
	/// entry. Failed entries are skipped the same way real decode
	/// failures are. When the entries run out, nothing is detected.
	///
	/// ```
	/// use std::collections::VecDeque;
	/// use image::DynamicImage;
	/// use qrcode_recorder::{Detection, Detector};
	///
	/// let frame = DynamicImage::new_luma8(8, 8);
	/// let mut detector = Detector::with_test_results(VecDeque::from([
	///     vec![Ok("first".to_string()), Err(anyhow::anyhow!("bad utf-8"))],
	/// ]));
	/// assert_eq!(detector.detect(&frame), vec![Detection::qr("first")]);
	/// assert!(detector.detect(&frame).is_empty());
	/// ```
	pub fn with_test_results(
		results: VecDeque<Vec<Result<String, anyhow::Error>>>)
	-> Detector {
		return Detector::TestResults {
			results: results,
		};
	}

	/// Search a frame for QR-Codes and barcodes
	pub fn detect(&mut self, img: &DynamicImage) -> Vec<Detection> {
		return match self {
			Detector::Image { qr } => {
				let found = decoded_results_to_detections(qr.decode(img));
				merge(found, detect_any_symbology(img))
			},
			Detector::TestResults { results } => {
				decoded_results_to_detections(
					results.pop_front().unwrap_or_default())
			},
		};
	}
}

#[cfg(test)]
mod tests {
	use image::{DynamicImage, GrayImage, Luma};
	use qrcode::QrCode;
	use rxing::{BarcodeFormat, MultiFormatWriter, Writer};

	use super::{Detection, Detector};

	fn render(payload: &str) -> DynamicImage {
		let code = QrCode::new(payload.as_bytes()).unwrap();
		let img = code
			.render::<Luma<u8>>()
			.min_dimensions(320, 320)
			.build();
		return DynamicImage::ImageLuma8(img);
	}

	fn render_ean13(digits: &str) -> DynamicImage {
		let matrix = MultiFormatWriter::default()
			.encode(digits, &BarcodeFormat::EAN_13, 400, 120)
			.unwrap();
		let img = GrayImage::from_fn(
			matrix.getWidth(), matrix.getHeight(), |x, y| {
				if matrix.get(x, y) { Luma([0]) } else { Luma([255]) }
			});
		return DynamicImage::ImageLuma8(img);
	}

	#[test]
	fn decodes_rendered_code_once() {
		let mut detector = Detector::new();
		let found = detector.detect(&render("https://example.org/a1"));
		assert_eq!(found, vec![Detection::qr("https://example.org/a1")]);
	}

	#[test]
	fn decodes_ean13_with_its_type() {
		let mut detector = Detector::new();
		let found = detector.detect(&render_ean13("5901234123457"));
		assert_eq!(found, vec![Detection {
			payload: "5901234123457".to_string(),
			symbol: "EAN13".to_string(),
		}]);
	}

	#[test]
	fn blank_frame_has_no_codes() {
		let mut detector = Detector::new();
		let found = detector.detect(&DynamicImage::new_luma8(64, 64));
		assert!(found.is_empty());
	}

	#[test]
	fn failed_results_are_skipped() {
		let results = vec![
			Err(anyhow::anyhow!("invalid utf-8")),
			Ok("kept".to_string()),
			Err(anyhow::anyhow!("error correction failed")),
		];
		let found = super::decoded_results_to_detections(results);
		assert_eq!(found, vec![Detection::qr("kept")]);
	}

	#[test]
	fn symbol_labels() {
		assert_eq!(super::symbol_label(&BarcodeFormat::QR_CODE), "QRCODE");
		assert_eq!(super::symbol_label(&BarcodeFormat::EAN_13), "EAN13");
		assert_eq!(super::symbol_label(&BarcodeFormat::CODE_128), "CODE128");
		assert_eq!(super::symbol_label(&BarcodeFormat::ITF), "I25");
		assert_eq!(
			super::symbol_label(&BarcodeFormat::DATA_MATRIX),
			"DATA_MATRIX");
	}

	#[test]
	fn merge_keeps_first_report() {
		let qr = vec![Detection::qr("same")];
		let more = vec![
			Detection { payload: "same".to_string(), symbol: "QRCODE".to_string() },
			Detection { payload: "other".to_string(), symbol: "CODE128".to_string() },
		];
		let merged = super::merge(qr, more);
		assert_eq!(merged.len(), 2);
		assert_eq!(merged[1].symbol, "CODE128");
	}
}
