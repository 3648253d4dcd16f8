use std::io;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::record::ScanRecord;

pub const COLUMNS: [&str; 4] = ["Number", "Content", "Type", "Timestamp"];

/// Destination for the full table of scan records
///
/// Every call replaces whatever was written before.
pub trait TableExport {
	fn write_table(&mut self, records: &[ScanRecord]) -> io::Result<()>;

	fn location(&self) -> String;
}

/// Writes the records into the first worksheet of an xlsx file
pub struct XlsxExport {
	path: PathBuf,
}

fn xlsx_error(e: XlsxError) -> io::Error {
	return match e {
		XlsxError::IoError(inner) => inner,
		other => io::Error::new(io::ErrorKind::Other, other.to_string()),
	};
}

impl XlsxExport {
	pub fn new<P: AsRef<Path>>(path: P) -> XlsxExport {
		return XlsxExport {
			path: path.as_ref().to_path_buf(),
		};
	}

	pub fn path(&self) -> &Path {
		return &self.path;
	}

	fn build(records: &[ScanRecord]) -> Result<Workbook, XlsxError> {
		let mut workbook = Workbook::new();
		let bold = Format::new().set_bold();
		let sheet = workbook.add_worksheet();
		for (col, title) in COLUMNS.iter().enumerate() {
			sheet.write_string_with_format(0, col as u16, *title, &bold)?;
		}
		for (i, record) in records.iter().enumerate() {
			let row = (i + 1) as u32;
			sheet.write_number(row, 0, record.sequence as f64)?;
			sheet.write_string(row, 1, &record.payload)?;
			sheet.write_string(row, 2, &record.symbol)?;
			sheet.write_string(row, 3, &record.timestamp)?;
		}
		return Ok(workbook);
	}
}

impl TableExport for XlsxExport {
	fn write_table(&mut self, records: &[ScanRecord]) -> io::Result<()> {
		let mut workbook = XlsxExport::build(records).map_err(xlsx_error)?;
		workbook.save(&self.path).map_err(xlsx_error)?;
		log::debug!(
			"Wrote {} records to {}",
			records.len(), self.path.display());
		return Ok(());
	}

	fn location(&self) -> String {
		return self.path.display().to_string();
	}
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::{TableExport, XlsxExport};
	use crate::record::ScanRecord;

	fn record(sequence: usize, payload: &str) -> ScanRecord {
		return ScanRecord {
			sequence: sequence,
			payload: payload.to_string(),
			symbol: "QRCODE".to_string(),
			timestamp: "2026-01-02 03:04:05".to_string(),
		};
	}

	#[test]
	fn nothing_written_before_first_record() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("scans.xlsx");
		let export = XlsxExport::new(&path);
		assert_eq!(export.path(), path.as_path());
		assert!(!path.exists());
	}

	#[test]
	fn writes_xlsx_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("scans.xlsx");
		let mut export = XlsxExport::new(&path);
		export.write_table(&[record(1, "A"), record(2, "B")]).unwrap();
		let bytes = fs::read(&path).unwrap();
		// xlsx is a zip container
		assert_eq!(&bytes[..2], b"PK");
	}

	#[test]
	fn rewrite_replaces_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("scans.xlsx");
		let mut export = XlsxExport::new(&path);
		export.write_table(&[record(1, "A")]).unwrap();
		let records: Vec<ScanRecord> = (1..=200)
			.map(|i| record(i, &format!("payload number {}", i)))
			.collect();
		export.write_table(&records).unwrap();
		assert!(fs::metadata(&path).unwrap().len() > 0);
		assert_eq!(&fs::read(&path).unwrap()[..2], b"PK");
	}

	#[test]
	fn missing_directory_fails() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing").join("scans.xlsx");
		let mut export = XlsxExport::new(&path);
		assert!(export.write_table(&[record(1, "A")]).is_err());
		assert!(!path.exists());
	}
}
