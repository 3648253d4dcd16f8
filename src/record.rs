use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::decode::Detection;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One deduplicated payload as it appears in the spreadsheet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanRecord {
	pub sequence: usize,
	pub payload: String,
	pub symbol: String,
	pub timestamp: String,
}

/// Records in first-seen order, unique by payload
#[derive(Debug, Default)]
pub struct ScanLog {
	records: Vec<ScanRecord>,
	seen: HashSet<String>,
}

impl ScanLog {
	pub fn new() -> ScanLog {
		return ScanLog::default();
	}

	/// Record a detection unless its payload was seen before
	///
	/// Returns the new record, or `None` for a duplicate.
	///
	/// ```
	/// use chrono::NaiveDate;
	/// use qrcode_recorder::{Detection, ScanLog};
	///
	/// let at = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
	///     .and_hms_opt(8, 5, 0).unwrap();
	/// let mut log = ScanLog::new();
	/// let rec = log.insert(Detection::qr("A"), at).unwrap();
	/// assert_eq!(rec.sequence, 1);
	/// assert_eq!(rec.timestamp, "2024-03-09 08:05:00");
	/// assert!(log.insert(Detection::qr("A"), at).is_none());
	/// assert_eq!(log.len(), 1);
	/// ```
	pub fn insert(&mut self, detection: Detection, at: NaiveDateTime)
	-> Option<&ScanRecord> {
		if !self.seen.insert(detection.payload.clone()) {
			return None;
		}
		self.records.push(ScanRecord {
			sequence: self.records.len() + 1,
			payload: detection.payload,
			symbol: detection.symbol,
			timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
		});
		return self.records.last();
	}

	pub fn contains(&self, payload: &str) -> bool {
		return self.seen.contains(payload);
	}

	pub fn records(&self) -> &[ScanRecord] {
		return &self.records;
	}

	pub fn len(&self) -> usize {
		return self.records.len();
	}

	pub fn is_empty(&self) -> bool {
		return self.records.is_empty();
	}

	pub fn into_records(self) -> Vec<ScanRecord> {
		return self.records;
	}
}

#[cfg(test)]
mod tests {
	use chrono::{NaiveDate, NaiveDateTime};

	use super::ScanLog;
	use crate::decode::Detection;

	fn at(second: u32) -> NaiveDateTime {
		return NaiveDate::from_ymd_opt(2025, 11, 30)
			.unwrap()
			.and_hms_opt(23, 59, second)
			.unwrap();
	}

	#[test]
	fn duplicates_keep_first_sighting() {
		let mut log = ScanLog::new();
		for (i, payload) in ["A", "B", "A", "C"].iter().enumerate() {
			log.insert(Detection::qr(payload), at(i as u32));
		}
		let rows: Vec<(usize, &str, &str)> = log
			.records()
			.iter()
			.map(|r| (r.sequence, r.payload.as_str(), r.timestamp.as_str()))
			.collect();
		assert_eq!(rows, vec![
			(1, "A", "2025-11-30 23:59:00"),
			(2, "B", "2025-11-30 23:59:01"),
			(3, "C", "2025-11-30 23:59:03"),
		]);
	}

	#[test]
	fn sequence_matches_distinct_count() {
		let payloads = [
			"x", "y", "x", "x", "z", "y", "w", "z", "v", "x",
		];
		let mut log = ScanLog::new();
		for p in payloads.iter() {
			log.insert(Detection::qr(p), at(0));
			let sequences: Vec<usize> =
				log.records().iter().map(|r| r.sequence).collect();
			let expected: Vec<usize> = (1..=log.len()).collect();
			assert_eq!(sequences, expected);
		}
		assert_eq!(log.len(), 5);
		assert!(log.contains("w"));
		assert!(!log.contains("q"));
	}

	#[test]
	fn symbol_is_kept() {
		let mut log = ScanLog::new();
		let rec = log
			.insert(Detection {
				payload: "p".to_string(),
				symbol: "EAN13".to_string(),
			}, at(5))
			.unwrap();
		assert_eq!(rec.symbol, "EAN13");
	}

	#[test]
	fn payload_match_is_exact() {
		let mut log = ScanLog::new();
		assert!(log.insert(Detection::qr("abc"), at(0)).is_some());
		assert!(log.insert(Detection::qr("abc "), at(0)).is_some());
		assert!(log.insert(Detection::qr("ABC"), at(0)).is_some());
		assert!(log.insert(Detection::qr("abc"), at(0)).is_none());
		assert_eq!(log.len(), 3);
	}
}
