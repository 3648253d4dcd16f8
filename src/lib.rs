//! Record QR-Codes seen by a video4linux camera into a spreadsheet
//!
//! A [`Scanner`] reads frames from a [`Camera`], runs a [`Detector`] over
//! them and keeps every QR-Code or barcode payload it has not seen before
//! in a [`ScanLog`].
//! Each new payload rewrites the whole table through a [`TableExport`],
//! by default an xlsx file.

mod camera;
mod config;
mod decode;
mod export;
mod image_decode;
mod interrupt;
mod preview;
mod record;
mod scanner;

pub use camera::{device_path, Camera, TargetFrameSize};
pub use config::ScannerConfig;
pub use decode::{symbol_label, Detection, Detector, QR_SYMBOL};
pub use export::{TableExport, XlsxExport, COLUMNS};
pub use interrupt::register as register_interrupt;
pub use preview::Preview;
pub use record::{ScanLog, ScanRecord, TIMESTAMP_FORMAT};
pub use scanner::{RunSummary, Scanner, StopReason};
