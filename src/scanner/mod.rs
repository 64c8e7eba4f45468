pub mod file_filter;
pub mod file_scanner;

pub use file_filter::{Extension, ExtensionFilter};
pub use file_scanner::{FileScanner, MatchedFile, ScanStatistics};
