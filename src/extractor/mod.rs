pub mod file_extractor;
pub mod file_mover;
pub mod output_manager;

pub use file_extractor::{
    extract, ExtractionProgress, Extractor, MoveOutcome, PlannedMove, PreparedExtraction,
    SearchRequest,
};
pub use file_mover::{FileMover, MoveMethod};
pub use output_manager::{DestinationManager, ExtractionReport, ExtractionSummary};
