pub mod project;

pub use project::{
    AnalysisReport, CategoryReport, ProjectRecord, RecommendReport, RecordStage, SearchBatch,
};
