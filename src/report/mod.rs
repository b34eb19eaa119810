pub mod generator;
pub mod recommendations;
pub mod summary_text;

pub use generator::{
    assemble_dashboard, overall_status, GeneratedReport, HistoricalReport, ReportGenerator,
    ReportOptions,
};
pub use recommendations::{generate_recommendations, solution_for, RecommendationConfig};
pub use summary_text::generate_summary_text;
