pub mod overview;
pub mod recommendations;
pub mod risk;

pub use overview::OverviewPanel;
pub use recommendations::RecommendationsPanel;
pub use risk::RiskPanel;
