// Domain layer - Lead records and the filter/aggregate/chart pipeline
pub mod aggregate;
pub mod chart;
pub mod filter;
pub mod lead;
pub mod report;
