// Application layer - Use cases over the lead repository
pub mod lead_repository;
pub mod lead_service;
pub mod report_service;
