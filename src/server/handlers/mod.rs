pub mod reports;
pub mod scans;
pub mod targets;
