pub mod header;
pub mod report;
