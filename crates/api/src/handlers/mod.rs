pub mod approval;
pub mod import;
