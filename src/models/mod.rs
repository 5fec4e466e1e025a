pub mod options;
pub mod vacancy;
