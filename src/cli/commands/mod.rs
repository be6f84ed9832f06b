pub mod compress;
pub mod config;
pub mod doctor;
pub mod extract;
pub mod prompt;
pub mod score;
pub mod stats;
