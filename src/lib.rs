pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod images;
pub mod normalize;
pub mod services;
pub mod sources;
