//! different utility modules used throughout the project
/// tiny module to set up terminal logging for examples and debugging
pub mod logger;
