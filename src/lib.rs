pub mod logger;
pub mod plate_engine;
