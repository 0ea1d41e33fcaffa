pub mod loop_engine;
pub mod strip;
pub mod timeline;
