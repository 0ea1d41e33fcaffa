pub mod pipeline;
pub mod request;
pub mod save;
pub mod service;
