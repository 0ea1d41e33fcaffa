pub mod ffmpeg;
pub mod preview;
