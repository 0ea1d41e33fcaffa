use crate::{
    foundation::core::BOARD_HEIGHT,
    params::model::DisplayWidth,
    source::image::SourceImage,
};

/// Length of every exported video, independent of the preview scroll duration.
pub const EXPORT_DURATION_SECS: u32 = 15;

/// Name the rendered video is saved under.
pub const EXPORT_FILENAME: &str = "ribbon-output.mp4";

/// Payload sent to the remote render service. Built fresh for every export.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Data URL of the source image.
    pub base64_image: String,
    pub width: u32,
    pub height: u32,
    pub duration: u32,
    pub filename: String,
}

/// Fixed knobs of an export that do not come from the parameter model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSettings {
    pub duration_secs: u32,
    pub filename: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            duration_secs: EXPORT_DURATION_SECS,
            filename: EXPORT_FILENAME.to_string(),
        }
    }
}

impl ExportRequest {
    pub fn new(source: &SourceImage, width: DisplayWidth, settings: &ExportSettings) -> Self {
        Self {
            base64_image: source.data_url().to_string(),
            width: width.pixels(),
            height: BOARD_HEIGHT,
            duration: settings.duration_secs,
            filename: settings.filename.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/request.rs"]
mod tests;
