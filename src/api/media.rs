//! Image and streaming endpoints

use super::{ApiRequest, BodyFormat, Payload};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::image::PngImage;

/// `GET channel/{id}/logo.png`
#[derive(Debug, Clone)]
pub struct ChannelLogoRequest {
    pub channel_id: String,
}

impl ChannelLogoRequest {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self { channel_id: channel_id.into() }
    }
}

impl ApiRequest for ChannelLogoRequest {
    type Response = PngImage;

    fn path(&self) -> String {
        format!("channel/{}/logo.png", self.channel_id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.channel_id)
    }

    fn format(&self) -> BodyFormat {
        BodyFormat::Image
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        PngImage::decode(payload.into_bytes()?)
    }
}

/// `GET recorded/{id}/preview.png` at a position in seconds
#[derive(Debug, Clone)]
pub struct PreviewImageRequest {
    pub id: String,
    pub position: i64,
}

impl PreviewImageRequest {
    pub const WIDTH: u32 = 1280;
    pub const HEIGHT: u32 = 720;

    pub fn new(id: impl Into<String>, position: i64) -> Self {
        Self { id: id.into(), position }
    }
}

impl ApiRequest for PreviewImageRequest {
    type Response = PngImage;

    fn path(&self) -> String {
        format!("recorded/{}/preview.png", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn query(&self, _config: &ClientConfig) -> Vec<(&'static str, String)> {
        vec![
            ("width", Self::WIDTH.to_string()),
            ("height", Self::HEIGHT.to_string()),
            ("pos", self.position.to_string()),
        ]
    }

    fn format(&self) -> BodyFormat {
        BodyFormat::Image
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        PngImage::decode(payload.into_bytes()?)
    }
}

/// `GET recorded/{id}/watch.m2ts`
///
/// The path keeps the m2ts container even when transcoding: the server picks
/// the output container from `ext`, and mp4 streams do not report a duration.
#[derive(Debug, Clone)]
pub struct StreamingMediaRequest {
    pub id: String,
}

impl StreamingMediaRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ApiRequest for StreamingMediaRequest {
    type Response = Vec<u8>;

    fn path(&self) -> String {
        format!("recorded/{}/watch.m2ts", self.id)
    }

    fn resource_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn query(&self, config: &ClientConfig) -> Vec<(&'static str, String)> {
        if config.transcode {
            vec![
                ("ext", "mp4".to_string()),
                ("c:v", "libx264".to_string()),
                ("c:a", "aac".to_string()),
                ("b:v", format!("{}k", config.video_bitrate)),
                ("size", config.video_resolution.clone()),
                ("b:a", format!("{}k", config.audio_bitrate)),
            ]
        } else {
            vec![
                ("ext", "m2ts".to_string()),
                ("c:v", "copy".to_string()),
                ("c:a", "copy".to_string()),
            ]
        }
    }

    fn format(&self) -> BodyFormat {
        BodyFormat::Binary
    }

    fn decode(&self, payload: Payload) -> Result<Self::Response, ApiError> {
        payload.into_bytes()
    }
}
