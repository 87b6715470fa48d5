//! Frame decoding
//!
//! Turns whatever an ingest endpoint sends into JSON, then into a
//! [`ColorUpdate`]. Protocol differences live in [`FrameDecoder`]
//! implementations; the adapter connection loop is shared.

use serde::Deserialize;
use serde_json::Value;
use std::string::FromUtf8Error;
use thiserror::Error;

use crate::color::Color;
use crate::strip::ColorUpdate;

/// A data frame received from an ingest endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Textual payload
    Text(String),
    /// Binary payload, expected to hold UTF-8 JSON
    Binary(Vec<u8>),
    /// Any payload shape the decoders do not understand
    Other(&'static str),
}

/// Errors raised while decoding a single frame
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported payload type: {0}")]
    Unsupported(&'static str),

    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload is not a color update: {0}")]
    NotAnUpdate(String),
}

/// Protocol-specific decode strategy
pub trait FrameDecoder: Send + Sync {
    /// Short protocol name used in logs
    fn name(&self) -> &'static str;

    /// Decode a frame into a JSON value
    fn decode(&self, frame: Frame) -> Result<Value, DecodeError>;
}

/// Text and binary-as-UTF-8 JSON frames.
///
/// Used by the generic websocket and ArtNet-style feeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFrames;

impl FrameDecoder for JsonFrames {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decode(&self, frame: Frame) -> Result<Value, DecodeError> {
        decode_json_frame(frame)
    }
}

/// E1.31-style feed: JSON frames, plus buffers that arrive wrapped as
/// `{"type":"Buffer","data":[...]}` with UTF-8 JSON inside.
#[derive(Debug, Clone, Copy, Default)]
pub struct E131Frames;

impl FrameDecoder for E131Frames {
    fn name(&self) -> &'static str {
        "e131"
    }

    fn decode(&self, frame: Frame) -> Result<Value, DecodeError> {
        let value = decode_json_frame(frame)?;
        match unwrap_buffer(&value) {
            Some(bytes) => decode_json_frame(Frame::Binary(bytes)),
            None => Ok(value),
        }
    }
}

/// Text is parsed directly, binary is read as UTF-8 first
pub fn decode_json_frame(frame: Frame) -> Result<Value, DecodeError> {
    match frame {
        Frame::Text(text) => Ok(serde_json::from_str(&text)?),
        Frame::Binary(bytes) => {
            let text = String::from_utf8(bytes)?;
            Ok(serde_json::from_str(&text)?)
        }
        Frame::Other(kind) => Err(DecodeError::Unsupported(kind)),
    }
}

/// Extract the bytes of a wrapped buffer object, if `value` is one
fn unwrap_buffer(value: &Value) -> Option<Vec<u8>> {
    let object = value.as_object()?;
    if object.get("type")?.as_str()? != "Buffer" {
        return None;
    }
    object
        .get("data")?
        .as_array()?
        .iter()
        .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
        .collect()
}

/// Wire shape of an ingest update; `type` is optional
#[derive(Debug, Deserialize)]
struct UpdatePayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    index: i64,
    color: Color,
}

/// Normalize decoded JSON into an update.
///
/// Returns `Ok(None)` for well-formed messages of another `type`, which
/// are ignored rather than treated as errors.
pub fn normalize(value: Value) -> Result<Option<ColorUpdate>, DecodeError> {
    let payload: UpdatePayload =
        serde_json::from_value(value).map_err(|e| DecodeError::NotAnUpdate(e.to_string()))?;

    match payload.kind.as_deref() {
        None | Some("updateColor") => Ok(Some(ColorUpdate::new(payload.index, payload.color))),
        Some(_) => Ok(None),
    }
}

/// Decode and normalize one frame
pub fn decode_update(
    decoder: &dyn FrameDecoder,
    frame: Frame,
) -> Result<Option<ColorUpdate>, DecodeError> {
    normalize(decoder.decode(frame)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_AT_2: &str = r##"{"index":2,"color":"#ff0000"}"##;

    fn red_at_2() -> ColorUpdate {
        ColorUpdate::new(2, Color::new(255, 0, 0))
    }

    #[test]
    fn test_text_and_binary_decode_alike() {
        let text = decode_update(&JsonFrames, Frame::Text(RED_AT_2.to_string())).unwrap();
        let binary =
            decode_update(&JsonFrames, Frame::Binary(RED_AT_2.as_bytes().to_vec())).unwrap();

        assert_eq!(text, Some(red_at_2()));
        assert_eq!(binary, text);
    }

    #[test]
    fn test_unsupported_frame_is_rejected() {
        let result = decode_update(&JsonFrames, Frame::Other("blob"));
        assert!(matches!(result, Err(DecodeError::Unsupported("blob"))));
    }

    #[test]
    fn test_invalid_payloads() {
        let invalid_utf8 = decode_update(&JsonFrames, Frame::Binary(vec![0xff, 0xfe, 0x7b]));
        assert!(matches!(invalid_utf8, Err(DecodeError::Utf8(_))));

        let invalid_json = decode_update(&JsonFrames, Frame::Text("{nope".to_string()));
        assert!(matches!(invalid_json, Err(DecodeError::Json(_))));

        let missing_index = decode_update(&JsonFrames, Frame::Text(r##"{"color":"#fff"}"##.into()));
        assert!(matches!(missing_index, Err(DecodeError::NotAnUpdate(_))));
    }

    #[test]
    fn test_typed_messages() {
        let typed = r##"{"type":"updateColor","index":2,"color":"#ff0000"}"##;
        assert_eq!(
            decode_update(&JsonFrames, Frame::Text(typed.to_string())).unwrap(),
            Some(red_at_2())
        );

        let other = r##"{"type":"heartbeat","index":2,"color":"#ff0000"}"##;
        assert_eq!(
            decode_update(&JsonFrames, Frame::Text(other.to_string())).unwrap(),
            None
        );
    }

    #[test]
    fn test_e131_unwraps_buffer_objects() {
        let bytes: Vec<String> = RED_AT_2.bytes().map(|b| b.to_string()).collect();
        let wrapped = format!(r#"{{"type":"Buffer","data":[{}]}}"#, bytes.join(","));

        let update = decode_update(&E131Frames, Frame::Text(wrapped.clone())).unwrap();
        assert_eq!(update, Some(red_at_2()));

        // The plain JSON decoder does not know the wrapper
        assert!(decode_update(&JsonFrames, Frame::Text(wrapped)).is_err());
    }

    #[test]
    fn test_e131_passes_plain_json_through() {
        let update = decode_update(&E131Frames, Frame::Binary(RED_AT_2.as_bytes().to_vec()));
        assert_eq!(update.unwrap(), Some(red_at_2()));
    }

    #[test]
    fn test_malformed_color_reads_as_black() {
        let update = decode_update(
            &JsonFrames,
            Frame::Text(r##"{"index":0,"color":"#12"}"##.to_string()),
        )
        .unwrap();
        assert_eq!(update, Some(ColorUpdate::new(0, Color::BLACK)));
    }
}
