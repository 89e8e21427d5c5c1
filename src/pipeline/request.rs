use base64::{Engine as _, engine::general_purpose};

use crate::assets::store::validate_source_name;
use crate::foundation::core::FrameDelay;
use crate::foundation::error::{AvatarGifError, AvatarGifResult};
use crate::positions::table::PositionTables;
use crate::render::rotate::Rotation;

/// Inbound request as produced by the HTTP layer.
///
/// Field names follow the JSON body of the upload endpoint
/// (`{ "base64", "delay", "selectedSource", "rotate" }`). Every field is optional at this level
/// so that absence surfaces as a validation error rather than a parse error.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AvatarRequest {
    /// Base64 avatar image, optionally with a `data:<mime>;base64,` prefix.
    #[serde(rename = "base64", default)]
    pub avatar_base64: Option<String>,
    /// Milliseconds between output frames.
    #[serde(default)]
    pub delay: Option<f64>,
    /// Preset source GIF name, e.g. `"2.gif"`.
    #[serde(rename = "selectedSource", default)]
    pub source_name: Option<String>,
    /// Clockwise rotation in degrees, `[0, 360]`. Absent means no rotation.
    #[serde(rename = "rotate", default)]
    pub rotation_degrees: Option<f64>,
}

impl AvatarRequest {
    /// Build a request from raw avatar bytes.
    pub fn from_avatar_bytes(
        avatar: &[u8],
        delay_ms: f64,
        source_name: impl Into<String>,
        rotation_degrees: f64,
    ) -> Self {
        Self {
            avatar_base64: Some(general_purpose::STANDARD.encode(avatar)),
            delay: Some(delay_ms),
            source_name: Some(source_name.into()),
            rotation_degrees: Some(rotation_degrees),
        }
    }

    /// Validate fields and decode the avatar payload.
    ///
    /// Unknown sources are rejected here against the position tables' keys, before any asset
    /// I/O happens.
    pub fn validate(&self, tables: &PositionTables) -> AvatarGifResult<ValidatedRequest> {
        let avatar_b64 = self
            .avatar_base64
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AvatarGifError::validation("missing avatar image (base64)"))?;
        let delay = self
            .delay
            .ok_or_else(|| AvatarGifError::validation("missing frame delay"))?;
        let source = self
            .source_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AvatarGifError::validation("missing source name"))?;

        let rotation = Rotation::from_degrees(self.rotation_degrees.unwrap_or(0.0))?;
        let delay = parse_delay(delay)?;

        let source = validate_source_name(source)?;
        if !tables.contains(source) {
            return Err(AvatarGifError::source_not_found(source));
        }

        let avatar = decode_base64_payload(avatar_b64)?;
        if avatar.is_empty() {
            return Err(AvatarGifError::validation("avatar image is empty"));
        }

        Ok(ValidatedRequest {
            avatar,
            delay,
            source_name: source.to_string(),
            rotation,
        })
    }
}

/// A request whose fields passed validation.
#[derive(Clone, Debug)]
pub struct ValidatedRequest {
    /// Raw avatar image bytes.
    pub avatar: Vec<u8>,
    /// Output frame delay.
    pub delay: FrameDelay,
    /// Known source name.
    pub source_name: String,
    /// Whole-frame rotation.
    pub rotation: Rotation,
}

fn parse_delay(delay: f64) -> AvatarGifResult<FrameDelay> {
    if !delay.is_finite() || delay < 1.0 || delay > f64::from(u32::MAX) {
        return Err(AvatarGifError::validation(format!(
            "frame delay must be a positive number of milliseconds, got {delay}"
        )));
    }
    FrameDelay::from_millis(delay.round() as u32)
}

/// Strip an optional data-URI prefix and decode standard base64.
pub fn decode_base64_payload(data: &str) -> AvatarGifResult<Vec<u8>> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => {
            let (_, payload) = rest.split_once(',').ok_or_else(|| {
                AvatarGifError::validation("data URI is missing the ',' separator")
            })?;
            payload
        }
        None => data,
    };

    let compact: String = payload.split_ascii_whitespace().collect();
    general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AvatarGifError::validation(format!("avatar is not valid base64: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/request.rs"]
mod tests;
