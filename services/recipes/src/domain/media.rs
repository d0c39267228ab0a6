use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Longest accepted image subtype, e.g. `jpeg`, `webp`.
const MAX_EXTENSION_LEN: usize = 10;

/// Image payload decoded from a `data:image/<ext>;base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// Parse a base64 data URI. Returns `None` for any other shape, an
    /// unusable subtype, bad base64 or an empty payload.
    pub fn from_data_uri(input: &str) -> Option<Self> {
        let rest = input.trim().strip_prefix("data:image/")?;
        let (extension, payload) = rest.split_once(";base64,")?;
        if extension.is_empty()
            || extension.len() > MAX_EXTENSION_LEN
            || !extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return None;
        }
        let bytes = STANDARD.decode(payload.trim()).ok()?;
        if bytes.is_empty() {
            return None;
        }
        Some(Self {
            extension: extension.to_ascii_lowercase(),
            bytes,
        })
    }
}
