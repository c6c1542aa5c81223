//! Plain-text body extraction from a message part tree

use base64::prelude::*;

use super::api::PartTree;

/// Body returned when a message has no decodable plain-text part
pub const NO_CONTENT: &str = "No Content";

const TEXT_PLAIN: &str = "text/plain";

/// Extract the plain-text body of a message
///
/// Only looks one level deep: a multipart root is searched for its first
/// direct `text/plain` child, a single-part root is decoded as-is. HTML-only
/// mail and undecodable payloads yield [`NO_CONTENT`].
pub fn extract_body(payload: &PartTree) -> String {
    let data = match payload.parts.as_slice() {
        [] => inline_data(payload),
        parts => parts
            .iter()
            .find(|p| p.mime_type == TEXT_PLAIN)
            .and_then(inline_data),
    };

    data.and_then(decode_base64_body)
        .unwrap_or_else(|| NO_CONTENT.to_string())
}

fn inline_data(part: &PartTree) -> Option<&str> {
    part.body.as_ref()?.data.as_deref()
}

/// Decode base64-encoded body data into UTF-8 text
///
/// Gmail uses URL-safe base64 but padding can vary, so we try multiple decoders.
pub fn decode_base64_body(data: &str) -> Option<String> {
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE};

    let decoders: &[&base64::engine::GeneralPurpose] =
        &[&BASE64_URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD, &STANDARD_NO_PAD];

    for decoder in decoders {
        if let Ok(decoded) = decoder.decode(data)
            && let Ok(s) = String::from_utf8(decoded)
        {
            return Some(s);
        }
    }

    None
}
