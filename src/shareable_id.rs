//! Shareable IDs let a user receive transfers without revealing their
//! aggregator account ID in plain text.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::Error;

/// Encode an aggregator account ID as a shareable ID.
pub fn encode_shareable_id(account_id: &str) -> String {
    STANDARD.encode(account_id)
}

/// Decode a shareable ID back into the aggregator account ID.
///
/// # Errors
///
/// Returns [Error::InvalidShareableId] if `shareable_id` is not valid base64
/// or does not decode to UTF-8 text.
pub fn decode_shareable_id(shareable_id: &str) -> Result<String, Error> {
    let trimmed = shareable_id.trim();

    STANDARD
        .decode(trimmed)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .filter(|account_id| !account_id.is_empty())
        .ok_or_else(|| Error::InvalidShareableId(shareable_id.to_owned()))
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{decode_shareable_id, encode_shareable_id};

    #[test]
    fn encodes_as_standard_base64() {
        assert_eq!(encode_shareable_id("acc_123"), "YWNjXzEyMw==");
    }

    #[test]
    fn decodes_encoded_id() {
        let account_id = "BxBXxLj1m4HMXBm9WZZmCWVbPjX16EHwv99vp";

        let got = decode_shareable_id(&encode_shareable_id(account_id));

        assert_eq!(got, Ok(account_id.to_owned()));
    }

    #[test]
    fn ignores_surrounding_whitespace() {
        assert_eq!(
            decode_shareable_id("  YWNjXzEyMw==\n"),
            Ok("acc_123".to_owned())
        );
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(
            decode_shareable_id("not base64!"),
            Err(Error::InvalidShareableId("not base64!".to_owned()))
        );
    }

    #[test]
    fn rejects_empty_id() {
        assert_eq!(
            decode_shareable_id(""),
            Err(Error::InvalidShareableId(String::new()))
        );
    }
}
