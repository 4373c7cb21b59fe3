//! Payload encoding with the size fallback.
//!
//! The payload travels in a URL fragment, so a JSON body longer than the
//! configured limit is replaced by the counts-only [`ReducedPayload`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use figbridge_core::{Error, Result};
use tracing::{debug, warn};

use crate::types::{DecodedPayload, Payload, ReducedPayload};

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPayload {
    /// Base64 of the UTF-8 JSON body.
    pub base64: String,
    /// Whether the reduced projection was sent.
    pub reduced: bool,
    /// Length of the full payload JSON, in UTF-16 code units.
    pub full_len: usize,
}

/// JSON string length as measured by the plugin runtime (UTF-16 code units).
pub fn json_length(json: &str) -> usize {
    json.encode_utf16().count()
}

pub fn encode_payload(payload: &Payload, limit: usize) -> Result<EncodedPayload> {
    let json = serde_json::to_string(payload)?;
    let full_len = json_length(&json);

    if full_len <= limit {
        debug!("Encoding full payload ({} chars)", full_len);
        return Ok(EncodedPayload {
            base64: STANDARD.encode(json.as_bytes()),
            reduced: false,
            full_len,
        });
    }

    warn!(
        "Payload JSON is {} chars (limit {}), sending reduced summary",
        full_len, limit
    );
    let reduced = serde_json::to_string(&ReducedPayload::from(payload))?;
    Ok(EncodedPayload {
        base64: STANDARD.encode(reduced.as_bytes()),
        reduced: true,
        full_len,
    })
}

pub fn decode_payload(base64: &str) -> Result<DecodedPayload> {
    let bytes = STANDARD
        .decode(base64.trim())
        .map_err(|e| Error::Decode(format!("invalid base64: {}", e)))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| Error::Decode(format!("payload is not UTF-8: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| Error::Decode(format!("payload JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    fn payload_with_text(characters: &str) -> Payload {
        Payload {
            file_key: None,
            file_name: "Doc".into(),
            page_id: "0:1".into(),
            page_name: "Page".into(),
            frames: vec![Frame {
                id: "1:1".into(),
                name: "tagueamento".into(),
                node_type: FrameTag::Frame,
                text_nodes: vec![TextEntry {
                    id: "1:2".into(),
                    name: "t".into(),
                    characters: characters.into(),
                    font_name: SafeRead::Fallback(FontSentinel::Unknown),
                    fills: None,
                    bounds: Bounds {
                        x: 0.0,
                        y: 0.0,
                        width: 10.0,
                        height: 10.0,
                    },
                }],
                components: vec![ComponentRef {
                    id: "1:3".into(),
                    name: "Icon".into(),
                    node_type: ComponentKind::Instance,
                }],
            }],
        }
    }

    /// Payload whose JSON is exactly `len` characters long.
    fn payload_of_len(len: usize) -> Payload {
        let base = serde_json::to_string(&payload_with_text("")).unwrap().len();
        payload_with_text(&"a".repeat(len - base))
    }

    #[test]
    fn test_round_trip_full() {
        let payload = payload_with_text("Olá — ✓ unicode");
        let encoded = encode_payload(&payload, 150_000).unwrap();
        assert!(!encoded.reduced);
        assert_eq!(decode_payload(&encoded.base64).unwrap(), DecodedPayload::Full(payload));
    }

    #[test]
    fn test_round_trip_reduced() {
        let payload = payload_with_text("long text");
        let encoded = encode_payload(&payload, 10).unwrap();
        assert!(encoded.reduced);
        assert_eq!(
            decode_payload(&encoded.base64).unwrap(),
            DecodedPayload::Reduced(ReducedPayload::from(&payload))
        );
    }

    #[test]
    fn test_threshold_boundary() {
        let at_limit = payload_of_len(150_000);
        assert_eq!(serde_json::to_string(&at_limit).unwrap().len(), 150_000);
        let encoded = encode_payload(&at_limit, 150_000).unwrap();
        assert!(!encoded.reduced);
        assert_eq!(encoded.full_len, 150_000);

        let over = payload_of_len(150_001);
        let encoded = encode_payload(&over, 150_000).unwrap();
        assert!(encoded.reduced);
        assert_eq!(encoded.full_len, 150_001);
    }

    #[test]
    fn test_length_matches_canonical_json() {
        let expected = concat!(
            r#"{"fileKey":null,"fileName":"Doc","pageId":"0:1","pageName":"Page","frames":[{"#,
            r#""id":"1:1","name":"tagueamento","nodeType":"FRAME","textNodes":[{"id":"1:2","#,
            r#""name":"t","characters":"","fontName":"UNKNOWN","fills":null,"#,
            r#""bounds":{"x":0,"y":0,"width":10,"height":10}}],"#,
            r#""components":[{"id":"1:3","name":"Icon","nodeType":"INSTANCE"}]}]}"#
        );
        let payload = payload_with_text("");
        assert_eq!(serde_json::to_string(&payload).unwrap(), expected);

        let encoded = encode_payload(&payload, expected.len()).unwrap();
        assert!(!encoded.reduced);
        assert_eq!(encoded.full_len, json_length(expected));
        assert!(encode_payload(&payload, expected.len() - 1).unwrap().reduced);
    }

    #[test]
    fn test_length_counts_utf16_units() {
        assert_eq!(json_length("abc"), 3);
        assert_eq!(json_length("é"), 1);
        assert_eq!(json_length("😀"), 2);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_payload("%%%"), Err(Error::Decode(_))));
        let not_json = STANDARD.encode("hello");
        assert!(matches!(decode_payload(&not_json), Err(Error::Decode(_))));
    }
}
