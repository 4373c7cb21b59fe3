//! Launch URL for the local dev server.

use figbridge_core::{Error, Result};

use crate::encode::{decode_payload, EncodedPayload};
use crate::host::PluginHost;
use crate::types::DecodedPayload;

pub const SENT_FULL: &str = "Payload sent to localhost.";
pub const SENT_REDUCED: &str = "Payload too large: summary sent to localhost.";

/// `<base>#payload=<percent-encoded base64>`.
pub fn build_launch_url(base_url: &str, base64: &str) -> String {
    let base = base_url.split('#').next().unwrap_or(base_url);
    format!("{}#payload={}", base, urlencoding::encode(base64))
}

/// Extract and decode the payload carried by a launch URL.
pub fn decode_launch_url(url: &str) -> Result<DecodedPayload> {
    let (_, fragment) = url
        .split_once('#')
        .ok_or_else(|| Error::Decode("launch url has no fragment".into()))?;
    let raw = fragment
        .split('&')
        .find_map(|pair| pair.strip_prefix("payload="))
        .ok_or_else(|| Error::Decode("launch url has no payload parameter".into()))?;
    decode_payload_param(raw)
}

/// Decode a `payload` parameter value as copied out of a launch URL.
///
/// Accepts the value percent-encoded or not, with or without the leading
/// `payload=`.
pub fn decode_payload_param(raw: &str) -> Result<DecodedPayload> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("payload=").unwrap_or(raw);
    let base64 = urlencoding::decode(raw)
        .map_err(|e| Error::Decode(format!("payload parameter: {}", e)))?;
    decode_payload(&base64)
}

/// Open the launch URL through the host and tell the user which body went out.
pub async fn launch<H: PluginHost>(
    host: &H,
    base_url: &str,
    encoded: &EncodedPayload,
) -> Result<String> {
    let url = build_launch_url(base_url, &encoded.base64);
    host.open_external(&url).await?;
    host.notify(if encoded.reduced { SENT_REDUCED } else { SENT_FULL });
    Ok(url)
}
