use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

/// Encode the collection as the slot blob.
///
/// Layout: a JSON array of assets with camelCase fields, e.g.
/// ```text
/// [{"id":"…","symbol":"ETH","narrative":"Layer1","category":"BlueChips",
///   "entryPrice":2500.0,"quantity":2.0,
///   "takeProfitLevels":{"tp1":{"percentage":20.0,"targetPrice":4000.0,
///   "quantity":0.4,"price":null}, …},"moonbagPercentage":45.0}]
/// ```
/// There is no version field; fields added later must default when absent.
pub fn encode(portfolio: &Portfolio) -> Result<String, CoreError> {
    serde_json::to_string(portfolio)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize assets: {e}")))
}

/// Pretty-printed variant of [`encode`] for exports.
pub fn encode_pretty(portfolio: &Portfolio) -> Result<String, CoreError> {
    serde_json::to_string_pretty(portfolio)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize assets: {e}")))
}

/// Decode a slot blob. Any shape mismatch is an error; callers that must
/// fail open (see [`super::manager::StorageManager::load`]) handle it.
pub fn decode(blob: &str) -> Result<Portfolio, CoreError> {
    serde_json::from_str(blob)
        .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize assets: {e}")))
}
