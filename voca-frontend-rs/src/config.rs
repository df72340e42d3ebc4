/// Knobs for a [`crate::store::QuizStore`]. Every field has a default, so JS
/// can pass a partial object (or nothing at all).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, tsify::Tsify, PartialEq, Eq)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Namespace the durable progress is saved under.
    pub storage_key: String,
    pub history_limit: usize,
    /// Minutes local time is behind UTC, as returned by JS `Date.getTimezoneOffset()`.
    /// Streaks count calendar days in this local time.
    pub utc_offset_minutes: i32,
    /// Fixed seed for question shuffles. When unset, the first session's start time is used.
    pub seed: Option<u64>,
}

pub const DEFAULT_STORAGE_KEY: &str = "quiz-storage";
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            utc_offset_minutes: 0,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"utcOffsetMinutes": -540}"#).unwrap();
        assert_eq!(config.utc_offset_minutes, -540);
        assert_eq!(config.storage_key, "quiz-storage");
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.seed, None);
    }
}
