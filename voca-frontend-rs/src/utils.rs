pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    //
    // For more details see
    // https://github.com/rustwasm/console_error_panic_hook#readme
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Milliseconds since the epoch as a `DateTime`. JS hands us `Date.now()`.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn from_js_millis(millis: f64) -> Option<chrono::DateTime<chrono::Utc>> {
    if !millis.is_finite() {
        return None;
    }
    chrono::DateTime::from_timestamp_millis(millis as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_timestamps() {
        let date = from_js_millis(1_714_554_000_000.0).unwrap();
        assert_eq!(date.to_rfc3339(), "2024-05-01T09:00:00+00:00");
        assert!(from_js_millis(f64::NAN).is_none());
    }
}
