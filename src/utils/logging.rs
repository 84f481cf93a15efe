use serde::Serialize;

/// Pretty-prints `value` at debug level; skips serialization entirely when debug is off.
pub(crate) fn debug_json<T>(label: &str, value: &T)
where
    T: Serialize + ?Sized,
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty_json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    tracing::debug!(payload = %pretty_json, "{label}");
}
