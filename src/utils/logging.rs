use serde::Serialize;

/// Upstream error bodies are cut to this many characters in logs.
pub(crate) const BODY_PREVIEW_CHARS: usize = 300;

/// Runs `log` with `value` as indented JSON, only when DEBUG is enabled.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log: F)
where
    T: Serialize,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    match serde_json::to_string_pretty(value) {
        Ok(pretty) => log(&pretty),
        Err(err) => log(&format!("<unserializable: {err}>")),
    }
}

/// Lossy UTF-8 head of a response body for log lines.
pub(crate) fn body_preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_bounded_and_lossy() {
        let long = "x".repeat(BODY_PREVIEW_CHARS * 2);
        assert_eq!(body_preview(long.as_bytes()).len(), BODY_PREVIEW_CHARS);
        assert_eq!(body_preview(b"ok \xff"), "ok \u{fffd}");
    }
}
