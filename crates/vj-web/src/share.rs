// Share-link helpers. Pure string work only; the web glue lives in `handle`.

/// `URLSearchParams` turns an unescaped `+` into a space, which base64
/// cannot contain, so every space is put back.
#[inline]
pub fn restore_plus(raw: &str) -> String {
    raw.trim().replace(' ', "+")
}

/// `origin` + `path` + `?<param>=<value>`; `value` must already be
/// URI-component encoded.
pub fn share_url(origin: &str, path: &str, param: &str, value: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    format!("{}{}?{}={}", origin, path, param, value)
}
