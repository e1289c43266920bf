/// Turns the host's map name into the key used for a zone's data section.
///
/// Workshop maps report names such as `workshop/123/de_cache.vpk | Cache`,
/// so anything after `" | "` is dropped before the directory and extension
/// are stripped.
pub fn normalize_zone_id(raw: &str) -> String {
    let without_title = match raw.find(" | ") {
        Some(cut) => &raw[..cut],
        None => raw,
    };
    let lowered = without_title.trim().to_lowercase();
    let base = lowered
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let stem = match base.rfind('.') {
        Some(dot) => &base[..dot],
        None => base,
    };
    stem.to_string()
}
