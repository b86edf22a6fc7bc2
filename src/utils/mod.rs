/// Strip the plugin asset prefix (and a leading `v`) from a release tag.
pub fn normalize_version(tag: &str, prefix: &str) -> String {
    let tag = tag.trim();
    let tag = tag.strip_prefix(prefix).unwrap_or(tag);
    tag.strip_prefix(['v', 'V']).unwrap_or(tag).to_string()
}

/// Name of the logged-in user, used to locate the per-user data directory.
pub fn current_username() -> Option<String> {
    ["USERNAME", "USER", "LOGNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
}
