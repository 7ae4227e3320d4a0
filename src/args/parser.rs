use super::ArgumentSet;

/// Parses `key=value` lines. The first `=` splits key from value, both sides
/// are trimmed and lines without `=` are ignored.
pub fn parse_arguments(content: &str) -> ArgumentSet {
    content
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Renders one `key=value` line per entry, sorted by key, without a
/// trailing newline.
pub fn serialize_arguments(args: &ArgumentSet) -> String {
    args.iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}
