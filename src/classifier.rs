/// Column-name fragments that mark a column as holding short identifiers or
/// links worth copying with one click.
pub const COPYABLE_KEYWORDS: [&str; 5] = ["id", "name", "url", "email", "cluster"];

/// Case-insensitive substring match of the column key against
/// [`COPYABLE_KEYWORDS`].
pub fn is_copyable_column(key: &str) -> bool {
    let key = key.to_lowercase();
    COPYABLE_KEYWORDS.iter().any(|kw| key.contains(kw))
}
