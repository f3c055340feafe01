//! Canonical cache key construction
//!
//! Keys are namespaced strings joined with a fixed `:` delimiter. The same
//! inputs always produce the same key, which is what makes cache hits
//! possible at all. Callers are responsible for using identifiers that do
//! not themselves contain the delimiter (UUIDs in practice); malformed
//! identifiers are not validated here and would surface as collisions or
//! guaranteed misses.

/// Key prefix for per-user key/value data
pub const USER_DATA_PREFIX: &str = "userdata";

/// Key prefix for image metadata listings
pub const IMAGE_METADATA_PREFIX: &str = "images";

/// Key prefix for property analysis records
pub const PROPERTY_ANALYSIS_PREFIX: &str = "property";

const DELIMITER: &str = ":";

/// Join a prefix and parts into a canonical namespaced key
pub fn generate_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = String::from(prefix);
    for part in parts {
        key.push_str(DELIMITER);
        key.push_str(part);
    }
    key
}

/// Key for one user-data record: `userdata:<user>:<data_key>`
pub fn user_data_key(user_id: &str, data_key: &str) -> String {
    generate_key(USER_DATA_PREFIX, &[user_id, data_key])
}

/// Key for an image listing: `images:<user>:<category|all>`
pub fn image_metadata_key(user_id: &str, category: Option<&str>) -> String {
    generate_key(IMAGE_METADATA_PREFIX, &[user_id, category.unwrap_or("all")])
}

/// Key for a property analysis: `property:<user>:<analysis|all>`
pub fn property_analysis_key(user_id: &str, analysis_id: Option<&str>) -> String {
    generate_key(
        PROPERTY_ANALYSIS_PREFIX,
        &[user_id, analysis_id.unwrap_or("all")],
    )
}

/// Invalidation prefix covering every key a user owns in a namespace
///
/// Keeps the trailing delimiter so that one user id can never shadow
/// another's prefix (`u1` must not match `u10`'s keys).
pub fn user_prefix(namespace: &str, user_id: &str) -> String {
    format!("{}{}{}{}", namespace, DELIMITER, user_id, DELIMITER)
}
