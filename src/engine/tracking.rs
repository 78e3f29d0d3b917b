//! Outbound tracking link synthesis.
//!
//! Merges the two attribution parameters into a merchant's template URL:
//! the primary parameter carries the user id and the secondary parameter
//! carries the click id used for postback attribution.

/// Query parameter carrying the user id.
const PRIMARY_KEY: &str = "UniqueId";
/// Query parameter carrying the click id.
const SECONDARY_KEY: &str = "UniqueId2";

/// Build a merchant-specific outbound tracking URL.
///
/// Deterministic; never duplicates a parameter key that is already fully
/// present with a value. Template authors may leave `UniqueId=` dangling
/// with an empty value to mark where the user id should be filled in.
pub fn generate_tracking_link(template: &str, user_id: &str, click_id: &str) -> String {
    let mut url = template.to_string();

    match param_value_span(&url, PRIMARY_KEY) {
        // Dangling `UniqueId=`: fill the user id in place.
        Some((start, end)) if start == end => url.insert_str(start, user_id),
        // Already carries a value: leave untouched.
        Some(_) => {}
        None => append_param(&mut url, PRIMARY_KEY, user_id),
    }

    if param_value_span(&url, SECONDARY_KEY).is_none() {
        append_param(&mut url, SECONDARY_KEY, click_id);
    }

    url
}

fn append_param(url: &mut String, key: &str, value: &str) {
    let sep = if url.contains('?') { '&' } else { '?' };
    url.push(sep);
    url.push_str(key);
    url.push('=');
    url.push_str(value);
}

/// Locate the value span of `key` in the URL's query string.
///
/// Matches only at a parameter boundary (`?` or `&` before the key), so
/// `UniqueId` does not match inside `UniqueId2` or a longer key.
fn param_value_span(url: &str, key: &str) -> Option<(usize, usize)> {
    let needle = format!("{}=", key);
    let mut from = 0;
    while let Some(idx) = url[from..].find(&needle) {
        let abs = from + idx;
        let at_boundary = abs > 0 && matches!(url.as_bytes()[abs - 1], b'?' | b'&');
        if at_boundary {
            let start = abs + needle.len();
            let end = url[start..]
                .find(['&', '#'])
                .map(|i| start + i)
                .unwrap_or(url.len());
            return Some((start, end));
        }
        from = abs + needle.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_dangling_primary_key() {
        let url = generate_tracking_link("https://t.example/t/X?UniqueId=", "u1", "c1");
        assert_eq!(url, "https://t.example/t/X?UniqueId=u1&UniqueId2=c1");
    }

    #[test]
    fn appends_both_keys_when_no_query() {
        let url = generate_tracking_link("https://t.example/t/X", "u1", "c1");
        assert_eq!(url, "https://t.example/t/X?UniqueId=u1&UniqueId2=c1");
    }

    #[test]
    fn appends_with_ampersand_when_query_exists() {
        let url = generate_tracking_link("https://t.example/t/X?ref=home", "u1", "c1");
        assert_eq!(url, "https://t.example/t/X?ref=home&UniqueId=u1&UniqueId2=c1");
    }

    #[test]
    fn never_duplicates_populated_primary_key() {
        let url = generate_tracking_link("https://t.example/t/X?UniqueId=abc", "u1", "c1");
        assert_eq!(url, "https://t.example/t/X?UniqueId=abc&UniqueId2=c1");
    }

    #[test]
    fn never_duplicates_populated_secondary_key() {
        let url =
            generate_tracking_link("https://t.example/t/X?UniqueId=abc&UniqueId2=def", "u1", "c1");
        assert_eq!(url, "https://t.example/t/X?UniqueId=abc&UniqueId2=def");
    }

    #[test]
    fn dangling_key_mid_query() {
        let url = generate_tracking_link("https://t.example/t/X?UniqueId=&ref=home", "u1", "c1");
        assert_eq!(url, "https://t.example/t/X?UniqueId=u1&ref=home&UniqueId2=c1");
    }

    #[test]
    fn secondary_key_does_not_satisfy_primary() {
        // UniqueId2 present must not be mistaken for UniqueId.
        let url = generate_tracking_link("https://t.example/t/X?UniqueId2=def", "u1", "c1");
        assert_eq!(url, "https://t.example/t/X?UniqueId2=def&UniqueId=u1");
    }

    #[test]
    fn similar_key_does_not_match() {
        let url = generate_tracking_link("https://t.example/t/X?myUniqueId=zz", "u1", "c1");
        assert_eq!(
            url,
            "https://t.example/t/X?myUniqueId=zz&UniqueId=u1&UniqueId2=c1"
        );
    }

    #[test]
    fn deterministic() {
        let a = generate_tracking_link("https://t.example/t/X", "u1", "c1");
        let b = generate_tracking_link("https://t.example/t/X", "u1", "c1");
        assert_eq!(a, b);
    }
}
