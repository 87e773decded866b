//! Address model and the pure transforms between addresses and navigation
//! parameters.
//!
//! The address bar is the single source of truth for navigation state. Every
//! function here is total over well-formed addresses and compares addresses
//! by their normalized string form, never by identity.
//!
//! Listing addresses keep the first path segment as the route namespace
//! (`/view/`, `/bookmark/`): a canonical listing ends in `/` only at that
//! root, deeper listings carry no trailing slash.

use std::fmt;

use crate::config::{FILTER_KEY, PAGE_KEY, SORT_KEY};

// ============================================================================
// SortKey
// ============================================================================

/// Sort order selectable through the `s` query parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    NameUp,
    NameDown,
    DateUp,
    DateDown,
}

impl SortKey {
    /// Every key, in menu order.
    pub const ALL: [SortKey; 4] = [
        SortKey::NameUp,
        SortKey::NameDown,
        SortKey::DateUp,
        SortKey::DateDown,
    ];

    /// Parse a query value. Unrecognized values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name_up" => Some(Self::NameUp),
            "name_down" => Some(Self::NameDown),
            "date_up" => Some(Self::DateUp),
            "date_down" => Some(Self::DateDown),
            _ => None,
        }
    }

    /// Query value of this key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameUp => "name_up",
            Self::NameDown => "name_down",
            Self::DateUp => "date_up",
            Self::DateDown => "date_down",
        }
    }

    /// Short label used in the title suffix (`name:up`).
    pub fn label(self) -> &'static str {
        match self {
            Self::NameUp => "name:up",
            Self::NameDown => "name:down",
            Self::DateUp => "date:up",
            Self::DateDown => "date:down",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Address
// ============================================================================

/// A location: an absolute, percent-encoded path plus decoded query pairs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    path: String,
    query: Vec<(String, String)>,
}

impl Address {
    /// Parse a full URL or a root-relative `path?query` string.
    ///
    /// Scheme and authority are dropped, as is any fragment.
    pub fn parse(input: &str) -> Self {
        let input = input.split('#').next().unwrap_or_default();

        // a scheme separator only counts ahead of the path and query
        let scheme = input
            .find("://")
            .filter(|at| !input[..*at].contains(['/', '?']));
        let rest = match scheme {
            Some(scheme_end) => {
                let after = &input[scheme_end + 3..];
                let path_start = after.find(['/', '?']).unwrap_or(after.len());
                &after[path_start..]
            }
            None => input,
        };

        let (raw_path, raw_query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        let mut path = normalize_path(raw_path);
        if !path.starts_with('/') {
            path.insert(0, '/');
        }

        let query = raw_query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (decode_form(key), decode_form(value)),
                None => (decode_form(pair), String::new()),
            })
            .collect();

        Self { path, query }
    }

    /// Percent-encoded path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query key.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a query key, replacing the first occurrence and dropping the rest.
    pub fn set_query(&mut self, key: &str, value: &str) {
        match self.query.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.query[first].1 = value.to_string();
                let mut index = 0;
                self.query.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.query.push((key.to_string(), value.to_string())),
        }
    }

    /// Remove every occurrence of a query key.
    pub fn remove_query(&mut self, key: &str) {
        self.query.retain(|(k, _)| k != key);
    }

    fn set_path(&mut self, path: String) {
        self.path = path;
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, encode_form(key), encode_form(value))?;
        }
        Ok(())
    }
}

/// Whether two addresses have the same normalized form.
pub fn same_address(left: &Address, right: &Address) -> bool {
    left.to_string() == right.to_string()
}

// ============================================================================
// Address Transforms
// ============================================================================

/// Normalize an address to the listing it denotes, regardless of page, sort
/// and filter state.
pub fn canonical_listing(addr: &Address) -> Address {
    let mut url = addr.clone();
    url.remove_query(PAGE_KEY);
    url.remove_query(SORT_KEY);
    url.remove_query(FILTER_KEY);

    let mut path = url.path.clone();
    if path.ends_with('/') {
        path.pop();
    }
    if second_slash(&path).is_none() {
        path.push('/');
    }
    url.set_path(path);
    url
}

/// Address of the directory `name` inside the listing of `parent`.
pub fn directory_child(parent: &Address, name: &str) -> Address {
    let mut url = canonical_listing(parent);
    let mut path = url.path.clone();
    if !path.ends_with('/') {
        path.push('/');
    }
    path.push_str(&encode_component(name));
    url.set_path(path);
    url
}

/// Copy of `addr` showing page `page_num`.
pub fn page_address(addr: &Address, page_num: usize) -> Address {
    let mut url = addr.clone();
    url.set_query(PAGE_KEY, &page_num.to_string());
    url
}

/// Copy of `addr` showing the list instead of a page.
pub fn list_address(addr: &Address) -> Address {
    let mut url = addr.clone();
    url.remove_query(PAGE_KEY);
    url
}

/// Listing one level up. A route root is its own parent.
pub fn parent_address(addr: &Address) -> Address {
    let mut url = canonical_listing(addr);
    if let Some(second) = second_slash(&url.path) {
        let last = url.path.rfind('/').unwrap_or(second);
        let cut = (second + 1).max(last);
        let path = url.path[..cut].to_string();
        url.set_path(path);
    }
    url
}

/// Copy of `addr` sorted by `key`.
pub fn sorted_address(addr: &Address, key: SortKey) -> Address {
    let mut url = addr.clone();
    url.set_query(SORT_KEY, key.as_str());
    url
}

/// Copy of `addr` filtered by `text`; empty or absent text clears the filter.
pub fn filtered_address(addr: &Address, text: Option<&str>) -> Address {
    let mut url = addr.clone();
    match text {
        Some(text) if !text.is_empty() => url.set_query(FILTER_KEY, text),
        _ => url.remove_query(FILTER_KEY),
    }
    url
}

// ============================================================================
// Address Queries
// ============================================================================

/// Page index, parsed like `parseInt` (leading digits). Negative or
/// non-numeric values yield `None`.
pub fn get_page(addr: &Address) -> Option<usize> {
    let value = addr.query_value(PAGE_KEY)?.trim_start();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 || negative {
        return None;
    }
    digits[..end].parse().ok()
}

pub fn get_sort_key(addr: &Address) -> Option<SortKey> {
    addr.query_value(SORT_KEY).and_then(SortKey::parse)
}

pub fn get_filter_text(addr: &Address) -> Option<String> {
    addr.query_value(FILTER_KEY)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Decoded name of the listed directory, `None` at a route root.
pub fn get_directory(addr: &Address) -> Option<String> {
    let url = canonical_listing(addr);
    if url.path.ends_with('/') {
        return None;
    }
    let start = url.path.rfind('/').map_or(0, |i| i + 1);
    Some(decode_component(&url.path[start..]))
}

/// Whether `parent` lists the directory shown by `list`.
pub fn is_parent_list(list: &Address, parent: &Address) -> bool {
    let Some(dir) = get_directory(list) else {
        return false;
    };
    let target = canonical_listing(list);
    let candidate = directory_child(&canonical_listing(parent), &dir);
    same_address(&target, &candidate)
}

/// Whether `parent` is the list view that `page` is a page of.
pub fn is_parent_page(page: &Address, parent: &Address) -> bool {
    let Some(page_num) = get_page(page) else {
        return false;
    };
    get_page(parent).is_none() && same_address(&page_address(parent, page_num), page)
}

/// Whether `parent` is the logical parent of `target`, either as the
/// enclosing listing or as the list view of a page.
pub fn is_parent(target: &Address, parent: &Address) -> bool {
    is_parent_list(target, parent) || is_parent_page(target, parent)
}

// ============================================================================
// Percent Encoding
// ============================================================================

fn second_slash(path: &str) -> Option<usize> {
    path.get(1..)?.find('/').map(|i| i + 1)
}

/// Encode like `encodeURIComponent`.
pub fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => push_escaped(&mut out, byte),
        }
    }
    out
}

/// Decode like `decodeURIComponent`, replacing invalid UTF-8.
pub fn decode_component(text: &str) -> String {
    String::from_utf8_lossy(&percent_decode(text.as_bytes())).into_owned()
}

/// Decode every path segment of `path`.
pub fn decode_path(path: &str) -> String {
    path.split('/')
        .map(decode_component)
        .collect::<Vec<_>>()
        .join("/")
}

fn encode_form(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => push_escaped(&mut out, byte),
        }
    }
    out
}

fn decode_form(text: &str) -> String {
    let plus_decoded = text.replace('+', " ");
    decode_component(&plus_decoded)
}

/// Escape bytes a browser would escape in a path, keeping existing escapes.
fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            0..=0x20 | b'"' | b'<' | b'>' | b'`' | b'{' | b'}' | 0x7f..=0xff => {
                push_escaped(&mut out, byte)
            }
            _ => out.push(byte as char),
        }
    }
    out
}

fn push_escaped(out: &mut String, byte: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.push('%');
    out.push(HEX[(byte >> 4) as usize] as char);
    out.push(HEX[(byte & 0x0f) as usize] as char);
}

fn percent_decode(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            out.push(hi << 4 | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::parse(s)
    }

    #[test]
    fn test_parse_full_url_drops_origin_and_fragment() {
        let a = addr("https://example.com:8080/view/a%20b?p=3&s=date_up#top");
        assert_eq!(a.path(), "/view/a%20b");
        assert_eq!(a.query_value("p"), Some("3"));
        assert_eq!(a.to_string(), "/view/a%20b?p=3&s=date_up");
    }

    #[test]
    fn test_parse_relative_with_url_in_query() {
        let a = addr("/view/a?f=http://x");
        assert_eq!(a.path(), "/view/a");
        assert_eq!(get_filter_text(&a).as_deref(), Some("http://x"));
        assert_eq!(addr("/view/http://x").path(), "/view/http://x");
    }

    #[test]
    fn test_parse_escapes_raw_path_bytes() {
        assert_eq!(addr("/view/a b").path(), "/view/a%20b");
        assert_eq!(addr("view/x").path(), "/view/x");
        assert_eq!(addr("https://example.com").path(), "/");
    }

    #[test]
    fn test_query_round_trip_uses_form_encoding() {
        let a = filtered_address(&addr("/view/a"), Some("cat & dog"));
        assert_eq!(a.to_string(), "/view/a?f=cat+%26+dog");
        assert_eq!(
            get_filter_text(&addr(&a.to_string())).as_deref(),
            Some("cat & dog")
        );
    }

    #[test]
    fn test_set_query_replaces_first_and_drops_duplicates() {
        let mut a = addr("/view/a?p=1&x=y&p=2");
        a.set_query("p", "5");
        assert_eq!(a.to_string(), "/view/a?p=5&x=y");
    }

    #[test]
    fn test_canonical_listing() {
        assert_eq!(canonical_listing(&addr("/view/a/b/")).to_string(), "/view/a/b");
        assert_eq!(canonical_listing(&addr("/view/a/b")).to_string(), "/view/a/b");
        assert_eq!(canonical_listing(&addr("/view")).to_string(), "/view/");
        assert_eq!(canonical_listing(&addr("/view/")).to_string(), "/view/");
        assert_eq!(
            canonical_listing(&addr("/view/a?p=2&s=name_down&f=x&keep=1")).to_string(),
            "/view/a?keep=1"
        );
    }

    #[test]
    fn test_canonical_listing_is_idempotent() {
        for s in [
            "/", "/view", "/view/", "/view/a", "/view/a/", "/view/a/b?p=1",
            "/bookmark/tag/3/sub?s=date_up&f=q", "/view/%E3%81%82/",
        ] {
            let once = canonical_listing(&addr(s));
            let twice = canonical_listing(&once);
            assert!(same_address(&once, &twice), "not idempotent for {s}");
        }
    }

    #[test]
    fn test_directory_child_encodes_name() {
        assert_eq!(
            directory_child(&addr("/view/a?p=1"), "b c&d").to_string(),
            "/view/a/b%20c%26d"
        );
        assert_eq!(directory_child(&addr("/view"), "x").to_string(), "/view/x");
    }

    #[test]
    fn test_parent_address() {
        assert_eq!(parent_address(&addr("/view/a/b")).to_string(), "/view/a");
        assert_eq!(parent_address(&addr("/view/a/b/")).to_string(), "/view/a");
        assert_eq!(parent_address(&addr("/view/a")).to_string(), "/view/");
        assert_eq!(parent_address(&addr("/view/")).to_string(), "/view/");
    }

    #[test]
    fn test_parent_of_child_round_trips() {
        for s in ["/view/", "/view/a", "/view/a/b/", "/bookmark/t/1?p=4"] {
            let listing = canonical_listing(&addr(s));
            let child = directory_child(&listing, "name");
            let back = canonical_listing(&parent_address(&child));
            assert!(same_address(&back, &listing), "round trip failed for {s}");
        }
    }

    #[test]
    fn test_page_and_list_address() {
        let page = page_address(&addr("/view/a?s=date_up"), 4);
        assert_eq!(page.to_string(), "/view/a?s=date_up&p=4");
        assert_eq!(list_address(&page).to_string(), "/view/a?s=date_up");
    }

    #[test]
    fn test_get_page() {
        assert_eq!(get_page(&addr("/view/a?p=12")), Some(12));
        assert_eq!(get_page(&addr("/view/a?p=3abc")), Some(3));
        assert_eq!(get_page(&addr("/view/a?p=")), None);
        assert_eq!(get_page(&addr("/view/a?p=x")), None);
        assert_eq!(get_page(&addr("/view/a?p=-1")), None);
        assert_eq!(get_page(&addr("/view/a")), None);
    }

    #[test]
    fn test_get_sort_key_and_filter() {
        assert_eq!(get_sort_key(&addr("/view/a?s=date_down")), Some(SortKey::DateDown));
        assert_eq!(get_sort_key(&addr("/view/a?s=")), None);
        assert_eq!(get_sort_key(&addr("/view/a?s=bogus")), None);
        assert_eq!(get_filter_text(&addr("/view/a?f=")), None);
        assert_eq!(get_filter_text(&addr("/view/a?f=img")).as_deref(), Some("img"));

        let cleared = filtered_address(&addr("/view/a?f=img"), None);
        assert_eq!(cleared.to_string(), "/view/a");
        let sorted = sorted_address(&addr("/view/a"), SortKey::NameDown);
        assert_eq!(sorted.to_string(), "/view/a?s=name_down");
    }

    #[test]
    fn test_get_directory() {
        assert_eq!(get_directory(&addr("/view/a/b%20c/")).as_deref(), Some("b c"));
        assert_eq!(get_directory(&addr("/view/")), None);
    }

    #[test]
    fn test_is_parent_list() {
        assert!(is_parent_list(&addr("/view/dir/sub"), &addr("/view/dir")));
        assert!(is_parent_list(&addr("/view/dir/sub?s=date_up"), &addr("/view/dir?p=2")));
        assert!(is_parent_list(&addr("/view/dir"), &addr("/view/")));
        assert!(!is_parent_list(&addr("/view/dir"), &addr("/view/dir/sub")));
        assert!(!is_parent_list(&addr("/view/dir?p=1"), &addr("/view/dir")));
    }

    #[test]
    fn test_is_parent_page() {
        assert!(is_parent_page(&addr("/view/dir?p=3"), &addr("/view/dir")));
        assert!(is_parent_page(&addr("/view/dir?s=date_up&p=3"), &addr("/view/dir?s=date_up")));
        assert!(!is_parent_page(&addr("/view/dir?p=3"), &addr("/view/dir?p=2")));
        assert!(!is_parent_page(&addr("/view/dir"), &addr("/view/dir")));
        assert!(!is_parent_page(&addr("/view/dir?p=3"), &addr("/view/other")));
    }

    #[test]
    fn test_is_parent() {
        assert!(is_parent(&addr("/view/dir/sub"), &addr("/view/dir")));
        assert!(is_parent(&addr("/view/dir?p=0"), &addr("/view/dir")));
        assert!(!is_parent(&addr("/view/dir"), &addr("/view/dir?p=0")));
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/a%20b/%E3%81%82"), "/a b/あ");
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
    }
}
