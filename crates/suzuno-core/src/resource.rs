//! Listing entries and their sorted, filtered, link-annotated projection.

use std::cmp::Ordering;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::path::{Address, SortKey, directory_child, page_address};

// =============================================================================
// Wire Types
// =============================================================================

/// Kind of a listing entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Directory,
    #[default]
    #[serde(other)]
    Empty,
}

/// One entry of a listing, as returned by the listing service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_at: Option<i64>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Path segment used instead of `name` when linking a directory.
    #[serde(skip)]
    pub link_segment: Option<String>,
}

impl ResourceEntry {
    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == ResourceKind::Directory
    }
}

/// Response body of the listing service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
}

// =============================================================================
// Processed Resources
// =============================================================================

/// A listing entry with the address it links to in the current view.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    pub entry: Rc<ResourceEntry>,
    pub link: Option<Address>,
}

/// Sort, filter and link `resources` for display at `location`.
///
/// The sort is stable. Files link to their rank among files in the
/// processed order, directories to their child listing.
pub fn process(
    resources: &[Rc<ResourceEntry>],
    sort_key: Option<SortKey>,
    filter: Option<&str>,
    location: &Address,
) -> Vec<Resource> {
    let mut sorted: Vec<Rc<ResourceEntry>> = resources.to_vec();
    let key = sort_key.unwrap_or_default();
    sorted.sort_by(|a, b| compare(a, b, key));

    if let Some(filter) = filter {
        sorted.retain(|r| r.name.contains(filter));
    }

    let mut file_count = 0;
    sorted
        .into_iter()
        .map(|entry| {
            let link = match entry.kind {
                ResourceKind::Directory => {
                    let segment = entry.link_segment.as_deref().unwrap_or(&entry.name);
                    Some(directory_child(location, segment))
                }
                ResourceKind::File => {
                    let link = page_address(location, file_count);
                    file_count += 1;
                    Some(link)
                }
                ResourceKind::Empty => None,
            };
            Resource { entry, link }
        })
        .collect()
}

fn compare(a: &ResourceEntry, b: &ResourceEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::NameUp => natural_cmp(&a.name, &b.name),
        SortKey::NameDown => natural_cmp(&a.name, &b.name).reverse(),
        SortKey::DateUp => a.modified_at.cmp(&b.modified_at),
        SortKey::DateDown => a.modified_at.cmp(&b.modified_at).reverse(),
    }
}

// =============================================================================
// Natural Ordering
// =============================================================================

/// Compare names ignoring case and accents, with digit runs compared by
/// numeric value ("img2" < "img10").
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = fold(a);
    let b = fold(b);
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let a_end = digit_run_end(&a, i);
            let b_end = digit_run_end(&b, j);
            let ord = compare_digits(&a[i..a_end], &b[j..b_end]);
            if ord != Ordering::Equal {
                return ord;
            }
            i = a_end;
            j = b_end;
            continue;
        }
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
            ord => return ord,
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn fold(text: &str) -> Vec<char> {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn digit_run_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |offset| start + offset)
}

fn compare_digits(a: &[char], b: &[char]) -> Ordering {
    let trim = |run: &[char]| -> usize { run.iter().take_while(|c| **c == '0').count() };
    let a = &a[trim(a)..];
    let b = &b[trim(b)..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(kind: ResourceKind, name: &str, modified_at: i64) -> Rc<ResourceEntry> {
        Rc::new(ResourceEntry {
            kind,
            name: name.to_string(),
            modified_at: Some(modified_at),
            ..Default::default()
        })
    }

    fn file(name: &str, modified_at: i64) -> Rc<ResourceEntry> {
        entry(ResourceKind::File, name, modified_at)
    }

    fn names(processed: &[Resource]) -> Vec<&str> {
        processed.iter().map(|r| r.entry.name.as_str()).collect()
    }

    fn location() -> Address {
        Address::parse("/view/album")
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("img2", "img10"), Ordering::Less);
        assert_eq!(natural_cmp("IMG1", "img1"), Ordering::Equal);
        assert_eq!(natural_cmp("café", "cafe"), Ordering::Equal);
        assert_eq!(natural_cmp("a007", "a7"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "ab"), Ordering::Less);
        assert_eq!(natural_cmp("b", "A"), Ordering::Greater);
    }

    #[test]
    fn test_name_sort_is_numeric_aware() {
        let resources = [file("img2", 0), file("img10", 0), file("img1", 0)];
        let processed = process(&resources, Some(SortKey::NameUp), None, &location());
        assert_eq!(names(&processed), vec!["img1", "img2", "img10"]);

        let processed = process(&resources, Some(SortKey::NameDown), None, &location());
        assert_eq!(names(&processed), vec!["img10", "img2", "img1"]);
    }

    #[test]
    fn test_sort_is_stable_under_ties() {
        let resources = [file("B", 1), file("a", 2), file("b", 3), file("A", 4)];
        let processed = process(&resources, None, None, &location());
        let dates: Vec<_> = processed.iter().map(|r| r.entry.modified_at).collect();
        assert_eq!(dates, vec![Some(2), Some(4), Some(1), Some(3)]);
    }

    #[test]
    fn test_date_sort() {
        let resources = [file("x", 30), file("y", 10), file("z", 20)];
        let up = process(&resources, Some(SortKey::DateUp), None, &location());
        assert_eq!(names(&up), vec!["y", "z", "x"]);
        let down = process(&resources, Some(SortKey::DateDown), None, &location());
        assert_eq!(names(&down), vec!["x", "z", "y"]);
    }

    #[test]
    fn test_filter_is_case_sensitive_substring() {
        let resources = [file("Cat.jpg", 0), file("cat.png", 0), file("dog.png", 0)];
        let processed = process(&resources, None, Some("cat"), &location());
        assert_eq!(names(&processed), vec!["cat.png"]);
        assert!(processed.len() <= resources.len());

        let unfiltered = process(&resources, None, None, &location());
        assert_eq!(unfiltered.len(), resources.len());
    }

    #[test]
    fn test_links_follow_processed_order() {
        let resources = [
            file("b.jpg", 0),
            entry(ResourceKind::Directory, "sub dir", 0),
            file("a.jpg", 0),
            entry(ResourceKind::Empty, "c", 0),
        ];
        let loc = Address::parse("/view/album?s=name_up");
        let processed = process(&resources, Some(SortKey::NameUp), None, &loc);

        let links: Vec<_> = processed
            .iter()
            .map(|r| r.link.as_ref().map(|l| l.to_string()))
            .collect();
        assert_eq!(
            links,
            vec![
                Some("/view/album?s=name_up&p=0".to_string()),
                Some("/view/album?s=name_up&p=1".to_string()),
                None,
                Some("/view/album/sub%20dir".to_string()),
            ]
        );
    }

    #[test]
    fn test_link_segment_overrides_directory_name() {
        let mut dir = ResourceEntry {
            kind: ResourceKind::Directory,
            name: "Holiday".to_string(),
            ..Default::default()
        };
        dir.link_segment = Some("3".to_string());
        let processed = process(&[Rc::new(dir)], None, None, &Address::parse("/bookmark/fav"));
        assert_eq!(
            processed[0].link.as_ref().map(|l| l.to_string()).as_deref(),
            Some("/bookmark/fav/3")
        );
    }

    #[test]
    fn test_listing_deserializes_wire_format() {
        let json = r#"{"resources":[
            {"type":"file","name":"a.jpg","path":"/a.jpg","modified_at":5,"size":10,
             "file_url":"/file/a.jpg","thumbnail_url":"/thumbnail/a.jpg"},
            {"type":"directory","name":"sub","path":"/sub","modified_at":6,"size":0},
            {"type":"socket","name":"odd"}
        ]}"#;
        let listing: Listing = serde_json::from_str(json).expect("valid listing");
        assert_eq!(listing.resources.len(), 3);
        assert!(listing.resources[0].is_file());
        assert_eq!(listing.resources[0].file_url.as_deref(), Some("/file/a.jpg"));
        assert!(listing.resources[1].is_dir());
        assert_eq!(listing.resources[2].kind, ResourceKind::Empty);
    }
}
