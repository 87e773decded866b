//! Resource routes: which source backs a listing address, and its title.
//!
//! - `/view/<path>` → directory metadata for `<path>`
//! - `/bookmark/` → every tag, built locally
//! - `/bookmark/<tag>` → batch metadata for the tag's items
//! - `/bookmark/<tag>/<num>[/<sub>]` → directory metadata inside an item

use serde::Serialize;

use crate::bookmark::{BookmarkItem, BookmarkList};
use crate::config::{BATCH_ENDPOINT, BOOKMARK_PREFIX, DIRECTORY_ENDPOINT, VIEW_PREFIX};
use crate::error::RouteError;
use crate::path::{Address, canonical_listing, decode_component, decode_path, encode_component};
use crate::resource::{Listing, ResourceEntry, ResourceKind};

/// A network request for a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    /// `GET url`
    Get { url: String },
    /// `POST url` with a [`BatchRequest`] body.
    Batch { url: String, body: BatchRequest },
}

/// Body of a batch metadata request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRequest {
    pub targets: Vec<String>,
}

/// How the listing of an address is obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPlan {
    /// Ask the network. `link_segments`, when present, replaces the link
    /// segment of each returned entry by position.
    Remote {
        request: FetchRequest,
        link_segments: Option<Vec<String>>,
    },
    /// The listing is known locally.
    Immediate(Listing),
}

/// Apply per-position link segments to a fetched listing.
pub fn apply_link_segments(listing: &mut Listing, segments: &[String]) {
    for (entry, segment) in listing.resources.iter_mut().zip(segments) {
        entry.link_segment = Some(segment.clone());
    }
}

struct BookmarkPath<'a> {
    tag: Option<String>,
    num: Option<&'a str>,
    sub: Option<&'a str>,
}

fn parse_bookmark_path(rest: &str) -> BookmarkPath<'_> {
    let mut comps = rest.trim_start_matches('/').splitn(3, '/');
    let tag = non_empty(comps.next()).map(decode_component);
    let num = non_empty(comps.next());
    let sub = non_empty(comps.next());
    BookmarkPath { tag, num, sub }
}

fn non_empty(comp: Option<&str>) -> Option<&str> {
    comp.filter(|c| !c.is_empty())
}

fn find_item(
    bookmarks: &BookmarkList,
    tag_name: &str,
    num: &str,
) -> Result<BookmarkItem, RouteError> {
    let tag = bookmarks
        .find_tag(tag_name)
        .ok_or_else(|| RouteError::UnknownTag(tag_name.to_string()))?;
    bookmarks
        .items_of(&tag.id)
        .into_iter()
        .find(|item| item.num == num)
        .ok_or_else(|| RouteError::UnknownItem {
            tag: tag_name.to_string(),
            num: num.to_string(),
        })
}

fn encode_item_path(path: &str) -> String {
    path.split('/')
        .map(encode_component)
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve how to obtain the listing shown at `location`.
pub fn plan_fetch(location: &Address, bookmarks: &BookmarkList) -> Result<FetchPlan, RouteError> {
    let listing = canonical_listing(location);
    let path = listing.path();

    if let Some(rest) = path.strip_prefix(VIEW_PREFIX).filter(|r| r.starts_with('/')) {
        return Ok(FetchPlan::Remote {
            request: FetchRequest::Get {
                url: format!("{DIRECTORY_ENDPOINT}{rest}"),
            },
            link_segments: None,
        });
    }

    if let Some(rest) = path.strip_prefix(BOOKMARK_PREFIX).filter(|r| r.starts_with('/')) {
        let info = parse_bookmark_path(rest);

        let Some(tag_name) = info.tag else {
            let resources = bookmarks
                .tags()
                .into_iter()
                .map(|tag| ResourceEntry {
                    kind: ResourceKind::Directory,
                    name: tag.name,
                    ..Default::default()
                })
                .collect();
            return Ok(FetchPlan::Immediate(Listing { resources }));
        };

        let Some(num) = info.num else {
            let tag = bookmarks
                .find_tag(&tag_name)
                .ok_or_else(|| RouteError::UnknownTag(tag_name.clone()))?;
            let items = bookmarks.items_of(&tag.id);
            return Ok(FetchPlan::Remote {
                request: FetchRequest::Batch {
                    url: BATCH_ENDPOINT.to_string(),
                    body: BatchRequest {
                        targets: items.iter().map(|item| item.path.clone()).collect(),
                    },
                },
                link_segments: Some(items.into_iter().map(|item| item.num).collect()),
            });
        };

        let item = find_item(bookmarks, &tag_name, num)?;
        let sub = info.sub.map(|s| format!("/{s}")).unwrap_or_default();
        return Ok(FetchPlan::Remote {
            request: FetchRequest::Get {
                url: format!("{DIRECTORY_ENDPOINT}{}{sub}", encode_item_path(&item.path)),
            },
            link_segments: None,
        });
    }

    Err(RouteError::UnsupportedAddress(location.to_string()))
}

/// Decoded resource path shown at `location`; also the key used for tagging.
///
/// `None` for listings that are not a single resource (the tag list, a tag).
pub fn resource_title(location: &Address, bookmarks: &BookmarkList) -> Option<String> {
    let listing = canonical_listing(location);
    let path = listing.path();

    if let Some(rest) = path.strip_prefix(VIEW_PREFIX).filter(|r| r.starts_with('/')) {
        return Some(decode_path(rest));
    }

    let rest = path.strip_prefix(BOOKMARK_PREFIX).filter(|r| r.starts_with('/'))?;
    let info = parse_bookmark_path(rest);
    let item = find_item(bookmarks, &info.tag?, info.num?).ok()?;
    let sub = info.sub.map(|s| format!("/{}", decode_path(s))).unwrap_or_default();
    Some(format!("{}{sub}", item.path))
}
