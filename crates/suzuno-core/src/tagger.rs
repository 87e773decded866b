//! Main-tag buttons for the resource currently shown.

use std::rc::Rc;

use log::{debug, warn};

use crate::bookmark::BookmarkList;
use crate::error::StorageError;
use crate::resource::natural_cmp;
use crate::view::{Clock, TagButton, TagView};

pub struct Tagger {
    view: Box<dyn TagView>,
    clock: Rc<dyn Clock>,
    path: Option<String>,
}

impl Tagger {
    pub fn new(view: Box<dyn TagView>, clock: Rc<dyn Clock>) -> Self {
        Self {
            view,
            clock,
            path: None,
        }
    }

    /// Resource path the buttons act on; empty paths are not taggable.
    pub fn set_path(&mut self, path: Option<String>) {
        self.path = path.filter(|p| !p.is_empty());
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Main tags ordered by name, each flagged if it is set on the path.
    pub fn buttons(&self, bookmarks: &BookmarkList) -> Vec<TagButton> {
        let current = self
            .path
            .as_deref()
            .map(|path| bookmarks.tags_of(path))
            .unwrap_or_default();

        let mut tags: Vec<_> = bookmarks.tags().into_iter().filter(|t| t.main).collect();
        tags.sort_by(|a, b| natural_cmp(&a.name, &b.name));

        tags.into_iter()
            .map(|tag| TagButton {
                tagged: current.contains(&tag.id),
                id: tag.id,
                name: tag.name,
            })
            .collect()
    }

    pub fn redraw(&mut self, bookmarks: &BookmarkList) {
        let buttons = self.buttons(bookmarks);
        self.view.update_buttons(self.path.as_deref(), &buttons);
    }

    /// Flip `tag_id` on the current path, stamping new tags with the clock.
    pub fn toggle(&mut self, bookmarks: &mut BookmarkList, tag_id: &str) -> Result<(), StorageError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let tagged = bookmarks.tags_of(&path).iter().any(|t| t == tag_id);
        debug!("tagging {path:?} with {tag_id}: {}", !tagged);

        let result = if tagged {
            bookmarks.unset_tag(&path, tag_id)
        } else {
            let num = (self.clock.now_ms() as u64).to_string();
            bookmarks.set_tag(&path, tag_id, &num)
        };
        if let Err(err) = &result {
            warn!("failed to persist tag {tag_id} on {path:?}: {err}");
        }

        self.redraw(bookmarks);
        result
    }

    pub fn open_dialog(&mut self) {
        if let Some(path) = self.path.as_deref() {
            self.view.open_dialog(path);
        }
    }
}
