//! Pages and their mount points.
//!
//! A [`Page`] stands in for the surrounding document: it holds uniquely
//! identified [`MountPoint`]s that previews are written into. A mount point's
//! content is swapped in one step, so readers never see partial output.

use crate::markup::Preview;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Content currently held by a mount point.
#[derive(Debug, Clone, PartialEq)]
pub enum MountContent {
    /// Markup supplied by the page author (placeholder text, or nothing)
    Markup(String),
    /// A generated document preview
    Preview(Preview),
}

impl MountContent {
    pub fn to_html(&self) -> String {
        match self {
            MountContent::Markup(html) => html.clone(),
            MountContent::Preview(preview) => preview.to_html(),
        }
    }
}

/// A designated region of a page that receives preview content.
#[derive(Debug)]
pub struct MountPoint {
    id: String,
    content: Mutex<MountContent>,
    /// Held for the duration of a render so calls on one mount point run in order
    render_lock: tokio::sync::Mutex<()>,
}

impl MountPoint {
    fn new(id: String, initial_html: String) -> Self {
        Self {
            id,
            content: Mutex::new(MountContent::Markup(initial_html)),
            render_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the current content.
    pub fn content(&self) -> MountContent {
        self.content.lock().clone()
    }

    /// The current preview, if one has been mounted.
    pub fn preview(&self) -> Option<Preview> {
        match &*self.content.lock() {
            MountContent::Preview(preview) => Some(preview.clone()),
            MountContent::Markup(_) => None,
        }
    }

    pub fn inner_html(&self) -> String {
        self.content.lock().to_html()
    }

    pub fn is_empty(&self) -> bool {
        match &*self.content.lock() {
            MountContent::Markup(html) => html.trim().is_empty(),
            MountContent::Preview(_) => false,
        }
    }

    /// Replace everything in the mount point with `preview`.
    pub(crate) fn replace(&self, preview: Preview) {
        *self.content.lock() = MountContent::Preview(preview);
    }

    pub(crate) async fn serialize_renders(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.render_lock.lock().await
    }
}

/// A page holding uniquely identified mount points.
#[derive(Debug, Default)]
pub struct Page {
    mounts: Mutex<HashMap<String, Arc<MountPoint>>>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mount point with some initial markup.
    ///
    /// Ids are unique: registering an id that already exists returns the
    /// existing mount point untouched.
    pub fn add_mount_point(
        &self,
        id: impl Into<String>,
        initial_html: impl Into<String>,
    ) -> Arc<MountPoint> {
        let id = id.into();
        let mut mounts = self.mounts.lock();
        Arc::clone(
            mounts
                .entry(id.clone())
                .or_insert_with(|| Arc::new(MountPoint::new(id, initial_html.into()))),
        )
    }

    pub fn mount_point(&self, id: &str) -> Option<Arc<MountPoint>> {
        self.mounts.lock().get(id).cloned()
    }

    pub fn remove_mount_point(&self, id: &str) -> Option<Arc<MountPoint>> {
        self.mounts.lock().remove(id)
    }

    pub fn mount_point_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.mounts.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}
