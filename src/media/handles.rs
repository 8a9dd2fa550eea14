//! Source handles - the per-clip resource a renderer opens media through.
//!
//! A `SourceHandle` is not `Clone`: the timeline owns it while
//! the clip lives and moves it back into the allocator on removal, so a
//! handle can be released once and only once.

use log::{trace, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use super::MediaFile;

#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SourceHandle(String);

impl SourceHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and reclaims source handles.
pub trait HandleAllocator: Send {
    fn allocate(&mut self, file: &MediaFile) -> SourceHandle;
    fn release(&mut self, handle: SourceHandle);
}

/// Default allocator: `media://<uuid>` URLs tracked in a live set.
#[derive(Debug, Default)]
pub struct UrlAllocator {
    live: HashSet<String>,
}

impl UrlAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles allocated and not yet released
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.contains(url)
    }
}

impl HandleAllocator for UrlAllocator {
    fn allocate(&mut self, file: &MediaFile) -> SourceHandle {
        let url = format!("media://{}", Uuid::new_v4());
        trace!("Allocated {} for {}", url, file.name);
        self.live.insert(url.clone());
        SourceHandle(url)
    }

    fn release(&mut self, handle: SourceHandle) {
        if self.live.remove(&handle.0) {
            trace!("Released {}", handle);
        } else {
            warn!("Release of unknown handle {}", handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_release() {
        let mut alloc = UrlAllocator::new();
        let file = MediaFile::new("a.mp4", "a.mp4");
        let h1 = alloc.allocate(&file);
        let h2 = alloc.allocate(&file);
        assert_ne!(h1, h2);
        assert!(h1.as_str().starts_with("media://"));
        assert_eq!(alloc.live_count(), 2);

        let url = h1.as_str().to_string();
        alloc.release(h1);
        assert!(!alloc.is_live(&url));
        assert_eq!(alloc.live_count(), 1);
        alloc.release(h2);
        assert_eq!(alloc.live_count(), 0);
    }

    #[test]
    fn test_foreign_handle_ignored() {
        let mut alloc = UrlAllocator::new();
        alloc.release(SourceHandle::new("media://not-ours"));
        assert_eq!(alloc.live_count(), 0);
    }
}
