//! Pending file-chooser continuation.
//!
//! The rendering surface hands over a single-shot callback each time content
//! opens a file input. If one is ever left unresolved the surface never offers
//! a picker again, so the slot enforces replace-and-resolve: a new request
//! resolves its predecessor with no files before taking its place.
//!
//! # Invariants
//!
//! - At most one request is pending
//! - Every request is resolved exactly once

use tracing::{debug, warn};

/// Host-assigned identifier of a file-chooser callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileRequestId(pub u64);

/// Effects requested by the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChooserAction {
    /// Invoke the callback of `request` with `files` (`None` for no result).
    Resolve {
        /// Request being resolved.
        request: FileRequestId,
        /// Selected file URIs, `None` on cancel or failure.
        files: Option<Vec<String>>,
    },
    /// Launch the system picker for `request`.
    Launch {
        /// Request the picker result belongs to.
        request: FileRequestId,
    },
}

/// Single-slot file-chooser state.
#[derive(Debug, Clone, Default)]
pub struct FileChooser {
    pending: Option<FileRequestId>,
    resolved: u64,
}

impl FileChooser {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending request, if any.
    #[must_use]
    pub fn pending(&self) -> Option<FileRequestId> {
        self.pending
    }

    /// Number of pending requests (0 or 1).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    /// Number of requests resolved so far.
    #[must_use]
    pub fn resolved_count(&self) -> u64 {
        self.resolved
    }

    /// Content opened a file input.
    ///
    /// Resolves any previous request with no files, then launches the picker
    /// for the new one.
    pub fn open(&mut self, request: FileRequestId) -> Vec<FileChooserAction> {
        let mut actions = Vec::with_capacity(2);
        if let Some(previous) = self.pending.take() {
            debug!(?previous, ?request, "replacing pending file request");
            actions.push(self.resolve(previous, None));
        }
        self.pending = Some(request);
        actions.push(FileChooserAction::Launch { request });
        actions
    }

    /// The picker returned. `None` or an empty list means cancelled.
    ///
    /// Results for a request that is no longer pending are dropped.
    pub fn complete(
        &mut self,
        request: FileRequestId,
        files: Option<Vec<String>>,
    ) -> Option<FileChooserAction> {
        if self.pending != Some(request) {
            warn!(?request, pending = ?self.pending, "dropping stale file picker result");
            return None;
        }
        self.pending = None;
        let files = files.filter(|f| !f.is_empty());
        Some(self.resolve(request, files))
    }

    /// The picker could not be launched.
    pub fn launch_failed(&mut self, request: FileRequestId) -> Option<FileChooserAction> {
        warn!(?request, "file picker failed to launch");
        self.complete(request, None)
    }

    /// Teardown: resolve whatever is pending with no files.
    pub fn cancel(&mut self) -> Option<FileChooserAction> {
        let request = self.pending.take()?;
        Some(self.resolve(request, None))
    }

    fn resolve(&mut self, request: FileRequestId, files: Option<Vec<String>>) -> FileChooserAction {
        self.resolved += 1;
        FileChooserAction::Resolve { request, files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: FileRequestId = FileRequestId(1);
    const B: FileRequestId = FileRequestId(2);

    #[test]
    fn open_launches_picker() {
        let mut slot = FileChooser::new();
        assert_eq!(slot.open(A), vec![FileChooserAction::Launch { request: A }]);
        assert_eq!(slot.pending(), Some(A));
    }

    #[test]
    fn second_open_resolves_first() {
        let mut slot = FileChooser::new();
        slot.open(A);
        assert_eq!(slot.open(B), vec![
            FileChooserAction::Resolve { request: A, files: None },
            FileChooserAction::Launch { request: B },
        ]);
        assert_eq!(slot.pending_count(), 1);
    }

    #[test]
    fn cancel_path_resolves() {
        let mut slot = FileChooser::new();
        slot.open(A);
        assert_eq!(slot.complete(A, None), Some(FileChooserAction::Resolve { request: A, files: None }));
        assert_eq!(slot.pending(), None);
    }

    #[test]
    fn empty_selection_is_cancel() {
        let mut slot = FileChooser::new();
        slot.open(A);
        assert_eq!(
            slot.complete(A, Some(Vec::new())),
            Some(FileChooserAction::Resolve { request: A, files: None })
        );
    }

    #[test]
    fn stale_result_dropped() {
        let mut slot = FileChooser::new();
        slot.open(A);
        slot.open(B);
        assert_eq!(slot.complete(A, Some(vec!["content://x".into()])), None);
        assert_eq!(slot.pending(), Some(B));
        assert_eq!(slot.resolved_count(), 1);
    }

    #[test]
    fn launch_failure_resolves() {
        let mut slot = FileChooser::new();
        slot.open(A);
        assert!(matches!(slot.launch_failed(A), Some(FileChooserAction::Resolve { files: None, .. })));
        assert_eq!(slot.pending_count(), 0);
    }

    #[test]
    fn teardown_resolves_pending() {
        let mut slot = FileChooser::new();
        assert_eq!(slot.cancel(), None);
        slot.open(A);
        assert_eq!(slot.cancel(), Some(FileChooserAction::Resolve { request: A, files: None }));
        assert_eq!(slot.cancel(), None);
    }
}
