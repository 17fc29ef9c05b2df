use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use pkgrepo_package::PackageArchive;

use crate::repo::RepoSummary;

/// Observer of a catalog build.
///
/// Both hooks run synchronously on the thread performing the scan, so they should return
/// quickly.
pub trait ProgressHook: Send + Sync {
    /// Called once for every archive that was read successfully, in scan order, before its
    /// rows are written.
    fn package_processed(&self, package: &PackageArchive);

    /// Called exactly once, after the catalog has been committed.
    fn scan_complete(&self, summary: &RepoSummary);
}

/// Owned form of a hook invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    PackageProcessed(PackageArchive),
    ScanComplete(RepoSummary),
}

/// No-op hook for headless runs.
pub struct NullProgress;

impl ProgressHook for NullProgress {
    fn package_processed(&self, _package: &PackageArchive) {}

    fn scan_complete(&self, _summary: &RepoSummary) {}
}

/// Forwards every invocation through an mpsc channel.
///
/// The receiver can be drained on another thread, e.g. by a progress bar. Events are
/// dropped silently once the receiver is gone.
pub struct ChannelProgress {
    sender: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new() -> (Self, Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl ProgressHook for ChannelProgress {
    fn package_processed(&self, package: &PackageArchive) {
        let _ = self
            .sender
            .send(ProgressEvent::PackageProcessed(package.clone()));
    }

    fn scan_complete(&self, summary: &RepoSummary) {
        let _ = self.sender.send(ProgressEvent::ScanComplete(summary.clone()));
    }
}

/// Records every invocation for later inspection.
#[derive(Default)]
pub struct CollectorProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectorProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ProgressEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressHook for CollectorProgress {
    fn package_processed(&self, package: &PackageArchive) {
        self.lock()
            .push(ProgressEvent::PackageProcessed(package.clone()));
    }

    fn scan_complete(&self, summary: &RepoSummary) {
        self.lock().push(ProgressEvent::ScanComplete(summary.clone()));
    }
}

/// Hook built from two closures. Whatever the closures capture is the caller's context.
pub struct FnProgress<P, C> {
    on_package: P,
    on_complete: C,
}

impl<P, C> FnProgress<P, C>
where
    P: Fn(&PackageArchive) + Send + Sync,
    C: Fn(&RepoSummary) + Send + Sync,
{
    pub fn new(on_package: P, on_complete: C) -> Self {
        Self {
            on_package,
            on_complete,
        }
    }
}

impl<P, C> ProgressHook for FnProgress<P, C>
where
    P: Fn(&PackageArchive) + Send + Sync,
    C: Fn(&RepoSummary) + Send + Sync,
{
    fn package_processed(&self, package: &PackageArchive) {
        (self.on_package)(package)
    }

    fn scan_complete(&self, summary: &RepoSummary) {
        (self.on_complete)(summary)
    }
}
