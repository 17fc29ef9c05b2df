use std::{
    sync::{mpsc::Receiver, LazyLock},
    thread::JoinHandle,
    time::Duration,
};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nu_ansi_term::Color::Cyan;
use pkgrepo_core::ProgressEvent;

use crate::utils::Colored;

static MULTI: LazyLock<MultiProgress> = LazyLock::new(MultiProgress::new);

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    MULTI.clear().ok();
}

/// Owns the background thread started by [`spawn_progress_handler`].
pub struct ProgressGuard {
    handle: Option<JoinHandle<()>>,
}

impl ProgressGuard {
    /// Waits for the handler thread to drain the remaining events.
    ///
    /// The `ChannelProgress` feeding the thread must be dropped first, otherwise this blocks
    /// forever.
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} [{pos}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Renders a spinner with a running package count from progress events.
pub fn spawn_progress_handler(receiver: Receiver<ProgressEvent>) -> ProgressGuard {
    let handle = std::thread::spawn(move || {
        let spinner = MULTI.add(ProgressBar::new_spinner());
        spinner.set_style(spinner_style());
        spinner.set_message("scanning");
        spinner.enable_steady_tick(Duration::from_millis(100));

        for event in receiver {
            match event {
                ProgressEvent::PackageProcessed(package) => {
                    spinner.inc(1);
                    spinner.set_message(Colored(Cyan, package.display_name()).to_string());
                }
                ProgressEvent::ScanComplete(_) => break,
            }
        }
        spinner.finish_and_clear();
    });

    ProgressGuard {
        handle: Some(handle),
    }
}
