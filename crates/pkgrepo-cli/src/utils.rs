use std::{
    fmt::Display,
    sync::atomic::{AtomicBool, Ordering},
};

use nu_ansi_term::Color;

pub static COLOR: AtomicBool = AtomicBool::new(true);
pub static PROGRESS: AtomicBool = AtomicBool::new(true);

pub fn color_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

pub fn progress_enabled() -> bool {
    PROGRESS.load(Ordering::Relaxed)
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if color_enabled() {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}
