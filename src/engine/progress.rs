//! Stage progress bars fed from the notify hook (CLI only).

use kdam::{Animation, Bar, BarExt};

/// One counter bar per pipeline stage; a label change closes the previous bar.
pub struct StageBars {
    enabled: bool,
    label: Option<&'static str>,
    bar: Option<Bar>,
}

impl StageBars {
    pub fn new(enabled: bool) -> Self {
        StageBars {
            enabled,
            label: None,
            bar: None,
        }
    }

    /// Feed one notify observation: stage label and entries processed so far.
    pub fn observe(&mut self, label: &'static str, count: usize) {
        if !self.enabled {
            return;
        }
        if self.label != Some(label) {
            self.finish();
            self.label = Some(label);
            self.bar = Some(kdam::tqdm!(
                total = 0,
                desc = label,
                animation = Animation::Classic,
                position = 0,
                unit = " files"
            ));
        }
        if let Some(bar) = self.bar.as_mut() {
            let _ = bar.update_to(count);
        }
    }

    /// Close the current bar and drop to a fresh line.
    pub fn finish(&mut self) {
        if let Some(mut bar) = self.bar.take() {
            let _ = bar.refresh();
            eprintln!();
        }
        self.label = None;
    }
}
