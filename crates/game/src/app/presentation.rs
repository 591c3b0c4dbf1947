use std::io::Write;

use engine::{Location, PresentationHooks, Vec2};
use tracing::warn;

/// Text stand-in for the screen layer: every hook becomes one line of output.
pub(crate) struct ConsolePresentation<W: Write> {
    out: W,
    shown: Option<Location>,
    overlay_visible: bool,
}

impl<W: Write> ConsolePresentation<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            shown: None,
            overlay_visible: false,
        }
    }

    pub(crate) fn shown_region(&self) -> Option<Location> {
        self.shown
    }

    pub(crate) fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        if let Err(error) = writeln!(self.out, "{}", text.as_ref()).and_then(|()| self.out.flush()) {
            warn!(error = %error, "console_write_failed");
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PresentationHooks for ConsolePresentation<W> {
    fn show_region(&mut self, location: Location, entry: Vec2) {
        self.shown = Some(location);
        self.line(format!("[screen] {location} shown, hero at {entry}"));
    }

    fn hide_region(&mut self, location: Location) {
        if self.shown == Some(location) {
            self.shown = None;
        }
        self.line(format!("[screen] {location} hidden"));
    }

    fn prepare_region(&mut self, location: Location, entry: Vec2) {
        self.line(format!("[screen] building {location} (entry {entry})"));
    }

    fn show_loading_overlay(&mut self) {
        self.overlay_visible = true;
        self.line("[overlay] loading...");
    }

    fn hide_loading_overlay(&mut self) {
        self.overlay_visible = false;
        self.line("[overlay] done");
    }

    fn notify_save_deleted(&mut self) {
        self.line("[save] save data deleted");
    }

    fn notify_load_result(&mut self, ok: bool, message: &str) {
        let tag = if ok { "load" } else { "load failed" };
        self.line(format!("[{tag}] {message}"));
    }

    fn notify_save_result(&mut self, ok: bool, message: &str) {
        let tag = if ok { "save" } else { "save failed" };
        self.line(format!("[{tag}] {message}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hooks_render_as_lines_and_track_visibility() {
        let mut presentation = ConsolePresentation::new(Vec::new());
        presentation.show_loading_overlay();
        assert!(presentation.overlay_visible());
        presentation.show_region(Location::Swamp, Vec2::new(96.0, 512.0));
        presentation.hide_loading_overlay();
        assert_eq!(presentation.shown_region(), Some(Location::Swamp));
        presentation.hide_region(Location::Swamp);
        assert_eq!(presentation.shown_region(), None);
        presentation.notify_load_result(false, "No saved game found.");

        let text = String::from_utf8(presentation.into_inner()).expect("utf8");
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "[overlay] loading...",
                "[screen] swamp shown, hero at (96.00, 512.00)",
                "[overlay] done",
                "[screen] swamp hidden",
                "[load failed] No saved game found.",
            ]
        );
    }
}
