//! Page Flow Manager.
//!
//! A vertical cursor threaded through every drawing step. Before a
//! row is drawn, [`PageFlow::ensure_space`] is called with the row's
//! actual required height — for wrapped text that height comes from
//! the wrapped line count, never from the raw string length. When the
//! remaining space above the footer band is insufficient, the flow
//! turns the page and reports it so the caller can redraw the
//! repeating chrome.

use tracing::debug;

use crate::canvas::Canvas;
use crate::template::DocTemplate;

pub struct PageFlow<'a, C: Canvas> {
    canvas: &'a mut C,
    tpl: &'a DocTemplate,
    page: usize,
    y: f64,
}

impl<'a, C: Canvas> PageFlow<'a, C> {
    /// Open the first page and position the cursor at its body top.
    pub fn new(canvas: &'a mut C, tpl: &'a DocTemplate) -> Self {
        let page = canvas.add_page(tpl.page_width, tpl.page_height);
        let y = tpl.first_top();
        PageFlow { canvas, tpl, page, y }
    }

    pub fn canvas(&mut self) -> &mut C {
        self.canvas
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn template(&self) -> &'a DocTemplate {
        self.tpl
    }

    /// Move the cursor down.
    pub fn advance(&mut self, dy: f64) {
        self.y -= dy;
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Guarantee `required` points of vertical space above the footer
    /// band. Turns the page when there is not enough, resetting the
    /// cursor to the continuation body top.
    ///
    /// Returns `true` when a new page was started — the caller must
    /// then redraw the repeating chrome before drawing its row.
    pub fn ensure_space(&mut self, required: f64) -> bool {
        let floor = self.tpl.footer_band + self.tpl.min_spacing;
        if self.y - required >= floor {
            return false;
        }
        self.page = self.canvas.add_page(self.tpl.page_width, self.tpl.page_height);
        self.y = self.tpl.continuation_body_top();
        debug!(page = self.page, required, "page break");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;

    fn template() -> DocTemplate {
        DocTemplate::default()
    }

    #[test]
    fn starts_on_first_page_at_body_top() {
        let tpl = template();
        let mut canvas = RecordingCanvas::new();
        let flow = PageFlow::new(&mut canvas, &tpl);
        assert_eq!(flow.page(), 0);
        assert_eq!(flow.y(), 720.0);
        assert_eq!(canvas.page_count(), 1);
    }

    #[test]
    fn small_rows_do_not_break() {
        let tpl = template();
        let mut canvas = RecordingCanvas::new();
        let mut flow = PageFlow::new(&mut canvas, &tpl);
        assert!(!flow.ensure_space(20.0));
        flow.advance(20.0);
        assert_eq!(flow.page(), 0);
    }

    #[test]
    fn breaks_when_footer_band_would_be_hit() {
        let tpl = template();
        let mut canvas = RecordingCanvas::new();
        let mut flow = PageFlow::new(&mut canvas, &tpl);
        // Walk the cursor down close to the footer band.
        flow.set_y(tpl.footer_band + tpl.min_spacing + 15.0);
        assert!(!flow.ensure_space(15.0));
        assert!(flow.ensure_space(16.0));
        assert_eq!(flow.page(), 1);
        assert_eq!(flow.y(), tpl.continuation_body_top());
    }

    #[test]
    fn required_height_drives_the_decision() {
        // The same cursor position breaks for a 3-line row but not for
        // a 1-line row: sizing must come from wrapped line counts.
        let tpl = template();
        let line = 12.0;
        let mut canvas = RecordingCanvas::new();
        let mut flow = PageFlow::new(&mut canvas, &tpl);
        flow.set_y(tpl.footer_band + tpl.min_spacing + 2.0 * line);
        assert!(!flow.ensure_space(line));
        assert!(flow.ensure_space(3.0 * line));
    }

    #[test]
    fn keeps_allocating_pages_without_limit() {
        let tpl = template();
        let mut canvas = RecordingCanvas::new();
        let mut flow = PageFlow::new(&mut canvas, &tpl);
        for _ in 0..200 {
            if !flow.ensure_space(40.0) {
                flow.advance(40.0);
            }
        }
        assert!(canvas.page_count() > 10);
    }
}
