/// Presentation-owned UI flags the core is allowed to query.
///
/// Replaces a process-wide "a modal is open" global: whoever owns the session owns this.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UiContext {
    modal_open: bool,
}

impl UiContext {
    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
    }
}
