use crate::domain::email::{ComposeDraft, EmailId, Mailbox};

/// Which view the controller is in. The visible panel follows from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    MailboxList(Mailbox),
    Compose,
    EmailDetail(EmailId),
}

impl ViewState {
    pub fn panel(self) -> Panel {
        match self {
            ViewState::MailboxList(_) => Panel::List,
            ViewState::Compose => Panel::Compose,
            ViewState::EmailDetail(_) => Panel::Detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    List,
    Compose,
    Detail,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::List, Panel::Compose, Panel::Detail];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeField {
    #[default]
    Recipients,
    Subject,
    Body,
}

impl ComposeField {
    pub fn next(self) -> Self {
        match self {
            ComposeField::Recipients => ComposeField::Subject,
            ComposeField::Subject => ComposeField::Body,
            ComposeField::Body => ComposeField::Recipients,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ComposeField::Recipients => ComposeField::Body,
            ComposeField::Subject => ComposeField::Recipients,
            ComposeField::Body => ComposeField::Subject,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ComposeField::Recipients => "To",
            ComposeField::Subject => "Subject",
            ComposeField::Body => "Body",
        }
    }
}

/// Draft plus the editing cursor. `cursor` counts chars, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeForm {
    pub draft: ComposeDraft,
    pub focus: ComposeField,
    pub cursor: usize,
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl ComposeForm {
    pub fn field(&self, field: ComposeField) -> &str {
        match field {
            ComposeField::Recipients => &self.draft.recipients,
            ComposeField::Subject => &self.draft.subject,
            ComposeField::Body => &self.draft.body,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            ComposeField::Recipients => &mut self.draft.recipients,
            ComposeField::Subject => &mut self.draft.subject,
            ComposeField::Body => &mut self.draft.body,
        }
    }

    fn focused_len(&self) -> usize {
        self.field(self.focus).chars().count()
    }

    /// Focus `field` with the cursor at its start.
    pub fn focus_start(&mut self, field: ComposeField) {
        self.focus = field;
        self.cursor = 0;
    }

    /// Focus `field` with the cursor after its last char.
    pub fn focus_end(&mut self, field: ComposeField) {
        self.focus = field;
        self.cursor = self.focused_len();
    }

    pub fn next_field(&mut self) {
        self.focus_end(self.focus.next());
    }

    pub fn prev_field(&mut self) {
        self.focus_end(self.focus.prev());
    }

    pub fn insert(&mut self, c: char) {
        let cursor = self.cursor;
        let field = self.focused_mut();
        let at = byte_index(field, cursor);
        field.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor;
        let field = self.focused_mut();
        let at = byte_index(field, cursor - 1);
        field.remove(at);
        self.cursor -= 1;
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.focused_len());
    }
}

/// Clamped row selection for the mailbox list.
pub fn step_selection(current: Option<usize>, len: usize, delta: i32) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let cur = current.unwrap_or(0) as i32;
    let next = (cur + delta).clamp(0, len as i32 - 1) as usize;
    Some(next)
}
