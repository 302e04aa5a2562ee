//! Session state and its transitions.
//!
//! A [`SessionState`] is a value: every [`Action`] produces a new revision and leaves the
//! previous one untouched, so an export can keep working on the revision it started with.

use std::sync::Arc;

use crate::color::Color;
use crate::data_url::DataUrl;

/// Everything the user has entered so far.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub text: String,
    pub foreground: Color,
    pub background: Color,
    pub logo: Option<Arc<DataUrl>>,
    /// Incremented by every applied action.
    pub revision: u64,
}

/// A discrete, named change to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetText(String),
    SetForeground(Color),
    SetBackground(Color),
    /// Replaces the logo wholesale. `None` removes it.
    SetLogo(Option<DataUrl>),
}

impl Action {
    /// Whether applying this action changes what the QR drawing looks like.
    ///
    /// The logo is an overlay and never alters the drawing itself.
    pub fn affects_drawing(&self) -> bool {
        !matches!(self, Action::SetLogo(_))
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            text: String::new(),
            foreground: Color::BLACK,
            background: Color::WHITE,
            logo: None,
            revision: 0,
        }
    }
}

impl SessionState {
    /// Applies `action`, returning the next revision.
    pub fn apply(self, action: Action) -> Self {
        let revision = self.revision + 1;
        match action {
            Action::SetText(text) => Self {
                text,
                revision,
                ..self
            },
            Action::SetForeground(foreground) => Self {
                foreground,
                revision,
                ..self
            },
            Action::SetBackground(background) => Self {
                background,
                revision,
                ..self
            },
            Action::SetLogo(logo) => Self {
                logo: logo.map(Arc::new),
                revision,
                ..self
            },
        }
    }

    /// The code is drawn only when there is text to encode.
    pub fn has_code(&self) -> bool {
        !self.text.is_empty()
    }
}
