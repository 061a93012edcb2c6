use chrono::{DateTime, Utc};

/// Longest title the notes table accepts, counted in characters.
pub const TITLE_MAX_LEN: usize = 255;

pub const TITLE_EMPTY_MESSAGE: &str = "Title cannot be empty.";
pub const TITLE_TOO_LONG_MESSAGE: &str = "Ensure this field has no more than 255 characters.";
pub const NULL_CHARACTER_MESSAGE: &str = "Null characters are not allowed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied to a partial update. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NoteChanges {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Returns the message describing why `title` cannot be stored, if any.
///
/// Whitespace is only trimmed for the emptiness check; the stored value keeps it.
pub fn title_problem(title: &str) -> Option<&'static str> {
    if title.trim().is_empty() {
        Some(TITLE_EMPTY_MESSAGE)
    } else if title.contains('\0') {
        Some(NULL_CHARACTER_MESSAGE)
    } else if title.chars().count() > TITLE_MAX_LEN {
        Some(TITLE_TOO_LONG_MESSAGE)
    } else {
        None
    }
}

/// PostgreSQL text columns cannot hold NUL, so content is refused up front.
pub fn content_problem(content: &str) -> Option<&'static str> {
    content.contains('\0').then_some(NULL_CHARACTER_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_titles_are_rejected() {
        assert_eq!(title_problem(""), Some(TITLE_EMPTY_MESSAGE));
        assert_eq!(title_problem("   \t\n"), Some(TITLE_EMPTY_MESSAGE));
    }

    #[test]
    fn length_is_counted_in_characters() {
        let exact = "é".repeat(TITLE_MAX_LEN);
        assert_eq!(title_problem(&exact), None);

        let over = "a".repeat(TITLE_MAX_LEN + 1);
        assert_eq!(title_problem(&over), Some(TITLE_TOO_LONG_MESSAGE));
    }

    #[test]
    fn null_characters_are_rejected() {
        assert_eq!(title_problem("a\0b"), Some(NULL_CHARACTER_MESSAGE));
        assert_eq!(content_problem("milk\0eggs"), Some(NULL_CHARACTER_MESSAGE));
        assert_eq!(content_problem(""), None);
    }

    #[test]
    fn padded_titles_are_accepted() {
        assert_eq!(title_problem("  Groceries  "), None);
    }
}
