//! Chapter entity.

use crate::element::{Element, ElementBase, Noted};
use crate::observer::{set_field, ChangeHook};

/// Heading level of a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterLevel {
    /// A part heading grouping the chapters after it.
    Part,
    #[default]
    Regular,
}

/// Whether a chapter belongs to the manuscript.
///
/// Unused chapters are kept in the project but excluded from the primary
/// word count; the marker propagates to the chapter's sections and, from a
/// part, to the chapters under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterType {
    #[default]
    Normal,
    Unused,
}

#[derive(Debug, Clone, Default)]
pub struct Chapter {
    base: ElementBase,
    notes: Option<String>,
    level: ChapterLevel,
    chapter_type: ChapterType,
    no_number: bool,
    is_trash: bool,
}

impl Chapter {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            base: ElementBase::new(hook),
            notes: None,
            level: ChapterLevel::Regular,
            chapter_type: ChapterType::Normal,
            no_number: false,
            is_trash: false,
        }
    }

    #[must_use]
    pub fn level(&self) -> ChapterLevel {
        self.level
    }

    pub fn set_level(&mut self, level: ChapterLevel) {
        set_field(&mut self.level, level, self.base.hook());
    }

    #[must_use]
    pub fn chapter_type(&self) -> ChapterType {
        self.chapter_type
    }

    pub fn set_chapter_type(&mut self, chapter_type: ChapterType) {
        set_field(&mut self.chapter_type, chapter_type, self.base.hook());
    }

    /// Suppress this chapter in auto-numbering.
    #[must_use]
    pub fn no_number(&self) -> bool {
        self.no_number
    }

    pub fn set_no_number(&mut self, no_number: bool) {
        set_field(&mut self.no_number, no_number, self.base.hook());
    }

    /// At most one chapter per project is the trash bin.
    #[must_use]
    pub fn is_trash(&self) -> bool {
        self.is_trash
    }

    pub fn set_is_trash(&mut self, is_trash: bool) {
        set_field(&mut self.is_trash, is_trash, self.base.hook());
    }
}

impl Element for Chapter {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl Noted for Chapter {
    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    fn set_notes(&mut self, notes: Option<String>) {
        set_field(&mut self.notes, notes, self.base.hook());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn chapter_defaults_are_regular_and_normal() {
        let chapter = Chapter::new(ChangeHook::none());
        assert_eq!(chapter.level(), ChapterLevel::Regular);
        assert_eq!(chapter.chapter_type(), ChapterType::Normal);
        assert!(!chapter.is_trash());
        assert!(!chapter.no_number());
    }

    #[test]
    fn type_change_notifies_once() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let mut chapter = Chapter::new(ChangeHook::new(move || counter.set(counter.get() + 1)));

        chapter.set_chapter_type(ChapterType::Unused);
        chapter.set_chapter_type(ChapterType::Unused);
        assert_eq!(count.get(), 1);
    }
}
