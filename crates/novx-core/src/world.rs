//! Story-world element, the shape shared by locations and items.

use crate::element::{Element, ElementBase, Noted, Tagged};
use crate::observer::{set_field, ChangeHook};

/// A location or item: a tagged, noted element with an alias.
#[derive(Debug, Clone, Default)]
pub struct WorldElement {
    base: ElementBase,
    notes: Option<String>,
    tags: Vec<String>,
    aka: Option<String>,
}

impl WorldElement {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            base: ElementBase::new(hook),
            ..Self::default()
        }
    }

    /// Alternative name, shown alongside the title.
    #[must_use]
    pub fn aka(&self) -> Option<&str> {
        self.aka.as_deref()
    }

    pub fn set_aka(&mut self, aka: Option<String>) {
        set_field(&mut self.aka, aka, self.base.hook());
    }
}

impl Element for WorldElement {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl Noted for WorldElement {
    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    fn set_notes(&mut self, notes: Option<String>) {
        set_field(&mut self.notes, notes, self.base.hook());
    }
}

impl Tagged for WorldElement {
    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn set_tags(&mut self, tags: Vec<String>) {
        set_field(&mut self.tags, tags, self.base.hook());
    }
}
