//! Base data shared by every model entity.

use crate::observer::{set_field, ChangeHook};

/// A reference from an element to an external file or URL.
///
/// `path` is stored relative to the project file; `full_path` is an optional
/// absolute fallback for when the relative path does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub path: String,
    pub full_path: Option<String>,
}

impl Link {
    #[must_use]
    pub fn new(path: impl Into<String>, full_path: Option<String>) -> Self {
        Self {
            path: path.into(),
            full_path,
        }
    }
}

/// Title, description, and links, plus the change hook, shared by every
/// entity. Entities embed this and expose it through [`Element`].
#[derive(Debug, Clone, Default)]
pub struct ElementBase {
    title: Option<String>,
    desc: Option<String>,
    links: Vec<Link>,
    hook: ChangeHook,
}

impl ElementBase {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            title: None,
            desc: None,
            links: Vec::new(),
            hook,
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        set_field(&mut self.title, title, &self.hook);
    }

    /// Description as formatted text, paragraphs joined by `\n`.
    #[must_use]
    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    pub fn set_desc(&mut self, desc: Option<String>) {
        set_field(&mut self.desc, desc, &self.hook);
    }

    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Links behave as an ordered mapping keyed by `path`: a repeated path
    /// keeps its first position and takes the last `full_path`.
    pub fn set_links(&mut self, links: Vec<Link>) {
        let mut deduped: Vec<Link> = Vec::with_capacity(links.len());
        for link in links {
            match deduped.iter_mut().find(|known| known.path == link.path) {
                Some(known) => known.full_path = link.full_path,
                None => deduped.push(link),
            }
        }
        set_field(&mut self.links, deduped, &self.hook);
    }

    pub(crate) fn hook(&self) -> &ChangeHook {
        &self.hook
    }
}

/// Accessor surface shared by every model entity.
///
/// Implementors provide the embedded [`ElementBase`]; the common accessors
/// come for free, so codec helpers can work on any entity generically.
pub trait Element {
    fn base(&self) -> &ElementBase;
    fn base_mut(&mut self) -> &mut ElementBase;

    fn title(&self) -> Option<&str> {
        self.base().title()
    }

    fn set_title(&mut self, title: Option<String>) {
        self.base_mut().set_title(title);
    }

    fn desc(&self) -> Option<&str> {
        self.base().desc()
    }

    fn set_desc(&mut self, desc: Option<String>) {
        self.base_mut().set_desc(desc);
    }

    fn links(&self) -> &[Link] {
        self.base().links()
    }

    fn set_links(&mut self, links: Vec<Link>) {
        self.base_mut().set_links(links);
    }
}

/// Entities carrying a free-text notes field.
pub trait Noted: Element {
    fn notes(&self) -> Option<&str>;
    fn set_notes(&mut self, notes: Option<String>);
}

/// Entities carrying a tag list.
pub trait Tagged: Noted {
    fn tags(&self) -> &[String];
    fn set_tags(&mut self, tags: Vec<String>);
}

/// A freestanding project annotation.
#[derive(Debug, Clone, Default)]
pub struct ProjectNote {
    base: ElementBase,
}

impl ProjectNote {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            base: ElementBase::new(hook),
        }
    }
}

impl Element for ProjectNote {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn setting_the_same_title_does_not_notify() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let hook = ChangeHook::new(move || counter.set(counter.get() + 1));

        let mut note = ProjectNote::new(hook);
        note.set_title(Some("Research".to_string()));
        note.set_title(Some("Research".to_string()));
        assert_eq!(count.get(), 1);
        assert_eq!(note.title(), Some("Research"));
    }

    #[test]
    fn links_keep_their_order() {
        let mut note = ProjectNote::new(ChangeHook::none());
        note.set_links(vec![
            Link::new("notes/b.md", None),
            Link::new("notes/a.md", Some("/home/x/notes/a.md".to_string())),
        ]);
        let paths: Vec<&str> = note.links().iter().map(|l| l.path.as_str()).collect();
        assert_eq!(paths, ["notes/b.md", "notes/a.md"]);
    }

    #[test]
    fn a_repeated_link_path_keeps_one_entry() {
        let mut note = ProjectNote::new(ChangeHook::none());
        note.set_links(vec![
            Link::new("notes/a.md", None),
            Link::new("notes/b.md", None),
            Link::new("notes/a.md", Some("/x/notes/a.md".to_string())),
        ]);
        let links = note.links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].path, "notes/a.md");
        assert_eq!(links[0].full_path.as_deref(), Some("/x/notes/a.md"));
        assert_eq!(links[1].path, "notes/b.md");
    }
}
