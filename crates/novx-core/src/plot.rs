//! Plot lines and plot points.
//!
//! A plot line is a narrative thread running through sections; a plot point
//! is one beat of it, optionally pinned to a section. The lists held here
//! are the authoritative forward references; the matching back-references on
//! [`crate::Section`] are derived from them on every load.

use crate::element::{Element, ElementBase, Noted};
use crate::observer::{set_field, ChangeHook};

#[derive(Debug, Clone, Default)]
pub struct PlotLine {
    base: ElementBase,
    short_name: Option<String>,
    sections: Vec<String>,
}

impl PlotLine {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            base: ElementBase::new(hook),
            short_name: None,
            sections: Vec::new(),
        }
    }

    /// Compact display name, shown where the full title is too long.
    #[must_use]
    pub fn short_name(&self) -> Option<&str> {
        self.short_name.as_deref()
    }

    pub fn set_short_name(&mut self, short_name: Option<String>) {
        set_field(&mut self.short_name, short_name, self.base.hook());
    }

    /// Ordered ids of the sections on this plot line.
    #[must_use]
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn set_sections(&mut self, sections: Vec<String>) {
        set_field(&mut self.sections, sections, self.base.hook());
    }
}

impl Element for PlotLine {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlotPoint {
    base: ElementBase,
    notes: Option<String>,
    section: Option<String>,
}

impl PlotPoint {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            base: ElementBase::new(hook),
            notes: None,
            section: None,
        }
    }

    /// Id of the section this point is pinned to, if any.
    #[must_use]
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn set_section(&mut self, section: Option<String>) {
        set_field(&mut self.section, section, self.base.hook());
    }
}

impl Element for PlotPoint {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl Noted for PlotPoint {
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

    #[test]
    fn plot_line_sections_keep_their_order() {
        let mut plot_line = PlotLine::new(ChangeHook::none());
        plot_line.set_sections(vec!["sc3".to_string(), "sc1".to_string()]);
        assert_eq!(plot_line.sections(), ["sc3", "sc1"]);
    }

    #[test]
    fn plot_point_section_can_be_cleared() {
        let mut point = PlotPoint::new(ChangeHook::none());
        point.set_section(Some("sc1".to_string()));
        point.set_section(None);
        assert_eq!(point.section(), None);
    }
}
