//! Presentation-order index for a project.
//!
//! The entity maps are unordered; this tree is the sole source of display
//! and serialization order. Six root buckets hold top-level entity ids, and
//! two parent kinds (chapter, plot line) additionally hold an ordered
//! grandchild list (sections, plot points). The tree knows nothing about
//! entity content and must be kept in lockstep with the maps by every
//! mutating caller.

use std::collections::HashMap;

/// The fixed root buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootBucket {
    Chapters,
    Characters,
    Locations,
    Items,
    PlotLines,
    ProjectNotes,
}

impl RootBucket {
    pub const ALL: [RootBucket; 6] = [
        RootBucket::Chapters,
        RootBucket::Characters,
        RootBucket::Locations,
        RootBucket::Items,
        RootBucket::PlotLines,
        RootBucket::ProjectNotes,
    ];
}

/// A parent position in the tree, decided by the caller rather than sniffed
/// from identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent<'a> {
    Root(RootBucket),
    /// A chapter holding sections.
    Chapter(&'a str),
    /// A plot line holding plot points.
    PlotLine(&'a str),
}

/// Ordered child-id lists for the whole project.
#[derive(Debug, Clone, Default)]
pub struct ProjectTree {
    chapters: Vec<String>,
    characters: Vec<String>,
    locations: Vec<String>,
    items: Vec<String>,
    plot_lines: Vec<String>,
    project_notes: Vec<String>,
    chapter_sections: HashMap<String, Vec<String>>,
    plot_line_points: HashMap<String, Vec<String>>,
}

impl ProjectTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn root(&self, bucket: RootBucket) -> &Vec<String> {
        match bucket {
            RootBucket::Chapters => &self.chapters,
            RootBucket::Characters => &self.characters,
            RootBucket::Locations => &self.locations,
            RootBucket::Items => &self.items,
            RootBucket::PlotLines => &self.plot_lines,
            RootBucket::ProjectNotes => &self.project_notes,
        }
    }

    fn root_mut(&mut self, bucket: RootBucket) -> &mut Vec<String> {
        match bucket {
            RootBucket::Chapters => &mut self.chapters,
            RootBucket::Characters => &mut self.characters,
            RootBucket::Locations => &mut self.locations,
            RootBucket::Items => &mut self.items,
            RootBucket::PlotLines => &mut self.plot_lines,
            RootBucket::ProjectNotes => &mut self.project_notes,
        }
    }

    /// Appends `id` to the end of the parent's child list.
    ///
    /// Appending a chapter or plot line to its root bucket starts a fresh,
    /// empty grandchild list for it. Appending under a chapter or plot line
    /// that has no list yet creates one.
    pub fn append(&mut self, parent: Parent<'_>, id: impl Into<String>) {
        let id = id.into();
        match parent {
            Parent::Root(bucket) => {
                match bucket {
                    RootBucket::Chapters => {
                        self.chapter_sections.insert(id.clone(), Vec::new());
                    }
                    RootBucket::PlotLines => {
                        self.plot_line_points.insert(id.clone(), Vec::new());
                    }
                    _ => {}
                }
                self.root_mut(bucket).push(id);
            }
            Parent::Chapter(chapter_id) => {
                self.chapter_sections
                    .entry(chapter_id.to_string())
                    .or_default()
                    .push(id);
            }
            Parent::PlotLine(plot_line_id) => {
                self.plot_line_points
                    .entry(plot_line_id.to_string())
                    .or_default()
                    .push(id);
            }
        }
    }

    /// Ordered children of `parent`; empty for unknown or childless parents.
    #[must_use]
    pub fn get_children(&self, parent: Parent<'_>) -> &[String] {
        match parent {
            Parent::Root(bucket) => self.root(bucket),
            Parent::Chapter(chapter_id) => self
                .chapter_sections
                .get(chapter_id)
                .map_or(&[][..], Vec::as_slice),
            Parent::PlotLine(plot_line_id) => self
                .plot_line_points
                .get(plot_line_id)
                .map_or(&[][..], Vec::as_slice),
        }
    }

    /// Truncates the parent's child list.
    ///
    /// On the chapter or plot-line root bucket this also drops every
    /// grandchild list of that kind.
    pub fn delete_children(&mut self, parent: Parent<'_>) {
        match parent {
            Parent::Root(bucket) => {
                self.root_mut(bucket).clear();
                match bucket {
                    RootBucket::Chapters => self.chapter_sections.clear(),
                    RootBucket::PlotLines => self.plot_line_points.clear(),
                    _ => {}
                }
            }
            Parent::Chapter(chapter_id) => {
                if let Some(sections) = self.chapter_sections.get_mut(chapter_id) {
                    sections.clear();
                }
            }
            Parent::PlotLine(plot_line_id) => {
                if let Some(points) = self.plot_line_points.get_mut(plot_line_id) {
                    points.clear();
                }
            }
        }
    }

    /// Replaces the parent's child list wholesale.
    ///
    /// Same grandchild rule as [`ProjectTree::delete_children`]: replacing a
    /// root bucket's chapters or plot lines invalidates all grandchild lists
    /// of that kind.
    pub fn set_children(&mut self, parent: Parent<'_>, children: Vec<String>) {
        match parent {
            Parent::Root(bucket) => {
                *self.root_mut(bucket) = children;
                match bucket {
                    RootBucket::Chapters => self.chapter_sections.clear(),
                    RootBucket::PlotLines => self.plot_line_points.clear(),
                    _ => {}
                }
            }
            Parent::Chapter(chapter_id) => {
                self.chapter_sections
                    .insert(chapter_id.to_string(), children);
            }
            Parent::PlotLine(plot_line_id) => {
                self.plot_line_points
                    .insert(plot_line_id.to_string(), children);
            }
        }
    }

    /// Clears every bucket and grandchild list.
    pub fn reset(&mut self) {
        for bucket in RootBucket::ALL {
            self.root_mut(bucket).clear();
        }
        self.chapter_sections.clear();
        self.plot_line_points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appending_a_chapter_starts_an_empty_section_list() {
        let mut tree = ProjectTree::new();
        tree.append(Parent::Root(RootBucket::Chapters), "ch1");
        assert_eq!(tree.get_children(Parent::Root(RootBucket::Chapters)), ["ch1"]);
        assert!(tree.get_children(Parent::Chapter("ch1")).is_empty());

        tree.append(Parent::Chapter("ch1"), "sc1");
        tree.append(Parent::Chapter("ch1"), "sc2");
        assert_eq!(tree.get_children(Parent::Chapter("ch1")), ["sc1", "sc2"]);
    }

    #[test]
    fn re_appending_a_chapter_resets_its_sections() {
        let mut tree = ProjectTree::new();
        tree.append(Parent::Root(RootBucket::Chapters), "ch1");
        tree.append(Parent::Chapter("ch1"), "sc1");
        tree.append(Parent::Root(RootBucket::Chapters), "ch1");
        assert!(tree.get_children(Parent::Chapter("ch1")).is_empty());
    }

    #[test]
    fn unknown_parents_have_no_children() {
        let tree = ProjectTree::new();
        assert!(tree.get_children(Parent::Chapter("ch99")).is_empty());
        assert!(tree.get_children(Parent::PlotLine("ac99")).is_empty());
        assert!(tree.get_children(Parent::Root(RootBucket::Items)).is_empty());
    }

    #[test]
    fn appending_under_an_unregistered_parent_creates_the_list() {
        let mut tree = ProjectTree::new();
        tree.append(Parent::PlotLine("ac1"), "ap1");
        assert_eq!(tree.get_children(Parent::PlotLine("ac1")), ["ap1"]);
    }

    #[test]
    fn deleting_root_children_drops_all_grandchild_lists() {
        let mut tree = ProjectTree::new();
        tree.append(Parent::Root(RootBucket::Chapters), "ch1");
        tree.append(Parent::Chapter("ch1"), "sc1");
        tree.append(Parent::Root(RootBucket::PlotLines), "ac1");
        tree.append(Parent::PlotLine("ac1"), "ap1");

        tree.delete_children(Parent::Root(RootBucket::Chapters));
        assert!(tree.get_children(Parent::Root(RootBucket::Chapters)).is_empty());
        assert!(tree.get_children(Parent::Chapter("ch1")).is_empty());
        // plot lines untouched
        assert_eq!(tree.get_children(Parent::PlotLine("ac1")), ["ap1"]);
    }

    #[test]
    fn set_children_replaces_wholesale() {
        let mut tree = ProjectTree::new();
        tree.append(Parent::Root(RootBucket::Characters), "cr1");
        tree.set_children(
            Parent::Root(RootBucket::Characters),
            vec!["cr2".to_string(), "cr1".to_string()],
        );
        assert_eq!(
            tree.get_children(Parent::Root(RootBucket::Characters)),
            ["cr2", "cr1"]
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut tree = ProjectTree::new();
        tree.append(Parent::Root(RootBucket::Chapters), "ch1");
        tree.append(Parent::Chapter("ch1"), "sc1");
        tree.append(Parent::Root(RootBucket::Locations), "lc1");
        tree.reset();
        for bucket in RootBucket::ALL {
            assert!(tree.get_children(Parent::Root(bucket)).is_empty());
        }
        assert!(tree.get_children(Parent::Chapter("ch1")).is_empty());
    }
}
