//! The project root: settings, entity maps, and the derived-state passes
//! that keep them consistent.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::chapter::{Chapter, ChapterLevel, ChapterType};
use crate::character::Character;
use crate::element::{Element, ElementBase, ProjectNote};
use crate::observer::{set_field, ChangeHook};
use crate::plot::{PlotLine, PlotPoint};
use crate::section::{Section, SectionType, Status};
use crate::tree::{Parent, ProjectTree, RootBucket};
use crate::world::WorldElement;

/// Locale fallback for projects without a plausible language setting.
pub const NO_LANGUAGE: &str = "zxx";
pub const NO_COUNTRY: &str = "none";

static LANGUAGE_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<span xml:lang="(.*?)">"#).expect("valid language span regex"));

/// A long-form writing project.
///
/// The maps are unordered storage; presentation and serialization order come
/// from [`Project::tree`] alone. Every contained entity shares the change
/// hook the project was built with.
#[derive(Debug, Clone, Default)]
pub struct Project {
    base: ElementBase,
    hook: ChangeHook,
    author: Option<String>,
    language_code: Option<String>,
    country_code: Option<String>,
    word_target: Option<i64>,
    word_count_start: Option<i64>,
    renumber_chapters: bool,
    renumber_parts: bool,
    renumber_within_parts: bool,
    roman_chapter_numbers: bool,
    roman_part_numbers: bool,
    save_word_count: bool,
    work_phase: Option<Status>,
    chapter_heading_prefix: Option<String>,
    chapter_heading_suffix: Option<String>,
    part_heading_prefix: Option<String>,
    part_heading_suffix: Option<String>,
    custom_goal: Option<String>,
    custom_conflict: Option<String>,
    custom_outcome: Option<String>,
    custom_chr_bio: Option<String>,
    custom_chr_goals: Option<String>,
    reference_date: Option<NaiveDate>,

    pub chapters: HashMap<String, Chapter>,
    pub sections: HashMap<String, Section>,
    pub characters: HashMap<String, Character>,
    pub locations: HashMap<String, WorldElement>,
    pub items: HashMap<String, WorldElement>,
    pub plot_lines: HashMap<String, PlotLine>,
    pub plot_points: HashMap<String, PlotPoint>,
    pub project_notes: HashMap<String, ProjectNote>,
    pub tree: ProjectTree,

    /// Language codes found in section content, refreshed by
    /// [`Project::update_languages`]. Derived state, not hooked.
    pub languages: Vec<String>,
}

impl Project {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            base: ElementBase::new(hook.clone()),
            hook,
            ..Self::default()
        }
    }

    /// The hook shared with every entity of this project; clone it into
    /// entities created outside the codec.
    #[must_use]
    pub fn hook(&self) -> ChangeHook {
        self.hook.clone()
    }

    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn set_author(&mut self, author: Option<String>) {
        set_field(&mut self.author, author, &self.hook);
    }

    /// Language code acc. to ISO 639-1.
    #[must_use]
    pub fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    pub fn set_language_code(&mut self, language_code: Option<String>) {
        set_field(&mut self.language_code, language_code, &self.hook);
    }

    /// Country code acc. to ISO 3166-2.
    #[must_use]
    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }

    pub fn set_country_code(&mut self, country_code: Option<String>) {
        set_field(&mut self.country_code, country_code, &self.hook);
    }

    #[must_use]
    pub fn word_target(&self) -> Option<i64> {
        self.word_target
    }

    pub fn set_word_target(&mut self, word_target: Option<i64>) {
        set_field(&mut self.word_target, word_target, &self.hook);
    }

    /// Word count at the start of the current writing pass, subtracted when
    /// reporting progress against the target.
    #[must_use]
    pub fn word_count_start(&self) -> Option<i64> {
        self.word_count_start
    }

    pub fn set_word_count_start(&mut self, word_count_start: Option<i64>) {
        set_field(&mut self.word_count_start, word_count_start, &self.hook);
    }

    #[must_use]
    pub fn renumber_chapters(&self) -> bool {
        self.renumber_chapters
    }

    pub fn set_renumber_chapters(&mut self, renumber_chapters: bool) {
        set_field(&mut self.renumber_chapters, renumber_chapters, &self.hook);
    }

    #[must_use]
    pub fn renumber_parts(&self) -> bool {
        self.renumber_parts
    }

    pub fn set_renumber_parts(&mut self, renumber_parts: bool) {
        set_field(&mut self.renumber_parts, renumber_parts, &self.hook);
    }

    #[must_use]
    pub fn renumber_within_parts(&self) -> bool {
        self.renumber_within_parts
    }

    pub fn set_renumber_within_parts(&mut self, renumber_within_parts: bool) {
        set_field(
            &mut self.renumber_within_parts,
            renumber_within_parts,
            &self.hook,
        );
    }

    #[must_use]
    pub fn roman_chapter_numbers(&self) -> bool {
        self.roman_chapter_numbers
    }

    pub fn set_roman_chapter_numbers(&mut self, roman_chapter_numbers: bool) {
        set_field(
            &mut self.roman_chapter_numbers,
            roman_chapter_numbers,
            &self.hook,
        );
    }

    #[must_use]
    pub fn roman_part_numbers(&self) -> bool {
        self.roman_part_numbers
    }

    pub fn set_roman_part_numbers(&mut self, roman_part_numbers: bool) {
        set_field(&mut self.roman_part_numbers, roman_part_numbers, &self.hook);
    }

    /// Keep a daily word-count log in the project file.
    #[must_use]
    pub fn save_word_count(&self) -> bool {
        self.save_word_count
    }

    pub fn set_save_word_count(&mut self, save_word_count: bool) {
        set_field(&mut self.save_word_count, save_word_count, &self.hook);
    }

    /// Overall progress of the project, on the section status scale.
    #[must_use]
    pub fn work_phase(&self) -> Option<Status> {
        self.work_phase
    }

    pub fn set_work_phase(&mut self, work_phase: Option<Status>) {
        set_field(&mut self.work_phase, work_phase, &self.hook);
    }

    #[must_use]
    pub fn chapter_heading_prefix(&self) -> Option<&str> {
        self.chapter_heading_prefix.as_deref()
    }

    pub fn set_chapter_heading_prefix(&mut self, prefix: Option<String>) {
        set_field(&mut self.chapter_heading_prefix, prefix, &self.hook);
    }

    #[must_use]
    pub fn chapter_heading_suffix(&self) -> Option<&str> {
        self.chapter_heading_suffix.as_deref()
    }

    pub fn set_chapter_heading_suffix(&mut self, suffix: Option<String>) {
        set_field(&mut self.chapter_heading_suffix, suffix, &self.hook);
    }

    #[must_use]
    pub fn part_heading_prefix(&self) -> Option<&str> {
        self.part_heading_prefix.as_deref()
    }

    pub fn set_part_heading_prefix(&mut self, prefix: Option<String>) {
        set_field(&mut self.part_heading_prefix, prefix, &self.hook);
    }

    #[must_use]
    pub fn part_heading_suffix(&self) -> Option<&str> {
        self.part_heading_suffix.as_deref()
    }

    pub fn set_part_heading_suffix(&mut self, suffix: Option<String>) {
        set_field(&mut self.part_heading_suffix, suffix, &self.hook);
    }

    /// Override for the "Goal" field label in editing front ends.
    #[must_use]
    pub fn custom_goal(&self) -> Option<&str> {
        self.custom_goal.as_deref()
    }

    pub fn set_custom_goal(&mut self, custom_goal: Option<String>) {
        set_field(&mut self.custom_goal, custom_goal, &self.hook);
    }

    #[must_use]
    pub fn custom_conflict(&self) -> Option<&str> {
        self.custom_conflict.as_deref()
    }

    pub fn set_custom_conflict(&mut self, custom_conflict: Option<String>) {
        set_field(&mut self.custom_conflict, custom_conflict, &self.hook);
    }

    #[must_use]
    pub fn custom_outcome(&self) -> Option<&str> {
        self.custom_outcome.as_deref()
    }

    pub fn set_custom_outcome(&mut self, custom_outcome: Option<String>) {
        set_field(&mut self.custom_outcome, custom_outcome, &self.hook);
    }

    #[must_use]
    pub fn custom_chr_bio(&self) -> Option<&str> {
        self.custom_chr_bio.as_deref()
    }

    pub fn set_custom_chr_bio(&mut self, custom_chr_bio: Option<String>) {
        set_field(&mut self.custom_chr_bio, custom_chr_bio, &self.hook);
    }

    #[must_use]
    pub fn custom_chr_goals(&self) -> Option<&str> {
        self.custom_chr_goals.as_deref()
    }

    pub fn set_custom_chr_goals(&mut self, custom_chr_goals: Option<String>) {
        set_field(&mut self.custom_chr_goals, custom_chr_goals, &self.hook);
    }

    /// Calendar date that anchors the sections' relative day offsets.
    #[must_use]
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    pub fn set_reference_date(&mut self, reference_date: Option<NaiveDate>) {
        set_field(&mut self.reference_date, reference_date, &self.hook);
    }

    #[must_use]
    pub fn reference_week_day(&self) -> Option<Weekday> {
        self.reference_date.map(|date| date.weekday())
    }

    /// Word counts of the manuscript, excluding the trash chapter, as
    /// (normal sections, normal plus unused sections).
    #[must_use]
    pub fn count_words(&self) -> (usize, usize) {
        let mut count = 0;
        let mut total_count = 0;
        for chapter_id in self.tree.get_children(Parent::Root(RootBucket::Chapters)) {
            let Some(chapter) = self.chapters.get(chapter_id) else {
                continue;
            };
            if chapter.is_trash() {
                continue;
            }
            for section_id in self.tree.get_children(Parent::Chapter(chapter_id)) {
                let Some(section) = self.sections.get(section_id) else {
                    continue;
                };
                if section.section_type() <= SectionType::Unused {
                    total_count += section.word_count();
                    if section.section_type() == SectionType::Normal {
                        count += section.word_count();
                    }
                }
            }
        }
        (count, total_count)
    }

    /// Propagates the "unused" marker downward.
    ///
    /// Walks the chapters in tree order: a part hands its type to the
    /// chapters after it (trash excluded), and every section is raised to at
    /// least its chapter's type.
    pub fn adjust_section_types(&mut self) {
        let mut part_type = ChapterType::Normal;
        let chapter_ids: Vec<String> = self
            .tree
            .get_children(Parent::Root(RootBucket::Chapters))
            .to_vec();
        for chapter_id in chapter_ids {
            let Some(chapter) = self.chapters.get_mut(&chapter_id) else {
                continue;
            };
            if chapter.level() == ChapterLevel::Part {
                part_type = chapter.chapter_type();
            } else if part_type != ChapterType::Normal && !chapter.is_trash() {
                chapter.set_chapter_type(part_type);
            }
            let floor = SectionType::from(chapter.chapter_type());
            let section_ids: Vec<String> = self
                .tree
                .get_children(Parent::Chapter(&chapter_id))
                .to_vec();
            for section_id in section_ids {
                if let Some(section) = self.sections.get_mut(&section_id) {
                    if section.section_type() < floor {
                        section.set_section_type(floor);
                    }
                }
            }
        }
    }

    /// Rebuilds every section's plot back-references from the plot lines'
    /// and plot points' forward references.
    ///
    /// Recomputed wholesale on every load rather than patched incrementally;
    /// forward references to sections that do not exist are dropped on the
    /// way, so hand-edited documents heal themselves.
    pub fn rebuild_section_references(&mut self) {
        let sections = &self.sections;
        for (plot_line_id, plot_line) in &mut self.plot_lines {
            let before = plot_line.sections().len();
            let resolved: Vec<String> = plot_line
                .sections()
                .iter()
                .filter(|section_id| sections.contains_key(*section_id))
                .cloned()
                .collect();
            if resolved.len() != before {
                warn!(
                    plot_line = plot_line_id.as_str(),
                    dropped = before - resolved.len(),
                    "dropped dangling section references"
                );
            }
            plot_line.set_sections(resolved);
        }
        for (plot_point_id, plot_point) in &mut self.plot_points {
            let dangling = plot_point
                .section()
                .is_some_and(|section_id| !sections.contains_key(section_id));
            if dangling {
                warn!(
                    plot_point = plot_point_id.as_str(),
                    "dropped dangling section reference"
                );
                plot_point.set_section(None);
            }
        }

        let plot_line_ids: Vec<String> = self
            .tree
            .get_children(Parent::Root(RootBucket::PlotLines))
            .to_vec();
        let mut rebuilt = Vec::with_capacity(self.sections.len());
        for section_id in self.sections.keys() {
            let mut lines = Vec::new();
            let mut points = BTreeMap::new();
            for plot_line_id in &plot_line_ids {
                let Some(plot_line) = self.plot_lines.get(plot_line_id) else {
                    continue;
                };
                if !plot_line.sections().iter().any(|id| id == section_id) {
                    continue;
                }
                lines.push(plot_line_id.clone());
                for plot_point_id in self.tree.get_children(Parent::PlotLine(plot_line_id)) {
                    let assoc = self
                        .plot_points
                        .get(plot_point_id)
                        .and_then(|point| point.section());
                    if assoc == Some(section_id.as_str()) {
                        points.insert(plot_point_id.clone(), plot_line_id.clone());
                    }
                }
            }
            rebuilt.push((section_id.clone(), lines, points));
        }
        for (section_id, lines, points) in rebuilt {
            if let Some(section) = self.sections.get_mut(&section_id) {
                section.plot_lines = lines;
                section.plot_points = points;
            }
        }
    }

    /// Refreshes [`Project::languages`] from the section bodies, keeping
    /// first-seen order.
    pub fn update_languages(&mut self) {
        let mut languages = Vec::new();
        for section in self.sections.values() {
            let Some(content) = section.content() else {
                continue;
            };
            for captures in LANGUAGE_SPAN_RE.captures_iter(content) {
                let code = captures[1].to_string();
                if !languages.contains(&code) {
                    languages.push(code);
                }
            }
        }
        self.languages = languages;
    }

    /// Substitutes the no-linguistic-content codes when the locale does not
    /// look plausible (two-letter language and country codes).
    pub fn check_locale(&mut self) {
        let plausible = matches!(
            (self.language_code.as_deref(), self.country_code.as_deref()),
            (Some(language), Some(country)) if language.len() == 2 && country.len() == 2
        );
        if !plausible {
            self.set_language_code(Some(NO_LANGUAGE.to_string()));
            self.set_country_code(Some(NO_COUNTRY.to_string()));
        }
    }
}

impl Element for Project {
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

    fn project_with_chapter(chapter_type: ChapterType) -> Project {
        let mut project = Project::new(ChangeHook::none());
        let mut chapter = Chapter::new(project.hook());
        chapter.set_chapter_type(chapter_type);
        project.chapters.insert("ch1".to_string(), chapter);
        project.tree.append(Parent::Root(RootBucket::Chapters), "ch1");

        let mut section = Section::new(project.hook());
        section.set_content(Some("<p>one two three</p>".to_string()));
        project.sections.insert("sc1".to_string(), section);
        project.tree.append(Parent::Chapter("ch1"), "sc1");
        project
    }

    #[test]
    fn unused_chapters_raise_their_sections() {
        let mut project = project_with_chapter(ChapterType::Unused);
        project.adjust_section_types();
        assert_eq!(
            project.sections["sc1"].section_type(),
            SectionType::Unused
        );
    }

    #[test]
    fn unused_parts_raise_their_chapters() {
        let mut project = Project::new(ChangeHook::none());

        let mut part = Chapter::new(project.hook());
        part.set_level(ChapterLevel::Part);
        part.set_chapter_type(ChapterType::Unused);
        project.chapters.insert("ch1".to_string(), part);
        project.tree.append(Parent::Root(RootBucket::Chapters), "ch1");

        let chapter = Chapter::new(project.hook());
        project.chapters.insert("ch2".to_string(), chapter);
        project.tree.append(Parent::Root(RootBucket::Chapters), "ch2");

        let mut trash = Chapter::new(project.hook());
        trash.set_is_trash(true);
        project.chapters.insert("ch3".to_string(), trash);
        project.tree.append(Parent::Root(RootBucket::Chapters), "ch3");

        project.adjust_section_types();
        assert_eq!(project.chapters["ch2"].chapter_type(), ChapterType::Unused);
        // the trash bin never inherits
        assert_eq!(project.chapters["ch3"].chapter_type(), ChapterType::Normal);
    }

    #[test]
    fn stage_sections_are_never_lowered() {
        let mut project = project_with_chapter(ChapterType::Unused);
        project
            .sections
            .get_mut("sc1")
            .unwrap()
            .set_section_type(SectionType::Stage1);
        project.adjust_section_types();
        assert_eq!(
            project.sections["sc1"].section_type(),
            SectionType::Stage1
        );
    }

    #[test]
    fn count_words_excludes_unused_from_the_primary_count() {
        let mut project = project_with_chapter(ChapterType::Normal);
        let mut unused = Section::new(project.hook());
        unused.set_section_type(SectionType::Unused);
        unused.set_content(Some("<p>four five</p>".to_string()));
        project.sections.insert("sc2".to_string(), unused);
        project.tree.append(Parent::Chapter("ch1"), "sc2");

        assert_eq!(project.count_words(), (3, 5));
    }

    #[test]
    fn count_words_skips_the_trash_chapter() {
        let mut project = project_with_chapter(ChapterType::Normal);
        project.chapters.get_mut("ch1").unwrap().set_is_trash(true);
        assert_eq!(project.count_words(), (0, 0));
    }

    #[test]
    fn rebuild_inverts_forward_references() {
        let mut project = project_with_chapter(ChapterType::Normal);

        let mut plot_line = PlotLine::new(project.hook());
        plot_line.set_sections(vec!["sc1".to_string()]);
        project.plot_lines.insert("ac1".to_string(), plot_line);
        project.tree.append(Parent::Root(RootBucket::PlotLines), "ac1");

        let mut point = PlotPoint::new(project.hook());
        point.set_section(Some("sc1".to_string()));
        project.plot_points.insert("ap1".to_string(), point);
        project.tree.append(Parent::PlotLine("ac1"), "ap1");

        project.rebuild_section_references();
        let section = &project.sections["sc1"];
        assert_eq!(section.plot_lines, ["ac1"]);
        assert_eq!(section.plot_points.get("ap1"), Some(&"ac1".to_string()));
    }

    #[test]
    fn rebuild_drops_dangling_forward_references() {
        let mut project = project_with_chapter(ChapterType::Normal);

        let mut plot_line = PlotLine::new(project.hook());
        plot_line.set_sections(vec!["sc1".to_string(), "sc99".to_string()]);
        project.plot_lines.insert("ac1".to_string(), plot_line);
        project.tree.append(Parent::Root(RootBucket::PlotLines), "ac1");

        let mut point = PlotPoint::new(project.hook());
        point.set_section(Some("sc99".to_string()));
        project.plot_points.insert("ap1".to_string(), point);
        project.tree.append(Parent::PlotLine("ac1"), "ap1");

        project.rebuild_section_references();
        assert_eq!(project.plot_lines["ac1"].sections(), ["sc1"]);
        assert_eq!(project.plot_points["ap1"].section(), None);
        assert!(project.sections["sc1"].plot_points.is_empty());
    }

    #[test]
    fn rebuild_replaces_stale_back_references() {
        let mut project = project_with_chapter(ChapterType::Normal);
        project
            .sections
            .get_mut("sc1")
            .unwrap()
            .plot_lines
            .push("ac9".to_string());

        project.rebuild_section_references();
        assert!(project.sections["sc1"].plot_lines.is_empty());
    }

    #[test]
    fn languages_are_collected_in_first_seen_order() {
        let mut project = project_with_chapter(ChapterType::Normal);
        project.sections.get_mut("sc1").unwrap().set_content(Some(
            "<p><span xml:lang=\"en-AU\">mate</span> and \
             <span xml:lang=\"de-DE\">du</span> and \
             <span xml:lang=\"en-AU\">again</span></p>"
                .to_string(),
        ));
        project.update_languages();
        assert_eq!(project.languages, ["en-AU", "de-DE"]);
    }

    #[test]
    fn implausible_locales_fall_back_to_no_language() {
        let mut project = Project::new(ChangeHook::none());
        project.set_language_code(Some("english".to_string()));
        project.set_country_code(Some("GB".to_string()));
        project.check_locale();
        assert_eq!(project.language_code(), Some(NO_LANGUAGE));
        assert_eq!(project.country_code(), Some(NO_COUNTRY));
    }

    #[test]
    fn plausible_locales_are_kept() {
        let mut project = Project::new(ChangeHook::none());
        project.set_language_code(Some("de".to_string()));
        project.set_country_code(Some("AT".to_string()));
        project.check_locale();
        assert_eq!(project.language_code(), Some("de"));
        assert_eq!(project.country_code(), Some("AT"));
    }
}
