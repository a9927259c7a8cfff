//! Section entity, the unit the manuscript is made of.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::chapter::ChapterType;
use crate::element::{Element, ElementBase, Noted, Tagged};
use crate::observer::{set_field, ChangeHook};

/// Markup that separates words when counting.
static WORD_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--|—|–|</p>").expect("valid word break regex"));

/// Spans and tags that do not count as words.
static NON_COUNTING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<note>.*?</note>|<comment>.*?</comment>|<.+?>").expect("valid markup regex")
});

/// Manuscript membership of a section, ordered from normal to stage drafts.
///
/// The effective type of a section is never lower than its chapter's type;
/// see [`crate::Project::adjust_section_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SectionType {
    #[default]
    Normal,
    Unused,
    Stage1,
    Stage2,
}

impl From<ChapterType> for SectionType {
    fn from(chapter_type: ChapterType) -> Self {
        match chapter_type {
            ChapterType::Normal => SectionType::Normal,
            ChapterType::Unused => SectionType::Unused,
        }
    }
}

/// Completion status of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Status {
    #[default]
    Outline,
    Draft,
    FirstEdit,
    SecondEdit,
    Done,
}

/// Narrative pacing class of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    #[default]
    NotApplicable,
    Action,
    Reaction,
    Custom,
}

#[derive(Debug, Clone, Default)]
pub struct Section {
    base: ElementBase,
    notes: Option<String>,
    tags: Vec<String>,
    section_type: SectionType,
    status: Status,
    pacing: Pacing,
    append_to_previous: bool,
    goal: Option<String>,
    conflict: Option<String>,
    outcome: Option<String>,
    plotline_notes: BTreeMap<String, String>,
    date: Option<NaiveDate>,
    day: Option<i64>,
    time: Option<NaiveTime>,
    lasts_days: Option<i64>,
    lasts_hours: Option<i64>,
    lasts_minutes: Option<i64>,
    characters: Vec<String>,
    locations: Vec<String>,
    items: Vec<String>,
    content: Option<String>,
    word_count: usize,

    /// Plot lines this section belongs to. Back-reference, rebuilt wholesale
    /// from the plot lines' forward lists on every load.
    pub plot_lines: Vec<String>,
    /// Plot point id → owning plot line id. Back-reference like
    /// [`Section::plot_lines`].
    pub plot_points: BTreeMap<String, String>,
}

impl Section {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            base: ElementBase::new(hook),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn section_type(&self) -> SectionType {
        self.section_type
    }

    pub fn set_section_type(&mut self, section_type: SectionType) {
        set_field(&mut self.section_type, section_type, self.base.hook());
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        set_field(&mut self.status, status, self.base.hook());
    }

    #[must_use]
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn set_pacing(&mut self, pacing: Pacing) {
        set_field(&mut self.pacing, pacing, self.base.hook());
    }

    /// Join this section to the previous one on export.
    #[must_use]
    pub fn append_to_previous(&self) -> bool {
        self.append_to_previous
    }

    pub fn set_append_to_previous(&mut self, append_to_previous: bool) {
        set_field(
            &mut self.append_to_previous,
            append_to_previous,
            self.base.hook(),
        );
    }

    #[must_use]
    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    pub fn set_goal(&mut self, goal: Option<String>) {
        set_field(&mut self.goal, goal, self.base.hook());
    }

    #[must_use]
    pub fn conflict(&self) -> Option<&str> {
        self.conflict.as_deref()
    }

    pub fn set_conflict(&mut self, conflict: Option<String>) {
        set_field(&mut self.conflict, conflict, self.base.hook());
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&str> {
        self.outcome.as_deref()
    }

    pub fn set_outcome(&mut self, outcome: Option<String>) {
        set_field(&mut self.outcome, outcome, self.base.hook());
    }

    /// Free-text notes per plot line, keyed by plot line id.
    #[must_use]
    pub fn plotline_notes(&self) -> &BTreeMap<String, String> {
        &self.plotline_notes
    }

    pub fn set_plotline_notes(&mut self, plotline_notes: BTreeMap<String, String>) {
        set_field(&mut self.plotline_notes, plotline_notes, self.base.hook());
    }

    /// Absolute calendar date of the section start, exclusive with
    /// [`Section::day`].
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        set_field(&mut self.date, date, self.base.hook());
    }

    /// Day offset relative to the project reference date.
    #[must_use]
    pub fn day(&self) -> Option<i64> {
        self.day
    }

    pub fn set_day(&mut self, day: Option<i64>) {
        set_field(&mut self.day, day, self.base.hook());
    }

    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn set_time(&mut self, time: Option<NaiveTime>) {
        set_field(&mut self.time, time, self.base.hook());
    }

    #[must_use]
    pub fn lasts_days(&self) -> Option<i64> {
        self.lasts_days
    }

    pub fn set_lasts_days(&mut self, lasts_days: Option<i64>) {
        set_field(&mut self.lasts_days, lasts_days, self.base.hook());
    }

    #[must_use]
    pub fn lasts_hours(&self) -> Option<i64> {
        self.lasts_hours
    }

    pub fn set_lasts_hours(&mut self, lasts_hours: Option<i64>) {
        set_field(&mut self.lasts_hours, lasts_hours, self.base.hook());
    }

    #[must_use]
    pub fn lasts_minutes(&self) -> Option<i64> {
        self.lasts_minutes
    }

    pub fn set_lasts_minutes(&mut self, lasts_minutes: Option<i64>) {
        set_field(&mut self.lasts_minutes, lasts_minutes, self.base.hook());
    }

    /// Ordered character ids appearing in this section; the first one is the
    /// viewpoint character.
    #[must_use]
    pub fn characters(&self) -> &[String] {
        &self.characters
    }

    pub fn set_characters(&mut self, characters: Vec<String>) {
        set_field(&mut self.characters, characters, self.base.hook());
    }

    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn set_locations(&mut self, locations: Vec<String>) {
        set_field(&mut self.locations, locations, self.base.hook());
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<String>) {
        set_field(&mut self.items, items, self.base.hook());
    }

    /// Section body in the document's inline markup, stored verbatim.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Sets the body and recomputes the word count.
    pub fn set_content(&mut self, content: Option<String>) {
        if self.content == content {
            return;
        }
        self.content = content;
        self.word_count = self.content.as_deref().map_or(0, count_words);
        self.base.hook().notify();
    }

    /// Word count derived from the body; updated by [`Section::set_content`].
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    #[must_use]
    pub fn week_day(&self) -> Option<Weekday> {
        self.date.map(|date| date.weekday())
    }

    /// Converts the relative day to an absolute date via `reference_date`.
    ///
    /// A section that already has a date is left alone. Returns false and
    /// clears the date when day or reference date are missing.
    pub fn day_to_date(&mut self, reference_date: Option<NaiveDate>) -> bool {
        if self.date.is_some() {
            return true;
        }
        let converted = match (self.day, reference_date) {
            (Some(day), Some(reference)) => Duration::try_days(day)
                .and_then(|delta| reference.checked_add_signed(delta)),
            _ => None,
        };
        match converted {
            Some(date) => {
                self.set_date(Some(date));
                self.set_day(None);
                true
            }
            None => {
                self.set_date(None);
                false
            }
        }
    }

    /// Converts the absolute date to a day offset via `reference_date`.
    ///
    /// A section that already has a day is left alone. Returns false and
    /// clears the day when date or reference date are missing.
    pub fn date_to_day(&mut self, reference_date: Option<NaiveDate>) -> bool {
        if self.day.is_some() {
            return true;
        }
        match (self.date, reference_date) {
            (Some(date), Some(reference)) => {
                self.set_day(Some(date.signed_duration_since(reference).num_days()));
                self.set_date(None);
                true
            }
            _ => {
                self.set_day(None);
                false
            }
        }
    }

    /// Section end as a (date, time, day) triple, start plus duration.
    ///
    /// An absolute start yields an end date and time; a relative start
    /// yields an end day and time. Without a start time there is no end.
    #[must_use]
    pub fn end_date_time(&self) -> (Option<NaiveDate>, Option<NaiveTime>, Option<i64>) {
        let Some(time) = self.time else {
            return (None, None, None);
        };
        let total_minutes = self
            .lasts_days
            .unwrap_or(0)
            .checked_mul(24 * 60)
            .and_then(|days| days.checked_add(self.lasts_hours.unwrap_or(0).checked_mul(60)?))
            .and_then(|sum| sum.checked_add(self.lasts_minutes.unwrap_or(0)));
        let Some(duration) = total_minutes.and_then(Duration::try_minutes) else {
            return (None, None, None);
        };
        if let Some(date) = self.date {
            match NaiveDateTime::new(date, time).checked_add_signed(duration) {
                Some(end) => (Some(end.date()), Some(end.time()), None),
                None => (None, None, None),
            }
        } else {
            // Relative schedule: anchor day zero on an arbitrary date, then
            // express the end as an offset again.
            let Some(anchor) = NaiveDate::from_ymd_opt(1, 1, 1) else {
                return (None, None, None);
            };
            match NaiveDateTime::new(anchor, time).checked_add_signed(duration) {
                Some(end) => {
                    let carry = end.date().signed_duration_since(anchor).num_days();
                    let end_day = self.day.unwrap_or(0) + carry;
                    (None, Some(end.time()), Some(end_day))
                }
                None => (None, None, None),
            }
        }
    }
}

impl Element for Section {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl Noted for Section {
    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    fn set_notes(&mut self, notes: Option<String>) {
        set_field(&mut self.notes, notes, self.base.hook());
    }
}

impl Tagged for Section {
    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn set_tags(&mut self, tags: Vec<String>) {
        set_field(&mut self.tags, tags, self.base.hook());
    }
}

/// Counts the words in a body of inline markup.
///
/// Dashes and paragraph ends separate words; note and comment spans and all
/// remaining tags are dropped before splitting on whitespace.
#[must_use]
pub fn count_words(text: &str) -> usize {
    let text = WORD_BREAK_RE.replace_all(text, " ");
    let text = NON_COUNTING_RE.replace_all(&text, "");
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, n).unwrap()
    }

    #[test]
    fn word_count_follows_content() {
        let mut section = Section::new(ChangeHook::none());
        section.set_content(Some("<p>one two three</p>".to_string()));
        assert_eq!(section.word_count(), 3);

        section.set_content(None);
        assert_eq!(section.word_count(), 0);
    }

    #[test]
    fn dashes_and_paragraph_ends_separate_words() {
        assert_eq!(count_words("<p>one--two</p><p>three</p>"), 3);
        assert_eq!(count_words("<p>one—two–three</p>"), 3);
    }

    #[test]
    fn notes_and_comments_are_not_counted() {
        assert_eq!(
            count_words("<p>kept <note>gone gone</note>kept</p>"),
            2
        );
        assert_eq!(count_words("<p><comment>gone</comment>kept</p>"), 1);
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        assert_eq!(count_words("<p>un<em>brok</em>en</p>"), 1);
    }

    #[test]
    fn day_to_date_uses_the_reference_date() {
        let mut section = Section::new(ChangeHook::none());
        section.set_day(Some(2));
        assert!(section.day_to_date(Some(day(1))));
        assert_eq!(section.date(), Some(day(3)));
        assert_eq!(section.day(), None);
    }

    #[test]
    fn day_to_date_without_reference_clears_the_date() {
        let mut section = Section::new(ChangeHook::none());
        section.set_day(Some(2));
        assert!(!section.day_to_date(None));
        assert_eq!(section.date(), None);
        assert_eq!(section.day(), Some(2));
    }

    #[test]
    fn date_to_day_is_the_inverse_conversion() {
        let mut section = Section::new(ChangeHook::none());
        section.set_date(Some(day(5)));
        assert!(section.date_to_day(Some(day(1))));
        assert_eq!(section.day(), Some(4));
        assert_eq!(section.date(), None);
    }

    #[test]
    fn end_date_time_adds_the_duration() {
        let mut section = Section::new(ChangeHook::none());
        section.set_date(Some(day(1)));
        section.set_time(NaiveTime::from_hms_opt(23, 30, 0));
        section.set_lasts_hours(Some(1));
        let (end_date, end_time, end_day) = section.end_date_time();
        assert_eq!(end_date, Some(day(2)));
        assert_eq!(end_time, NaiveTime::from_hms_opt(0, 30, 0));
        assert_eq!(end_day, None);
    }

    #[test]
    fn end_date_time_carries_days_for_relative_schedules() {
        let mut section = Section::new(ChangeHook::none());
        section.set_day(Some(3));
        section.set_time(NaiveTime::from_hms_opt(12, 0, 0));
        section.set_lasts_days(Some(1));
        section.set_lasts_hours(Some(13));
        let (end_date, end_time, end_day) = section.end_date_time();
        assert_eq!(end_date, None);
        assert_eq!(end_time, NaiveTime::from_hms_opt(1, 0, 0));
        assert_eq!(end_day, Some(5));
    }

    #[test]
    fn without_a_time_there_is_no_end() {
        let mut section = Section::new(ChangeHook::none());
        section.set_date(Some(day(1)));
        section.set_lasts_days(Some(2));
        assert_eq!(section.end_date_time(), (None, None, None));
    }

    #[test]
    fn section_type_orders_normal_below_unused() {
        assert!(SectionType::Normal < SectionType::Unused);
        assert!(SectionType::Unused < SectionType::Stage1);
        assert_eq!(SectionType::from(ChapterType::Unused), SectionType::Unused);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn word_count_matches_the_number_of_words(
                words in proptest::collection::vec("[a-z]{1,8}", 0..40)
            ) {
                let content = format!("<p>{}</p>", words.join(" "));
                prop_assert_eq!(count_words(&content), words.len());
            }
        }
    }
}
