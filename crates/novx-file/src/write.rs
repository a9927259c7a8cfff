//! The write side of the codec: a project serialized into document text.
//!
//! Bucket order matches the read order; within each bucket the ids come
//! from the ordering tree, never from the maps. Flag attributes and
//! optional elements are written only when set, so a document written twice
//! is byte-identical.

use std::collections::HashMap;

use novx_core::project::{NO_COUNTRY, NO_LANGUAGE};
use novx_core::{
    Chapter, ChapterLevel, ChapterType, Character, Element, Noted, Pacing, Parent, PlotLine,
    PlotPoint, Project, RootBucket, Section, SectionType, Status, Tagged, WorldElement,
};

use crate::progress::ProgressLog;
use crate::version::{MAJOR_VERSION, MINOR_VERSION, XML_HEADER};
use crate::xml::XmlWriter;

/// Serializes the whole document, header included.
///
/// Pure with respect to its inputs; the consistency passes (unused-type
/// propagation, language scan, ledger merge) run before this in
/// [`crate::NovxFile::save`].
pub(crate) fn build_document(project: &Project, log: &ProgressLog) -> String {
    let version = format!("{MAJOR_VERSION}.{MINOR_VERSION}");
    let locale = format!(
        "{}-{}",
        project.language_code().unwrap_or(NO_LANGUAGE),
        project.country_code().unwrap_or(NO_COUNTRY)
    );
    let mut w = XmlWriter::with_header(XML_HEADER);
    w.start("novx", &[("version", &version), ("xml:lang", &locale)]);
    build_project(&mut w, project);
    build_chapters(&mut w, project);
    build_characters(&mut w, project);
    build_world_elements(&mut w, project, "LOCATIONS", "LOCATION", RootBucket::Locations);
    build_world_elements(&mut w, project, "ITEMS", "ITEM", RootBucket::Items);
    build_plot_lines(&mut w, project);
    build_project_notes(&mut w, project);
    build_progress(&mut w, project, log);
    w.end("novx");
    w.into_string()
}

fn build_project(w: &mut XmlWriter, project: &Project) {
    let mut attrs: Vec<(&str, &str)> = Vec::new();
    for (name, set) in [
        ("renumberChapters", project.renumber_chapters()),
        ("renumberParts", project.renumber_parts()),
        ("renumberWithinParts", project.renumber_within_parts()),
        ("romanChapterNumbers", project.roman_chapter_numbers()),
        ("romanPartNumbers", project.roman_part_numbers()),
        ("saveWordCount", project.save_word_count()),
    ] {
        if set {
            attrs.push((name, "1"));
        }
    }
    if let Some(phase) = project.work_phase().map(status_code) {
        attrs.push(("workPhase", phase));
    }
    w.start("PROJECT", &attrs);
    write_base(w, project);
    write_text(w, "Author", project.author());
    write_text(w, "ChapterHeadingPrefix", project.chapter_heading_prefix());
    write_text(w, "ChapterHeadingSuffix", project.chapter_heading_suffix());
    write_text(w, "PartHeadingPrefix", project.part_heading_prefix());
    write_text(w, "PartHeadingSuffix", project.part_heading_suffix());
    write_text(w, "CustomGoal", project.custom_goal());
    write_text(w, "CustomConflict", project.custom_conflict());
    write_text(w, "CustomOutcome", project.custom_outcome());
    write_text(w, "CustomChrBio", project.custom_chr_bio());
    write_text(w, "CustomChrGoals", project.custom_chr_goals());
    if let Some(start) = project.word_count_start().filter(|n| *n != 0) {
        w.leaf("WordCountStart", &start.to_string());
    }
    if let Some(target) = project.word_target().filter(|n| *n != 0) {
        w.leaf("WordTarget", &target.to_string());
    }
    if let Some(date) = project.reference_date() {
        w.leaf("ReferenceDate", &date.to_string());
    }
    w.end("PROJECT");
}

fn build_chapters(w: &mut XmlWriter, project: &Project) {
    w.start("CHAPTERS", &[]);
    for chapter_id in project.tree.get_children(Parent::Root(RootBucket::Chapters)) {
        if let Some(chapter) = project.chapters.get(chapter_id) {
            build_chapter(w, project, chapter_id, chapter);
        }
    }
    w.end("CHAPTERS");
}

fn build_chapter(w: &mut XmlWriter, project: &Project, chapter_id: &str, chapter: &Chapter) {
    let mut attrs: Vec<(&str, &str)> = vec![("id", chapter_id)];
    if chapter.chapter_type() == ChapterType::Unused {
        attrs.push(("type", "1"));
    }
    if chapter.level() == ChapterLevel::Part {
        attrs.push(("level", "1"));
    }
    if chapter.is_trash() {
        attrs.push(("isTrash", "1"));
    }
    if chapter.no_number() {
        attrs.push(("noNumber", "1"));
    }
    w.start("CHAPTER", &attrs);
    write_base(w, chapter);
    write_notes(w, chapter);
    for section_id in project.tree.get_children(Parent::Chapter(chapter_id)) {
        if let Some(section) = project.sections.get(section_id) {
            build_section(w, section_id, section);
        }
    }
    w.end("CHAPTER");
}

fn build_section(w: &mut XmlWriter, section_id: &str, section: &Section) {
    let mut attrs: Vec<(&str, &str)> = vec![("id", section_id)];
    let type_code = section_type_code(section.section_type());
    if type_code != "0" {
        attrs.push(("type", type_code));
    }
    let status = status_code(section.status());
    if section.status() > Status::Outline {
        attrs.push(("status", status));
    }
    let pacing = pacing_code(section.pacing());
    if section.pacing() != Pacing::NotApplicable {
        attrs.push(("pacing", pacing));
    }
    if section.append_to_previous() {
        attrs.push(("append", "1"));
    }
    w.start("SECTION", &attrs);
    write_base(w, section);
    write_notes(w, section);
    write_tags(w, section);
    write_paragraphs(w, "Goal", section.goal());
    write_paragraphs(w, "Conflict", section.conflict());
    write_paragraphs(w, "Outcome", section.outcome());

    // Notes are kept only for plot lines the section still belongs to.
    let plot_notes: Vec<(&String, &String)> = section
        .plotline_notes()
        .iter()
        .filter(|(plot_line_id, _)| section.plot_lines.contains(plot_line_id))
        .collect();
    if !plot_notes.is_empty() {
        w.start("PlotNotes", &[]);
        for (plot_line_id, text) in plot_notes {
            w.paragraphs("PlotlineNotes", &[("id", plot_line_id)], text);
        }
        w.end("PlotNotes");
    }

    if let Some(date) = section.date() {
        w.leaf("Date", &date.to_string());
    } else if let Some(day) = section.day() {
        w.leaf("Day", &day.to_string());
    }
    if let Some(time) = section.time() {
        w.leaf("Time", &time.format("%H:%M:%S").to_string());
    }
    for (tag, value) in [
        ("LastsDays", section.lasts_days()),
        ("LastsHours", section.lasts_hours()),
        ("LastsMinutes", section.lasts_minutes()),
    ] {
        if let Some(value) = value.filter(|n| *n != 0) {
            w.leaf(tag, &value.to_string());
        }
    }
    write_reference_ids(w, "Characters", section.characters());
    write_reference_ids(w, "Locations", section.locations());
    write_reference_ids(w, "Items", section.items());
    let content = section
        .content()
        .filter(|c| !c.is_empty() && *c != "<p></p>" && *c != "<p />");
    if let Some(content) = content {
        w.raw_leaf("Content", content);
    }
    w.end("SECTION");
}

fn build_characters(w: &mut XmlWriter, project: &Project) {
    w.start("CHARACTERS", &[]);
    for id in project.tree.get_children(Parent::Root(RootBucket::Characters)) {
        if let Some(character) = project.characters.get(id) {
            build_character(w, id, character);
        }
    }
    w.end("CHARACTERS");
}

fn build_character(w: &mut XmlWriter, id: &str, character: &Character) {
    let mut attrs: Vec<(&str, &str)> = vec![("id", id)];
    if character.is_major() {
        attrs.push(("major", "1"));
    }
    w.start("CHARACTER", &attrs);
    write_base(w, character);
    write_notes(w, character);
    write_tags(w, character);
    write_text(w, "Aka", character.aka());
    write_text(w, "FullName", character.full_name());
    write_paragraphs(w, "Bio", character.bio());
    write_paragraphs(w, "Goals", character.goals());
    if let Some(date) = character.birth_date() {
        w.leaf("BirthDate", &date.to_string());
    }
    if let Some(date) = character.death_date() {
        w.leaf("DeathDate", &date.to_string());
    }
    w.end("CHARACTER");
}

fn build_world_elements(
    w: &mut XmlWriter,
    project: &Project,
    bucket_tag: &str,
    tag: &str,
    bucket: RootBucket,
) {
    let map: &HashMap<String, WorldElement> = match bucket {
        RootBucket::Items => &project.items,
        _ => &project.locations,
    };
    w.start(bucket_tag, &[]);
    for id in project.tree.get_children(Parent::Root(bucket)) {
        if let Some(element) = map.get(id) {
            build_world_element(w, tag, id, element);
        }
    }
    w.end(bucket_tag);
}

fn build_world_element(w: &mut XmlWriter, tag: &str, id: &str, element: &WorldElement) {
    w.start(tag, &[("id", id)]);
    write_base(w, element);
    write_notes(w, element);
    write_tags(w, element);
    write_text(w, "Aka", element.aka());
    w.end(tag);
}

fn build_plot_lines(w: &mut XmlWriter, project: &Project) {
    w.start("ARCS", &[]);
    for plot_line_id in project.tree.get_children(Parent::Root(RootBucket::PlotLines)) {
        if let Some(plot_line) = project.plot_lines.get(plot_line_id) {
            build_plot_line(w, project, plot_line_id, plot_line);
        }
    }
    w.end("ARCS");
}

fn build_plot_line(w: &mut XmlWriter, project: &Project, plot_line_id: &str, plot_line: &PlotLine) {
    w.start("ARC", &[("id", plot_line_id)]);
    write_base(w, plot_line);
    write_text(w, "ShortName", plot_line.short_name());
    write_reference_ids(w, "Sections", plot_line.sections());
    for point_id in project.tree.get_children(Parent::PlotLine(plot_line_id)) {
        if let Some(point) = project.plot_points.get(point_id) {
            build_plot_point(w, point_id, point);
        }
    }
    w.end("ARC");
}

fn build_plot_point(w: &mut XmlWriter, point_id: &str, point: &PlotPoint) {
    w.start("POINT", &[("id", point_id)]);
    write_base(w, point);
    write_notes(w, point);
    if let Some(section_id) = point.section() {
        w.empty("Section", &[("id", section_id)]);
    }
    w.end("POINT");
}

fn build_project_notes(w: &mut XmlWriter, project: &Project) {
    w.start("PROJECTNOTES", &[]);
    for id in project.tree.get_children(Parent::Root(RootBucket::ProjectNotes)) {
        if let Some(note) = project.project_notes.get(id) {
            w.start("PROJECTNOTE", &[("id", id)]);
            write_base(w, note);
            w.end("PROJECTNOTE");
        }
    }
    w.end("PROJECTNOTES");
}

fn build_progress(w: &mut XmlWriter, project: &Project, log: &ProgressLog) {
    if log.is_empty() {
        return;
    }
    w.start("PROGRESS", &[]);
    let mut last = None;
    for (date, entry) in log {
        // With logging enabled, a day that matches the previous entry adds
        // nothing and is elided.
        if project.save_word_count() && last == Some(*entry) {
            continue;
        }
        last = Some(*entry);
        w.start("WC", &[]);
        w.leaf("Date", &date.to_string());
        w.leaf("Count", &entry.count.to_string());
        w.leaf("WithUnused", &entry.with_unused.to_string());
        w.end("WC");
    }
    w.end("PROGRESS");
}

// --- element helpers ---

fn write_base(w: &mut XmlWriter, element: &dyn Element) {
    write_text(w, "Title", element.title());
    write_paragraphs(w, "Desc", element.desc());
    for link in element.links() {
        match &link.full_path {
            Some(full_path) => w.empty("Link", &[("path", &link.path), ("fullPath", full_path)]),
            None => w.empty("Link", &[("path", &link.path)]),
        }
    }
}

fn write_notes(w: &mut XmlWriter, element: &dyn Noted) {
    write_paragraphs(w, "Notes", element.notes());
}

fn write_tags(w: &mut XmlWriter, element: &dyn Tagged) {
    if !element.tags().is_empty() {
        w.leaf("Tags", &element.tags().join(";"));
    }
}

fn write_text(w: &mut XmlWriter, tag: &str, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        w.leaf(tag, text);
    }
}

fn write_paragraphs(w: &mut XmlWriter, tag: &str, text: Option<&str>) {
    if let Some(text) = text {
        w.paragraphs(tag, &[], text);
    }
}

fn write_reference_ids(w: &mut XmlWriter, tag: &str, ids: &[String]) {
    if !ids.is_empty() {
        w.empty(tag, &[("ids", &ids.join(" "))]);
    }
}

// --- wire codes ---

fn section_type_code(section_type: SectionType) -> &'static str {
    match section_type {
        SectionType::Normal => "0",
        SectionType::Unused => "1",
        SectionType::Stage1 => "2",
        SectionType::Stage2 => "3",
    }
}

fn status_code(status: Status) -> &'static str {
    match status {
        Status::Outline => "1",
        Status::Draft => "2",
        Status::FirstEdit => "3",
        Status::SecondEdit => "4",
        Status::Done => "5",
    }
}

fn pacing_code(pacing: Pacing) -> &'static str {
    match pacing {
        Pacing::NotApplicable => "0",
        Pacing::Action => "1",
        Pacing::Reaction => "2",
        Pacing::Custom => "3",
    }
}
