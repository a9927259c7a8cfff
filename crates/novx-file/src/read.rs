//! The read side of the codec: a parsed document into a populated project.
//!
//! Buckets are read in a fixed order (project settings, locations, items,
//! characters, chapters with sections, plot lines with points, project
//! notes) because section reads validate their references against the maps
//! populated before them. Dangling references and malformed values never
//! fail the load; they are healed in place and logged.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use roxmltree::{Document, Node, ParsingOptions};
use tracing::warn;

use novx_core::{
    ChangeHook, Chapter, ChapterLevel, ChapterType, Character, Element, Link, Noted, NovxError,
    Pacing, Parent, PlotLine, PlotPoint, Project, ProjectNote, Result, RootBucket, Section,
    SectionType, Status, Tagged, WorldElement,
};

use crate::novx::Healing;
use crate::progress::{ProgressLog, WordCountEntry};
use crate::version::check_version;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Parses a whole document into a project, its word-count ledger, and a
/// record of the healing applied along the way.
///
/// The version gate runs on the root attribute before any entity is
/// populated. After the structural reads the section back-references are
/// rebuilt and the unused-type propagation pass is run.
///
/// # Errors
///
/// [`NovxError::MalformedXml`] when the text does not parse; the version
/// gate errors of [`check_version`].
pub(crate) fn read_document(
    text: &str,
    path: &Path,
    hook: &ChangeHook,
) -> Result<(Project, ProgressLog, Healing)> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options).map_err(|err| NovxError::MalformedXml {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let root = document.root_element();
    check_version(root.attribute("version"), path)?;

    let mut project = Project::new(hook.clone());
    if let Some((language, country)) = root
        .attribute((XML_NS, "lang"))
        .and_then(|locale| locale.split_once('-'))
    {
        project.set_language_code(Some(language.to_string()));
        project.set_country_code(Some(country.to_string()));
    }

    let mut healing = Healing::default();
    project.tree.reset();
    if let Some(node) = child(root, "PROJECT") {
        read_project_settings(node, &mut project);
    }
    read_locations(root, &mut project, &mut healing);
    read_items(root, &mut project, &mut healing);
    read_characters(root, &mut project, &mut healing);
    read_chapters(root, text, &mut project, &mut healing);
    read_plot_lines(root, &mut project, &mut healing);
    read_project_notes(root, &mut project, &mut healing);
    project.adjust_section_types();
    project.rebuild_section_references();

    let progress = read_progress(root, &mut healing);
    Ok((project, progress, healing))
}

fn read_project_settings(node: Node<'_, '_>, project: &mut Project) {
    project.set_renumber_chapters(flag(node, "renumberChapters"));
    project.set_renumber_parts(flag(node, "renumberParts"));
    project.set_renumber_within_parts(flag(node, "renumberWithinParts"));
    project.set_roman_chapter_numbers(flag(node, "romanChapterNumbers"));
    project.set_roman_part_numbers(flag(node, "romanPartNumbers"));
    project.set_save_word_count(flag(node, "saveWordCount"));
    project.set_work_phase(node.attribute("workPhase").and_then(status_from_code));

    read_base(node, project);
    project.set_author(child_text(node, "Author"));
    project.set_chapter_heading_prefix(child_text(node, "ChapterHeadingPrefix"));
    project.set_chapter_heading_suffix(child_text(node, "ChapterHeadingSuffix"));
    project.set_part_heading_prefix(child_text(node, "PartHeadingPrefix"));
    project.set_part_heading_suffix(child_text(node, "PartHeadingSuffix"));
    project.set_custom_goal(child_text(node, "CustomGoal"));
    project.set_custom_conflict(child_text(node, "CustomConflict"));
    project.set_custom_outcome(child_text(node, "CustomOutcome"));
    project.set_custom_chr_bio(child_text(node, "CustomChrBio"));
    project.set_custom_chr_goals(child_text(node, "CustomChrGoals"));
    project.set_word_count_start(child_int(node, "WordCountStart"));
    project.set_word_target(child_int(node, "WordTarget"));
    project.set_reference_date(child_date(node, "ReferenceDate"));
}

fn read_locations(root: Node<'_, '_>, project: &mut Project, healing: &mut Healing) {
    for (id, node) in identified_children(root, "LOCATIONS", "LOCATION", healing) {
        let mut location = WorldElement::new(project.hook());
        read_world_element(node, &mut location);
        project.locations.insert(id.clone(), location);
        project.tree.append(Parent::Root(RootBucket::Locations), id);
    }
}

fn read_items(root: Node<'_, '_>, project: &mut Project, healing: &mut Healing) {
    for (id, node) in identified_children(root, "ITEMS", "ITEM", healing) {
        let mut item = WorldElement::new(project.hook());
        read_world_element(node, &mut item);
        project.items.insert(id.clone(), item);
        project.tree.append(Parent::Root(RootBucket::Items), id);
    }
}

fn read_world_element(node: Node<'_, '_>, element: &mut WorldElement) {
    read_base(node, element);
    read_notes(node, element);
    read_tags(node, element);
    element.set_aka(child_text(node, "Aka"));
}

fn read_characters(root: Node<'_, '_>, project: &mut Project, healing: &mut Healing) {
    for (id, node) in identified_children(root, "CHARACTERS", "CHARACTER", healing) {
        let mut character = Character::new(project.hook());
        character.set_is_major(flag(node, "major"));
        read_base(node, &mut character);
        read_notes(node, &mut character);
        read_tags(node, &mut character);
        character.set_aka(child_text(node, "Aka"));
        character.set_full_name(child_text(node, "FullName"));
        character.set_bio(child(node, "Bio").map(paragraphs_text));
        character.set_goals(child(node, "Goals").map(paragraphs_text));
        character.set_birth_date(child_date(node, "BirthDate"));
        character.set_death_date(child_date(node, "DeathDate"));
        project.characters.insert(id.clone(), character);
        project.tree.append(Parent::Root(RootBucket::Characters), id);
    }
}

fn read_chapters(root: Node<'_, '_>, text: &str, project: &mut Project, healing: &mut Healing) {
    for (chapter_id, node) in identified_children(root, "CHAPTERS", "CHAPTER", healing) {
        let mut chapter = Chapter::new(project.hook());
        chapter.set_chapter_type(chapter_type_from_code(node.attribute("type")));
        chapter.set_level(if node.attribute("level") == Some("1") {
            ChapterLevel::Part
        } else {
            ChapterLevel::Regular
        });
        chapter.set_is_trash(flag(node, "isTrash"));
        chapter.set_no_number(flag(node, "noNumber"));
        read_base(node, &mut chapter);
        read_notes(node, &mut chapter);
        let floor = SectionType::from(chapter.chapter_type());

        project.tree.append(Parent::Root(RootBucket::Chapters), chapter_id.clone());
        project.chapters.insert(chapter_id.clone(), chapter);

        for section_node in node.children().filter(|n| n.has_tag_name("SECTION")) {
            let Some(section_id) = section_node.attribute("id") else {
                warn!(parent = chapter_id.as_str(), "skipped a section without an id");
                healing.skipped_entries += 1;
                continue;
            };
            let mut section = read_section(section_node, text, project, healing);
            // Propagated here per chapter; a second full pass after the load
            // catches part-level chapters processed out of order.
            if section.section_type() < floor {
                section.set_section_type(floor);
            }
            project.sections.insert(section_id.to_string(), section);
            project.tree.append(Parent::Chapter(&chapter_id), section_id);
        }
    }
}

fn read_section(
    node: Node<'_, '_>,
    text: &str,
    project: &Project,
    healing: &mut Healing,
) -> Section {
    let mut section = Section::new(project.hook());
    section.set_section_type(section_type_from_code(node.attribute("type")));
    section.set_status(node.attribute("status").and_then(status_from_code).unwrap_or_default());
    section.set_pacing(pacing_from_code(node.attribute("pacing")));
    section.set_append_to_previous(flag(node, "append"));

    read_base(node, &mut section);
    read_notes(node, &mut section);
    read_tags(node, &mut section);
    section.set_goal(child(node, "Goal").map(paragraphs_text));
    section.set_conflict(child(node, "Conflict").map(paragraphs_text));
    section.set_outcome(child(node, "Outcome").map(paragraphs_text));

    if let Some(plot_notes) = child(node, "PlotNotes") {
        let mut notes = std::collections::BTreeMap::new();
        for note_node in plot_notes.children().filter(|n| n.has_tag_name("PlotlineNotes")) {
            if let Some(plot_line_id) = note_node.attribute("id") {
                notes.insert(plot_line_id.to_string(), paragraphs_text(note_node));
            }
        }
        section.set_plotline_notes(notes);
    }

    // Date and day are exclusive; a present Date element shadows any Day.
    if let Some(date_node) = child(node, "Date") {
        section.set_date(date_node.text().and_then(|t| t.parse().ok()));
    } else if let Some(day_node) = child(node, "Day") {
        section.set_day(day_node.text().and_then(|t| t.parse().ok()));
    }
    section.set_time(child(node, "Time").and_then(|n| n.text()).and_then(parse_time));
    section.set_lasts_days(child_int(node, "LastsDays"));
    section.set_lasts_hours(child_int(node, "LastsHours"));
    section.set_lasts_minutes(child_int(node, "LastsMinutes"));

    section.set_characters(reference_ids(node, "Characters", healing, |id| {
        project.characters.contains_key(id)
    }));
    section.set_locations(reference_ids(node, "Locations", healing, |id| {
        project.locations.contains_key(id)
    }));
    section.set_items(reference_ids(node, "Items", healing, |id| {
        project.items.contains_key(id)
    }));

    if let Some(content_node) = child(node, "Content") {
        let content = inline_content(content_node, text);
        if !content.is_empty() {
            section.set_content(Some(content));
        }
    }
    section
}

fn read_plot_lines(root: Node<'_, '_>, project: &mut Project, healing: &mut Healing) {
    for (plot_line_id, node) in identified_children(root, "ARCS", "ARC", healing) {
        let mut plot_line = PlotLine::new(project.hook());
        read_base(node, &mut plot_line);
        plot_line.set_short_name(child_text(node, "ShortName"));
        // Taken as-is here; the wholesale back-reference rebuild validates
        // the forward list after the load.
        let sections = child(node, "Sections")
            .and_then(|n| n.attribute("ids"))
            .map(id_list)
            .unwrap_or_default();
        plot_line.set_sections(sections);
        project.plot_lines.insert(plot_line_id.clone(), plot_line);
        project
            .tree
            .append(Parent::Root(RootBucket::PlotLines), plot_line_id.clone());

        for point_node in node.children().filter(|n| n.has_tag_name("POINT")) {
            let Some(point_id) = point_node.attribute("id") else {
                warn!(parent = plot_line_id.as_str(), "skipped a plot point without an id");
                healing.skipped_entries += 1;
                continue;
            };
            let mut point = PlotPoint::new(project.hook());
            read_base(point_node, &mut point);
            read_notes(point_node, &mut point);
            point.set_section(
                child(point_node, "Section")
                    .and_then(|n| n.attribute("id"))
                    .map(str::to_string),
            );
            project.plot_points.insert(point_id.to_string(), point);
            project.tree.append(Parent::PlotLine(&plot_line_id), point_id);
        }
    }
}

fn read_project_notes(root: Node<'_, '_>, project: &mut Project, healing: &mut Healing) {
    for (id, node) in identified_children(root, "PROJECTNOTES", "PROJECTNOTE", healing) {
        let mut note = ProjectNote::new(project.hook());
        read_base(node, &mut note);
        project.project_notes.insert(id.clone(), note);
        project.tree.append(Parent::Root(RootBucket::ProjectNotes), id);
    }
}

fn read_progress(root: Node<'_, '_>, healing: &mut Healing) -> ProgressLog {
    let mut log = ProgressLog::new();
    let Some(progress) = child(root, "PROGRESS") else {
        return log;
    };
    for entry_node in progress.children().filter(|n| n.has_tag_name("WC")) {
        let date = child(entry_node, "Date")
            .and_then(|n| n.text())
            .and_then(|t| t.parse::<NaiveDate>().ok());
        let count = child_int(entry_node, "Count");
        let with_unused = child_int(entry_node, "WithUnused");
        // An entry counts only when all three parts are present and valid.
        match (date, count, with_unused) {
            (Some(date), Some(count), Some(with_unused)) => log.record(
                date,
                WordCountEntry {
                    count: count as usize,
                    with_unused: with_unused as usize,
                },
            ),
            _ => {
                warn!("skipped an incomplete word-count log entry");
                healing.skipped_entries += 1;
            }
        }
    }
    log
}

// --- element helpers ---

fn read_base(node: Node<'_, '_>, element: &mut dyn Element) {
    element.set_title(child_text(node, "Title"));
    element.set_desc(child(node, "Desc").map(paragraphs_text));
    let links: Vec<Link> = node
        .children()
        .filter(|n| n.has_tag_name("Link"))
        .filter_map(|link| {
            // Links without a path carry no information and are dropped.
            let path = link.attribute("path")?;
            Some(Link::new(path, link.attribute("fullPath").map(str::to_string)))
        })
        .collect();
    element.set_links(links);
}

fn read_notes(node: Node<'_, '_>, element: &mut dyn Noted) {
    element.set_notes(child(node, "Notes").map(paragraphs_text));
}

fn read_tags(node: Node<'_, '_>, element: &mut dyn Tagged) {
    let tags = child_text(node, "Tags")
        .map(|text| {
            text.split(';')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    element.set_tags(tags);
}

/// The `(id, node)` pairs under `bucket`, skipping entries without an id.
fn identified_children<'a, 'i>(
    root: Node<'a, 'i>,
    bucket: &'static str,
    tag: &'static str,
    healing: &mut Healing,
) -> Vec<(String, Node<'a, 'i>)> {
    let Some(bucket_node) = child(root, bucket) else {
        return Vec::new();
    };
    bucket_node
        .children()
        .filter(|n| n.has_tag_name(tag))
        .filter_map(|n| match n.attribute("id") {
            Some(id) => Some((id.to_string(), n)),
            None => {
                warn!(bucket, "skipped an element without an id");
                healing.skipped_entries += 1;
                None
            }
        })
        .collect()
}

fn child<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|n| n.text())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn child_int(node: Node<'_, '_>, tag: &str) -> Option<i64> {
    child(node, tag).and_then(|n| n.text()).and_then(|t| t.parse().ok())
}

fn child_date(node: Node<'_, '_>, tag: &str) -> Option<NaiveDate> {
    child(node, tag).and_then(|n| n.text()).and_then(|t| t.parse().ok())
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

fn flag(node: Node<'_, '_>, name: &str) -> bool {
    node.attribute(name) == Some("1")
}

/// Text of a formatted-text container: one line per `<p>` child.
fn paragraphs_text(node: Node<'_, '_>) -> String {
    let lines: Vec<&str> = node
        .children()
        .filter(|n| n.has_tag_name("p"))
        .map(|p| p.text().unwrap_or(""))
        .collect();
    lines.join("\n")
}

/// Space-separated reference ids from the `ids` attribute of `tag`,
/// dropping every id `exists` does not know.
fn reference_ids(
    node: Node<'_, '_>,
    tag: &'static str,
    healing: &mut Healing,
    exists: impl Fn(&str) -> bool,
) -> Vec<String> {
    let Some(ids) = child(node, tag).and_then(|n| n.attribute("ids")) else {
        return Vec::new();
    };
    let mut resolved = Vec::new();
    for id in ids.split_whitespace() {
        if exists(id) {
            resolved.push(id.to_string());
        } else {
            warn!(tag, id, "dropped a dangling reference");
            healing.dangling_references += 1;
        }
    }
    resolved
}

fn id_list(ids: &str) -> Vec<String> {
    ids.split_whitespace().map(str::to_string).collect()
}

/// Inner markup of a Content element, verbatim except that line breaks and
/// their surrounding indentation are not content.
fn inline_content(node: Node<'_, '_>, text: &str) -> String {
    let raw = &text[node.range()];
    let inner = match (raw.find('>'), raw.rfind("</")) {
        (Some(start), Some(end)) if start + 1 <= end => &raw[start + 1..end],
        _ => "",
    };
    let joined: String = inner.lines().map(str::trim).collect();
    if joined == "<p></p>" || joined == "<p />" {
        String::new()
    } else {
        joined
    }
}

// --- wire codes ---

fn chapter_type_from_code(code: Option<&str>) -> ChapterType {
    match code.unwrap_or("0") {
        "0" => ChapterType::Normal,
        _ => ChapterType::Unused,
    }
}

fn section_type_from_code(code: Option<&str>) -> SectionType {
    match code.unwrap_or("0") {
        "0" => SectionType::Normal,
        "2" => SectionType::Stage1,
        "3" => SectionType::Stage2,
        _ => SectionType::Unused,
    }
}

fn status_from_code(code: &str) -> Option<Status> {
    match code {
        "1" => Some(Status::Outline),
        "2" => Some(Status::Draft),
        "3" => Some(Status::FirstEdit),
        "4" => Some(Status::SecondEdit),
        "5" => Some(Status::Done),
        _ => None,
    }
}

fn pacing_from_code(code: Option<&str>) -> Pacing {
    match code.unwrap_or("0") {
        "1" => Pacing::Action,
        "2" => Pacing::Reaction,
        "3" => Pacing::Custom,
        _ => Pacing::NotApplicable,
    }
}
