//! novx CLI — inspect and normalize `.novx` writing projects.
//!
//! Commands: check, stats, rewrite

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use novx_core::{ChangeHook, Element, Parent, RootBucket};
use novx_file::NovxFile;

#[derive(Parser)]
#[command(name = "novx")]
#[command(version)]
#[command(about = "Inspect and normalize novx writing projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a project file and report what it contains
    Check {
        /// The .novx file to load
        file: PathBuf,
    },
    /// Word counts and per-chapter tallies
    Stats {
        /// The .novx file to load
        file: PathBuf,
        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load and save a project, normalizing formatting and refreshing the
    /// ledger
    Rewrite {
        /// The .novx file to load
        file: PathBuf,
        /// Write to this path instead of replacing the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    // Healing warnings stay visible without RUST_LOG set.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Stats { file, json } => stats(&file, json),
        Commands::Rewrite { file, output } => rewrite(&file, output.as_deref()),
    }
}

fn open(path: &Path) -> anyhow::Result<NovxFile> {
    let mut file = NovxFile::new(path, ChangeHook::none());
    file.load()
        .with_context(|| format!("cannot load \"{}\"", path.display()))?;
    Ok(file)
}

fn check(path: &Path) -> anyhow::Result<()> {
    let file = open(path)?;
    let project = &file.project;
    println!("{}: valid novx project", path.display());
    println!("  title:         {}", project.title().unwrap_or("(untitled)"));
    println!("  chapters:      {}", project.chapters.len());
    println!("  sections:      {}", project.sections.len());
    println!("  characters:    {}", project.characters.len());
    println!("  locations:     {}", project.locations.len());
    println!("  items:         {}", project.items.len());
    println!("  plot lines:    {}", project.plot_lines.len());
    println!("  plot points:   {}", project.plot_points.len());
    println!("  project notes: {}", project.project_notes.len());
    println!("  ledger days:   {}", file.progress.len());
    let healing = file.healing;
    if healing.is_clean() {
        println!("  healing:       none");
    } else {
        println!(
            "  healing:       dropped {} dangling reference(s), skipped {} unusable entry(ies)",
            healing.dangling_references, healing.skipped_entries,
        );
    }
    Ok(())
}

fn stats(path: &Path, json: bool) -> anyhow::Result<()> {
    let file = open(path)?;
    let project = &file.project;
    let (count, with_unused) = project.count_words();

    let mut chapters = Vec::new();
    for chapter_id in project.tree.get_children(Parent::Root(RootBucket::Chapters)) {
        let Some(chapter) = project.chapters.get(chapter_id) else {
            continue;
        };
        let section_ids = project.tree.get_children(Parent::Chapter(chapter_id));
        let words: usize = section_ids
            .iter()
            .filter_map(|id| project.sections.get(id))
            .map(|section| section.word_count())
            .sum();
        chapters.push((
            chapter_id.clone(),
            chapter.title().unwrap_or("(untitled)").to_string(),
            section_ids.len(),
            words,
        ));
    }

    if json {
        let value = serde_json::json!({
            "file": path.display().to_string(),
            "words": count,
            "words_with_unused": with_unused,
            "word_count_start": file.project.word_count_start(),
            "word_target": file.project.word_target(),
            "chapters": chapters
                .iter()
                .map(|(id, title, sections, words)| serde_json::json!({
                    "id": id,
                    "title": title,
                    "sections": sections,
                    "words": words,
                }))
                .collect::<Vec<_>>(),
            "ledger_days": file.progress.len(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", path.display());
    println!("  words:             {count}");
    println!("  with unused:       {with_unused}");
    if let Some(start) = project.word_count_start() {
        println!("  word count start:  {start}");
    }
    if let Some(target) = project.word_target() {
        println!("  word target:       {target}");
    }
    for (id, title, sections, words) in &chapters {
        println!("  {id}: {title}: {sections} section(s), {words} words");
    }
    println!("  ledger days:       {}", file.progress.len());
    Ok(())
}

fn rewrite(path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let mut file = open(path)?;
    let target = output.unwrap_or(path);
    match output {
        Some(out) => file.save_as(out),
        None => file.save(),
    }
    .with_context(|| format!("cannot write \"{}\"", target.display()))?;
    println!("wrote {}", target.display());
    Ok(())
}
