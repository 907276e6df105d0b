//! Command-line interface for coursetrack.
//!
//! Provides commands for adding and scanning courses, marking items watched,
//! inspecting and recording playback progress, replaying playback sessions
//! and managing course icons.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{load_config, ResolvedConfig};
use crate::core::{ToggleOutcome, Tracker};
use crate::domain::{Course, ItemKey, ItemKind, ProgressRecord};
use crate::library::CanonicalPath;

pub mod icons;
pub mod playback;

/// coursetrack - resumable progress for local video courses
#[derive(Parser, Debug)]
#[command(name = "coursetrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// State directory (overrides COURSETRACK_HOME and the config file)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List courses with their progress
    List,

    /// Show the sections and items of a course
    Show {
        /// Course ID (folder name)
        course_id: String,
    },

    /// Scan a folder and add it as a course
    Add {
        /// Course folder
        path: PathBuf,
    },

    /// Add every subfolder of a courses folder
    Import {
        /// Courses folder (defaults to paths.courses from the config)
        root: Option<PathBuf>,
    },

    /// Re-scan a course folder, keeping watched flags
    Rescan {
        /// Course ID
        course_id: String,
    },

    /// Remove a course and its playback progress
    Remove {
        /// Course ID
        course_id: String,
    },

    /// Mark an item watched (or unwatched)
    Toggle {
        /// Course ID
        course_id: String,

        /// Section name ("Principal" for files in the course root)
        section: String,

        /// File name
        name: String,

        /// Mark as not watched instead
        #[arg(long)]
        unwatched: bool,
    },

    /// Set the icon of a course
    Icon {
        /// Course ID
        course_id: String,

        /// Logical icon name
        name: String,
    },

    /// Show saved playback progress of a file
    Progress {
        /// Course ID
        course_id: String,

        /// File path
        path: String,
    },

    /// Save playback progress of a file
    Record {
        /// Course ID
        course_id: String,

        /// File path
        path: String,

        /// Position in milliseconds
        #[arg(short, long)]
        position: u64,

        /// Duration in milliseconds (0 if unknown)
        #[arg(short, long, default_value = "0")]
        duration: u64,
    },

    /// Report that playback of a file reached its end
    Complete {
        /// Course ID
        course_id: String,

        /// File path
        path: String,
    },

    /// Replay a recorded playback session (JSON lines)
    Playback {
        /// Course ID
        course_id: String,

        /// Script file
        script: PathBuf,
    },

    /// Manage course icons
    Icons {
        #[command(subcommand)]
        command: icons::IconCommands,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.home)?;

        match self.command {
            Commands::List => list_courses(&config),
            Commands::Show { course_id } => show_course(&config, &course_id),
            Commands::Add { path } => add_course(&config, &path),
            Commands::Import { root } => import_courses(&config, root),
            Commands::Rescan { course_id } => rescan_course(&config, &course_id),
            Commands::Remove { course_id } => remove_course(&config, &course_id),
            Commands::Toggle {
                course_id,
                section,
                name,
                unwatched,
            } => toggle_item(&config, &course_id, ItemKey::new(section, name), !unwatched),
            Commands::Icon { course_id, name } => set_icon(&config, &course_id, &name),
            Commands::Progress { course_id, path } => show_progress(&config, &course_id, &path),
            Commands::Record {
                course_id,
                path,
                position,
                duration,
            } => record_progress(&config, &course_id, &path, position, duration),
            Commands::Complete { course_id, path } => complete(&config, &course_id, &path),
            Commands::Playback { course_id, script } => {
                playback::execute(&config, &course_id, &script).await
            }
            Commands::Icons { command } => icons::execute(&config, command),
            Commands::Config => show_config(&config),
        }
    }
}

/// Open the catalog and progress snapshots described by the config
pub fn open_tracker(config: &ResolvedConfig) -> Result<Tracker> {
    Ok(Tracker::open(
        config.catalog_path(),
        config.progress_path(),
        config.scan_options()?,
    ))
}

fn progress_line(course: &Course) -> String {
    format!(
        "{}/{} ({:.2}%)",
        course.watched_count,
        course.total_items,
        course.completion_percentage()
    )
}

fn list_courses(config: &ResolvedConfig) -> Result<()> {
    let tracker = open_tracker(config)?;
    let courses = tracker.list_courses();

    if courses.is_empty() {
        println!("No courses yet. Add one with `coursetrack add <folder>`");
        return Ok(());
    }

    println!("{:<30} {:<20} {:<20}", "COURSE", "ICON", "WATCHED");
    println!("{}", "-".repeat(72));

    for course in courses {
        println!("{:<30} {:<20} {:<20}", course.id, course.icon, progress_line(course));
    }

    Ok(())
}

fn show_course(config: &ResolvedConfig, course_id: &str) -> Result<()> {
    let tracker = open_tracker(config)?;
    let course = tracker.open_course(course_id)?;

    println!("Course: {}", course.name);
    println!("Folder: {}", course.root_path.display());
    println!("Icon: {}", course.icon);
    println!("Added: {}", course.added_at.format("%Y-%m-%d %H:%M"));
    println!("Watched: {}", progress_line(course));

    for section in &course.sections {
        println!("\n{}", section.name);
        for item in &section.items {
            let mark = if item.watched { "x" } else { " " };
            let extra = match item.kind {
                ItemKind::Video => {
                    let path = course.item_path(&section.name, &item.name);
                    tracker
                        .progress()
                        .get_canonical(course_id, &path)
                        .map(|r| format!("  {:.0}%", r.percent()))
                        .unwrap_or_default()
                }
                ItemKind::Document | ItemKind::Unsupported => String::new(),
            };
            println!("  [{}] {} ({}){}", mark, item.name, item.kind, extra);
        }
    }

    Ok(())
}

fn add_course(config: &ResolvedConfig, path: &Path) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let course = tracker
        .add_course(path)
        .with_context(|| format!("Failed to add course from {}", path.display()))?;

    println!(
        "Added course {} ({} items in {} sections)",
        course.id,
        course.total_items,
        course.sections.len()
    );
    Ok(())
}

fn import_courses(config: &ResolvedConfig, root: Option<PathBuf>) -> Result<()> {
    let root = root
        .or_else(|| config.courses.clone())
        .context("No courses folder given and paths.courses is not configured")?;

    let mut tracker = open_tracker(config)?;
    let result = tracker.import_root(&root)?;

    for id in &result.added {
        println!("  + {}", id);
    }
    for id in &result.skipped {
        println!("  = {} (already in catalog)", id);
    }
    for (path, error) in &result.errors {
        eprintln!("  ! {}: {}", path.display(), error);
    }
    println!(
        "Imported {} courses, skipped {}, failed {}",
        result.added.len(),
        result.skipped.len(),
        result.errors.len()
    );
    Ok(())
}

fn rescan_course(config: &ResolvedConfig, course_id: &str) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let course = tracker.rescan_course(course_id)?;
    println!("Rescanned {}: {}", course.id, progress_line(course));
    Ok(())
}

fn remove_course(config: &ResolvedConfig, course_id: &str) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let course = tracker.remove_course(course_id)?;
    println!("Removed course {}", course.id);
    Ok(())
}

fn toggle_item(config: &ResolvedConfig, course_id: &str, item: ItemKey, watched: bool) -> Result<()> {
    let mut tracker = open_tracker(config)?;

    match tracker.toggle_item(course_id, &item, watched)? {
        ToggleOutcome::Changed { watched_count } => {
            let state = if watched { "watched" } else { "not watched" };
            println!("{} marked {} ({} watched)", item, state, watched_count);
        }
        ToggleOutcome::Unchanged => println!("{} unchanged", item),
    }
    Ok(())
}

fn set_icon(config: &ResolvedConfig, course_id: &str, name: &str) -> Result<()> {
    let resolver = crate::icons::IconResolver::load_or_empty(&config.icons);
    if resolver.entry(name).is_none() {
        eprintln!("Warning: no icon named '{}' in {}", name, config.icons.display());
    }

    let mut tracker = open_tracker(config)?;
    tracker.set_course_icon(course_id, name)?;
    println!("Icon of {} set to {}", course_id, name);
    Ok(())
}

fn show_progress(config: &ResolvedConfig, course_id: &str, path: &str) -> Result<()> {
    let tracker = open_tracker(config)?;

    match tracker.get_progress(course_id, path) {
        Some(record) => println!(
            "{}: {} / {} ms ({:.0}%)",
            CanonicalPath::new(path),
            record.position,
            record.duration,
            record.percent()
        ),
        None => println!("No saved progress for {}", CanonicalPath::new(path)),
    }
    Ok(())
}

fn record_progress(
    config: &ResolvedConfig,
    course_id: &str,
    path: &str,
    position: u64,
    duration: u64,
) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let record = ProgressRecord::new(position, duration);
    let key = tracker.record_progress(course_id, path, record)?;
    println!("Saved {} ms for {}", record.position, key);
    Ok(())
}

fn complete(config: &ResolvedConfig, course_id: &str, path: &str) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let outcome = tracker.on_playback_completed(course_id, &CanonicalPath::new(path))?;

    if outcome.changed() {
        println!(
            "Marked watched. {} is {:.2}% complete",
            course_id,
            tracker.completion_percentage(course_id)?
        );
    } else {
        println!("Already watched");
    }
    Ok(())
}

fn show_config(config: &ResolvedConfig) -> Result<()> {
    println!("Home:         {}", config.home.display());
    println!("Catalog:      {}", config.catalog_path().display());
    println!("Progress:     {}", config.progress_path().display());
    println!(
        "Courses:      {}",
        config
            .courses
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("Icons:        {}", config.icons.display());
    println!("Default icon: {}", config.default_icon);
    println!("Icon size:    {}", config.icon_size);
    println!("Ignore:       {:?}", config.ignore);
    match &config.config_file {
        Some(path) => println!("Config file:  {}", path.display()),
        None => println!("Config file:  (none)"),
    }
    Ok(())
}
