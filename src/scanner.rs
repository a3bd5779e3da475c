use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};
use colored::*;
use anyhow::{Result, Context};
use tracing::{debug, warn};
use crate::colors;
use crate::config::MappingConfig;
use crate::PAPER_EXTENSION;

/// A known semester folder and the subjects under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterDir {
    pub name: String,
    pub subjects: Vec<SubjectDir>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDir {
    pub name: String,
    pub exam_folders: Vec<ExamFolder>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamFolder {
    pub name: String,
    pub papers: Vec<PathBuf>,
}

/// A single PDF found at `source/<semester>/<subject>/<exam_folder>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaper {
    pub semester: String,
    pub subject: String,
    pub exam_folder: String,
    pub path: PathBuf,
}

#[derive(Debug, Default)]
pub struct ScanResult {
    pub semesters: Vec<SemesterDir>,
    pub skipped_semesters: Vec<String>,
}

impl ScanResult {
    /// Every paper in discovery order
    pub fn papers(&self) -> Vec<SourcePaper> {
        let mut papers = Vec::new();
        for semester in &self.semesters {
            for subject in &semester.subjects {
                for exam in &subject.exam_folders {
                    for path in &exam.papers {
                        papers.push(SourcePaper {
                            semester: semester.name.clone(),
                            subject: subject.name.clone(),
                            exam_folder: exam.name.clone(),
                            path: path.clone(),
                        });
                    }
                }
            }
        }
        papers
    }
}

pub struct Scanner<'a> {
    config: &'a MappingConfig,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a MappingConfig) -> Self {
        Self { config }
    }

    /// Walk the three folder levels below `source` in name order.
    pub fn scan(&self, source: &Path) -> Result<ScanResult> {
        println!("{} {}", "🔍 Scanning:".color(colors::HEADER), source.display());

        let mut result = ScanResult::default();

        for (semester, semester_path) in child_dirs(source)? {
            if self.config.year_for_semester(&semester).is_none() {
                warn!(semester = %semester, "unknown semester, skipping");
                println!("{} Unknown semester '{}', skipping...", "⚠️".color(colors::WARNING), semester);
                result.skipped_semesters.push(semester);
                continue;
            }

            let mut subjects = Vec::new();
            for (subject, subject_path) in child_dirs(&semester_path)? {
                let mut exam_folders = Vec::new();
                for (exam_folder, exam_path) in child_dirs(&subject_path)? {
                    exam_folders.push(ExamFolder {
                        name: exam_folder,
                        papers: pdf_files(&exam_path)?,
                    });
                }
                subjects.push(SubjectDir { name: subject, exam_folders });
            }

            result.semesters.push(SemesterDir { name: semester, subjects });
        }

        Ok(result)
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Direct children of `dir` in name order.
///
/// Entries that exist but whose link target cannot be resolved (dangling
/// links, link loops) are skipped; any other error is returned.
fn entries(dir: &Path) -> Result<Vec<DirEntry>> {
    let mut entries = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(err) => {
                let unresolved_link = err.depth() > 0
                    && err.path().map(|p| fs::symlink_metadata(p).is_ok()).unwrap_or(false);
                if !unresolved_link {
                    return Err(err).with_context(|| format!("Failed to read directory: {}", dir.display()));
                }
                debug!(path = ?err.path(), error = %err, "skipping unresolvable entry");
            }
        }
    }

    Ok(entries)
}

/// Visible subdirectories of `dir`, sorted by name.
fn child_dirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();

    for entry in entries(dir)? {
        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if is_hidden(&name) {
            continue;
        }

        dirs.push((name, entry.into_path()));
    }

    Ok(dirs)
}

/// Regular `.pdf` files (extension in any case) directly inside `dir`, sorted by name.
fn pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in entries(dir)? {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry.path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(PAPER_EXTENSION))
            .unwrap_or(false);

        if is_pdf {
            debug!(path = %entry.path().display(), "found paper");
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
