use std::collections::HashSet;
use std::fs::{self, FileTimes};
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use anyhow::{Result, Context};
use path_slash::PathExt;
use thiserror::Error;
use tracing::{debug, info};
use crate::colors;
use crate::config::MappingConfig;
use crate::naming;
use crate::report;
use crate::scanner::{Scanner, SourcePaper};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Source directory '{}' does not exist", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Source path '{}' is not a directory", .0.display())]
    SourceNotDirectory(PathBuf),
}

/// One copied paper, as written to `conversion_log.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub original_path: String,
    pub new_path: String,
    pub semester: String,
    pub year: String,
    pub subject: String,
    pub course_type: String,
    pub abbreviation: String,
    pub exam_type: String,
    pub target_exam_type: String,
}

#[derive(Debug, Clone)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub record: ConversionRecord,
}

/// Exam folder label resolved for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamTypeMapping {
    pub semester: String,
    pub subject: String,
    pub exam_folder: String,
    pub target_exam_type: String,
}

/// Everything a run would do, computed without touching the output tree.
#[derive(Debug, Default)]
pub struct ConversionPlan {
    pub directories: Vec<PathBuf>,
    pub exam_types: Vec<ExamTypeMapping>,
    pub copies: Vec<PlannedCopy>,
    pub skipped_semesters: Vec<String>,
}

#[derive(Debug)]
pub struct ConversionReport {
    pub records: Vec<ConversionRecord>,
    pub skipped_semesters: Vec<String>,
    pub log_path: PathBuf,
    pub readme_path: PathBuf,
}

pub struct Converter<'a> {
    source: PathBuf,
    output: PathBuf,
    config: &'a MappingConfig,
}

impl<'a> Converter<'a> {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>, config: &'a MappingConfig) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            config,
        }
    }

    fn check_source(&self) -> Result<()> {
        if !self.source.exists() {
            return Err(ConvertError::SourceNotFound(self.source.clone()).into());
        }
        if !self.source.is_dir() {
            return Err(ConvertError::SourceNotDirectory(self.source.clone()).into());
        }
        Ok(())
    }

    /// Resolve every paper to its destination.
    ///
    /// Only existence checks hit the output tree; names handed out earlier in
    /// the plan count as taken, so the plan matches what `run` copies.
    pub fn plan(&self) -> Result<ConversionPlan> {
        self.check_source()?;

        let scan = Scanner::new(self.config).scan(&self.source)?;

        let mut plan = ConversionPlan {
            skipped_semesters: scan.skipped_semesters,
            ..Default::default()
        };
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for semester in &scan.semesters {
            let year = self.year(&semester.name)?;
            println!("{} {} -> {}", "📚 Processing".color(colors::HEADER), semester.name, year);

            for subject in &semester.subjects {
                let info = self.config.subject_info(&subject.name);
                println!("  {} Processing subject: {} -> {}", "•".cyan(), subject.name, info.abbreviation.bold());

                let dir = self.subject_dir(&semester.name, &subject.name)?;
                if !plan.directories.contains(&dir) {
                    plan.directories.push(dir);
                }

                for exam in &subject.exam_folders {
                    let target_exam_type = self.config.exam_type_for(&exam.name);
                    println!("    {} Processing exam type: {} -> {}", "›".dimmed(), exam.name, target_exam_type);

                    plan.exam_types.push(ExamTypeMapping {
                        semester: semester.name.clone(),
                        subject: subject.name.clone(),
                        exam_folder: exam.name.clone(),
                        target_exam_type,
                    });

                    for path in &exam.papers {
                        let paper = SourcePaper {
                            semester: semester.name.clone(),
                            subject: subject.name.clone(),
                            exam_folder: exam.name.clone(),
                            path: path.clone(),
                        };
                        let planned = self.plan_copy(&paper, &claimed)?;
                        claimed.insert(planned.destination.clone());
                        plan.copies.push(planned);
                    }
                }
            }
        }

        Ok(plan)
    }

    fn year(&self, semester: &str) -> Result<&str> {
        self.config
            .year_for_semester(semester)
            .with_context(|| format!("No year mapped for semester '{}'", semester))
    }

    /// `output/<year>/<course_type>/<abbr>-<full name>`
    fn subject_dir(&self, semester: &str, subject: &str) -> Result<PathBuf> {
        let year = self.year(semester)?;
        let info = self.config.subject_info(subject);
        Ok(self.output
            .join(year)
            .join(&info.course_type)
            .join(format!("{}-{}", info.abbreviation, info.full_name)))
    }

    fn plan_copy(&self, paper: &SourcePaper, claimed: &HashSet<PathBuf>) -> Result<PlannedCopy> {
        let year = self.year(&paper.semester)?.to_string();
        let info = self.config.subject_info(&paper.subject);
        let target_exam_type = self.config.exam_type_for(&paper.exam_folder);

        let target_dir = self.subject_dir(&paper.semester, &paper.subject)?;
        let base = naming::paper_filename(&info.abbreviation, &target_exam_type);
        let filename = naming::unique_filename(&target_dir, &base, claimed);
        let destination = target_dir.join(&filename);

        debug!(
            source = %paper.path.display(),
            destination = %destination.display(),
            "resolved paper"
        );

        let record = ConversionRecord {
            original_path: relative_slash(&paper.path, &self.source),
            new_path: relative_slash(&destination, &self.output),
            semester: paper.semester.clone(),
            year,
            subject: paper.subject.clone(),
            course_type: info.course_type,
            abbreviation: info.abbreviation,
            exam_type: paper.exam_folder.clone(),
            target_exam_type,
        };

        Ok(PlannedCopy {
            source: paper.path.clone(),
            destination,
            record,
        })
    }

    /// Convert the whole tree, then write the log and README.
    pub fn run(&self) -> Result<ConversionReport> {
        // Fail before creating anything if the source is unusable.
        self.check_source()?;

        fs::create_dir_all(&self.output)
            .with_context(|| format!("Failed to create output directory: {}", self.output.display()))?;

        let plan = self.plan()?;
        let records = self.execute(&plan)?;

        let log_path = report::write_log(&self.output, &records)?;
        let readme_path = report::generate_readme(&self.output, &records)?;

        info!(files = records.len(), output = %self.output.display(), "conversion complete");

        Ok(ConversionReport {
            records,
            skipped_semesters: plan.skipped_semesters,
            log_path,
            readme_path,
        })
    }

    fn execute(&self, plan: &ConversionPlan) -> Result<Vec<ConversionRecord>> {
        for dir in &plan.directories {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        let pb = ProgressBar::new(plan.copies.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
                .progress_chars("#>-")
        );

        let mut records = Vec::with_capacity(plan.copies.len());
        for copy in &plan.copies {
            pb.inc(1);
            copy_with_metadata(&copy.source, &copy.destination)?;

            let original = copy.source.file_name().unwrap_or_default().to_string_lossy();
            let renamed = copy.destination.file_name().unwrap_or_default().to_string_lossy();
            pb.set_message(renamed.to_string());
            pb.suspend(|| println!("      {} -> {}", original, renamed.color(colors::PATH)));

            records.push(copy.record.clone());
        }

        pb.finish_and_clear();
        Ok(records)
    }

    /// Print what `run` would do without writing anything.
    pub fn preview(&self) -> Result<ConversionPlan> {
        let plan = self.plan()?;

        println!();
        println!("{}", "🌵 DRY RUN: Showing what would be done".bold().color(colors::WARNING));
        println!("{}", "─".repeat(50).color(colors::PATH));

        for dir in &plan.directories {
            if !dir.exists() {
                println!("{} mkdir {}", "📁".green(), dir.display().to_string().color(colors::PATH));
            }
        }

        for (i, copy) in plan.copies.iter().enumerate() {
            println!("{:3}. {}", i + 1, copy.record.original_path);
            println!("     -> {}", copy.record.new_path.color(colors::PATH));
        }

        println!();
        println!("{} Would copy {} files into {}",
            "📊".cyan(),
            plan.copies.len(),
            self.output.display().to_string().color(colors::PATH));
        println!("   No files will be modified");

        Ok(plan)
    }
}

/// Copy contents and permission bits, then carry over access/modification times.
fn copy_with_metadata(source: &Path, destination: &Path) -> Result<()> {
    let metadata = fs::metadata(source)
        .with_context(|| format!("Failed to read metadata: {}", source.display()))?;

    fs::copy(source, destination).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), destination.display())
    })?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }

    open_for_set_times(destination)
        .and_then(|file| file.set_times(times))
        .with_context(|| format!("Failed to set file times: {}", destination.display()))?;

    Ok(())
}

/// Handle allowed to change timestamps, even when the copy is read-only.
#[cfg(windows)]
fn open_for_set_times(path: &Path) -> std::io::Result<fs::File> {
    use std::os::windows::fs::OpenOptionsExt;

    // FILE_WRITE_ATTRIBUTES
    fs::File::options().access_mode(0x0100).open(path)
}

#[cfg(not(windows))]
fn open_for_set_times(path: &Path) -> std::io::Result<fs::File> {
    // futimens only needs ownership, so a read handle works on read-only copies.
    fs::File::open(path)
}

fn relative_slash(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_slash_lossy()
        .into_owned()
}
