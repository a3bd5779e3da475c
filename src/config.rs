use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use colored::*;
use crate::colors;
use crate::DEFAULT_COURSE_TYPE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file '{}' not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read configuration file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file '{}'", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Lookup tables that drive the whole conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingConfig {
    pub semester_to_year: BTreeMap<String, String>,
    pub exam_type_mapping: BTreeMap<String, String>,
    pub subject_mappings: BTreeMap<String, SubjectInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub abbreviation: String,
    pub full_name: String,
    pub course_type: String,
}

impl MappingConfig {
    /// Load the mapping file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound { path: path.to_path_buf() });
        }

        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Year label for a semester folder, `None` if the semester is unknown
    pub fn year_for_semester(&self, semester: &str) -> Option<&str> {
        self.semester_to_year.get(semester).map(String::as_str)
    }

    /// Target exam label; unmapped folders fall back to their lowercased name
    pub fn exam_type_for(&self, exam_folder: &str) -> String {
        self.exam_type_mapping
            .get(exam_folder)
            .cloned()
            .unwrap_or_else(|| exam_folder.to_lowercase())
    }

    /// Subject details, synthesized from the subject's initials when unmapped
    pub fn subject_info(&self, subject: &str) -> SubjectInfo {
        match self.subject_mappings.get(subject) {
            Some(info) => info.clone(),
            None => SubjectInfo {
                abbreviation: crate::naming::initials(subject),
                full_name: subject.to_string(),
                course_type: DEFAULT_COURSE_TYPE.to_string(),
            },
        }
    }

    /// Print a short overview of the loaded tables
    pub fn display(&self, path: &Path) {
        println!("{} {}", "📖 Mapping:".color(colors::HEADER), path.display().to_string().color(colors::PATH));
        println!("{} {} semesters, {} exam folders, {} subjects",
            "•".cyan(),
            self.semester_to_year.len(),
            self.exam_type_mapping.len(),
            self.subject_mappings.len(),
        );
    }
}
