//! paper_convert - Reshelve semester-organized exam papers
//!
//! Walks a `semester/subject/exam-folder/*.pdf` tree and copies every paper
//! into a `year/category/ABBR-Full Name/` tree, renamed to
//! `ABBR_examtype_2024.pdf`. A JSON mapping file drives every lookup.

pub mod config;
pub mod naming;
pub mod scanner;
pub mod convert;
pub mod report;
pub mod cli;

// Re-exports for easy access
pub use config::{ConfigError, MappingConfig, SubjectInfo};
pub use scanner::{ExamFolder, ScanResult, Scanner, SemesterDir, SourcePaper, SubjectDir};
pub use convert::{ConversionPlan, ConversionRecord, ConversionReport, ConvertError, Converter, ExamTypeMapping, PlannedCopy};
pub use report::{generate_readme, write_log};
pub use cli::Cli;

pub mod colors {
    use colored::Color;

    pub const SUCCESS: Color = Color::TrueColor { r: 77, g: 255, b: 157 };
    pub const HEADER: Color = Color::TrueColor { r: 157, g: 77, b: 255 };
    pub const PATH: Color = Color::TrueColor { r: 77, g: 195, b: 255 };
    pub const WARNING: Color = Color::TrueColor { r: 255, g: 217, b: 61 };
    pub const ERROR: Color = Color::TrueColor { r: 255, g: 107, b: 107 };
}

/// Mapping file looked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "iiitprevpapers-mapping.json";

/// Output root used when `--output` is not given
pub const DEFAULT_OUTPUT_DIR: &str = "./iiitprevpapers-converted";

/// Category for subjects missing from `subject_mappings`
pub const DEFAULT_COURSE_TYPE: &str = "CS";

/// Year stamped into every generated filename
pub const PAPER_YEAR: &str = "2024";

pub const LOG_FILE_NAME: &str = "conversion_log.json";
pub const README_FILE_NAME: &str = "README.md";

/// Only files with this extension (any case) are converted
pub const PAPER_EXTENSION: &str = "pdf";
