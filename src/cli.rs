use clap::Parser;
use std::path::PathBuf;
use colored::*;
use crate::colors;
use crate::{DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "paper_convert",
    about = "Convert exams2k24 structure to iiitprevpapers format",
    version,
    long_about = "Copies exam papers laid out as semester/subject/exam-folder/*.pdf\n\
                  into a year/category/ABBR-Full Name/ tree, renaming each file to\n\
                  ABBR_examtype_2024.pdf.\n\n\
                  A JSON mapping file provides:\n\
                  • semester_to_year: semester folder -> year folder\n\
                  • exam_type_mapping: exam folder -> exam label in the filename\n\
                  • subject_mappings: subject folder -> abbreviation, full name, category"
)]
pub struct Cli {
    /// Source directory
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    pub source: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "PATH")]
    pub output: PathBuf,

    /// Mapping configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, value_name = "FILE")]
    pub config: PathBuf,

    /// Show what would be done without actually copying files
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Echo the resolved arguments before a run
    pub fn print_summary(&self) {
        println!("{}", "📦 PAPER CONVERT".bold().color(colors::HEADER));
        println!("{}", "─".repeat(50).color(colors::PATH));
        println!("{} Source: {}", "•".cyan(), self.source.display());
        println!("{} Output: {}", "•".cyan(), self.output.display());
        println!("{} Config: {}", "•".cyan(), self.config.display());
        if self.dry_run {
            println!("{} {}", "•".cyan(), "DRY RUN MODE - No files will be copied".color(colors::WARNING));
        }
        println!();
    }

    /// Tracing filter directive for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "paper_convert=warn",
            1 => "paper_convert=info",
            2 => "paper_convert=debug",
            _ => "paper_convert=trace",
        }
    }
}
