use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use colored::*;
use crate::colors;
use crate::convert::ConversionRecord;
use crate::{LOG_FILE_NAME, README_FILE_NAME};

/// Write the records as a pretty-printed JSON array to `conversion_log.json`.
pub fn write_log(output: &Path, records: &[ConversionRecord]) -> Result<PathBuf> {
    let log_path = output.join(LOG_FILE_NAME);
    let data = serde_json::to_string_pretty(records)
        .context("Failed to serialize conversion log")?;
    fs::write(&log_path, data)
        .with_context(|| format!("Failed to write conversion log: {}", log_path.display()))?;

    println!();
    println!("{} Conversion complete! Files copied to: {}",
        "✅".color(colors::SUCCESS),
        output.display().to_string().color(colors::PATH));
    println!("{} Conversion log saved to: {}", "📝".cyan(), log_path.display());
    println!("{} Total files converted: {}", "📊".cyan(), records.len());

    Ok(log_path)
}

pub fn generate_readme(output: &Path, records: &[ConversionRecord]) -> Result<PathBuf> {
    let readme_path = output.join(README_FILE_NAME);
    fs::write(&readme_path, readme_content(records.len()))
        .with_context(|| format!("Failed to write README: {}", readme_path.display()))?;

    println!("{} README generated: {}", "📄".cyan(), readme_path.display());
    Ok(readme_path)
}

/// Static summary text; only the file count varies.
pub fn readme_content(total_files: usize) -> String {
    format!(r#"# Converted Papers for iiitprevpapers Repository

This directory contains papers from the exams2k24 repository converted to match the structure and naming conventions of the [iiitprevpapers repository](https://github.com/VijayrajS/iiitprevpapers).

## Conversion Summary

- **Total files converted**: {total_files}
- **Source repository**: sanyamseac/exams2k24
- **Target format**: VijayrajS/iiitprevpapers

## Directory Structure

The files are organized as follows:
```
Year1/Year2/Year3/Year4/
├── CS/              # Computer Science courses
├── ECE/             # Electronics and other engineering courses
├── CLD/             # Computational Linguistics and other humanities courses
```

## File Naming Convention

Files follow the iiitprevpapers naming convention:
```
<abbr>_<examtype>_2024.pdf
```

Where:
- `<abbr>` is the subject abbreviation
- `<examtype>` is one of: quiz1, quiz2, mid1, mid2, end
- Year is 2024 (the year these papers are from)

## How to Contribute to iiitprevpapers

1. Fork the [iiitprevpapers repository](https://github.com/VijayrajS/iiitprevpapers)
2. Copy the relevant files from this converted structure to the appropriate directories
3. Make sure file names follow the exact convention
4. Create a pull request

## Mapping Details

See `{log}` for detailed mapping of each file from original location to target location.

## Notes

- All files are from the 2024 academic year (UG1 batch)
- Some subject abbreviations may need adjustment based on existing conventions in the target repository
- Please verify course classifications (CS/ECE/CLD) before contributing
"#, total_files = total_files, log = LOG_FILE_NAME)
}
