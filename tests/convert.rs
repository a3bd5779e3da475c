//! End-to-end conversion tests over temporary source trees.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use paper_convert::{ConversionRecord, Converter, MappingConfig};
use tempfile::TempDir;

const MAPPING: &str = r#"{
    "semester_to_year": { "Sem1": "2024", "Sem2": "2024" },
    "exam_type_mapping": { "Quiz1": "quiz1", "Mid Sem": "mid1" },
    "subject_mappings": {
        "Mathematics": {
            "abbreviation": "MA",
            "full_name": "Mathematics",
            "course_type": "CS"
        },
        "Digital Systems": {
            "abbreviation": "DS M",
            "full_name": "Digital Systems",
            "course_type": "ECE"
        }
    }
}"#;

struct Fixture {
    _temp: TempDir,
    source: PathBuf,
    output: PathBuf,
    config: MappingConfig,
}

impl Fixture {
    fn new() -> Self {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("exams2k24");
        let output = temp.path().join("converted");
        fs::create_dir_all(&source).unwrap();
        Self {
            _temp: temp,
            source,
            output,
            config: MappingConfig::from_json(MAPPING).unwrap(),
        }
    }

    fn paper(&self, relative: &str) -> PathBuf {
        let path = self.source.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("%PDF {}", relative)).unwrap();
        path
    }

    fn converter(&self) -> Converter<'_> {
        Converter::new(&self.source, &self.output, &self.config)
    }

    fn read_log(&self) -> Vec<ConversionRecord> {
        let data = fs::read_to_string(self.output.join("conversion_log.json")).unwrap();
        serde_json::from_str(&data).unwrap()
    }
}

fn count_pdfs(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|x| x == "pdf").unwrap_or(false))
        .count()
}

#[test]
fn converts_single_paper() {
    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/q1.pdf");

    let report = fx.converter().run().unwrap();

    let target = fx.output.join("2024/CS/MA-Mathematics/MA_quiz1_2024.pdf");
    assert_eq!(fs::read_to_string(&target).unwrap(), "%PDF Sem1/Mathematics/Quiz1/q1.pdf");

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.original_path, "Sem1/Mathematics/Quiz1/q1.pdf");
    assert_eq!(record.new_path, "2024/CS/MA-Mathematics/MA_quiz1_2024.pdf");
    assert_eq!(record.semester, "Sem1");
    assert_eq!(record.year, "2024");
    assert_eq!(record.subject, "Mathematics");
    assert_eq!(record.course_type, "CS");
    assert_eq!(record.abbreviation, "MA");
    assert_eq!(record.exam_type, "Quiz1");
    assert_eq!(record.target_exam_type, "quiz1");

    assert_eq!(fx.read_log(), report.records);
    assert_eq!(report.log_path, fx.output.join("conversion_log.json"));
}

#[test]
fn numbers_colliding_names() {
    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/a.pdf");
    fx.paper("Sem1/Mathematics/Quiz1/b.pdf");
    fx.paper("Sem2/Mathematics/Quiz1/c.pdf");

    let report = fx.converter().run().unwrap();

    let dir = fx.output.join("2024/CS/MA-Mathematics");
    let names: Vec<_> = report.records.iter().map(|r| r.new_path.as_str()).collect();
    assert_eq!(names, vec![
        "2024/CS/MA-Mathematics/MA_quiz1_2024.pdf",
        "2024/CS/MA-Mathematics/MA_quiz1_2024_1.pdf",
        "2024/CS/MA-Mathematics/MA_quiz1_2024_2.pdf",
    ]);
    assert_eq!(fs::read_to_string(dir.join("MA_quiz1_2024.pdf")).unwrap(), "%PDF Sem1/Mathematics/Quiz1/a.pdf");
    assert_eq!(fs::read_to_string(dir.join("MA_quiz1_2024_1.pdf")).unwrap(), "%PDF Sem1/Mathematics/Quiz1/b.pdf");
    assert_eq!(fs::read_to_string(dir.join("MA_quiz1_2024_2.pdf")).unwrap(), "%PDF Sem2/Mathematics/Quiz1/c.pdf");
}

#[test]
fn every_paper_is_copied_exactly_once() {
    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/a.pdf");
    fx.paper("Sem1/Mathematics/Mid Sem/b.pdf");
    fx.paper("Sem1/Operating Systems/End Sem/c.pdf");
    fx.paper("Sem2/Digital Systems/Quiz1/d.pdf");
    fx.paper("Sem2/Digital Systems/Quiz1/e.pdf");

    let report = fx.converter().run().unwrap();

    assert_eq!(report.records.len(), 5);
    assert_eq!(count_pdfs(&fx.output), 5);

    let originals: HashSet<_> = report.records.iter().map(|r| r.original_path.as_str()).collect();
    assert_eq!(originals.len(), 5);
    let targets: HashSet<_> = report.records.iter().map(|r| r.new_path.as_str()).collect();
    assert_eq!(targets.len(), 5);
}

#[test]
fn unmapped_subject_and_exam_fall_back() {
    let fx = Fixture::new();
    fx.paper("Sem1/Operating Systems/End Sem/paper.pdf");

    let report = fx.converter().run().unwrap();

    let record = &report.records[0];
    assert_eq!(record.abbreviation, "OS");
    assert_eq!(record.course_type, "CS");
    assert_eq!(record.target_exam_type, "end sem");
    assert_eq!(record.new_path, "2024/CS/OS-Operating Systems/OS_end_sem_2024.pdf");
    assert!(fx.output.join("2024/CS/OS-Operating Systems/OS_end_sem_2024.pdf").is_file());
}

#[test]
fn sanitizes_generated_filenames() {
    let fx = Fixture::new();
    fx.paper("Sem1/Digital Systems/Mid Sem/one.pdf");
    fx.paper("Sem1/Digital Systems/Mid Sem/two.pdf");

    let report = fx.converter().run().unwrap();

    let dir = fx.output.join("2024/ECE/DS M-Digital Systems");
    assert!(dir.join("DS_M_mid1_2024.pdf").is_file());
    assert!(dir.join("DS_M_mid1_2024_1.pdf").is_file());
    for record in &report.records {
        let filename = record.new_path.rsplit('/').next().unwrap();
        assert!(!filename.contains(' '));
    }
}

#[test]
fn unknown_semesters_are_left_out() {
    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/a.pdf");
    fx.paper("Summer School/Mathematics/Quiz1/b.pdf");

    let report = fx.converter().run().unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.skipped_semesters, vec!["Summer School".to_string()]);
    assert!(report.records.iter().all(|r| r.semester == "Sem1"));
    assert_eq!(count_pdfs(&fx.output), 1);
}

#[test]
fn creates_subject_dirs_without_papers() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.source.join("Sem1/Mathematics/Quiz1")).unwrap();

    let report = fx.converter().run().unwrap();

    assert!(report.records.is_empty());
    assert!(fx.output.join("2024/CS/MA-Mathematics").is_dir());
    assert!(fx.read_log().is_empty());
}

#[test]
fn rerun_adds_numbered_duplicates() {
    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/a.pdf");

    fx.converter().run().unwrap();
    let second = fx.converter().run().unwrap();

    assert_eq!(second.records[0].new_path, "2024/CS/MA-Mathematics/MA_quiz1_2024_1.pdf");
    assert_eq!(count_pdfs(&fx.output), 2);
}

#[test]
fn preserves_modification_time() {
    let fx = Fixture::new();
    let source = fx.paper("Sem1/Mathematics/Quiz1/a.pdf");

    let past = SystemTime::now() - Duration::from_secs(30 * 24 * 60 * 60);
    let times = fs::FileTimes::new().set_modified(past).set_accessed(past);
    fs::File::options().write(true).open(&source).unwrap().set_times(times).unwrap();

    fx.converter().run().unwrap();

    let copied = fx.output.join("2024/CS/MA-Mathematics/MA_quiz1_2024.pdf");
    let expected = fs::metadata(&source).unwrap().modified().unwrap();
    assert_eq!(fs::metadata(copied).unwrap().modified().unwrap(), expected);
}

#[test]
fn writes_readme_with_count() {
    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/a.pdf");
    fx.paper("Sem1/Mathematics/Quiz1/b.pdf");

    let report = fx.converter().run().unwrap();

    let readme = fs::read_to_string(&report.readme_path).unwrap();
    assert_eq!(report.readme_path, fx.output.join("README.md"));
    assert!(readme.contains("**Total files converted**: 2"));
}

#[test]
fn dry_run_touches_nothing() {
    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/a.pdf");
    fx.paper("Sem1/Mathematics/Quiz1/b.pdf");

    let plan = fx.converter().preview().unwrap();

    assert!(!fx.output.exists());
    assert_eq!(plan.copies.len(), 2);
    assert_eq!(plan.directories, vec![fx.output.join("2024/CS/MA-Mathematics")]);
    assert_eq!(plan.copies[1].record.new_path, "2024/CS/MA-Mathematics/MA_quiz1_2024_1.pdf");
}

#[test]
fn missing_source_is_an_error() {
    let fx = Fixture::new();
    let converter = Converter::new(fx.source.join("missing"), &fx.output, &fx.config);

    assert!(converter.run().is_err());
    assert!(!fx.output.exists());
}

#[test]
fn carries_permissions_of_read_only_papers() {
    let fx = Fixture::new();
    let source = fx.paper("Sem1/Mathematics/Quiz1/a.pdf");

    let past = SystemTime::now() - Duration::from_secs(7 * 24 * 60 * 60);
    let times = fs::FileTimes::new().set_modified(past).set_accessed(past);
    fs::File::options().write(true).open(&source).unwrap().set_times(times).unwrap();

    let mut permissions = fs::metadata(&source).unwrap().permissions();
    permissions.set_readonly(true);
    fs::set_permissions(&source, permissions).unwrap();

    fx.converter().run().unwrap();

    let copied = fs::metadata(fx.output.join("2024/CS/MA-Mathematics/MA_quiz1_2024.pdf")).unwrap();
    let original = fs::metadata(&source).unwrap();
    assert!(copied.permissions().readonly());
    assert_eq!(copied.modified().unwrap(), original.modified().unwrap());
}

#[cfg(unix)]
#[test]
fn carries_unix_mode_bits() {
    use std::os::unix::fs::PermissionsExt;

    let fx = Fixture::new();
    let source = fx.paper("Sem1/Mathematics/Quiz1/a.pdf");
    fs::set_permissions(&source, fs::Permissions::from_mode(0o640)).unwrap();

    fx.converter().run().unwrap();

    let copied = fs::metadata(fx.output.join("2024/CS/MA-Mathematics/MA_quiz1_2024.pdf")).unwrap();
    assert_eq!(copied.permissions().mode() & 0o777, 0o640);
}

#[cfg(unix)]
#[test]
fn dangling_link_in_source_root_does_not_abort() {
    use std::os::unix::fs::symlink;

    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/q1.pdf");
    symlink(fx.source.join("gone"), fx.source.join("stale-link")).unwrap();

    let report = fx.converter().run().unwrap();

    assert_eq!(report.records.len(), 1);
    assert!(fx.output.join("2024/CS/MA-Mathematics/MA_quiz1_2024.pdf").is_file());
}

#[test]
fn plan_lists_exam_folders_without_papers() {
    let fx = Fixture::new();
    fx.paper("Sem1/Mathematics/Quiz1/q1.pdf");
    fs::create_dir_all(fx.source.join("Sem1/Mathematics/Mid Sem")).unwrap();
    fs::create_dir_all(fx.source.join("Sem2/Operating Systems/End Sem")).unwrap();

    let plan = fx.converter().plan().unwrap();

    let labels: Vec<_> = plan.exam_types.iter()
        .map(|m| (m.subject.as_str(), m.exam_folder.as_str(), m.target_exam_type.as_str()))
        .collect();
    assert_eq!(labels, vec![
        ("Mathematics", "Mid Sem", "mid1"),
        ("Mathematics", "Quiz1", "quiz1"),
        ("Operating Systems", "End Sem", "end sem"),
    ]);
    assert_eq!(plan.copies.len(), 1);
    assert!(plan.directories.contains(&fx.output.join("2024/CS/OS-Operating Systems")));
}
