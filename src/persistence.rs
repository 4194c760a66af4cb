/**
 * Functions and data structures for reading exams and results, and for writing attempt
 * snapshots, in the application's data directory.
 *
 * Layout of the data directory:
 *
 *   exams/<name>.json              the question bank
 *   results/<name>_results.json    answer history, keyed by question ID
 *   attempts/<name>/<time>.json    one snapshot per saved practice set
 */
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::common::{PracticeError, Result};
use super::history::StoredResults;
use super::question::{BankQuestion, WeightedQuestion};


/// An exam as stored on disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Exam {
    /// Domains the exam covers, including any that no question uses yet.
    #[serde(default)]
    pub domains: Vec<String>,
    pub questions: Vec<BankQuestion>,
}


/// A practice set frozen at the moment it was chosen, so that later edits to the exam
/// never change what the learner was asked.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSnapshot<'a> {
    pub exam: &'a str,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub questions: &'a [WeightedQuestion<'a, BankQuestion>],
}


/// Return the path to the default data directory.
pub fn get_default_app_dir_path() -> Result<PathBuf> {
    let mut dirpath = dirs::data_dir().ok_or(PracticeError::CannotMakeAppDir)?;
    dirpath.push("weakest_link");
    Ok(dirpath)
}


/// Return the path to the data directory, creating it and all necessary subdirectories
/// if they don't exist.
pub fn require_app_dir_path(dir: Option<&Path>) -> Result<PathBuf> {
    let dirpath = match dir {
        Some(dir) => dir.to_path_buf(),
        None => get_default_app_dir_path()?,
    };

    for sub in &["", "exams", "results", "attempts"] {
        make_directory(&dirpath.join(sub)).or(Err(PracticeError::CannotMakeAppDir))?;
    }
    Ok(dirpath)
}


pub fn get_exam_path(app_dir: &Path, name: &str) -> PathBuf {
    let mut builder = app_dir.join("exams");
    builder.push(format!("{}.json", name));
    builder
}


pub fn get_results_path(app_dir: &Path, name: &str) -> PathBuf {
    let mut builder = app_dir.join("results");
    builder.push(format!("{}_results.json", name));
    builder
}


pub fn get_attempts_dir_path(app_dir: &Path, name: &str) -> PathBuf {
    let mut builder = app_dir.join("attempts");
    builder.push(name);
    builder
}


/// Load an `Exam` object given its name.
pub fn load_exam(app_dir: &Path, name: &str) -> Result<Exam> {
    let path = get_exam_path(app_dir, name);
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(PracticeError::ExamNotFound(String::from(name)));
        }
        Err(e) => {
            return Err(PracticeError::Io(e));
        }
    };

    let exam: Exam = serde_json::from_str(&data).map_err(PracticeError::Json)?;
    debug!(exam = name, questions = exam.questions.len(), "loaded exam");
    Ok(exam)
}


/// Load the answer history for an exam. An exam that has never been taken has no
/// results file, which is the same as an empty history.
pub fn load_results(app_dir: &Path, name: &str) -> Result<StoredResults> {
    let path = get_results_path(app_dir, name);
    match fs::read_to_string(&path) {
        Ok(data) => {
            serde_json::from_str(&data).map_err(PracticeError::Json)
        },
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
            Ok(StoredResults::new())
        },
        Err(e) => {
            Err(PracticeError::Io(e))
        }
    }
}


/// Write `snapshot` to a new file in the exam's attempts directory and return its path.
/// Existing snapshots are never overwritten.
pub fn save_snapshot(app_dir: &Path, snapshot: &AttemptSnapshot) -> Result<PathBuf> {
    let dirpath = get_attempts_dir_path(app_dir, snapshot.exam);
    make_directory(&dirpath).map_err(PracticeError::Io)?;

    let stamp = snapshot.created_at.format("%Y%m%dT%H%M%S%.3fZ").to_string();
    let mut path = dirpath.join(format!("{}.json", stamp));
    let mut n = 1;
    while path.exists() {
        path = dirpath.join(format!("{}-{}.json", stamp, n));
        n += 1;
    }

    let serialized = serde_json::to_string_pretty(snapshot).map_err(PracticeError::Json)?;
    fs::write(&path, serialized).or(Err(PracticeError::CannotWriteToFile(path.clone())))?;
    info!(path = %path.display(), questions = snapshot.questions.len(), "saved attempt snapshot");
    Ok(path)
}


fn make_directory(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_exam_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = require_app_dir_path(Some(dir.path())).unwrap();
        match load_exam(&app_dir, "nope") {
            Err(PracticeError::ExamNotFound(name)) => assert_eq!(name, "nope"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_results_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let results = load_results(dir.path(), "nope").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn can_load_exam_and_results() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = require_app_dir_path(Some(dir.path())).unwrap();
        fs::write(
            get_exam_path(&app_dir, "aws"),
            r#"{"domains": ["IAM"], "questions": [{"id": "q1", "domain": "S3", "text": "?"}]}"#,
        ).unwrap();
        fs::write(
            get_results_path(&app_dir, "aws"),
            r#"{"q1": [{"attempt": "a1", "time_asked": "2020-03-01T12:00:00Z", "correct": false}]}"#,
        ).unwrap();

        let exam = load_exam(&app_dir, "aws").unwrap();
        assert_eq!(exam.domains, vec![String::from("IAM")]);
        assert_eq!(exam.questions.len(), 1);
        assert_eq!(exam.questions[0].text(), Some("?"));

        let results = load_results(&app_dir, "aws").unwrap();
        assert_eq!(results["q1"].len(), 1);
        assert!(!results["q1"][0].correct);
    }

    #[test]
    fn bad_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = require_app_dir_path(Some(dir.path())).unwrap();
        fs::write(get_exam_path(&app_dir, "broken"), "{").unwrap();
        match load_exam(&app_dir, "broken") {
            Err(PracticeError::Json(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn snapshots_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let q = BankQuestion::new("q1", Some("S3"));
        let chosen = vec![WeightedQuestion { question: &q, weight: 1.0, previously_wrong: true }];
        let snapshot = AttemptSnapshot {
            exam: "aws",
            created_at: chrono::Utc::now(),
            seed: Some(3),
            questions: &chosen,
        };

        let first = save_snapshot(dir.path(), &snapshot).unwrap();
        let second = save_snapshot(dir.path(), &snapshot).unwrap();
        assert_ne!(first, second);

        let data = fs::read_to_string(&first).unwrap();
        let value: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(value["exam"], "aws");
        assert_eq!(value["seed"], 3);
        assert_eq!(value["questions"][0]["id"], "q1");
        assert_eq!(value["questions"][0]["previouslyWrong"], true);
    }
}
