//! On-disk layout of the problem cache and per-submission work directories.

use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};

use prost::Message;
use yajudge_proto::{File, ProblemContentResponse, ProblemData, Submission};

use crate::config::LocationsConfig;
use crate::error::{GraderError, GraderResult};

const TIMESTAMP_FILE: &str = "timestamp.txt";
const PROBLEM_FILE: &str = "problem.pb";
const SUBMISSION_FILE: &str = "submission.pb";

#[derive(Debug, Clone)]
pub struct Storage {
    cache_directory: PathBuf,
    working_directory: PathBuf,
}

impl Storage {
    pub fn new(locations: &LocationsConfig) -> Self {
        Self {
            cache_directory: locations.cache_directory.clone(),
            working_directory: locations.working_directory.clone(),
        }
    }

    /// `course/problem`, with `:` in problem ids meaning a subdirectory.
    ///
    /// Both ids come from the master and must stay inside the cache.
    pub fn problem_root(&self, course_data_id: &str, problem_id: &str) -> GraderResult<PathBuf> {
        let problem_path = problem_id.replace(':', "/");
        for id in [course_data_id, problem_path.as_str()] {
            if !is_relative_name(id) {
                return Err(GraderError::Storage(format!(
                    "refusing problem location {course_data_id:?}/{problem_id:?} outside the cache"
                )));
            }
        }
        Ok(self
            .cache_directory
            .join(course_data_id)
            .join(problem_path))
    }

    pub fn submission_root(&self, submission_id: i64) -> PathBuf {
        self.working_directory.join(format!("{submission_id:06}"))
    }

    /// `last_modified` of the cached copy, if one exists.
    pub fn problem_timestamp(&self, course_data_id: &str, problem_id: &str) -> Option<i64> {
        let path = self
            .problem_root(course_data_id, problem_id)
            .ok()?
            .join(TIMESTAMP_FILE);
        std::fs::read_to_string(path).ok()?.trim().parse().ok()
    }

    /// Cached problem data, or `None` when the problem was never stored.
    pub fn load_problem(
        &self,
        course_data_id: &str,
        problem_id: &str,
    ) -> GraderResult<Option<ProblemData>> {
        let path = self
            .problem_root(course_data_id, problem_id)?
            .join(PROBLEM_FILE);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        ProblemData::decode(bytes.as_slice())
            .map(Some)
            .map_err(|e| GraderError::Storage(format!("decode {}: {e}", path.display())))
    }

    /// Replace the cached copy of a problem.
    pub fn store_problem(&self, content: &ProblemContentResponse) -> GraderResult<PathBuf> {
        let root = self.problem_root(&content.course_data_id, &content.problem_id)?;
        if root.exists() {
            std::fs::remove_dir_all(&root)?;
        }
        std::fs::create_dir_all(&root)?;
        if let Some(data) = &content.data {
            for file in data.grader_files.iter().flat_map(|set| &set.files) {
                store_file(&root.join("grader"), file)?;
            }
            std::fs::write(root.join(PROBLEM_FILE), data.encode_to_vec())?;
        }
        std::fs::write(
            root.join(TIMESTAMP_FILE),
            format!("{}\n", content.last_modified),
        )?;
        Ok(root)
    }

    /// Unpack solution files into `<submission>/upperdir/build`.
    pub fn store_submission(&self, submission: &Submission) -> GraderResult<PathBuf> {
        let root = self.submission_root(submission.id);
        let build = root.join("upperdir").join("build");
        std::fs::create_dir_all(&build)?;
        for file in submission.solution_files.iter().flat_map(|set| &set.files) {
            store_file(&build, file)?;
        }
        std::fs::write(root.join(SUBMISSION_FILE), submission.encode_to_vec())?;
        Ok(root)
    }
}

/// Relative path made only of plain names, with at least one of them.
fn is_relative_name(name: &str) -> bool {
    let mut has_name = false;
    for component in Path::new(name).components() {
        match component {
            Component::Normal(_) => has_name = true,
            Component::CurDir => {}
            _ => return false,
        }
    }
    has_name
}

fn store_file(dir: &Path, file: &File) -> GraderResult<()> {
    let name = Path::new(&file.name);
    if !is_relative_name(&file.name) {
        return Err(GraderError::Storage(format!(
            "refusing to store file {:?} outside {}",
            file.name,
            dir.display()
        )));
    }
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &file.data)?;
    let mode = match u32::try_from(file.permissions) {
        Ok(mode) if mode != 0 => mode & 0o777,
        _ => 0o660,
    };
    std::fs::set_permissions(&path, Permissions::from_mode(mode))?;
    Ok(())
}
