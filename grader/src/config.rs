use std::path::{Path, PathBuf};

use nix::unistd::{AccessFlags, access};
use sandbox::Limits;
use serde::Deserialize;

use crate::endpoint::RpcEndpoint;
use crate::error::{GraderError, GraderResult};

pub(crate) const DEFAULT_NAME: &str = "default";
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Deserialize)]
pub struct GraderConfig {
    #[serde(default)]
    pub log: LogConfig,
    pub rpc: RpcConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    pub locations: LocationsConfig,
    #[serde(default)]
    pub default_limits: Limits,
    /// Directory holding the config file; relative paths are resolved against it.
    #[serde(skip)]
    pub config_dir: PathBuf,
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Empty or `stdout` logs to stdout, `stderr` to stderr, anything else is a file.
    pub path: String,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RpcConfig {
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub private_token: String,
    pub private_token_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct EndpointsConfig {
    pub courses_content: String,
    pub submissions: String,
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Concurrent grading jobs; 0 means one per CPU.
    pub workers: usize,
    pub arch_specific_only: bool,
    pub name: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            arch_specific_only: false,
            name: DEFAULT_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationsConfig {
    pub working_directory: PathBuf,
    pub cache_directory: PathBuf,
    #[serde(default)]
    pub system_environment: PathBuf,
    /// Delegated cgroup under which each job gets its own group.
    pub cgroup_root: Option<PathBuf>,
    /// `libyajudge_fork_guard.so`, preloaded into jobs with a process limit.
    pub fork_guard_library: Option<PathBuf>,
}

/// Resolved master endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub courses_content: RpcEndpoint,
    pub submissions: RpcEndpoint,
}

/// Values given on the command line take precedence over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub name: Option<String>,
    pub log_path: Option<String>,
    pub log_level: Option<String>,
}

/// Load and validate a grader config from a YAML file.
///
/// Relative paths in the config are resolved against the config file's parent directory.
pub fn load(path: &Path) -> GraderResult<GraderConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GraderError::Config(format!("read {}: {e}", path.display())))?;
    let mut config: GraderConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| GraderError::Config(format!("parse {}: {e}", path.display())))?;
    config.config_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    config.resolve_relative_paths();
    config.load_token_file()?;
    config.jobs.workers = effective_workers(config.jobs.workers);
    config.validate()?;
    Ok(config)
}

/// Clamp the configured worker count to `1..=cpus`, 0 meaning all CPUs.
pub fn effective_workers(configured: usize) -> usize {
    let cpus = std::thread::available_parallelism().map_or(1, |n| n.get());
    if configured == 0 || configured > cpus {
        cpus
    } else {
        configured
    }
}

fn check_writable_dir(path: &Path, label: &str) -> GraderResult<()> {
    if !path.is_dir() {
        return Err(GraderError::Config(format!(
            "{label} not found: {}",
            path.display()
        )));
    }
    access(path, AccessFlags::W_OK)
        .map_err(|e| GraderError::Config(format!("{label} {} not writable: {e}", path.display())))
}

impl GraderConfig {
    fn resolve_relative_paths(&mut self) {
        let config_dir = self.config_dir.clone();
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = config_dir.join(&*p);
            }
        };
        resolve(&mut self.locations.working_directory);
        resolve(&mut self.locations.cache_directory);
        if !self.locations.system_environment.as_os_str().is_empty() {
            resolve(&mut self.locations.system_environment);
        }
        if let Some(token_file) = &mut self.rpc.private_token_file {
            resolve(token_file);
        }
        if let Some(library) = &mut self.locations.fork_guard_library {
            resolve(library);
        }
    }

    fn load_token_file(&mut self) -> GraderResult<()> {
        if let Some(token_file) = &self.rpc.private_token_file {
            let token = std::fs::read_to_string(token_file).map_err(|e| {
                GraderError::Config(format!("private token file {}: {e}", token_file.display()))
            })?;
            self.rpc.private_token = token.trim().to_string();
        }
        Ok(())
    }

    fn validate(&self) -> GraderResult<()> {
        if self.rpc.private_token.trim().is_empty() {
            return Err(GraderError::Config("private token is not set".into()));
        }
        check_writable_dir(&self.locations.working_directory, "working_directory")?;
        check_writable_dir(&self.locations.cache_directory, "cache_directory")?;
        if let Some(library) = &self.locations.fork_guard_library
            && !library.is_file()
        {
            return Err(GraderError::Config(format!(
                "fork_guard_library not found: {}",
                library.display()
            )));
        }
        let endpoints = self.endpoints()?;
        endpoints.courses_content.validate()?;
        endpoints.submissions.validate()?;
        Ok(())
    }

    pub fn endpoints(&self) -> GraderResult<Endpoints> {
        Ok(Endpoints {
            courses_content: RpcEndpoint::resolve(
                &self.rpc.endpoints.courses_content,
                &self.config_dir,
            )?,
            submissions: RpcEndpoint::resolve(&self.rpc.endpoints.submissions, &self.config_dir)?,
        })
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(name) = overrides.name {
            self.jobs.name = name;
        }
        if let Some(path) = overrides.log_path {
            self.log.path = path;
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
    }
}
