//! Change-Set Repository - File system source for change-sets
//!
//! Each sub-directory of the migrations directory is one change-set holding
//! an `up.sql` and a `down.sql`. Directory names sorted by byte order give
//! the apply order.

use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::definitions::MigrationDirection;
use crate::error::{MigrateError, MigrateResult};

/// Source of change-set names and their scripts
pub trait ChangeSetRepository: Send + Sync {
    /// Names of all available change-sets, in apply order
    fn list_available(&self) -> MigrateResult<Vec<String>>;

    /// Forward script of a change-set
    fn load_forward(&self, name: &str) -> MigrateResult<String> {
        self.load_script(name, MigrationDirection::Up)
    }

    /// Backward script of a change-set
    fn load_backward(&self, name: &str) -> MigrateResult<String> {
        self.load_script(name, MigrationDirection::Down)
    }

    fn load_script(&self, name: &str, direction: MigrationDirection) -> MigrateResult<String>;
}

/// Change-sets stored as `<root>/<name>/{up,down}.sql`
#[derive(Debug, Clone)]
pub struct FsChangeSetRepository {
    root: PathBuf,
}

impl FsChangeSetRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of one script of a change-set
    pub fn script_path(&self, name: &str, direction: MigrationDirection) -> PathBuf {
        self.root.join(name).join(direction.script_file())
    }

    /// Scaffold a new change-set directory and return its name
    pub fn create(&self, name: &str) -> MigrateResult<String> {
        let slug = name.trim().replace([' ', '-'], "_").to_lowercase();
        if slug.is_empty() || slug.contains(['/', '\\', '.']) {
            return Err(MigrateError::Repository(format!(
                "Invalid change-set name '{}'",
                name
            )));
        }

        let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let change_set = format!("{}_{}", timestamp, slug);
        let dir = self.root.join(&change_set);

        if dir.exists() {
            return Err(MigrateError::Repository(format!(
                "Change-set directory {} already exists",
                dir.display()
            )));
        }

        fs::create_dir_all(&dir).map_err(|e| {
            MigrateError::Repository(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        for direction in [MigrationDirection::Up, MigrationDirection::Down] {
            let path = dir.join(direction.script_file());
            fs::write(&path, script_template(&change_set, direction)).map_err(|e| {
                MigrateError::Repository(format!("Failed to write {}: {}", path.display(), e))
            })?;
        }

        tracing::info!(change_set = %change_set, "created change-set");
        Ok(change_set)
    }
}

impl ChangeSetRepository for FsChangeSetRepository {
    fn list_available(&self) -> MigrateResult<Vec<String>> {
        if !self.root.exists() {
            tracing::warn!(root = %self.root.display(), "migrations directory does not exist");
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| {
            MigrateError::Repository(format!("Failed to read migrations directory: {}", e))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                MigrateError::Repository(format!("Failed to read directory entry: {}", e))
            })?;

            if !entry.path().is_dir() {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    return Err(MigrateError::Repository(format!(
                        "Change-set directory name is not valid UTF-8: {:?}",
                        raw
                    )))
                }
            }
        }

        names.sort();
        Ok(names)
    }

    fn load_script(&self, name: &str, direction: MigrationDirection) -> MigrateResult<String> {
        read_script(name, self.script_path(name, direction))
    }
}

/// Read a script file, mapping a missing file to `ScriptMissing`
pub(crate) fn read_script(name: &str, path: PathBuf) -> MigrateResult<String> {
    match fs::read_to_string(&path) {
        Ok(sql) => Ok(sql),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(MigrateError::ScriptMissing {
            name: name.to_string(),
            path,
        }),
        Err(e) => Err(MigrateError::Repository(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

fn script_template(change_set: &str, direction: MigrationDirection) -> String {
    let purpose = match direction {
        MigrationDirection::Up => "Add your schema changes here",
        MigrationDirection::Down => "Undo everything up.sql does, in reverse order",
    };

    format!(
        "-- Change-set: {}\n-- Direction: {}\n-- Created: {}\n\n-- {}\n",
        change_set,
        direction,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        purpose
    )
}
