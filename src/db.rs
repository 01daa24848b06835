use crate::config::{is_valid_var_name, ActiveProfile, EnvProfile, StoreSnapshot, Var};
use crate::error::StoreError;
use rusqlite::{params, types::Type, Connection, OpenFlags, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

/// Stored in `PRAGMA user_version`; anything else is refused as malformed.
const SCHEMA_VERSION: i64 = 1;

/// The SQLite file holding every profile plus the active-profile bookkeeping.
///
/// Each invocation loads a snapshot, decides, and writes a complete new
/// database next to the store before renaming it into place, so a reader
/// only ever sees the old or the new file.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole store. A missing file is an empty store.
    pub fn load(&self) -> Result<StoreSnapshot, StoreError> {
        if !self.path.exists() {
            log::debug!("no profile store at {}, starting empty", self.path.display());
            return Ok(StoreSnapshot::default());
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| self.read_error(source))?;

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|source| self.read_error(source))?;
        if version != SCHEMA_VERSION {
            return Err(self.malformed(format!("unsupported schema version {version}")));
        }

        let profiles = load_all_profiles(&conn).map_err(|e| self.classify(e))?;
        for profile in &profiles {
            profile
                .validate()
                .map_err(|e| self.malformed(format!("profile `{}`: {e}", profile.name)))?;
        }

        let active = load_active(&conn).map_err(|e| self.classify(e))?;
        if let Some(active) = &active {
            if let Some(bad) = active.injected.iter().find(|n| !is_valid_var_name(n)) {
                return Err(self.malformed(format!("invalid injected variable name `{bad}`")));
            }
        }

        log::debug!(
            "loaded {} profile(s) from {}",
            profiles.len(),
            self.path.display()
        );
        Ok(StoreSnapshot { profiles, active })
    }

    /// Persist a snapshot by building a fresh database beside the store and
    /// renaming it over the old one.
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;
        }

        let tmp = self.temp_path();
        remove_temp(&tmp);

        let result = self
            .write_snapshot(&tmp, snapshot)
            .and_then(|()| restrict_permissions(&tmp).map_err(|source| self.io_error(source)))
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source)));
        if result.is_err() {
            remove_temp(&tmp);
        } else {
            log::debug!(
                "saved {} profile(s) to {}",
                snapshot.profiles.len(),
                self.path.display()
            );
        }
        result
    }

    /// Per-process temp file, so overlapping invocations never share one.
    pub(crate) fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "profiles.db".to_string());
        self.path
            .with_file_name(format!("{file_name}.tmp-{}", std::process::id()))
    }

    fn write_snapshot(&self, tmp: &Path, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let mut conn = Connection::open(tmp).map_err(write_error)?;
        initialize_db(&conn).map_err(write_error)?;

        let tx = conn.transaction().map_err(write_error)?;
        for (i, profile) in snapshot.profiles.iter().enumerate() {
            save_profile(&tx, i as i64 + 1, profile).map_err(|e| self.classify_write(e))?;
        }
        if let Some(active) = &snapshot.active {
            save_active(&tx, active).map_err(|e| self.classify_write(e))?;
        }
        tx.commit().map_err(write_error)?;

        conn.close().map_err(|(_, source)| write_error(source))
    }

    fn read_error(&self, source: rusqlite::Error) -> StoreError {
        StoreError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn malformed(&self, reason: String) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            reason,
        }
    }

    /// Undecodable row contents mean a malformed store; everything else is a read failure.
    fn classify(&self, err: rusqlite::Error) -> StoreError {
        match err {
            rusqlite::Error::FromSqlConversionFailure(_, _, inner) => {
                self.malformed(inner.to_string())
            }
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table") => {
                self.malformed(msg)
            }
            other => self.read_error(other),
        }
    }

    fn classify_write(&self, err: rusqlite::Error) -> StoreError {
        match err {
            rusqlite::Error::ToSqlConversionFailure(inner) => self.malformed(inner.to_string()),
            other => StoreError::Write {
                path: self.path.clone(),
                source: other,
            },
        }
    }
}

/// Profiles hold tokens and passwords, so the store is readable by its owner only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn remove_temp(tmp: &Path) {
    for path in [tmp.to_path_buf(), journal_path(tmp)] {
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::debug!("could not remove {}: {e}", path.display());
            }
        }
    }
}

fn journal_path(db: &Path) -> PathBuf {
    let mut name = db.as_os_str().to_owned();
    name.push("-journal");
    PathBuf::from(name)
}

/// Create the tables and stamp the schema version.
pub fn initialize_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            entries TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS active (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            name TEXT NOT NULL,
            injected TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    Ok(())
}

/// Insert a profile at a fixed position.
fn save_profile(conn: &Connection, id: i64, profile: &EnvProfile) -> rusqlite::Result<()> {
    let entries_json = serde_json::to_string(&profile.vars)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT INTO profiles (id, name, entries) VALUES (?1, ?2, ?3)",
        params![id, profile.name, entries_json],
    )?;
    Ok(())
}

fn save_active(conn: &Connection, active: &ActiveProfile) -> rusqlite::Result<()> {
    let injected_json = serde_json::to_string(&active.injected)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute(
        "INSERT INTO active (id, name, injected) VALUES (1, ?1, ?2)",
        params![active.name, injected_json],
    )?;
    Ok(())
}

/// Load all profiles in insertion order.
fn load_all_profiles(conn: &Connection) -> rusqlite::Result<Vec<EnvProfile>> {
    let mut stmt = conn.prepare("SELECT name, entries FROM profiles ORDER BY id")?;
    let profile_iter = stmt.query_map([], |row| {
        let name: String = row.get(0)?;
        let entries_json: String = row.get(1)?;
        let vars: Vec<Var> = serde_json::from_str(&entries_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
        Ok(EnvProfile { name, vars })
    })?;
    let mut profiles = Vec::new();
    for profile in profile_iter {
        profiles.push(profile?);
    }
    Ok(profiles)
}

fn load_active(conn: &Connection) -> rusqlite::Result<Option<ActiveProfile>> {
    conn.query_row(
        "SELECT name, injected FROM active WHERE id = 1",
        [],
        |row| {
            let name: String = row.get(0)?;
            let injected_json: String = row.get(1)?;
            let injected: Vec<String> = serde_json::from_str(&injected_json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
            })?;
            Ok(ActiveProfile { name, injected })
        },
    )
    .optional()
}
