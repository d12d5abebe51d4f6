use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::encoding::profile_key;
use crate::error::PolicyError;

/// One profile's learned values, keyed by state key.
pub type PolicyTable = HashMap<String, f64>;

/// File name for a profile's table, with the profile parameters embedded:
/// `AI_S{speed}_R{rate}.ai`.
pub fn policy_filename(profile: &str) -> String {
    format!("AI_{profile}.ai")
}

/// Parse a policy file name of the form `AI_S<digits>_R<digits>.<digits>.ai`
/// into its (speed, success rate) metadata. Anything else is not a policy
/// file.
pub fn parse_policy_filename(name: &str) -> Option<(u32, f64)> {
    let rest = name.strip_prefix("AI_S")?.strip_suffix(".ai")?;
    let (speed, rate) = rest.split_once("_R")?;

    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let (rate_int, rate_frac) = rate.split_once('.')?;
    if !is_digits(speed) || !is_digits(rate_int) || !is_digits(rate_frac) {
        return None;
    }

    Some((speed.parse().ok()?, rate.parse().ok()?))
}

/// The durable policy dictionary: one value table per profile, persisted as
/// one JSON file per profile under the store directory. Owned by the
/// training/evaluation harness and handed to agents by reference.
#[derive(Debug)]
pub struct PolicyStore {
    dir: PathBuf,
    tables: HashMap<String, PolicyTable>,
}

impl PolicyStore {
    /// Open a store rooted at `dir`, creating the directory if absent and
    /// loading every valid policy file in it. Unreadable or corrupt files
    /// are skipped with a diagnostic; they never abort the load.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PolicyError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let tables = read_tables(&dir)?;
        Ok(PolicyStore { dir, tables })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Make sure a profile has a table, creating an empty one if needed.
    pub fn ensure_profile(&mut self, profile: &str) {
        self.tables.entry(profile.to_string()).or_default();
    }

    /// Stored value for a state key; unseen keys default to 0.
    pub fn value(&self, profile: &str, key: &str) -> f64 {
        self.tables
            .get(profile)
            .and_then(|table| table.get(key))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn table(&self, profile: &str) -> Option<&PolicyTable> {
        self.tables.get(profile)
    }

    pub fn table_mut(&mut self, profile: &str) -> &mut PolicyTable {
        self.tables.entry(profile.to_string()).or_default()
    }

    pub fn profile_count(&self) -> usize {
        self.tables.len()
    }

    /// Persist every in-memory table, overwriting the files on disk.
    ///
    /// Before writing, on-disk tables are re-read and gap-fill merged into
    /// memory: a disk value is copied only for keys absent from the
    /// in-memory table, so concurrent training runs lose nothing but never
    /// clobber fresher in-memory values.
    pub fn save(&mut self) -> Result<(), PolicyError> {
        for (profile, table) in read_tables(&self.dir)? {
            let in_memory = self.tables.entry(profile).or_default();
            for (key, value) in table {
                in_memory.entry(key).or_insert(value);
            }
        }

        fs::create_dir_all(&self.dir)?;
        for (profile, table) in &self.tables {
            let path = self.dir.join(policy_filename(profile));
            let json = serde_json::to_string_pretty(table)?;
            fs::write(&path, json).map_err(|source| PolicyError::FileWrite {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Scan a directory for policy files. Profile keys are regenerated from the
/// speed/rate parsed out of each file name, never from file contents.
fn read_tables(dir: &Path) -> Result<HashMap<String, PolicyTable>, PolicyError> {
    let mut tables = HashMap::new();
    if !dir.is_dir() {
        return Ok(tables);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some((speed, rate)) = parse_policy_filename(&file_name.to_string_lossy()) else {
            continue;
        };
        let path = entry.path();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(source) => {
                let err = PolicyError::FileRead { path, source };
                eprintln!("Warning: skipping policy file: {err}");
                continue;
            }
        };
        let table: PolicyTable = match serde_json::from_str(&content) {
            Ok(table) => table,
            Err(source) => {
                let err = PolicyError::FileParse { path, source };
                eprintln!("Warning: skipping policy file: {err}");
                continue;
            }
        };

        tables.insert(profile_key(speed as f64, rate), table);
    }
    Ok(tables)
}
