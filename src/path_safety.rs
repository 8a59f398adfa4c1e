//! Safety gate for the directory being organized.
//!
//! A root is accepted only when its canonical form sits inside one of the allowed
//! directories and outside every dangerous system prefix. The allowlist is compared on
//! path components, so `/home/me/Desktopx` never matches `/home/me/Desktop`. Dangerous
//! prefixes are compared on the path string, so `/opt` also rejects `/optical`.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{OrganizeError, OrganizeResult};

/// Directories under the user's home that are allowed by default.
pub const DEFAULT_SAFE_SUBDIRECTORIES: &[&str] = &["Desktop", "Downloads"];

/// Prefixes that are always rejected, even below an allowed directory.
pub const DANGEROUS_PATH_PREFIXES: &[&str] =
    &["/bin", "/etc", "/lib", "/usr", "/sbin", "/System", "/opt"];

/// Allowlist and denylist used to approve a root directory.
///
/// Both lists are fixed when the policy is built; allowed directories are stored in
/// canonical form and entries that do not resolve are dropped.
#[derive(Debug, Clone, Default)]
pub struct SafetyPolicy {
    allowed: Vec<PathBuf>,
    dangerous: Vec<PathBuf>,
}

impl SafetyPolicy {
    /// Builds a policy from explicit allowed directories and dangerous prefixes.
    pub fn new<A, D>(allowed: A, dangerous: D) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<Path>,
        D: IntoIterator,
        D::Item: AsRef<Path>,
    {
        let mut policy = Self::default();
        policy.extend_allowed(allowed);

        for prefix in dangerous {
            let prefix = prefix.as_ref();
            push_unique(&mut policy.dangerous, prefix.to_path_buf());
            // `/etc` may itself be a symlink (e.g. to `/private/etc`)
            if let Ok(resolved) = fs::canonicalize(prefix) {
                push_unique(&mut policy.dangerous, resolved);
            }
        }
        policy
    }

    /// Default policy for a home directory: `~/Desktop` and `~/Downloads` are allowed,
    /// the standard system prefixes are denied.
    pub fn from_home(home: &Path) -> Self {
        Self::new(
            DEFAULT_SAFE_SUBDIRECTORIES.iter().map(|dir| home.join(dir)),
            DANGEROUS_PATH_PREFIXES,
        )
    }

    /// Default policy for the current user. Without a home directory nothing is allowed.
    pub fn from_environment() -> Self {
        match dirs::home_dir() {
            Some(home) => Self::from_home(&home),
            None => {
                debug!("no home directory found, allowlist is empty");
                Self::new(std::iter::empty::<PathBuf>(), DANGEROUS_PATH_PREFIXES)
            }
        }
    }

    /// Adds more allowed directories. They are canonicalized like the defaults and
    /// remain subject to the dangerous-prefix check.
    pub fn with_allowed_directories<A>(mut self, extra: A) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<Path>,
    {
        self.extend_allowed(extra);
        self
    }

    /// The effective, canonical allowlist.
    pub fn allowed_directories(&self) -> &[PathBuf] {
        &self.allowed
    }

    /// The dangerous prefixes, literal and resolved forms.
    pub fn dangerous_prefixes(&self) -> &[PathBuf] {
        &self.dangerous
    }

    /// Returns true only if `raw_path` resolves inside an allowed directory and outside
    /// every dangerous prefix. Resolution failures are treated as unsafe.
    ///
    /// # Examples
    ///
    /// ```
    /// use safetidy::path_safety::SafetyPolicy;
    /// use std::path::Path;
    ///
    /// let policy = SafetyPolicy::from_home(Path::new("/nonexistent-home"));
    /// assert!(!policy.is_safe(Path::new("/etc")));
    /// ```
    pub fn is_safe(&self, raw_path: &Path) -> bool {
        self.approved_canonical(raw_path).is_some()
    }

    /// Validates a root directory for an organization run and returns its canonical form.
    ///
    /// # Errors
    ///
    /// `SafetyRejection` if the path is not approved, `InvalidRoot` if it is approved but
    /// not an existing directory.
    pub fn validate(&self, raw_path: &Path) -> OrganizeResult<PathBuf> {
        let canonical =
            self.approved_canonical(raw_path)
                .ok_or_else(|| OrganizeError::SafetyRejection {
                    path: raw_path.to_path_buf(),
                })?;

        if !canonical.is_dir() {
            return Err(OrganizeError::InvalidRoot {
                path: raw_path.to_path_buf(),
            });
        }
        Ok(canonical)
    }

    fn approved_canonical(&self, raw_path: &Path) -> Option<PathBuf> {
        let canonical = match fs::canonicalize(raw_path) {
            Ok(path) => path,
            Err(e) => {
                debug!("cannot resolve {}: {}", raw_path.display(), e);
                return None;
            }
        };

        let allowed = self
            .allowed
            .iter()
            .find(|dir| is_within(&canonical, dir))?;

        if let Some(prefix) = self
            .dangerous
            .iter()
            .find(|p| has_string_prefix(&canonical, p))
        {
            debug!(
                "{} is under allowed {} but matches dangerous prefix {}",
                canonical.display(),
                allowed.display(),
                prefix.display()
            );
            return None;
        }

        Some(canonical)
    }

    fn extend_allowed<A>(&mut self, dirs: A)
    where
        A: IntoIterator,
        A::Item: AsRef<Path>,
    {
        for dir in dirs {
            let dir = dir.as_ref();
            match fs::canonicalize(dir) {
                Ok(resolved) => push_unique(&mut self.allowed, resolved),
                Err(e) => debug!("dropping allowed directory {}: {}", dir.display(), e),
            }
        }
    }
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

/// Component-wise prefix test: true when `path` equals `base` or is nested below it.
pub fn is_within(path: &Path, base: &Path) -> bool {
    let mut path_components = path.components();
    base.components()
        .all(|base_comp| path_components.next() == Some(base_comp))
}

/// String prefix test used for the denylist; broader than [`is_within`].
fn has_string_prefix(path: &Path, prefix: &Path) -> bool {
    path.to_string_lossy()
        .starts_with(prefix.to_string_lossy().as_ref())
}

/// Expands a leading `~` or `~/` to the home directory; other input is returned as-is.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
