/// Extension-based categorization of files.
///
/// A [`CategoryRuleSet`] maps category names (which double as folder names) to sets of
/// normalized extensions. It starts from [`BUILTIN_CATEGORIES`] and custom categories
/// replace built-in ones with the same name as a whole.
///
/// # Examples
///
/// ```
/// use safetidy::file_category::{CategoryRuleSet, CustomCategory, FALLBACK_CATEGORY};
///
/// let rules = CategoryRuleSet::builtin();
/// assert_eq!(rules.resolve(".JPG"), Some("Images"));
/// assert_eq!(rules.category_for(".xyz"), FALLBACK_CATEGORY);
///
/// let custom = vec![CustomCategory::new("Documents", ["md"])];
/// let rules = CategoryRuleSet::build(&custom).unwrap();
/// assert_eq!(rules.resolve(".pdf"), None);
/// ```
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

use crate::error::{OrganizeError, OrganizeResult};

/// Category used for files whose extension matches no rule.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Extensions that are never categorized, moved or reported.
pub const BLOCKED_EXTENSIONS: &[&str] = &[".exe", ".dll", ".sys", ".app", ".deb", ".msi"];

/// Built-in categories, in lookup order.
pub const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    ("Images", &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".icon"]),
    ("Videos", &[".mp4", ".mov", ".mkv", ".avi"]),
    ("Audio", &[".mp3", ".flp", ".wav", ".aup"]),
    (
        "Documents",
        &[".docx", ".pdf", ".pptx", ".csv", ".txt", ".doc", ".ppt"],
    ),
    ("Archives", &[".zip", ".rar", ".7z", ".tar", ".gz", ".sitx"]),
    ("Executables", &[".jar", ".sh", ".bat"]),
];

/// Normalizes an extension to lowercase, leading-dot form.
///
/// Lowercasing is ASCII-only. Empty input stays empty so it never matches a category.
///
/// ```
/// use safetidy::file_category::normalize_extension;
///
/// assert_eq!(normalize_extension("PDF"), ".pdf");
/// assert_eq!(normalize_extension(" .Md "), ".md");
/// assert_eq!(normalize_extension(""), "");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.is_empty() {
        return String::new();
    }
    let lower = ext.to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// Extracts the normalized extension of a file name.
///
/// The extension starts at the last dot, unless that dot is the first character, so
/// `.bashrc` and `README` have no extension.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => normalize_extension(&file_name[idx..]),
        _ => String::new(),
    }
}

/// Returns true if the extension must never be touched.
pub fn is_blocked(ext: &str) -> bool {
    let ext = normalize_extension(ext);
    BLOCKED_EXTENSIONS.contains(&ext.as_str())
}

/// A user-defined category, as entered at the prompt, on the command line or in a
/// configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCategory {
    pub name: String,
    pub extensions: Vec<String>,
}

impl CustomCategory {
    pub fn new<I, S>(name: &str, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.trim().to_string(),
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().to_string())
                .collect(),
        }
    }

    /// Parses a comma-separated extension list such as `".pdf, docx,TXT"`.
    /// Blank items are ignored.
    pub fn from_list(name: &str, list: &str) -> Self {
        Self::new(name, list.split(',').filter(|item| !item.trim().is_empty()))
    }

    /// Parses the `NAME=ext,ext` command-line form.
    pub fn parse_assignment(assignment: &str) -> OrganizeResult<Self> {
        let (name, list) = assignment
            .split_once('=')
            .ok_or_else(|| OrganizeError::InvalidCategory {
                name: assignment.to_string(),
                reason: "expected NAME=ext,ext".to_string(),
            })?;
        Ok(Self::from_list(name, list))
    }
}

/// Checks that a category name can be used as a single folder below the root.
fn validate_category_name(name: &str) -> OrganizeResult<()> {
    let invalid = |reason: &str| OrganizeError::InvalidCategory {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("name must not contain path separators"));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid("name must be a plain folder name")),
    }
}

/// One named category and its normalized extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub name: String,
    pub extensions: Vec<String>,
}

/// The effective, ordered set of category rules for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRuleSet {
    rules: Vec<CategoryRule>,
}

impl CategoryRuleSet {
    /// The built-in rules only.
    pub fn builtin() -> Self {
        let rules = BUILTIN_CATEGORIES
            .iter()
            .map(|(name, exts)| CategoryRule {
                name: (*name).to_string(),
                extensions: normalize_all(exts.iter()),
            })
            .collect();
        Self { rules }
    }

    /// Built-in rules overlaid with custom categories.
    ///
    /// A custom category whose name matches an existing one replaces that category's
    /// extensions and keeps its position; new names are appended in the given order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCategory` for names that are empty or not a plain folder name.
    pub fn build(custom: &[CustomCategory]) -> OrganizeResult<Self> {
        let mut set = Self::builtin();
        for category in custom {
            set.insert(category)?;
        }
        Ok(set)
    }

    fn insert(&mut self, category: &CustomCategory) -> OrganizeResult<()> {
        let name = category.name.trim();
        validate_category_name(name)?;
        let extensions = normalize_all(category.extensions.iter());

        match self.rules.iter_mut().find(|rule| rule.name == name) {
            Some(rule) => rule.extensions = extensions,
            None => self.rules.push(CategoryRule {
                name: name.to_string(),
                extensions,
            }),
        }
        Ok(())
    }

    /// Rules in lookup order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Finds the first category containing the extension (case-insensitive).
    pub fn resolve(&self, ext: &str) -> Option<&str> {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.extensions.contains(&ext))
            .map(|rule| rule.name.as_str())
    }

    /// Like [`resolve`](Self::resolve), but falls back to [`FALLBACK_CATEGORY`].
    pub fn category_for(&self, ext: &str) -> &str {
        self.resolve(ext).unwrap_or(FALLBACK_CATEGORY)
    }

    /// Extensions claimed by more than one category, with the categories claiming them.
    /// Lookups still use the first match.
    pub fn duplicate_extensions(&self) -> Vec<(String, Vec<String>)> {
        let mut duplicates: Vec<(String, Vec<String>)> = Vec::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            for ext in &rule.extensions {
                if duplicates.iter().any(|(seen, _)| seen == ext) {
                    continue;
                }
                let owners: Vec<String> = self.rules[idx..]
                    .iter()
                    .filter(|other| other.extensions.contains(ext))
                    .map(|other| other.name.clone())
                    .collect();
                if owners.len() > 1 {
                    duplicates.push((ext.clone(), owners));
                }
            }
        }
        duplicates
    }
}

impl Default for CategoryRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_all<I, S>(exts: I) -> Vec<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for ext in exts {
        let ext = normalize_extension(ext.as_ref());
        if !ext.is_empty() && !normalized.contains(&ext) {
            normalized.push(ext);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("pdf"), ".pdf");
        assert_eq!(normalize_extension(".PDF"), ".pdf");
        assert_eq!(normalize_extension("  Jpg "), ".jpg");
        assert_eq!(normalize_extension("   "), "");
    }

    #[test]
    fn test_normalize_extension_is_ascii_only() {
        assert_eq!(normalize_extension("ÄBC"), ".Äbc");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG"), ".jpg");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of("trailing."), ".");
    }

    #[test]
    fn test_blocked_extensions() {
        assert!(is_blocked(".exe"));
        assert!(is_blocked("EXE"));
        assert!(is_blocked(".Msi"));
        assert!(!is_blocked(".jar"));
        assert!(!is_blocked(""));
    }

    #[test]
    fn test_builtin_resolution() {
        let rules = CategoryRuleSet::builtin();
        assert_eq!(rules.resolve(".jpg"), Some("Images"));
        assert_eq!(rules.resolve(".MOV"), Some("Videos"));
        assert_eq!(rules.resolve("mp3"), Some("Audio"));
        assert_eq!(rules.resolve(".doc"), Some("Documents"));
        assert_eq!(rules.resolve(".7z"), Some("Archives"));
        assert_eq!(rules.resolve(".sh"), Some("Executables"));
        assert_eq!(rules.resolve(".unknownext"), None);
        assert_eq!(rules.resolve(""), None);
    }

    #[test]
    fn test_category_for_falls_back_to_others() {
        let rules = CategoryRuleSet::builtin();
        assert_eq!(rules.category_for(".xyz"), "Others");
        assert_eq!(rules.category_for(""), "Others");
        assert_eq!(rules.category_for(".png"), "Images");
    }

    #[test]
    fn test_custom_category_replaces_builtin() {
        let custom = vec![CustomCategory::new("Documents", [".md"])];
        let rules = CategoryRuleSet::build(&custom).unwrap();

        assert_eq!(rules.resolve(".md"), Some("Documents"));
        assert_eq!(rules.resolve(".pdf"), None);
        assert_eq!(rules.category_for(".pdf"), "Others");
        // Overridden category keeps its slot
        assert_eq!(rules.rules()[3].name, "Documents");
        assert_eq!(rules.rules().len(), BUILTIN_CATEGORIES.len());
    }

    #[test]
    fn test_new_custom_categories_are_appended_in_order() {
        let custom = vec![
            CustomCategory::from_list("Notes", "md, ORG"),
            CustomCategory::from_list("Books", ".epub"),
        ];
        let rules = CategoryRuleSet::build(&custom).unwrap();
        let names: Vec<_> = rules.rules().iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names[names.len() - 2..], ["Notes", "Books"]);
        assert_eq!(rules.resolve(".org"), Some("Notes"));
        assert_eq!(rules.resolve(".EPUB"), Some("Books"));
    }

    #[test]
    fn test_later_custom_entry_wins_for_same_name() {
        let custom = vec![
            CustomCategory::from_list("Notes", "md"),
            CustomCategory::from_list("Notes", "org"),
        ];
        let rules = CategoryRuleSet::build(&custom).unwrap();
        assert_eq!(rules.resolve(".md"), None);
        assert_eq!(rules.resolve(".org"), Some("Notes"));
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let custom = vec![CustomCategory::from_list("Photos", "jpg,heic")];
        let rules = CategoryRuleSet::build(&custom).unwrap();

        assert_eq!(rules.resolve(".jpg"), Some("Images"));
        assert_eq!(rules.resolve(".heic"), Some("Photos"));
        assert_eq!(
            rules.duplicate_extensions(),
            vec![(
                ".jpg".to_string(),
                vec!["Images".to_string(), "Photos".to_string()]
            )]
        );
    }

    #[test]
    fn test_builtin_has_no_duplicates() {
        assert!(CategoryRuleSet::builtin().duplicate_extensions().is_empty());
    }

    #[test]
    fn test_empty_extension_list_disables_category() {
        let custom = vec![CustomCategory::from_list("Images", "")];
        let rules = CategoryRuleSet::build(&custom).unwrap();
        assert!(rules.rules()[0].extensions.is_empty());
        assert_eq!(rules.category_for(".jpg"), "Others");
    }

    #[test]
    fn test_invalid_category_names() {
        for name in ["", "  ", "..", ".", "a/b", "a\\b", "/abs"] {
            let custom = vec![CustomCategory::from_list(name, "md")];
            assert!(
                matches!(
                    CategoryRuleSet::build(&custom),
                    Err(OrganizeError::InvalidCategory { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_assignment() {
        let category = CustomCategory::parse_assignment("Notes=md, .org").unwrap();
        assert_eq!(category.name, "Notes");
        assert_eq!(category.extensions, vec!["md", " .org"]);

        assert!(CustomCategory::parse_assignment("Notes").is_err());
    }
}
