//! Recursive discovery of the HTML files in a working tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::{Result, SitegraftError};

const HTML_PATTERNS: [&str; 2] = ["**/*.html", "**/*.htm"];

/// Finds every `.html`/`.htm` file below `dir`.
///
/// Extensions match case-insensitively and dot-files as well as files inside
/// dot-directories are included. The result is sorted and free of duplicates.
pub fn find_html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let root = dir
        .to_str()
        .ok_or_else(|| SitegraftError::WalkError(format!("path is not valid UTF-8: {}", dir.display())))?;
    let options = MatchOptions { case_sensitive: false, require_literal_separator: true, require_literal_leading_dot: false };

    let mut files = BTreeSet::new();
    for pattern in HTML_PATTERNS {
        let full = format!("{}/{}", Pattern::escape(root), pattern);
        let entries = glob::glob_with(&full, options).map_err(|e| SitegraftError::WalkError(e.to_string()))?;

        for entry in entries {
            let path = entry.map_err(|e| SitegraftError::WalkError(e.to_string()))?;
            if path.is_file() {
                files.insert(path);
            }
        }
    }

    Ok(files.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<p>x</p>").unwrap();
    }

    #[test]
    fn test_finds_nested_and_hidden_files() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "index.html");
        touch(tmp.path(), "blog/post.htm");
        touch(tmp.path(), "deep/er/PAGE.HTML");
        touch(tmp.path(), ".hidden/secret.html");
        touch(tmp.path(), ".dotfile.html");
        touch(tmp.path(), "style.css");
        touch(tmp.path(), "notes.html.txt");
        fs::create_dir_all(tmp.path().join("folder.html")).unwrap();

        let found: Vec<String> = find_html_files(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(
            found,
            vec![".dotfile.html", ".hidden/secret.html", "blog/post.htm", "deep/er/PAGE.HTML", "index.html"]
        );
    }

    #[test]
    fn test_empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(find_html_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_special_characters_in_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("site [v1]");
        touch(&root, "a.html");
        assert_eq!(find_html_files(&root).unwrap().len(), 1);
    }
}
