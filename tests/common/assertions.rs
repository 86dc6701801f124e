//! Directory tree assertions

use std::path::Path;
use walkdir::WalkDir;

/// Every regular file below `root`, as sorted `/`-separated relative paths
pub fn tree(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .expect("walkdir entry outside root")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}

/// Assert the file tree below `root` is exactly `expected`
pub fn assert_tree(root: &Path, expected: &[&str]) {
    let actual = tree(root);
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(actual, expected, "unexpected tree under {}", root.display());
}

/// Read a file to a string, panicking with the path on failure
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}
