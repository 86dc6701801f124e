//! Fixture builders: a stand-in 7z binary and manifest "archives" it understands
//!
//! A manifest archive is a text file with one entry per line, `path|content`.
//! Extracting it writes each `path` below the output directory. `\n` inside
//! `content` becomes a newline, so an entry can itself be a manifest archive
//! (used for nested volume sets).

use std::path::{Path, PathBuf};

/// Password the stand-in binary accepts
pub const PASSWORD: &str = "letmein";

const FAKE_7Z: &str = r#"#!/bin/sh
# usage: fake-7z x <archive> -o<dir> -p<password> -y
archive="$2"
out="${3#-o}"
case "$(basename "$archive")" in
  slow*) sleep 5 ;;
  bad*) echo "ERROR: Data Error in encrypted file. Wrong password? : $archive" >&2; exit 2 ;;
esac
if [ "$4" != "-pletmein" ]; then
  echo "ERROR: Wrong password : $archive" >&2
  exit 2
fi
mkdir -p "$out"
while IFS= read -r line || [ -n "$line" ]; do
  [ -z "$line" ] && continue
  rel="${line%%|*}"
  body="${line#*|}"
  mkdir -p "$out/$(dirname "$rel")"
  printf '%b' "$body" > "$out/$rel"
done < "$archive"
"#;

/// Write the stand-in 7z script into `dir` and return its path
#[cfg(unix)]
pub fn install_fake_7z(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-7z");
    std::fs::write(&script, FAKE_7Z).expect("Failed to write fake 7z");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake 7z executable");
    script
}

/// Encode entries in the manifest format
pub fn manifest(entries: &[(&str, &str)]) -> String {
    entries
        .iter()
        .map(|(path, content)| format!("{}|{}\n", path, content.replace('\n', "\\n")))
        .collect()
}

/// Write a manifest archive named `name` into `dir`
pub fn write_archive(dir: &Path, name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create archive parent");
    }
    std::fs::write(&path, manifest(entries)).expect("Failed to write archive");
    path
}

/// Write a regular file, creating parent directories
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

/// Write `batch-unpack.toml` into `dir` with the stand-in binary wired in
pub fn write_config(dir: &Path, fake_7z: &Path, extra: &str) -> PathBuf {
    let path = dir.join("batch-unpack.toml");
    let contents = format!(
        "password = \"{}\"\nsevenzip_path = \"{}\"\n{}\n",
        PASSWORD,
        fake_7z.display(),
        extra
    );
    std::fs::write(&path, contents).expect("Failed to write config");
    path
}
