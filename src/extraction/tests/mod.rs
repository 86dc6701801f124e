use crate::error::{Error, ExtractionError};
use crate::extraction::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"x").unwrap();
}

/// Write an executable shell script standing in for the 7z binary
///
/// Archives whose name starts with `slow` sleep, `bad` ones fail like a wrong
/// password, anything else produces `extracted.txt` holding the password flag.
#[cfg(unix)]
fn fake_7z(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-7z");
    std::fs::write(
        &script,
        r#"#!/bin/sh
out="${3#-o}"
case "$(basename "$2")" in
  slow*) sleep 5 ;;
  bad*) echo "ERROR: Wrong password : $2" >&2; exit 2 ;;
esac
mkdir -p "$out"
echo "$4" > "$out/extracted.txt"
"#,
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

// ---------------------------------------------------------------------------
// Candidate selection
// ---------------------------------------------------------------------------

#[test]
fn test_numeric_stems_are_candidates() {
    for name in ["031.gz", "125.zip", "7.7z", "221.GZ", "0.zip"] {
        assert!(is_archive_candidate(name, false), "{name}");
        assert!(is_archive_candidate(name, true), "{name}");
    }
}

#[test]
fn test_mixed_stems_need_allow_mixed() {
    for name in ["022咬.gz", "photos.zip", "12a.7z", "1 2.zip"] {
        assert!(!is_archive_candidate(name, false), "{name}");
        assert!(is_archive_candidate(name, true), "{name}");
    }
}

#[test]
fn test_unrecognized_extensions_are_never_candidates() {
    for name in ["031.rar", "031.txt", "031", "set.7z.001", ".zip"] {
        assert!(!is_archive_candidate(name, true), "{name}");
    }
}

#[tokio::test]
async fn test_select_archives_filters_and_sorts() {
    let temp = TempDir::new().unwrap();
    for name in ["221.gz", "031.zip", "100.7z", "022咬.gz", "notes.txt"] {
        touch(&temp.path().join(name));
    }
    // directories named like archives are ignored
    std::fs::create_dir_all(temp.path().join("300.zip")).unwrap();

    let strict = select_archives(temp.path(), false).await.unwrap();
    assert_eq!(strict, vec!["031.zip", "100.7z", "221.gz"]);

    let mixed = select_archives(temp.path(), true).await.unwrap();
    assert_eq!(mixed.len(), 4);
    assert!(mixed.contains(&"022咬.gz".to_string()));
}

// ---------------------------------------------------------------------------
// Volume sets
// ---------------------------------------------------------------------------

#[test]
fn test_parse_volume_part() {
    assert_eq!(parse_volume_part("photos.7z.001"), Some(("photos", 1)));
    assert_eq!(parse_volume_part("a.b.7z.012"), Some(("a.b", 12)));
    assert_eq!(parse_volume_part("photos.7z"), None);
    assert_eq!(parse_volume_part("photos.zip.001"), None);
    assert!(is_volume_part("Some Name [40P].7z.003"));
    assert!(!is_volume_part("photos.7z.001.txt"));
}

#[tokio::test]
async fn test_find_volume_set_in_nested_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("inner").join("deeper");
    touch(&dir.join("Gallery.7z.002"));
    touch(&dir.join("Gallery.7z.001"));
    touch(&dir.join("Gallery.7z.010"));
    touch(&dir.join("readme.txt"));

    let set = find_volume_set(temp.path()).await.unwrap().unwrap();

    assert_eq!(set.dir, dir);
    assert_eq!(set.base_name, "Gallery");
    assert_eq!(
        set.files,
        vec![
            dir.join("Gallery.7z.001"),
            dir.join("Gallery.7z.002"),
            dir.join("Gallery.7z.010"),
        ]
    );
    assert_eq!(set.first_part(), Some(&dir.join("Gallery.7z.001")));
}

#[tokio::test]
async fn test_find_volume_set_stops_at_first_level_with_parts() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("top.7z.001"));
    touch(&temp.path().join("sub").join("other.7z.001"));

    let set = find_volume_set(temp.path()).await.unwrap().unwrap();
    assert_eq!(set.dir, temp.path());
    assert_eq!(set.base_name, "top");
}

#[tokio::test]
async fn test_find_volume_set_keeps_only_shared_base() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("b.7z.001"));
    touch(&temp.path().join("a.7z.002"));
    touch(&temp.path().join("a.7z.001"));

    let set = find_volume_set(temp.path()).await.unwrap().unwrap();
    assert_eq!(set.base_name, "a");
    assert_eq!(set.files.len(), 2);
}

#[tokio::test]
async fn test_find_volume_set_none() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("x").join("a.jpg"));
    touch(&temp.path().join("single.7z"));

    assert!(find_volume_set(temp.path()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_non_volume_files() {
    let temp = TempDir::new().unwrap();
    touch(&temp.path().join("set.7z.001"));
    touch(&temp.path().join("set.7z.002"));
    touch(&temp.path().join("ad.url"));
    touch(&temp.path().join("other.7z.001"));
    std::fs::create_dir_all(temp.path().join("subdir")).unwrap();

    let deleted = delete_non_volume_files(temp.path(), "set").await.unwrap();

    assert_eq!(deleted, 2);
    assert!(temp.path().join("set.7z.001").exists());
    assert!(temp.path().join("set.7z.002").exists());
    assert!(!temp.path().join("ad.url").exists());
    assert!(!temp.path().join("other.7z.001").exists());
    assert!(temp.path().join("subdir").is_dir());
}

// ---------------------------------------------------------------------------
// SevenZipExtractor against a stand-in binary
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[tokio::test]
async fn test_extract_success_passes_arguments() {
    let temp = TempDir::new().unwrap();
    let extractor = SevenZipExtractor::new(fake_7z(temp.path()));
    let archive = temp.path().join("221.zip");
    touch(&archive);
    let out = temp.path().join("out").join("221");

    extractor
        .extract(&archive, &out, "secret", Some(Duration::from_secs(5)))
        .await
        .unwrap();

    let marker = std::fs::read_to_string(out.join("extracted.txt")).unwrap();
    assert_eq!(marker.trim(), "-psecret");
    assert!(archive.exists(), "source archive must not be deleted");
}

#[cfg(unix)]
#[tokio::test]
async fn test_extract_failure_carries_diagnostics() {
    let temp = TempDir::new().unwrap();
    let extractor = SevenZipExtractor::new(fake_7z(temp.path()));
    let archive = temp.path().join("bad.zip");
    touch(&archive);

    let err = extractor
        .extract(&archive, &temp.path().join("bad"), "pw", None)
        .await
        .unwrap_err();

    match err {
        Error::Extraction(ExtractionError::Failed { archive: a, reason }) => {
            assert_eq!(a, archive);
            assert!(reason.contains("Wrong password"), "reason: {reason}");
        }
        other => panic!("expected extraction failure, got {:?}", other),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_extract_timeout_kills_process() {
    let temp = TempDir::new().unwrap();
    let extractor = SevenZipExtractor::new(fake_7z(temp.path()));
    let archive = temp.path().join("slow.7z");
    touch(&archive);

    let started = Instant::now();
    let err = extractor
        .extract(
            &archive,
            &temp.path().join("slow"),
            "pw",
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(!temp.path().join("slow").join("extracted.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_extract_resolves_relative_paths() {
    let bin = TempDir::new().unwrap();
    let extractor = SevenZipExtractor::new(fake_7z(bin.path()));

    // a scratch directory under the working directory, addressed relatively
    let work = TempDir::new_in(".").unwrap();
    let cwd = std::env::current_dir().unwrap();
    let rel_dir = work.path().strip_prefix(&cwd).unwrap().to_path_buf();
    assert!(rel_dir.is_relative());

    let archive = rel_dir.join("100.zip");
    touch(&archive);
    let out = rel_dir.join("100");

    extractor
        .extract(&archive, &out, "pw", Some(Duration::from_secs(5)))
        .await
        .unwrap();

    let marker = std::fs::read_to_string(out.join("extracted.txt")).unwrap();
    assert_eq!(marker.trim(), "-ppw");
    assert!(!rel_dir.join(&rel_dir).exists());
}

// Run with: cargo test --lib extraction -- --ignored
#[tokio::test]
#[ignore] // Requires a 7z binary in PATH
async fn integration_test_extract_real_zip() {
    let Some(extractor) = SevenZipExtractor::from_path() else {
        println!("Skipping test: 7z binary not found in PATH");
        return;
    };

    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("100.zip");
    {
        let file = std::fs::File::create(&archive).unwrap();
        let mut writer = ::zip::ZipWriter::new(file);
        let options = ::zip::write::FileOptions::default()
            .compression_method(::zip::CompressionMethod::Stored);
        writer.start_file("inner/a.jpg", options).unwrap();
        std::io::Write::write_all(&mut writer, b"image").unwrap();
        writer.finish().unwrap();
    }

    let out = temp.path().join("100");
    extractor
        .extract(&archive, &out, "unused", Some(Duration::from_secs(30)))
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(out.join("inner").join("a.jpg")).unwrap(),
        b"image"
    );
}
