use super::*;
use crate::executor::{CommandExecutor, CommandOutput};
use chrono::TimeZone;
use std::cell::RefCell;

fn now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 11, 5, 23, 59, 1).unwrap()
}

fn resolve(name: &str) -> Compression {
    CompressionResolver::default().resolve(name).unwrap()
}

#[derive(Default)]
struct RecordingExecutor {
    exit_code: i32,
    calls: RefCell<Vec<(String, Option<PathBuf>)>>,
}

impl CommandExecutor for RecordingExecutor {
    fn run(&self, command: &str, working_dir: Option<&Path>) -> Result<CommandOutput> {
        self.calls
            .borrow_mut()
            .push((command.to_string(), working_dir.map(Path::to_path_buf)));
        Ok(CommandOutput {
            exit_code: Some(self.exit_code),
            stdout: String::new(),
            stderr: "boom".to_string(),
        })
    }
}

// -------- Compression --------

#[test]
fn resolves_known_compressors() {
    let gzip = resolve("gzip");
    assert_eq!(gzip.suffix(), "gz");
    assert_eq!(gzip.command(), "gzip");
    assert_eq!(gzip.mime_type(), "application/x-gzip");
    assert!(gzip.is_pipeable());

    let bzip2 = resolve("bzip2");
    assert_eq!(bzip2.suffix(), "bz2");
    assert_eq!(bzip2.mime_type(), "application/x-bzip2");
    assert!(bzip2.is_pipeable());

    let xz = resolve("xz");
    assert_eq!(xz.suffix(), "xz");
    assert_eq!(xz.mime_type(), "application/x-xz");
    assert!(xz.is_pipeable());

    let zip = resolve("zip");
    assert_eq!(zip.suffix(), "zip");
    assert_eq!(zip.mime_type(), "application/zip");
    assert!(!zip.is_pipeable());
    assert!(zip.is_zip());

    for name in ["gzip", "bzip2", "xz", "zip"] {
        assert_eq!(resolve(name).successful_exit_codes(), &[0]);
    }
}

#[test]
fn resolves_binary_paths_and_keeps_the_command() {
    let gzip = resolve("/usr/local/bin/gzip");
    assert_eq!(gzip.name(), "gzip");
    assert_eq!(gzip.command(), "/usr/local/bin/gzip");
    assert_eq!(gzip.suffix(), "gz");
}

#[test]
fn rejects_unknown_compressors() {
    let resolver = CompressionResolver::default();
    for name in ["lzma", "", "/usr/bin/", "gzip2", "GZIP"] {
        match resolver.resolve(name) {
            Err(Error::UnsupportedCompression(id)) => assert_eq!(id, name),
            other => panic!("expected unsupported compression for {name:?}, got {other:?}"),
        }
    }
}

#[test]
fn resolver_uses_the_table_it_was_given() {
    static ONLY_ZSTD: &[CompressorSpec] = &[CompressorSpec {
        name: "zstd",
        suffix: "zst",
        mime_type: "application/zstd",
        pipeable: true,
        exit_codes: &[0, 2],
    }];
    let resolver = CompressionResolver::new(ONLY_ZSTD);
    let zstd = resolver.resolve("zstd").unwrap();
    assert_eq!(zstd.suffix(), "zst");
    assert_eq!(zstd.successful_exit_codes(), &[0, 2]);
    assert!(resolver.resolve("gzip").is_err());
}

// -------- Target --------

#[test]
fn empty_directory_or_filename_is_a_configuration_error() {
    assert!(matches!(
        Target::new("/backups", "", &now()),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        Target::new("/backups", "   ", &now()),
        Err(Error::Configuration(_))
    ));
    assert!(matches!(
        Target::new(" ", "backup.sql", &now()),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn compression_suffix_is_part_of_the_stored_name() {
    let target = Target::new("/backups", "backup.sql", &now())
        .unwrap()
        .with_compression(resolve("gzip"));
    assert_eq!(target.filename(), "backup.sql.gz");
    assert_eq!(target.filename_plain(), "backup.sql");
    assert_eq!(target.pathname(), PathBuf::from("/backups/backup.sql.gz"));
    assert_eq!(target.mime_type(), "application/x-gzip");
    assert!(target.is_compressed());
}

#[test]
fn uncompressed_target_keeps_plain_name() {
    let target = Target::new("/backups", "backup.sql", &now()).unwrap();
    assert_eq!(target.filename(), "backup.sql");
    assert_eq!(target.mime_type(), "text/plain");
    assert!(!target.is_compressed());
    assert!(!target.is_encrypted());
}

#[test]
fn crypt_suffix_follows_compression_suffix() {
    let target = Target::new("/backups", "backup.sql", &now())
        .unwrap()
        .with_compression(resolve("xz"))
        .with_crypt_suffix(".enc");
    assert_eq!(target.filename(), "backup.sql.xz.enc");
    assert_eq!(target.filename_decrypted(), "backup.sql.xz");
    assert_eq!(target.crypt_suffix(), Some("enc"));

    let cleared = target.with_crypt_suffix("  ");
    assert!(!cleared.is_encrypted());
}

#[test]
fn date_placeholders_expand_against_injected_time() {
    let target = Target::new("/backups/%Y", "db-%Y%m%d-%H%i.sql", &now()).unwrap();
    assert_eq!(target.dirname(), Path::new("/backups/2024"));
    assert_eq!(target.filename_plain(), "db-20241105-2359.sql");
    assert_eq!(target.filename_template(), "db-%Y%m%d-%H%i.sql");
}

#[test]
fn home_directory_is_expanded() {
    if let Some(home) = dirs::home_dir() {
        let target = Target::new("~/backups", "db.sql", &now()).unwrap();
        assert_eq!(target.dirname(), home.join("backups"));
    }
}

#[test]
fn filename_regex_matches_other_dates_of_the_same_job() {
    let target = Target::new("/backups", "db-%Y%m%d.sql", &now())
        .unwrap()
        .with_compression(resolve("gzip"));
    let re = target.filename_regex().unwrap();
    assert!(re.is_match("db-20241105.sql.gz"));
    assert!(re.is_match("db-20230101.sql.gz"));
    assert!(!re.is_match("db-20241105.sql"));
    assert!(!re.is_match("db-20241105.sql.gz.tmp"));
    assert!(!re.is_match("xdb-20241105.sql.gz"));
}

#[test]
fn at_artifact_points_at_existing_file() {
    let target = Target::new("/backups", "db-%Y%m%d.sql", &now())
        .unwrap()
        .with_compression(resolve("gzip"))
        .with_crypt_suffix("enc");
    let older = target.at_artifact("db-20240101.sql.gz.enc").unwrap();
    assert_eq!(older.filename_plain(), "db-20240101.sql");
    assert_eq!(older.filename(), "db-20240101.sql.gz.enc");
    assert_eq!(older.dirname(), target.dirname());

    assert!(matches!(
        target.at_artifact("unrelated.txt"),
        Err(Error::InvalidOperation(_))
    ));
}

#[test]
fn at_path_follows_the_artifact_directory() {
    let target = Target::new("/backups/%Y", "db-%Y%m%d.sql", &now())
        .unwrap()
        .with_compression(resolve("gzip"));
    assert_eq!(target.dirname(), Path::new("/backups/2024"));
    assert_eq!(target.dirname_template(), Path::new("/backups/%Y"));

    let older = target
        .at_path(Path::new("/backups/2023/db-20230101.sql.gz"))
        .unwrap();
    assert_eq!(older.dirname(), Path::new("/backups/2023"));
    assert_eq!(older.filename_plain(), "db-20230101.sql");
    assert_eq!(
        older.pathname(),
        PathBuf::from("/backups/2023/db-20230101.sql.gz")
    );

    assert!(target.at_path(Path::new("/backups/2023/other.txt")).is_err());
}

// -------- Decompressor --------

#[test]
fn file_decompressor_uses_the_compressor_with_keep_flag() {
    let target = Target::new("/backups", "foo", &now())
        .unwrap()
        .with_compression(resolve("gzip"));
    assert_eq!(
        Decompressor::File.decompress(&target).unwrap(),
        "gzip -dk foo.gz"
    );

    let with_path = Target::new("/backups", "foo", &now())
        .unwrap()
        .with_compression(resolve("/opt/bin/bzip2"));
    assert_eq!(
        Decompressor::File.decompress(&with_path).unwrap(),
        "/opt/bin/bzip2 -dk foo.bz2"
    );
}

#[test]
fn file_decompressor_unzips_zip_archives() {
    let target = Target::new("/backups", "foo", &now())
        .unwrap()
        .with_compression(resolve("zip"));
    assert_eq!(Decompressor::File.decompress(&target).unwrap(), "unzip foo.zip");
}

#[test]
fn file_decompressor_requires_compression() {
    let target = Target::new("/backups", "foo.sql", &now()).unwrap();
    assert!(matches!(
        Decompressor::File.decompress(&target),
        Err(Error::InvalidOperation(_))
    ));
}

#[test]
fn directory_decompressor_always_untars() {
    let plain = Target::new("/backups", "site.tar", &now())
        .unwrap()
        .with_kind(ArtifactKind::Directory);
    assert_eq!(
        Decompressor::Directory.decompress(&plain).unwrap(),
        "tar -xvf site.tar"
    );

    for name in ["gzip", "bzip2", "xz", "zip"] {
        let compressed = plain.clone().with_compression(resolve(name));
        let command = Decompressor::Directory.decompress(&compressed).unwrap();
        assert!(command.starts_with("tar -xvf "), "{command}");
        assert!(command.ends_with(&format!("site.tar.{}", resolve(name).suffix())));
    }
}

#[test]
fn decompressor_follows_artifact_kind() {
    let file = Target::new("/backups", "foo", &now()).unwrap();
    assert_eq!(Decompressor::for_target(&file), Decompressor::File);
    let dir = file.with_kind(ArtifactKind::Directory);
    assert_eq!(Decompressor::for_target(&dir), Decompressor::Directory);
}

#[test]
fn extract_runs_in_the_target_directory() {
    let target = Target::new("/backups", "foo", &now())
        .unwrap()
        .with_compression(resolve("gzip"));
    let executor = RecordingExecutor::default();
    Decompressor::File.extract(&target, &executor).unwrap();

    let calls = executor.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "gzip -dk foo.gz");
    assert_eq!(calls[0].1.as_deref(), Some(Path::new("/backups")));
}

#[test]
fn decompress_quotes_names_with_spaces() {
    let target = Target::new("/backups", "my dump.sql", &now())
        .unwrap()
        .with_compression(resolve("gzip"));
    assert_eq!(
        Decompressor::File.decompress(&target).unwrap(),
        "gzip -dk 'my dump.sql.gz'"
    );

    let zipped = target.clone().with_compression(resolve("zip"));
    assert_eq!(
        Decompressor::File.decompress(&zipped).unwrap(),
        "unzip 'my dump.sql.zip'"
    );

    let archive = Target::new("/backups", "it's.tar", &now())
        .unwrap()
        .with_kind(ArtifactKind::Directory);
    assert_eq!(
        Decompressor::Directory.decompress(&archive).unwrap(),
        "tar -xvf 'it'\\''s.tar'"
    );
}

#[cfg(unix)]
#[test]
fn extract_handles_names_with_spaces() {
    use crate::executor::ShellExecutor;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    let temp_dir = TempDir::new().unwrap();
    // Stand-in gzip that only understands `-dk <file>.gz`.
    let bin_dir = temp_dir.path().join("tool bin");
    fs::create_dir(&bin_dir).unwrap();
    let fake_gzip = bin_dir.join("gzip");
    fs::write(
        &fake_gzip,
        "#!/bin/sh\n[ \"$1\" = \"-dk\" ] || exit 2\n[ -f \"$2\" ] || exit 3\ncp \"$2\" \"${2%.gz}\"\n",
    )
    .unwrap();
    fs::set_permissions(&fake_gzip, fs::Permissions::from_mode(0o755)).unwrap();

    let backups = temp_dir.path().join("backups");
    fs::create_dir(&backups).unwrap();
    fs::write(backups.join("my dump.sql.gz"), b"dump").unwrap();

    let target = Target::new(backups.to_str().unwrap(), "my dump.sql", &now())
        .unwrap()
        .with_compression(resolve(fake_gzip.to_str().unwrap()));
    Decompressor::File
        .extract(&target, &ShellExecutor::default())
        .unwrap();

    assert_eq!(fs::read(backups.join("my dump.sql")).unwrap(), b"dump");
}

#[test]
fn extract_checks_exit_codes() {
    let target = Target::new("/backups", "foo", &now())
        .unwrap()
        .with_compression(resolve("gzip"));
    let executor = RecordingExecutor {
        exit_code: 1,
        ..Default::default()
    };
    match Decompressor::File.extract(&target, &executor) {
        Err(Error::CommandFailed {
            command, exit_code, ..
        }) => {
            assert_eq!(command, "gzip -dk foo.gz");
            assert_eq!(exit_code, Some(1));
        }
        other => panic!("expected command failure, got {other:?}"),
    }
}
