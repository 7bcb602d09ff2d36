//! `corrl install`: fetch a CorrLang distribution and unpack it into the home
//! directory.
//!
//! The archive holds a single top-level `corrlang-1.0-snapshot/` folder whose
//! contents (`lib/`, `bin/`, ...) land directly in `<home>`. A previous
//! installation's `lib/` and `bin/` are removed first unless overwriting is
//! disabled. `<home>/config.toml` is written once and never replaced, so
//! local edits survive a reinstall.

use std::fs;
use std::io::{self, Cursor, ErrorKind, Read, Seek};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use zip::ZipArchive;

use crate::error::{io_err, ClientError};
use crate::paths::{bin_dir, config_file, lib_dir, version_file};

pub const KNOWN_VERSIONS: &[&str] = &["1.0-snapshot-alpha", "1.0-snapshot-pre-alpha"];
pub const LATEST_VERSION: &str = "1.0-snapshot-alpha";

const DOWNLOAD_BASE: &str = "https://codeberg.org/drstrudel/corrlang/releases/download";
/// Top-level folder inside every distribution archive.
const ARCHIVE_ROOT: &str = "corrlang-1.0-snapshot";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_ARCHIVE_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub home: PathBuf,
    /// One of [`KNOWN_VERSIONS`].
    pub version: String,
    /// Replace an existing installation's `lib/` and `bin/`.
    pub overwrite: bool,
    /// Written into a freshly created `config.toml`.
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub version: String,
    pub home: PathBuf,
    pub overwritten: bool,
}

/// `--version` or [`LATEST_VERSION`]; anything outside [`KNOWN_VERSIONS`] is
/// rejected before a download starts.
pub fn resolve_version(requested: Option<&str>) -> Result<String, ClientError> {
    let version = requested.unwrap_or(LATEST_VERSION);
    if KNOWN_VERSIONS.contains(&version) {
        Ok(version.to_string())
    } else {
        Err(ClientError::UnknownVersion {
            version: version.to_string(),
            known: KNOWN_VERSIONS.join(", "),
        })
    }
}

pub fn archive_url(version: &str) -> String {
    format!("{DOWNLOAD_BASE}/{version}/{ARCHIVE_ROOT}.zip")
}

/// Downloads the distribution for `request.version` and installs it.
pub fn install(request: &InstallRequest) -> Result<Installation, ClientError> {
    ensure_replaceable(request)?;
    let url = archive_url(&request.version);
    let archive = download(&url)?;
    install_from_archive(request, Cursor::new(archive))
}

/// Installs from an already fetched archive.
pub fn install_from_archive<R: Read + Seek>(
    request: &InstallRequest,
    archive: R,
) -> Result<Installation, ClientError> {
    let mut archive = ZipArchive::new(archive)?;
    let home = request.home.as_path();

    let overwritten = clear_previous(request)?;
    fs::create_dir_all(home).map_err(|err| io_err(home, err))?;
    write_default_config(home, request.port)?;
    let unpacked = unpack(&mut archive, home)?;

    let version_path = version_file(home);
    fs::write(&version_path, &request.version).map_err(|err| io_err(version_path, err))?;

    tracing::info!(
        version = %request.version,
        home = %home.display(),
        files = unpacked,
        overwritten,
        "distribution installed"
    );
    Ok(Installation {
        version: request.version.clone(),
        home: home.to_path_buf(),
        overwritten,
    })
}

/// Removes `root` and everything below it. A missing `root` is not an error.
pub fn delete_tree(root: &Path) -> Result<(), ClientError> {
    let removed = match fs::symlink_metadata(root) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(root),
        Ok(_) => fs::remove_file(root),
        Err(err) => Err(err),
    };
    match removed {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(root, err)),
    }
}

fn previous_dirs(home: &Path) -> Vec<PathBuf> {
    [lib_dir(home), bin_dir(home)]
        .into_iter()
        .filter(|dir| dir.exists())
        .collect()
}

fn ensure_replaceable(request: &InstallRequest) -> Result<(), ClientError> {
    if !request.overwrite && !previous_dirs(&request.home).is_empty() {
        return Err(ClientError::AlreadyInstalled(request.home.clone()));
    }
    Ok(())
}

/// Returns whether anything was removed.
fn clear_previous(request: &InstallRequest) -> Result<bool, ClientError> {
    ensure_replaceable(request)?;
    let previous = previous_dirs(&request.home);
    for dir in &previous {
        tracing::info!(dir = %dir.display(), "removing previous installation");
        delete_tree(dir)?;
    }
    Ok(!previous.is_empty())
}

fn write_default_config(home: &Path, port: u16) -> Result<(), ClientError> {
    let path = config_file(home);
    if path.exists() {
        tracing::debug!(path = %path.display(), "keeping existing configuration");
        return Ok(());
    }
    let home = home
        .display()
        .to_string()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    let contents = format!("[system]\nport = {port}\nhome = \"{home}\"\n");
    fs::write(&path, contents).map_err(|err| io_err(&path, err))?;
    tracing::info!(path = %path.display(), "created default configuration");
    Ok(())
}

/// Where an archive entry lands below `home`; `None` for the archive root
/// itself and for entries that would escape `home`.
fn target_path(home: &Path, entry: &Path) -> Option<PathBuf> {
    let relative = entry.strip_prefix(ARCHIVE_ROOT).unwrap_or(entry);
    if relative.as_os_str().is_empty() {
        return None;
    }
    if !relative
        .components()
        .all(|part| matches!(part, Component::Normal(_)))
    {
        return None;
    }
    Some(home.join(relative))
}

/// Returns the number of files written.
fn unpack<R: Read + Seek>(archive: &mut ZipArchive<R>, home: &Path) -> Result<usize, ClientError> {
    let mut files = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let Some(target) = entry
            .enclosed_name()
            .and_then(|name| target_path(home, &name))
        else {
            tracing::debug!(entry = entry.name(), "skipping archive entry");
            continue;
        };

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|err| io_err(&target, err))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| io_err(parent, err))?;
        }
        let mut out = fs::File::create(&target).map_err(|err| io_err(&target, err))?;
        io::copy(&mut entry, &mut out).map_err(|err| io_err(&target, err))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                .map_err(|err| io_err(&target, err))?;
        }
        files += 1;
    }
    Ok(files)
}

fn download(url: &str) -> Result<Vec<u8>, ClientError> {
    let failed = |message: String| ClientError::Download {
        url: url.to_string(),
        message,
    };
    tracing::info!(%url, "downloading CorrLang distribution");

    let agent = ureq::AgentBuilder::new()
        .timeout_connect(CONNECT_TIMEOUT)
        .timeout(DOWNLOAD_TIMEOUT)
        .build();
    let response = agent.get(url).call().map_err(|err| failed(err.to_string()))?;

    let mut archive = Vec::new();
    response
        .into_reader()
        .take(MAX_ARCHIVE_BYTES)
        .read_to_end(&mut archive)
        .map_err(|err| failed(err.to_string()))?;
    tracing::debug!(bytes = archive.len(), "download complete");
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn distribution(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer
            .add_directory(format!("{ARCHIVE_ROOT}/"), options)
            .expect("root dir");
        for (name, body) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).expect("dir");
            } else {
                writer.start_file(*name, options).expect("start");
                writer.write_all(body.as_bytes()).expect("body");
            }
        }
        let mut cursor = writer.finish().expect("finish");
        cursor.set_position(0);
        cursor
    }

    fn request(home: &Path, overwrite: bool) -> InstallRequest {
        InstallRequest {
            home: home.to_path_buf(),
            version: LATEST_VERSION.to_string(),
            overwrite,
            port: 7070,
        }
    }

    #[test]
    fn unknown_version_lists_known_ones() {
        let err = resolve_version(Some("2.0")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'2.0'"), "{message}");
        assert!(message.contains("1.0-snapshot-pre-alpha"), "{message}");
        assert_eq!(resolve_version(None).expect("latest"), LATEST_VERSION);
    }

    #[test]
    fn archive_url_names_release_and_archive() {
        assert_eq!(
            archive_url("1.0-snapshot-alpha"),
            "https://codeberg.org/drstrudel/corrlang/releases/download/\
             1.0-snapshot-alpha/corrlang-1.0-snapshot.zip"
        );
    }

    #[test]
    fn unpacks_below_home_without_archive_root() {
        let tmp = TempDir::new().expect("tempdir");
        let home = tmp.path().join("corrlang");
        let archive = distribution(&[
            ("corrlang-1.0-snapshot/lib/", ""),
            ("corrlang-1.0-snapshot/lib/core.jar", "jar"),
            ("corrlang-1.0-snapshot/bin/corrlang", "#!/bin/sh"),
        ]);

        let installed = install_from_archive(&request(&home, true), archive).expect("install");

        assert!(!installed.overwritten);
        assert_eq!(fs::read_to_string(home.join("lib/core.jar")).expect("jar"), "jar");
        assert!(home.join("bin/corrlang").is_file());
        assert!(!home.join(ARCHIVE_ROOT).exists());
        assert_eq!(
            fs::read_to_string(version_file(&home)).expect("version"),
            LATEST_VERSION
        );
        let config = fs::read_to_string(config_file(&home)).expect("config");
        assert!(config.starts_with("[system]\nport = 7070\n"), "{config}");
        assert!(config.contains(&format!("home = \"{}\"", home.display())));
    }

    #[test]
    fn reinstall_replaces_lib_but_keeps_config() {
        let tmp = TempDir::new().expect("tempdir");
        let home = tmp.path();
        fs::create_dir_all(lib_dir(home)).expect("lib");
        fs::write(lib_dir(home).join("stale.jar"), "old").expect("stale");
        fs::write(config_file(home), "[system]\nport = 1234\n").expect("config");

        let archive = distribution(&[("corrlang-1.0-snapshot/lib/core.jar", "new")]);
        let installed = install_from_archive(&request(home, true), archive).expect("install");

        assert!(installed.overwritten);
        assert!(!lib_dir(home).join("stale.jar").exists());
        assert!(lib_dir(home).join("core.jar").exists());
        assert_eq!(
            fs::read_to_string(config_file(home)).expect("config"),
            "[system]\nport = 1234\n"
        );
    }

    #[test]
    fn no_overwrite_leaves_existing_installation_alone() {
        let tmp = TempDir::new().expect("tempdir");
        let home = tmp.path();
        fs::create_dir_all(bin_dir(home)).expect("bin");
        fs::write(bin_dir(home).join("corrlang"), "old").expect("script");

        let archive = distribution(&[("corrlang-1.0-snapshot/bin/corrlang", "new")]);
        let err = install_from_archive(&request(home, false), archive).unwrap_err();

        assert!(matches!(err, ClientError::AlreadyInstalled(_)), "{err:?}");
        assert_eq!(
            fs::read_to_string(bin_dir(home).join("corrlang")).expect("script"),
            "old"
        );
        assert!(!version_file(home).exists());
    }

    #[test]
    fn corrupt_archive_is_rejected_before_touching_home() {
        let tmp = TempDir::new().expect("tempdir");
        let home = tmp.path();
        fs::create_dir_all(lib_dir(home)).expect("lib");

        let err = install_from_archive(&request(home, true), Cursor::new(b"not a zip".to_vec()))
            .unwrap_err();

        assert!(matches!(err, ClientError::Archive(_)), "{err:?}");
        assert!(lib_dir(home).exists());
    }

    #[test]
    fn entries_escaping_home_are_skipped() {
        let home = Path::new("/srv/corrlang");
        assert_eq!(target_path(home, Path::new(ARCHIVE_ROOT)), None);
        assert_eq!(target_path(home, Path::new("../etc/passwd")), None);
        assert_eq!(
            target_path(home, Path::new("corrlang-1.0-snapshot/lib/a.jar")),
            Some(PathBuf::from("/srv/corrlang/lib/a.jar"))
        );
        assert_eq!(
            target_path(home, Path::new("README")),
            Some(PathBuf::from("/srv/corrlang/README"))
        );
    }

    #[test]
    fn delete_tree_removes_nested_content() {
        let tmp = TempDir::new().expect("tempdir");
        let root = tmp.path().join("lib");
        fs::create_dir_all(root.join("a/b")).expect("dirs");
        fs::write(root.join("a/b/c.jar"), "x").expect("file");
        fs::write(root.join("top.jar"), "y").expect("file");

        delete_tree(&root).expect("delete");

        assert!(!root.exists());
        assert!(tmp.path().exists());
    }

    #[test]
    fn delete_tree_on_missing_path_is_ok() {
        let tmp = TempDir::new().expect("tempdir");
        delete_tree(&tmp.path().join("never-created")).expect("missing is fine");
    }

    #[test]
    fn delete_tree_removes_a_plain_file() {
        let tmp = TempDir::new().expect("tempdir");
        let file = tmp.path().join("VERSION");
        fs::write(&file, "1").expect("file");
        delete_tree(&file).expect("delete");
        assert!(!file.exists());
    }
}
