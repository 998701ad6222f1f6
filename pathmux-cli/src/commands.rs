// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI command implementations

use chrono::{DateTime, Utc};
use console::style;
use pathmux_vfs::{FileSystem, PmxResult, TempFileOptions};
use tabled::{Table, Tabled};

/// Format a modification time in epoch milliseconds
fn format_time(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format file size
fn format_size(size: Option<u64>, human: bool) -> String {
    match size {
        Some(s) if human => bytesize::ByteSize(s).to_string(),
        Some(s) => s.to_string(),
        None => "-".to_string(),
    }
}

fn format_kind(is_dir: bool) -> String {
    if is_dir {
        style("d").cyan().to_string()
    } else {
        "-".to_string()
    }
}

#[derive(Tabled)]
struct LsEntry {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct BackendRow {
    #[tabled(rename = "Scheme")]
    scheme: String,
    #[tabled(rename = "Backend")]
    name: String,
}

/// List directory contents
pub async fn ls(fs: &FileSystem, path: &str, long: bool, all: bool, human: bool) -> PmxResult<()> {
    tracing::info!(path, "listing");
    let children: Vec<String> = fs
        .list_files(path)
        .await?
        .into_iter()
        .filter(|c| all || !fs.name(c).starts_with('.'))
        .collect();

    if children.is_empty() {
        println!("(empty directory)");
        return Ok(());
    }

    if long {
        let mut entries = Vec::with_capacity(children.len());
        for child in &children {
            let is_dir = fs.is_directory(child).await;
            let size = if is_dir { None } else { fs.size(child).await.ok() };
            entries.push(LsEntry {
                kind: format_kind(is_dir),
                size: format_size(size, human),
                modified: format_time(fs.last_modified(child).await.ok()),
                name: fs.name(child),
            });
        }
        println!("{}", Table::new(entries));
    } else {
        for child in &children {
            println!("{}", fs.name(child));
        }
    }

    Ok(())
}

/// Display file contents
pub async fn cat(fs: &FileSystem, path: &str) -> PmxResult<()> {
    tracing::info!(path, "reading");
    let mut input = fs.new_input_stream(path).await?;
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut input, &mut stdout).await?;
    Ok(())
}

/// Copy a file, into `dest` if it is a directory
pub async fn cp(fs: &FileSystem, source: &str, dest: &str, parents: bool) -> PmxResult<()> {
    let target = if fs.is_directory(dest).await {
        join(dest, &fs.name(source))
    } else {
        dest.to_string()
    };

    if parents {
        if let Some(parent) = fs.parent(&target) {
            fs.create_directories(&parent).await?;
        }
    }

    let copied = fs.copy(source, &target).await?;
    println!("Copied {} -> {} ({})", source, target, bytesize::ByteSize(copied));
    Ok(())
}

/// Move/rename files
pub async fn mv(fs: &FileSystem, source: &str, dest: &str) -> PmxResult<()> {
    fs.move_to(source, dest).await?;
    println!("Moved {} -> {}", source, dest);
    Ok(())
}

/// Remove files or directories
pub async fn rm(fs: &FileSystem, paths: &[String], recursive: bool, force: bool) -> PmxResult<()> {
    for path in paths {
        tracing::info!(path = %path, recursive, force, "removing");
        if recursive {
            fs.delete_recursive(path, force).await?;
        } else if force {
            if !fs.try_delete(path).await {
                continue;
            }
        } else {
            fs.delete(path).await?;
        }
        println!("Removed {}", path);
    }

    Ok(())
}

/// Create directories
pub async fn mkdir(fs: &FileSystem, paths: &[String], parents: bool) -> PmxResult<()> {
    for path in paths {
        if parents {
            fs.create_directories(path).await?;
        } else {
            fs.create_directory(path).await?;
        }
        println!("Created {}", path);
    }

    Ok(())
}

/// Create empty files
pub async fn touch(fs: &FileSystem, paths: &[String]) -> PmxResult<()> {
    for path in paths {
        if fs.create_file(path).await? {
            println!("Created {}", path);
        }
    }
    Ok(())
}

/// Show file/directory information
pub async fn stat(fs: &FileSystem, path: &str) -> PmxResult<()> {
    let canonical = fs.canonical_path(path).await?;
    let is_dir = fs.is_directory(path).await;
    let modified = fs.last_modified(path).await?;

    println!("  Path: {}", canonical);
    println!("  Backend: {}", fs.backend(path).display_name());
    println!("  Type: {}", if is_dir { "directory" } else { "file" });
    if !is_dir {
        let size = fs.size(path).await?;
        println!("  Size: {} ({})", size, bytesize::ByteSize(size));
    }
    println!("  Modified: {}", format_time(Some(modified)));

    let access = if fs.can_write(path).await {
        style("read-write").green()
    } else {
        style("read-only").yellow()
    };
    println!("  Access: {}", access);

    let real = fs.unwrap(path);
    if real != path {
        println!("  Real path: {}", real);
    }

    Ok(())
}

/// List registered backends
pub fn backends(fs: &FileSystem) -> PmxResult<()> {
    let registry = fs.registry();
    let default = registry.default_backend();

    let mut rows = vec![BackendRow {
        scheme: format!("{} {}", default.scheme(), style("(default)").dim()),
        name: default.display_name().to_string(),
    }];
    for scheme in registry.schemes() {
        if let Some(backend) = registry.get(&scheme) {
            rows.push(BackendRow {
                scheme,
                name: backend.display_name().to_string(),
            });
        }
    }

    println!("{}", Table::new(rows));
    Ok(())
}

/// Create a temporary file
pub async fn tmp(fs: &FileSystem, prefix: &str, suffix: &str, in_temp_dir: bool, delete_on_exit: bool) -> PmxResult<()> {
    let options = TempFileOptions {
        delete_on_exit,
        in_temp_dir,
    };
    let path = fs.create_temp_file(prefix, suffix, options).await?;
    println!("{}", path);
    Ok(())
}

fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Some(0)), "1970-01-01 00:00");
        assert_eq!(format_time(None), "-");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(Some(2048), false), "2048");
        assert_eq!(format_size(None, true), "-");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("mem:/a", "b"), "mem:/a/b");
        assert_eq!(join("mem:/", "b"), "mem:/b");
    }

    #[tokio::test]
    async fn test_commands_against_memory_mount() {
        let fs = FileSystem::from_config(&pathmux_vfs::RegistryConfig::default()).unwrap();

        mkdir(&fs, &["memFS:/a/b".to_string()], true).await.unwrap();
        touch(&fs, &["memFS:/a/b/f".to_string()]).await.unwrap();
        cp(&fs, "memFS:/a/b/f", "memFS:/a", false).await.unwrap();
        assert!(fs.exists("memFS:/a/f").await);

        mv(&fs, "memFS:/a/f", "memFS:/a/g").await.unwrap();
        assert!(fs.exists("memFS:/a/g").await);

        assert!(rm(&fs, &["memFS:/a".to_string()], false, false).await.is_err());
        rm(&fs, &["memFS:/a".to_string()], false, true).await.unwrap();
        assert!(fs.exists("memFS:/a").await);
        rm(&fs, &["memFS:/a".to_string()], true, false).await.unwrap();
        assert!(!fs.exists("memFS:/a").await);
    }
}
