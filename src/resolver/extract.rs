use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;
use xz2::read::XzDecoder;
use zip::ZipArchive;

use crate::resolver::platform::Arch;
use crate::resolver::tool_spec::ArchiveKind;

/// Unpacks `archive` into `dest`. A bare download is copied in as `bare_name`.
pub fn unpack(archive: &Path, kind: ArchiveKind, dest: &Path, bare_name: &str) -> Result<()> {
    fs::create_dir_all(dest)?;
    log::info!("Extracting {:?} ({:?}) into {:?}", archive, kind, dest);

    match kind {
        ArchiveKind::Zip => {
            let file = File::open(archive)?;
            let mut zip = ZipArchive::new(file).context("not a readable zip archive")?;
            zip.extract(dest)?;
        }
        ArchiveKind::TarXz => {
            let file = File::open(archive)?;
            Archive::new(XzDecoder::new(file))
                .unpack(dest)
                .context("not a readable tar.xz archive")?;
        }
        ArchiveKind::TarGz => {
            let file = File::open(archive)?;
            Archive::new(GzDecoder::new(file))
                .unpack(dest)
                .context("not a readable tar.gz archive")?;
        }
        ArchiveKind::SevenZip => {
            sevenz_rust::decompress_file(archive, dest)
                .map_err(|e| anyhow::anyhow!("Failed to extract 7z archive: {:?}", e))?;
        }
        ArchiveKind::Bare => {
            fs::copy(archive, dest.join(bare_name))?;
        }
    }
    Ok(())
}

/// Every regular file under `root` whose name is exactly `file_name`, at any depth.
pub fn find_candidates(root: &Path, file_name: &str) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                stack.push(path);
            } else if path.is_file() && entry.file_name() == file_name {
                found.push(path);
            }
        }
    }
    found
}

/// Picks one of several matches: a path naming the host architecture first,
/// then the shallowest path, then the lexicographically smallest.
pub fn select_candidate(candidates: Vec<PathBuf>, root: &Path, arch: Arch) -> Option<PathBuf> {
    if candidates.len() > 1 {
        log::warn!(
            "{} matching entries in archive, choosing by architecture and depth",
            candidates.len()
        );
    }
    candidates.into_iter().min_by_key(|path| {
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        let lowered = relative.to_string_lossy().to_lowercase();
        let names_arch = arch.path_tokens().iter().any(|token| lowered.contains(token));
        (!names_arch, relative.components().count(), relative)
    })
}

/// Binaries located in an unpacked archive.
#[derive(Debug)]
pub struct Located {
    pub binary: PathBuf,
    pub siblings: Vec<(String, PathBuf)>,
}

pub fn locate(root: &Path, binary: &str, siblings: &[String], arch: Arch) -> Result<Located> {
    let binary_path = select_candidate(find_candidates(root, binary), root, arch)
        .ok_or_else(|| anyhow::anyhow!("{} not found in archive", binary))?;

    let mut found_siblings = Vec::new();
    for sibling in siblings {
        match select_candidate(find_candidates(root, sibling), root, arch) {
            Some(path) => found_siblings.push((sibling.clone(), path)),
            None => log::warn!("{} not found in archive, skipping it", sibling),
        }
    }

    Ok(Located { binary: binary_path, siblings: found_siblings })
}
