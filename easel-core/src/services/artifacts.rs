//! Artifact store - writes generated media to disk
//!
//! Generated images, thumbnails and videos land in artifacts/ under the data
//! directory with timestamped names, unless the caller asks for an explicit
//! output path.

use std::path::{Path, PathBuf};

use crate::domain::now_ms;
use crate::domain::result::Result;
use crate::ports::Artifact;

/// What kind of media an artifact file holds, which decides its name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Image,
    Thumbnail,
    Video,
}

impl ArtifactKind {
    fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Image => "image",
            ArtifactKind::Thumbnail => "thumb",
            ArtifactKind::Video => "video",
        }
    }
}

/// Writes generated artifacts under `<data_dir>/artifacts/`
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("artifacts"),
        }
    }

    /// Directory that receives artifacts when no output path is given
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an artifact to disk and return the path it landed at
    ///
    /// With `out` set the bytes go exactly there (parent directories are
    /// created); otherwise a timestamped file is created in the artifacts
    /// directory, e.g. `image-1714050000000.jpg`.
    pub fn save(
        &self,
        kind: ArtifactKind,
        artifact: &Artifact,
        out: Option<&Path>,
    ) -> Result<PathBuf> {
        let path = match out {
            Some(explicit) => {
                if let Some(parent) = explicit.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                explicit.to_path_buf()
            }
            None => {
                std::fs::create_dir_all(&self.dir)?;
                self.timestamped_path(kind, artifact.extension())
            }
        };

        std::fs::write(&path, &artifact.bytes)?;
        Ok(path)
    }

    fn timestamped_path(&self, kind: ArtifactKind, extension: &str) -> PathBuf {
        let stamp = now_ms();
        let candidate = self
            .dir
            .join(format!("{}-{}.{}", kind.prefix(), stamp, extension));
        if !candidate.exists() {
            return candidate;
        }

        // Same-millisecond collision, disambiguate with a suffix
        let mut n = 1;
        loop {
            let next = self
                .dir
                .join(format!("{}-{}-{}.{}", kind.prefix(), stamp, n, extension));
            if !next.exists() {
                return next;
            }
            n += 1;
        }
    }
}
