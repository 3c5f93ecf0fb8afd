use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Isolated on-disk tree for a single request.
///
/// Everything a request touches lives under `<base>/<request_id>/`:
/// deliverables under `output/`, per-lecture scratch under
/// `lectures/lecture_<n>/`. The tree is removed exactly once via
/// [`Workspace::release`]; dropping an unreleased workspace removes it
/// as a backstop so an early return cannot leak the directory.
pub struct Workspace {
    root: PathBuf,
    output_dir: PathBuf,
    released: bool,
}

/// Scratch paths for one lecture inside a workspace.
pub struct LecturePaths {
    pub dir: PathBuf,
    pub video: PathBuf,
    pub audio: PathBuf,
    pub transcript: PathBuf,
    pub chunks_dir: PathBuf,
    pub pages_dir: PathBuf,
}

impl Workspace {
    /// Create the request tree. If creation fails partway, whatever was
    /// created is removed before the error is returned.
    pub async fn allocate(base: &Path, request_id: &str) -> Result<Self> {
        let root = base.join(request_id);
        let output_dir = root.join("output");

        if let Err(e) = fs::create_dir_all(&output_dir).await {
            let _ = fs::remove_dir_all(&root).await;
            return Err(e.into());
        }

        debug!("Allocated workspace: {}", root.display());
        Ok(Self {
            root,
            output_dir,
            released: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the scratch tree for one lecture. `number` is 1-based and
    /// creation is idempotent.
    pub async fn lecture(&self, number: usize) -> Result<LecturePaths> {
        let dir = self.root.join("lectures").join(format!("lecture_{}", number));
        let chunks_dir = dir.join("chunks");
        let pages_dir = dir.join("pages");

        fs::create_dir_all(&chunks_dir).await?;
        fs::create_dir_all(&pages_dir).await?;

        Ok(LecturePaths {
            video: dir.join("input.mp4"),
            audio: dir.join("audio.mp3"),
            transcript: dir.join("transcript.txt"),
            chunks_dir,
            pages_dir,
            dir,
        })
    }

    pub fn concise_summary_file(&self, lecture: usize) -> PathBuf {
        self.output_dir
            .join(format!("lecture_{}_concise_summary.txt", lecture))
    }

    pub fn detailed_summary_file(&self, lecture: usize) -> PathBuf {
        self.output_dir
            .join(format!("lecture_{}_detailed_summary.txt", lecture))
    }

    pub fn questions_file(&self, lecture: usize) -> PathBuf {
        self.output_dir
            .join(format!("lecture_{}_questions.json", lecture))
    }

    pub fn cumulative_questions_file(&self, through: usize) -> PathBuf {
        self.output_dir
            .join(format!("cumulative_questions_1_to_{}.json", through))
    }

    pub fn combined_summary_file(&self) -> PathBuf {
        self.output_dir.join("combined_summary.txt")
    }

    /// Remove the whole request tree. Consuming `self` makes a double
    /// release impossible.
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {
                debug!("Released workspace: {}", self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }
}
