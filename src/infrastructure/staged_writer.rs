//! Staged Output Writer
//!
//! Every generated file is first written to a temporary file next to its
//! target. Only once all of them are staged are they renamed over the
//! targets, so a failure while staging leaves the previous generation in
//! place. Targets are replaced whole, never merged.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tempfile::{Builder, NamedTempFile};

use crate::codegen::GeneratedOutput;
use crate::ports::OutputWriter;

pub struct StagedFileWriter;

impl StagedFileWriter {
    fn stage(dir: &Path, content: &str) -> Result<NamedTempFile> {
        let mut staged = Builder::new()
            .prefix(".generate_ast")
            .suffix(".tmp")
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create staging file in {}", dir.display()))?;
        staged
            .write_all(content.as_bytes())
            .context("Failed to write staging file")?;

        // Match regular file permissions.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .context("Failed to set permissions on staging file")?;
        }
        Ok(staged)
    }
}

impl OutputWriter for StagedFileWriter {
    fn write(&self, output: &GeneratedOutput, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            bail!("Output directory {} does not exist", dir.display());
        }

        let mut staged = Vec::with_capacity(output.files.len());
        for file in &output.files {
            let target = dir.join(&file.path);
            let tmp = Self::stage(dir, &file.content)
                .with_context(|| format!("Failed to stage {}", target.display()))?;
            staged.push((tmp, target));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (tmp, target) in staged {
            tmp.persist(&target)
                .map_err(|e| e.error)
                .with_context(|| format!("Failed to replace {}", target.display()))?;
            tracing::info!("wrote {}", target.display());
            written.push(target);
        }
        Ok(written)
    }
}
