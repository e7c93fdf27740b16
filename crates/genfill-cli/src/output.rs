use std::path::{Path, PathBuf};

use genfill_common::{Artifact, FillError, PartKind};

/// Write every artifact under `out_dir`, creating it when missing.
pub async fn write_artifacts(
    out_dir: &Path,
    artifacts: &[Artifact],
) -> Result<Vec<PathBuf>, FillError> {
    tokio::fs::create_dir_all(out_dir).await?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = out_dir.join(&artifact.file_name);
        tokio::fs::write(&path, &artifact.contents).await?;
        tracing::info!(
            path = %path.display(),
            bytes = artifact.contents.len(),
            kind = ?artifact.kind,
            "artifact written"
        );
        written.push(path);
    }
    Ok(written)
}

pub fn print_summary(seed: u32, artifacts: &[Artifact], written: &[PathBuf]) {
    println!("\n=== Generative fill (seed {seed}) ===\n");
    if written.is_empty() {
        println!("No recognised outputs in the response.");
        return;
    }
    println!("{:<8} {:>10}  {}", "Kind", "Bytes", "Path");
    for (artifact, path) in artifacts.iter().zip(written) {
        let kind = match artifact.kind {
            PartKind::Json => "json",
            PartKind::Binary => "image",
        };
        println!(
            "{:<8} {:>10}  {}",
            kind,
            artifact.contents.len(),
            path.display()
        );
    }
    println!();
}
