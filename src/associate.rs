//! Placing converted scripts next to media files.
//!
//! A script belongs to a media file when it sits in the same directory with
//! the same base name and the `.funscript` extension. Association copies
//! the cached script to every file variant of a scene that lacks one.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::host::Scene;

const SCRIPT_EXTENSION: &str = "funscript";

/// Sibling script path for a media file: same directory, same base name,
/// `.funscript` extension.
pub fn sibling_script_path(media_path: &Path) -> PathBuf {
    media_path.with_extension(SCRIPT_EXTENSION)
}

/// Whether any file variant of the scene already has a sibling script.
///
/// Cheap filesystem-only check, run before any network I/O.
pub fn scene_has_script(scene: &Scene) -> bool {
    scene
        .files
        .iter()
        .any(|f| sibling_script_path(&f.path).exists())
}

/// Copy `script` next to every file variant of `scene` that lacks one.
///
/// Idempotent: existing siblings are left untouched. Returns the number of
/// copies made.
pub fn associate(script: &Path, scene: &Scene) -> Result<usize> {
    let mut copied = 0;
    for file in &scene.files {
        let target = sibling_script_path(&file.path);
        if target.exists() {
            debug!(target = %target.display(), "Script already present, skipping");
            continue;
        }
        std::fs::copy(script, &target)?;
        info!(
            from = %script.display(),
            to = %target.display(),
            "Copied script next to media file"
        );
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneFile;

    fn scene_with_files(paths: &[PathBuf]) -> Scene {
        let files = paths
            .iter()
            .map(|p| {
                serde_json::from_value(serde_json::json!({ "path": p }))
                    .expect("valid scene file")
            })
            .collect::<Vec<SceneFile>>();
        Scene {
            id: "1".to_string(),
            title: Some("Test".to_string()),
            urls: vec![],
            files,
        }
    }

    #[test]
    fn sibling_path_replaces_extension() {
        assert_eq!(
            sibling_script_path(Path::new("/media/clip.mp4")),
            PathBuf::from("/media/clip.funscript")
        );
        assert_eq!(
            sibling_script_path(Path::new("/media/clip.1080p.mp4")),
            PathBuf::from("/media/clip.1080p.funscript")
        );
        assert_eq!(
            sibling_script_path(Path::new("/media/noext")),
            PathBuf::from("/media/noext.funscript")
        );
    }

    #[test]
    fn detects_existing_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("a.mp4");
        std::fs::write(&media, b"").unwrap();

        let scene = scene_with_files(&[media.clone()]);
        assert!(!scene_has_script(&scene));

        std::fs::write(dir.path().join("a.funscript"), b"{}").unwrap();
        assert!(scene_has_script(&scene));
    }

    #[test]
    fn copies_to_every_variant_lacking_a_script() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.mp4");
        let second = dir.path().join("b.mkv");
        std::fs::write(&first, b"").unwrap();
        std::fs::write(&second, b"").unwrap();

        let script = dir.path().join("cached.funscript");
        std::fs::write(&script, b"{\"version\":\"1.0\"}").unwrap();

        let scene = scene_with_files(&[first, second]);
        let copied = associate(&script, &scene).unwrap();
        assert_eq!(copied, 2);
        assert!(dir.path().join("a.funscript").is_file());
        assert!(dir.path().join("b.funscript").is_file());
        assert_eq!(
            std::fs::read(dir.path().join("a.funscript")).unwrap(),
            b"{\"version\":\"1.0\"}"
        );
    }

    #[test]
    fn association_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("a.mp4");
        std::fs::write(&media, b"").unwrap();

        let script = dir.path().join("cached.funscript");
        std::fs::write(&script, b"new contents").unwrap();

        let existing = dir.path().join("a.funscript");
        std::fs::write(&existing, b"old contents").unwrap();

        let scene = scene_with_files(&[media]);
        let copied = associate(&script, &scene).unwrap();
        assert_eq!(copied, 0);
        // Existing sibling untouched.
        assert_eq!(std::fs::read(existing).unwrap(), b"old contents");
    }
}
