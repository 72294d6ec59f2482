//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::path::PathBuf;
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::generator::{GenerateStats, Generator};
use crate::Folio;

/// Pre-render every route into the public directory
pub fn run(folio: &Folio) -> Result<()> {
    generate(folio).map(|_| ())
}

/// Generate and report what was written
pub fn generate(folio: &Folio) -> Result<GenerateStats> {
    let start = Instant::now();

    let stats = Generator::new(folio)?.generate()?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(stats)
}

/// Paths whose changes trigger a rebuild
pub fn watched_paths(folio: &Folio) -> Vec<PathBuf> {
    [
        folio.content_dir.clone(),
        folio.static_dir.clone(),
        folio.base_dir.join("_config.yml"),
    ]
    .into_iter()
    .filter(|p| p.exists())
    .collect()
}

/// Watch content, static assets and config, regenerating on change
pub fn watch(folio: &Folio) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for path in watched_paths(folio) {
        let mode = if path.is_dir() {
            notify::RecursiveMode::Recursive
        } else {
            notify::RecursiveMode::NonRecursive
        };
        watcher.watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let mut last_rebuild = Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, regenerating...");
                    // Reload so config edits are picked up
                    let result = Folio::new(&folio.base_dir).and_then(|f| run(&f));
                    if let Err(e) = result {
                        tracing::error!("Generation failed: {}", e);
                    }
                    last_rebuild = Instant::now();
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_watched_paths_skip_missing() {
        let tmp = TempDir::new().unwrap();
        let folio = Folio::new(tmp.path()).unwrap();
        assert!(watched_paths(&folio).is_empty());

        fs::create_dir_all(&folio.content_dir).unwrap();
        fs::write(tmp.path().join("_config.yml"), "title: x\n").unwrap();
        let paths = watched_paths(&folio);
        assert_eq!(
            paths,
            vec![folio.content_dir.clone(), tmp.path().join("_config.yml")]
        );
    }

    #[test]
    fn test_generate_skips_unparseable_post() {
        let tmp = TempDir::new().unwrap();
        let posts = tmp.path().join("outstatic/content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("ok.md"), "---\ntitle: Ok\n---\nFine\n").unwrap();
        fs::write(posts.join("broken.md"), "---\ntitle: [unclosed\n---\nBody\n").unwrap();

        let folio = Folio::new(tmp.path()).unwrap();
        // The unparseable file is skipped when listing, so generation succeeds
        let stats = generate(&folio).unwrap();
        assert_eq!(stats.posts, 1);
    }
}
