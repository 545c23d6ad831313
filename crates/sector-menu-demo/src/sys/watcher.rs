use crate::events::AppEvent;
use async_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sector_menu::config::get_config_path;
use std::path::{Path, PathBuf};

// Watches the parent directory so editors that replace the file on save are still noticed.
pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match ensure_parent_dir(&config_path) {
        Ok(dir) => dir,
        Err(e) => {
            log::error!("Failed to create config directory for watching: {}", e);
            return;
        }
    };

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    );
    let mut watcher = match watcher {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }
    log::debug!("Watching {}", config_path.display());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) if touches_config(&event, &config_path) => {
                if tx.send(AppEvent::ConfigReload).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<PathBuf> {
    let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
    fs_err::create_dir_all(&dir)?;
    Ok(dir)
}

fn touches_config(event: &Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}
