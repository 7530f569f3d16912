//! Layout survives a restart through file-backed storage.

use std::sync::Arc;

use tempfile::TempDir;
use tickerdash_layout::{
    DashboardLayout, FileStorage, LayoutEvent, MemoryGrid, NodeOptions, Storage, TemplateRegistry,
    LAYOUT_KEY,
};

fn open_layout(storage: Arc<FileStorage>) -> DashboardLayout {
    DashboardLayout::new(
        Box::new(MemoryGrid::new()),
        Arc::new(TemplateRegistry::builtin()),
        storage,
    )
}

#[test]
fn test_user_changes_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.json");

    {
        let storage = Arc::new(FileStorage::open(&path).unwrap());
        let layout = open_layout(storage);
        layout.initialize().unwrap();
        layout.remove_widget("news").unwrap();
        layout
            .add_widget("stocks", Some(NodeOptions::at(0, 30)))
            .unwrap();
        layout.move_widget("kpis", 8, 10).unwrap();
    }

    let storage = Arc::new(FileStorage::open(&path).unwrap());
    let layout = open_layout(storage.clone());
    let mut rx = layout.subscribe();
    layout.initialize().unwrap();

    let active = layout.active_widgets();
    assert!(!active.contains(&"news".to_string()));
    assert!(active.contains(&"stocks".to_string()));

    let kpis = layout.nodes().into_iter().find(|n| n.id == "kpis").unwrap();
    assert_eq!((kpis.x, kpis.y), (8, 10));

    let mut mounted = 0;
    while let Ok(event) = rx.try_recv() {
        if let LayoutEvent::WidgetAdded { .. } = event {
            mounted += 1;
        }
    }
    assert_eq!(mounted, active.len());
}

#[test]
fn test_corrupt_file_layout_recovers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.json");

    let storage = Arc::new(FileStorage::open(&path).unwrap());
    storage.set(LAYOUT_KEY, "not a layout").unwrap();

    let layout = open_layout(storage.clone());
    assert_eq!(layout.initialize().unwrap(), 6);

    let reopened = FileStorage::open(&path).unwrap();
    let saved = reopened.get(LAYOUT_KEY).unwrap();
    assert!(saved.starts_with('['));
    assert!(saved.contains("\"portfolio\""));
}
