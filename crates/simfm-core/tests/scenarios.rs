//! End-to-end behavior of the file manager, run against both backends.

use std::collections::BTreeSet;
use std::fs;

use simfm_core::{
    load_snapshot, save_snapshot, ClipboardMode, Command, Event, FileManager, FileSystem, LiveFs,
    MessageCode, SimFs,
};
use tempfile::TempDir;

fn child_names<F: FileSystem>(fm: &FileManager<F>, folder: &F::Object) -> Vec<String> {
    let mut messages = Vec::new();
    fm.list_folder(folder, &mut messages)
        .iter()
        .map(|o| fm.fs().name(o))
        .collect()
}

/// Copies `file` into `folder` three times.
fn paste_three_times<F: FileSystem>(fm: &mut FileManager<F>, file: F::Object, folder: F::Object) {
    fm.set_current_folder(folder.clone());
    for _ in 0..3 {
        let mut messages = Vec::new();
        fm.copy(file.clone());
        assert!(fm.paste(&mut messages).is_some());
        assert!(messages.is_empty(), "unexpected messages: {messages:?}");
    }
    let files: Vec<String> = child_names(fm, &folder)
        .into_iter()
        .filter(|name| name.ends_with(".txt"))
        .collect();
    assert_eq!(
        files,
        vec!["report(1).txt", "report(2).txt", "report(3).txt", "report.txt"]
    );
}

fn self_targets_keep_clipboard<F: FileSystem>(fm: &mut FileManager<F>, folder: F::Object) {
    fm.set_current_folder(folder.clone());
    for mode in [ClipboardMode::Copy, ClipboardMode::Cut] {
        let mut messages = Vec::new();
        fm.add_to_clipboard(folder.clone(), mode);
        assert!(fm.paste(&mut messages).is_none());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].code(), MessageCode::DestinationIsSource);
        assert_eq!(fm.clipboard().object(), Some(&folder));
    }
}

fn cut_into_parent_is_identity<F: FileSystem>(
    fm: &mut FileManager<F>,
    file: F::Object,
    folder: F::Object,
) {
    let mut messages = Vec::new();
    let before = child_names(fm, &folder);
    fm.set_current_folder(folder.clone());
    fm.cut(file.clone());

    let result = fm.paste(&mut messages).unwrap();
    assert_eq!(result, file);
    assert!(fm.fs().exists(&file));
    assert_eq!(child_names(fm, &folder), before);
    assert!(fm.has_empty_clipboard());
}

fn mkdir_collides<F: FileSystem>(fm: &mut FileManager<F>, folder: F::Object) {
    let mut messages = Vec::new();
    fm.set_current_folder(folder);
    let first = fm.make_directory("data", &mut messages).unwrap();
    let second = fm.make_directory("data", &mut messages).unwrap();
    assert_eq!(fm.fs().name(&first), "data");
    assert_eq!(fm.fs().name(&second), "data(1)");
    assert!(messages.is_empty());
}

/// Deletes a folder holding a nested subtree, then deletes it again.
fn recursive_delete<F: FileSystem>(fm: &mut FileManager<F>, folder: F::Object) {
    let mut messages = Vec::new();
    assert!(fm.fs().exists(&folder));
    fm.set_current_object(folder.clone());
    assert!(fm.delete_current(&mut messages));
    assert!(!fm.fs().exists(&folder));

    fm.set_current_object(folder);
    assert!(!fm.delete_current(&mut messages));
    assert_eq!(messages.len(), 1);
}

fn move_between_folders<F: FileSystem>(
    fm: &mut FileManager<F>,
    file: F::Object,
    from: F::Object,
    to: F::Object,
) {
    fm.cut(file.clone());
    match fm.execute(Command::Open(to.clone())) {
        Event::FolderOpened(opened) => assert_eq!(opened, to),
        other => panic!("unexpected event: {other:?}"),
    }
    let moved = match fm.execute(Command::Paste) {
        Event::Pasted { object, messages } => {
            assert!(messages.is_empty());
            object
        }
        other => panic!("unexpected event: {other:?}"),
    };
    assert!(!fm.fs().exists(&file));
    assert_eq!(fm.fs().parent(&moved), Some(to));
    assert!(!child_names(fm, &from).contains(&fm.fs().name(&moved)));
}

struct LiveTree {
    _tmp: TempDir,
    root: simfm_core::LiveObject,
    nested: simfm_core::LiveObject,
    report: simfm_core::LiveObject,
    target: simfm_core::LiveObject,
}

/// root/
///   nested/a/b/deep.txt
///   report.txt
///   target/
fn live_tree() -> LiveTree {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("root");
    fs::create_dir_all(root.join("nested/a/b")).unwrap();
    fs::write(root.join("nested/a/b/deep.txt"), "deep").unwrap();
    fs::write(root.join("report.txt"), "quarterly").unwrap();
    fs::create_dir(root.join("target")).unwrap();

    let live = LiveFs::new();
    LiveTree {
        root: live.open(&root).unwrap(),
        nested: live.open(&root.join("nested")).unwrap(),
        report: live.open(&root.join("report.txt")).unwrap(),
        target: live.open(&root.join("target")).unwrap(),
        _tmp: tmp,
    }
}

struct SimTree {
    fm: FileManager<SimFs>,
    root: simfm_core::SimObject,
    nested: simfm_core::SimObject,
    report: simfm_core::SimObject,
    target: simfm_core::SimObject,
}

fn sim_tree() -> SimTree {
    let mut sim = SimFs::new("root");
    let root = sim.root();
    let nested = sim.make_directory(&root, "nested").unwrap();
    let a = sim.make_directory(&nested, "a").unwrap();
    let b = sim.make_directory(&a, "b").unwrap();
    sim.create_file(&b, "deep.txt", b"deep".to_vec()).unwrap();
    let report = sim.create_file(&root, "report.txt", b"quarterly".to_vec()).unwrap();
    let target = sim.make_directory(&root, "target").unwrap();
    SimTree {
        fm: FileManager::new(sim),
        root,
        nested,
        report,
        target,
    }
}

#[test]
fn live_repeated_paste_counts_up() {
    let t = live_tree();
    let mut fm = FileManager::new(LiveFs::new());
    paste_three_times(&mut fm, t.report, t.root);
}

#[test]
fn sim_repeated_paste_counts_up() {
    let mut t = sim_tree();
    paste_three_times(&mut t.fm, t.report, t.root);
}

#[test]
fn live_self_target() {
    let t = live_tree();
    let mut fm = FileManager::new(LiveFs::new());
    self_targets_keep_clipboard(&mut fm, t.target);
}

#[test]
fn sim_self_target() {
    let mut t = sim_tree();
    self_targets_keep_clipboard(&mut t.fm, t.target);
}

#[test]
fn live_cut_into_parent() {
    let t = live_tree();
    let mut fm = FileManager::new(LiveFs::new());
    cut_into_parent_is_identity(&mut fm, t.report, t.root);
}

#[test]
fn sim_cut_into_parent() {
    let mut t = sim_tree();
    cut_into_parent_is_identity(&mut t.fm, t.report, t.root);
}

#[test]
fn live_mkdir_collision() {
    let t = live_tree();
    let mut fm = FileManager::new(LiveFs::new());
    mkdir_collides(&mut fm, t.target);
}

#[test]
fn sim_mkdir_collision() {
    let mut t = sim_tree();
    mkdir_collides(&mut t.fm, t.target);
}

#[test]
fn live_recursive_delete() {
    let t = live_tree();
    let mut fm = FileManager::new(LiveFs::new());
    recursive_delete(&mut fm, t.nested);
    assert_eq!(child_names(&fm, &t.root), vec!["target", "report.txt"]);
}

#[test]
fn sim_recursive_delete() {
    let mut t = sim_tree();
    let before = t.fm.fs().node_count();
    recursive_delete(&mut t.fm, t.nested);
    // nested, a, b and deep.txt are gone.
    assert_eq!(t.fm.fs().node_count(), before - 4);
    assert_eq!(child_names(&t.fm, &t.root), vec!["target", "report.txt"]);
}

#[test]
fn live_move() {
    let t = live_tree();
    let mut fm = FileManager::new(LiveFs::new());
    move_between_folders(&mut fm, t.report, t.root, t.target);
}

#[test]
fn sim_move() {
    let mut t = sim_tree();
    move_between_folders(&mut t.fm, t.report, t.root, t.target);
}

#[test]
fn scanned_tree_survives_snapshot_round_trip() {
    let t = live_tree();
    let real_root = t.root.real_path().unwrap().to_path_buf();
    let sim = SimFs::scan(&real_root, None).unwrap();
    let out = TempDir::new().unwrap();

    let artifact = save_snapshot(&sim, out.path()).unwrap();
    assert_eq!(artifact.file_name().unwrap(), "root.simul");
    let restored = load_snapshot(&artifact).unwrap();

    fn describe(sim: &SimFs) -> BTreeSet<(String, u64, bool)> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![sim.root()];
        while let Some(obj) = stack.pop() {
            seen.insert((
                sim.path(&obj).to_string_lossy().into_owned(),
                sim.size_in_bytes(&obj).unwrap(),
                sim.attributes(&obj).unwrap().read_only,
            ));
            if !sim.is_file(&obj) {
                stack.extend(sim.content(&obj).unwrap());
            }
        }
        seen
    }

    assert_eq!(describe(&sim), describe(&restored));
    let deep = restored.resolve("root/nested/a/b/deep.txt").unwrap();
    assert_eq!(restored.read_content(&deep).unwrap(), b"deep".to_vec());
}

#[test]
fn simulated_work_leaves_real_folder_untouched() {
    let t = live_tree();
    let real_root = t.root.real_path().unwrap().to_path_buf();
    let sim = SimFs::scan(&real_root, None).unwrap();
    let root = sim.root();
    let mut fm = FileManager::with_folder(sim, root);
    let mut messages = Vec::new();

    fm.make_directory("only-in-memory", &mut messages).unwrap();
    let report = fm.fs().resolve("root/report.txt").unwrap();
    fm.set_current_object(report);
    assert!(fm.delete_current(&mut messages));

    assert!(!real_root.join("only-in-memory").exists());
    assert!(real_root.join("report.txt").exists());
}
