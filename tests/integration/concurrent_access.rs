use persist::{Metadata, PersistError, Persister};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

#[test]
fn different_files_save_in_parallel() {
    let temp_dir = TempDir::new().unwrap();
    let persister = Persister::default();
    let meta = Metadata::new("shard", "1");

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let persister = persister.clone();
            let meta = meta.clone();
            let path = temp_dir.path().join(format!("shard-{}.json", i));
            thread::spawn(move || {
                persister.save_json(&meta, &vec![i; 16], &path).unwrap();
                persister.load_json::<Vec<u32>>(&meta, &path).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), vec![i as u32; 16]);
    }
    assert_eq!(persister.registry().active_count(), 0);
}

#[test]
fn overlapping_operation_on_same_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contended.json");
    let persister = Persister::default();
    let meta = Metadata::new("contended", "1");
    persister.save_json(&meta, &1u32, &path).unwrap();

    let held = Arc::new(Barrier::new(2));
    let done = Arc::new(Barrier::new(2));

    let holder = {
        let persister = persister.clone();
        let path = path.clone();
        let held = held.clone();
        let done = done.clone();
        thread::spawn(move || {
            let _claim = persister.registry().claim(&path).unwrap();
            held.wait();
            done.wait();
        })
    };

    held.wait();
    let err = persister.load_json::<u32>(&meta, &path).unwrap_err();
    assert!(matches!(err, PersistError::FileInUse(_)));
    done.wait();
    holder.join().unwrap();

    assert_eq!(persister.load_json::<u32>(&meta, &path).unwrap(), 1);
}

#[test]
fn separate_persisters_track_claims_independently() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("independent.json");
    let first = Persister::default();
    let second = Persister::default();

    let _claim = first.registry().claim(&path).unwrap();
    second
        .save_json(&Metadata::new("independent", "1"), &"value", &path)
        .unwrap();
    assert!(first.registry().is_claimed(&path));
    assert!(!second.registry().is_claimed(&path));
}
