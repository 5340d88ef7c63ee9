use opsdesk::events::seen;
use opsdesk::store::RequestStore;
use tempfile::tempdir;

#[test]
fn first_delivery_passes_and_replays_inside_the_window_do_not() {
    let dir = tempdir().expect("tempdir");
    let store = RequestStore::open(&dir.path().join("requests.sqlite3")).expect("open");
    store.ensure_schema().expect("schema");

    assert!(!seen(&store, "msg-evt-1", 1_000, 900).expect("first"));
    assert!(seen(&store, "msg-evt-1", 1_001, 900).expect("replay"));
    assert!(seen(&store, "msg-evt-1", 1_899, 900).expect("late replay"));

    // A different key is unaffected.
    assert!(!seen(&store, "msg-evt-2", 1_002, 900).expect("other key"));
}

#[test]
fn expired_keys_are_reclaimed_and_start_a_fresh_window() {
    let dir = tempdir().expect("tempdir");
    let store = RequestStore::open(&dir.path().join("requests.sqlite3")).expect("open");
    store.ensure_schema().expect("schema");

    assert!(!seen(&store, "dec-evt-1", 1_000, 900).expect("first"));

    // At expiry the key is claimable again, and the claim re-arms the window.
    assert!(!seen(&store, "dec-evt-1", 1_900, 900).expect("after expiry"));
    assert!(seen(&store, "dec-evt-1", 1_901, 900).expect("inside new window"));
}
