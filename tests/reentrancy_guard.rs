// Reentrancy: calling back into a table from its own hash function is a
// contract violation that panics in debug builds instead of observing a
// half-updated table.
use hmap::GenericTable;
use std::cell::Cell;
use std::rc::Rc;

type BoxedHash = Box<dyn Fn(&String, u64) -> u64>;
type Table = GenericTable<String, i32, BoxedHash>;

fn reentrant_table() -> (Box<Table>, Rc<Cell<bool>>) {
    let target: Rc<Cell<*const Table>> = Rc::new(Cell::new(std::ptr::null()));
    let armed = Rc::new(Cell::new(false));

    let hash: BoxedHash = {
        let target = target.clone();
        let armed = armed.clone();
        Box::new(move |key: &String, seed: u64| {
            if armed.replace(false) {
                let t = target.get();
                if !t.is_null() {
                    // Re-enter the table that is currently hashing `key`.
                    let _ = unsafe { (*t).contains(&"other".to_string()) };
                }
            }
            key.len() as u64 ^ seed
        })
    };

    let table = Box::new(Table::with_seed_and_hasher(0, hash));
    target.set(&*table as *const Table);
    (table, armed)
}

#[test]
fn unarmed_hash_behaves_normally() {
    let (mut t, _armed) = reentrant_table();
    t.add("a".to_string(), 1);
    assert_eq!(t.get(&"a".to_string()), Some(&1));
}

#[cfg(debug_assertions)]
#[test]
fn reentry_from_hash_panics_in_debug() {
    let (mut t, armed) = reentrant_table();
    t.add("a".to_string(), 1);

    armed.set(true);
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = t.get(&"a".to_string());
    }));
    assert!(res.is_err(), "expected reentrancy to panic in debug builds");

    // The guard unwound cleanly; the table is still usable.
    assert_eq!(t.get(&"a".to_string()), Some(&1));
}
