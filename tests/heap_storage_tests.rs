use inidb::{
    Allocator, Budget, Dataset, ErrorKind, HeapStorage, InsertError, NoHeap, Storage,
    StorageError,
};

#[test]
fn test_no_heap_refuses_to_start() {
    assert!(matches!(
        Dataset::new_in(NoHeap),
        Err(StorageError::AllocationRefused { .. })
    ));
    assert!(HeapStorage::new_in(NoHeap).is_err());
}

#[test]
fn test_budget_is_released_on_drop() {
    let mut budget = Budget::new(1 << 20);
    {
        let mut data = Dataset::new_in(&mut budget).unwrap();
        data.read_from(&b"[A]\nkey=value\n[B]\nother=thing\n"[..])
            .unwrap();
        let storage = data.storage();
        assert!(storage.acquired_bytes() > 0);
        assert_eq!(storage.acquired_bytes(), storage.allocator().used());
    }
    assert_eq!(budget.used(), 0);
}

#[test]
fn test_budget_exhausted_during_parse() {
    let text: String = (0..20).map(|i| format!("[Section{i}]\nkey=value\n")).collect();

    let mut data = Dataset::new_in(Budget::new(4096)).unwrap();
    let err = data.read_from(text.as_bytes()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StorageExhausted);
    assert!(data.is_empty());
    assert_eq!(data.storage().allocator().used(), 0);
}

#[test]
fn test_budget_exhausted_on_insert() {
    let mut data = Dataset::new_in(Budget::new(700)).unwrap();
    assert!(matches!(
        data.add_section("Section"),
        Err(InsertError::Storage(StorageError::AllocationRefused { .. }))
    ));
    assert!(data.is_empty());
}

#[test]
fn test_budget_accounting() {
    let mut budget = Budget::new(100);
    assert_eq!(budget.limit(), 100);

    assert!(budget.acquire(60));
    assert!(!budget.acquire(41));
    assert_eq!(budget.remaining(), 40);
    assert!(budget.acquire(40));

    budget.release(100);
    assert_eq!(budget.used(), 0);
}

#[test]
fn test_growth_beyond_initial_capacity() {
    let mut text = String::from("[Wide]\n");
    for i in 0..100 {
        text.push_str(&format!("key{i}=value{i}\n"));
    }
    for i in 0..20 {
        text.push_str(&format!("[Section{i}]\n"));
    }

    let data = Dataset::parse_str(&text).unwrap();
    assert_eq!(data.section_count(), 21);
    assert_eq!(data.has_section("Wide").unwrap().pair_count(), 100);
    assert_eq!(data.get_value("Wide", "key99"), Some("value99"));
    assert_eq!(data.storage().pair_capacity(0), 128);
    assert_eq!(data.storage().section_capacity(), 32);
    assert_eq!(data.storage().section_count(), 21);
}
