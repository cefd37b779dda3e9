use copytools_core::{HistoryList, SenderInfo};
use pretty_assertions::assert_eq;

fn sender() -> SenderInfo {
    SenderInfo {
        url: "https://example.com/form".to_string(),
        title: "Form".to_string(),
        favicon: "https://example.com/favicon.ico".to_string(),
    }
}

fn texts(list: &HistoryList) -> Vec<&str> {
    list.list().iter().map(|r| r.text.as_str()).collect()
}

#[test]
fn record_prepends_newest_first() {
    let mut list = HistoryList::default();
    list.record("T1", "INPUT", 10, &sender(), 1_000);
    list.record("T2", "SPAN", 20, &sender(), 2_000);

    assert_eq!(texts(&list), vec!["T2", "T1"]);
    let newest = &list.list()[0];
    assert_eq!(newest.id, 2_000);
    assert_eq!(newest.element_tag, "SPAN");
    assert_eq!(newest.timestamp, 20);
    assert_eq!(newest.url, "https://example.com/form");
    assert_eq!(newest.title, "Form");
}

#[test]
fn fifty_one_records_keep_the_fifty_newest() {
    let mut list = HistoryList::new(50);
    for n in 0..51 {
        list.record(format!("copy {n}"), "DIV", n, &sender(), 1_000 + n);
    }

    assert_eq!(list.len(), 50);
    assert_eq!(list.list()[0].text, "copy 50");
    assert_eq!(list.list()[49].text, "copy 1");
    assert!(list.list().iter().all(|r| r.text != "copy 0"));
}

#[test]
fn length_never_exceeds_bound_for_mixed_operations() {
    let mut list = HistoryList::new(3);
    for max in [3usize, 1, 7, 2, 5] {
        list.set_max_size(max);
        assert!(list.len() <= max);
        for n in 0..10 {
            list.record("x", "P", n, &sender(), n);
            assert!(list.len() <= max);
        }
        assert_eq!(list.len(), max);
    }
}

#[test]
fn shrinking_bound_truncates_oldest_and_reports_change() {
    let mut list = HistoryList::new(10);
    for n in 0..5 {
        list.record(format!("t{n}"), "P", n, &sender(), n);
    }
    assert!(list.set_max_size(2));
    assert_eq!(texts(&list), vec!["t4", "t3"]);
    assert!(!list.set_max_size(20));
}

#[test]
fn clear_empties_regardless_of_size() {
    let mut list = HistoryList::new(10);
    assert!(!list.clear());
    for n in 0..7 {
        list.record("t", "P", n, &sender(), n);
    }
    assert!(list.clear());
    assert!(list.list().is_empty());
}

#[test]
fn ids_stay_unique_when_clock_does_not_advance() {
    let mut list = HistoryList::default();
    list.record("a", "P", 1, &sender(), 5_000);
    list.record("b", "P", 1, &sender(), 5_000);
    list.record("c", "P", 1, &sender(), 4_999);

    let ids: Vec<i64> = list.list().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![5_002, 5_001, 5_000]);
}

#[test]
fn restored_records_are_truncated_to_bound() {
    let mut source = HistoryList::new(10);
    for n in 0..6 {
        source.record(format!("t{n}"), "P", n, &sender(), n);
    }
    let restored = HistoryList::from_records(source.list().to_vec(), 4);
    assert_eq!(texts(&restored), vec!["t5", "t4", "t3", "t2"]);
}

#[test]
fn zero_bound_is_raised_to_one() {
    let mut list = HistoryList::new(0);
    list.record("a", "P", 1, &sender(), 1);
    list.record("b", "P", 2, &sender(), 2);
    assert_eq!(list.max_size(), 1);
    assert_eq!(texts(&list), vec!["b"]);
}
