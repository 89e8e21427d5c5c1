use super::*;

fn table(entries: &[(i32, i32, u32)]) -> PositionTable {
    PositionTable::new(
        entries
            .iter()
            .map(|&(x, y, s)| PositionEntry::new(x, y, s))
            .collect(),
    )
    .unwrap()
}

#[test]
fn empty_table_is_rejected() {
    assert!(matches!(
        PositionTable::new(vec![]),
        Err(AvatarGifError::Validation(_))
    ));
}

#[test]
fn zero_size_is_rejected() {
    let err = PositionTable::new(vec![
        PositionEntry::new(0, 0, 10),
        PositionEntry::new(0, 0, 0),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("entry 1"));
}

#[test]
fn lookup_wraps_modulo_table_length() {
    let t = table(&[(1, 2, 10), (3, 4, 20), (5, 6, 30)]);
    assert_eq!(t.entry_for_frame(0), PositionEntry::new(1, 2, 10));
    assert_eq!(t.entry_for_frame(2), PositionEntry::new(5, 6, 30));
    assert_eq!(t.entry_for_frame(3), t.entry_for_frame(0));
    assert_eq!(t.entry_for_frame(7), t.entry_for_frame(1));
}

#[test]
fn distinct_sizes_only_cover_used_entries() {
    let t = table(&[(0, 0, 10), (0, 0, 20), (0, 0, 10), (0, 0, 40)]);
    assert_eq!(t.distinct_sizes(2).into_iter().collect::<Vec<_>>(), [10, 20]);
    assert_eq!(
        t.distinct_sizes(9).into_iter().collect::<Vec<_>>(),
        [10, 20, 40]
    );
    assert!(t.distinct_sizes(0).is_empty());
}

#[test]
fn json_document_parses_triples() {
    let tables = PositionTables::from_json_str(
        r#"{ "2.gif": [[50, 60, 120], [-4, 8, 64]], "3.gif": [[1, 1, 8]] }"#,
    )
    .unwrap();

    assert_eq!(tables.names().collect::<Vec<_>>(), ["2.gif", "3.gif"]);
    let t = tables.lookup("2.gif").unwrap();
    assert_eq!(t.len(), 2);
    assert_eq!(t.entries()[1], PositionEntry::new(-4, 8, 64));
}

#[test]
fn json_with_empty_table_is_rejected() {
    let err = PositionTables::from_json_str(r#"{ "2.gif": [] }"#).unwrap_err();
    assert!(matches!(err, AvatarGifError::Validation(_)));
    assert!(err.to_string().contains("2.gif"));
}

#[test]
fn json_round_trips_through_serializer() {
    let tables = PositionTables::new().with("a.gif", table(&[(1, 2, 3), (4, 5, 6)]));
    let json = tables.to_json_string().unwrap();
    let back = PositionTables::from_json_str(&json).unwrap();
    assert_eq!(back.lookup("a.gif").unwrap(), tables.lookup("a.gif").unwrap());
}

#[test]
fn unknown_source_is_source_not_found() {
    let tables = PositionTables::new().with("2.gif", table(&[(0, 0, 1)]));
    assert!(tables.contains("2.gif"));
    assert!(matches!(
        tables.lookup("../2.gif"),
        Err(AvatarGifError::SourceNotFound(_))
    ));
}
