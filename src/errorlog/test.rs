use super::*;
use crate::metadata::CellLabel;

fn label(cell_number: usize) -> CellLabel {
    CellLabel::new("Mapping.msl", 12, 4, cell_number)
}

#[test]
fn starts_empty() {
    let log = ErrorLog::new();
    assert!(log.is_empty());
    assert_eq!(log.len(), 0);
    assert!(!log.has_errors());
}

#[test]
fn warnings_alone_do_not_fail_the_pass() {
    let mut log = ErrorLog::new();
    log.add(Record::warning(
        ViewGenErrorCode::OverlappingFragments,
        "fragments overlap",
        vec![label(0), label(1)],
    ));
    assert_eq!(log.len(), 1);
    assert!(!log.has_errors());
}

#[test]
fn one_error_fails_the_pass() {
    let mut log = ErrorLog::new();
    log.add(Record::warning(
        ViewGenErrorCode::OverlappingFragments,
        "fragments overlap",
        vec![],
    ));
    log.add(Record::error(
        ViewGenErrorCode::NoDefaultValue,
        "no default for S.kind",
        vec![label(0)],
    ));
    assert!(log.has_errors());
}

#[test]
fn merge_preserves_record_order() {
    let mut first = ErrorLog::new();
    first.add(Record::error(
        ViewGenErrorCode::MissingExtentMapping,
        "extent Orders is unmapped",
        vec![],
    ));
    let mut second = ErrorLog::new();
    second.add(Record::warning(
        ViewGenErrorCode::AmbiguousMultiConstantMapping,
        "two constants for S.kind",
        vec![label(2)],
    ));
    first.merge(second);
    assert_eq!(first.len(), 2);
    assert_eq!(first.records()[0].code, ViewGenErrorCode::MissingExtentMapping);
    assert_eq!(
        first.records()[1].code,
        ViewGenErrorCode::AmbiguousMultiConstantMapping
    );
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(ViewGenErrorCode::NoDefaultValue.number(), 2042);
    assert_eq!(ViewGenErrorCode::AmbiguousMultiConstantMapping.number(), 2011);
    assert_eq!(ViewGenErrorCode::OverlappingFragments.number(), 2012);
    assert_eq!(ViewGenErrorCode::MissingExtentMapping.number(), 2062);
}

#[test]
fn user_message_cites_the_source_fragments() {
    let record = Record::error(
        ViewGenErrorCode::NoDefaultValue,
        "no default for S.kind",
        vec![label(0), label(1)],
    );
    assert_eq!(record.code(), 2042);
    assert_eq!(
        record.user_message().unwrap(),
        "no default for S.kind [Mapping.msl (12, 4); Mapping.msl (12, 4)]"
    );
}

#[test]
fn user_message_without_sources_is_bare() {
    let record = Record::warning(
        ViewGenErrorCode::OverlappingFragments,
        "fragments overlap",
        vec![],
    );
    assert_eq!(record.user_message().unwrap(), "fragments overlap");
}

#[test]
fn technical_message_names_the_code_variant() {
    let record = Record::error(ViewGenErrorCode::NoDefaultValue, "no default", vec![]);
    assert_eq!(record.technical_message(), "NoDefaultValue: no default");
}

#[test]
fn display_lists_one_record_per_line() {
    let mut log = ErrorLog::new();
    log.add(Record::error(
        ViewGenErrorCode::NoDefaultValue,
        "no default for S.kind",
        vec![],
    ));
    log.add(Record::error(
        ViewGenErrorCode::MissingExtentMapping,
        "extent Orders is unmapped",
        vec![],
    ));
    assert_eq!(
        log.to_string(),
        "error 2042: no default for S.kind\nerror 2062: extent Orders is unmapped"
    );
}
