//! Output and input spec grammar tests

use mrkit_core::{InputFormat, InputSpec, OutputFormat, OutputSpec, ParseErrorKind};

fn kind_of(text: &str) -> ParseErrorKind {
    OutputSpec::parse(text)
        .expect_err("spec should not parse")
        .kind()
        .clone()
}

#[test]
fn test_parse_kiji_table_output() {
    let spec = OutputSpec::parse("kiji:kiji://hbase/instance/table@123").unwrap();
    assert_eq!(spec.format(), OutputFormat::Kiji);
    assert_eq!(spec.location(), "kiji://hbase/instance/table");
    assert_eq!(spec.splits(), 123);
}

#[test]
fn test_parse_hfile_with_colons_and_semicolon() {
    let spec =
        OutputSpec::parse("hfile:kiji://hbase/instance/table;hdfs://localhost:1234/tmp/foo@8")
            .unwrap();
    assert_eq!(spec.format(), OutputFormat::HFile);
    assert_eq!(
        spec.location(),
        "kiji://hbase/instance/table;hdfs://localhost:1234/tmp/foo"
    );
    assert_eq!(spec.splits(), 8);
    assert_eq!(
        spec.hfile_locations(),
        Some((
            Some("kiji://hbase/instance/table"),
            "hdfs://localhost:1234/tmp/foo"
        ))
    );
}

#[test]
fn test_every_format_token_parses() {
    for format in OutputFormat::ALL {
        let text = format!("{}:/data/out@3", format.token());
        let spec = OutputSpec::parse(&text).unwrap();
        assert_eq!(spec.format(), format);
        assert_eq!(spec.location(), "/data/out");
        assert_eq!(spec.splits(), 3);
        assert_eq!(spec.to_string(), text);
    }
}

#[test]
fn test_missing_location_errors() {
    assert_eq!(kind_of("kiji:"), ParseErrorKind::MissingLocation);
    assert_eq!(kind_of("avro"), ParseErrorKind::MissingLocation);
    assert_eq!(kind_of("kiji:@4"), ParseErrorKind::MissingLocation);
}

#[test]
fn test_missing_splits_errors() {
    assert_eq!(kind_of("seq:asdf"), ParseErrorKind::MissingSplits);
    assert_eq!(
        kind_of("kiji:kiji://.env/default/table"),
        ParseErrorKind::MissingSplits
    );
}

#[test]
fn test_invalid_splits_errors() {
    for bad in ["text:/tmp@0", "text:/tmp@", "text:/tmp@-1", "text:/tmp@two", "text:/tmp@+3"] {
        assert!(
            matches!(kind_of(bad), ParseErrorKind::InvalidSplits(_)),
            "{bad} should have invalid splits"
        );
    }
}

#[test]
fn test_unknown_format_is_checked_first() {
    assert_eq!(
        kind_of("invalid:hdfs://localhost:8000/tmp/foo"),
        ParseErrorKind::UnknownFormat("invalid".into())
    );
    // Tokens are case-sensitive.
    assert!(matches!(kind_of("KIJI:t@1"), ParseErrorKind::UnknownFormat(_)));
    assert!(matches!(kind_of("bogus:"), ParseErrorKind::UnknownFormat(_)));
}

#[test]
fn test_error_message_names_rule_and_input() {
    let err = OutputSpec::parse("seq:asdf").unwrap_err();
    assert_eq!(err.input(), "seq:asdf");
    let msg = err.to_string();
    assert!(msg.contains("seq:asdf"), "{msg}");
    assert!(msg.contains("split"), "{msg}");
}

#[test]
fn test_create_round_trip() {
    let spec = OutputSpec::create(OutputFormat::MapFile, "hdfs://nn:8020/out", 16).unwrap();
    assert_eq!(spec.format(), OutputFormat::MapFile);
    assert_eq!(spec.location(), "hdfs://nn:8020/out");
    assert_eq!(spec.splits(), 16);
    assert_eq!(OutputSpec::parse(&spec.to_string()).unwrap(), spec);
}

#[test]
fn test_create_rejects_bad_arguments() {
    assert!(OutputSpec::create(OutputFormat::Text, "/tmp", 0).is_err());
    assert!(OutputSpec::create(OutputFormat::Text, "", 1).is_err());
}

#[test]
fn test_input_spec_grammar() {
    let spec = InputSpec::parse("text:/a,/b").unwrap();
    assert_eq!(spec.format(), InputFormat::Text);
    assert_eq!(spec.locations(), ["/a", "/b"]);

    let table = InputSpec::parse("kiji:kiji://.env/default/users").unwrap();
    assert_eq!(table.locations().len(), 1);

    let kind = |s: &str| InputSpec::parse(s).unwrap_err().kind().clone();
    assert!(matches!(kind("kiji:a,b"), ParseErrorKind::TooManyLocations { .. }));
    assert!(matches!(kind("foo:x"), ParseErrorKind::UnknownFormat(_)));
    assert_eq!(kind("text:"), ParseErrorKind::MissingLocation);
    assert_eq!(kind("text"), ParseErrorKind::MissingLocation);
    assert_eq!(kind("text:/a,,/b"), ParseErrorKind::EmptyLocation);
}
