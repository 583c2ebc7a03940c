use inidb::{writer, Dataset, InsertError};

const SAMPLE: &str = "[Section1]
hello=world
[Section2]
boolean=true
integer=5
string=\"is a string\"
float=1.0
";

fn write_to_string(data: &Dataset) -> String {
    let mut out = Vec::new();
    data.write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_write_canonical_document() {
    let data = Dataset::parse_str(SAMPLE).unwrap();
    assert_eq!(write_to_string(&data), SAMPLE);
}

#[test]
fn test_write_normalizes_formatting() {
    let text = "; comment\n[ Server ]\n  host : example.org  # primary\nmotd = \"hi  there\"\n";
    let data = Dataset::parse_str(text).unwrap();
    assert_eq!(
        write_to_string(&data),
        "[Server]\nhost=example.org\nmotd=\"hi  there\"\n"
    );
}

#[test]
fn test_round_trip() {
    let mut data = Dataset::new();
    let mut section = data.add_section("Paths").unwrap();
    section.add_pair("unix", "/usr/local/bin").unwrap();
    section.add_pair("windows", "C:\\Program Files\\App").unwrap();
    section.add_pair("empty", "").unwrap();
    section.add_pair("padded", "  leading and trailing  ").unwrap();
    section.add_pair("math", "2 + 2 = 4").unwrap();
    section.add_pair("ipv6", "fe80::1").unwrap();
    section.add_pair("symbols", "~!@$%^&*()_+-{}|\\:'<>?,./").unwrap();
    section.add_pair("accent", "Zoë  Ångström").unwrap();
    data.add_section("Empty Section").unwrap();
    data.add_pair("Paths", "unix", "/opt/bin").unwrap();

    let text = write_to_string(&data);
    let reread = Dataset::parse_str(&text).unwrap();

    assert_eq!(reread.section_count(), 2);
    for (expected, actual) in data.sections().zip(reread.sections()) {
        assert_eq!(expected.name(), actual.name());
        assert!(expected.pairs().eq(actual.pairs()));
    }
    assert_eq!(write_to_string(&reread), text);
}

#[test]
fn test_write_empty_dataset() {
    assert_eq!(write_to_string(&Dataset::new()), "");
}

#[test]
fn test_write_function() {
    let data = Dataset::parse_str("[A]\nx=1\n").unwrap();
    let mut out = Vec::new();
    writer::write(&data, &mut out).unwrap();
    assert_eq!(out, b"[A]\nx=1\n");
}

#[test]
fn test_write_into_full_slice_fails() {
    let data = Dataset::parse_str(SAMPLE).unwrap();
    let mut out = [0u8; 8];
    assert!(data.write_to(&mut out[..]).is_err());
}

#[test]
fn test_unwritable_values_are_rejected() {
    let mut data = Dataset::new();
    data.add_section("S").unwrap();

    for value in ["a;b", "x # y", "say \"hi\"", "[v]", "v]", "two\nlines", "tab\there", "nul\0"] {
        assert_eq!(
            data.add_pair("S", "k", value),
            Err(InsertError::InvalidValue),
            "{value:?}"
        );
    }
    assert_eq!(data.has_section("S").unwrap().pair_count(), 0);
    assert_eq!(write_to_string(&data), "[S]\n");
}

#[test]
fn test_unwritable_keys_are_rejected() {
    let mut data = Dataset::new();
    let mut section = data.add_section("S").unwrap();

    for key in ["", "k=1", "k:1", "two words", "1st", "semi;colon", "br]acket"] {
        assert_eq!(section.add_pair(key, "v"), Err(InsertError::InvalidKey), "{key:?}");
    }
    assert_eq!(section.pair_count(), 0);
}

#[test]
fn test_unwritable_section_names_are_rejected() {
    let mut data = Dataset::new();

    for name in ["", "a]b", "[a", " padded", "padded ", "two  spaces", "semi;colon", "1st"] {
        assert!(
            matches!(data.add_section(name), Err(InsertError::InvalidName)),
            "{name:?}"
        );
    }
    assert!(data.is_empty());
}

#[test]
fn test_everything_inserted_reads_back() {
    let mut data = Dataset::new();
    let mut section = data.add_section("Mixed Bag").unwrap();
    for (key, value) in [
        ("plain", "value"),
        ("quoted", "a  b"),
        ("edge", " "),
        ("utf8", "naïve café"),
        ("eq", "=:="),
    ] {
        section.add_pair(key, value).unwrap();
    }

    let reread = Dataset::parse_str(&write_to_string(&data)).unwrap();
    let written = data.has_section("Mixed Bag").unwrap();
    let read = reread.has_section("Mixed Bag").unwrap();
    assert!(written.pairs().eq(read.pairs()));
}
