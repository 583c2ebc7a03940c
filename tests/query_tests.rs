use inidb::Dataset;

const NUMBERS: &str = "[Numbers]
hex=0xDEADBEEF
hex_lower=0xdeadbeef
bare_hex=ff
unsigned=1234567890
signed=-1
float=3.14
text=not a number
[Flags]
on=true
off=false
maybe=yes
shout=TRUE
";

fn sample() -> Dataset {
    Dataset::parse_str(NUMBERS).unwrap()
}

#[test]
fn test_get_value() {
    let data = sample();
    assert_eq!(data.get_value("Numbers", "signed"), Some("-1"));
    assert_eq!(data.get_value("Numbers", "missing"), None);
    assert_eq!(data.get_value("Missing", "signed"), None);
    assert_eq!(data.get_value("numbers", "signed"), None);
}

#[test]
fn test_get_string() {
    let data = sample();
    assert_eq!(data.get_string("Numbers", "text", "default"), "not a number");
    assert_eq!(data.get_string("Numbers", "missing", "default"), "default");
    assert_eq!(data.get_string("Missing", "text", "default"), "default");
}

#[test]
fn test_get_hex() {
    let data = sample();
    assert_eq!(data.get_hex("Numbers", "hex", 0), 0xDEAD_BEEF);
    assert_eq!(data.get_hex("Numbers", "hex_lower", 0), 0xDEAD_BEEF);
    assert_eq!(data.get_hex("Numbers", "bare_hex", 0), 0xFF);
    assert_eq!(data.get_hex("Numbers", "text", 7), 7);
    assert_eq!(data.get_hex("Numbers", "missing", 7), 7);
}

#[test]
fn test_get_unsigned() {
    let data = sample();
    assert_eq!(data.get_unsigned("Numbers", "unsigned", 0), 1_234_567_890);
    assert_eq!(data.get_unsigned("Numbers", "signed", 5), 5);
    assert_eq!(data.get_unsigned("Numbers", "hex", 5), 5);
    assert_eq!(data.get_unsigned("Missing", "unsigned", 5), 5);
}

#[test]
fn test_get_signed() {
    let data = sample();
    assert_eq!(data.get_signed("Numbers", "signed", 0), -1);
    assert_eq!(data.get_signed("Numbers", "unsigned", 0), 1_234_567_890);
    assert_eq!(data.get_signed("Numbers", "text", -5), -5);
    assert_eq!(data.get_signed("Numbers", "missing", -5), -5);
}

#[test]
fn test_get_float() {
    let data = sample();
    assert_eq!(data.get_float("Numbers", "float", 0.0), 3.14);
    assert_eq!(data.get_float("Numbers", "signed", 0.0), -1.0);
    assert_eq!(data.get_float("Numbers", "text", 2.5), 2.5);
}

#[test]
fn test_get_bool() {
    let data = sample();
    assert!(data.get_bool("Flags", "on", false));
    assert!(!data.get_bool("Flags", "off", true));
    assert!(data.get_bool("Flags", "maybe", true));
    assert!(!data.get_bool("Flags", "maybe", false));
    assert!(!data.get_bool("Flags", "shout", false));
    assert!(data.get_bool("Flags", "missing", true));
}

#[test]
fn test_repeated_lookups_switch_sections() {
    let data = sample();
    for _ in 0..3 {
        assert_eq!(data.get_value("Numbers", "float"), Some("3.14"));
        assert_eq!(data.get_value("Flags", "on"), Some("true"));
    }
}
