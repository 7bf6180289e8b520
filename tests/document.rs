//! Loading, saving and whole-document behaviour.

use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

use ini::{AnySection, Error, Git, Ini, Plain};

const SAMPLE: &str = "; full-line comment
key1 = value1
key2=                      ; empty value, trailing comment allowed
key3 = \"quoted value; not a comment\"
key4 = \"multi
line value\"

[section name]  # trailing comment on header
k = v

[ gitstyle \"sub\" ]
k2 = v2
";

#[test]
fn unmodified_documents_round_trip() {
    let texts = [
        SAMPLE,
        "\n",
        "\n\n\n",
        "k=v\n",
        "\t[a] ;c\n\t  x =  y  # z\r\n\r\n",
        "#only a comment\n",
    ];

    for text in texts {
        let ini = Ini::parse(text).expect("failed to parse hardcoded text");
        assert_eq!(ini.to_string(), text);

        let again = Ini::parse(&ini.to_string()).expect("failed to reparse");
        assert_eq!(again.to_string(), text);
    }
}

#[test]
fn sample_values() {
    let ini = Ini::parse(SAMPLE).expect("failed to parse sample");

    assert_eq!(ini.get_key("key1"), "value1");
    assert_eq!(ini.get_key("key2"), "");
    assert_eq!(ini.get_key("key3"), "quoted value; not a comment");
    assert_eq!(ini.get_key("key4"), "multi\nline value");
    assert_eq!(ini.get_key("section name.k"), "v");
    assert_eq!(ini.section_names(), vec!["", "section name", "gitstyle \"sub\""]);
}

#[test]
fn format_preserving_edit() {
    let mut ini = Ini::parse("k1 = v1  ;comment\n").expect("failed to parse");
    ini.set_key("k1", "v2");
    assert_eq!(ini.to_string(), "k1 = v2  ;comment\n");
}

#[test]
fn removals_are_idempotent() {
    let text = "k0 = v0\n[a]\nk1 = v1\n\n[b]\nk2 = v2\n";

    let mut once = Ini::parse(text).expect("failed to parse");
    once.remove_key("a.k1");
    once.remove_section("b");

    let mut twice = Ini::parse(text).expect("failed to parse");
    twice.remove_key("a.k1");
    twice.remove_key("a.k1");
    twice.remove_section("b");
    twice.remove_section("b");

    assert_eq!(once.to_string(), twice.to_string());
    assert_eq!(once.to_string(), "k0 = v0\n[a]\n\n");
}

#[test]
fn reader_and_string_agree() {
    let from_reader = Ini::from_reader(SAMPLE.as_bytes()).expect("failed to read");
    let from_str: Ini = SAMPLE.parse().expect("failed to parse");

    assert_eq!(from_reader.to_string(), from_str.to_string());
    assert!(from_reader.filename().is_none());
}

#[test]
fn missing_file_loads_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nonexistent.ini");

    let ini = Ini::open(&path).expect("missing file should not be an error");

    assert_eq!(ini.filename(), Some(path.as_path()));
    assert_eq!(ini.to_string(), "\n");
    assert!(!path.exists());
}

#[test]
fn first_save_creates_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("new.ini");

    let mut ini = Ini::open(&path).expect("failed to open");
    ini.set_key("server.port", "8080");
    ini.save().expect("failed to save");

    assert_eq!(
        fs::read_to_string(&path).expect("failed to read back"),
        "[server]\n\tport=8080\n"
    );
}

#[test]
fn open_reports_parse_errors_with_path() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("broken.ini");
    fs::write(&path, "[ok]\nbroken line\n").expect("failed to write");

    let err = Ini::open(&path).expect_err("broken file should not load");
    match err {
        Error::Parse { name, source } => {
            assert_eq!(name, path.display().to_string());
            assert_eq!(source.line(), 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn save_requires_filename() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut ini = Ini::new();
    ini.set_key("k1", "v1");

    assert!(matches!(ini.save(), Err(Error::NoFilename)));

    ini.set_filename(dir.path().join("named.ini"));
    ini.save().expect("failed to save");
}

#[test]
fn maps_survive_save_and_load() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("maps.ini");

    let values: HashMap<&str, HashMap<&str, &str>> = HashMap::from([
        ("", HashMap::from([("k0", "v0")])),
        ("sect0", HashMap::from([("k1", "v1"), ("k2", "v2")])),
        ("sect0.sub1", HashMap::from([("k3", "v3")])),
    ]);

    let mut written = Ini::builder().dialect(Git).filename(&path).build();
    written.set_map(&values);

    let map = written.to_map();
    for (section, keys) in &values {
        assert!(written.section(section).is_some(), "section {section:?}");
        for (key, value) in keys {
            assert_eq!(map[*section][*key], *value);
        }
    }

    written.save().expect("failed to save");

    let read = Ini::builder()
        .dialect(Git)
        .open(&path)
        .expect("failed to load saved file");

    let expected = HashMap::from([
        ("k0".to_owned(), "v0".to_owned()),
        ("sect0.k1".to_owned(), "v1".to_owned()),
        ("sect0.k2".to_owned(), "v2".to_owned()),
        ("sect0.sub1.k3".to_owned(), "v3".to_owned()),
    ]);

    for (key, value) in &expected {
        assert_eq!(&read.get_key(key), value);
    }
    assert_eq!(read.to_flat_map(), expected);

    let mut flat = Ini::builder().dialect(Git).build();
    flat.set_flat_map(&expected);
    assert_eq!(flat.to_flat_map(), expected);
}

#[test]
fn any_section_reads_across_sections() {
    let ini = Ini::builder()
        .dialect(AnySection(Plain))
        .parse("[a]\nx = 1\n[b]\nx = 2\ny = 3\n")
        .expect("failed to parse");

    assert_eq!(ini.get_key("whatever.x"), "1");
    assert_eq!(ini.get_key("y"), "3");
}

#[test]
fn shared_between_threads_behind_a_lock() {
    use std::sync::{Arc, RwLock};
    use std::thread;

    let ini = Arc::new(RwLock::new(Ini::new()));

    let handles = (0..4)
        .map(|n| {
            let ini = Arc::clone(&ini);
            thread::spawn(move || {
                ini.write()
                    .expect("lock poisoned")
                    .set_key(&format!("s.k{n}"), &n.to_string());
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let ini = ini.read().expect("lock poisoned");
    for n in 0..4 {
        assert_eq!(ini.get_int(&format!("s.k{n}")), n);
    }
}
