//! Test harness for the CFGL parser against fixture files.
//!
//! This test harness reads all .cfgl files from the test/cfgl/ directory,
//! parses them, and compares the result against the expected YAML in
//! test/yaml/. It also reads .cfgl files from test/fail/ (expected to fail)
//! and verifies they produce the error messages in the matching .error files.

use std::fs;
use std::path::{Path, PathBuf};

use libcfgl::{encode, parse, parse_with_filename, ConstantTable, ParseError, Parser, Value};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files matching `pattern` under test/, sorted.
fn fixture_files(pattern: &str) -> Vec<PathBuf> {
    let full = test_root().join(pattern);
    let mut files: Vec<PathBuf> = glob::glob(&full.to_string_lossy())
        .expect("valid glob pattern")
        .flatten()
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// Compare a parsed value with the expected YAML, including key order and
/// the integer/float distinction.
fn compare_with_yaml(actual: &Value, expected: &serde_yaml::Value, at: &str) -> Result<(), String> {
    match (actual, expected) {
        (Value::Integer(a), serde_yaml::Value::Number(n)) if !n.is_f64() => {
            if n.as_i64() == Some(*a) {
                Ok(())
            } else {
                Err(format!("{}: expected {}, got {}", at, n, a))
            }
        }
        (Value::Float(a), serde_yaml::Value::Number(n)) if n.is_f64() => {
            if n.as_f64() == Some(*a) {
                Ok(())
            } else {
                Err(format!("{}: expected {}, got {}", at, n, a))
            }
        }
        (Value::Text(a), serde_yaml::Value::String(b)) => {
            if a == b {
                Ok(())
            } else {
                Err(format!("{}: expected {:?}, got {:?}", at, b, a))
            }
        }
        (Value::Mapping(a), serde_yaml::Value::Mapping(b)) => {
            let actual_keys: Vec<&str> = a.keys().map(String::as_str).collect();
            let expected_keys: Vec<&str> = b.keys().filter_map(|k| k.as_str()).collect();
            if actual_keys != expected_keys {
                return Err(format!(
                    "{}: expected keys {:?}, got {:?}",
                    at, expected_keys, actual_keys
                ));
            }
            for (key, value) in a {
                let expected = b
                    .get(key.as_str())
                    .ok_or_else(|| format!("{}: missing key {}", at, key))?;
                compare_with_yaml(value, expected, &format!("{}.{}", at, key))?;
            }
            Ok(())
        }
        (a, b) => Err(format!("{}: expected {:?}, got {:?}", at, b, a)),
    }
}

/// Run a single .cfgl test file (expected to succeed).
fn run_cfgl_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let value = parse(&content)
        .map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;

    let stem = path.file_stem().unwrap().to_string_lossy();
    let yaml_path = test_root().join("yaml").join(format!("{}.yaml", stem));
    match fs::read_to_string(&yaml_path) {
        Ok(expected) => {
            let expected: serde_yaml::Value = serde_yaml::from_str(&expected)
                .map_err(|e| format!("{}: Bad expected YAML: {}", filename, e))?;
            compare_with_yaml(&value, &expected, &filename)?;
            println!("  {} => {:?}", filename, value);
        }
        Err(_) => println!("  {} => {:?} (no expected output)", filename, value),
    }
    Ok(())
}

/// Run a single failing .cfgl test file (expected to fail with specific error).
fn run_fail_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    match parse_with_filename(&content, Some(&filename)) {
        Ok(value) => Err(format!(
            "{}: Expected parse error, but got success: {:?}",
            filename, value
        )),
        Err(e) => {
            let actual_error = e.to_string();
            match fs::read_to_string(path.with_extension("error")) {
                Ok(expected) if expected.trim() == actual_error => {
                    println!("  {} => error (as expected)", filename);
                    Ok(())
                }
                Ok(expected) => Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual_error
                )),
                Err(_) => {
                    println!(
                        "  {} => error: {} (no .error file to compare)",
                        filename, actual_error
                    );
                    Ok(())
                }
            }
        }
    }
}

fn run_all(files: &[PathBuf], run: fn(&Path) -> Result<(), String>) -> usize {
    let mut failed = 0;
    let mut errors: Vec<String> = Vec::new();

    for file in files {
        if let Err(e) = run(file) {
            failed += 1;
            errors.push(e);
        }
    }

    println!("\nResults: {} passed, {} failed", files.len() - failed, failed);

    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }
    failed
}

#[test]
fn test_all_cfgl_fixtures() {
    let files = fixture_files("cfgl/*.cfgl");
    assert!(!files.is_empty(), "no .cfgl fixtures found");

    println!("\nRunning {} .cfgl test files:", files.len());
    let failed = run_all(&files, run_cfgl_test);
    assert!(failed == 0, "{} .cfgl tests failed", failed);
}

#[test]
fn test_all_fail_fixtures() {
    let files = fixture_files("fail/*.cfgl");
    assert!(!files.is_empty(), "no failing fixtures found");

    println!("\nRunning {} failing test files:", files.len());
    let failed = run_all(&files, run_fail_test);
    assert!(failed == 0, "{} failing-fixture tests failed", failed);
}

#[test]
fn test_canonical_roundtrip_all_fixtures() {
    for path in fixture_files("cfgl/*.cfgl") {
        let content = fs::read_to_string(&path).unwrap();
        let value = parse(&content).unwrap();
        let written = encode(&value).unwrap();
        let reparsed = parse(&written)
            .unwrap_or_else(|e| panic!("{}: rewritten document failed: {}", path.display(), e));
        assert_eq!(reparsed, value, "{}", path.display());
        // IndexMap equality ignores order; the Debug rendering does not.
        assert_eq!(format!("{:?}", reparsed), format!("{:?}", value));
    }
}

// Individual test cases

#[test]
fn test_empty_input() {
    assert_eq!(parse("").unwrap(), Value::empty_mapping());
    assert_eq!(parse("\n\n   \n").unwrap(), Value::empty_mapping());
}

#[test]
fn test_only_comments() {
    let result = parse("*> comment\n*> another comment").unwrap();
    assert_eq!(result, Value::empty_mapping());
}

#[test]
fn test_single_entry() {
    let result = parse("{\n    key1 -> 123.\n}.").unwrap();
    assert_eq!(result.get("key1"), Some(&Value::Integer(123)));
}

#[test]
fn test_single_line_document() {
    let result = parse("{ key1 -> 123. }.").unwrap();
    assert_eq!(result.get("key1"), Some(&Value::Integer(123)));
}

#[test]
fn test_closing_brace_without_period() {
    let result = parse("{\n    inner -> {\n        a -> 1.\n    }\n}").unwrap();
    assert_eq!(
        result.get("inner").and_then(|m| m.get("a")),
        Some(&Value::Integer(1))
    );
}

#[test]
fn test_entries_keep_insertion_order() {
    let result = parse("{\n    zeta -> 1.\n    alpha -> 2.\n    mid -> 3.\n}.").unwrap();
    let keys: Vec<&str> = result
        .as_mapping()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
}

#[test]
fn test_reentered_key_last_write_wins() {
    let result = parse("{\n    a -> 1.\n    b -> 2.\n    a -> 3.\n}.").unwrap();
    let map = result.as_mapping().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get_index(0), Some((&"a".to_string(), &Value::Integer(3))));
}

#[test]
fn test_numeric_subtypes() {
    let result = parse("{\n    i -> 80.\n    f -> 80.0.\n    s -> [[80]].\n}.").unwrap();
    assert_eq!(result.get("i"), Some(&Value::Integer(80)));
    assert_eq!(result.get("f"), Some(&Value::Float(80.0)));
    assert_eq!(result.get("s"), Some(&Value::Text("80".to_string())));
}

#[test]
fn test_text_is_raw() {
    let result = parse("{\n    t -> [[ a \\n |X| {b} ]].\n}.").unwrap();
    assert_eq!(result.get("t").and_then(Value::as_text), Some(" a \\n |X| {b} "));
}

#[test]
fn test_constant_overwrite() {
    let result = parse("def CONST = 100;\ndef CONST = 200;\n{\n    key1 -> |CONST|.\n}.").unwrap();
    assert_eq!(result.get("key1"), Some(&Value::Integer(200)));
}

#[test]
fn test_undefined_constant() {
    let err = parse("{\n    key1 -> |UNDEFINED|.\n}.").unwrap_err();
    assert!(matches!(&err, ParseError::UndefinedConstant(name, _) if name == "UNDEFINED"));
    assert_eq!(err.line(), Some(2));
    assert!(err.to_string().starts_with("undefined constant: UNDEFINED"));
}

#[test]
fn test_invalid_constant_declaration() {
    let err = parse("def123 = 456;.\n{ key1 -> 456. }.").unwrap_err();
    assert!(matches!(err, ParseError::InvalidDeclaration(_)));
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_invalid_entry_separator() {
    let err = parse("{\n    key1 => 123.\n}.").unwrap_err();
    assert!(matches!(err, ParseError::InvalidEntry(_)));
    assert_eq!(err.to_string(), "invalid mapping entry at line 2");
}

#[test]
fn test_invalid_number() {
    let err = parse("{\n    key1 -> 12a3.\n}.").unwrap_err();
    assert!(matches!(&err, ParseError::InvalidNumber(token, _) if token == "12a3"));
    assert!(err.to_string().contains("invalid number format: 12a3"));
}

#[test]
fn test_unterminated_block() {
    let err = parse("{\n    a -> 1.").unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedMapping(_)));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_content_after_top_level_block() {
    let err = parse("{\n}.\n*> ok\nstray -> 1.").unwrap_err();
    assert!(matches!(err, ParseError::ExpectedEndOfFile(_)));
    assert_eq!(err.line(), Some(4));
}

#[test]
fn test_malformed_closing_brace() {
    let err = parse("{\n    a -> 1.\n}..").unwrap_err();
    assert!(matches!(err, ParseError::MalformedClosingBrace(_)));
}

#[test]
fn test_missing_opening_brace() {
    let err = parse("a -> 1.").unwrap_err();
    assert!(matches!(err, ParseError::ExpectedOpeningBrace(_)));
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_inline_constant_does_not_leak() {
    let err = parse("{\n    inner -> { def SECRET = 1; }.\n    leaked -> |SECRET|.\n}.").unwrap_err();
    assert!(matches!(&err, ParseError::UndefinedConstant(name, _) if name == "SECRET"));
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_inline_literal_misses_later_constants() {
    // The literal is read before LATE exists.
    let err = parse("def NESTED = { x -> |LATE|. };\ndef LATE = 2;\n{\n}.").unwrap_err();
    assert!(matches!(&err, ParseError::UndefinedConstant(name, _) if name == "LATE"));
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_inline_sees_earlier_constants() {
    let result = parse("def PORT = 5432;\n{\n    db -> { port -> |PORT|. }.\n}.").unwrap();
    assert_eq!(
        result.get("db").and_then(|db| db.get("port")),
        Some(&Value::Integer(5432))
    );
}

#[test]
fn test_structural_constant_persists() {
    let src = "{\n    server -> {\n        def PORT = 8080;\n        port -> |PORT|.\n    }.\n    client_port -> |PORT|.\n}.";
    let result = parse(src).unwrap();
    assert_eq!(result.get("client_port"), Some(&Value::Integer(8080)));
}

#[test]
fn test_structural_block_sees_outer_constants() {
    let src = "def HOST = [[localhost]];\n{\n    db -> {\n        host -> |HOST|.\n    }.\n}.";
    let result = parse(src).unwrap();
    assert_eq!(
        result.get("db").and_then(|db| db.get("host")),
        Some(&Value::from("localhost"))
    );
}

#[test]
fn test_sibling_after_structural_block_is_kept() {
    let src = "{\n    a -> {\n        x -> 1.\n    }.\n    b -> 2.\n}.";
    let result = parse(src).unwrap();
    assert_eq!(result.get("b"), Some(&Value::Integer(2)));
}

/// Known oddity: a bare `{` inside a block discards the entries read so far
/// and the nested block's contents become the enclosing block's result.
#[test]
fn test_anonymous_block_discards_earlier_entries() {
    let src = "{\n    outer -> {\n        a -> 1.\n        {\n            b -> 2.\n        }.\n    c -> 3.\n}.";
    let result = parse(src).unwrap();
    let outer = result.get("outer").unwrap();
    assert_eq!(outer.get("a"), None);
    assert_eq!(outer.get("b"), Some(&Value::Integer(2)));
    assert_eq!(result.get("c"), Some(&Value::Integer(3)));
}

#[test]
fn test_multi_entry_inline_literal_is_rejected() {
    let err = parse("{\n    pair -> { a -> 1. b -> 2. }.\n}.").unwrap_err();
    assert!(matches!(err, ParseError::InvalidNumber(_, _)));
}

#[test]
fn test_error_line_with_filename() {
    let err = parse_with_filename("{\n    x -> y.\n}.", Some("app.cfgl")).unwrap_err();
    assert_eq!(err.to_string(), "invalid number format: y at line 2 of <app.cfgl>");
}

#[test]
fn test_preseeded_constants() {
    let mut constants = ConstantTable::new();
    constants.declare("ENV", Value::from("prod"));
    let mut parser = Parser::with_constants(constants);
    let result = parser
        .parse("def REGION = [[eu]];\n{\n    env -> |ENV|.\n}.")
        .unwrap();
    assert_eq!(result.get("env"), Some(&Value::from("prod")));

    let names: Vec<&str> = parser.constants().names().collect();
    assert_eq!(names, ["ENV", "REGION"]);
}

#[test]
fn test_encode_then_parse_preserves_types_and_order() {
    let src = "{\n    b -> 1.\n    a -> 1.0.\n    m -> {\n        z -> [[x]].\n        y -> -2.\n    }.\n    e -> {}.\n}.";
    let value = parse(src).unwrap();
    let reparsed = parse(&encode(&value).unwrap()).unwrap();
    assert_eq!(format!("{:?}", reparsed), format!("{:?}", value));
    assert_eq!(reparsed.get("a"), Some(&Value::Float(1.0)));
    assert_eq!(reparsed.get("b"), Some(&Value::Integer(1)));
}

#[test]
fn test_single_line_document_needs_nested_close() {
    let err = parse("{ a -> { }.").unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedMapping(_)));
    assert_eq!(err.line(), Some(1));

    let closed = parse("{ a -> {}. }.").unwrap();
    assert_eq!(closed.get("a"), Some(&Value::empty_mapping()));
}
