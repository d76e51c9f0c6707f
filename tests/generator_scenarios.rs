//! End-to-end generation scenarios
//!
//! Runs the generator over the fixture listing and small inline listings and
//! checks the emitted program text.

use std::io::Write;
use std::path::PathBuf;

use symcheck::{Generator, GeneratorConfig, Profile, RuleFile, RuleSet, SymbolListing};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pwx_symbols.txt")
}

fn generate_text(text: &str) -> String {
    Generator::new(GeneratorConfig::default())
        .generate(&SymbolListing::from_text(text))
        .source
}

#[test]
fn test_fixture_report_counts() {
    let listing = SymbolListing::load(&fixture_path()).expect("load fixture");
    let program = Generator::new(GeneratorConfig::default()).generate(&listing);
    let report = &program.report;

    assert_eq!(report.lines, 33);
    assert_eq!(report.blank_lines, 1);
    assert_eq!(report.skipped_lines, 1);
    assert_eq!(report.classes, 6);
    assert_eq!(report.templates, 8);
    assert_eq!(report.functions, 12);
    assert_eq!(report.singletons, 3);
    assert_eq!(report.debug_filtered, 1);
    assert_eq!(report.private_skipped, 1);
    assert_eq!(report.table_rows, 23);
    assert!(report.duplicate_objects.is_empty());
}

#[test]
fn test_fixture_phase_order() {
    let listing = SymbolListing::load(&fixture_path()).expect("load fixture");
    let source = Generator::new(GeneratorConfig::default())
        .generate(&listing)
        .source;

    let last_test_fn = source.rfind("static void test_").unwrap();
    let table = source.find("static void* functions[][2] = {").unwrap();
    let first_singleton = source.find("(void*)\"PAH\"").unwrap();
    let last_function = source.rfind("(void*)\"unlock_all\"").unwrap();
    let main = source.find("int main(void) {").unwrap();
    let loop_start = source.find("for (unsigned i = 0;").unwrap();

    assert!(last_test_fn < table);
    assert!(last_function < first_singleton);
    assert!(first_singleton < main);
    assert!(main < loop_start);
    assert!(source.trim_end().ends_with("return 0;\n}"));

    // every test function is called exactly once from main
    let main_body = &source[main..];
    for name in ["CArgHandler", "CLockGuard", "TChainHash", "TStack"] {
        assert_eq!(main_body.matches(&format!("\ttest_{}();", name)).count(), 1);
    }
}

#[test]
fn test_exception_scenario() {
    let source = generate_text("  pwx::CException;\n");
    assert!(source.contains(
        "static void test_CException(void) {\n\
         \tpwx::CException test_obj(\"name\", \"what\", \"where\", \"func\", \"when\");\n\
         \tprintf(\"%16s: %p\\n\", \"CException\", (void*)&test_obj);\n\
         }\n"
    ));
}

#[test]
fn test_hash_template_scenario() {
    let source = generate_text("  pwx::TOpenHash;\n");
    assert!(source.contains("\tpwx::TOpenHash<int,int> test_obj;\n"));
}

#[test]
fn test_are_locked_scenario() {
    let source = generate_text("  pwx::are_locked;\n");
    let rows: Vec<&str> = source
        .lines()
        .filter(|l| l.contains("(void*)\"are_locked\""))
        .collect();

    assert_eq!(
        rows,
        vec![
            "\t{ (void*)\"are_locked\", (void*)static_cast<bool(*)(const pwx::CLockable*,const pwx::CLockable*)>(&pwx::are_locked) },",
            "\t{ (void*)\"are_locked\", (void*)static_cast<bool(*)(const pwx::CLockable*,const pwx::CLockable*,const pwx::CLockable*)>(&pwx::are_locked) },",
        ]
    );
}

#[test]
fn test_overridden_classes_never_nullary() {
    let source = generate_text("  pwx::CException;\n  pwx::CLockGuard;\n  pwx::CSinCosTable;\n");
    for name in ["CException", "CLockGuard", "CSinCosTable"] {
        assert!(!source.contains(&format!("pwx::{} test_obj;", name)));
    }
    assert!(source.contains("pwx::CSinCosTable test_obj(2);"));
}

#[test]
fn test_convention_functions_never_bare() {
    let source = generate_text("  pwx::to_float;\n  pwx::set_union;\n");
    assert!(!source.contains("(void*)pwx::to_float }"));
    assert!(!source.contains("(void*)pwx::set_union }"));
    assert!(source.contains("(void*)pwx::to_float<char*> },"));
    assert_eq!(source.matches("(&pwx::set_union)").count(), 2);
}

#[test]
fn test_debug_filter_scenario() {
    let text = "  pwx::debug_lock;\n";
    let listing = SymbolListing::from_text(text);

    let filtered = Generator::new(GeneratorConfig {
        debug_symbols: "yes".into(),
        ..Default::default()
    })
    .generate(&listing);
    assert!(!filtered.source.contains("debug_lock"));

    let plain = Generator::new(GeneratorConfig {
        debug_symbols: "yes".into(),
        profile: Profile::Plain,
        ..Default::default()
    })
    .generate(&listing);
    assert!(plain.source.contains("(void*)\"debug_lock\""));
}

#[test]
fn test_forward_header_scenario() {
    let config = GeneratorConfig {
        headers: vec![
            "include/pwx/pwx_fwd.h".into(),
            "include/pwx/CLockable.h".into(),
        ],
        ..Default::default()
    };
    let source = Generator::new(config)
        .generate(&SymbolListing::default())
        .source;

    assert!(source.starts_with("#include <cstdio>\n#include \"CLockable.h\"\n"));
    assert!(!source.contains("pwx_fwd.h"));
}

#[test]
fn test_rule_file_extends_builtin_rules() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"
classes:
  CArgHandler:
    args: ["0", "nullptr"]
functions:
  get_trimmed:
    kind: instantiate
    args: char
"#
    )
    .expect("write rules");

    let mut rules = RuleSet::builtin("pwx");
    rules
        .merge(RuleFile::load(file.path()).expect("load rules"))
        .expect("merge rules");

    let listing =
        SymbolListing::from_text("  pwx::CArgHandler;\n  pwx::get_trimmed*\n  pwx::CException;\n");
    let program = Generator::with_rules(GeneratorConfig::default(), rules).generate(&listing);

    assert!(program
        .source
        .contains("pwx::CArgHandler test_obj(0, nullptr);"));
    assert!(program.source.contains("(void*)pwx::get_trimmed<char> },"));
    assert!(program.source.contains("\"when\");"));
}

#[test]
fn test_custom_namespace_end_to_end() {
    let config = GeneratorConfig {
        namespace: "acme".into(),
        ..Default::default()
    };
    let listing =
        SymbolListing::from_text("  acme::CLockGuard;\n  acme::try_locks;\n  pwx::CLockable;\n");
    let program = Generator::new(config).generate(&listing);

    assert!(program.source.contains("\tacme::CLockable lock_me;\n"));
    assert!(program.source.contains("const acme::CLockable*"));
    assert_eq!(program.report.skipped_lines, 1);
}
