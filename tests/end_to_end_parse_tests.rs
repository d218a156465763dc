//! End-to-end parsing tests, source text on disk through to AST/diagnostics.
//!
//! These drive the full pipeline (`m2fe::parse_file`) the same way the
//! CLI binary does, rather than exercising any one component in
//! isolation.

use m2fe::{parse_file, DialectOptions, LexerLimits, ModuleKind, ParseStatus};
use rstest::rstest;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_source(source: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile creation");
    file.write_all(source.as_bytes()).expect("write source");
    file
}

fn parse(kind: ModuleKind, source: &str) -> (m2fe::ParseOutput, m2fe::ParseStats) {
    let file = write_source(source);
    let (output, stats, status) =
        parse_file(kind, file.path(), DialectOptions::pim4(), LexerLimits::default());
    assert_eq!(status, ParseStatus::Success);
    (output.expect("successful parse yields an AST"), stats)
}

#[test]
fn empty_definition_module_parses_cleanly() {
    let (output, stats) = parse(ModuleKind::Definition, "DEFINITION MODULE M; END M.");
    let sexpr = m2fe::serialize::to_sexpr(&output.arena, &output.strings, output.root).unwrap();
    assert_eq!(sexpr, "(DEFMOD (IDENT M) (EMPTY) (EMPTY))");
    assert_eq!(stats.errors, 0);
}

#[test]
fn single_constant_is_declared_and_recorded() {
    let (output, _stats) =
        parse(ModuleKind::Definition, "DEFINITION MODULE M; CONST k = 42; END M.");
    let sexpr = m2fe::serialize::to_sexpr(&output.arena, &output.strings, output.root).unwrap();
    assert!(sexpr.contains("(CONSTDEF (IDENT k) (INTVAL 42))"));
    assert_eq!(output.symtab.symbol_count(), 2);
}

#[test]
fn duplicate_type_in_same_scope_is_flagged_but_not_pruned() {
    let (output, stats) = parse(
        ModuleKind::Definition,
        "DEFINITION MODULE M; TYPE T = INTEGER; TYPE T = CHAR; END M.",
    );
    assert!(stats.errors >= 1);
    let sexpr = m2fe::serialize::to_sexpr(&output.arena, &output.strings, output.root).unwrap();
    assert_eq!(sexpr.matches("TYPEDEF").count(), 2);
}

#[test]
fn missing_semicolon_recovers_and_keeps_both_declarations() {
    let (output, stats) = parse(
        ModuleKind::Definition,
        "DEFINITION MODULE M; CONST k = 1 CONST m = 2; END M.",
    );
    assert!(stats.errors >= 1);
    let sexpr = m2fe::serialize::to_sexpr(&output.arena, &output.strings, output.root).unwrap();
    assert_eq!(sexpr.matches("CONSTDEF").count(), 2);
}

#[test]
fn comment_nesting_past_the_limit_is_reported() {
    let mut source = String::from("DEFINITION MODULE M; ");
    for _ in 0..=10 {
        source.push_str("(*");
    }
    source.push_str(" unterminated ");
    let file = write_source(&source);
    let (_output, stats, status) = parse_file(
        ModuleKind::Definition,
        file.path(),
        DialectOptions::pim4(),
        LexerLimits::default(),
    );
    assert_eq!(status, ParseStatus::Success);
    assert!(stats.errors >= 1);
}

#[rstest]
#[case("CONST a = 1;", ModuleKind::Definition)]
#[case("VAR x: INTEGER;", ModuleKind::Definition)]
#[case("TYPE T = BOOLEAN;", ModuleKind::Definition)]
fn representative_declaration_forms_parse_without_error(
    #[case] decl: &str,
    #[case] kind: ModuleKind,
) {
    let source = format!("DEFINITION MODULE M; {} END M.", decl);
    let (_output, stats) = parse(kind, &source);
    assert_eq!(stats.errors, 0);
}

#[test]
fn statement_forms_parse_inside_a_program_module() {
    let source = r#"
        MODULE P;
        VAR i: INTEGER;
        BEGIN
          i := 0;
          WHILE i < 10 DO
            i := i + 1
          END;
          IF i = 10 THEN
            i := 0
          ELSE
            i := 1
          END
        END P.
    "#;
    let (output, stats) = parse(ModuleKind::Module, source);
    assert_eq!(stats.errors, 0);
    let sexpr = m2fe::serialize::to_sexpr(&output.arena, &output.strings, output.root).unwrap();
    assert!(sexpr.contains("WHILESTMT"));
    assert!(sexpr.contains("IFSTMT"));
}

#[test]
fn module_kind_resolves_both_implementation_and_program_modules() {
    let (impl_output, impl_stats) = parse(
        ModuleKind::Module,
        "IMPLEMENTATION MODULE M; END M.",
    );
    assert_eq!(impl_stats.errors, 0);
    let impl_sexpr =
        m2fe::serialize::to_sexpr(&impl_output.arena, &impl_output.strings, impl_output.root)
            .unwrap();
    assert!(impl_sexpr.starts_with("(IMPMOD"));

    let (prog_output, prog_stats) = parse(ModuleKind::Module, "MODULE M; END M.");
    assert_eq!(prog_stats.errors, 0);
    let prog_sexpr =
        m2fe::serialize::to_sexpr(&prog_output.arena, &prog_output.strings, prog_output.root)
            .unwrap();
    assert!(prog_sexpr.starts_with("(PROGMOD"));
}

#[test]
fn dot_graph_has_one_node_per_edge_plus_root() {
    let (output, _stats) = parse(ModuleKind::Definition, "DEFINITION MODULE M; END M.");
    let (dot, len) = m2fe::serialize::to_dot(&output.arena, &output.strings, output.root).unwrap();
    assert!(dot.starts_with("digraph AST {"));
    assert_eq!(len, dot.len());
}
