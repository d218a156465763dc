//! Snapshot checks on serializer output (via `insta` inline snapshots,
//! so the expected text lives next to the assertion rather than in a
//! separate reviewed baseline file) and property tests on the
//! universally quantified laws from §8 (intern uniqueness and
//! token-set laws).

use m2fe::token::{Token, TokenSet};
use proptest::prelude::*;

fn parse_sexpr(source: &str, kind: m2fe::ModuleKind) -> String {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    use std::io::Write;
    file.write_all(source.as_bytes()).unwrap();
    let (output, _stats, status) = m2fe::parse_file(
        kind,
        file.path(),
        m2fe::DialectOptions::pim4(),
        m2fe::LexerLimits::default(),
    );
    assert_eq!(status, m2fe::ParseStatus::Success);
    let output = output.unwrap();
    m2fe::serialize::to_sexpr(&output.arena, &output.strings, output.root).unwrap()
}

#[test]
fn empty_module_sexpr_matches_inline_snapshot() {
    let sexpr = parse_sexpr("DEFINITION MODULE M; END M.", m2fe::ModuleKind::Definition);
    insta::assert_snapshot!(sexpr, @"(DEFMOD (IDENT M) (EMPTY) (EMPTY))");
}

#[test]
fn single_constant_sexpr_matches_inline_snapshot() {
    let sexpr = parse_sexpr(
        "DEFINITION MODULE M; CONST k = 42; END M.",
        m2fe::ModuleKind::Definition,
    );
    insta::assert_snapshot!(
        sexpr,
        @"(DEFMOD (IDENT M) (EMPTY) (DEFLIST (CONSTDEF (IDENT k) (INTVAL 42))))"
    );
}

proptest! {
    /// Intern uniqueness: equal byte content always yields the same
    /// handle within one repository.
    #[test]
    fn interning_same_bytes_twice_gives_the_same_handle(bytes in "[a-zA-Z0-9_]{0,40}") {
        let mut repo = m2fe::strings::StringRepo::new(0);
        let a = repo.get(bytes.as_bytes()).unwrap();
        let b = repo.get(bytes.as_bytes()).unwrap();
        prop_assert_eq!(a, b);
    }

    /// `element(union(S, T), x) = element(S, x) || element(T, x)`.
    #[test]
    fn token_set_union_law(a in 0u8..30, b in 30u8..60, x in 0u8..60) {
        let ta = token_from_small_index(a);
        let tb = token_from_small_index(b);
        let x = token_from_small_index(x);

        let s = TokenSet::of(&[ta]);
        let t = TokenSet::of(&[tb]);
        let u = s.union_with(&t);

        prop_assert_eq!(u.element(x), s.element(x) || t.element(x));
    }

    /// `subset(S, S)` is always true.
    #[test]
    fn token_set_is_always_its_own_subset(a in 0u8..60, b in 0u8..60) {
        let s = TokenSet::of(&[token_from_small_index(a), token_from_small_index(b)]);
        prop_assert!(s.subset(&s));
    }
}

/// Maps a small index onto a stable, low-valued `Token` variant for the
/// token-set property tests above, without depending on `Token`'s full
/// discriminant range (which includes variants unreachable by plain
/// indexing, like `Unknown`/`Eof`).
fn token_from_small_index(i: u8) -> Token {
    const POOL: &[Token] = &[
        Token::Ident,
        Token::Const,
        Token::Type,
        Token::Var,
        Token::Begin,
        Token::End,
        Token::If,
        Token::Then,
        Token::Else,
        Token::While,
        Token::Do,
        Token::Plus,
        Token::Minus,
        Token::Asterisk,
        Token::Solidus,
        Token::Equal,
        Token::Semicolon,
        Token::Comma,
        Token::Period,
        Token::Colon,
    ];
    POOL[(i as usize) % POOL.len()]
}
