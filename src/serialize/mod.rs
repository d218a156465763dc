//! AST serializers (component J): an S-expression trace and a Graphviz
//! DOT graph. Both are pure tree walks over a finished [`Arena`]; neither
//! performs semantic interpretation of what the tree means.

use crate::ast::{Arena, NodeId, NodeKind};
use crate::strings::StringRepo;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeError {
    InvalidReference,
    Write,
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializeError::InvalidReference => write!(f, "invalid node reference"),
            SerializeError::Write => write!(f, "output write failed"),
        }
    }
}

impl std::error::Error for SerializeError {}

/// Kind-specific literal tagging for the S-expression printer: hex
/// integers get a `#` tag, octal/char-by-code a `?` tag, matching the
/// base-disambiguation the lexer itself performs on the source lexeme.
fn format_terminal_value(kind: NodeKind, text: &str) -> String {
    match kind {
        NodeKind::IntLiteral => {
            if text.ends_with(['H', 'h']) {
                format!("#{}", text)
            } else if text.ends_with(['B', 'b', 'C', 'c']) {
                format!("?{}", text)
            } else {
                text.to_string()
            }
        }
        NodeKind::CharLiteral => {
            if text.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                format!("?{}", text)
            } else {
                text.to_string()
            }
        }
        _ => text.to_string(),
    }
}

/// Quote `text`, preferring double quotes unless the text itself contains
/// one, in which case single quotes are used.
fn quote(text: &str) -> String {
    if text.contains('"') {
        format!("'{}'", text)
    } else {
        format!("\"{}\"", text)
    }
}

/// Print the whole tree rooted at `root` as a single-line parenthesized
/// S-expression.
pub fn to_sexpr(arena: &Arena, strings: &StringRepo, root: NodeId) -> Result<String, SerializeError> {
    let mut out = String::new();
    write_sexpr(arena, strings, root, &mut out)?;
    Ok(out)
}

fn write_sexpr(arena: &Arena, strings: &StringRepo, id: NodeId, out: &mut String) -> Result<(), SerializeError> {
    let kind = arena.kind(id).map_err(|_| SerializeError::InvalidReference)?;
    out.push('(');
    out.push_str(kind.name());

    if kind.is_terminal() {
        let count = arena.subnode_count(id).map_err(|_| SerializeError::InvalidReference)?;
        for i in 0..count {
            let sid = arena.value(id, i).map_err(|_| SerializeError::InvalidReference)?;
            let text = strings.as_str(sid).map_err(|_| SerializeError::InvalidReference)?;
            out.push(' ');
            let formatted = format_terminal_value(kind, text);
            match kind {
                NodeKind::Filename | NodeKind::Options | NodeKind::QuotedLiteral => {
                    out.push_str(&quote(&formatted));
                }
                _ => out.push_str(&formatted),
            }
        }
    } else {
        let count = arena.subnode_count(id).map_err(|_| SerializeError::InvalidReference)?;
        for i in 0..count {
            let child = arena.subnode(id, i).map_err(|_| SerializeError::InvalidReference)?;
            out.push(' ');
            write_sexpr(arena, strings, child, out)?;
        }
    }

    out.push(')');
    Ok(())
}

/// Emit a Graphviz `digraph` for the tree rooted at `root`. Node ids are
/// assigned in preorder starting at 0; returns the number of characters
/// written alongside the rendered graph.
pub fn to_dot(arena: &Arena, strings: &StringRepo, root: NodeId) -> Result<(String, usize), SerializeError> {
    let mut out = String::new();
    out.push_str("digraph AST {\n");
    out.push_str("  graph [fontname=helvetica, size=\"10,10\"];\n");
    out.push_str("  node [fontname=helvetica, size=8, shape=box, style=solid];\n");
    out.push_str("  edge [arrowsize=0.75];\n");

    let mut next_id = 0usize;
    write_dot_node(arena, strings, root, &mut out, &mut next_id)?;
    out.push_str("}\n");

    let len = out.len();
    Ok((out, len))
}

fn write_dot_node(
    arena: &Arena,
    strings: &StringRepo,
    id: NodeId,
    out: &mut String,
    next_id: &mut usize,
) -> Result<usize, SerializeError> {
    let my_id = *next_id;
    *next_id += 1;

    let kind = arena.kind(id).map_err(|_| SerializeError::InvalidReference)?;

    if kind.is_terminal() {
        let count = arena.subnode_count(id).map_err(|_| SerializeError::InvalidReference)?;
        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            let sid = arena.value(id, i).map_err(|_| SerializeError::InvalidReference)?;
            let text = strings.as_str(sid).map_err(|_| SerializeError::InvalidReference)?;
            values.push(format_terminal_value(kind, text));
        }
        let label = format!("{}\\n{}", kind.name(), values.join(", "));
        let quoted = if label.contains('"') {
            format!("'{}'", label)
        } else {
            format!("\"{}\"", label)
        };
        writeln!(out, "  n{} [label={}, style=filled];", my_id, quoted).map_err(|_| SerializeError::Write)?;
    } else {
        writeln!(out, "  n{} [label=\"{}\"];", my_id, kind.name()).map_err(|_| SerializeError::Write)?;
        let count = arena.subnode_count(id).map_err(|_| SerializeError::InvalidReference)?;
        for i in 0..count {
            let child = arena.subnode(id, i).map_err(|_| SerializeError::InvalidReference)?;
            let child_id = write_dot_node(arena, strings, child, out, next_id)?;
            writeln!(out, "  n{} -> n{};", my_id, child_id).map_err(|_| SerializeError::Write)?;
        }
    }

    Ok(my_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Arena;
    use crate::strings::StringRepo;

    fn build_empty_defmodule() -> (Arena, StringRepo, NodeId) {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let name = repo.get(b"M").unwrap();
        let ident = arena.new_terminal(NodeKind::Ident, name).unwrap();
        let empty = arena.empty();
        let root = arena.new_branch(NodeKind::DefModule, &[ident, empty, empty]).unwrap();
        (arena, repo, root)
    }

    #[test]
    fn sexpr_of_empty_module_matches_scenario_one() {
        let (arena, repo, root) = build_empty_defmodule();
        let s = to_sexpr(&arena, &repo, root).unwrap();
        assert_eq!(s, "(DEFMOD (IDENT M) (EMPTY) (EMPTY))");
    }

    #[test]
    fn dot_graph_has_one_node_per_tree_node() {
        let (arena, repo, root) = build_empty_defmodule();
        let (dot, len) = to_dot(&arena, &repo, root).unwrap();
        assert!(dot.starts_with("digraph AST {"));
        assert!(dot.trim_end().ends_with('}'));
        assert_eq!(dot.matches(" -> ").count(), 3);
        assert_eq!(len, dot.len());
    }

    #[test]
    fn hex_integer_literal_gets_hash_tag() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let v = repo.get(b"0FFH").unwrap();
        let lit = arena.new_terminal(NodeKind::IntLiteral, v).unwrap();
        let s = to_sexpr(&arena, &repo, lit).unwrap();
        assert_eq!(s, "(INTVAL #0FFH)");
    }

    #[test]
    fn quoted_literal_uses_double_quotes_unless_content_has_one() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let v = repo.get(b"hello").unwrap();
        let lit = arena.new_terminal(NodeKind::QuotedLiteral, v).unwrap();
        let s = to_sexpr(&arena, &repo, lit).unwrap();
        assert_eq!(s, "(STRVAL \"hello\")");
    }
}
