//! # m2fe Command Line Interface
//!
//! A thin CLI wrapper around the `m2fe` parsing pipeline: it resolves
//! dialect flags and module kind, calls [`m2fe::parse_file`], and
//! renders the resulting AST as an S-expression trace or a Graphviz
//! graph.
//!
//! ## Design Philosophy
//!
//! The binary is a strict CLI layer: argument parsing, module-kind
//! inference, and I/O live here; everything else (lexing, parsing,
//! serialization) is pure library code in [`m2fe`] with no knowledge of
//! files or processes.
//!
//! ## Exit Codes
//!
//! - `0` — parsed with no diagnostics at error severity
//! - `1` — parsed, but at least one error-severity diagnostic was raised
//! - `2` — couldn't even start (bad path, unreadable file, bad options)

use clap::Parser;
use m2fe::{parse_file, DialectOptions, ErrantSemicolon, LexerLimits, ModuleKind, ParseStatus};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the Modula-2 source file to parse
    file: PathBuf,

    /// Module kind to parse as; inferred from the file extension
    /// (`.def` → definition, anything else → module) when omitted.
    /// Implementation vs. program module is never asked for here — the
    /// parser tells them apart itself from the `IMPLEMENTATION`/`MODULE`
    /// lookahead once it knows the source isn't a definition module.
    #[arg(long, value_enum)]
    module_kind: Option<ModuleKindArg>,

    /// Output representation
    #[arg(long, value_enum, default_value = "sexpr")]
    format: FormatArg,

    /// Write output to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Apply the PIM-2 dialect preset
    #[arg(long, conflicts_with_all = ["pim3", "pim4"])]
    pim2: bool,

    /// Apply the PIM-3 dialect preset
    #[arg(long, conflicts_with_all = ["pim2", "pim4"])]
    pim3: bool,

    /// Apply the PIM-4 dialect preset (default)
    #[arg(long, conflicts_with_all = ["pim2", "pim3"])]
    pim4: bool,

    /// Accept typed constant parameters in formal parameter lists
    #[arg(long, action = clap::ArgAction::SetTrue)]
    const_parameters: bool,
    #[arg(long = "no-const-parameters", action = clap::ArgAction::SetTrue, conflicts_with = "const_parameters")]
    no_const_parameters: bool,

    /// Accept variant (CASE-tagged) record fields
    #[arg(long, action = clap::ArgAction::SetTrue)]
    variant_records: bool,
    #[arg(long = "no-variant-records", action = clap::ArgAction::SetTrue, conflicts_with = "variant_records")]
    no_variant_records: bool,

    /// Treat a stray trailing semicolon as an error instead of a warning
    #[arg(long, action = clap::ArgAction::SetTrue)]
    strict_semicolons: bool,

    /// Print parse statistics (warnings, errors, line count) to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum ModuleKindArg {
    Definition,
    Module,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
enum FormatArg {
    Sexpr,
    Dot,
}

fn infer_module_kind(path: &Path) -> ModuleKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("def") => ModuleKind::Definition,
        _ => ModuleKind::Module,
    }
}

fn resolve_options(args: &Args) -> DialectOptions {
    let mut options = if args.pim2 {
        DialectOptions::pim2()
    } else if args.pim3 {
        DialectOptions::pim3()
    } else {
        DialectOptions::pim4()
    };

    if args.const_parameters {
        options.const_parameters = true;
    } else if args.no_const_parameters {
        options.const_parameters = false;
    }

    if args.variant_records {
        options.variant_records = true;
    } else if args.no_variant_records {
        options.variant_records = false;
    }

    if args.strict_semicolons {
        options.errant_semicolon = ErrantSemicolon::Error;
    }

    options
}

fn main() {
    let args = Args::parse();

    let kind = match &args.module_kind {
        Some(ModuleKindArg::Definition) => ModuleKind::Definition,
        Some(ModuleKindArg::Module) => ModuleKind::Module,
        None => infer_module_kind(&args.file),
    };

    let options = resolve_options(&args);
    let limits = LexerLimits::default();

    let (output, stats, status) = parse_file(kind, &args.file, options, limits);

    if args.verbose {
        eprintln!(
            "{}: {} line(s), {} warning(s), {} error(s)",
            args.file.display(),
            stats.lines,
            stats.warnings,
            stats.errors
        );
    }

    let output = match (output, status) {
        (Some(output), ParseStatus::Success) => output,
        (_, status) => {
            eprintln!("m2fe: {}: {}", args.file.display(), status);
            std::process::exit(2);
        }
    };

    for diagnostic in output.diagnostics.entries() {
        eprintln!("{}", diagnostic);
    }

    let rendered = match args.format {
        FormatArg::Sexpr => m2fe::serialize::to_sexpr(&output.arena, &output.strings, output.root),
        FormatArg::Dot => m2fe::serialize::to_dot(&output.arena, &output.strings, output.root)
            .map(|(dot, _)| dot),
    };

    let rendered = match rendered {
        Ok(text) => text,
        Err(err) => {
            eprintln!("m2fe: serialization failed: {}", err);
            std::process::exit(2);
        }
    };

    match args.out {
        Some(path) => {
            if let Err(err) = std::fs::write(&path, rendered) {
                eprintln!("m2fe: couldn't write {}: {}", path.display(), err);
                std::process::exit(2);
            }
        }
        None => {
            print!("{}", rendered);
            let _ = std::io::stdout().flush();
        }
    }

    if stats.errors > 0 {
        std::process::exit(1);
    }
}
