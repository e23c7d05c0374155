//! Test-harness CLI: parse one file, or run the parse/emit/compare loop
//! over a whole tree of headers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser as ClapParser;

use cxr::compare::{self, FileDiff};
use cxr::emit::{Indent, Writer};
use cxr::parser::{Parser, ParserConfig};

/// Parses C++ headers and rewrites them as formatted text.
#[derive(ClapParser)]
#[command(name = "cxr")]
struct Cli {
    /// Parse a single file and report success or failure.
    input: Option<PathBuf>,

    /// Root of the input tree for full-test mode.
    #[arg(long = "input-folder")]
    input_folder: Option<PathBuf>,

    /// Where emitted files are written, mirroring the input tree.
    #[arg(long = "output-folder")]
    output_folder: Option<PathBuf>,

    /// Tree of expected outputs to compare emitted files against.
    #[arg(long = "master-folder")]
    master_folder: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(-1);
        }
    };

    let parser = construct_parser();

    if let Some(file) = &cli.input {
        match parser.parse_file(file) {
            Ok(_) => process::exit(0),
            Err(err) => {
                eprintln!("cxr: parsing failed for {}: {}", file.display(), err);
                process::exit(1);
            }
        }
    }

    let (input, output, master) = match (&cli.input_folder, &cli.output_folder, &cli.master_folder)
    {
        (Some(i), Some(o), Some(m)) => (i, o, m),
        _ => {
            eprintln!("cxr: expected a file, or --input-folder/--output-folder/--master-folder");
            process::exit(-1);
        }
    };

    match perform_test(&parser, input, output, master) {
        Ok((total, failed)) => {
            if failed > 0 {
                eprintln!("cxr: {} tests failed out of {}.", failed, total);
                process::exit(1);
            }
            println!("cxr: all {} tests passed without error.", total);
        }
        Err(err) => {
            eprintln!("cxr: {}", err);
            process::exit(1);
        }
    }
}

/// Parse/emit/compare loop over every regular file under `input`. Failures
/// are collected and summarized; no single file aborts the run.
fn perform_test(
    parser: &Parser,
    input: &Path,
    output: &Path,
    master: &Path,
) -> io::Result<(usize, usize)> {
    let mut files = Vec::new();
    collect_files(input, &mut files)?;
    files.sort();

    let mut parsing_failed = Vec::new();
    let mut diff_failed = Vec::new();

    for file in &files {
        println!("cxr: parsing {} ...", file.display());
        let rel = file.strip_prefix(input).expect("file is under the input root");
        let outfile = output.join(rel);
        let masfile = master.join(rel);
        match parse_and_emit(parser, file, &outfile) {
            Ok(()) => match compare::compare_files(&outfile, &masfile) {
                Ok(FileDiff::Same) => {}
                Ok(FileDiff::Differs { line, col }) => {
                    eprintln!(
                        "cxr: {} differs from {} at line {}, column {}",
                        outfile.display(),
                        masfile.display(),
                        line,
                        col
                    );
                    diff_failed.push((outfile.clone(), masfile.clone()));
                }
                Err(err) => {
                    eprintln!("cxr: cannot compare {}: {}", masfile.display(), err);
                    diff_failed.push((outfile.clone(), masfile.clone()));
                }
            },
            Err(err) => {
                eprintln!("cxr: parsing failed for {}: {}", file.display(), err);
                parsing_failed.push(file.clone());
            }
        }
    }

    if !diff_failed.is_empty() {
        eprintln!("\ncomparison failure summary");
        eprintln!("--------------------------");
        for (out, mas) in &diff_failed {
            eprintln!("{} {}", out.display(), mas.display());
        }
        eprintln!("comparison failed for {} files.\n", diff_failed.len());
    }
    if !parsing_failed.is_empty() {
        eprintln!("\nparsing failure summary");
        eprintln!("-----------------------");
        for file in &parsing_failed {
            eprintln!("{}", file.display());
        }
        eprintln!("parsing failed for {} files.\n", parsing_failed.len());
    }

    Ok((files.len(), parsing_failed.len() + diff_failed.len()))
}

fn parse_and_emit(parser: &Parser, file: &Path, outfile: &Path) -> io::Result<()> {
    let root = parser
        .parse_file(file)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    if let Some(dir) = outfile.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut sink = fs::File::create(outfile)?;
    let mut writer = Writer::new();
    writer.emit(&root, &mut sink, Indent::new())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// The parser configuration the end-to-end corpus needs: API export
/// decorations, declaration macros, noise macros, and vendor keyword
/// spellings from the wxWidgets, Skia and ObjectARX headers.
fn construct_parser() -> Parser {
    let mut config = ParserConfig::new();

    config.add_known_api_decors(vec![
        "WXDLLEXPORT",
        "WXDLLIMPEXP_ADV",
        "WXDLLIMPEXP_BASE",
        "WXDLLIMPEXP_CORE",
        "WXDLLIMPEXP_FWD_BASE",
        "WXDLLIMPEXP_FWD_CORE",
        "wxDEPRECATED_CLASS_MSG",
        "wxDEPRECATED_MSG",
        "SK_API",
        "SK_WARN_UNUSED_RESULT",
        "SKSL_WARN_UNUSED_RESULT",
        "SK_ALWAYS_INLINE",
        "ADESK_NO_VTABLE",
        "ACDB_PORT",
        "ACPAL_PORT",
        "GE_DLLEXPIMPORT",
        "APIENTRY",
        "WINGDIAPI",
        "_CRTIMP",
    ]);

    config.add_known_macros(vec![
        "wxDECLARE_DYNAMIC_CLASS",
        "wxDECLARE_ABSTRACT_CLASS",
        "wxDECLARE_NO_COPY_CLASS",
        "wxDECLARE_EVENT_TABLE",
        "wxDECLARE_APP",
        "WX_DECLARE_STRING_HASH_MAP",
        "WX_DECLARE_HASH_MAP",
        "WX_DECLARE_LIST_WITH_DECL",
        "DECLARE_DYNAMIC",
        "DECLARE_MESSAGE_MAP",
        "ACRX_DECLARE_MEMBERS",
        "SK_BEGIN_REQUIRE_DENSE",
        "SK_END_REQUIRE_DENSE",
        "SK_FLATTENABLE_HOOKS",
        "GR_MAKE_BITFIELD_CLASS_OPS",
        "GR_MAKE_BITFIELD_OPS",
        "DEFINE_OP_CLASS_ID",
        "va_arg",
    ]);

    config.add_ignorable_macros(vec![
        "WXUNUSED",
        "WXDLLIMPEXP_DATA_CORE",
        "wxDEPRECATED",
        "wxDEPRECATED_INLINE",
        "wxDEPRECATED_CONSTRUCTOR",
        "wxGCC_WARNING_SUPPRESS",
        "wxGCC_WARNING_RESTORE",
        "SkDEBUGCODE",
        "SkDEBUGPARAMS",
        "SK_RESTRICT",
        "SK_GUARDED_BY",
        "SK_REQUIRES",
        "API_AVAILABLE",
        "FAR",
        "EMIT",
    ]);

    config.add_undefined_names(vec!["wxUSE_DATETIME", "SWIG", "__WXMSW__"]);

    config.add_defined_name("wxUSE_TEXTCTRL", 1);
    config.add_defined_name("WXWIN_COMPATIBILITY_2_8", 0);
    config.add_defined_name("WXWIN_COMPATIBILITY_3_0", 0);

    config.add_renamed_keyword("virtual", "ADESK_SEALED_VIRTUAL");
    config.add_renamed_keyword("virtual", "_VIRTUAL");
    config.add_renamed_keyword("final", "ADESK_SEALED");
    config.add_renamed_keyword("override", "ADESK_OVERRIDE");
    config.add_renamed_keyword("override", "wxOVERRIDE");
    config.add_renamed_keyword("const", "CONST");

    config.parse_enum_body_as_blob();

    Parser::new(config)
}
