//! Parses Jack source into an XML token stream and parse tree.
//!
//! [`analyze_path`] accepts either a single `.jack` file or a directory
//! containing several; each input file `Foo.jack` yields two outputs:
//! `FooT.xml` (the flat token stream) and `Foo.xml` (the structured parse
//! tree from [`compilation_engine::CompilationEngine`]).
//!
//! ```no_run
//! let written = jack_analyzer::analyze_path("Main.jack").unwrap();
//! assert_eq!(written, vec!["MainT.xml".to_string(), "Main.xml".to_string()]);
//! ```

pub mod compilation_engine;
pub mod error;
pub mod tokenizer;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use compilation_engine::CompilationEngine;
use error::JackError;
use tokenizer::JackTokenizer;

fn jack_files_in(dir: &Path) -> Result<Vec<PathBuf>, JackError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("jack"))
        .collect();
    files.sort();
    Ok(files)
}

/// Writes the flat `<tokens>...</tokens>` stream for one file.
fn write_token_xml(input: &Path, output: &Path) -> Result<(), JackError> {
    let mut tokenizer = JackTokenizer::new(input.to_str().ok_or_else(|| {
        JackError::Io(std::io::Error::other(format!("non-UTF8 path: {}", input.display())))
    })?)?;
    let mut out = BufWriter::new(fs::File::create(output)?);

    writeln!(out, "<tokens>")?;
    while tokenizer.has_more_tokens() {
        tokenizer.advance()?;
        tokenizer.write_token(&mut out)?;
    }
    writeln!(out, "</tokens>")?;
    out.flush()?;
    Ok(())
}

/// Writes the structured parse tree for one file.
fn write_parse_tree_xml(input: &Path, output: &Path) -> Result<(), JackError> {
    let mut tokenizer = JackTokenizer::new(input.to_str().ok_or_else(|| {
        JackError::Io(std::io::Error::other(format!("non-UTF8 path: {}", input.display())))
    })?)?;
    tokenizer.advance()?;

    let out = BufWriter::new(fs::File::create(output)?);
    let mut engine = CompilationEngine::new(&mut tokenizer, out);
    engine.compile()
}

fn analyze_file(input: &Path) -> Result<Vec<String>, JackError> {
    let token_xml = input.with_file_name(format!(
        "{}T.xml",
        input.file_stem().and_then(|s| s.to_str()).unwrap_or("Unknown")
    ));
    write_token_xml(input, &token_xml)?;

    let parse_xml = input.with_extension("xml");
    write_parse_tree_xml(input, &parse_xml)?;

    Ok(vec![
        token_xml.to_string_lossy().into_owned(),
        parse_xml.to_string_lossy().into_owned(),
    ])
}

/// Analyzes `input_path` (a `.jack` file or a directory of them), returning
/// the paths of every XML file written.
pub fn analyze_path(input_path: &str) -> Result<Vec<String>, JackError> {
    let path = Path::new(input_path);

    if path.is_dir() {
        let files = jack_files_in(path)?;
        if files.is_empty() {
            return Err(JackError::Io(std::io::Error::other(format!(
                "no .jack files found in directory: {input_path}"
            ))));
        }

        let mut written = Vec::new();
        for file in &files {
            written.extend(analyze_file(file)?);
        }
        Ok(written)
    } else {
        analyze_file(path)
    }
}
