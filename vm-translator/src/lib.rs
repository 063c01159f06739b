//! Translates Hack VM commands into Hack assembly.
//!
//! [`translate_path`] accepts either a single `.vm` file or a directory of
//! them. A directory is translated as one program: bootstrap code runs once,
//! every `.vm` file inside contributes its commands in turn, and the static
//! segment is namespaced per file via [`code_writer::CodeWriter::set_filename`].
//! A single file is translated on its own, with no bootstrap, matching how
//! the early, pre-multi-file Nand2Tetris projects are tested standalone.
//!
//! ```no_run
//! let output = vm_translator::translate_path("Main.vm").unwrap();
//! assert_eq!(output, "Main.asm");
//! ```

pub mod code_writer;
pub mod error;
pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use code_writer::CodeWriter;
use error::VmError;
use parser::{CommandType, Parser};

/// Translates one already-open `.vm` file's commands through `writer`.
fn translate_file(input_file: &Path, writer: &mut CodeWriter) -> Result<(), VmError> {
    writer.set_filename(
        input_file
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown"),
    );

    let mut parser = Parser::new(
        input_file
            .to_str()
            .ok_or_else(|| VmError::Malformed(format!("non-UTF8 path: {}", input_file.display())))?,
    )?;

    while parser.has_more_commands() {
        parser.advance();

        match parser.command_type()? {
            CommandType::Arithmetic => writer.write_arithmetic(parser.arg1()?)?,
            CommandType::Push => writer.write_push_pop("push", parser.arg1()?, parser.arg2()?)?,
            CommandType::Pop => writer.write_push_pop("pop", parser.arg1()?, parser.arg2()?)?,
            CommandType::Label => writer.write_label(parser.arg1()?)?,
            CommandType::Goto => writer.write_goto(parser.arg1()?)?,
            CommandType::If => writer.write_if(parser.arg1()?)?,
            CommandType::Function => writer.write_function(parser.arg1()?, parser.arg2()?)?,
            CommandType::Call => writer.write_call(parser.arg1()?, parser.arg2()?)?,
            CommandType::Return => writer.write_return()?,
        }
    }

    Ok(())
}

fn vm_files_in(dir: &Path) -> Result<Vec<PathBuf>, VmError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("vm"))
        .collect();
    files.sort();
    Ok(files)
}

/// Translates `input_path` (a `.vm` file or a directory of them) and returns
/// the output `.asm` path written.
pub fn translate_path(input_path: &str) -> Result<String, VmError> {
    let path = Path::new(input_path);

    if path.is_dir() {
        let dir_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| VmError::Malformed(format!("invalid directory name: {input_path}")))?;
        let output_path = path.join(format!("{dir_name}.asm"));

        let files = vm_files_in(path)?;
        if files.is_empty() {
            return Err(VmError::Malformed(format!(
                "no .vm files found in directory: {input_path}"
            )));
        }

        let mut writer = CodeWriter::new(output_path.to_str().ok_or_else(|| {
            VmError::Malformed(format!("non-UTF8 output path: {}", output_path.display()))
        })?)?;

        writer.write_init()?;
        for file in &files {
            translate_file(file, &mut writer)?;
        }
        writer.close()?;

        Ok(output_path.to_string_lossy().into_owned())
    } else {
        let output_path = output_filename_for(path);
        let mut writer = CodeWriter::new(&output_path)?;
        translate_file(path, &mut writer)?;
        writer.close()?;
        Ok(output_path)
    }
}

fn output_filename_for(path: &Path) -> String {
    match (path.file_stem(), path.parent()) {
        (Some(stem), Some(parent)) if !parent.as_os_str().is_empty() => {
            parent.join(stem).with_extension("asm").to_string_lossy().into_owned()
        }
        (Some(stem), _) => format!("{}.asm", stem.to_string_lossy()),
        _ => format!("{path}.asm", path = path.display()),
    }
}
