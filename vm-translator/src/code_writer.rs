//! Emits Hack assembly for each VM command.
//!
//! Push/pop segment addressing and arithmetic keep the scratch-register
//! (`R13`/`R14`) convention; `call`/`function`/`return` additionally thread a
//! return-address and saved-frame convention through the symbolic `FRAME` and
//! `RET` pseudo-registers, which the assembler later resolves as ordinary
//! user variables.

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::VmError;

macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Clone, Copy)]
enum SegmentSymbol {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl SegmentSymbol {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(SegmentSymbol::Local),
            "argument" => Some(SegmentSymbol::Argument),
            "this" => Some(SegmentSymbol::This),
            "that" => Some(SegmentSymbol::That),
            "temp" => Some(SegmentSymbol::Temp),
            "pointer" => Some(SegmentSymbol::Pointer),
            "static" => Some(SegmentSymbol::Static),
            "constant" => Some(SegmentSymbol::Constant),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            SegmentSymbol::Local => "LCL",
            SegmentSymbol::Argument => "ARG",
            SegmentSymbol::This => "THIS",
            SegmentSymbol::That => "THAT",
            SegmentSymbol::Temp => "R5",
            SegmentSymbol::Pointer => "THIS",
            SegmentSymbol::Static => "STATIC",
            SegmentSymbol::Constant => "CONSTANT",
        }
    }
}

pub struct CodeWriter {
    output_file: BufWriter<File>,
    label_counter: usize,
    return_counter: usize,
    filename: String,
}

impl CodeWriter {
    /// Creates a new code writer that overwrites `output_filename`, buffered
    /// to 8192 bytes.
    pub fn new(output_filename: &str) -> Result<Self, VmError> {
        let file = File::create(output_filename)?;
        let buffered = BufWriter::with_capacity(8192, file);
        Ok(CodeWriter {
            output_file: buffered,
            label_counter: 0,
            return_counter: 0,
            filename: String::new(),
        })
    }

    #[inline]
    pub fn set_filename(&mut self, filename: &str) {
        let name = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        self.filename.clear();
        self.filename.push_str(name);
    }

    /// Emits `SP=256` followed by `call Sys.init 0`. Only multi-file
    /// (directory) translation runs bootstrap; single-file translation does
    /// not.
    pub fn write_init(&mut self) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// bootstrap"
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0)
    }

    pub fn write_label(&mut self, label: &str) -> Result<(), VmError> {
        writeln!(self.output_file, "({label})")?;
        Ok(())
    }

    pub fn write_goto(&mut self, label: &str) -> Result<(), VmError> {
        writeln!(self.output_file, "@{label}\n0;JMP")?;
        Ok(())
    }

    pub fn write_if(&mut self, label: &str) -> Result<(), VmError> {
        self.write_pop_to_d()?;
        writeln!(self.output_file, "@{label}\nD;JNE")?;
        Ok(())
    }

    /// `call f n`: push the return address then the caller's LCL/ARG/THIS/THAT,
    /// reposition ARG/LCL for the callee, and jump. The return label embeds a
    /// per-writer counter so repeated calls to the same function don't collide.
    pub fn write_call(&mut self, function_name: &str, num_args: i32) -> Result<(), VmError> {
        let return_label = format!("{function_name}-return-{}", self.return_counter);
        self.return_counter += 1;

        writeln!(self.output_file, "@{return_label}\nD=A")?;
        self.write_push_d()?;

        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.output_file, "@{saved}\nD=M")?;
            self.write_push_d()?;
        }

        write!(
            self.output_file,
            "@SP\n\
             D=M\n\
             @{}\n\
             D=D-A\n\
             @ARG\n\
             M=D\n\
             @SP\n\
             D=M\n\
             @LCL\n\
             M=D\n",
            num_args + 5
        )?;

        writeln!(self.output_file, "@{function_name}\n0;JMP")?;
        writeln!(self.output_file, "({return_label})")?;
        Ok(())
    }

    /// `function f k`: declare the entry label, then push `k` zeroed locals.
    pub fn write_function(&mut self, function_name: &str, num_locals: i32) -> Result<(), VmError> {
        writeln!(self.output_file, "({function_name})")?;
        for _ in 0..num_locals {
            write_asm!(self.output_file, "@0" "D=A")?;
            self.write_push_d()?;
        }
        Ok(())
    }

    /// `return`: snapshot the caller's frame into `FRAME`, recover `RET` from
    /// `FRAME-5`, place the return value at the caller's argument slot, reset
    /// `SP`, restore `THAT`/`THIS`/`ARG`/`LCL`, and jump to `RET`.
    pub fn write_return(&mut self) -> Result<(), VmError> {
        writeln!(self.output_file, "@LCL\nD=M\n@FRAME\nM=D")?;

        write!(
            self.output_file,
            "@FRAME\n\
             D=M\n\
             @5\n\
             A=D-A\n\
             D=M\n\
             @RET\n\
             M=D\n"
        )?;

        self.write_pop_to_d()?;
        writeln!(self.output_file, "@ARG\nA=M\nM=D")?;

        writeln!(self.output_file, "@ARG\nD=M\n@SP\nM=D+1")?;

        for (offset, dest) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            write!(
                self.output_file,
                "@FRAME\n\
                 D=M\n\
                 @{offset}\n\
                 A=D-A\n\
                 D=M\n\
                 @{dest}\n\
                 M=D\n"
            )?;
        }

        writeln!(self.output_file, "@RET\nA=M\n0;JMP")?;
        Ok(())
    }

    pub fn write_arithmetic(&mut self, command: &str) -> Result<(), VmError> {
        writeln!(self.output_file, "// vm command:{command}")?;

        match command {
            "add" => self.write_binary_op("D+M"),
            "sub" => self.write_binary_op("D-M"),
            "and" => self.write_binary_op("D&M"),
            "or" => self.write_binary_op("D|M"),
            "neg" => self.write_unary_op(true),
            "not" => self.write_unary_op(false),
            "eq" => self.write_comparison("JEQ"),
            "gt" => self.write_comparison("JGT"),
            "lt" => self.write_comparison("JLT"),
            other => Err(VmError::Malformed(format!(
                "unknown arithmetic command: {other}"
            ))),
        }
    }

    #[inline]
    fn write_binary_op(&mut self, operation: &str) -> Result<(), VmError> {
        write!(
            self.output_file,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R14\n\
             M=D\n\
             // get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D={operation}\n"
        )?;

        self.write_push_d()?;
        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_unary_op(&mut self, is_neg: bool) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;

        if is_neg {
            write_asm!(self.output_file, "@0" "D=A-D")?;
        } else {
            write_asm!(self.output_file, "D=!D")?;
        }

        self.write_push_d()?;
        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_comparison(&mut self, jump: &str) -> Result<(), VmError> {
        let label_num = self.label_counter;
        self.label_counter += 1;

        write!(
            self.output_file,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R14\n\
             M=D\n\
             // get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // store the result temporarily\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D=D-M\n\
             @JMP_LABEL{label_num}\n\
             D;{jump}\n\
             // push the value into stack\n\
             @SP\n\
             A=M\n\
             M=0\n\
             @SP\n\
             M=M+1\n\
             @JMP_END{label_num}\n\
             0;JMP\n\
             (JMP_LABEL{label_num})\n\
             // push the value into stack\n\
             @SP\n\
             A=M\n\
             M=-1\n\
             @SP\n\
             M=M+1\n\
             (JMP_END{label_num})\n\n"
        )?;
        Ok(())
    }

    pub fn write_push_pop(
        &mut self,
        command: &str,
        segment: &str,
        index: i32,
    ) -> Result<(), VmError> {
        writeln!(self.output_file, "// vm command:{command} {segment} {index}")?;

        if command == "push" {
            self.write_push(segment, index)?;
        } else if command == "pop" {
            self.write_pop(segment, index)?;
        }

        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_push(&mut self, segment: &str, index: i32) -> Result<(), VmError> {
        let seg = SegmentSymbol::from_str(segment)
            .ok_or_else(|| VmError::UnknownSegment(segment.to_string()))?;

        match seg {
            SegmentSymbol::Constant => {
                write!(self.output_file, "@{index}\nD=A\n")?;
                self.write_push_d()
            }
            SegmentSymbol::Local | SegmentSymbol::Argument | SegmentSymbol::This | SegmentSymbol::That => {
                let symbol = seg.symbol();
                write!(self.output_file, "@{symbol}\nD=M\n@{index}\nA=D+A\nD=M\n")?;
                self.write_push_d()
            }
            SegmentSymbol::Temp => {
                write!(self.output_file, "@R5\nD=A\n@{index}\nA=D+A\nD=M\n")?;
                self.write_push_d()
            }
            SegmentSymbol::Pointer => {
                write!(self.output_file, "@THIS\nD=A\n@{index}\nA=D+A\nD=M\n")?;
                self.write_push_d()
            }
            SegmentSymbol::Static => {
                write!(self.output_file, "@{}.{index}\nD=M\n", self.filename)?;
                self.write_push_d()
            }
        }
    }

    #[inline]
    fn write_pop(&mut self, segment: &str, index: i32) -> Result<(), VmError> {
        let seg = SegmentSymbol::from_str(segment)
            .ok_or_else(|| VmError::UnknownSegment(segment.to_string()))?;

        match seg {
            SegmentSymbol::Constant => Err(VmError::PopConstant),
            SegmentSymbol::Local | SegmentSymbol::Argument | SegmentSymbol::This | SegmentSymbol::That => {
                let symbol = seg.symbol();
                write!(
                    self.output_file,
                    "@{symbol}\n\
                     D=M\n\
                     @{index}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n"
                )?;
                self.write_pop_to_d()?;
                write_asm!(self.output_file, "// store the top value" "@R13" "A=M" "M=D")?;
                Ok(())
            }
            SegmentSymbol::Temp => {
                write!(
                    self.output_file,
                    "@5\n\
                     D=A\n\
                     @{index}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n"
                )?;
                self.write_pop_to_d()?;
                write_asm!(self.output_file, "// store the top value" "@R13" "A=M" "M=D")?;
                Ok(())
            }
            SegmentSymbol::Pointer => {
                write!(
                    self.output_file,
                    "@THIS\n\
                     D=A\n\
                     @{index}\n\
                     D=D+A\n\
                     // store the result temporarily\n\
                     @R13\n\
                     M=D\n"
                )?;
                self.write_pop_to_d()?;
                write_asm!(self.output_file, "// store the top value" "@R13" "A=M" "M=D")?;
                Ok(())
            }
            SegmentSymbol::Static => {
                self.write_pop_to_d()?;
                write!(self.output_file, "@{}.{index}\nM=D\n", self.filename)?;
                Ok(())
            }
        }
    }

    #[inline]
    fn write_push_d(&mut self) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// push the value into stack"
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )?;
        Ok(())
    }

    #[inline]
    fn write_pop_to_d(&mut self) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;
        Ok(())
    }

    #[inline]
    pub fn close(&mut self) -> Result<(), VmError> {
        self.output_file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn written(f: impl FnOnce(&mut CodeWriter) -> Result<(), VmError>) -> String {
        let path = tempfile::NamedTempFile::new().unwrap().into_temp_path();
        let path_str = path.to_str().unwrap().to_string();
        {
            let mut writer = CodeWriter::new(&path_str).unwrap();
            writer.set_filename("Foo.vm");
            f(&mut writer).unwrap();
            writer.close().unwrap();
        }
        fs::read_to_string(&path_str).unwrap()
    }

    #[test]
    fn push_constant_emits_literal() {
        let asm = written(|w| w.write_push_pop("push", "constant", 7));
        assert!(asm.contains("@7\nD=A"));
    }

    #[test]
    fn pop_constant_is_rejected() {
        let path = tempfile::NamedTempFile::new().unwrap().into_temp_path();
        let mut writer = CodeWriter::new(path.to_str().unwrap()).unwrap();
        let err = writer.write_push_pop("pop", "constant", 0).unwrap_err();
        assert!(matches!(err, VmError::PopConstant));
    }

    #[test]
    fn unknown_segment_is_rejected() {
        let path = tempfile::NamedTempFile::new().unwrap().into_temp_path();
        let mut writer = CodeWriter::new(path.to_str().unwrap()).unwrap();
        let err = writer.write_push_pop("push", "nonsense", 0).unwrap_err();
        assert!(matches!(err, VmError::UnknownSegment(_)));
    }

    #[test]
    fn static_segment_uses_file_stem() {
        let asm = written(|w| w.write_push_pop("pop", "static", 3));
        assert!(asm.contains("@Foo.3\nM=D"));
    }

    #[test]
    fn comparisons_use_monotonically_increasing_labels() {
        let asm = written(|w| {
            w.write_arithmetic("eq")?;
            w.write_arithmetic("gt")?;
            Ok(())
        });
        assert!(asm.contains("(JMP_LABEL0)"));
        assert!(asm.contains("(JMP_END0)"));
        assert!(asm.contains("(JMP_LABEL1)"));
        assert!(asm.contains("(JMP_END1)"));
    }

    #[test]
    fn call_emits_unique_return_labels_per_call() {
        let asm = written(|w| {
            w.write_call("Foo.bar", 1)?;
            w.write_call("Foo.bar", 2)?;
            Ok(())
        });
        assert!(asm.contains("(Foo.bar-return-0)"));
        assert!(asm.contains("(Foo.bar-return-1)"));
    }

    #[test]
    fn function_allocates_k_zeroed_locals() {
        let asm = written(|w| w.write_function("Foo.bar", 3));
        assert_eq!(asm.matches("@0\nD=A").count(), 3);
    }

    #[test]
    fn bootstrap_sets_stack_pointer_and_calls_sys_init() {
        let asm = written(|w| w.write_init());
        assert!(asm.contains("@256\nD=A\n@SP\nM=D"));
        assert!(asm.contains("@Sys.init\n0;JMP"));
    }
}
