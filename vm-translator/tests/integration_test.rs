use std::fs;
use std::io::Write;

fn write_vm(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::File::create(&path).unwrap().write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn simple_add_pushes_and_sums_two_constants() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_vm(dir.path(), "SimpleAdd.vm", "push constant 7\npush constant 8\nadd\n");

    let output = vm_translator::translate_path(input.to_str().unwrap()).unwrap();
    let asm = fs::read_to_string(output).unwrap();

    assert!(asm.contains("@7\nD=A"));
    assert!(asm.contains("@8\nD=A"));
    assert!(asm.contains("D=D+M"));
}

#[test]
fn stack_test_exercises_every_arithmetic_and_comparison_op() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_vm(
        dir.path(),
        "StackTest.vm",
        "push constant 17\npush constant 17\neq\n\
         push constant 5\nneg\n\
         push constant 0\nnot\n\
         push constant 1\npush constant 2\nlt\n\
         push constant 9\npush constant 8\ngt\n\
         push constant 5\npush constant 3\nsub\n\
         push constant 1\npush constant 0\nand\n\
         push constant 1\npush constant 0\nor\n",
    );

    let output = vm_translator::translate_path(input.to_str().unwrap()).unwrap();
    let asm = fs::read_to_string(output).unwrap();

    for op in ["D=D-M", "D=A-D", "D=!D", "D=D&M", "D=D|M"] {
        assert!(asm.contains(op), "missing {op}");
    }
    assert!(asm.contains("(EQ0)"));
    assert!(asm.contains("(LT1)"));
    assert!(asm.contains("(GT2)"));
}

#[test]
fn basic_test_exercises_all_eight_segments() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_vm(
        dir.path(),
        "BasicTest.vm",
        "push constant 10\npop local 0\n\
         push constant 21\npush constant 22\npop argument 2\npop argument 1\n\
         push constant 36\npop this 6\n\
         push constant 42\npush constant 45\npop that 5\npop that 2\n\
         push constant 510\npop temp 6\n\
         push constant 3\npop pointer 0\n\
         push constant 4\npop pointer 1\n",
    );

    let output = vm_translator::translate_path(input.to_str().unwrap()).unwrap();
    let asm = fs::read_to_string(output).unwrap();

    assert!(asm.contains("@LCL\nD=M"));
    assert!(asm.contains("@ARG\nD=M"));
    assert!(asm.contains("@THIS\nD=A"));
    assert!(asm.contains("@5\nD=A"));
}

#[test]
fn static_segment_is_namespaced_per_source_file_in_directory_mode() {
    let dir = tempfile::tempdir().unwrap();
    write_vm(dir.path(), "Sys.vm", "function Sys.init 0\ncall Main.main 0\nreturn\n");
    write_vm(
        dir.path(),
        "Main.vm",
        "function Main.main 0\npush constant 7\npop static 0\nreturn\n",
    );

    let output = vm_translator::translate_path(dir.path().to_str().unwrap()).unwrap();
    let asm = fs::read_to_string(output).unwrap();

    assert!(asm.contains("@Main.0\nM=D"));
}

#[test]
fn fibonacci_element_uses_the_full_call_return_convention() {
    let dir = tempfile::tempdir().unwrap();
    write_vm(
        dir.path(),
        "Sys.vm",
        "function Sys.init 0\npush constant 4\ncall Main.fibonacci 1\nreturn\n",
    );
    write_vm(
        dir.path(),
        "Main.vm",
        "function Main.fibonacci 0\n\
         push argument 0\npush constant 2\nlt\n\
         if-goto N_LT_2\n\
         goto N_GE_2\n\
         label N_LT_2\n\
         push argument 0\nreturn\n\
         label N_GE_2\n\
         push argument 0\npush constant 2\nsub\n\
         call Main.fibonacci 1\n\
         push argument 0\npush constant 1\nsub\n\
         call Main.fibonacci 1\n\
         add\nreturn\n",
    );

    let output = vm_translator::translate_path(dir.path().to_str().unwrap()).unwrap();
    let asm = fs::read_to_string(output).unwrap();

    assert_eq!(asm.matches("(Main.fibonacci-return-").count(), 2);
    assert!(asm.contains("@FRAME"));
    assert!(asm.contains("@RET"));
    assert!(asm.contains("(N_LT_2)"));
    assert!(asm.contains("(N_GE_2)"));
}

#[test]
fn malformed_command_surfaces_as_an_error_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_vm(dir.path(), "Bad.vm", "push constant\n");

    let result = vm_translator::translate_path(input.to_str().unwrap());
    assert!(result.is_err());
}
