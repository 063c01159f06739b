use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm|input_dir>", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    match vm_translator::translate_path(input_path) {
        Ok(output_path) => println!("Translation complete: {input_path} -> {output_path}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
