use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack|input_dir>", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    match jack_analyzer::analyze_path(input_path) {
        Ok(written) => {
            for path in written {
                println!("Wrote {path}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
