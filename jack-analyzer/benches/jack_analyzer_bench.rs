//! Jack Analyzer Benchmarks
//!
//! Measures:
//! - Tokenizer throughput, including comment-heavy input
//! - Full single-file analysis (tokenize + parse + write both XML outputs)
//!
//! Run with:
//! ```bash
//! cargo bench
//! ```

use std::io::Write;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

fn write_jack_file(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::File::create(&path).unwrap().write_all(contents.as_bytes()).unwrap();
    path
}

const SIMPLE_CLASS: &str = "\
class Main {
    function void main() {
        var int i;
        let i = 0;
        while (i < 10) {
            do Output.printInt(i);
            let i = i + 1;
        }
        return;
    }
}
";

const COMMENT_HEAVY_CLASS: &str = "\
// a class with lots of comments
class Main {
    /* this is a
       multi-line comment
       describing the field below */
    field int x; // trailing comment

    /** a doc comment */
    function void main() {
        return; // done
    }
}
";

fn bench_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");
    let dir = tempfile::tempdir().unwrap();

    let path = write_jack_file(dir.path(), "Simple.jack", SIMPLE_CLASS);
    group.throughput(Throughput::Bytes(SIMPLE_CLASS.len() as u64));
    group.bench_function("tokenize_simple_class", |b| {
        b.iter(|| {
            let mut tokenizer = jack_analyzer::tokenizer::JackTokenizer::new(path.to_str().unwrap()).unwrap();
            while tokenizer.has_more_tokens() {
                tokenizer.advance().unwrap();
                black_box(tokenizer.token_type());
            }
        });
    });

    let path = write_jack_file(dir.path(), "Comments.jack", COMMENT_HEAVY_CLASS);
    group.throughput(Throughput::Bytes(COMMENT_HEAVY_CLASS.len() as u64));
    group.bench_function("tokenize_comment_heavy_class", |b| {
        b.iter(|| {
            let mut tokenizer = jack_analyzer::tokenizer::JackTokenizer::new(path.to_str().unwrap()).unwrap();
            while tokenizer.has_more_tokens() {
                tokenizer.advance().unwrap();
                black_box(tokenizer.token_type());
            }
        });
    });

    group.finish();
}

fn bench_full_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_analysis");
    let dir = tempfile::tempdir().unwrap();
    let path = write_jack_file(dir.path(), "Main.jack", SIMPLE_CLASS);

    group.throughput(Throughput::Bytes(SIMPLE_CLASS.len() as u64));
    group.bench_function("analyze_simple_class", |b| {
        b.iter(|| {
            black_box(jack_analyzer::analyze_path(path.to_str().unwrap()).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_tokenizer, bench_full_analysis);
criterion_main!(benches);
