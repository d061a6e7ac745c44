use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use inkyscript_core::{lexer::Lexer, parser::Parser};

fn make_script(lines: usize) -> String {
    let mut buf = String::with_capacity(lines * 40);

    for i in 0..lines {
        match i % 8 {
            0 => buf.push_str(&format!("@char C{i}\n  name: \"Character {i}\"\n  sprite: c{i}.png\n")),
            1 => buf.push_str(&format!("== label_{i} ==\n")),
            2 => buf.push_str(&format!("scene bg{i}\n")),
            3 => buf.push_str(&format!("show spr{i} happy at left\n")),
            4 => buf.push_str(&format!("C{i} \"Hello world {i}\"\n")),
            5 => buf.push_str(&format!("~ counter += {i}\n")),
            6 => buf.push_str(&format!("{{ counter > {i} }}\n")),
            7 => {
                buf.push_str(&format!("* Option A -> label_a_{i}\n"));
                buf.push_str(&format!("* [counter < 3] Option B -> label_b_{i}\n"));
            }
            _ => unreachable!(),
        }
    }
    buf
}

fn bench_full(c: &mut Criterion) {
    let src = make_script(10_000);
    let mut group = c.benchmark_group("parse");
    group.sample_size(10);
    group.bench_function("lex+parse 10k lines", |b| {
        b.iter(|| {
            let tokens = Lexer::new(black_box(&src)).run();
            let _ast = Parser::new(black_box(&tokens)).parse();
        })
    });
    group.finish();
}

criterion_group!(benches, bench_full);
criterion_main!(benches);
