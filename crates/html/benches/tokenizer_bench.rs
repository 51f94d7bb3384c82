use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use html::{TokenizeResult, Tokenizer, TokenizerConfig};

fn sample_document(repeats: usize) -> String {
    let mut out = String::from("<!DOCTYPE html><html><head><title>bench</title></head><body>");
    for i in 0..repeats {
        out.push_str(&format!(
            "<div class=\"row r{i}\" data-index=\"{i}\"><p>Cell &amp; value {i}</p><!-- row --></div>"
        ));
    }
    out.push_str("</body></html>");
    out
}

fn tokenize_all(input: &str) -> usize {
    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let mut count = 0usize;
    let mut result = tokenizer.push_str(input);
    let mut finished = false;
    loop {
        count += tokenizer.drain_tokens().len();
        match result {
            TokenizeResult::EmittedEof => break,
            TokenizeResult::NeedMoreInput => {
                if finished {
                    break;
                }
                finished = true;
                result = tokenizer.finish();
            }
            TokenizeResult::Progress => result = tokenizer.pump(),
        }
    }
    count
}

fn bench_tokenizer(c: &mut Criterion) {
    let doc = sample_document(512);
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Bytes(doc.len() as u64));
    group.bench_function("full_document", |b| {
        b.iter(|| tokenize_all(black_box(&doc)))
    });
    group.finish();
}

criterion_group!(benches, bench_tokenizer);
criterion_main!(benches);
