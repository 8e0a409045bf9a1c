//! レキシコンの構築と問い合わせのベンチマーク
//!
//! 合成した語幹から見出しを追加する速度と、構築済みレキシコンへの問い合わせ速度を計測します。

use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use morpho::{Form, Lexicon, Query};

fn stems(n: usize) -> Vec<String> {
    let letters = b"abcdefghij";
    (0..n)
        .map(|i| {
            let mut stem = String::new();
            let mut x = i;
            loop {
                stem.push(char::from(letters[x % letters.len()]));
                x /= letters.len();
                if x == 0 {
                    break;
                }
            }
            stem
        })
        .collect()
}

fn forms(n: usize) -> Vec<Form> {
    stems(n)
        .iter()
        .map(|stem| {
            Form::builder()
                .lemma_segmentation([stem.as_str()])
                .lemma_gloss([stem.as_str()])
                .segmentation([stem.as_str(), "-s"])
                .gloss([stem.as_str(), "PL"])
                .feature("pos", "N")
                .build()
                .unwrap()
        })
        .collect()
}

fn bench_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("Lexicon Insertion");
    group.warm_up_time(Duration::from_secs(1));
    group.sample_size(10);

    for n in [10, 50] {
        let forms = forms(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("add_entry", n), &forms, |b, forms| {
            b.iter(|| {
                let mut lexicon = Lexicon::new();
                lexicon.extend(forms).unwrap();
                lexicon
            });
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut lexicon = Lexicon::new();
    lexicon.extend(&forms(50)).unwrap();

    let mut group = c.benchmark_group("Lexicon Query");
    group.warm_up_time(Duration::from_secs(1));
    group.sample_size(10);

    group.bench_function("segmentation", |b| {
        let query = Query::new().segmentation(["ba", "-s"]);
        b.iter(|| lexicon.query(&query).unwrap());
    });
    group.bench_function("gloss", |b| {
        let query = Query::new().gloss(["ba", "PL"]);
        b.iter(|| lexicon.query(&query).unwrap());
    });
    group.bench_function("features", |b| {
        let query = Query::new().feature("pos", "N");
        b.iter(|| lexicon.query(&query).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_insertion, bench_query);
criterion_main!(benches);
