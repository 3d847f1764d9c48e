use criterion::{criterion_group, criterion_main, Criterion};
use searchcore::normalize::{Normalize, Normalizer, NormalizerConfig};
use searchcore::tokenizer::tokenize;

const TEXT: &str = "Correction: An earlier version of this article misstated the Prince George's County \
Police Department's homicide closure rate for 2011. The rate was 66 percent, not 63 percent. The District \
and Prince George's County had nearly the same number of homicides in 2011, a major departure from a high \
20 years ago, when the city saw 325 more slayings than the county. It is a shift that reflects a \
double-digit drop in killings in the District from 2010 to 2011.";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_paragraph", |b| b.iter(|| tokenize(TEXT)));
}

fn bench_normalize(c: &mut Criterion) {
    let stem = Normalizer::from_config(&NormalizerConfig::stem());
    let tagged = Normalizer::from_config(&NormalizerConfig::tagged());
    c.bench_function("normalized_tokens_stem", |b| b.iter(|| stem.get_normalized_tokens(None, Some(TEXT))));
    c.bench_function("normalized_tokens_tagged", |b| b.iter(|| tagged.get_normalized_tokens(None, Some(TEXT))));
}

criterion_group!(benches, bench_tokenize, bench_normalize);
criterion_main!(benches);
