use checksums::RollingChecksum;
use checksums::strong::{Md4, Md5, Sha1, StrongDigest, Xxh3_128};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_data(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    (0..len).map(|_| rng.r#gen()).collect()
}

fn bench_rolling(c: &mut Criterion) {
    let data = random_data(256 * 1024);
    let mut group = c.benchmark_group("rolling");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("update", |b| {
        b.iter(|| {
            let mut checksum = RollingChecksum::new();
            checksum.update(black_box(&data));
            checksum.value()
        });
    });

    group.bench_function("roll_2048_window", |b| {
        b.iter(|| {
            let mut checksum = RollingChecksum::new();
            checksum.update(&data[..2048]);
            for i in 2048..data.len() {
                checksum
                    .roll(data[i - 2048], data[i])
                    .expect("window is non-empty");
            }
            checksum.value()
        });
    });
    group.finish();
}

fn bench_strong(c: &mut Criterion) {
    let mut group = c.benchmark_group("strong");
    for block_len in [700usize, 2048, 16 * 1024] {
        let data = random_data(block_len);
        group.throughput(Throughput::Bytes(block_len as u64));
        group.bench_with_input(BenchmarkId::new("md4", block_len), &data, |b, data| {
            b.iter(|| Md4::digest(black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("md5", block_len), &data, |b, data| {
            b.iter(|| Md5::digest(black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("sha1", block_len), &data, |b, data| {
            b.iter(|| Sha1::digest(black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("xxh3_128", block_len), &data, |b, data| {
            b.iter(|| <Xxh3_128 as StrongDigest>::digest(black_box(data)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rolling, bench_strong);
criterion_main!(benches);
