#![allow(clippy::all)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{
    distributions::{Alphanumeric, DistString},
    Rng,
};
use serde::Serialize;
use serde_yajbe::Value;

#[derive(Serialize)]
struct Record {
    id: u64,
    name: String,
    score: f64,
    active: bool,
}

fn criterion_benchmark(c: &mut Criterion) {
    let value = ();
    c.bench_function("serialize null", |b| {
        b.iter(|| serde_yajbe::to_vec(black_box(&value)).unwrap())
    });

    let value = rand::random::<bool>();
    c.bench_function("serialize bool", |b| {
        b.iter(|| serde_yajbe::to_vec(black_box(&value)).unwrap())
    });

    let value = rand::random::<i64>();
    c.bench_function("serialize i64", |b| {
        b.iter(|| serde_yajbe::to_vec(black_box(&value)).unwrap())
    });

    let value = rand::random::<u64>();
    c.bench_function("serialize u64", |b| {
        b.iter(|| serde_yajbe::to_vec(black_box(&value)).unwrap())
    });

    let value = rand::random::<f64>();
    c.bench_function("serialize f64", |b| {
        b.iter(|| serde_yajbe::to_vec(black_box(&value)).unwrap())
    });

    let value = Alphanumeric.sample_string(&mut rand::thread_rng(), 64);
    c.bench_function("serialize str", |b| {
        b.iter(|| serde_yajbe::to_vec(black_box(&value)).unwrap())
    });

    let value: Vec<u64> = (0..256).map(|_| rand::thread_rng().gen()).collect();
    c.bench_function("serialize array of u64", |b| {
        b.iter(|| serde_yajbe::to_vec(black_box(&value)).unwrap())
    });

    let value: Vec<Record> = (0..64)
        .map(|i| Record {
            id: i,
            name: Alphanumeric.sample_string(&mut rand::thread_rng(), 12),
            score: rand::thread_rng().gen(),
            active: i % 2 == 0,
        })
        .collect();
    c.bench_function("serialize array of records", |b| {
        b.iter(|| serde_yajbe::to_vec(black_box(&value)).unwrap())
    });

    let buf = serde_yajbe::to_vec(&value).unwrap();
    c.bench_function("deserialize array of records to value", |b| {
        b.iter(|| serde_yajbe::from_slice::<Value>(black_box(&buf)).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
