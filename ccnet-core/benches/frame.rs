use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ccnet_core::{build_frame, checksum, Command, Frame};

fn bench_crc16(c: &mut Criterion) {
    let data = vec![0x5Au8; Frame::MAX_PAYLOAD_SIZE];

    c.bench_function("crc16_max_frame", |b| {
        b.iter(|| checksum::crc16(black_box(&data)))
    });
}

fn bench_build_frame(c: &mut Criterion) {
    let empty: &[u8] = &[];
    let mask: &[u8] = &[0, 0, 0x7C, 0, 0, 0];

    c.bench_function("build_frame_poll", |b| {
        b.iter(|| build_frame(black_box(Command::Poll), black_box(empty)))
    });

    c.bench_function("build_frame_enable_bill_types", |b| {
        b.iter(|| build_frame(Command::EnableBillTypes, black_box(mask)))
    });
}

criterion_group!(benches, bench_crc16, bench_build_frame);
criterion_main!(benches);
