//! Benchmarks for the private data scanner.
//!
//! Measures the linear sweep over code regions of different sizes:
//! - Decoding a single instruction
//! - Scanning a region where the idiom sits after a long run of ordinary code
//! - Full extraction including reconstruction and checksum validation

extern crate privscope;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use privscope::{
    analysis::decode_one,
    extract::scan,
    file::CodeRegion,
    Extractor,
};
use std::hint::black_box;

/// `mov dword [rbp+disp32], imm32`
fn data_store(displacement: i32, immediate: u32) -> Vec<u8> {
    let mut code = vec![0xC7, 0x85];
    code.extend_from_slice(&displacement.to_le_bytes());
    code.extend_from_slice(&immediate.to_le_bytes());
    code
}

/// Ordinary prologue-like code followed by the private data initialization.
fn build_region(filler_blocks: usize) -> Vec<u8> {
    // push rbp; mov rbp, rsp; sub rsp, 0x40; mov eax, [rbp-8]; xor ecx, ecx; nop
    let filler = [
        0x55, 0x48, 0x89, 0xE5, 0x48, 0x83, 0xEC, 0x40, 0x8B, 0x45, 0xF8, 0x31, 0xC9, 0x90,
    ];

    let mut code = Vec::with_capacity(filler_blocks * filler.len() + 48);
    for _ in 0..filler_blocks {
        code.extend_from_slice(&filler);
    }
    for (i, word) in [0x4246_764E_u32, 0x6972_5043, 0x7461_4476, 0xC4AC_371E]
        .into_iter()
        .enumerate()
    {
        code.extend(data_store(-0x40 + 4 * i as i32, word));
    }
    // mov dword [rsp+0x30], 16
    code.extend_from_slice(&[0xC7, 0x44, 0x24, 0x30, 0x10, 0x00, 0x00, 0x00]);
    code
}

/// Benchmark decoding one `mov dword [rbp+disp32], imm32`.
fn bench_decode_one(c: &mut Criterion) {
    let code = data_store(-0x40, 0x4246_764E);

    c.bench_function("decode_one_data_store", |b| {
        b.iter(|| {
            let instr = decode_one(black_box(&code), 0).unwrap();
            black_box(instr)
        });
    });
}

/// Benchmark the scan over growing amounts of code in front of the idiom.
fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for blocks in [64_usize, 4_096, 65_536] {
        let code = build_region(blocks);
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(code.len()), &code, |b, code| {
            b.iter(|| {
                let found = scan(black_box(code)).unwrap();
                black_box(found.terminator_offset())
            });
        });
    }

    group.finish();
}

/// Benchmark scan, reconstruction and validation together.
fn bench_extract_region(c: &mut Criterion) {
    let code = build_region(4_096);
    let extractor = Extractor::default();

    c.bench_function("extract_region_57k", |b| {
        b.iter(|| {
            let region = CodeRegion::from_code(black_box(&code));
            let extraction = extractor.extract_region(&region).unwrap();
            black_box(extraction)
        });
    });
}

criterion_group!(benches, bench_decode_one, bench_scan, bench_extract_region);
criterion_main!(benches);
