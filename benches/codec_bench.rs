//! Codec benchmarks
//!
//! Measures encode/decode cost and frame-scan throughput for the wire
//! protocol. Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use depot::protocol::{
    decode_command, encode_command, encode_response, Command, FrameBuffer, FRAME_TERMINATOR,
};
use depot::protocol::Response;

/// Base64 text for 1 KiB of file content
fn payload_1k() -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    STANDARD.encode(vec![0xAB; 1024])
}

fn bench_encode_upload(c: &mut Criterion) {
    let payload = payload_1k();
    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("upload_1k", |b| {
        b.iter(|| {
            let command = Command::Upload {
                filename: "bench.bin".to_string(),
                payload: payload.clone(),
            };
            black_box(encode_command(command).unwrap())
        });
    });
    group.finish();
}

fn bench_decode_upload(c: &mut Criterion) {
    let frame = {
        let mut encoded = encode_command(Command::Upload {
            filename: "bench.bin".to_string(),
            payload: payload_1k(),
        })
        .unwrap();
        encoded.truncate(encoded.len() - FRAME_TERMINATOR.len());
        encoded
    };

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(frame.len() as u64));
    group.bench_function("upload_1k", |b| {
        b.iter(|| black_box(decode_command(black_box(&frame)).unwrap()));
    });
    group.finish();
}

fn bench_encode_listing(c: &mut Criterion) {
    let filenames: Vec<String> = (0..100).map(|i| format!("file_{:03}.bin", i)).collect();

    c.bench_function("encode/listing_100", |b| {
        b.iter(|| black_box(encode_response(Response::listing(filenames.clone())).unwrap()));
    });
}

fn bench_frame_scan(c: &mut Criterion) {
    // Sixteen pipelined GET frames arriving in one burst
    let mut burst = Vec::new();
    for i in 0..16 {
        burst.extend_from_slice(
            &encode_command(Command::Get {
                filename: format!("file_{:02}.bin", i),
            })
            .unwrap(),
        );
    }

    let mut group = c.benchmark_group("frame_scan");
    group.throughput(Throughput::Bytes(burst.len() as u64));
    group.bench_function("pipelined_16", |b| {
        b.iter(|| {
            let mut buffer = FrameBuffer::new();
            buffer.extend(&burst);
            let mut frames = 0;
            while let Some(frame) = buffer.next_frame() {
                black_box(&frame);
                frames += 1;
            }
            assert_eq!(frames, 16);
        });
    });
    group.finish();
}

fn bench_incremental_arrival(c: &mut Criterion) {
    // One frame trickling in 8-byte chunks, the worst case for rescanning
    let frame_bytes = encode_command(Command::Upload {
        filename: "bench.bin".to_string(),
        payload: payload_1k(),
    })
    .unwrap();

    let mut group = c.benchmark_group("frame_scan");
    group.throughput(Throughput::Bytes(frame_bytes.len() as u64));
    group.bench_function("incremental_8b_chunks", |b| {
        b.iter(|| {
            let mut buffer = FrameBuffer::new();
            let mut found = None;
            for chunk in frame_bytes.chunks(8) {
                buffer.extend(chunk);
                if let Some(frame) = buffer.next_frame() {
                    found = Some(frame);
                }
            }
            black_box(found.unwrap())
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_encode_upload,
    bench_decode_upload,
    bench_encode_listing,
    bench_frame_scan,
    bench_incremental_arrival
);
criterion_main!(benches);
