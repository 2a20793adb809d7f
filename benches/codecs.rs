#![allow(unused)]
extern crate romkit;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use romkit::codec::{lz77, Block, BlockCodec, Tile, TileAttributes, Tilemap2D, TilemapCodec};
use std::hint::black_box;

/// A blockset resembling a room tileset: runs of consecutive tiles with sparse flips.
fn sample_blockset(count: usize) -> Vec<Block> {
    (0..count)
        .map(|i| {
            let base = (i as u16 * 3) % 0x700;
            let mut block = Block::new([
                Tile::new(base),
                Tile::new(base + 1),
                Tile::new(base + 0x20),
                Tile::new(base + 0x21),
            ]);
            if i % 7 == 0 {
                block.tiles[2] = block.tiles[2].with_attributes(TileAttributes::HFLIP);
            }
            if i % 11 == 0 {
                block.tiles[0] = block.tiles[0].with_attributes(TileAttributes::PRIORITY);
            }
            block
        })
        .collect()
}

/// A 40x28 screen map with an incrementing picture and a flat background.
fn sample_tilemap() -> Tilemap2D {
    let mut map = Tilemap2D::new(40, 28);
    map.fill(Tile::new(0x10));
    for y in 4..20 {
        for x in 8..32 {
            let tile = Tile::new(0x100 + (y * 24 + x) as u16 % 0x600);
            map.set_tile(x, y, tile.with_attributes(TileAttributes::PALETTE_LOW))
                .unwrap();
        }
    }
    map
}

fn bench_blockset(c: &mut Criterion) {
    let blocks = sample_blockset(1024);
    let encoded = BlockCodec::encode(&blocks).unwrap();

    let mut group = c.benchmark_group("blockset");
    group.throughput(Throughput::Elements(blocks.len() as u64));
    group.bench_function("encode", |b| {
        b.iter(|| black_box(BlockCodec::encode(black_box(&blocks)).unwrap()));
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(BlockCodec::decode(black_box(&encoded)).unwrap()));
    });
    group.finish();
}

fn bench_tilemap(c: &mut Criterion) {
    let map = sample_tilemap();

    for (name, codec) in [("rle", TilemapCodec::rle()), ("lz77", TilemapCodec::lz77())] {
        let encoded = codec.encode(&map).unwrap();
        let mut group = c.benchmark_group(format!("tilemap_{name}"));
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_function("encode", |b| {
            b.iter(|| black_box(codec.encode(black_box(&map)).unwrap()));
        });
        group.bench_function("decode", |b| {
            b.iter(|| black_box(codec.decode(black_box(&encoded)).unwrap()));
        });
        group.finish();
    }
}

fn bench_lz77(c: &mut Criterion) {
    let data: Vec<u8> = (0..16 * 1024).map(|i| ((i / 13) ^ (i % 7)) as u8).collect();
    let encoded = lz77::encode(&data);

    let mut group = c.benchmark_group("lz77");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("encode", |b| {
        b.iter(|| black_box(lz77::encode(black_box(&data))));
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(lz77::decode(black_box(&encoded)).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_blockset, bench_tilemap, bench_lz77);
criterion_main!(benches);
