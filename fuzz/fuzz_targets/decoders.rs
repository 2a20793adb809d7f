#![no_main]

use libfuzzer_sys::fuzz_target;
use romkit::{
    assets::{Palette, PaletteKind},
    codec::{lz77, BlockCodec, TilemapCodec},
};

fuzz_target!(|data: &[u8]| {
    let _ = BlockCodec::decode(data);
    let _ = TilemapCodec::rle().decode(data);
    let _ = TilemapCodec::lz77().decode(data);
    let _ = TilemapCodec::raw(8, 8).decode(data);
    let _ = lz77::decode(data);
    let _ = Palette::from_bytes(PaletteKind::TitleBlueFade, data);

    // Whatever decodes must re-encode to a stream that decodes to the same value.
    if let Ok((blocks, _)) = BlockCodec::decode(data) {
        if let Ok(encoded) = BlockCodec::encode(&blocks) {
            assert_eq!(BlockCodec::decode(&encoded).unwrap().0, blocks);
        }
    }
    if let Ok((map, _)) = TilemapCodec::rle().decode(data) {
        if let Ok(encoded) = TilemapCodec::rle().encode(&map) {
            assert_eq!(TilemapCodec::rle().decode(&encoded).unwrap().0, map);
        }
    }
});
