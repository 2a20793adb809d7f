//! Loading from and saving to an assembly project on disk.

use std::{fs, path::Path};

use romkit::{
    assets::{Colour, PaletteKind},
    codec::{Block, BlockCodec, Tile, TileAttributes, Tilemap2D, TilemapCodec},
    manager::{
        AssetSpec, GameCatalog, GraphicsCatalog, PaletteSpec, Placement, RoomCatalog,
        ScriptCatalog, TilemapSpec,
    },
    source::{IncbinIndex, SourceTree},
    Error, Result, Session, SessionState,
};

const MAIN_ASM: &str = "\
; entry point
\t\tinclude \"code/rooms.asm\"
\t\tinclude \"code/graphics.asm\"
Script:\t\tincbin \"script/script.bin\"
";

const ROOMS_ASM: &str = "\
Blockset00:\tincbin \"blocksets/bs00.cbs\"
Blockset01:
\t\tincbin \"blocksets/bs01.cbs\"
RoomPal00:\tincbin \"palettes/room00.pal\" ; 13 colours
";

const GRAPHICS_ASM: &str = "\
Map0:\t\tincbin \"maps/map0.rle\"
Map1:\t\tincbin \"maps/map1.lz77\"
HudPal:\t\tincbin \"palettes/hud.pal\"
";

fn catalog() -> GameCatalog {
    GameCatalog::default()
        .with_rooms(
            RoomCatalog::default()
                .with_blockset(AssetSpec::new(
                    "Blockset00",
                    "bs00.cbs",
                    Placement::in_table("Blocksets", "BlocksetPtrs", 0),
                ))
                .with_blockset(AssetSpec::new(
                    "Blockset01",
                    "bs01.cbs",
                    Placement::in_table("Blocksets", "BlocksetPtrs", 1),
                ))
                .with_palette(PaletteSpec::new(
                    AssetSpec::new("RoomPal00", "room00.pal", Placement::in_section("RoomPal00")),
                    PaletteKind::Room,
                )),
        )
        .with_graphics(
            GraphicsCatalog::default()
                .with_tilemap(TilemapSpec::compressed(
                    AssetSpec::new("Map0", "map0.rle", Placement::by_pointer("Tilemaps", "Map0Ptr")),
                    TilemapCodec::rle().compression(),
                ))
                .with_tilemap(TilemapSpec::compressed(
                    AssetSpec::new("Map1", "map1.lz77", Placement::by_pointer("Tilemaps", "Map1Ptr")),
                    TilemapCodec::lz77().compression(),
                ))
                .with_palette(PaletteSpec::new(
                    AssetSpec::new("HudPal", "hud.pal", Placement::in_section("HudPal")),
                    PaletteKind::Hud,
                )),
        )
        .with_scripts(ScriptCatalog::default().with_bank(AssetSpec::new(
            "Script",
            "script.bin",
            Placement::in_section("Script"),
        )))
}

struct Project {
    blockset: Vec<Block>,
    map0: Tilemap2D,
    map1: Tilemap2D,
    files: Vec<(&'static str, Vec<u8>)>,
}

fn write_project(root: &Path) -> Result<Project> {
    let blockset: Vec<Block> = (0..4)
        .map(|i| {
            Block::new([
                Tile::new(i * 4),
                Tile::new(i * 4 + 1).with_attributes(TileAttributes::HFLIP),
                Tile::new(i * 4 + 2),
                Tile::new(i * 4 + 3),
            ])
        })
        .collect();
    let mut map0 = Tilemap2D::new(10, 6);
    map0.fill_incrementing(Tile::new(0x40));
    let mut map1 = Tilemap2D::new(4, 4);
    map1.fill(Tile::new(0x7FF).with_attributes(TileAttributes::PRIORITY));
    map1.set_origin(1, 0);

    let files = vec![
        ("blocksets/bs00.cbs", BlockCodec::encode(&blockset)?),
        ("blocksets/bs01.cbs", BlockCodec::encode(&[])?),
        ("palettes/room00.pal", (0..26).map(|i| (i & 0x0E) as u8).collect()),
        ("maps/map0.rle", TilemapCodec::rle().encode(&map0)?),
        ("maps/map1.lz77", TilemapCodec::lz77().encode(&map1)?),
        ("palettes/hud.pal", vec![0x02; 10]),
        ("script/script.bin", b"HELLO\0WORLD\0".to_vec()),
    ];

    fs::create_dir_all(root.join("code"))?;
    fs::write(root.join("main.asm"), MAIN_ASM)?;
    fs::write(root.join("code/rooms.asm"), ROOMS_ASM)?;
    fs::write(root.join("code/graphics.asm"), GRAPHICS_ASM)?;
    for (relative, bytes) in &files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(path, bytes)?;
    }

    Ok(Project {
        blockset,
        map0,
        map1,
        files,
    })
}

#[test]
fn index_binds_every_asset() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let project = write_project(dir.path())?;

    let index = IncbinIndex::open(dir.path(), "main.asm")?;
    assert_eq!(index.len(), project.files.len());
    assert_eq!(
        index.resolve("Blockset01")?,
        Path::new("blocksets/bs01.cbs")
    );
    assert!(matches!(index.resolve("Blocksets"), Err(Error::SectionNotFound(_))));
    Ok(())
}

#[test]
fn open_source_loads_every_manager() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let project = write_project(dir.path())?;
    let index = IncbinIndex::open(dir.path(), "main.asm")?;

    let session = Session::new();
    session.open_source(&index, &catalog())?;
    assert_eq!(session.state()?, SessionState::Ready);
    assert!(!session.has_been_modified()?);

    session.with_data(|data| -> Result<()> {
        let rooms = data.rooms()?;
        let blockset = rooms.blockset("Blockset00").unwrap();
        assert_eq!(blockset.current(), &project.blockset);
        assert_eq!(blockset.path(), Path::new("blocksets/bs00.cbs"));
        assert_eq!(blockset.start_address(), None);
        assert!(rooms.blockset("Blockset01").unwrap().current().is_empty());

        let graphics = data.graphics()?;
        assert_eq!(graphics.tilemap("Map0").unwrap().current(), &project.map0);
        assert_eq!(graphics.tilemap("Map1").unwrap().current(), &project.map1);
        assert_eq!(
            graphics.palette("HudPal").unwrap().current().colour(14),
            Some(Colour(0x0202))
        );
        assert_eq!(&data.scripts()?.bank("Script").unwrap().current()[..5], b"HELLO");
        Ok(())
    })??;
    Ok(())
}

#[test]
fn untouched_save_is_byte_identical() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let project = write_project(dir.path())?;
    let index = IncbinIndex::open(dir.path(), "main.asm")?;

    let session = Session::new();
    session.open_source(&index, &catalog())?;

    let out = tempfile::tempdir()?;
    session.save(&index, out.path())?;
    for (relative, bytes) in &project.files {
        assert_eq!(&fs::read(out.path().join(relative))?, bytes, "{relative}");
    }
    Ok(())
}

#[test]
fn edited_assets_are_saved_and_reload() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let project = write_project(dir.path())?;
    let index = IncbinIndex::open(dir.path(), "main.asm")?;

    let session = Session::new();
    session.open_source(&index, &catalog())?;

    let mut map0 = project.map0.clone();
    map0.delete_column(3)?;
    map0.set_tile(0, 0, Tile::new(0x12).with_attributes(TileAttributes::VFLIP))?;
    session.with_data(|data| -> Result<()> {
        data.graphics_mut()?.tilemap_mut("Map0").unwrap().set_current(map0.clone());
        data.rooms_mut()?
            .blockset_mut("Blockset01")
            .unwrap()
            .current_mut()
            .push(Block::new([Tile::new(1); 4]));
        Ok(())
    })??;
    assert!(session.has_unsaved_changes()?);

    // Saving over the project itself updates the files the index points at.
    session.save(&index, index.root())?;
    assert!(!session.has_unsaved_changes()?);
    assert!(session.has_been_modified()?);
    assert_eq!(index.read_label("Map0")?, TilemapCodec::rle().encode(&map0)?);
    assert_eq!(
        fs::read(dir.path().join("maps/map1.lz77"))?,
        TilemapCodec::lz77().encode(&project.map1)?
    );

    let reloaded = Session::new();
    reloaded.open_source(&IncbinIndex::open(dir.path(), "main.asm")?, &catalog())?;
    reloaded.with_data(|data| -> Result<()> {
        assert_eq!(data.graphics()?.tilemap("Map0").unwrap().current(), &map0);
        assert_eq!(
            data.rooms()?.blockset("Blockset01").unwrap().current(),
            &vec![Block::new([Tile::new(1); 4])]
        );
        Ok(())
    })??;
    Ok(())
}

#[test]
fn missing_binary_fails_the_load() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_project(dir.path())?;
    fs::remove_file(dir.path().join("palettes/hud.pal"))?;
    let index = IncbinIndex::open(dir.path(), "main.asm")?;

    let session = Session::new();
    assert!(matches!(
        session.open_source(&index, &catalog()),
        Err(Error::FileError(_))
    ));
    assert_eq!(session.state()?, SessionState::Uninitialised);
    assert!(session.progress().status().starts_with("Error: "));
    Ok(())
}
