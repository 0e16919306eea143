// tests/load_tests.rs

use std::fs;
use std::path::PathBuf;
use macroquad_tiled_walker::{
    decode_map_file, AnimationRule, AnimationScheduler, MapError, TileResolver, TilesetImages,
};

fn fixture_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("mq_walker_{name}_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const FARM_MAP: &str = r#"{
  "width": 3, "height": 1, "tilewidth": 16, "tileheight": 16,
  "layers": [
    {"type":"tilelayer","name":"water","width":3,"height":1,"data":[7,1,0]},
    {"type":"tilelayer","name":"Land","width":3,"height":1,"data":[0,0,70]}
  ],
  "tilesets": [
    {"firstgid": 1, "source": "water-2.json"},
    {"firstgid": 8, "source": "tilesets/grass.json"}
  ]
}"#;

const WATER: &str = r#"{
  "name":"water-2", "tilewidth":16, "tileheight":16, "tilecount":7, "columns":1,
  "image":"water.png"
}"#;

const GRASS: &str = r#"{
  "name":"Tileset Grass Spring", "tilewidth":16, "tileheight":16, "tilecount":400, "columns":20,
  "image":"Tileset Grass Spring.png",
  "tiles":[{"id":62,"animation":[{"tileid":62,"duration":100},{"tileid":63,"duration":100}]}]
}"#;

#[test]
fn loads_map_with_external_tilesets_and_animates_it() {
    let dir = fixture_dir("farm");
    fs::create_dir_all(dir.join("tilesets")).unwrap();
    fs::write(dir.join("farm.json"), FARM_MAP).unwrap();
    fs::write(dir.join("water-2.json"), WATER).unwrap();
    fs::write(dir.join("tilesets/grass.json"), GRASS).unwrap();

    let map = decode_map_file(dir.join("farm.json")).expect("farm map should load");
    assert_eq!((map.width, map.height), (3, 1));
    // Images are relative to the tileset file that names them.
    assert_eq!(map.tilesets[1].image, dir.join("tilesets/Tileset Grass Spring.png"));

    // water.png is a 7-frame strip although the tileset claims one column.
    let rules = vec![AnimationRule::Strip {
        tileset: "water-2".into(),
        frames: 7,
        duration_ms: 150,
    }];
    let mut scheduler = AnimationScheduler::from_map(&map, &rules);
    let resolver = TileResolver::new([("water-2".to_string(), 7)].into_iter().collect());
    let images: TilesetImages<u8> = [("water-2".to_string(), 1), ("Tileset Grass Spring".to_string(), 2)]
        .into_iter()
        .collect();

    assert!(resolver.resolve(0, &map, &scheduler, &images).is_none());

    // gid 70 is grass local 62, animated by the tileset itself.
    let grass = resolver.resolve(70, &map, &scheduler, &images).unwrap();
    assert_eq!(*grass.image, 2);
    assert_eq!((grass.source.x, grass.source.y), (2.0 * 16.0, 3.0 * 16.0));

    scheduler.advance(300.0);
    let water = resolver.resolve(7, &map, &scheduler, &images).unwrap();
    assert_eq!(*water.image, 1);
    assert_eq!((water.source.x, water.source.y), (32.0, 0.0));
    let grass = resolver.resolve(70, &map, &scheduler, &images).unwrap();
    assert_eq!(grass.source.x, 3.0 * 16.0);

    scheduler.advance(100.0);
    let grass = resolver.resolve(70, &map, &scheduler, &images).unwrap();
    assert_eq!(grass.source.x, 2.0 * 16.0);
}

#[test]
fn missing_tileset_file_reports_its_path() {
    let dir = fixture_dir("missing");
    let map_path = dir.join("map.json");
    fs::write(&map_path, FARM_MAP).unwrap();

    match decode_map_file(&map_path) {
        Err(MapError::Io { path, .. }) => assert_eq!(path, dir.join("water-2.json")),
        other => panic!("expected Io error, got {:?}", other.map(|m| m.width)),
    }
}

#[test]
fn unsupported_formats_are_rejected() {
    let err = decode_map_file("foo.tmx").unwrap_err();
    assert!(matches!(err, MapError::InvalidMap(_)));

    let dir = fixture_dir("xml_tileset");
    let map_path = dir.join("map.json");
    fs::write(
        &map_path,
        r#"{"width":1,"height":1,"tilewidth":8,"tileheight":8,"layers":[],
            "tilesets":[{"firstgid":1,"source":"tiles.xml"}]}"#,
    )
    .unwrap();
    assert!(matches!(decode_map_file(&map_path), Err(MapError::InvalidMap(_))));
}
