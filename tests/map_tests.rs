// tests/map_tests.rs

use std::path::Path;
use macroquad_tiled_walker::{
    decode_map_str, AnimationScheduler, LayerKind, MapError, TileResolver, TilesetImages,
};

const BAD_LAYER_SIZE: &str = r#"
{
  "width": 2, "height": 2, "tilewidth": 8, "tileheight": 8,
  "layers": [ { "type": "tilelayer", "name": "oops", "data": [0,0,0] } ]
}
"#;

#[test]
fn error_on_layer_size_mismatch() {
    let err = decode_map_str(BAD_LAYER_SIZE, Path::new(".")).unwrap_err();
    assert!(matches!(err, MapError::InvalidLayerSize { ref layer, .. } if layer == "oops"));
}

const JSON_WITH_EXTRA: &str = r#"
{
  "width":1, "height":1,
  "tilewidth":8, "tileheight":8,
  "dummyField": "ignored",
  "layers": [
    { "name":"L", "data":[0], "opacity": 0.5, "properties": [] }
  ]
}
"#;

#[test]
fn load_ignores_extra_fields() {
    let map = decode_map_str(JSON_WITH_EXTRA, Path::new(".")).expect("Should ignore unknown fields");
    assert_eq!(map.layers[0].name, "L");
    assert_eq!(map.layers[0].opacity, 0.5);
    assert_eq!(map.layers[0].kind, LayerKind::Tiles { data: vec![0] });
}

#[test]
fn load_allows_empty_layer_name() {
    let json = r#"{"width":1,"height":1,"tilewidth":8,"tileheight":8,"layers":[{"name":"","data":[0]}]}"#;
    let map = decode_map_str(json, Path::new(".")).unwrap();
    assert_eq!(map.layers[0].name, "");
    assert!(map.layers[0].visible);
}

#[test]
fn zero_sized_and_infinite_maps_are_invalid() {
    let zero = r#"{"width":0,"height":1,"tilewidth":8,"tileheight":8,"layers":[]}"#;
    assert!(matches!(decode_map_str(zero, Path::new(".")), Err(MapError::InvalidMap(_))));

    let infinite = r#"{"width":1,"height":1,"tilewidth":8,"tileheight":8,"infinite":true,"layers":[]}"#;
    assert!(matches!(decode_map_str(infinite, Path::new(".")), Err(MapError::InvalidMap(_))));
}

#[test]
fn gid_past_tilecount_loads_and_resolves_through_its_tileset() {
    let json = r#"{
      "width":2, "height":1, "tilewidth":16, "tileheight":16,
      "layers":[{"type":"tilelayer","name":"Land","data":[9,1]}],
      "tilesets":[{"firstgid":1,"name":"water-2","tilewidth":16,"tileheight":16,
                   "tilecount":7,"columns":7,"image":"water.png"}]
    }"#;
    let map = decode_map_str(json, Path::new(".")).expect("understated tilecount still loads");

    let scheduler = AnimationScheduler::from_map(&map, &[]);
    let resolver = TileResolver::new(Default::default());
    let images: TilesetImages<()> = [("water-2".to_string(), ())].into_iter().collect();

    let tile = resolver.resolve(9, &map, &scheduler, &images).expect("owned by water-2");
    assert_eq!((tile.source.x, tile.source.y), (16.0, 16.0));
}
