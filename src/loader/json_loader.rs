// src/loader/json_loader.rs
use crate::error::MapError;
use crate::map::{FrameDef, LayerKind, TileLayer, TileMap, Tileset, GID_MASK};
use crate::properties::{Properties, PropertyValue};
use log::{debug, warn};
use macroquad::prelude::*;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Vec<u32>,
    #[serde(default)]
    width: usize,
    #[serde(default)]
    height: usize,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

/// A tileset entry in the map: either a reference to an external file or the
/// tileset itself, embedded.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTilesetRef {
    External { firstgid: u32, source: String },
    Inline(JsonTileset),
}

#[derive(Deserialize)]
struct JsonMap {
    width: usize,
    height: usize,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    infinite: bool,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
    #[serde(default)]
    properties: Vec<JsonProperty>,
}

#[derive(Deserialize)]
struct JsonTileset {
    #[serde(default)]
    firstgid: u32,
    #[serde(default)]
    name: String,
    tilewidth: u32,
    tileheight: u32,
    tilecount: u32,
    columns: u32,
    image: String,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    properties: Vec<JsonProperty>,
    #[serde(default)]
    tiles: Vec<JsonTile>,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonTile {
    id: u32,
    #[serde(default)]
    animation: Vec<JsonFrame>,
}

#[derive(Deserialize)]
struct JsonFrame {
    tileid: u32,
    duration: u32,
}

fn json_property(prop: JsonProperty) -> Result<Option<(String, PropertyValue)>, MapError> {
    let JsonProperty { name, kind, value } = prop;

    let parsed = match kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool),
        Some("int") | Some("object") => value.as_i64().map(PropertyValue::I64),
        Some("float") => value.as_f64().map(|n| PropertyValue::F32(n as f32)),
        Some("string") | Some("file") | Some("color") | Some("class") => {
            value.as_str().map(|s| PropertyValue::String(s.to_owned()))
        }
        Some(other) => {
            return Err(MapError::UnsupportedPropertyType {
                name,
                kind: other.to_owned(),
            });
        }
        None => {
            if let Some(v) = value.as_bool() {
                Some(PropertyValue::Bool(v))
            } else if let Some(v) = value.as_i64() {
                Some(PropertyValue::I64(v))
            } else if let Some(v) = value.as_f64() {
                Some(PropertyValue::F32(v as f32))
            } else {
                value.as_str().map(|s| PropertyValue::String(s.to_owned()))
            }
        }
    };

    Ok(parsed.map(|value| (name, value)))
}

fn properties_from_json(props: Vec<JsonProperty>) -> Result<Properties, MapError> {
    let mut out = Properties::new();
    for p in props {
        if let Some((name, value)) = json_property(p)? {
            out.insert(name, value);
        }
    }
    Ok(out)
}

fn tileset_from_json(ts: JsonTileset, first_gid: u32, image_dir: &Path) -> Result<Tileset, MapError> {
    let animations = ts
        .tiles
        .into_iter()
        .filter(|tile| !tile.animation.is_empty())
        .map(|tile| {
            let frames = tile
                .animation
                .into_iter()
                .map(|f| FrameDef {
                    local_id: f.tileid,
                    duration_ms: f.duration,
                })
                .collect();
            (tile.id, frames)
        })
        .collect();

    Ok(Tileset {
        name: ts.name,
        first_gid,
        columns: ts.columns,
        tile_w: ts.tilewidth,
        tile_h: ts.tileheight,
        tilecount: ts.tilecount,
        spacing: ts.spacing,
        margin: ts.margin,
        image: image_dir.join(ts.image),
        animations,
        properties: properties_from_json(ts.properties)?,
    })
}

/// Path of the JSON export for an external tileset reference. Tiled's `.tsx`
/// references are looked up as the `.json` file next to them.
fn external_tileset_path(map_dir: &Path, source: &str) -> Result<PathBuf, MapError> {
    let path = map_dir.join(source);
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(path),
        Some("tsx") => Ok(path.with_extension("json")),
        _ => Err(MapError::InvalidMap(format!(
            "External tileset must be JSON: {source}"
        ))),
    }
}

fn load_external_tileset(map_dir: &Path, firstgid: u32, source: &str) -> Result<Tileset, MapError> {
    let ts_path = external_tileset_path(map_dir, source)?;
    let txt = std::fs::read_to_string(&ts_path).map_err(|e| MapError::io(&ts_path, e))?;
    let ext: JsonTileset = serde_json::from_str(&txt).map_err(|e| MapError::json(&ts_path, e))?;

    let image_dir = ts_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| map_dir.to_path_buf());
    tileset_from_json(ext, firstgid, &image_dir)
}

fn layer_from_json(l: JsonLayer, map: &JsonMap, tilesets: &[Tileset]) -> Result<TileLayer, MapError> {
    let width = if l.width == 0 { map.width } else { l.width };
    let height = if l.height == 0 { map.height } else { l.height };
    let properties = properties_from_json(l.properties)?;

    let kind = match l.kind.as_deref().unwrap_or("tilelayer") {
        "tilelayer" => {
            let expected = width.checked_mul(height).ok_or_else(|| {
                MapError::InvalidMap(format!("layer '{}' is too large: {width}x{height}", l.name))
            })?;
            if l.data.len() != expected {
                return Err(MapError::InvalidLayerSize {
                    layer: l.name,
                    expected,
                    actual: l.data.len(),
                });
            }

            // Tilesets sometimes understate `tilecount`; gids past the last
            // declared tile still belong to the tileset before them.
            let first_gid = tilesets.first().map(|ts| ts.first_gid);
            let max_gid = tilesets.iter().map(Tileset::last_gid).max().unwrap_or(0);
            let mut past_end = 0usize;
            for &raw_gid in &l.data {
                let gid = raw_gid & GID_MASK;
                if gid == 0 {
                    continue;
                }
                if first_gid.map_or(true, |first| gid < first) {
                    return Err(MapError::InvalidTileGid { layer: l.name, gid });
                }
                if gid > max_gid {
                    past_end += 1;
                }
            }
            if past_end > 0 {
                warn!(
                    "layer '{}' has {past_end} tiles past the last declared gid {max_gid}",
                    l.name
                );
            }
            LayerKind::Tiles { data: l.data }
        }
        other => LayerKind::Other(other.to_owned()),
    };

    Ok(TileLayer {
        name: l.name,
        visible: l.visible,
        opacity: l.opacity,
        offset: vec2(l.offsetx, l.offsety),
        width,
        height,
        properties,
        kind,
    })
}

/// Decodes map JSON whose relative paths (external tilesets, inline tileset
/// images) are resolved against `map_dir`.
pub fn decode_map_str(json: &str, map_dir: &Path) -> Result<TileMap, MapError> {
    let mut j: JsonMap = serde_json::from_str(json).map_err(|e| MapError::json(map_dir, e))?;

    if j.infinite {
        return Err(MapError::InvalidMap(
            "infinite (chunked) maps are not supported".into(),
        ));
    }
    if j.width == 0 || j.height == 0 || j.tilewidth == 0 || j.tileheight == 0 {
        return Err(MapError::InvalidMap(format!(
            "map dimensions must be non-zero: {}x{} tiles of {}x{} px",
            j.width, j.height, j.tilewidth, j.tileheight
        )));
    }
    if j.width.checked_mul(j.height).is_none() {
        return Err(MapError::InvalidMap(format!(
            "map is too large: {}x{} tiles",
            j.width, j.height
        )));
    }

    let mut tilesets = Vec::with_capacity(j.tilesets.len());
    for ts in std::mem::take(&mut j.tilesets) {
        let tileset = match ts {
            JsonTilesetRef::External { firstgid, source } => {
                load_external_tileset(map_dir, firstgid, &source)?
            }
            JsonTilesetRef::Inline(inline) => {
                let firstgid = inline.firstgid;
                tileset_from_json(inline, firstgid, map_dir)?
            }
        };
        if tileset.first_gid == 0 {
            return Err(MapError::InvalidMap(format!(
                "tileset '{}' has firstgid 0",
                tileset.name
            )));
        }
        if tileset.first_gid.checked_add(tileset.tilecount).is_none() {
            return Err(MapError::InvalidMap(format!(
                "tileset '{}' gids overflow: firstgid {} + {} tiles",
                tileset.name, tileset.first_gid, tileset.tilecount
            )));
        }
        tilesets.push(tileset);
    }

    // Membership lookups scan from the end, so order by first_gid.
    tilesets.sort_by_key(|t| t.first_gid);

    let json_layers = std::mem::take(&mut j.layers);
    let mut layers = Vec::with_capacity(json_layers.len());
    for l in json_layers {
        layers.push(layer_from_json(l, &j, &tilesets)?);
    }

    debug!(
        "decoded map {}x{} ({} layers, {} tilesets)",
        j.width,
        j.height,
        layers.len(),
        tilesets.len()
    );

    Ok(TileMap {
        width: j.width,
        height: j.height,
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        layers,
        tilesets,
        properties: properties_from_json(j.properties)?,
    })
}

/// Reads and decodes a `.json` map file; tilesets are resolved relative to it.
pub fn decode_map_file(path: impl AsRef<Path>) -> Result<TileMap, MapError> {
    let p = path.as_ref();
    if p.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(MapError::InvalidMap(format!(
            "Map file must be a JSON file: {}",
            p.display()
        )));
    }

    let txt = std::fs::read_to_string(p).map_err(|e| MapError::io(p, e))?;

    let map_dir = p
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    decode_map_str(&txt, &map_dir).map_err(|err| match err {
        // Point parse errors at the map file rather than its directory.
        MapError::Json { path, source } if path == map_dir => MapError::json(p, source),
        other => other,
    })
}
