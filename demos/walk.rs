use anyhow::{bail, Context};
use macroquad::prelude::*;
use macroquad_tiled_walker::{WalkerConfig, WalkerSession};

fn window_conf() -> Conf {
    Conf {
        window_title: "Tiled Walker".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

async fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let map_path = args.next().unwrap_or_else(|| "assets/map.json".into());
    let config = match args.next() {
        Some(path) => WalkerConfig::from_file(&path)
            .with_context(|| format!("reading walker config {path}"))?,
        None => WalkerConfig::default(),
    };

    let mut session = WalkerSession::new(config);
    if !session.load_map(&map_path).await {
        bail!("could not load {map_path}");
    }
    session.start_loop();
    session.run().await;
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("{err:#}");
    }
}
