//! Generates a PBR texture set with the live prediction API.
//!
//! Usage: `texture-generate [--base-only] [--material wood|metal|...] <prompt...>`
//! Needs `REPLICATE_API_TOKEN`; the PBR model version is read from `SCATTER_LAB_PBR_MODEL`.
use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Context};
use scatter_lab::prelude::*;
use scatter_lab_examples::init_tracing;

fn parse_material(name: &str) -> anyhow::Result<MaterialType> {
    MaterialType::ALL
        .into_iter()
        .find(|m| m.keyword() == name.to_ascii_lowercase() || m.label() == name)
        .with_context(|| format!("unknown material type '{name}'"))
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut mode = GenerationMode::FullPbr;
    let mut material = MaterialType::default();
    let mut prompt = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--base-only" => mode = GenerationMode::BaseOnly,
            "--material" => {
                let value = args.next().context("--material needs a value")?;
                material = parse_material(&value)?;
            }
            _ => prompt.push(arg),
        }
    }
    if prompt.is_empty() {
        bail!("usage: texture-generate [--base-only] [--material <type>] <prompt...>");
    }

    let mut api = ApiConfig::from_env();
    if let Ok(version) = std::env::var("SCATTER_LAB_PBR_MODEL") {
        api = api.with_pbr_model(version);
    }
    if !api.has_token() {
        tracing::warn!("REPLICATE_API_TOKEN is not set; nothing to do.");
        return Ok(());
    }

    let params = GenerationParams::new(prompt.join(" "))
        .with_material_type(material)
        .with_mode(mode);
    let interval = api.poll_interval;
    let mut poller = TexturePoller::new(ReplicateClient::new(api.clone())?, api.models.clone());

    let mut progress = |event: GenerationEvent| tracing::info!("{event:?}");
    let job = poller.start(&params, &mut progress)?;
    tracing::info!("Started job {job}; polling every {:?}.", interval);

    let maps = loop {
        thread::sleep(interval);
        match poller.tick(&mut progress) {
            Tick::Waiting => continue,
            Tick::Finished(maps) => break maps,
            Tick::Failed(err) => return Err(err.into()),
            Tick::Inactive => bail!("poller stopped unexpectedly"),
        }
    };

    let dir = PathBuf::from("textures");
    let written = download_maps(poller.client_mut(), &maps, &dir, material.keyword())?;
    for (name, path) in written {
        println!("{name}: {}", path.display());
    }
    Ok(())
}
