//! Headless overlay-batching driver: builds buckets on worker threads, then
//! runs the per-frame update → collect → resolve → render pipeline over a
//! CPU staging buffer.

mod producer;
mod resolver;
mod scene;
mod staging;

use std::path::PathBuf;

use clap::Parser;
use hashbrown::HashMap;

use crate::producer::build_buckets;
use crate::resolver::FirstFitResolver;
use crate::scene::Scene;

#[derive(Parser, Debug)]
#[command(name = "sigil", about = "Screen-space overlay batching demo")]
struct Args {
    /// Scene TOML path; the built-in default scene is used when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Worker threads for bucket production (0 = one per core).
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let scene = match &args.scene {
        Some(path) => match Scene::load_from_path(path) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("failed to load scene {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Scene::default(),
    };

    let viewport = scene.viewport_rect();
    let mut buckets = build_buckets(&scene, args.threads);
    let total_overlays: usize = buckets.iter().map(|b| b.bucket.overlay_count()).sum();
    log::info!(
        "{} buckets, {} overlays, viewport {}x{}",
        buckets.len(),
        total_overlays,
        scene.viewport.width,
        scene.viewport.height
    );

    for frame in 0..args.frames {
        let screen = scene.camera.transform_at(frame);
        for demo in &mut buckets {
            demo.bucket.update(screen);
        }
        let resolved = {
            let mut resolver = FirstFitResolver::new(viewport);
            for demo in &buckets {
                demo.bucket.collect_overlay_handles(&mut resolver);
            }
            resolver.finalize()
        };
        for demo in &mut buckets {
            demo.bucket.render(screen);
        }
        log::debug!(
            target: "frame",
            "[frame {}] visible={} culled={}",
            frame,
            resolved.accepted,
            resolved.rejected
        );
    }

    let mut totals: HashMap<&str, (u64, u64, u64)> = HashMap::new();
    for demo in &buckets {
        let buf = demo.bucket.buffer();
        totals.insert(
            demo.name.as_str(),
            (buf.draw_calls(), buf.indexes_drawn(), buf.spans_applied()),
        );
    }
    let mut names: Vec<&str> = totals.keys().copied().collect();
    names.sort_unstable();
    for name in names {
        let (draws, indexes, spans) = totals[name];
        log::info!(
            target: "stats",
            "bucket '{}': {} draw calls, {} indexes drawn, {} attribute spans",
            name,
            draws,
            indexes,
            spans
        );
    }
}
