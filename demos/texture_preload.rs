//! Preload image files through the texture cache
//!
//! Run with:
//!   cargo run --example texture_preload -- assets/grass.png assets/stone.png
//!   cargo run --example texture_preload -- --dummy --repeat 3 assets/grass.png
//!
//! Every path is acquired `--repeat` times, the registry is printed, then
//! every acquisition is released and the cache is torn down.

use clap::Parser;
use texture_cache::{
    AddressMode, DummyDevice, FilterMode, ImageFileDecoder, SamplingPolicy, TextureCache,
    TextureCacheConfig, TextureDevice, WgpuTextureDevice,
};

#[derive(Parser, Debug)]
#[command(name = "texture_preload")]
#[command(about = "Upload image files once and share them through the texture cache")]
struct Args {
    /// Image files to load
    #[arg(required = true)]
    paths: Vec<String>,

    /// How many owners acquire each path
    #[arg(short, long, default_value_t = 1)]
    repeat: u32,

    /// Use the dummy device instead of a GPU
    #[arg(long)]
    dummy: bool,

    /// Clamp instead of repeating at texture edges
    #[arg(long)]
    clamp: bool,

    /// Use linear filtering instead of nearest
    #[arg(long)]
    linear: bool,
}

fn run<D: TextureDevice>(device: D, args: &Args) {
    let mut sampling = SamplingPolicy::default();
    if args.clamp {
        sampling = sampling.with_address_mode(AddressMode::ClampToEdge);
    }
    if args.linear {
        sampling = sampling.with_filter(FilterMode::Linear);
    }
    let config = TextureCacheConfig {
        sampling,
        label_prefix: Some("preload:".to_string()),
    };
    let mut cache = TextureCache::with_config(device, ImageFileDecoder::new(), config);

    let mut acquired = Vec::new();
    for path in &args.paths {
        for _ in 0..args.repeat {
            match cache.acquire(path) {
                Ok(_) => acquired.push(path.as_str()),
                Err(e) => {
                    log::error!("Failed to load {}: {}", path, e);
                    break;
                }
            }
        }
    }

    println!("{} textures live:", cache.len());
    for path in cache.paths() {
        if let Some(record) = cache.record(path) {
            println!(
                "  {:<40} handle {:>4}  owners {}",
                path,
                record.handle().id(),
                record.reference_count()
            );
        }
    }

    for path in acquired {
        if let Err(e) = cache.release(path) {
            log::error!("Failed to release {}: {}", path, e);
        }
    }
    cache.teardown();
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.dummy {
        run(DummyDevice::new(), &args);
        return;
    }

    match WgpuTextureDevice::headless() {
        Ok(device) => run(device, &args),
        Err(e) => {
            log::error!("Failed to create GPU device: {}", e);
            std::process::exit(1);
        }
    }
}
