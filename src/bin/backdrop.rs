use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use backdrop::{
    AssetFetcher, BackdropConfig, FsFetcher, MountContent, NormalizeOptions, SceneCache,
    camera_pose_at, normalize, parse_gltf,
};
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    /// Log more (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the camera path sampled over the scroll range, one JSON object per line.
    Camera(CameraArgs),
    /// Run one mount against a directory of models and print the outcome.
    Resolve(ResolveArgs),
    /// Parse a glTF/GLB file and print its bounds and normalization.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct CameraArgs {
    /// Config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of samples (at least 2).
    #[arg(long, default_value_t = 11)]
    steps: u32,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Config JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory locators are resolved against.
    #[arg(long, default_value = "public")]
    root: PathBuf,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// glTF or GLB file.
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Camera(args) => cmd_camera(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BackdropConfig> {
    let cfg = match path {
        Some(p) => BackdropConfig::from_path(p)?,
        None => BackdropConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_camera(args: CameraArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    if args.steps < 2 {
        anyhow::bail!("--steps must be at least 2");
    }
    let last = (args.steps - 1) as f32;
    for i in 0..args.steps {
        let scroll = i as f32 / last;
        let pose = camera_pose_at(scroll, &cfg.camera);
        let line = serde_json::json!({
            "scroll": scroll,
            "position": pose.position,
            "look_at": pose.look_at,
        });
        println!("{line}");
    }
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let candidates = cfg.candidate_list();
    let fetcher: Rc<dyn AssetFetcher> = Rc::new(FsFetcher::new(&args.root));
    let mount = cfg.build_mount(SceneCache::shared(), fetcher);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")?;
    let phase = rt.block_on(mount.run(&candidates));

    let content = mount.content();
    let report = match &*content {
        MountContent::Model(handle) => serde_json::json!({
            "phase": phase,
            "locator": handle.locator(),
            "instance": handle.id().as_u64(),
            "normalization": handle.normalization(),
            "meshes": handle.graph().mesh_count(),
            "spinning_materials": mount.spinning_materials(),
        }),
        MountContent::Fallback(field) => serde_json::json!({
            "phase": phase,
            "tried": candidates.len(),
            "bodies": field.len(),
            "seed": field.seed,
        }),
        MountContent::Nothing => serde_json::json!({ "phase": phase }),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("read '{}'", args.file.display()))?;
    let mut graph = parse_gltf(&bytes)?;
    let raw = graph.world_bounds();
    let meshes = graph.mesh_count();
    let n = normalize(&mut graph, &NormalizeOptions::default());

    let report = serde_json::json!({
        "file": args.file.display().to_string(),
        "meshes": meshes,
        "bounds": raw,
        "longest_dim": raw.longest_dim(),
        "normalization": n,
        "normalized_bounds": graph.world_bounds(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
