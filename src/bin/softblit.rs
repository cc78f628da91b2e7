use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use softblit::{Engine, EngineConfig, FormatId, Surface};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "softblit", version)]
struct Cli {
    /// Capability override, e.g. `none` or `simd128,simd256` (defaults to host detection).
    #[arg(long, global = true)]
    caps: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a BMP's geometry and pixel format.
    Info(InfoArgs),
    /// Re-encode a BMP through another pixel format.
    Convert(ConvertArgs),
    /// Nearest-neighbor scale a BMP.
    Scale(ScaleArgs),
    /// Export a BMP as PNG.
    Png(PngArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input BMP.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input BMP.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output BMP path.
    #[arg(long)]
    out: PathBuf,

    /// Intermediate pixel format.
    #[arg(long, value_enum)]
    format: FormatChoice,
}

#[derive(Parser, Debug)]
struct ScaleArgs {
    /// Input BMP.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output BMP path.
    #[arg(long)]
    out: PathBuf,

    /// Output width in pixels.
    #[arg(long)]
    width: u32,

    /// Output height in pixels.
    #[arg(long)]
    height: u32,
}

#[derive(Parser, Debug)]
struct PngArgs {
    /// Input BMP.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Rgb332,
    Rgb444,
    Rgb555,
    Rgb565,
    Bgr24,
    Rgb888,
    Argb8888,
    Abgr8888,
    Rgba8888,
    Bgra8888,
}

impl FormatChoice {
    fn id(self) -> FormatId {
        match self {
            FormatChoice::Rgb332 => FormatId::Rgb332,
            FormatChoice::Rgb444 => FormatId::Rgb444,
            FormatChoice::Rgb555 => FormatId::Rgb555,
            FormatChoice::Rgb565 => FormatId::Rgb565,
            FormatChoice::Bgr24 => FormatId::Bgr24,
            FormatChoice::Rgb888 => FormatId::Rgb888,
            FormatChoice::Argb8888 => FormatId::Argb8888,
            FormatChoice::Abgr8888 => FormatId::Abgr8888,
            FormatChoice::Rgba8888 => FormatId::Rgba8888,
            FormatChoice::Bgra8888 => FormatId::Bgra8888,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = EngineConfig::from_env();
    if cli.caps.is_some() {
        cfg.cpu_caps = cli.caps.clone();
    }
    let engine = Engine::from_config(&cfg).context("configure engine")?;

    match cli.cmd {
        Command::Info(args) => cmd_info(&engine, args),
        Command::Convert(args) => cmd_convert(&engine, args),
        Command::Scale(args) => cmd_scale(&engine, args),
        Command::Png(args) => cmd_png(&engine, args),
    }
}

fn load(engine: &Engine, path: &Path) -> anyhow::Result<Surface<'static>> {
    engine
        .load_bmp_file(path)
        .with_context(|| format!("load bmp '{}'", path.display()))
}

fn save(surface: &mut Surface<'_>, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    softblit::save_bmp_file(surface, path)
        .with_context(|| format!("write bmp '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_info(engine: &Engine, args: InfoArgs) -> anyhow::Result<()> {
    let s = load(engine, &args.in_path)?;
    let fmt = s.format();
    println!("size:    {}x{}", s.width(), s.height());
    println!("pitch:   {}", s.pitch());
    println!(
        "format:  {:?} ({} bpp, {} bytes per pixel)",
        fmt.id(),
        fmt.bits_per_pixel(),
        fmt.bytes_per_pixel()
    );
    let m = fmt.masks();
    println!(
        "masks:   r={:#010x} g={:#010x} b={:#010x} a={:#010x}",
        m.r, m.g, m.b, m.a
    );
    if let Some(pal) = s.palette() {
        println!("palette: {} colors", pal.borrow().len());
    }
    println!("blend:   {:?}", s.blend_mode());
    Ok(())
}

fn cmd_convert(engine: &Engine, args: ConvertArgs) -> anyhow::Result<()> {
    let mut src = load(engine, &args.in_path)?;
    let mut out = src
        .convert_to(args.format.id())
        .with_context(|| format!("convert to {:?}", args.format.id()))?;
    save(&mut out, &args.out)
}

fn cmd_scale(engine: &Engine, args: ScaleArgs) -> anyhow::Result<()> {
    let src = load(engine, &args.in_path)?;
    let mut out = engine
        .create_with(args.width, args.height, src.format_ref())
        .context("create output surface")?;
    softblit::soft_stretch(&src, None, &mut out, None).context("stretch")?;
    save(&mut out, &args.out)
}

fn cmd_png(engine: &Engine, args: PngArgs) -> anyhow::Result<()> {
    let mut src = load(engine, &args.in_path)?;
    // Abgr8888 is stored as R, G, B, A bytes.
    let rgba = src
        .convert_to(FormatId::Abgr8888)
        .context("convert to RGBA")?;
    let (w, h) = (rgba.width(), rgba.height());
    let len = w as usize * h as usize * 4;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &rgba.pixels()[..len],
        w,
        h,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
