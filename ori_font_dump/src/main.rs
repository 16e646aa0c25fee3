//! Rasterize a line of text through `ori_font` and write every mip level of
//! the atlas planes it touched as grayscale PNG.
//!
//! Usage: ori-font-dump [OPTIONS] [TEXT]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use thiserror::Error;

use ori_font::config::config_path;
use ori_font::{
    AtlasKey, Config, FaceId, FontCursor, FontManager, FontRequest, FontStyle, FontWeight, GenericFamily,
    HeadlessBackend, NoMatchFound,
};

const DEFAULT_TEXT: &str = "The quick brown fox jumps over the lazy dog 0123456789";

#[derive(Debug, Error)]
enum DumpError {
    #[error(transparent)]
    NoMatch(#[from] NoMatchFound),
    #[error("no fonts loaded")]
    NoFonts,
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("{}: plane buffer does not match its size", path.display())]
    Buffer { path: PathBuf },
    #[error("{0}")]
    Usage(String),
}

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    request: FontRequest,
    size: u32,
    out: PathBuf,
    text: String,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, DumpError> {
        let mut args = args.into_iter();
        let mut config = None;
        let mut request = FontRequest::new(GenericFamily::SansSerif);
        let mut size = 32;
        let mut out = PathBuf::from("atlas-dump");
        let mut text = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(value(&mut args, &arg)?)),
                "--family" => request = request.family(value(&mut args, &arg)?),
                "--generic" => {
                    let name = value(&mut args, &arg)?;
                    request.generic = GenericFamily::from_css(&name)
                        .ok_or_else(|| DumpError::Usage(format!("unknown generic family {name:?}")))?;
                }
                "--italic" => request = request.style(FontStyle::Italic),
                "--oblique" => request = request.style(FontStyle::Oblique),
                "--weight" => {
                    let weight = number(&mut args, &arg)?;
                    request = request.weight(FontWeight(weight.clamp(1, 1000) as u16));
                }
                "--size" => size = number(&mut args, &arg)?.max(1),
                "--out" => out = PathBuf::from(value(&mut args, &arg)?),
                flag if flag.starts_with("--") => {
                    return Err(DumpError::Usage(format!("unknown option {flag}")));
                }
                _ => text = Some(arg),
            }
        }

        Ok(Self {
            config,
            request,
            size,
            out,
            text: text.unwrap_or_else(|| DEFAULT_TEXT.to_owned()),
        })
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, DumpError> {
    args.next()
        .ok_or_else(|| DumpError::Usage(format!("{flag} needs a value")))
}

fn number(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<u32, DumpError> {
    let v = value(args, flag)?;
    v.parse()
        .map_err(|e| DumpError::Usage(format!("{flag}: {v:?}: {e}")))
}

fn print_help() {
    println!("ori-font-dump {}", env!("CARGO_PKG_VERSION"));
    println!("Rasterize text and dump the glyph atlas planes as PNG\n");
    println!("USAGE:");
    println!("    ori-font-dump [OPTIONS] [TEXT]\n");
    println!("OPTIONS:");
    println!("    --config PATH     Config file (default: {})", config_path().display());
    println!("    --family NAME     Preferred family, repeatable");
    println!("    --generic NAME    serif, sans-serif, monospace, cursive or fantasy");
    println!("    --italic          Request an italic face");
    println!("    --oblique         Request an oblique face");
    println!("    --weight N        Requested weight (100-900)");
    println!("    --size PX         Pixel size (default: 32)");
    println!("    --out DIR         Output directory (default: atlas-dump)");
    println!("    --print-config    Print the default configuration to stdout");
    println!("    --version, -V     Print version information");
    println!("    --help, -h        Print this help message");
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--print-config") {
        match toml::to_string_pretty(&Config::default()) {
            Ok(s) => print!("{s}"),
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("ori-font-dump {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return;
    }

    if let Err(e) = Args::parse(args).and_then(|args| run(&args)) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), DumpError> {
    let config = Config::load(args.config.as_deref().unwrap_or(&config_path()));
    let mut manager = FontManager::new(HeadlessBackend, config);
    if manager.load_system_fonts() == 0 {
        return Err(DumpError::NoFonts);
    }

    let cursor = FontCursor::new(&manager, &args.request, args.size)?;
    if let Some(face) = manager.face(cursor.primary()) {
        info!("primary face: {} ({})", face.family(), face.filename().display());
    }

    let mut used: BTreeSet<(FaceId, AtlasKey)> = BTreeSet::new();
    for ch in args.text.chars() {
        let cp = u32::from(ch);
        let Some(glyph) = cursor.glyph(&mut manager, cp) else {
            continue;
        };
        if !glyph.record.has_bitmap() && !ch.is_whitespace() {
            warn!("U+{cp:04X} {ch:?} has no glyph");
        }
        used.insert((glyph.face, glyph.atlas));
    }

    std::fs::create_dir_all(&args.out).map_err(|source| DumpError::Io {
        path: args.out.clone(),
        source,
    })?;
    let mut written = 0;
    for (face_id, key) in used {
        let Some(face) = manager.face(face_id) else {
            continue;
        };
        let Some(atlas) = face.cached_atlas(key) else {
            continue;
        };
        let stem = format!(
            "{}-{}px{}{}",
            file_stem(face.family()),
            key.pixel_size,
            if key.bold { "-bold" } else { "" },
            if key.oblique { "-oblique" } else { "" },
        );
        for plane in atlas.planes() {
            for level in 0..plane.level_count() {
                let path = args
                    .out
                    .join(format!("{stem}-p{}-l{level}.png", plane.index()));
                let side = plane.level_size(level);
                write_level(&path, side, plane.level(level))?;
                written += 1;
            }
        }
        info!(
            "{stem}: {} of {} glyphs rasterized ({} failed) in {} planes",
            atlas.rasterized_count(),
            atlas.slot_count(),
            atlas.failed_count(),
            atlas.planes().len(),
        );
    }
    info!("wrote {written} images to {}", args.out.display());
    Ok(())
}

fn write_level(path: &Path, side: u32, texels: &[u8]) -> Result<(), DumpError> {
    let image = image::GrayImage::from_raw(side, side, texels.to_vec()).ok_or_else(|| DumpError::Buffer {
        path: path.to_path_buf(),
    })?;
    image.save(path).map_err(|source| DumpError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Family name reduced to characters safe in a file name.
fn file_stem(family: &str) -> String {
    family
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
