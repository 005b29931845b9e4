//! `vfxi` - USD asset authoring from the command line.
//!
//! ```text
//! vfxi pull [root]
//! vfxi asset <out.usda> <name> [material...] [--texture CHANNEL=FILE]... [--settings FILE] [--seed N]
//! vfxi find <file.usda> [--type T] [--kind K] [--default-predicate]
//! vfxi tree <file.usda>
//! ```
//!
//! Set `RUST_LOG=debug` for authoring details.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vfxi_author::{
    build_asset_root, build_material, build_material_scope, build_mtlx_standard_surface,
    build_preview_shader, find_in_stage, make_stage, AssetInfo, StageSettings, TextureAssignments,
};
use vfxi_usd::{Path, Prim, PrimPredicate, Stage, StageError};

const USAGE: &str = "\
Usage:
  vfxi pull [root]
  vfxi asset <out.usda> <name> [material...] [--texture CHANNEL=FILE]... [--settings FILE] [--seed N]
  vfxi find <file.usda> [--type T] [--kind K] [--default-predicate]
  vfxi tree <file.usda>

Examples:
  vfxi pull .
  vfxi asset teapot.usda teapot clay steel --texture diffuseColor=textures/clay.png
  vfxi find teapot.usda --kind component
  vfxi tree teapot.usda";

/// Seed used when `--seed` is not given, so repeated runs author the same
/// preview colors.
const DEFAULT_SEED: u64 = 123;

#[derive(Debug, PartialEq)]
enum Command {
    Pull {
        root: PathBuf,
    },
    Asset {
        output: PathBuf,
        name: String,
        materials: Vec<String>,
        textures: TextureAssignments,
        settings: Option<PathBuf>,
        seed: u64,
    },
    Find {
        file: PathBuf,
        type_name: String,
        kind: String,
        include_abstract: bool,
    },
    Tree {
        file: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {e}\n");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(command) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some((name, rest)) = args.split_first() else {
        bail!("missing command");
    };

    match name.as_str() {
        "pull" => {
            let root = match rest {
                [] => PathBuf::from("."),
                [root] => PathBuf::from(root),
                _ => bail!("pull takes at most one argument"),
            };
            Ok(Command::Pull { root })
        }
        "asset" => parse_asset(rest),
        "find" => parse_find(rest),
        "tree" => match rest {
            [file] => Ok(Command::Tree {
                file: PathBuf::from(file),
            }),
            _ => bail!("tree takes exactly one file"),
        },
        "-h" | "--help" | "help" => bail!("help requested"),
        other => bail!("unknown command {other:?}"),
    }
}

fn parse_asset(args: &[String]) -> Result<Command> {
    let mut positional = Vec::new();
    let mut textures = TextureAssignments::new();
    let mut settings = None;
    let mut seed = DEFAULT_SEED;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--texture" => {
                let value = iter.next().context("--texture needs CHANNEL=FILE")?;
                let (channel, file) = value
                    .split_once('=')
                    .with_context(|| format!("expected CHANNEL=FILE, got {value:?}"))?;
                textures.insert(channel.to_string(), file.to_string());
            }
            "--settings" => {
                settings = Some(PathBuf::from(iter.next().context("--settings needs a file")?));
            }
            "--seed" => {
                let value = iter.next().context("--seed needs a number")?;
                seed = value
                    .parse()
                    .with_context(|| format!("invalid seed {value:?}"))?;
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() < 2 {
        bail!("asset needs <out.usda> <name>");
    }
    let materials = positional.split_off(2);
    let name = positional.pop().unwrap_or_default();
    let output = PathBuf::from(positional.pop().unwrap_or_default());

    Ok(Command::Asset {
        output,
        name,
        materials,
        textures,
        settings,
        seed,
    })
}

fn parse_find(args: &[String]) -> Result<Command> {
    let mut file = None;
    let mut type_name = String::new();
    let mut kind = String::new();
    let mut include_abstract = true;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--type" => type_name = iter.next().context("--type needs a value")?.clone(),
            "--kind" => kind = iter.next().context("--kind needs a value")?.clone(),
            "--default-predicate" => include_abstract = false,
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            _ => bail!("find takes one file"),
        }
    }

    let file = file.context("find needs a file")?;
    if type_name.is_empty() && kind.is_empty() {
        bail!("find needs --type or --kind");
    }
    Ok(Command::Find {
        file,
        type_name,
        kind,
        include_abstract,
    })
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Pull { root } => {
            let saved = vfxi_pull::teapot(&root).context("failed to download teapot")?;
            println!("{}", saved.display());
        }
        Command::Asset {
            output,
            name,
            materials,
            textures,
            settings,
            seed,
        } => {
            let settings = match settings {
                Some(path) => StageSettings::from_json_file(&path)
                    .with_context(|| format!("failed to load settings {}", path.display()))?,
                None => StageSettings::default(),
            };
            author_asset(&output, &name, &materials, &textures, &settings, seed)
                .with_context(|| format!("failed to author {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
        Command::Find {
            file,
            type_name,
            kind,
            include_abstract,
        } => {
            let stage = Stage::open(&file).with_context(|| format!("failed to open {}", file.display()))?;
            for path in find_in_stage(&stage, &type_name, &kind, include_abstract) {
                println!("{path}");
            }
        }
        Command::Tree { file } => {
            let stage = Stage::open(&file).with_context(|| format!("failed to open {}", file.display()))?;
            print!("{}", format_tree(&stage));
        }
    }
    Ok(())
}

/// Asset root at `/<name>`, materials under `/<name>/mtl`, each with a
/// preview and a MaterialX shader.
fn author_asset(
    output: &std::path::Path,
    name: &str,
    materials: &[String],
    textures: &TextureAssignments,
    settings: &StageSettings,
    seed: u64,
) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);

    make_stage(output, settings, |stage| {
        let root_path = Path::abs_root().append_child(name)?;
        let info = AssetInfo {
            name: name.to_string(),
            identifier: format!("./{}", output.file_name().map(|f| f.to_string_lossy()).unwrap_or_default()),
            version: String::new(),
        };
        build_asset_root(stage, &root_path, &info)?;
        stage.set_default_prim(name);

        if !materials.is_empty() {
            let scope = build_material_scope(stage, &root_path.append_child("mtl")?)?;
            for material_name in materials {
                let material = build_material(stage, scope.path(), material_name)?;
                build_preview_shader(stage, &material, "preview", textures, &mut rng)?;
                build_mtlx_standard_surface(stage, &material, "mtlx", textures)?;
                log::info!("Authored material {}", material.path());
            }
        }
        Ok::<_, StageError>(())
    })?;
    Ok(())
}

/// Indented listing of every prim, instance proxies included.
fn format_tree(stage: &Stage) -> String {
    let mut out = String::new();
    let predicate = PrimPredicate::all_prims().traverse_instance_proxies();
    for child in stage.pseudo_root().filtered_children(predicate) {
        write_tree(&mut out, &child, predicate, 0);
    }
    out
}

fn write_tree(out: &mut String, prim: &Prim<'_>, predicate: PrimPredicate, depth: usize) {
    let mut line = format!("{}{}", "  ".repeat(depth), prim.name());
    let type_name = prim.type_name();
    if !type_name.is_empty() {
        line.push_str(&format!(" [{type_name}]"));
    }
    if let Some(kind) = prim.kind() {
        line.push_str(&format!(" kind={kind}"));
    }

    let mut tags = Vec::new();
    if prim.is_abstract() {
        tags.push("abstract");
    }
    if !prim.is_active() {
        tags.push("inactive");
    }
    if !prim.is_defined() {
        tags.push("over");
    }
    if prim.is_instance() {
        tags.push("instance");
    }
    if prim.is_instance_proxy() {
        tags.push("proxy");
    }
    if !tags.is_empty() {
        line.push_str(&format!(" ({})", tags.join(", ")));
    }

    out.push_str(&line);
    out.push('\n');
    for child in prim.filtered_children(predicate) {
        write_tree(out, &child, predicate, depth + 1);
    }
}
