use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use undercroft::pathfinding::smooth_path;
use undercroft::{
    FieldOfView, GenerationConfig, Level, LevelGenerator, LootTable, PathOptions, Pathfinder, Pos,
    starter_loot_table,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a floor and print it as ASCII or JSON
    Generate {
        #[command(flatten)]
        level: LevelArgs,
        /// Emit the full level as JSON instead of a map
        #[arg(long)]
        json: bool,
    },
    /// Show what is visible from a tile (defaults to the start position)
    Fov {
        #[command(flatten)]
        level: LevelArgs,
        #[arg(short, long, default_value_t = 8)]
        radius: i32,
        #[arg(long, requires = "y")]
        x: Option<i32>,
        #[arg(long, requires = "x")]
        y: Option<i32>,
    },
    /// Find a path from the start position to the stairs
    Path {
        #[command(flatten)]
        level: LevelArgs,
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        diagonal: bool,
        #[arg(long, default_value_t = 1.0)]
        weight: f64,
        /// Collapse waypoints that have line of sight to each other
        #[arg(long)]
        smooth: bool,
    },
}

#[derive(Args)]
struct LevelArgs {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1)]
    depth: u32,
    #[arg(long, default_value_t = 0)]
    difficulty: u8,
    /// TOML generation config
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON loot table
    #[arg(long)]
    loot: Option<PathBuf>,
}

impl LevelArgs {
    fn build(&self) -> Result<Level> {
        let config = match &self.config {
            Some(path) => GenerationConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => GenerationConfig::default(),
        };
        let table = match &self.loot {
            Some(path) => LootTable::load(path)
                .with_context(|| format!("Failed to load loot table: {}", path.display()))?,
            None => starter_loot_table(),
        };
        LevelGenerator::new(config, self.seed)
            .generate(self.depth, self.difficulty, &table)
            .with_context(|| {
                format!("Failed to generate depth {} of seed {}", self.depth, self.seed)
            })
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate { level, json } => {
            let level = level.build()?;
            if json {
                let text = serde_json::to_string_pretty(&level)
                    .context("Failed to serialize level")?;
                println!("{text}");
            } else {
                print!("{}", level.render_ascii(None));
                println!(
                    "depth {} | {} rooms | {} doors | {} traps | {} items | fingerprint {:016x}",
                    level.depth,
                    level.rooms.len(),
                    level.doors.len(),
                    level.traps.len(),
                    level.items.len(),
                    level.fingerprint()
                );
            }
        }
        Command::Fov { level, radius, x, y } => {
            let mut level = level.build()?;
            let origin = match (x, y) {
                (Some(x), Some(y)) => Pos::new(x, y),
                _ => level.start,
            };
            let visible = FieldOfView::new()
                .compute_visible(&mut level.grid, origin, radius)
                .context("Viewer position is off the map")?
                .clone();
            print!("{}", render_marked(&level, &visible, origin));
            println!("{} tiles visible from ({}, {})", visible.len(), origin.x, origin.y);
        }
        Command::Path { level, diagonal, weight, smooth } => {
            if weight < 1.0 {
                bail!("heuristic weight must be at least 1.0, got {weight}");
            }
            let level = level.build()?;
            let options = PathOptions {
                allow_diagonal: diagonal,
                heuristic_weight: weight,
                ..PathOptions::default()
            };
            let Some(path) = Pathfinder::new()
                .find_path(&level.grid, level.start, level.stairs, &options)
                .context("Path endpoints are off the map")?
            else {
                println!("No path from start to stairs (locked or secret doors may block it)");
                return Ok(());
            };
            let path = if smooth { smooth_path(&level.grid, &path) } else { path };
            let steps: BTreeSet<Pos> = path.steps.iter().copied().collect();
            print!("{}", render_marked(&level, &steps, level.start));
            println!("{} waypoints, cost {:.2}", path.len(), path.cost);
        }
    }

    Ok(())
}

/// Map with `highlight` tiles drawn normally, every other tile blanked, and `@` on `marker`.
fn render_marked(level: &Level, highlight: &BTreeSet<Pos>, marker: Pos) -> String {
    let map = level.render_ascii(Some(marker));
    let mut text = String::with_capacity(map.len());
    for (y, line) in map.lines().enumerate() {
        for (x, glyph) in line.chars().enumerate() {
            let pos = Pos::new(x as i32, y as i32);
            text.push(if highlight.contains(&pos) || pos == marker { glyph } else { ' ' });
        }
        text.push('\n');
    }
    text
}
