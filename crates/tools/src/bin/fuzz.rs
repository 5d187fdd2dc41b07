use std::collections::{BTreeSet, VecDeque};

use anyhow::{Result, ensure};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use undercroft::mapgen::MAX_DIFFICULTY;
use undercroft::{
    FieldOfView, GenerationConfig, Level, LevelGenerator, PathOptions, Pathfinder, Pos, TileKind,
    starter_loot_table,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    levels: u32,
    #[arg(long, default_value_t = 20)]
    max_depth: u32,
}

fn reachable_from(level: &Level, start: Pos) -> BTreeSet<Pos> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        for next in pos.orthogonal_neighbors() {
            if level.grid.in_bounds(next)
                && level.grid.kind_at(next) != TileKind::Wall
                && seen.insert(next)
            {
                queue.push_back(next);
            }
        }
    }
    seen
}

fn check_level(level: &mut Level) -> Result<()> {
    for (index, room) in level.rooms.iter().enumerate() {
        for other in &level.rooms[index + 1..] {
            ensure!(
                !room.rect.expanded(1).intersects(&other.rect),
                "rooms {:?} and {:?} overlap or touch",
                room.id,
                other.id
            );
        }
    }

    let open =
        level.grid.positions().filter(|&pos| level.grid.kind_at(pos) != TileKind::Wall).count();
    let reached = reachable_from(level, level.start);
    ensure!(reached.len() == open, "{} of {open} open tiles reachable from start", reached.len());
    ensure!(level.grid.kind_at(level.stairs) == TileKind::Stairs, "stairs tile was overwritten");

    for (_, item) in &level.items {
        ensure!(
            level.grid.kind_at(item.pos) == TileKind::Floor,
            "item {} off the floor",
            item.name
        );
    }

    let visible = FieldOfView::new().compute_visible(&mut level.grid, level.start, 10)?.clone();
    ensure!(visible.contains(&level.start), "viewer cannot see its own tile");
    for tile in level.grid.tiles() {
        ensure!(!tile.visible || tile.discovered, "visible tile left undiscovered");
    }

    for door in level.doors.clone() {
        level.unlock_door(door.pos)?;
    }
    let radius = level.width().max(level.height()) as i32;
    level.reveal_secrets(level.start, radius)?;
    let options = PathOptions { max_iterations: 100_000, ..PathOptions::default() };
    let path = Pathfinder::new().find_path(&level.grid, level.start, level.stairs, &options)?;
    ensure!(path.is_some(), "stairs unreachable with every door open");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Starting generation fuzz on seed {} for {} levels...", args.seed, args.levels);
    let table = starter_loot_table();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for round in 0..args.levels {
        let run_seed = rng.next_u64();
        let depth = 1 + (rng.next_u64() % u64::from(args.max_depth.max(1))) as u32;
        let difficulty = (rng.next_u64() % (u64::from(MAX_DIFFICULTY) + 1)) as u8;

        let mut level = LevelGenerator::new(GenerationConfig::default(), run_seed)
            .generate(depth, difficulty, &table)?;
        log::debug!(
            "round {round}: seed {run_seed} depth {depth} fingerprint {:016x}",
            level.fingerprint()
        );
        if let Err(failure) = check_level(&mut level) {
            println!("{}", level.render_ascii(None));
            return Err(failure.context(format!(
                "round {round}: seed {run_seed} depth {depth} difficulty {difficulty}"
            )));
        }
    }

    println!("Fuzzing completed successfully.");
    Ok(())
}
