use std::path::PathBuf;

use anyhow::{anyhow, Context};
use base_log::log::SystemLog;
use clap::Parser;
use game_interface::types::{game::MAX_CLIENTS, input::CharacterInput};
use math::math::{vector::vec2, Rng};
use shared_base::mapdef_06::{DdraceTileNum, TeleTile, Tile, ROTATION_270, ROTATION_90};
use shared_game::{
    collision::collision::{Collision, CollisionError},
    config::config::PhysicsConfig,
    entities::character::core::character_core::CharacterCore,
    world::world::WorldCore,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// number of simulated characters.
    #[arg(short, long, default_value_t = 8)]
    characters: usize,
    /// number of simulated ticks.
    #[arg(short, long, default_value_t = 500)]
    ticks: u64,
    /// seed for the inputs and the world, overrides the config's seed.
    #[arg(short, long)]
    seed: Option<u64>,
    /// json file with a physics config.
    #[arg(long)]
    config: Option<PathBuf>,
    /// tuning override, e.g. `--tune gravity=0.25`. Can be repeated.
    #[arg(long, value_parser = parse_tune)]
    tune: Vec<(String, f32)>,
}

fn parse_tune(arg: &str) -> anyhow::Result<(String, f32)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got {arg}"))?;
    let value: f32 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid value for tuning {name}"))?;
    Ok((name.trim().to_string(), value))
}

const MAP_WIDTH: u32 = 100;
const MAP_HEIGHT: u32 = 50;

/// A closed room with a floor, a ceiling, some stoppers,
/// an unhookable strip and a hook teleporter.
fn test_map() -> Result<Collision, CollisionError> {
    let index = |x: u32, y: u32| (y * MAP_WIDTH + x) as usize;

    let mut tiles = vec![Tile::default(); (MAP_WIDTH * MAP_HEIGHT) as usize];
    for x in 0..MAP_WIDTH {
        tiles[index(x, 0)] = Tile::new(DdraceTileNum::Solid, 0);
        tiles[index(x, 40)] = Tile::new(DdraceTileNum::Solid, 0);
        tiles[index(x, MAP_HEIGHT - 1)] = Tile::new(DdraceTileNum::Solid, 0);
    }
    for y in 0..MAP_HEIGHT {
        tiles[index(0, y)] = Tile::new(DdraceTileNum::Solid, 0);
        tiles[index(MAP_WIDTH - 1, y)] = Tile::new(DdraceTileNum::Solid, 0);
    }
    for x in 30..40 {
        tiles[index(x, 10)] = Tile::new(DdraceTileNum::NoHook, 0);
    }
    tiles[index(20, 39)] = Tile::new(DdraceTileNum::Stop, ROTATION_270);
    tiles[index(70, 39)] = Tile::new(DdraceTileNum::Stop, ROTATION_90);
    tiles[index(50, 39)] = Tile::new(DdraceTileNum::StopA, 0);

    let mut collision = Collision::new(MAP_WIDTH, MAP_HEIGHT, tiles)?;

    let mut tele = vec![TeleTile::default(); (MAP_WIDTH * MAP_HEIGHT) as usize];
    for x in 60..70 {
        tele[index(x, 12)] = TeleTile::new(DdraceTileNum::TeleInHook, 1);
    }
    tele[index(10, 30)] = TeleTile::new(DdraceTileNum::TeleOut, 1);
    tele[index(90, 30)] = TeleTile::new(DdraceTileNum::TeleOut, 1);
    collision.set_tele_layer(tele)?;

    Ok(collision)
}

fn random_input(rng: &mut Rng) -> CharacterInput {
    CharacterInput {
        direction: rng.random_int_in(0..=2) as i32 - 1,
        target_x: rng.random_int_in(0..=200) as i32 - 100,
        target_y: rng.random_int_in(0..=200) as i32 - 100,
        jump: rng.random_int_in(0..=1) != 0,
        hook: rng.random_int_in(0..=1) != 0,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            PhysicsConfig::from_json(&json)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => PhysicsConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    config.tune.extend(args.tune.iter().cloned());
    let tuning = config.tuning()?;

    if args.characters > MAX_CLIENTS {
        return Err(anyhow!(
            "at most {MAX_CLIENTS} characters are supported, got {}",
            args.characters
        ));
    }

    let collision = test_map().context("failed to build the test map")?;
    let teams = config.teams();
    let sys_log = SystemLog::new();
    let mut world = WorldCore::new(tuning, config.rng_seed, &sys_log);
    world.set_tele_outs(collision.tele_outs());

    for id in 0..args.characters {
        let mut core = CharacterCore::new();
        core.pos = vec2::new(200.0 + id as f32 * 80.0 % 2800.0, 1200.0);
        world
            .insert(id, core)
            .map_err(|_| anyhow!("character slot {id} does not exist"))?;
    }

    let mut rng = Rng::new(config.rng_seed);
    let mut hasher = blake3::Hasher::new();
    for _ in 0..args.ticks {
        for id in 0..args.characters {
            let input = random_input(&mut rng);
            if let Some(core) = world.get_mut(id) {
                core.set_input(input);
            }
        }
        world.tick(&collision, &teams, true);

        for (_, core) in world.characters() {
            hasher.update(&core.net_core().to_bytes()?);
        }
    }

    for (id, core) in world.characters() {
        log::info!(
            "character {id}: pos ({}, {}), hook {:?}",
            core.pos.x,
            core.pos.y,
            core.hook_state
        );
    }
    println!("{}", hex::encode(hasher.finalize().as_bytes()));
    Ok(())
}
