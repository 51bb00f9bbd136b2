use std::num::NonZeroU32;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use amazing::maze::MazeConfig;
use amazing::{ViewMode, ViewerConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Top-down maze with a hero to steer to the exit
    #[value(name = "2d")]
    Play,
    /// Rotating flat-shaded walls in perspective
    #[value(name = "3d")]
    Showcase,
}

/// Generate a maze and walk it, or watch it spin.
///
/// Keys: arrows move the hero, N makes a new maze, PageUp/PageDown grow or
/// shrink it, Tab switches views, Escape quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Maze width in cells, odd values give the cleanest walls
    #[arg(long, default_value_t = 13, value_parser = clap::value_parser!(i32).range(3..))]
    width: i32,

    /// Maze height in cells, odd values give the cleanest walls
    #[arg(long, default_value_t = 13, value_parser = clap::value_parser!(i32).range(3..))]
    height: i32,

    /// Seed for a reproducible maze
    #[arg(long)]
    seed: Option<u64>,

    /// Admit one revisit into an already-open cell every N attempts
    #[arg(long, default_value = "11", conflicts_with = "strict")]
    loop_modulus: NonZeroU32,

    /// Carve a perfect maze with no loops
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum, default_value_t = Mode::Play)]
    mode: Mode,

    /// Image to use for the hero sprite
    #[arg(long)]
    hero_texture: Option<PathBuf>,

    #[arg(long, default_value_t = 800)]
    window_width: u32,

    #[arg(long, default_value_t = 600)]
    window_height: u32,
}

impl Cli {
    fn into_config(self) -> ViewerConfig {
        let mut maze = MazeConfig::new().size(self.width, self.height);
        if let Some(seed) = self.seed {
            maze = maze.seed(seed);
        }
        maze = if self.strict {
            maze.strict()
        } else {
            maze.braid(self.loop_modulus)
        };

        let mode = match self.mode {
            Mode::Play => ViewMode::Play2d,
            Mode::Showcase => ViewMode::Showcase3d,
        };

        let mut config = ViewerConfig::new()
            .size(self.window_width, self.window_height)
            .maze(maze)
            .mode(mode);
        if let Some(path) = self.hero_texture {
            config = config.hero_texture(path);
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();
    match amazing::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amazing::maze::LoopPolicy;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<ViewerConfig, clap::Error> {
        let argv = std::iter::once("amazing").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(Cli::into_config)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_library() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.maze, MazeConfig::default());
        assert_eq!(config.mode, ViewMode::Play2d);
        assert_eq!((config.width, config.height), (800, 600));
        assert!(config.hero_texture.is_none());
    }

    #[test]
    fn flags_map_onto_the_viewer_config() {
        let config = parse(&[
            "--width", "21", "--height", "9", "--seed", "7", "--loop-modulus", "3", "--mode",
            "3d", "--hero-texture", "face.png",
        ])
        .unwrap();
        assert_eq!((config.maze.width, config.maze.height), (21, 9));
        assert_eq!(config.maze.seed, Some(7));
        assert_eq!(
            config.maze.loops,
            LoopPolicy::braid(NonZeroU32::new(3).unwrap())
        );
        assert_eq!(config.mode, ViewMode::Showcase3d);
        assert_eq!(config.hero_texture, Some(PathBuf::from("face.png")));
    }

    #[test]
    fn strict_disables_loops() {
        let config = parse(&["--strict"]).unwrap();
        assert_eq!(config.maze.loops, LoopPolicy::Strict);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["--width", "2"]).is_err());
        assert!(parse(&["--loop-modulus", "0"]).is_err());
        assert!(parse(&["--mode", "4d"]).is_err());
        assert!(parse(&["--strict", "--loop-modulus", "5"]).is_err());
    }
}
