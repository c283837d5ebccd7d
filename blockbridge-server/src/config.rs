use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;

use crate::game::GameConfig;

pub const DEFAULT_JAVA_PORT: u16 = 25565;

/// Everything the listeners and sessions need.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub motd: String,
    pub max_players: usize,
    pub view_distance: i32,
    /// `None` leaves 1.8 sessions uncompressed.
    pub compression_threshold: Option<usize>,
    /// Whether modern sessions go through the key exchange. Release 1.3 to
    /// 1.6 clients cannot skip it.
    pub modern_encryption: bool,
    pub log_level: LevelFilter,
    pub data_dir: PathBuf,
    pub ops: Vec<String>,
    pub login_timeout: Duration,
    pub idle_timeout: Duration,
    pub keep_alive_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], DEFAULT_JAVA_PORT)),
            motd: "A Blockbridge Server".to_string(),
            max_players: 20,
            view_distance: 2,
            compression_threshold: Some(256),
            modern_encryption: true,
            log_level: LevelFilter::Info,
            data_dir: PathBuf::from("."),
            ops: Vec::new(),
            login_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(30),
            keep_alive_interval: Duration::from_secs(10),
        }
    }
}

impl ServerConfig {
    pub fn player_lists_path(&self) -> PathBuf {
        self.data_dir.join("players.json")
    }
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "blockbridge")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn command() -> Command {
    Command::new("blockbridge")
        .about("Multi-version block world server")
        .arg(
            Arg::new("listen")
                .long("listen")
                .help("Address of the Java edition listener")
                .default_value("0.0.0.0:25565")
                .value_parser(value_parser!(SocketAddr)),
        )
        .arg(
            Arg::new("motd")
                .long("motd")
                .help("Message shown in the server list")
                .default_value("A Blockbridge Server"),
        )
        .arg(
            Arg::new("max-players")
                .long("max-players")
                .default_value("20")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("view-distance")
                .long("view-distance")
                .help("Chunk radius sent around the spawn")
                .default_value("2")
                .value_parser(value_parser!(i32).range(0..=16)),
        )
        .arg(
            Arg::new("compression-threshold")
                .long("compression-threshold")
                .help("Smallest 1.8 packet that is compressed, negative disables compression")
                .default_value("256")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("no-encryption")
                .long("no-encryption")
                .help("Skip the key exchange for 1.7 and 1.8 clients")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .value_parser(value_parser!(LevelFilter)),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Where the ban and op lists are kept")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("op")
                .long("op")
                .help("Grant operator rights to a player, may be repeated")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("surface-depth")
                .long("surface-depth")
                .help("Height of the ground cover layer")
                .default_value("4")
                .value_parser(value_parser!(i32).range(1..=120)),
        )
        .arg(
            Arg::new("max-build-height")
                .long("max-build-height")
                .default_value("128")
                .value_parser(value_parser!(i32).range(1..=256)),
        )
        .arg(
            Arg::new("void-fall-y")
                .long("void-fall-y")
                .help("Feet height below which players are returned to spawn")
                .default_value("-16")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
        )
}

pub fn parse_args<I, T>(args: I) -> Result<(ServerConfig, GameConfig), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Ok(from_matches(&matches))
}

fn from_matches(matches: &ArgMatches) -> (ServerConfig, GameConfig) {
    let defaults = ServerConfig::default();
    let server_config = ServerConfig {
        listen: matches
            .get_one::<SocketAddr>("listen")
            .copied()
            .unwrap_or(defaults.listen),
        motd: matches
            .get_one::<String>("motd")
            .cloned()
            .unwrap_or(defaults.motd),
        max_players: matches
            .get_one::<usize>("max-players")
            .copied()
            .unwrap_or(defaults.max_players),
        view_distance: matches
            .get_one::<i32>("view-distance")
            .copied()
            .unwrap_or(defaults.view_distance),
        compression_threshold: match matches.get_one::<i32>("compression-threshold") {
            Some(threshold) if *threshold < 0 => None,
            Some(threshold) => Some(*threshold as usize),
            None => defaults.compression_threshold,
        },
        modern_encryption: !matches.get_flag("no-encryption"),
        log_level: matches
            .get_one::<LevelFilter>("log-level")
            .copied()
            .unwrap_or(defaults.log_level),
        data_dir: matches
            .get_one::<PathBuf>("data-dir")
            .cloned()
            .unwrap_or_else(default_data_dir),
        ops: matches
            .get_many::<String>("op")
            .map(|ops| ops.cloned().collect())
            .unwrap_or_default(),
        ..defaults
    };

    let mut game_config = GameConfig::new(
        matches
            .get_one::<i32>("surface-depth")
            .copied()
            .unwrap_or(4),
    );
    if let Some(height) = matches.get_one::<i32>("max-build-height") {
        game_config.max_build_height = *height;
    }
    if let Some(threshold) = matches.get_one::<f64>("void-fall-y") {
        game_config.void_fall_threshold = *threshold;
    }
    game_config.view_distance = server_config.view_distance;
    game_config.max_players = server_config.max_players;

    (server_config, game_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let (server, game) = parse_args(["blockbridge", "--data-dir", "/tmp/bb"]).unwrap();
        assert_eq!(server.listen.port(), DEFAULT_JAVA_PORT);
        assert_eq!(server.compression_threshold, Some(256));
        assert!(server.modern_encryption);
        assert_eq!(server.player_lists_path(), PathBuf::from("/tmp/bb/players.json"));
        assert_eq!(game.surface_depth, 4);
        assert_eq!(game.spawn.y, 5.0);
        assert_eq!(game.max_build_height, 128);
    }

    #[test]
    fn options() {
        let (server, game) = parse_args([
            "blockbridge",
            "--listen",
            "127.0.0.1:25570",
            "--compression-threshold",
            "-1",
            "--no-encryption",
            "--op",
            "alice",
            "--op",
            "bob",
            "--surface-depth",
            "10",
            "--void-fall-y",
            "-40",
            "--log-level",
            "trace",
        ])
        .unwrap();
        assert_eq!(server.listen, "127.0.0.1:25570".parse().unwrap());
        assert_eq!(server.compression_threshold, None);
        assert!(!server.modern_encryption);
        assert_eq!(server.ops, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(server.log_level, LevelFilter::Trace);
        assert_eq!(game.surface_depth, 10);
        assert_eq!(game.spawn.y, 11.0);
        assert_eq!(game.void_fall_threshold, -40.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_args(["blockbridge", "--view-distance", "99"]).is_err());
        assert!(parse_args(["blockbridge", "--listen", "nowhere"]).is_err());
    }
}
