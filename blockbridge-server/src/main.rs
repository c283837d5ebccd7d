use std::sync::Arc;

use anyhow::Context;
use blockbridge_game_common::{FlatWorld, PlayerLists, PlayerPolicy};
use blockbridge_network_common::ServerKeyPair;
use blockbridge_server::{
    config::parse_args,
    game::GameWorld,
    server::{run_java_listener, ServerContext},
};
use log::info;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let (server_config, game_config) = match parse_args(std::env::args_os()) {
        Ok(configs) => configs,
        Err(error) => error.exit(),
    };

    TermLogger::init(
        server_config.log_level,
        ConfigBuilder::new()
            .set_target_level(log::LevelFilter::Error)
            .set_location_level(log::LevelFilter::Off)
            .build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("failed to initialise logging")?;

    let mut player_lists = PlayerLists::load(&server_config.player_lists_path())
        .context("failed to load player lists")?;
    for name in server_config.ops.iter() {
        player_lists
            .op(name)
            .with_context(|| format!("failed to op {}", name))?;
    }

    let key_pair = ServerKeyPair::generate().context("failed to generate server key pair")?;
    let (control_tx, control_rx) = crossbeam_channel::unbounded();

    let world_config = game_config.clone();
    let surface_depth = game_config.surface_depth;
    std::thread::spawn(move || {
        GameWorld::new(control_rx).run(
            world_config,
            Box::new(FlatWorld::new(surface_depth)),
            Box::new(player_lists),
        );
    });

    let listener = TcpListener::bind(server_config.listen)
        .await
        .with_context(|| format!("failed to listen on {}", server_config.listen))?;
    info!("{}", server_config.motd);

    let context = Arc::new(ServerContext::new(
        server_config,
        game_config,
        key_pair,
        control_tx,
    ));
    run_java_listener(listener, context).await
}
