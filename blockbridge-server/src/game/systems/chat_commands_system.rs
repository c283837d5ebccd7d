use std::num::{ParseFloatError, ParseIntError};

use bevy::ecs::{
    prelude::{Entity, EventReader, Query, Res, ResMut},
    system::SystemParam,
};
use blockbridge_game_common::{messages::server::ServerMessage, PolicyError, Position};
use clap::{error::ErrorKind, Arg};
use lazy_static::lazy_static;
use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::game::{
    components::{GameClient, PlayerInfo},
    events::ChatCommandEvent,
    resources::{GameConfig, Policy, PlayerList, ServerMessages, Weather, WorldTime},
};

lazy_static! {
    pub static ref CHAT_COMMANDS: clap::Command = {
        clap::Command::new("Chat Commands")
            .disable_help_subcommand(true)
            .disable_help_flag(true)
            .subcommand(clap::Command::new("help"))
            .subcommand(clap::Command::new("list"))
            .subcommand(
                clap::Command::new("say").arg(Arg::new("message").required(true).num_args(1..)),
            )
            .subcommand(
                clap::Command::new("tp")
                    .arg(Arg::new("player").required(true))
                    .arg(Arg::new("x").required(true).allow_negative_numbers(true))
                    .arg(Arg::new("y").required(true).allow_negative_numbers(true))
                    .arg(Arg::new("z").required(true).allow_negative_numbers(true)),
            )
            .subcommand(
                clap::Command::new("kick")
                    .arg(Arg::new("player").required(true))
                    .arg(Arg::new("reason").num_args(1..)),
            )
            .subcommand(clap::Command::new("ban").arg(Arg::new("player").required(true)))
            .subcommand(clap::Command::new("unban").arg(Arg::new("player").required(true)))
            .subcommand(clap::Command::new("unkick").arg(Arg::new("player").required(true)))
            .subcommand(clap::Command::new("op").arg(Arg::new("player").required(true)))
            .subcommand(clap::Command::new("deop").arg(Arg::new("player").required(true)))
            .subcommand(
                clap::Command::new("time").subcommand(
                    clap::Command::new("set")
                        .arg(Arg::new("ticks").required(true))
                        .arg(Arg::new("freeze").value_parser(["freeze"])),
                ),
            )
            .subcommand(
                clap::Command::new("weather").arg(
                    Arg::new("kind")
                        .required(true)
                        .value_parser(["clear", "rain", "thunder"]),
                ),
            )
    };
}

pub enum ChatCommandError {
    InvalidCommand,
    InvalidArguments,
    WithMessage(String),
}

impl From<shellwords::MismatchedQuotes> for ChatCommandError {
    fn from(_: shellwords::MismatchedQuotes) -> Self {
        Self::InvalidCommand
    }
}

impl From<clap::Error> for ChatCommandError {
    fn from(error: clap::Error) -> Self {
        match error.kind() {
            ErrorKind::MissingRequiredArgument
            | ErrorKind::InvalidValue
            | ErrorKind::ValueValidation
            | ErrorKind::TooManyValues => Self::InvalidArguments,
            _ => Self::InvalidCommand,
        }
    }
}

impl From<ParseIntError> for ChatCommandError {
    fn from(_: ParseIntError) -> Self {
        Self::InvalidArguments
    }
}

impl From<ParseFloatError> for ChatCommandError {
    fn from(_: ParseFloatError) -> Self {
        Self::InvalidArguments
    }
}

impl From<PolicyError> for ChatCommandError {
    fn from(error: PolicyError) -> Self {
        Self::WithMessage(error.to_string())
    }
}

/// What admin commands are allowed to do to the world and its sessions.
#[derive(SystemParam)]
pub struct ChatCommandParams<'w, 's> {
    game_config: Res<'w, GameConfig>,
    player_list: Res<'w, PlayerList>,
    policy: ResMut<'w, Policy>,
    server_messages: ResMut<'w, ServerMessages>,
    weather: ResMut<'w, Weather>,
    world_time: ResMut<'w, WorldTime>,
    clients: Query<'w, 's, (&'static GameClient, &'static PlayerInfo, &'static mut Position)>,
}

impl<'w, 's> ChatCommandParams<'w, 's> {
    pub fn broadcast_chat(&mut self, text: &str) {
        self.server_messages
            .send_global_message(ServerMessage::Chat(text.to_string()));
    }

    pub fn teleport(&mut self, entity: Entity, destination: Position) -> bool {
        let Ok((game_client, player_info, mut position)) = self.clients.get_mut(entity) else {
            return false;
        };

        *position = Position {
            on_ground: false,
            ..destination
        };
        game_client.send(ServerMessage::Teleport(*position));
        self.server_messages.send_global_message_except(
            entity,
            ServerMessage::MoveEntity {
                entity_id: player_info.entity_id,
                position: *position,
            },
        );
        true
    }

    /// Disconnects the player and refuses them until `unkick`.
    pub fn kick(&mut self, entity: Entity, reason: &str) {
        if let Ok((_, player_info, _)) = self.clients.get(entity) {
            self.policy.kick(&player_info.name);
        }
        self.disconnect(entity, reason);
    }

    pub fn set_time_of_day(&mut self, ticks: i64, frozen: bool) {
        self.world_time.set_time_of_day(ticks, frozen);
        let snapshot = self.world_time.snapshot();
        self.server_messages
            .send_global_message(ServerMessage::Time(snapshot));
    }

    pub fn set_weather(&mut self, raining: bool, thundering: bool) {
        *self.weather = Weather {
            raining,
            thundering,
        };
        self.server_messages.send_global_message(ServerMessage::Weather {
            raining,
            thundering,
        });
    }

    fn disconnect(&mut self, entity: Entity, reason: &str) {
        if let Ok((game_client, _, _)) = self.clients.get(entity) {
            game_client.send(ServerMessage::Kick(reason.to_string()));
        }
    }

    fn online_player(&self, name: &str) -> Result<Entity, ChatCommandError> {
        self.player_list
            .find_by_name(name)
            .map(|(entity, _)| entity)
            .ok_or_else(|| ChatCommandError::WithMessage(format!("{} is not online", name)))
    }
}

fn send_multiline_chat(reply_tx: &UnboundedSender<ServerMessage>, text: &str) {
    for line in text.lines() {
        reply_tx.send(ServerMessage::Chat(line.to_string())).ok();
    }
}

fn usage(prefix: &str, command: &clap::Command, lines: &mut Vec<String>) {
    let mut help_string = format!("{}{}", prefix, command.get_name());
    if command.has_subcommands() {
        for subcommand in command.get_subcommands() {
            usage(&format!("{} ", help_string), subcommand, lines);
        }
        return;
    }

    for arg in command.get_arguments() {
        if arg.get_id() == "help" {
            continue;
        }

        help_string.push(' ');
        if arg.is_required_set() {
            help_string.push_str(arg.get_id().as_str());
        } else {
            help_string.push('[');
            help_string.push_str(arg.get_id().as_str());
            help_string.push(']');
        }
    }
    lines.push(help_string);
}

fn chat_commands_help() -> String {
    let mut lines = Vec::new();
    for subcommand in CHAT_COMMANDS.get_subcommands() {
        usage("/", subcommand, &mut lines);
    }
    lines.join("\n")
}

fn joined_words(matches: &clap::ArgMatches, id: &str) -> Option<String> {
    matches
        .get_many::<String>(id)
        .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
}

fn required<'a>(matches: &'a clap::ArgMatches, id: &str) -> Result<&'a String, ChatCommandError> {
    matches
        .get_one::<String>(id)
        .ok_or(ChatCommandError::InvalidArguments)
}

/// Runs one command and returns the reply for the player who sent it.
fn handle_chat_command(
    params: &mut ChatCommandParams,
    command_text: &str,
) -> Result<Option<String>, ChatCommandError> {
    let mut args = shellwords::split(command_text)?;
    args.insert(0, String::new()); // Clap expects arg[0] to be like executable name
    let command_matches = CHAT_COMMANDS.clone().try_get_matches_from(args)?;

    match command_matches
        .subcommand()
        .ok_or(ChatCommandError::InvalidCommand)?
    {
        ("help", _) => Ok(Some(chat_commands_help())),
        ("list", _) => {
            let mut names = params
                .player_list
                .iter()
                .map(|(_, info)| info.name.clone())
                .collect::<Vec<_>>();
            names.sort();
            Ok(Some(format!(
                "Online ({}/{}): {}",
                names.len(),
                params.game_config.max_players,
                names.join(", ")
            )))
        }
        ("say", arg_matches) => {
            let message = joined_words(arg_matches, "message").unwrap_or_default();
            params.broadcast_chat(&format!("[Server] {}", message));
            Ok(None)
        }
        ("tp", arg_matches) => {
            let entity = params.online_player(required(arg_matches, "player")?)?;
            let destination = Position::new(
                required(arg_matches, "x")?.parse::<f64>()?,
                required(arg_matches, "y")?.parse::<f64>()?,
                required(arg_matches, "z")?.parse::<f64>()?,
            );
            params.teleport(entity, destination);
            Ok(Some(format!(
                "Teleported to {:.1} {:.1} {:.1}",
                destination.x, destination.y, destination.z
            )))
        }
        ("kick", arg_matches) => {
            let name = required(arg_matches, "player")?;
            let entity = params.online_player(name)?;
            let reason = joined_words(arg_matches, "reason")
                .unwrap_or_else(|| "Kicked by an operator".to_string());
            params.kick(entity, &reason);
            Ok(Some(format!("Kicked {}", name)))
        }
        ("ban", arg_matches) => {
            let name = required(arg_matches, "player")?;
            params.policy.ban(name)?;
            if let Ok(entity) = params.online_player(name) {
                params.disconnect(entity, "You are banned from this server");
            }
            Ok(Some(format!("Banned {}", name)))
        }
        ("unban", arg_matches) => {
            let name = required(arg_matches, "player")?;
            params.policy.unban(name)?;
            Ok(Some(format!("Unbanned {}", name)))
        }
        ("unkick", arg_matches) => {
            let name = required(arg_matches, "player")?;
            params.policy.unkick(name);
            Ok(Some(format!("{} may rejoin", name)))
        }
        ("op", arg_matches) => {
            let name = required(arg_matches, "player")?;
            params.policy.op(name)?;
            Ok(Some(format!("{} is now an operator", name)))
        }
        ("deop", arg_matches) => {
            let name = required(arg_matches, "player")?;
            params.policy.deop(name)?;
            Ok(Some(format!("{} is no longer an operator", name)))
        }
        ("time", arg_matches) => match arg_matches
            .subcommand()
            .ok_or(ChatCommandError::InvalidArguments)?
        {
            ("set", set_matches) => {
                let ticks = required(set_matches, "ticks")?.parse::<i64>()?;
                let frozen = set_matches.get_one::<String>("freeze").is_some();
                params.set_time_of_day(ticks, frozen);
                Ok(Some(format!(
                    "Time set to {}{}",
                    params.world_time.time_of_day,
                    if frozen { " (frozen)" } else { "" }
                )))
            }
            _ => Err(ChatCommandError::InvalidCommand),
        },
        ("weather", arg_matches) => {
            let (raining, thundering) = match required(arg_matches, "kind")?.as_str() {
                "clear" => (false, false),
                "rain" => (true, false),
                "thunder" => (true, true),
                _ => return Err(ChatCommandError::InvalidArguments),
            };
            params.set_weather(raining, thundering);
            Ok(None)
        }
        _ => Err(ChatCommandError::InvalidCommand),
    }
}

pub fn chat_commands_system(
    mut chat_command_params: ChatCommandParams,
    mut chat_command_events: EventReader<ChatCommandEvent>,
) {
    for ChatCommandEvent { entity, command } in chat_command_events.read() {
        let (reply_tx, player_name) = match chat_command_params.clients.get(*entity) {
            Ok((game_client, player_info, _)) => (
                game_client.server_message_tx.clone(),
                player_info.name.clone(),
            ),
            Err(_) => continue,
        };

        if !chat_command_params.policy.is_op(&player_name) {
            send_multiline_chat(&reply_tx, "You do not have permission to use commands");
            continue;
        }

        info!("{} issued /{}", player_name, command);
        match handle_chat_command(&mut chat_command_params, command) {
            Ok(Some(reply)) => send_multiline_chat(&reply_tx, &reply),
            Ok(None) => {}
            Err(error) => {
                send_multiline_chat(&reply_tx, &format!("Failed: /{}", command));
                match error {
                    ChatCommandError::InvalidCommand => {
                        send_multiline_chat(&reply_tx, "Invalid command, try /help")
                    }
                    ChatCommandError::InvalidArguments => {
                        send_multiline_chat(&reply_tx, "Invalid argument")
                    }
                    ChatCommandError::WithMessage(message) => {
                        warn!("/{} by {} failed: {}", command, player_name, message);
                        send_multiline_chat(&reply_tx, &message)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::prelude::{App, Update};
    use blockbridge_game_common::{
        messages::{server, EntityId},
        PlayerLists, PlayerPolicy,
    };
    use blockbridge_network_common::ProtocolVersion;
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use uuid::Uuid;

    use super::*;

    fn test_app() -> App {
        let mut policy = PlayerLists::in_memory();
        policy.op("Admin").unwrap();

        let mut app = App::new();
        app.insert_resource(GameConfig::default())
            .insert_resource(PlayerList::new())
            .insert_resource(Policy::new(Box::new(policy)))
            .insert_resource(ServerMessages::new())
            .insert_resource(Weather::default())
            .insert_resource(WorldTime::new())
            .add_event::<ChatCommandEvent>()
            .add_systems(Update, chat_commands_system);
        app
    }

    fn join(app: &mut App, name: &str) -> (Entity, UnboundedReceiver<ServerMessage>) {
        let (server_message_tx, server_message_rx) = mpsc::unbounded_channel();
        let (_, client_message_rx) = crossbeam_channel::unbounded();
        let entity_id = app.world.resource_mut::<PlayerList>().allocate_entity_id();
        let info = PlayerInfo {
            entity_id,
            name: name.to_string(),
            uuid: Uuid::nil(),
        };
        let entity = app
            .world
            .spawn((
                GameClient::new(client_message_rx, server_message_tx, ProtocolVersion::Beta1_7),
                info.clone(),
                Position::new(0.5, 5.0, 0.5),
            ))
            .id();
        app.world.resource_mut::<PlayerList>().insert(entity, info);
        (entity, server_message_rx)
    }

    fn run(app: &mut App, entity: Entity, command: &str) {
        app.world.send_event(ChatCommandEvent {
            entity,
            command: command.to_string(),
        });
        app.update();
    }

    fn chat_lines(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let ServerMessage::Chat(line) = message {
                lines.push(line);
            }
        }
        lines
    }

    #[test]
    fn commands_need_an_operator() {
        let mut app = test_app();
        let (entity, mut rx) = join(&mut app, "Guest");
        run(&mut app, entity, "weather rain");
        assert_eq!(
            chat_lines(&mut rx),
            vec!["You do not have permission to use commands".to_string()]
        );
        assert_eq!(*app.world.resource::<Weather>(), Weather::default());
    }

    #[test]
    fn time_and_weather_are_broadcast() {
        let mut app = test_app();
        let (admin, _rx) = join(&mut app, "Admin");

        run(&mut app, admin, "time set 6000 freeze");
        let world_time = app.world.resource::<WorldTime>();
        assert_eq!(world_time.time_of_day, 6000);
        assert!(world_time.frozen);

        run(&mut app, admin, "weather thunder");
        assert_eq!(
            *app.world.resource::<Weather>(),
            Weather {
                raining: true,
                thundering: true
            }
        );

        let pending = &app.world.resource::<ServerMessages>().pending_messages;
        assert!(pending.iter().any(|pending| matches!(
            pending.message,
            ServerMessage::Time(server::WorldTime {
                time_of_day: 6000,
                frozen: true,
                ..
            })
        )));
        assert!(pending.iter().any(|pending| matches!(
            pending.message,
            ServerMessage::Weather {
                raining: true,
                thundering: true
            }
        )));
    }

    #[test]
    fn kick_disconnects_and_refuses() {
        let mut app = test_app();
        let (admin, _admin_rx) = join(&mut app, "Admin");
        let (_, mut griefer_rx) = join(&mut app, "Griefer");

        run(&mut app, admin, "kick griefer \"be nice\"");
        assert_eq!(
            griefer_rx.try_recv().ok(),
            Some(ServerMessage::Kick("be nice".to_string()))
        );
        assert!(app.world.resource::<Policy>().is_kicked("Griefer"));

        run(&mut app, admin, "unkick Griefer");
        assert!(!app.world.resource::<Policy>().is_kicked("Griefer"));
    }

    #[test]
    fn teleport_moves_the_target() {
        let mut app = test_app();
        let (admin, _admin_rx) = join(&mut app, "Admin");
        let (target, mut target_rx) = join(&mut app, "Alex");

        run(&mut app, admin, "tp alex 10 -3.5 20");
        let position = *app.world.get::<Position>(target).unwrap();
        assert_eq!((position.x, position.y, position.z), (10.0, -3.5, 20.0));
        assert!(matches!(target_rx.try_recv(), Ok(ServerMessage::Teleport(_))));
        let pending = &app.world.resource::<ServerMessages>().pending_messages;
        assert!(matches!(
            pending[0].message,
            ServerMessage::MoveEntity {
                entity_id: EntityId(2),
                ..
            }
        ));
        assert_eq!(pending[0].except, Some(target));
    }

    #[test]
    fn help_and_errors_reply_to_the_sender() {
        let mut app = test_app();
        let (admin, mut rx) = join(&mut app, "Admin");

        run(&mut app, admin, "help");
        let help = chat_lines(&mut rx);
        assert!(help.contains(&"/time set ticks [freeze]".to_string()));
        assert!(help.contains(&"/weather kind".to_string()));

        run(&mut app, admin, "fly");
        assert_eq!(
            chat_lines(&mut rx),
            vec!["Failed: /fly".to_string(), "Invalid command, try /help".to_string()]
        );

        run(&mut app, admin, "tp Admin 1 two 3");
        assert_eq!(chat_lines(&mut rx)[1], "Invalid argument");

        run(&mut app, admin, "kick Nobody");
        assert_eq!(chat_lines(&mut rx)[1], "Nobody is not online");
    }
}
