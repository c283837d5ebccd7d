use bevy::{
    app::ScheduleRunnerPlugin,
    prelude::{App, IntoSystemConfigs, Last, PluginGroup, PostUpdate, PreUpdate, Update},
    MinimalPlugins,
};
use blockbridge_game_common::{PlayerPolicy, WorldSimulation};
use crossbeam_channel::Receiver;

use crate::game::{
    events::ChatCommandEvent,
    messages::control::ControlMessage,
    resources::{
        BlockWorld, ControlChannel, GameConfig, PlayerList, Policy, ServerMessages, Weather,
        WorldTime, TICK_DURATION,
    },
    systems::{
        chat_commands_system, client_messages_system, control_server_system,
        server_messages_system, void_fall_system, world_events_system, world_time_system,
    },
};

pub struct GameWorld {
    control_rx: Receiver<ControlMessage>,
}

impl GameWorld {
    pub fn new(control_rx: Receiver<ControlMessage>) -> Self {
        Self { control_rx }
    }

    /// Runs until every sender of the control channel has been dropped.
    pub fn run(
        &mut self,
        game_config: GameConfig,
        world: Box<dyn WorldSimulation>,
        policy: Box<dyn PlayerPolicy>,
    ) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(TICK_DURATION)));

        app.insert_resource(BlockWorld::new(world));
        app.insert_resource(ControlChannel::new(self.control_rx.clone()));
        app.insert_resource(PlayerList::new());
        app.insert_resource(Policy::new(policy));
        app.insert_resource(ServerMessages::new());
        app.insert_resource(Weather::default());
        app.insert_resource(WorldTime::new());
        app.insert_resource(game_config);

        app.add_event::<ChatCommandEvent>();

        app.add_systems(PreUpdate, (control_server_system, world_time_system).chain());
        app.add_systems(
            Update,
            (
                client_messages_system,
                chat_commands_system,
                void_fall_system,
            )
                .chain(),
        );
        app.add_systems(PostUpdate, world_events_system);
        app.add_systems(Last, server_messages_system);

        app.run();
    }
}
