use bevy::app::ScheduleRunnerPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::transform::TransformPlugin;
use std::time::Duration;

use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::placement_integrity::PlacementIntegrityPlugin;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(PlacementIntegrityPlugin)
        .add_plugins(WebRpcPlugin);

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let log_config = LogPlugin {
        level: Level::INFO,
        filter: "wgpu=error,room_placement_engine=info".to_string(),
        ..default()
    };

    MinimalPlugins
        .set(ScheduleRunnerPlugin::run_loop(FRAME_INTERVAL))
        .add(log_config)
        .add(TransformPlugin)
}
