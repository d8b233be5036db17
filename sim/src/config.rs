//! Server configuration (`spec.md` §6.2). Loaded via
//! `rt_common::config::load_or_default`, which falls back to
//! `ServerConfig::default()` when the file is absent — mirroring
//! `game/core::config::GameConfig` except every field is required
//! (`deny_unknown_fields`) so a typo in the TOML fails loudly instead of
//! silently taking the default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    pub listen_port: u16,
    pub udp_port: u16,
    pub max_clients: u8,
    pub tick_rate: f64,
    pub max_catchup_ticks: u32,
    pub snapshot_history: usize,
    pub position_delta_threshold: f32,
    pub input_silence_grace_ms: u64,
    pub connect_timeout_s: u64,
    pub ready_timeout_s: u64,
    pub world_width: f32,
    pub world_height: f32,
    pub net_id_base: u32,
}

impl Default for ServerConfig {
    fn default() -> ServerConfig {
        ServerConfig {
            listen_port: 8080,
            udp_port: 4242,
            max_clients: 4,
            tick_rate: 60.0,
            max_catchup_ticks: 5,
            snapshot_history: 128,
            position_delta_threshold: 5.0,
            input_silence_grace_ms: 1000,
            connect_timeout_s: 10,
            ready_timeout_s: 30,
            world_width: 1920.0,
            world_height: 1080.0,
            net_id_base: 1,
        }
    }
}

impl ServerConfig {
    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate)
    }

    pub fn input_silence_grace(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.input_silence_grace_ms)
    }
}
