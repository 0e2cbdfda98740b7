pub mod banner;
pub mod card;
pub mod commands;
pub mod config;
pub mod console;
pub mod consts;
pub mod controller;
pub mod desk;
pub mod events;
pub mod gateway;
pub mod registry;
pub mod render;
pub mod repl;
pub mod spinner;
pub mod status;
pub mod surface;
