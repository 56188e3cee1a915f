pub mod board;
pub mod config;
pub mod controller;
pub mod datetime;
pub mod form;
pub mod render;
pub mod repository;
pub mod storage;
pub mod task;
pub mod transitions;

pub use board::{
  Board,
  BoardView,
  Confirm
};
pub use config::AppConfig;
pub use storage::{
  KeyValueStore,
  MemoryStore,
  Storage
};
