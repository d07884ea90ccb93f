pub mod pump;

pub use pump::spawn_pump;
