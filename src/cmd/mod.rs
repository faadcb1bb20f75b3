mod app;

pub use app::get_command;
