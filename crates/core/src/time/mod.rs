pub mod window;

pub use window::HistoryWindow;
