pub mod notifier;
pub mod watcher;
