pub mod cron;

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::state::AppState;

/// Long-running background job sharing the application state.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct App {
  plugins: Vec<Box<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Box::new(plugin));
    self
  }

  /// Spawns every plugin. A failing plugin is logged and does not stop the
  /// others; dropping or shutting down the returned set stops them all.
  pub fn run(self, app: Arc<AppState>) -> JoinSet<()> {
    let mut tasks = JoinSet::new();

    for plugin in self.plugins {
      let app = app.clone();
      let name = plugin.name();
      tracing::info!("init `{name}`");

      tasks.spawn(async move {
        match plugin.start(app).await {
          Ok(()) => tracing::debug!("`{name}` finished"),
          Err(err) => tracing::error!("failed `{name}`: {err:#}"),
        }
      });
    }
    tasks
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
  };

  use super::*;
  use crate::{config::Config, store::Store, sv::test_utils};

  struct Counter(Arc<AtomicUsize>);

  #[async_trait::async_trait]
  impl Plugin for Counter {
    async fn start(&self, _: Arc<AppState>) -> anyhow::Result<()> {
      self.0.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }
  }

  struct Failing;

  #[async_trait::async_trait]
  impl Plugin for Failing {
    async fn start(&self, _: Arc<AppState>) -> anyhow::Result<()> {
      anyhow::bail!("boom")
    }
  }

  fn state(store: Store) -> Arc<AppState> {
    let config = Config {
      database_url: "sqlite::memory:".into(),
      storage_quota: None,
      backup_interval: Duration::ZERO,
      backup_dir: "backups".into(),
    };
    Arc::new(AppState { store, config })
  }

  #[tokio::test]
  async fn test_failing_plugin_does_not_stop_others() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut tasks = App::new()
      .register(Failing)
      .register(Counter(runs.clone()))
      .register(Counter(runs.clone()))
      .run(state(test_utils::memory_store()));

    while let Some(res) = tasks.join_next().await {
      res.unwrap();
    }
    assert_eq!(runs.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_default_name_is_type_path() {
    assert!(Failing.name().ends_with("Failing"));
  }
}
