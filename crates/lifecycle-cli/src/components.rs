//! Demo server components wired by the CLI.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use lifecycle_core::{LifecycleError, LoadContext, OnLoad, OnUpdate, Priority};
use serde::Deserialize;

pub const DATABASE: Priority = Priority::new(0);
pub const PROFILES: Priority = Priority::new(50);
pub const MODS: Priority = Priority::new(100);
pub const EXTENSIONS: Priority = Priority::new(150);
pub const HTTP: Priority = Priority::new(900);

const SEED_DATABASE: &str = r#"{
    "items": ["5449016a4bdc2d6f028b456f", "544fb45d4bdc2dee738b4568"],
    "locations": ["bigmap", "factory4_day", "woods"],
    "traders": ["prapor", "therapist"]
}"#;

#[derive(Debug, Deserialize)]
struct SeedDatabase {
    items: Vec<String>,
    locations: Vec<String>,
    traders: Vec<String>,
}

pub struct DatabaseImporter;

#[async_trait]
impl OnLoad for DatabaseImporter {
    async fn on_load(&self, _ctx: &LoadContext) -> Result<(), LifecycleError> {
        let db: SeedDatabase = serde_json::from_str(SEED_DATABASE)?;
        tracing::info!(
            items = db.items.len(),
            locations = db.locations.len(),
            traders = db.traders.len(),
            "database imported"
        );
        Ok(())
    }

    fn route(&self) -> &str {
        "database-importer"
    }
}

/// Loads profiles at startup and saves them periodically.
pub struct SaveServer {
    save_every: u64,
    saves: AtomicU64,
}

impl SaveServer {
    pub fn new(save_every: u64) -> Self {
        Self {
            save_every,
            saves: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl OnLoad for SaveServer {
    async fn on_load(&self, _ctx: &LoadContext) -> Result<(), LifecycleError> {
        tracing::info!("profiles loaded");
        Ok(())
    }

    fn route(&self) -> &str {
        "save-server"
    }
}

#[async_trait]
impl OnUpdate for SaveServer {
    async fn on_update(&self, secs_since_last_run: u64) -> Result<bool, LifecycleError> {
        if secs_since_last_run < self.save_every {
            return Ok(false);
        }
        let n = self.saves.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(save = n, "profiles saved");
        Ok(true)
    }

    fn route(&self) -> &str {
        "save-server"
    }
}

/// Registers one loader per configured extension. The first one is placed
/// directly after the mod loader in its own tier, the rest in a later tier.
pub struct ModLoader {
    extensions: Vec<String>,
}

impl ModLoader {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

#[async_trait]
impl OnLoad for ModLoader {
    async fn on_load(&self, ctx: &LoadContext) -> Result<(), LifecycleError> {
        let mut names = self.extensions.iter();
        if let Some(first) = names.next() {
            let tier = ctx.registry().tier_for(MODS);
            // Position right after this loader.
            let index = (0..tier.visible_count())
                .find(|&i| tier.at(i).is_ok_and(|c| c.route() == self.route()))
                .map_or(tier.visible_count(), |i| i + 1);
            ctx.insert(MODS, index, Arc::new(Extension::new(first)))?;
        }
        for name in names {
            ctx.register(EXTENSIONS, Arc::new(Extension::new(name)));
        }
        tracing::info!(count = self.extensions.len(), "extensions discovered");
        Ok(())
    }

    fn route(&self) -> &str {
        "mod-loader"
    }
}

pub struct Extension {
    route: String,
}

impl Extension {
    fn new(name: &str) -> Self {
        Self {
            route: format!("extension:{name}"),
        }
    }
}

#[async_trait]
impl OnLoad for Extension {
    async fn on_load(&self, _ctx: &LoadContext) -> Result<(), LifecycleError> {
        tokio::task::yield_now().await;
        tracing::info!(route = %self.route, "extension loaded");
        Ok(())
    }

    fn route(&self) -> &str {
        &self.route
    }
}

pub struct HttpServer {
    addr: String,
}

impl HttpServer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl OnLoad for HttpServer {
    async fn on_load(&self, _ctx: &LoadContext) -> Result<(), LifecycleError> {
        tracing::info!(addr = %self.addr, "http server ready");
        Ok(())
    }

    fn route(&self) -> &str {
        "http-server"
    }
}
