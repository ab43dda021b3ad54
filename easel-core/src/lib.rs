//! Easel Core - Business logic for the Easel AI media studio
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (UserRecord, HistoryItem, pricing)
//! - **ports**: Trait definitions for external dependencies (KeyValueStore, MediaGenerator)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (local store, Gemini, demo)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod repository;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::demo::DemoGenerator;
use adapters::gemini::GeminiClient;
use adapters::local::LocalStore;
use config::Config;
use repository::UserRepository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::pricing::{CreditPlan, GenerationKind, CREDIT_PLANS};
pub use domain::result::{Error, GenerateError, Result};
pub use domain::{now_ms, HistoryItem, Theme, UserRecord};
pub use ports::{Artifact, AspectRatio, ChatRole, ChatTurn, MediaGenerator};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for Easel operations
///
/// This is the primary entry point for all business logic. It holds the
/// local store, configuration, and all services. The generation delegate is
/// resolved separately so commands that never generate work without an API
/// key.
pub struct EaselContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub repository: Arc<UserRepository>,
    pub account_service: AccountService,
    pub profile_service: ProfileService,
    pub credit_service: CreditService,
    pub studio_service: StudioService,
    pub chat_service: ChatService,
    pub admin_service: AdminService,
}

impl EaselContext {
    /// Create a new Easel context
    ///
    /// Demo mode keeps its own store directory so demo accounts never mix
    /// with real ones.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;

        let store_dirname = if config.demo_mode { "demo-store" } else { "store" };
        let store = LocalStore::open(&data_dir.join(store_dirname))?;
        let repository = Arc::new(UserRepository::new(Arc::new(store)));

        // Create services
        let account_service = AccountService::new(Arc::clone(&repository));
        let profile_service = ProfileService::new(Arc::clone(&repository));
        let credit_service = CreditService::new(Arc::clone(&repository));
        let studio_service =
            StudioService::new(Arc::clone(&repository), ArtifactStore::new(data_dir));
        let chat_service = ChatService::new(Arc::clone(&repository));
        let admin_service = AdminService::new(Arc::clone(&repository));

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            repository,
            account_service,
            profile_service,
            credit_service,
            studio_service,
            chat_service,
            admin_service,
        })
    }

    /// Resolve the generation delegate for the current configuration
    ///
    /// Demo mode wins over a configured key. Without either, generation
    /// commands cannot run and the error says how to fix that.
    pub fn generator(&self) -> Result<Arc<dyn MediaGenerator>> {
        if self.config.demo_mode {
            return Ok(Arc::new(DemoGenerator::new()));
        }

        let key = self.config.api_key.as_deref().ok_or_else(|| {
            Error::config(
                "No API key configured. Set GEMINI_API_KEY, run 'ez config set-key', \
                 or enable demo mode with 'ez config demo on'.",
            )
        })?;

        let client = GeminiClient::new(key)
            .map_err(|e| Error::config(format!("{:#}", e)))?
            .with_image_model(&self.config.image_model)
            .with_chat_model(&self.config.chat_model)
            .with_video_model(&self.config.video_model);
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_demo_mode_selects_demo_generator_and_store() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"demoMode": true}"#,
        )
        .unwrap();

        let ctx = EaselContext::new(dir.path()).unwrap();
        assert!(ctx.config.demo_mode);
        assert!(dir.path().join("demo-store").is_dir());
        assert_eq!(ctx.generator().unwrap().name(), "demo");
    }

    #[test]
    fn test_generator_requires_key_outside_demo_mode() {
        // No settings file, no env key expected in the test environment
        if std::env::var("GEMINI_API_KEY").is_ok() || std::env::var("EASEL_API_KEY").is_ok() {
            return;
        }
        let dir = tempdir().unwrap();
        let ctx = EaselContext::new(dir.path()).unwrap();
        assert!(matches!(ctx.generator().unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_configured_key_selects_gemini() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"apiKey": "AIzaTESTKEY"}"#,
        )
        .unwrap();

        let ctx = EaselContext::new(dir.path()).unwrap();
        assert_eq!(ctx.generator().unwrap().name(), "gemini");
    }
}
