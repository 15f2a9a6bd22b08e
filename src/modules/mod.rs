pub mod catalog;
pub mod reader;
pub mod recommend;

use libris_authz::Sessions;
use libris_db::Database;
use libris_kernel::{settings::Settings, ModuleRegistry};

use catalog::{CatalogApiState, CatalogService};
use reader::ReaderState;
use recommend::{RecommendService, RecommendState};

/// Services shared by the application modules
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
    pub recommend: RecommendService,
    pub sessions: Sessions,
}

impl Services {
    pub fn new(db: &Database, sessions: Sessions, settings: &Settings) -> Self {
        Self {
            catalog: CatalogService::new(db.books.clone(), settings.catalog.page_size),
            recommend: RecommendService::new(db.recommendations.clone()),
            sessions,
        }
    }
}

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, services: &Services, settings: &Settings) {
    registry.register(catalog::create_module(CatalogApiState {
        catalog: services.catalog.clone(),
        sessions: services.sessions.clone(),
    }));
    registry.register(recommend::create_module(RecommendState {
        recommend: services.recommend.clone(),
        sessions: services.sessions.clone(),
    }));
    registry.register(reader::create_module(ReaderState {
        catalog: services.catalog.clone(),
        recommend: services.recommend.clone(),
        sessions: services.sessions.clone(),
        allow_dev_login: settings.auth.allow_dev_login,
    }));
}
