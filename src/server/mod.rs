//! Server initialization and routing

use crate::api;
use crate::cache::CacheManager;
use crate::config::Config;
use crate::middleware::ObservabilityLayer;
use crate::policy::PermissionSet;
use crate::repository::{
    address::AddressRepositoryImpl,
    extensions::ExtensionsRepositoryImpl,
    facilities::{RoomRepositoryImpl, SiteRepositoryImpl},
    organization::{EducationalInstitutionRepositoryImpl, OrganizationRepositoryImpl},
    reference::{CountryRepositoryImpl, CurrencyRepositoryImpl, LanguageRepositoryImpl},
    relationship::RelationshipRepositoryImpl,
    settings::{ConfigurationSettingsRepositoryImpl, DefaultSettingsRepositoryImpl},
    visa::VisaRepositoryImpl,
};
use crate::service::{
    AddressesService, ConfigurationSettingsService, CountriesService, CurrenciesService,
    DefaultSettingsService, ExtensionsService, LanguagesService, OrganizationsService,
    RelationshipsService, RoomsService, SitesService, VisasService,
};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub cache_manager: CacheManager,
    pub countries_service: Arc<CountriesService<CountryRepositoryImpl>>,
    pub currencies_service: Arc<CurrenciesService<CurrencyRepositoryImpl>>,
    pub languages_service: Arc<LanguagesService<LanguageRepositoryImpl>>,
    pub addresses_service: Arc<AddressesService<AddressRepositoryImpl>>,
    pub organizations_service:
        Arc<OrganizationsService<OrganizationRepositoryImpl, EducationalInstitutionRepositoryImpl>>,
    pub rooms_service: Arc<RoomsService<RoomRepositoryImpl>>,
    pub sites_service: Arc<SitesService<SiteRepositoryImpl>>,
    pub configuration_settings_service:
        Arc<ConfigurationSettingsService<ConfigurationSettingsRepositoryImpl>>,
    pub default_settings_service: Arc<DefaultSettingsService<DefaultSettingsRepositoryImpl>>,
    pub relationships_service: Arc<RelationshipsService<RelationshipRepositoryImpl>>,
    pub visas_service: Arc<VisasService<VisaRepositoryImpl>>,
    pub extensions_service: Arc<ExtensionsService<ExtensionsRepositoryImpl>>,
}

/// Run the server
pub async fn run(config: Config) -> Result<()> {
    // Create database connection pool
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    info!("Connected to database");

    // Create cache manager
    let cache_manager = CacheManager::new(&config.redis).await?;
    info!("Connected to Redis");

    // Install Prometheus metrics recorder
    let metrics_handle = Arc::new(PrometheusBuilder::new().install_recorder().ok());

    let state = build_state(&config, db_pool, cache_manager);
    let app = build_router(state, metrics_handle);

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire repositories and services into the shared application state
pub fn build_state(config: &Config, db_pool: MySqlPool, cache_manager: CacheManager) -> AppState {
    let permission_set = PermissionSet::new(config.api.granted_permissions.clone());

    // Create repositories
    let country_repo = Arc::new(CountryRepositoryImpl::new(db_pool.clone()));
    let currency_repo = Arc::new(CurrencyRepositoryImpl::new(db_pool.clone()));
    let language_repo = Arc::new(LanguageRepositoryImpl::new(db_pool.clone()));
    let address_repo = Arc::new(AddressRepositoryImpl::new(db_pool.clone()));
    let organization_repo = Arc::new(OrganizationRepositoryImpl::new(db_pool.clone()));
    let institution_repo = Arc::new(EducationalInstitutionRepositoryImpl::new(db_pool.clone()));
    let room_repo = Arc::new(RoomRepositoryImpl::new(db_pool.clone()));
    let site_repo = Arc::new(SiteRepositoryImpl::new(db_pool.clone()));
    let configuration_settings_repo =
        Arc::new(ConfigurationSettingsRepositoryImpl::new(db_pool.clone()));
    let default_settings_repo = Arc::new(DefaultSettingsRepositoryImpl::new(db_pool.clone()));
    let relationship_repo = Arc::new(RelationshipRepositoryImpl::new(db_pool.clone()));
    let visa_repo = Arc::new(VisaRepositoryImpl::new(db_pool.clone()));
    let extensions_repo = Arc::new(ExtensionsRepositoryImpl::new(db_pool.clone()));

    // Create services
    let countries_service = Arc::new(CountriesService::new(
        country_repo,
        Some(cache_manager.clone()),
    ));
    let currencies_service = Arc::new(CurrenciesService::new(
        currency_repo,
        Some(cache_manager.clone()),
    ));
    let languages_service = Arc::new(LanguagesService::new(
        language_repo,
        Some(cache_manager.clone()),
    ));
    let addresses_service = Arc::new(AddressesService::new(
        address_repo,
        Some(cache_manager.clone()),
        permission_set.clone(),
    ));
    let organizations_service = Arc::new(OrganizationsService::new(
        organization_repo,
        institution_repo,
        Some(cache_manager.clone()),
        permission_set.clone(),
    ));
    let rooms_service = Arc::new(RoomsService::new(room_repo, Some(cache_manager.clone())));
    let sites_service = Arc::new(SitesService::new(site_repo, Some(cache_manager.clone())));
    let configuration_settings_service = Arc::new(ConfigurationSettingsService::new(
        configuration_settings_repo,
        Some(cache_manager.clone()),
        permission_set.clone(),
    ));
    let default_settings_service = Arc::new(DefaultSettingsService::new(
        default_settings_repo,
        Some(cache_manager.clone()),
        permission_set.clone(),
    ));
    let relationships_service = Arc::new(RelationshipsService::new(
        relationship_repo,
        Some(cache_manager.clone()),
        permission_set.clone(),
    ));
    let visas_service = Arc::new(VisasService::new(
        visa_repo,
        Some(cache_manager.clone()),
        permission_set,
    ));
    let extensions_service = Arc::new(ExtensionsService::new(
        extensions_repo,
        Some(cache_manager.clone()),
    ));

    AppState {
        config: Arc::new(config.clone()),
        db_pool,
        cache_manager,
        countries_service,
        currencies_service,
        languages_service,
        addresses_service,
        organizations_service,
        rooms_service,
        sites_service,
        configuration_settings_service,
        default_settings_service,
        relationships_service,
        visas_service,
        extensions_service,
    }
}

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Arc<Option<PrometheusHandle>>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let metrics_router = Router::new()
        .route("/metrics", get(api::metrics::metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        // Health endpoints
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready))
        // Countries
        .route(
            "/countries",
            get(api::countries::get_countries).post(api::not_supported),
        )
        .route(
            "/countries/{guid}",
            get(api::countries::get_country_by_guid)
                .put(api::countries::put_country)
                .delete(api::not_supported),
        )
        // Country ISO codes
        .route(
            "/country-iso-codes",
            get(api::countries::get_country_iso_codes).post(api::not_supported),
        )
        .route(
            "/country-iso-codes/{guid}",
            get(api::countries::get_country_iso_code_by_guid)
                .put(api::not_supported)
                .delete(api::not_supported),
        )
        // Currencies
        .route(
            "/currencies",
            get(api::currencies::get_currencies).post(api::not_supported),
        )
        .route(
            "/currencies/{guid}",
            get(api::currencies::get_currency_by_guid)
                .put(api::currencies::put_currency)
                .delete(api::not_supported),
        )
        // Languages
        .route(
            "/languages",
            get(api::languages::get_languages).post(api::not_supported),
        )
        .route(
            "/languages/{guid}",
            get(api::languages::get_language_by_guid)
                .put(api::languages::put_language)
                .delete(api::not_supported),
        )
        // Addresses
        .route(
            "/addresses",
            get(api::addresses::get_addresses).post(api::not_supported),
        )
        .route(
            "/addresses/{guid}",
            get(api::addresses::get_address_by_guid)
                .put(api::addresses::put_address)
                .delete(api::addresses::delete_address),
        )
        .route("/qapi/addresses", post(api::addresses::query_addresses))
        // Organizations
        .route(
            "/organizations",
            get(api::organizations::get_organizations).post(api::not_supported),
        )
        .route(
            "/organizations/{guid}",
            get(api::organizations::get_organization_by_guid)
                .put(api::organizations::put_organization)
                .delete(api::not_supported),
        )
        // Rooms
        .route(
            "/rooms",
            get(api::rooms::get_rooms).post(api::not_supported),
        )
        .route(
            "/rooms/{guid}",
            get(api::rooms::get_room_by_guid)
                .put(api::not_supported)
                .delete(api::not_supported),
        )
        // Sites
        .route(
            "/sites",
            get(api::sites::get_sites).post(api::not_supported),
        )
        .route(
            "/sites/{guid}",
            get(api::sites::get_site_by_guid)
                .put(api::not_supported)
                .delete(api::not_supported),
        )
        // Configuration settings
        .route(
            "/configuration-settings",
            get(api::settings::get_configuration_settings).post(api::not_supported),
        )
        .route(
            "/configuration-settings/{guid}",
            get(api::settings::get_configuration_settings_by_guid)
                .put(api::settings::put_configuration_settings)
                .delete(api::not_supported),
        )
        // Default settings
        .route(
            "/default-settings",
            get(api::settings::get_default_settings).post(api::not_supported),
        )
        .route(
            "/default-settings/{guid}",
            get(api::settings::get_default_settings_by_guid)
                .put(api::settings::put_default_settings)
                .delete(api::not_supported),
        )
        // Personal relationships
        .route(
            "/personal-relationships",
            get(api::relationships::get_personal_relationships)
                .post(api::relationships::post_personal_relationship),
        )
        .route(
            "/personal-relationships/{guid}",
            get(api::relationships::get_personal_relationship_by_guid)
                .put(api::relationships::put_personal_relationship)
                .delete(api::relationships::delete_personal_relationship),
        )
        // Person visas
        .route(
            "/person-visas",
            get(api::visas::get_person_visas).post(api::visas::post_person_visa),
        )
        .route(
            "/person-visas/{guid}",
            get(api::visas::get_person_visa_by_guid)
                .put(api::visas::put_person_visa)
                .delete(api::not_supported),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(ObservabilityLayer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
