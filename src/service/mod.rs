//! Business logic layer

pub mod addresses;
pub mod countries;
pub mod currencies;
pub mod extensions;
pub mod languages;
pub mod organizations;
pub mod relationships;
pub mod rooms;
pub mod settings;
pub mod sites;
pub mod visas;

pub use addresses::{AddressesService, ADDRESSES_RESOURCE};
pub use countries::{CountriesService, COUNTRIES_RESOURCE, COUNTRY_ISO_CODES_RESOURCE};
pub use currencies::{CurrenciesService, CURRENCIES_RESOURCE};
pub use extensions::ExtensionsService;
pub use languages::{LanguagesService, LANGUAGES_RESOURCE};
pub use organizations::{OrganizationsService, ORGANIZATIONS_RESOURCE};
pub use relationships::{RelationshipsService, PERSONAL_RELATIONSHIPS_RESOURCE};
pub use rooms::{RoomsService, ROOMS_RESOURCE};
pub use settings::{
    ConfigurationSettingsService, DefaultSettingsService, CONFIGURATION_SETTINGS_RESOURCE,
    DEFAULT_SETTINGS_RESOURCE,
};
pub use sites::{SitesService, SITES_RESOURCE};
pub use visas::{VisasService, PERSON_VISAS_RESOURCE};
