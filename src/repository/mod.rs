//! Data access layer (Repository pattern)

pub mod address;
pub mod extensions;
pub mod facilities;
pub mod organization;
pub mod reference;
pub mod relationship;
pub mod settings;
pub mod visa;

pub use address::AddressRepository;
pub use extensions::{ExtendedDataRow, ExtensionsRepository};
pub use facilities::{RoomRepository, SiteRepository};
pub use organization::{EducationalInstitutionRepository, OrganizationRepository};
pub use reference::{CountryRepository, CurrencyRepository, LanguageRepository};
pub use relationship::RelationshipRepository;
pub use settings::{ConfigurationSettingsRepository, DefaultSettingsRepository};
pub use visa::VisaRepository;
