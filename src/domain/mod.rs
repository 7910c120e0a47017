//! Domain models for the Base integration resources

pub mod address;
pub mod common;
pub mod country;
pub mod currency;
pub mod language;
pub mod organization;
pub mod relationship;
pub mod room;
pub mod settings;
pub mod site;
pub mod visa;

pub use address::{
    Address, AddressCountry, AddressPersonFilter, AddressPlace, AddressQueryCriteria,
    AddressRegion,
};
pub use common::{is_nil_guid, new_guid, GuidObject, NIL_GUID};
pub use country::{Country, CountryIsoCode};
pub use currency::Currency;
pub use language::Language;
pub use organization::{
    Organization, OrganizationCredential, OrganizationFilter, OrganizationRole,
    OrganizationRoleType,
};
pub use relationship::{
    PersonalRelationship, RelatedPerson, RelationshipFilter, RelationshipType,
};
pub use room::{Room, RoomFilter, RoomOccupancy, RoomType};
pub use settings::{
    ConfigurationSettings, DefaultSettings, SettingsFilter, SettingsOptions, SettingsScope,
    SettingsSource, SettingsSourceOption,
};
pub use site::Site;
pub use visa::{PersonVisa, VisaCategory, VisaFilter, VisaStatus, VisaType};
