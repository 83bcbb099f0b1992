pub mod contact;
pub mod geography;
pub mod locale;
pub mod merge;
pub mod phone;

pub use contact::{validate_national_phone, Contact, ContactRecord, GeographyBucket, OtherFields};
pub use geography::{classify, extract_city, extract_state_country, normalize_text};
pub use locale::Locale;
pub use merge::merge_into_existing;
pub use phone::{normalize_phone, NormalizedPhone};
