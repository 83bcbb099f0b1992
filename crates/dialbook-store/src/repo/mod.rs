pub mod contacts;

pub use contacts::{BucketCount, ContactsRepo, DailyCount, UpsertOutcome};
