pub mod error;
pub mod metadata;
pub mod request;
pub mod rules;
pub mod sites;
pub mod values;
