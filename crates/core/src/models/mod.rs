pub mod analytics;
pub mod asset;
pub mod draft;
pub mod ladder;
pub mod portfolio;
pub mod settings;
