pub mod logger;
pub mod migration;
pub mod params;
pub mod record;
