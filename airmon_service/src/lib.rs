/// airmon_service: air quality ingestion and AQI service.
///
/// # Module structure
///
/// ```text
/// airmon_service
/// ├── aqi         — CPCB AQI engine (pure)
/// │   ├── breakpoints — breakpoint tables + sub-index interpolation
/// │   └── category    — severity bands
/// ├── model       — shared data types (Reading)
/// ├── ingest      — inbound payload parsing/validation, reading construction
/// ├── store       — ReadingStore trait with PostgreSQL and in-memory backends
/// ├── db          — PostgreSQL connection + schema validation
/// ├── config      — airmon.toml / environment configuration
/// └── endpoint    — HTTP API (tiny_http + worker pool)
/// ```

/// Public modules
pub mod aqi;
pub mod config;
pub mod db;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod store;
