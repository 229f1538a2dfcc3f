//! # Configuration
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. `config/default.toml`, then `config/{RUN_ENV}.toml`
//! 3. `APP__SECTION__KEY` environment variables
//! 4. `SERVER_HOST`, `SERVER_PORT`, `DATABASE_URL`, `JWT_SECRET`, `SNOWFLAKE_MACHINE_ID`
//!
//! A `.env` file is read first when present. Loading fails on a JWT secret
//! shorter than 32 characters or zero persistence attempts.

mod settings;

pub use settings::*;
