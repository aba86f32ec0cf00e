//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all player data.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            token TEXT NOT NULL UNIQUE
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_data (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL UNIQUE REFERENCES users(id),
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            messaging_token TEXT,
            xp INTEGER NOT NULL DEFAULT 0,
            num_exposures INTEGER NOT NULL,
            last_film_handout INTEGER NOT NULL,
            last_film_handout_time_left INTEGER NOT NULL DEFAULT 0,
            coins INTEGER NOT NULL DEFAULT 0,
            last_capture INTEGER NOT NULL,
            battle_onboarding_completed INTEGER NOT NULL DEFAULT 0,
            username_completed INTEGER NOT NULL DEFAULT 0,
            radar_expand_expiry_time INTEGER NOT NULL DEFAULT 0,
            unlimited_photos_expiry_time INTEGER NOT NULL DEFAULT 0,
            relocation_airport_id INTEGER,
            relocation_airport INTEGER NOT NULL DEFAULT 0,
            relocation_timestamp INTEGER NOT NULL DEFAULT 0,
            relocation_expiry_time INTEGER NOT NULL DEFAULT 0,
            avatar TEXT NOT NULL,
            is_verified INTEGER NOT NULL DEFAULT 0,
            friend_code TEXT NOT NULL,
            num_aircraft_models INTEGER NOT NULL DEFAULT 0,
            num_destinations INTEGER NOT NULL DEFAULT 0,
            num_battle_wins INTEGER NOT NULL DEFAULT 0,
            num_achievements INTEGER NOT NULL DEFAULT 0,
            has_pending_friend_requests INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES user_data(id),
            aircraft_id TEXT NOT NULL,
            UNIQUE (user_id, aircraft_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS captures (
            id TEXT PRIMARY KEY,
            card_id TEXT NOT NULL REFERENCES cards(id),
            lat REAL NOT NULL,
            lon REAL NOT NULL,
            alt REAL NOT NULL,
            speed REAL NOT NULL,
            destination TEXT,
            destination_id INTEGER,
            origin TEXT,
            origin_id INTEGER,
            flight TEXT,
            reg TEXT NOT NULL,
            callsign TEXT NOT NULL,
            gps_lat REAL NOT NULL,
            gps_lon REAL NOT NULL,
            distance REAL NOT NULL,
            radar_lat REAL NOT NULL,
            radar_lon REAL NOT NULL,
            radar_range REAL NOT NULL,
            associated_airport_id INTEGER NOT NULL,
            flight_id INTEGER NOT NULL,
            track REAL NOT NULL,
            icon INTEGER NOT NULL,
            status INTEGER NOT NULL,
            timestamp INTEGER NOT NULL,
            on_ground INTEGER NOT NULL,
            source INTEGER NOT NULL,
            model TEXT NOT NULL,
            xp INTEGER NOT NULL,
            xp_user_bonus INTEGER NOT NULL,
            coverage INTEGER NOT NULL,
            cloudiness INTEGER NOT NULL,
            image_large TEXT,
            image_thumb TEXT,
            image_copy TEXT,
            glow INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL REFERENCES user_data(id),
            type TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS achievements (
            id TEXT NOT NULL,
            user_id TEXT NOT NULL REFERENCES user_data(id),
            progress_numerator INTEGER NOT NULL,
            is_achieved INTEGER NOT NULL,
            PRIMARY KEY (user_id, id)
        );

        CREATE TABLE IF NOT EXISTS missions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL REFERENCES user_data(id),
            type TEXT NOT NULL,
            unclaimed INTEGER NOT NULL,
            unfinished INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS mission_data (
            id INTEGER PRIMARY KEY,
            mission_id INTEGER NOT NULL REFERENCES missions(id),
            key TEXT NOT NULL,
            title TEXT NOT NULL,
            award INTEGER NOT NULL,
            type TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            claimed INTEGER NOT NULL,
            percentage INTEGER NOT NULL,
            length INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS friends (
            user_id TEXT NOT NULL REFERENCES user_data(id),
            friend_id TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS unlocked_models (
            user_id TEXT NOT NULL REFERENCES user_data(id),
            model_id TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS battle_deck (
            user_id TEXT NOT NULL REFERENCES user_data(id),
            card_id TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_user_data_name ON user_data(name);
        CREATE INDEX IF NOT EXISTS idx_captures_card_id ON captures(card_id);
        CREATE INDEX IF NOT EXISTS idx_items_user_type ON items(user_id, type);
        CREATE INDEX IF NOT EXISTS idx_missions_user_id ON missions(user_id);
        CREATE INDEX IF NOT EXISTS idx_mission_data_mission_id ON mission_data(mission_id);
        CREATE INDEX IF NOT EXISTS idx_friends_user_id ON friends(user_id);
        CREATE INDEX IF NOT EXISTS idx_unlocked_models_user_id ON unlocked_models(user_id);
        CREATE INDEX IF NOT EXISTS idx_battle_deck_user_id ON battle_deck(user_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
