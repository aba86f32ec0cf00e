//! Database repository for player data.
//!
//! Uses prepared statements and transactions for data integrity.

use sqlx::{Row, SqlitePool};

use crate::economy::{boost_expiry, capture_reward, BoostKind, BoostProduct, ItemProduct};
use crate::errors::AppError;
use crate::models::{
    Achievement, Capture, CaptureRequest, CardRow, Item, ItemType, MissionData, MissionRow,
    Profile, ProgressSources, User, DEFAULT_AVATAR, DEFAULT_EXPOSURES, DEFAULT_NAME,
};

/// Rows touched by a capture submission.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub card: CardRow,
    pub capture: Capture,
    /// Every capture of the card, including the new one
    pub card_captures: Vec<Capture>,
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== ACCOUNT OPERATIONS ====================

    /// Create an account and its progress row with starting values.
    pub async fn create_account(
        &self,
        email: &str,
        hashed_password: &str,
        token: &str,
        now_ms: i64,
    ) -> Result<User, AppError> {
        let user_id = uuid::Uuid::new_v4().to_string();
        let profile_id = uuid::Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO users (id, email, hashed_password, token) VALUES (?, ?, ?, ?)",
        )
        .bind(&user_id)
        .bind(email)
        .bind(hashed_password)
        .bind(token)
        .execute(&mut *tx)
        .await;

        if let Err(sqlx::Error::Database(db_err)) = &inserted {
            if db_err.is_unique_violation() {
                return Err(AppError::Conflict(format!(
                    "An account for {} already exists",
                    email
                )));
            }
        }
        inserted?;

        sqlx::query(
            r#"
            INSERT INTO user_data (
                id, user_id, name, email, num_exposures, last_film_handout,
                coins, last_capture, avatar, is_verified, friend_code
            ) VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?, 1, 'null')
            "#,
        )
        .bind(&profile_id)
        .bind(&user_id)
        .bind(DEFAULT_NAME)
        .bind(email)
        .bind(DEFAULT_EXPOSURES)
        .bind(now_ms)
        .bind(now_ms)
        .bind(DEFAULT_AVATAR)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(User {
            id: user_id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            token: token.to_string(),
        })
    }

    /// Get an account by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, email, hashed_password, token FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Resolve a bearer token to its account.
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query("SELECT id, email, hashed_password, token FROM users WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    // ==================== PROFILE OPERATIONS ====================

    /// Get the progress row of an account.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query("SELECT * FROM user_data WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    /// Whether a display name is held by any account other than `user_id`.
    pub async fn name_taken_by_other(&self, name: &str, user_id: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM user_data WHERE name = ? AND user_id != ? LIMIT 1")
            .bind(name)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Set the display name.
    pub async fn update_name(&self, user_id: &str, name: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE user_data SET name = ? WHERE user_id = ?")
            .bind(name)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ProfileMissing("No user found".to_string()));
        }
        Ok(())
    }

    /// Set the push messaging token and return the updated row.
    pub async fn update_messaging_token(
        &self,
        user_id: &str,
        messaging_token: &str,
    ) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query("UPDATE user_data SET messaging_token = ? WHERE user_id = ? RETURNING *")
            .bind(messaging_token)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    /// Spend film exposures and return the updated row.
    pub async fn consume_photos(
        &self,
        user_id: &str,
        amount: i64,
    ) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query(
            "UPDATE user_data SET num_exposures = num_exposures - ? WHERE user_id = ? RETURNING *",
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    // ==================== CARD OPERATIONS ====================

    /// List the cards of a player.
    pub async fn get_cards(&self, profile_id: &str) -> Result<Vec<CardRow>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, aircraft_id FROM cards WHERE user_id = ? ORDER BY rowid",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(card_from_row).collect())
    }

    /// List every capture of a player, across all cards.
    pub async fn get_user_captures(&self, profile_id: &str) -> Result<Vec<Capture>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT captures.* FROM captures
            INNER JOIN cards ON captures.card_id = cards.id
            WHERE cards.user_id = ?
            ORDER BY captures.timestamp, captures.rowid
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(capture_from_row).collect())
    }

    /// Sum of capture XP across all cards of a player.
    pub async fn total_xp(&self, profile_id: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(captures.xp), 0) AS total_xp FROM captures
            INNER JOIN cards ON captures.card_id = cards.id
            WHERE cards.user_id = ?
            "#,
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("total_xp"))
    }

    /// Record a sighting: find or create the card for the model, store the
    /// capture and credit the capture reward.
    pub async fn submit_capture(
        &self,
        profile_id: &str,
        request: &CaptureRequest,
        now_ms: i64,
    ) -> Result<CaptureOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // Concurrent first captures of a model collapse onto one card
        sqlx::query("INSERT OR IGNORE INTO cards (id, user_id, aircraft_id) VALUES (?, ?, ?)")
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(profile_id)
            .bind(&request.model)
            .execute(&mut *tx)
            .await?;

        let card_row =
            sqlx::query("SELECT id, user_id, aircraft_id FROM cards WHERE user_id = ? AND aircraft_id = ?")
                .bind(profile_id)
                .bind(&request.model)
                .fetch_one(&mut *tx)
                .await?;
        let card = card_from_row(&card_row);

        let capture = Capture {
            id: uuid::Uuid::new_v4().to_string(),
            card_id: card.id.clone(),
            lat: request.lat,
            lon: request.lon,
            alt: request.alt,
            speed: request.speed,
            destination: Some(request.associated_airport_id.to_string()),
            destination_id: Some(request.associated_airport_id),
            origin: None,
            origin_id: None,
            flight: Some(request.flight_id.to_string()),
            reg: request.reg.clone(),
            callsign: request.callsign.clone(),
            gps_lat: request.gps_lat,
            gps_lon: request.gps_lon,
            distance: request.distance,
            radar_lat: request.radar_lat,
            radar_lon: request.radar_lon,
            radar_range: request.radar_range,
            associated_airport_id: request.associated_airport_id,
            flight_id: request.flight_id,
            track: request.track,
            icon: request.icon,
            status: request.status,
            timestamp: request.timestamp,
            on_ground: request.on_ground,
            source: request.source,
            model: request.model.clone(),
            xp: request.xp,
            xp_user_bonus: request.xp_user_bonus,
            coverage: request.coverage,
            cloudiness: request.cloudiness,
            image_large: request.image_large.clone(),
            image_thumb: request.image_thumb.clone(),
            image_copy: request.image_copy.clone(),
            glow: request.glow,
        };

        sqlx::query(
            r#"
            INSERT INTO captures (
                id, card_id, lat, lon, alt, speed, destination, destination_id, origin, origin_id,
                flight, reg, callsign, gps_lat, gps_lon, distance, radar_lat, radar_lon, radar_range,
                associated_airport_id, flight_id, track, icon, status, timestamp, on_ground, source,
                model, xp, xp_user_bonus, coverage, cloudiness, image_large, image_thumb, image_copy, glow
            ) VALUES (
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                ?, ?, ?, ?, ?, ?, ?, ?, ?,
                ?, ?, ?, ?, ?, ?, ?, ?,
                ?, ?, ?, ?, ?, ?, ?, ?, ?
            )
            "#,
        )
        .bind(&capture.id)
        .bind(&capture.card_id)
        .bind(capture.lat)
        .bind(capture.lon)
        .bind(capture.alt)
        .bind(capture.speed)
        .bind(&capture.destination)
        .bind(capture.destination_id)
        .bind(&capture.origin)
        .bind(capture.origin_id)
        .bind(&capture.flight)
        .bind(&capture.reg)
        .bind(&capture.callsign)
        .bind(capture.gps_lat)
        .bind(capture.gps_lon)
        .bind(capture.distance)
        .bind(capture.radar_lat)
        .bind(capture.radar_lon)
        .bind(capture.radar_range)
        .bind(capture.associated_airport_id)
        .bind(capture.flight_id)
        .bind(capture.track)
        .bind(capture.icon)
        .bind(capture.status)
        .bind(capture.timestamp)
        .bind(capture.on_ground as i32)
        .bind(capture.source)
        .bind(&capture.model)
        .bind(capture.xp)
        .bind(capture.xp_user_bonus)
        .bind(capture.coverage)
        .bind(capture.cloudiness)
        .bind(&capture.image_large)
        .bind(&capture.image_thumb)
        .bind(&capture.image_copy)
        .bind(capture.glow as i32)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE user_data SET coins = coins + ?, last_capture = ? WHERE id = ?")
            .bind(capture_reward(capture.coverage, capture.cloudiness))
            .bind(now_ms)
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query("SELECT * FROM captures WHERE card_id = ? ORDER BY timestamp, rowid")
            .bind(&card.id)
            .fetch_all(&mut *tx)
            .await?;
        let card_captures = rows.iter().map(capture_from_row).collect();

        tx.commit().await?;

        Ok(CaptureOutcome {
            card,
            capture,
            card_captures,
        })
    }

    // ==================== ITEM OPERATIONS ====================

    /// List the items of a player.
    pub async fn get_items(&self, profile_id: &str) -> Result<Vec<Item>, AppError> {
        let rows = sqlx::query("SELECT id, type FROM items WHERE user_id = ? ORDER BY id")
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().filter_map(item_from_row).collect())
    }

    /// Charge a player for an item bundle and grant its items. Returns the new balance.
    pub async fn purchase_item(
        &self,
        profile_id: &str,
        product: &ItemProduct,
    ) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("UPDATE user_data SET coins = coins - ? WHERE id = ? RETURNING coins")
            .bind(product.cost)
            .bind(profile_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::ProfileMissing("No user found".to_string()))?;
        let coins: i64 = row.get("coins");

        for _ in 0..product.amount {
            sqlx::query("INSERT INTO items (user_id, type) VALUES (?, ?)")
                .bind(profile_id)
                .bind(product.item_type.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(coins)
    }

    /// Delete one item of a type. Fails with NotFound when the player has none.
    pub async fn remove_item(&self, profile_id: &str, item_type: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM items WHERE id = (
                SELECT id FROM items WHERE user_id = ? AND type = ? ORDER BY id LIMIT 1
            )
            "#,
        )
        .bind(profile_id)
        .bind(item_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("No {} item found", item_type)));
        }
        Ok(())
    }

    // ==================== BOOST OPERATIONS ====================

    /// Charge a player for a boost and start it at `now_ms`. Returns the updated row.
    pub async fn purchase_boost(
        &self,
        profile_id: &str,
        product: &BoostProduct,
        now_ms: i64,
    ) -> Result<Profile, AppError> {
        let sql = match product.kind {
            BoostKind::UnlimitedPhotos => {
                "UPDATE user_data SET coins = coins - ?, num_exposures = num_exposures + ?, unlimited_photos_expiry_time = ? WHERE id = ? RETURNING *"
            }
            BoostKind::RadarExpand => {
                "UPDATE user_data SET coins = coins - ?, num_exposures = num_exposures + ?, radar_expand_expiry_time = ? WHERE id = ? RETURNING *"
            }
        };

        let row = sqlx::query(sql)
            .bind(product.cost)
            .bind(product.photos)
            .bind(boost_expiry(now_ms, product.duration_secs))
            .bind(profile_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::ProfileMissing("No user found".to_string()))?;

        Ok(profile_from_row(&row))
    }

    /// Move a player's radar to another airport for `duration_secs`. Returns the updated row.
    pub async fn relocate(
        &self,
        profile_id: &str,
        destination_id: i64,
        cost: i64,
        duration_secs: i64,
        now_ms: i64,
    ) -> Result<Profile, AppError> {
        let row = sqlx::query(
            r#"
            UPDATE user_data SET
                relocation_airport = ?,
                relocation_airport_id = ?,
                relocation_timestamp = ?,
                relocation_expiry_time = ?,
                coins = coins - ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(destination_id)
        .bind(destination_id)
        .bind(now_ms)
        .bind(boost_expiry(now_ms, duration_secs))
        .bind(cost)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::ProfileMissing("No user found".to_string()))?;

        Ok(profile_from_row(&row))
    }

    // ==================== READ-MOSTLY COLLECTIONS ====================

    pub async fn get_achievements(&self, profile_id: &str) -> Result<Vec<Achievement>, AppError> {
        let rows = sqlx::query(
            "SELECT id, progress_numerator, is_achieved FROM achievements WHERE user_id = ? ORDER BY id",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(achievement_from_row).collect())
    }

    pub async fn get_missions(&self, profile_id: &str) -> Result<Vec<MissionRow>, AppError> {
        let rows = sqlx::query(
            "SELECT id, type, unclaimed, unfinished FROM missions WHERE user_id = ? ORDER BY id",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(mission_from_row).collect())
    }

    /// Mission entries of every mission owned by a player.
    pub async fn get_mission_data(&self, profile_id: &str) -> Result<Vec<MissionData>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT mission_data.* FROM mission_data
            INNER JOIN missions ON mission_data.mission_id = missions.id
            WHERE missions.user_id = ?
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(mission_data_from_row).collect())
    }

    pub async fn get_friend_ids(&self, profile_id: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT friend_id FROM friends WHERE user_id = ? ORDER BY rowid")
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("friend_id")).collect())
    }

    pub async fn get_unlocked_model_ids(&self, profile_id: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT model_id FROM unlocked_models WHERE user_id = ? ORDER BY rowid")
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("model_id")).collect())
    }

    pub async fn get_battle_deck(&self, profile_id: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT card_id FROM battle_deck WHERE user_id = ? ORDER BY rowid")
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("card_id")).collect())
    }

    /// Gather every row the progress snapshot is built from.
    pub async fn load_progress_sources(
        &self,
        user_id: &str,
    ) -> Result<Option<ProgressSources>, AppError> {
        let Some(profile) = self.get_profile(user_id).await? else {
            return Ok(None);
        };

        let (cards, captures, items, achievements, missions, mission_data) = tokio::try_join!(
            self.get_cards(&profile.id),
            self.get_user_captures(&profile.id),
            self.get_items(&profile.id),
            self.get_achievements(&profile.id),
            self.get_missions(&profile.id),
            self.get_mission_data(&profile.id),
        )?;
        let (friend_ids, unlocked_model_ids, battle_deck) = tokio::try_join!(
            self.get_friend_ids(&profile.id),
            self.get_unlocked_model_ids(&profile.id),
            self.get_battle_deck(&profile.id),
        )?;

        Ok(Some(ProgressSources {
            profile,
            cards,
            captures,
            items,
            achievements,
            missions,
            mission_data,
            friend_ids,
            unlocked_model_ids,
            battle_deck,
        }))
    }
}

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        hashed_password: row.get("hashed_password"),
        token: row.get("token"),
    }
}

fn profile_from_row(row: &sqlx::sqlite::SqliteRow) -> Profile {
    let battle_onboarding_completed: i32 = row.get("battle_onboarding_completed");
    let username_completed: i32 = row.get("username_completed");
    let is_verified: i32 = row.get("is_verified");
    let has_pending_friend_requests: i32 = row.get("has_pending_friend_requests");
    Profile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        email: row.get("email"),
        messaging_token: row.get("messaging_token"),
        xp: row.get("xp"),
        num_exposures: row.get("num_exposures"),
        last_film_handout: row.get("last_film_handout"),
        last_film_handout_time_left: row.get("last_film_handout_time_left"),
        coins: row.get("coins"),
        last_capture: row.get("last_capture"),
        battle_onboarding_completed: battle_onboarding_completed != 0,
        username_completed: username_completed != 0,
        radar_expand_expiry_time: row.get("radar_expand_expiry_time"),
        unlimited_photos_expiry_time: row.get("unlimited_photos_expiry_time"),
        relocation_airport_id: row.get("relocation_airport_id"),
        relocation_airport: row.get("relocation_airport"),
        relocation_timestamp: row.get("relocation_timestamp"),
        relocation_expiry_time: row.get("relocation_expiry_time"),
        avatar: row.get("avatar"),
        is_verified: is_verified != 0,
        friend_code: row.get("friend_code"),
        num_aircraft_models: row.get("num_aircraft_models"),
        num_destinations: row.get("num_destinations"),
        num_battle_wins: row.get("num_battle_wins"),
        num_achievements: row.get("num_achievements"),
        has_pending_friend_requests: has_pending_friend_requests != 0,
    }
}

fn card_from_row(row: &sqlx::sqlite::SqliteRow) -> CardRow {
    CardRow {
        id: row.get("id"),
        user_id: row.get("user_id"),
        aircraft_id: row.get("aircraft_id"),
    }
}

fn capture_from_row(row: &sqlx::sqlite::SqliteRow) -> Capture {
    let on_ground: i32 = row.get("on_ground");
    let glow: i32 = row.get("glow");
    Capture {
        id: row.get("id"),
        card_id: row.get("card_id"),
        lat: row.get("lat"),
        lon: row.get("lon"),
        alt: row.get("alt"),
        speed: row.get("speed"),
        destination: row.get("destination"),
        destination_id: row.get("destination_id"),
        origin: row.get("origin"),
        origin_id: row.get("origin_id"),
        flight: row.get("flight"),
        reg: row.get("reg"),
        callsign: row.get("callsign"),
        gps_lat: row.get("gps_lat"),
        gps_lon: row.get("gps_lon"),
        distance: row.get("distance"),
        radar_lat: row.get("radar_lat"),
        radar_lon: row.get("radar_lon"),
        radar_range: row.get("radar_range"),
        associated_airport_id: row.get("associated_airport_id"),
        flight_id: row.get("flight_id"),
        track: row.get("track"),
        icon: row.get("icon"),
        status: row.get("status"),
        timestamp: row.get("timestamp"),
        on_ground: on_ground != 0,
        source: row.get("source"),
        model: row.get("model"),
        xp: row.get("xp"),
        xp_user_bonus: row.get("xp_user_bonus"),
        coverage: row.get("coverage"),
        cloudiness: row.get("cloudiness"),
        image_large: row.get("image_large"),
        image_thumb: row.get("image_thumb"),
        image_copy: row.get("image_copy"),
        glow: glow != 0,
    }
}

/// Rows with an unknown item type are skipped.
fn item_from_row(row: &sqlx::sqlite::SqliteRow) -> Option<Item> {
    let type_str: String = row.get("type");
    let item_type: ItemType = type_str.parse().ok()?;
    Some(Item {
        id: row.get("id"),
        item_type,
    })
}

fn achievement_from_row(row: &sqlx::sqlite::SqliteRow) -> Achievement {
    let is_achieved: i32 = row.get("is_achieved");
    Achievement {
        id: row.get("id"),
        progress_numerator: row.get("progress_numerator"),
        is_achieved: is_achieved != 0,
    }
}

fn mission_from_row(row: &sqlx::sqlite::SqliteRow) -> MissionRow {
    MissionRow {
        id: row.get("id"),
        mission_type: row.get("type"),
        unclaimed: row.get("unclaimed"),
        unfinished: row.get("unfinished"),
    }
}

fn mission_data_from_row(row: &sqlx::sqlite::SqliteRow) -> MissionData {
    let claimed: i32 = row.get("claimed");
    MissionData {
        id: row.get("id"),
        mission_id: row.get("mission_id"),
        key: row.get("key"),
        title: row.get("title"),
        award: row.get("award"),
        data_type: row.get("type"),
        timestamp: row.get("timestamp"),
        claimed: claimed != 0,
        percentage: row.get("percentage"),
        length: row.get("length"),
    }
}
