use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use tracing::warn;

use crate::db::connection::Database;
use crate::domain::geo::{LatLng, ViewState};
use crate::errors::StateError;

// One row per key: center as a JSON `[lat, lng]` pair, zoom as an
// integer string, place as plain text.
const KEY_MAP_CENTER: &str = "mapCenter";
const KEY_MAP_ZOOM: &str = "mapZoom";
const KEY_LAST_PLACE: &str = "lastPlace";

fn get_value(db: &Database, key: &str) -> Result<Option<String>, StateError> {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT value FROM map_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StateError::Db(e.to_string()))
    })
}

fn put_value(db: &Database, key: &str, value: &str) -> Result<(), StateError> {
    let now = Utc::now().naive_utc();
    db.with_conn(|conn| {
        conn.execute(
            r#"
            INSERT INTO map_state (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, now],
        )
        .map_err(|e| StateError::Db(e.to_string()))?;
        Ok(())
    })
}

/// The camera saved by the previous session, if any. Rows that no longer
/// parse are ignored rather than failing startup.
pub fn load_view(db: &Database) -> Result<Option<ViewState>, StateError> {
    let Some(center_raw) = get_value(db, KEY_MAP_CENTER)? else {
        return Ok(None);
    };
    let Some(zoom_raw) = get_value(db, KEY_MAP_ZOOM)? else {
        return Ok(None);
    };

    let Ok([lat, lng]) = serde_json::from_str::<[f64; 2]>(&center_raw) else {
        warn!(raw = %center_raw, "saved center does not parse, ignoring");
        return Ok(None);
    };
    let Ok(zoom) = zoom_raw.parse::<u8>() else {
        warn!(raw = %zoom_raw, "saved zoom does not parse, ignoring");
        return Ok(None);
    };

    let center = LatLng::new(lat, lng);
    if !center.is_valid() {
        warn!(lat, lng, "saved center out of range, ignoring");
        return Ok(None);
    }

    Ok(Some(ViewState::new(center, zoom)))
}

pub fn save_view(db: &Database, view: &ViewState) -> Result<(), StateError> {
    let center = serde_json::to_string(&[view.center.lat, view.center.lng])
        .map_err(|e| StateError::Encode(e.to_string()))?;
    put_value(db, KEY_MAP_CENTER, &center)?;
    put_value(db, KEY_MAP_ZOOM, &view.zoom.to_string())
}

pub fn load_last_place(db: &Database) -> Result<Option<String>, StateError> {
    get_value(db, KEY_LAST_PLACE)
}

pub fn save_last_place(db: &Database, place: &str) -> Result<(), StateError> {
    put_value(db, KEY_LAST_PLACE, place)
}
