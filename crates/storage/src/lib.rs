use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};

use shared::{
    domain::{
        Camera, CameraId, FilmProcess, FilmStock, FilmStockId, FilmType, Filter, FilterId,
        Format, Frame, FrameId, Increment, Lens, LensId, LightSource, PartialIncrement, Roll,
        RollFilterMode, RollId,
    },
    location::LatLng,
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    // ---- cameras ----

    pub async fn add_camera(&self, camera: &Camera) -> Result<CameraId> {
        let rec = sqlx::query(
            "INSERT INTO cameras (make, model, serial_number, min_shutter, max_shutter,
                                  shutter_increments, exposure_comp_increments, format)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&camera.make)
        .bind(&camera.model)
        .bind(camera.serial_number.as_deref())
        .bind(camera.min_shutter.as_deref())
        .bind(camera.max_shutter.as_deref())
        .bind(camera.shutter_increments.value())
        .bind(camera.exposure_comp_increments.value())
        .bind(camera.format.value())
        .fetch_one(&self.pool)
        .await?;
        Ok(CameraId(rec.get::<i64, _>(0)))
    }

    pub async fn update_camera(&self, camera: &Camera) -> Result<u64> {
        let updated = sqlx::query(
            "UPDATE cameras
             SET make = ?, model = ?, serial_number = ?, min_shutter = ?, max_shutter = ?,
                 shutter_increments = ?, exposure_comp_increments = ?, format = ?
             WHERE id = ?",
        )
        .bind(&camera.make)
        .bind(&camera.model)
        .bind(camera.serial_number.as_deref())
        .bind(camera.min_shutter.as_deref())
        .bind(camera.max_shutter.as_deref())
        .bind(camera.shutter_increments.value())
        .bind(camera.exposure_comp_increments.value())
        .bind(camera.format.value())
        .bind(camera.id.0)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated)
    }

    pub async fn delete_camera(&self, camera_id: CameraId) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM cameras WHERE id = ?")
            .bind(camera_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }

    pub async fn list_cameras(&self) -> Result<Vec<Camera>> {
        let rows = sqlx::query(
            "SELECT id, make, model, serial_number, min_shutter, max_shutter,
                    shutter_increments, exposure_comp_increments, format
             FROM cameras
             ORDER BY lower(make) ASC, lower(model) ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(camera_from_row).collect())
    }

    pub async fn camera_in_use(&self, camera_id: CameraId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM rolls WHERE camera_id = ? LIMIT 1")
            .bind(camera_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    // ---- lenses ----

    pub async fn add_lens(&self, lens: &Lens) -> Result<LensId> {
        let rec = sqlx::query(
            "INSERT INTO lenses (make, model, serial_number, min_aperture, max_aperture,
                                 min_focal_length, max_focal_length, aperture_increments)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&lens.make)
        .bind(&lens.model)
        .bind(lens.serial_number.as_deref())
        .bind(lens.min_aperture.as_deref())
        .bind(lens.max_aperture.as_deref())
        .bind(lens.min_focal_length)
        .bind(lens.max_focal_length)
        .bind(lens.aperture_increments.value())
        .fetch_one(&self.pool)
        .await?;
        Ok(LensId(rec.get::<i64, _>(0)))
    }

    pub async fn update_lens(&self, lens: &Lens) -> Result<u64> {
        let updated = sqlx::query(
            "UPDATE lenses
             SET make = ?, model = ?, serial_number = ?, min_aperture = ?, max_aperture = ?,
                 min_focal_length = ?, max_focal_length = ?, aperture_increments = ?
             WHERE id = ?",
        )
        .bind(&lens.make)
        .bind(&lens.model)
        .bind(lens.serial_number.as_deref())
        .bind(lens.min_aperture.as_deref())
        .bind(lens.max_aperture.as_deref())
        .bind(lens.min_focal_length)
        .bind(lens.max_focal_length)
        .bind(lens.aperture_increments.value())
        .bind(lens.id.0)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated)
    }

    pub async fn delete_lens(&self, lens_id: LensId) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM lenses WHERE id = ?")
            .bind(lens_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }

    pub async fn list_lenses(&self) -> Result<Vec<Lens>> {
        let rows = sqlx::query(
            "SELECT id, make, model, serial_number, min_aperture, max_aperture,
                    min_focal_length, max_focal_length, aperture_increments
             FROM lenses
             ORDER BY lower(make) ASC, lower(model) ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(lens_from_row).collect())
    }

    pub async fn lens_in_use(&self, lens_id: LensId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM frames WHERE lens_id = ? LIMIT 1")
            .bind(lens_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    // ---- mountables ----

    pub async fn add_mountable(&self, camera_id: CameraId, lens_id: LensId) -> Result<()> {
        sqlx::query(
            "INSERT INTO camera_lenses (camera_id, lens_id) VALUES (?, ?)
             ON CONFLICT(camera_id, lens_id) DO NOTHING",
        )
        .bind(camera_id.0)
        .bind(lens_id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_mountable(&self, camera_id: CameraId, lens_id: LensId) -> Result<u64> {
        let deleted =
            sqlx::query("DELETE FROM camera_lenses WHERE camera_id = ? AND lens_id = ?")
                .bind(camera_id.0)
                .bind(lens_id.0)
                .execute(&self.pool)
                .await?
                .rows_affected();
        Ok(deleted)
    }

    pub async fn mountable_lenses(&self, camera_id: CameraId) -> Result<Vec<Lens>> {
        let rows = sqlx::query(
            "SELECT l.id, l.make, l.model, l.serial_number, l.min_aperture, l.max_aperture,
                    l.min_focal_length, l.max_focal_length, l.aperture_increments
             FROM lenses l
             INNER JOIN camera_lenses cl ON cl.lens_id = l.id
             WHERE cl.camera_id = ?
             ORDER BY lower(l.make) ASC, lower(l.model) ASC",
        )
        .bind(camera_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(lens_from_row).collect())
    }

    pub async fn mountable_cameras(&self, lens_id: LensId) -> Result<Vec<Camera>> {
        let rows = sqlx::query(
            "SELECT c.id, c.make, c.model, c.serial_number, c.min_shutter, c.max_shutter,
                    c.shutter_increments, c.exposure_comp_increments, c.format
             FROM cameras c
             INNER JOIN camera_lenses cl ON cl.camera_id = c.id
             WHERE cl.lens_id = ?
             ORDER BY lower(c.make) ASC, lower(c.model) ASC",
        )
        .bind(lens_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(camera_from_row).collect())
    }

    // ---- filters ----

    pub async fn add_filter(&self, filter: &Filter) -> Result<FilterId> {
        let rec = sqlx::query("INSERT INTO filters (make, model) VALUES (?, ?) RETURNING id")
            .bind(&filter.make)
            .bind(&filter.model)
            .fetch_one(&self.pool)
            .await?;
        Ok(FilterId(rec.get::<i64, _>(0)))
    }

    pub async fn update_filter(&self, filter: &Filter) -> Result<u64> {
        let updated = sqlx::query("UPDATE filters SET make = ?, model = ? WHERE id = ?")
            .bind(&filter.make)
            .bind(&filter.model)
            .bind(filter.id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(updated)
    }

    pub async fn delete_filter(&self, filter_id: FilterId) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM filters WHERE id = ?")
            .bind(filter_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }

    pub async fn list_filters(&self) -> Result<Vec<Filter>> {
        let rows = sqlx::query(
            "SELECT id, make, model FROM filters ORDER BY lower(make) ASC, lower(model) ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Filter {
                id: FilterId(r.get::<i64, _>(0)),
                make: r.get::<String, _>(1),
                model: r.get::<String, _>(2),
            })
            .collect())
    }

    // ---- film stocks ----

    pub async fn add_film_stock(&self, stock: &FilmStock) -> Result<FilmStockId> {
        let rec = sqlx::query(
            "INSERT INTO film_stocks (make, model, iso, film_type, process, is_preadded)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&stock.make)
        .bind(&stock.model)
        .bind(stock.iso)
        .bind(stock.film_type.value())
        .bind(stock.process.value())
        .bind(stock.is_preadded)
        .fetch_one(&self.pool)
        .await?;
        Ok(FilmStockId(rec.get::<i64, _>(0)))
    }

    pub async fn update_film_stock(&self, stock: &FilmStock) -> Result<u64> {
        let updated = sqlx::query(
            "UPDATE film_stocks
             SET make = ?, model = ?, iso = ?, film_type = ?, process = ?, is_preadded = ?
             WHERE id = ?",
        )
        .bind(&stock.make)
        .bind(&stock.model)
        .bind(stock.iso)
        .bind(stock.film_type.value())
        .bind(stock.process.value())
        .bind(stock.is_preadded)
        .bind(stock.id.0)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated)
    }

    pub async fn delete_film_stock(&self, stock_id: FilmStockId) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM film_stocks WHERE id = ?")
            .bind(stock_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }

    pub async fn list_film_stocks(&self) -> Result<Vec<FilmStock>> {
        let rows = sqlx::query(
            "SELECT id, make, model, iso, film_type, process, is_preadded
             FROM film_stocks
             ORDER BY lower(make) ASC, lower(model) ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(film_stock_from_row).collect())
    }

    pub async fn film_stock_in_use(&self, stock_id: FilmStockId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM rolls WHERE film_stock_id = ? LIMIT 1")
            .bind(stock_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    // ---- rolls ----

    pub async fn add_roll(&self, roll: &Roll) -> Result<RollId> {
        let rec = sqlx::query(
            "INSERT INTO rolls (name, date, unloaded, developed, note, camera_id,
                                film_stock_id, iso, push_pull, format, archived)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&roll.name)
        .bind(roll.date)
        .bind(roll.unloaded)
        .bind(roll.developed)
        .bind(roll.note.as_deref())
        .bind(roll.camera.as_ref().map(|c| c.id.0))
        .bind(roll.film_stock.as_ref().map(|s| s.id.0))
        .bind(roll.iso)
        .bind(roll.push_pull.as_deref())
        .bind(roll.format.value())
        .bind(roll.archived)
        .fetch_one(&self.pool)
        .await?;
        Ok(RollId(rec.get::<i64, _>(0)))
    }

    pub async fn update_roll(&self, roll: &Roll) -> Result<u64> {
        let updated = sqlx::query(
            "UPDATE rolls
             SET name = ?, date = ?, unloaded = ?, developed = ?, note = ?, camera_id = ?,
                 film_stock_id = ?, iso = ?, push_pull = ?, format = ?, archived = ?
             WHERE id = ?",
        )
        .bind(&roll.name)
        .bind(roll.date)
        .bind(roll.unloaded)
        .bind(roll.developed)
        .bind(roll.note.as_deref())
        .bind(roll.camera.as_ref().map(|c| c.id.0))
        .bind(roll.film_stock.as_ref().map(|s| s.id.0))
        .bind(roll.iso)
        .bind(roll.push_pull.as_deref())
        .bind(roll.format.value())
        .bind(roll.archived)
        .bind(roll.id.0)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated)
    }

    /// Frames of the roll go with it (ON DELETE CASCADE).
    pub async fn delete_roll(&self, roll_id: RollId) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM rolls WHERE id = ?")
            .bind(roll_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }

    pub async fn get_roll(&self, roll_id: RollId) -> Result<Option<Roll>> {
        let row = sqlx::query(&format!("{ROLL_SELECT} WHERE r.id = ?"))
            .bind(roll_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(roll_from_row))
    }

    pub async fn get_rolls(&self, filter: RollFilterMode) -> Result<Vec<Roll>> {
        let query = match filter {
            RollFilterMode::Active => {
                format!("{ROLL_SELECT} WHERE r.archived = 0 ORDER BY r.date DESC")
            }
            RollFilterMode::Archived => {
                format!("{ROLL_SELECT} WHERE r.archived = 1 ORDER BY r.date DESC")
            }
            RollFilterMode::All => format!("{ROLL_SELECT} ORDER BY r.date DESC"),
        };
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(roll_from_row).collect())
    }

    /// (active, archived) roll counts.
    pub async fn roll_counts(&self) -> Result<(i64, i64)> {
        let row = sqlx::query(
            "SELECT
                COUNT(*) FILTER (WHERE archived = 0),
                COUNT(*) FILTER (WHERE archived = 1)
             FROM rolls",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok((row.get::<i64, _>(0), row.get::<i64, _>(1)))
    }

    pub async fn frame_count(&self, roll_id: RollId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(id) FROM frames WHERE roll_id = ?")
            .bind(roll_id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ---- frames ----

    pub async fn add_frame(&self, frame: &Frame) -> Result<FrameId> {
        let mut tx = self.pool.begin().await?;
        let rec = sqlx::query(
            "INSERT INTO frames (roll_id, count, date, shutter, aperture, focal_length,
                                 exposure_comp, no_of_exposures, flash_used, light_source,
                                 note, location, formatted_address, lens_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(frame.roll_id.0)
        .bind(frame.count)
        .bind(frame.date)
        .bind(frame.shutter.as_deref())
        .bind(frame.aperture.as_deref())
        .bind(frame.focal_length)
        .bind(frame.exposure_comp.as_deref())
        .bind(frame.no_of_exposures)
        .bind(frame.flash_used)
        .bind(frame.light_source.value())
        .bind(frame.note.as_deref())
        .bind(frame.location.map(|l| l.decimal_string()))
        .bind(frame.formatted_address.as_deref())
        .bind(frame.lens.as_ref().map(|l| l.id.0))
        .fetch_one(&mut *tx)
        .await?;
        let frame_id = FrameId(rec.get::<i64, _>(0));

        for filter in &frame.filters {
            sqlx::query("INSERT INTO frame_filters (frame_id, filter_id) VALUES (?, ?)")
                .bind(frame_id.0)
                .bind(filter.id.0)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(frame_id)
    }

    pub async fn update_frame(&self, frame: &Frame) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE frames
             SET roll_id = ?, count = ?, date = ?, shutter = ?, aperture = ?,
                 focal_length = ?, exposure_comp = ?, no_of_exposures = ?, flash_used = ?,
                 light_source = ?, note = ?, location = ?, formatted_address = ?, lens_id = ?
             WHERE id = ?",
        )
        .bind(frame.roll_id.0)
        .bind(frame.count)
        .bind(frame.date)
        .bind(frame.shutter.as_deref())
        .bind(frame.aperture.as_deref())
        .bind(frame.focal_length)
        .bind(frame.exposure_comp.as_deref())
        .bind(frame.no_of_exposures)
        .bind(frame.flash_used)
        .bind(frame.light_source.value())
        .bind(frame.note.as_deref())
        .bind(frame.location.map(|l| l.decimal_string()))
        .bind(frame.formatted_address.as_deref())
        .bind(frame.lens.as_ref().map(|l| l.id.0))
        .bind(frame.id.0)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated > 0 {
            sqlx::query("DELETE FROM frame_filters WHERE frame_id = ?")
                .bind(frame.id.0)
                .execute(&mut *tx)
                .await?;
            for filter in &frame.filters {
                sqlx::query("INSERT INTO frame_filters (frame_id, filter_id) VALUES (?, ?)")
                    .bind(frame.id.0)
                    .bind(filter.id.0)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_frame(&self, frame_id: FrameId) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM frames WHERE id = ?")
            .bind(frame_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted)
    }

    pub async fn get_frames(&self, roll_id: RollId) -> Result<Vec<Frame>> {
        let rows = sqlx::query(
            "SELECT f.id, f.roll_id, f.count, f.date, f.shutter, f.aperture, f.focal_length,
                    f.exposure_comp, f.no_of_exposures, f.flash_used, f.light_source, f.note,
                    f.location, f.formatted_address,
                    l.id AS lens_id, l.make AS lens_make, l.model AS lens_model,
                    l.serial_number AS lens_serial_number, l.min_aperture AS lens_min_aperture,
                    l.max_aperture AS lens_max_aperture,
                    l.min_focal_length AS lens_min_focal_length,
                    l.max_focal_length AS lens_max_focal_length,
                    l.aperture_increments AS lens_aperture_increments
             FROM frames f
             LEFT JOIN lenses l ON l.id = f.lens_id
             WHERE f.roll_id = ?
             ORDER BY f.count ASC",
        )
        .bind(roll_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut filters_by_frame = self.filters_for_roll(roll_id).await?;
        Ok(rows
            .iter()
            .map(|row| {
                let mut frame = frame_from_row(row);
                frame.filters = filters_by_frame.remove(&frame.id.0).unwrap_or_default();
                frame
            })
            .collect())
    }

    async fn filters_for_roll(&self, roll_id: RollId) -> Result<HashMap<i64, Vec<Filter>>> {
        let rows = sqlx::query(
            "SELECT ff.frame_id, fl.id, fl.make, fl.model
             FROM frame_filters ff
             INNER JOIN filters fl ON fl.id = ff.filter_id
             INNER JOIN frames f ON f.id = ff.frame_id
             WHERE f.roll_id = ?
             ORDER BY lower(fl.make) ASC, lower(fl.model) ASC",
        )
        .bind(roll_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut by_frame: HashMap<i64, Vec<Filter>> = HashMap::new();
        for row in rows {
            by_frame
                .entry(row.get::<i64, _>(0))
                .or_default()
                .push(Filter {
                    id: FilterId(row.get::<i64, _>(1)),
                    make: row.get::<String, _>(2),
                    model: row.get::<String, _>(3),
                });
        }
        Ok(by_frame)
    }
}

const ROLL_SELECT: &str = "SELECT r.id, r.name, r.date, r.unloaded, r.developed, r.note,
        r.iso, r.push_pull, r.format, r.archived,
        c.id AS camera_id, c.make AS camera_make, c.model AS camera_model,
        c.serial_number AS camera_serial_number, c.min_shutter AS camera_min_shutter,
        c.max_shutter AS camera_max_shutter,
        c.shutter_increments AS camera_shutter_increments,
        c.exposure_comp_increments AS camera_exposure_comp_increments,
        c.format AS camera_format,
        s.id AS stock_id, s.make AS stock_make, s.model AS stock_model, s.iso AS stock_iso,
        s.film_type AS stock_film_type, s.process AS stock_process,
        s.is_preadded AS stock_is_preadded
 FROM rolls r
 LEFT JOIN cameras c ON c.id = r.camera_id
 LEFT JOIN film_stocks s ON s.id = r.film_stock_id";

fn camera_from_row(row: &SqliteRow) -> Camera {
    Camera {
        id: CameraId(row.get::<i64, _>(0)),
        make: row.get::<String, _>(1),
        model: row.get::<String, _>(2),
        serial_number: row.get::<Option<String>, _>(3),
        min_shutter: row.get::<Option<String>, _>(4),
        max_shutter: row.get::<Option<String>, _>(5),
        shutter_increments: Increment::from_value(row.get::<i64, _>(6) as i32),
        exposure_comp_increments: PartialIncrement::from_value(row.get::<i64, _>(7) as i32),
        format: Format::from_value(row.get::<i64, _>(8) as i32),
    }
}

fn lens_from_row(row: &SqliteRow) -> Lens {
    Lens {
        id: LensId(row.get::<i64, _>(0)),
        make: row.get::<String, _>(1),
        model: row.get::<String, _>(2),
        serial_number: row.get::<Option<String>, _>(3),
        min_aperture: row.get::<Option<String>, _>(4),
        max_aperture: row.get::<Option<String>, _>(5),
        min_focal_length: row.get::<i64, _>(6) as i32,
        max_focal_length: row.get::<i64, _>(7) as i32,
        aperture_increments: Increment::from_value(row.get::<i64, _>(8) as i32),
    }
}

fn film_stock_from_row(row: &SqliteRow) -> FilmStock {
    FilmStock {
        id: FilmStockId(row.get::<i64, _>(0)),
        make: row.get::<String, _>(1),
        model: row.get::<String, _>(2),
        iso: row.get::<i64, _>(3) as i32,
        film_type: FilmType::from_value(row.get::<i64, _>(4) as i32),
        process: FilmProcess::from_value(row.get::<i64, _>(5) as i32),
        is_preadded: row.get::<bool, _>(6),
    }
}

fn roll_from_row(row: &SqliteRow) -> Roll {
    let camera = row.get::<Option<i64>, _>("camera_id").map(|id| Camera {
        id: CameraId(id),
        make: row.get::<String, _>("camera_make"),
        model: row.get::<String, _>("camera_model"),
        serial_number: row.get::<Option<String>, _>("camera_serial_number"),
        min_shutter: row.get::<Option<String>, _>("camera_min_shutter"),
        max_shutter: row.get::<Option<String>, _>("camera_max_shutter"),
        shutter_increments: Increment::from_value(
            row.get::<i64, _>("camera_shutter_increments") as i32,
        ),
        exposure_comp_increments: PartialIncrement::from_value(
            row.get::<i64, _>("camera_exposure_comp_increments") as i32,
        ),
        format: Format::from_value(row.get::<i64, _>("camera_format") as i32),
    });
    let film_stock = row.get::<Option<i64>, _>("stock_id").map(|id| FilmStock {
        id: FilmStockId(id),
        make: row.get::<String, _>("stock_make"),
        model: row.get::<String, _>("stock_model"),
        iso: row.get::<i64, _>("stock_iso") as i32,
        film_type: FilmType::from_value(row.get::<i64, _>("stock_film_type") as i32),
        process: FilmProcess::from_value(row.get::<i64, _>("stock_process") as i32),
        is_preadded: row.get::<bool, _>("stock_is_preadded"),
    });

    Roll {
        id: RollId(row.get::<i64, _>("id")),
        name: row.get::<String, _>("name"),
        date: row.get::<NaiveDateTime, _>("date"),
        unloaded: row.get::<Option<NaiveDateTime>, _>("unloaded"),
        developed: row.get::<Option<NaiveDateTime>, _>("developed"),
        note: row.get::<Option<String>, _>("note"),
        camera,
        film_stock,
        iso: row.get::<i64, _>("iso") as i32,
        push_pull: row.get::<Option<String>, _>("push_pull"),
        format: Format::from_value(row.get::<i64, _>("format") as i32),
        archived: row.get::<bool, _>("archived"),
    }
}

fn frame_from_row(row: &SqliteRow) -> Frame {
    let lens = row.get::<Option<i64>, _>("lens_id").map(|id| Lens {
        id: LensId(id),
        make: row.get::<String, _>("lens_make"),
        model: row.get::<String, _>("lens_model"),
        serial_number: row.get::<Option<String>, _>("lens_serial_number"),
        min_aperture: row.get::<Option<String>, _>("lens_min_aperture"),
        max_aperture: row.get::<Option<String>, _>("lens_max_aperture"),
        min_focal_length: row.get::<i64, _>("lens_min_focal_length") as i32,
        max_focal_length: row.get::<i64, _>("lens_max_focal_length") as i32,
        aperture_increments: Increment::from_value(
            row.get::<i64, _>("lens_aperture_increments") as i32,
        ),
    });

    Frame {
        id: FrameId(row.get::<i64, _>("id")),
        roll_id: RollId(row.get::<i64, _>("roll_id")),
        count: row.get::<i64, _>("count") as i32,
        date: row.get::<NaiveDateTime, _>("date"),
        shutter: row.get::<Option<String>, _>("shutter"),
        aperture: row.get::<Option<String>, _>("aperture"),
        focal_length: row.get::<i64, _>("focal_length") as i32,
        exposure_comp: row.get::<Option<String>, _>("exposure_comp"),
        no_of_exposures: row.get::<i64, _>("no_of_exposures") as i32,
        flash_used: row.get::<bool, _>("flash_used"),
        light_source: LightSource::from_value(row.get::<i64, _>("light_source") as i32),
        note: row.get::<Option<String>, _>("note"),
        location: row
            .get::<Option<String>, _>("location")
            .as_deref()
            .and_then(LatLng::parse),
        formatted_address: row.get::<Option<String>, _>("formatted_address"),
        lens,
        filters: Vec::new(),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
