use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use app_core::{
    export, FilmStocksController, FramesController, GearController, PreferencesStore,
    RollsController,
};
use shared::{
    domain::{
        Camera, CameraId, FilmStock, FilmStockId, Frame, FrameSortMode, Lens, LensId, Roll,
        RollFilterMode, RollId, RollSortMode,
    },
    location::LatLng,
};
use storage::Storage;

#[derive(Parser, Debug)]
#[command(name = "filmlog", about = "Analog film photography logbook")]
struct Cli {
    #[arg(long, default_value = "sqlite://filmlog.db")]
    database_url: String,
    #[arg(long, default_value = "filmlog-prefs.toml")]
    prefs_path: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List rolls using the persisted filter/sort modes, or overrides.
    ListRolls {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        sort: Option<String>,
    },
    AddRoll {
        name: String,
        #[arg(long)]
        camera_id: Option<i64>,
        #[arg(long)]
        film_stock_id: Option<i64>,
        #[arg(long)]
        iso: Option<i32>,
        #[arg(long)]
        note: Option<String>,
    },
    ArchiveRoll {
        roll_id: i64,
    },
    UnarchiveRoll {
        roll_id: i64,
    },
    DeleteRoll {
        roll_id: i64,
    },
    Counts,
    ListFrames {
        roll_id: i64,
        #[arg(long)]
        sort: Option<String>,
    },
    AddFrame {
        roll_id: i64,
        count: i32,
        #[arg(long)]
        shutter: Option<String>,
        #[arg(long)]
        aperture: Option<String>,
        #[arg(long)]
        lens_id: Option<i64>,
        /// Capture location as "lat lng" in decimal degrees.
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    ListCameras,
    AddCamera {
        make: String,
        model: String,
    },
    ListLenses,
    AddLens {
        make: String,
        model: String,
    },
    ListFilmStocks,
    AddFilmStock {
        make: String,
        model: String,
        iso: i32,
    },
    /// Export a roll and its frames as a JSON document.
    ExportJson {
        roll_id: i64,
    },
    /// Print one exiftool argument string per frame.
    ExportExiftool {
        roll_id: i64,
    },
}

fn parse_filter_mode(value: &str) -> Result<RollFilterMode> {
    match value.to_ascii_lowercase().as_str() {
        "active" => Ok(RollFilterMode::Active),
        "archived" => Ok(RollFilterMode::Archived),
        "all" => Ok(RollFilterMode::All),
        other => Err(anyhow!("unknown filter mode '{other}'")),
    }
}

fn parse_roll_sort_mode(value: &str) -> Result<RollSortMode> {
    match value.to_ascii_lowercase().as_str() {
        "date" => Ok(RollSortMode::Date),
        "name" => Ok(RollSortMode::Name),
        "camera" => Ok(RollSortMode::Camera),
        other => Err(anyhow!("unknown sort mode '{other}'")),
    }
}

fn parse_frame_sort_mode(value: &str) -> Result<FrameSortMode> {
    match value.to_ascii_lowercase().as_str() {
        "count" => Ok(FrameSortMode::FrameCount),
        "date" => Ok(FrameSortMode::Date),
        "f-stop" => Ok(FrameSortMode::FStop),
        "shutter" => Ok(FrameSortMode::ShutterSpeed),
        "lens" => Ok(FrameSortMode::Lens),
        other => Err(anyhow!("unknown frame sort mode '{other}'")),
    }
}

async fn roll_or_fail(storage: &Storage, roll_id: i64) -> Result<Roll> {
    storage
        .get_roll(RollId(roll_id))
        .await?
        .ok_or_else(|| anyhow!("no roll with id {roll_id}"))
}

async fn set_roll_archived(
    storage: Storage,
    prefs: Arc<PreferencesStore>,
    roll_id: i64,
    archived: bool,
) -> Result<()> {
    let mut roll = roll_or_fail(&storage, roll_id).await?;
    roll.archived = archived;
    let rolls = RollsController::new(Arc::new(storage), prefs);
    rolls.submit_roll(roll).await?;
    Ok(())
}

fn print_roll(roll: &Roll, frame_count: i64) {
    let camera = roll
        .camera
        .as_ref()
        .map(Camera::name)
        .unwrap_or_else(|| "-".into());
    let stock = roll
        .film_stock
        .as_ref()
        .map(FilmStock::name)
        .unwrap_or_else(|| "-".into());
    let archived = if roll.archived { " [archived]" } else { "" };
    println!(
        "{:>4}  {}  {}  camera: {}  film: {}  frames: {}{}",
        roll.id.0,
        roll.date.format("%Y-%m-%d"),
        roll.name,
        camera,
        stock,
        frame_count,
        archived
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;
    let prefs = Arc::new(PreferencesStore::open(&cli.prefs_path));

    match cli.command {
        Command::ListRolls { filter, sort } => {
            let rolls = RollsController::new(Arc::new(storage.clone()), Arc::clone(&prefs));
            if let Some(filter) = filter {
                let load = rolls.set_filter_mode(parse_filter_mode(&filter)?).await?;
                load.await?;
            } else {
                rolls.spawn_rolls_load().await.await?;
            }
            if let Some(sort) = sort {
                rolls.set_sort_mode(parse_roll_sort_mode(&sort)?).await?;
            }
            for roll in rolls.rolls().await {
                let frames = storage.frame_count(roll.id).await?;
                print_roll(&roll, frames);
            }
        }
        Command::AddRoll {
            name,
            camera_id,
            film_stock_id,
            iso,
            note,
        } => {
            let mut roll = Roll::new(name, Local::now().naive_local());
            if let Some(camera_id) = camera_id {
                let cameras = storage.list_cameras().await?;
                roll.camera = cameras.into_iter().find(|c| c.id == CameraId(camera_id));
                if roll.camera.is_none() {
                    return Err(anyhow!("no camera with id {camera_id}"));
                }
            }
            if let Some(stock_id) = film_stock_id {
                let stocks = storage.list_film_stocks().await?;
                roll.film_stock = stocks
                    .into_iter()
                    .find(|s| s.id == FilmStockId(stock_id));
                if roll.film_stock.is_none() {
                    return Err(anyhow!("no film stock with id {stock_id}"));
                }
            }
            roll.iso = iso.or(roll.film_stock.as_ref().map(|s| s.iso)).unwrap_or(0);
            roll.note = note;

            let rolls = RollsController::new(Arc::new(storage), prefs);
            let roll = rolls.submit_roll(roll).await?;
            println!("created roll id={}", roll.id.0);
        }
        Command::ArchiveRoll { roll_id } => {
            set_roll_archived(storage, prefs, roll_id, true).await?;
            println!("roll {roll_id} archived");
        }
        Command::UnarchiveRoll { roll_id } => {
            set_roll_archived(storage, prefs, roll_id, false).await?;
            println!("roll {roll_id} unarchived");
        }
        Command::DeleteRoll { roll_id } => {
            let roll = roll_or_fail(&storage, roll_id).await?;
            let rolls = RollsController::new(Arc::new(storage), prefs);
            rolls.delete_roll(&roll).await?;
            println!("deleted roll {roll_id} and its frames");
        }
        Command::Counts => {
            let (active, archived) = storage.roll_counts().await?;
            println!("active: {active}  archived: {archived}");
        }
        Command::ListFrames { roll_id, sort } => {
            let roll = roll_or_fail(&storage, roll_id).await?;
            let frames = FramesController::new(storage, prefs, roll.id);
            if let Some(sort) = sort {
                frames.set_sort_mode(parse_frame_sort_mode(&sort)?).await?;
            }
            frames.spawn_load().await?;
            for frame in frames.frames().await {
                let lens = frame
                    .lens
                    .as_ref()
                    .map(|l| l.name())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "#{:<3} {}  {} @ {}  lens: {}  {}",
                    frame.count,
                    frame.date.format("%Y-%m-%d %H:%M"),
                    frame.shutter.as_deref().unwrap_or("-"),
                    frame.aperture.as_deref().unwrap_or("-"),
                    lens,
                    frame.note.as_deref().unwrap_or("")
                );
            }
        }
        Command::AddFrame {
            roll_id,
            count,
            shutter,
            aperture,
            lens_id,
            location,
            note,
        } => {
            let roll = roll_or_fail(&storage, roll_id).await?;
            let mut frame = Frame::new(roll.id, count, Local::now().naive_local());
            frame.shutter = shutter;
            frame.aperture = aperture;
            frame.note = note;
            if let Some(location) = location {
                frame.location = Some(
                    LatLng::parse(&location)
                        .ok_or_else(|| anyhow!("invalid location '{location}'"))?,
                );
            }
            if let Some(lens_id) = lens_id {
                let lenses = storage.list_lenses().await?;
                frame.lens = lenses.into_iter().find(|l| l.id == LensId(lens_id));
                if frame.lens.is_none() {
                    return Err(anyhow!("no lens with id {lens_id}"));
                }
            }
            let frames = FramesController::new(storage, prefs, roll.id);
            let frame = frames.submit_frame(frame).await?;
            println!("created frame id={}", frame.id.0);
        }
        Command::ListCameras => {
            for camera in storage.list_cameras().await? {
                println!("{:>4}  {}", camera.id.0, camera.name());
            }
        }
        Command::AddCamera { make, model } => {
            let gear = GearController::new(storage);
            let camera = gear
                .submit_camera(Camera {
                    make,
                    model,
                    ..Camera::default()
                })
                .await?;
            println!("created camera id={}", camera.id.0);
        }
        Command::ListLenses => {
            for lens in storage.list_lenses().await? {
                println!("{:>4}  {}", lens.id.0, lens.name());
            }
        }
        Command::AddLens { make, model } => {
            let gear = GearController::new(storage);
            let lens = gear
                .submit_lens(Lens {
                    make,
                    model,
                    ..Lens::default()
                })
                .await?;
            println!("created lens id={}", lens.id.0);
        }
        Command::ListFilmStocks => {
            let stocks = FilmStocksController::new(storage);
            stocks.spawn_load().await?;
            for stock in stocks.film_stocks().await {
                let origin = if stock.is_preadded { "" } else { " [user]" };
                println!(
                    "{:>4}  {}  ISO {}{}",
                    stock.id.0,
                    stock.name(),
                    stock.iso,
                    origin
                );
            }
        }
        Command::AddFilmStock { make, model, iso } => {
            let stocks = FilmStocksController::new(storage);
            let stock = stocks
                .submit_film_stock(FilmStock {
                    make,
                    model,
                    iso,
                    ..FilmStock::default()
                })
                .await?;
            println!("created film stock id={}", stock.id.0);
        }
        Command::ExportJson { roll_id } => {
            let roll = roll_or_fail(&storage, roll_id).await?;
            let frames = storage.get_frames(roll.id).await?;
            println!("{}", export::roll_to_json(&roll, &frames)?);
        }
        Command::ExportExiftool { roll_id } => {
            let roll = roll_or_fail(&storage, roll_id).await?;
            let frames = storage.get_frames(roll.id).await?;
            for (frame, args) in frames.iter().zip(export::exiftool_commands(&roll, &frames)) {
                println!("# frame {}", frame.count);
                println!("exiftool {args} <file>");
            }
        }
    }

    Ok(())
}
