//! Roll export: a JSON document for archival, and per-frame exiftool
//! argument strings for writing the metadata back into scanned images.

use anyhow::Result;
use serde::Serialize;

use shared::domain::{Frame, Roll};

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M";

#[derive(Serialize)]
struct RollExport<'a> {
    #[serde(flatten)]
    roll: &'a Roll,
    frames: &'a [Frame],
}

/// Pretty JSON document of a roll and its frames.
pub fn roll_to_json(roll: &Roll, frames: &[Frame]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&RollExport { roll, frames })?)
}

/// One exiftool argument string per frame, in the given frame order. The
/// caller appends the target file name.
pub fn exiftool_commands(roll: &Roll, frames: &[Frame]) -> Vec<String> {
    frames
        .iter()
        .map(|frame| exiftool_arguments(roll, frame))
        .collect()
}

fn exiftool_arguments(roll: &Roll, frame: &Frame) -> String {
    let mut args: Vec<String> = Vec::new();
    args.push(format!(
        "-DateTimeOriginal=\"{}\"",
        frame.date.format(EXIF_DATETIME_FORMAT)
    ));
    if let Some(shutter) = &frame.shutter {
        args.push(format!("-ShutterSpeedValue=\"{shutter}\""));
        args.push(format!("-ExposureTime=\"{shutter}\""));
    }
    if let Some(aperture) = &frame.aperture {
        args.push(format!("-ApertureValue=\"{aperture}\""));
        args.push(format!("-FNumber=\"{aperture}\""));
    }
    if roll.iso > 0 {
        args.push(format!("-ISO={}", roll.iso));
    }
    if frame.focal_length > 0 {
        args.push(format!("-FocalLength=\"{}\"", frame.focal_length));
    }
    if let Some(camera) = &roll.camera {
        args.push(format!("-Make=\"{}\"", camera.make));
        args.push(format!("-Model=\"{}\"", camera.model));
    }
    if let Some(lens) = &frame.lens {
        args.push(format!("-LensMake=\"{}\"", lens.make));
        args.push(format!("-LensModel=\"{}\"", lens.model));
    }
    if let Some(location) = frame.location {
        args.push(location.exiftool_args());
    }
    if let Some(note) = &frame.note {
        args.push(format!("-ImageDescription=\"{}\"", note.replace('"', "'")));
    }
    args.join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use shared::{
        domain::{Camera, Lens, RollId},
        location::LatLng,
    };

    fn sample_roll_and_frame() -> (Roll, Frame) {
        let date = NaiveDate::from_ymd_opt(2023, 5, 1)
            .expect("date")
            .and_hms_opt(14, 30, 0)
            .expect("time");
        let mut roll = Roll::new("Export roll", date);
        roll.id = RollId(3);
        roll.iso = 400;
        roll.camera = Some(Camera {
            make: "Canon".into(),
            model: "A-1".into(),
            ..Camera::default()
        });

        let mut frame = Frame::new(roll.id, 1, date);
        frame.shutter = Some("1/125".into());
        frame.aperture = Some("2.8".into());
        frame.focal_length = 28;
        frame.note = Some("test \"frame\" note".into());
        frame.location = Some(LatLng {
            latitude: 35.0,
            longitude: 35.0,
        });
        frame.lens = Some(Lens {
            make: "Canon".into(),
            model: "FD 28mm f/2.8".into(),
            ..Lens::default()
        });
        (roll, frame)
    }

    #[test]
    fn json_export_carries_roll_fields_and_frames() {
        let (roll, frame) = sample_roll_and_frame();
        let json = roll_to_json(&roll, &[frame]).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["name"], "Export roll");
        assert_eq!(value["iso"], 400);
        assert_eq!(value["frames"].as_array().expect("frames").len(), 1);
        assert_eq!(value["frames"][0]["shutter"], "1/125");
    }

    #[test]
    fn exiftool_arguments_cover_exposure_gear_and_gps() {
        let (roll, frame) = sample_roll_and_frame();
        let commands = exiftool_commands(&roll, &[frame]);
        assert_eq!(commands.len(), 1);
        let args = &commands[0];
        assert!(args.contains("-DateTimeOriginal=\"2023:05:01 14:30\""));
        assert!(args.contains("-ExposureTime=\"1/125\""));
        assert!(args.contains("-FNumber=\"2.8\""));
        assert!(args.contains("-ISO=400"));
        assert!(args.contains("-Make=\"Canon\""));
        assert!(args.contains("-LensModel=\"FD 28mm f/2.8\""));
        assert!(args.contains("-GPSLatitudeRef=\"N\""));
        // Double quotes in notes would break the argument string.
        assert!(args.contains("-ImageDescription=\"test 'frame' note\""));
    }

    #[test]
    fn sparse_frame_omits_absent_tags() {
        let (roll, _) = sample_roll_and_frame();
        let date = NaiveDate::from_ymd_opt(2023, 5, 2)
            .expect("date")
            .and_hms_opt(9, 0, 0)
            .expect("time");
        let bare = Frame::new(roll.id, 2, date);
        let args = &exiftool_commands(&roll, &[bare])[0];
        assert!(args.contains("-DateTimeOriginal="));
        assert!(!args.contains("-ExposureTime"));
        assert!(!args.contains("-GPSLatitude"));
        assert!(!args.contains("-ImageDescription"));
    }
}
