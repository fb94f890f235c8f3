//! Comparators for the list views. All sorts are stable: entries with equal
//! keys keep their relative order.

use std::cmp::Ordering;

use crate::domain::{FilmStock, FilmStockSortMode, Frame, FrameSortMode, Roll, RollSortMode};

pub fn sort_rolls(rolls: &mut [Roll], mode: RollSortMode) {
    match mode {
        // Newest first.
        RollSortMode::Date => rolls.sort_by(|a, b| b.date.cmp(&a.date)),
        RollSortMode::Name => rolls.sort_by(|a, b| name_key(&a.name).cmp(&name_key(&b.name))),
        // Rolls without a camera go last.
        RollSortMode::Camera => rolls.sort_by(|a, b| {
            none_last(
                a.camera.as_ref().map(|c| name_key(&c.name())),
                b.camera.as_ref().map(|c| name_key(&c.name())),
            )
        }),
    }
}

pub fn sort_film_stocks(stocks: &mut [FilmStock], mode: FilmStockSortMode) {
    match mode {
        FilmStockSortMode::Name => {
            stocks.sort_by(|a, b| name_key(&a.name()).cmp(&name_key(&b.name())))
        }
        FilmStockSortMode::Iso => stocks.sort_by(|a, b| {
            a.iso
                .cmp(&b.iso)
                .then_with(|| name_key(&a.name()).cmp(&name_key(&b.name())))
        }),
    }
}

pub fn sort_frames(frames: &mut [Frame], mode: FrameSortMode) {
    match mode {
        FrameSortMode::FrameCount => frames.sort_by(|a, b| a.count.cmp(&b.count)),
        // Oldest first.
        FrameSortMode::Date => frames.sort_by(|a, b| a.date.cmp(&b.date)),
        // Wide open first; unparsable apertures go last.
        FrameSortMode::FStop => frames.sort_by(|a, b| {
            none_last_f64(
                a.aperture.as_deref().and_then(aperture_value),
                b.aperture.as_deref().and_then(aperture_value),
            )
        }),
        // Longest exposure first; unparsable shutters go last.
        FrameSortMode::ShutterSpeed => frames.sort_by(|a, b| {
            let a_secs = a.shutter.as_deref().and_then(shutter_seconds);
            let b_secs = b.shutter.as_deref().and_then(shutter_seconds);
            match (a_secs, b_secs) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        // Frames without a lens go last.
        FrameSortMode::Lens => frames.sort_by(|a, b| {
            none_last(
                a.lens.as_ref().map(|l| name_key(&l.name())),
                b.lens.as_ref().map(|l| name_key(&l.name())),
            )
        }),
    }
}

/// Parses an aperture string like "2.8" or "f/2.8" into its numeric value.
pub fn aperture_value(aperture: &str) -> Option<f64> {
    let trimmed = aperture.trim().trim_start_matches("f/");
    trimmed.replace(',', ".").parse().ok()
}

/// Parses a shutter string into seconds: "1/125" as a fraction, "0.7" as
/// decimal seconds, "30\"" as whole seconds. "B" and friends yield `None`.
pub fn shutter_seconds(shutter: &str) -> Option<f64> {
    let trimmed = shutter.trim();
    if let Some((numerator, denominator)) = trimmed.split_once('/') {
        let numerator: f64 = numerator.trim().parse().ok()?;
        let denominator: f64 = denominator.trim().parse().ok()?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator);
    }
    trimmed.trim_end_matches('"').replace(',', ".").parse().ok()
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

fn none_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn none_last_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
