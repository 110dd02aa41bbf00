//! CSV export of cast timelines and attack events.

use std::io;
use std::path::Path;

use serde::Serialize;

use crate::combat::engine::AttackEvent;
use crate::error::FileError;
use crate::scheduler::CastEvent;

#[derive(Debug, Serialize)]
struct AttackRow<'a> {
    source: &'a str,
    time: f64,
    damage: f64,
}

#[derive(Debug, Serialize)]
struct CastRow<'a> {
    source: &'a str,
    timestamp_ms: u64,
    combo_index: u32,
}

/// One header row (`source,time,damage`) then one row per event.
pub fn write_attack_events<W: io::Write>(writer: W, events: &[AttackEvent]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for event in events {
        let label = event.source.label();
        out.serialize(AttackRow {
            source: &label,
            time: event.time,
            damage: event.damage,
        })?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_cast_timeline<W: io::Write>(writer: W, casts: &[CastEvent]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for cast in casts {
        let label = cast.source.label();
        out.serialize(CastRow {
            source: &label,
            timestamp_ms: cast.timestamp_ms,
            combo_index: cast.combo_index,
        })?;
    }
    out.flush()?;
    Ok(())
}

pub fn export_attack_events(path: impl AsRef<Path>, events: &[AttackEvent]) -> Result<(), FileError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_attack_events(file, events).map_err(|source| FileError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {} attack events to {}", events.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::CastSource;

    #[test]
    fn attack_rows_use_source_labels() {
        let events = [
            AttackEvent {
                source: CastSource::Slot(2),
                time: 0.15,
                damage: 12.5,
            },
            AttackEvent {
                source: CastSource::Basic,
                time: 1.0,
                damage: 3.0,
            },
        ];
        let mut buf = Vec::new();
        write_attack_events(&mut buf, &events).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "source,time,damage\nslot2,0.15,12.5\nbasic,1.0,3.0\n");
    }

    #[test]
    fn cast_rows_keep_combo_index() {
        let casts = [CastEvent {
            source: CastSource::Slot(0),
            timestamp_ms: 400,
            combo_index: 1,
        }];
        let mut buf = Vec::new();
        write_cast_timeline(&mut buf, &casts).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "source,timestamp_ms,combo_index\nslot0,400,1\n");
    }

    #[test]
    fn export_to_missing_directory_reports_path() {
        let err = export_attack_events("/nonexistent-dir/out.csv", &[]).unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/out.csv"));
    }
}
