//! Exercises the optional `serde` feature: a decoded `SaveFile` must survive
//! a JSON round-trip with its structure intact, for callers (the web
//! inspector) that shape the property tree into JSON.

#![cfg(feature = "serde")]

use gvas_save::header::{FileVersion, GvasHeader};
use gvas_save::properties::{ArrayBody, ArrayValue, PropertyRecord, PropertyValue};
use gvas_save::types::Guid;
use gvas_save::SaveFile;

fn sample_save() -> SaveFile {
    SaveFile {
        header: GvasHeader {
            save_game_version: 2,
            file_version: FileVersion::Dual { ue4: 522, ue5: 0 },
            engine_version: gvas_save::engine_version::EngineVersion {
                major: 5,
                minor: 1,
                patch: 1,
                changelist: 0,
                branch: String::new(),
            },
            custom_versions_format: Some(3),
            custom_versions: vec![gvas_save::custom_version::CustomVersion::new(
                Guid::ZERO,
                1,
            )],
            save_game_class_name: "/Game/A.B_C".to_string(),
        },
        properties: vec![PropertyRecord {
            name: "Inventory".to_string(),
            tag: 0,
            value: PropertyValue::Array(ArrayValue {
                inner_type: "IntProperty".to_string(),
                count: 2,
                body: ArrayBody::Int(vec![1, 2]),
            }),
        }],
    }
}

#[test]
fn savefile_survives_json_round_trip() {
    let save = sample_save();
    let json = serde_json::to_string(&save).unwrap();
    let decoded: SaveFile = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, save);
}
