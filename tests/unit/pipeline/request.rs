use super::*;
use crate::positions::table::{PositionEntry, PositionTable};

fn tables() -> PositionTables {
    PositionTables::new().with(
        "2.gif",
        PositionTable::new(vec![PositionEntry::new(0, 0, 8)]).unwrap(),
    )
}

fn valid() -> AvatarRequest {
    AvatarRequest::from_avatar_bytes(b"\x89PNG fake", 100.0, "2.gif", 0.0)
}

#[test]
fn json_body_field_names() {
    let req: AvatarRequest = serde_json::from_str(
        r#"{ "base64": "AAEC", "delay": 80, "selectedSource": "2.gif", "rotate": 45 }"#,
    )
    .unwrap();
    assert_eq!(req.avatar_base64.as_deref(), Some("AAEC"));
    assert_eq!(req.delay, Some(80.0));
    assert_eq!(req.source_name.as_deref(), Some("2.gif"));
    assert_eq!(req.rotation_degrees, Some(45.0));

    let v = req.validate(&tables()).unwrap();
    assert_eq!(v.avatar, vec![0, 1, 2]);
    assert_eq!(v.delay.millis(), 80);
    assert_eq!(v.rotation.degrees(), 45.0);
}

#[test]
fn missing_fields_are_validation_errors() {
    let t = tables();
    for req in [
        AvatarRequest {
            avatar_base64: None,
            ..valid()
        },
        AvatarRequest {
            avatar_base64: Some("  ".to_string()),
            ..valid()
        },
        AvatarRequest {
            delay: None,
            ..valid()
        },
        AvatarRequest {
            source_name: None,
            ..valid()
        },
    ] {
        assert!(
            matches!(req.validate(&t), Err(AvatarGifError::Validation(_))),
            "{req:?}"
        );
    }
}

#[test]
fn rotation_defaults_to_zero_and_is_range_checked() {
    let t = tables();
    let none = AvatarRequest {
        rotation_degrees: None,
        ..valid()
    };
    assert!(none.validate(&t).unwrap().rotation.is_identity());

    let over = AvatarRequest {
        rotation_degrees: Some(400.0),
        ..valid()
    };
    assert!(matches!(
        over.validate(&t),
        Err(AvatarGifError::Validation(_))
    ));

    let negative = AvatarRequest {
        rotation_degrees: Some(-1.0),
        ..valid()
    };
    assert!(negative.validate(&t).is_err());
}

#[test]
fn delay_must_be_positive_milliseconds() {
    let t = tables();
    for delay in [0.0, -5.0, 0.4, f64::NAN] {
        let req = AvatarRequest {
            delay: Some(delay),
            ..valid()
        };
        assert!(req.validate(&t).is_err(), "delay {delay}");
    }
    let req = AvatarRequest {
        delay: Some(66.6),
        ..valid()
    };
    assert_eq!(req.validate(&t).unwrap().delay.millis(), 67);
}

#[test]
fn unknown_or_path_like_sources_are_rejected() {
    let t = tables();
    let unknown = AvatarRequest {
        source_name: Some("9.gif".to_string()),
        ..valid()
    };
    assert!(matches!(
        unknown.validate(&t),
        Err(AvatarGifError::SourceNotFound(_))
    ));

    let traversal = AvatarRequest {
        source_name: Some("../2.gif".to_string()),
        ..valid()
    };
    assert!(matches!(
        traversal.validate(&t),
        Err(AvatarGifError::Validation(_))
    ));
}

#[test]
fn data_uri_prefix_is_stripped() {
    assert_eq!(
        decode_base64_payload("data:image/png;base64,AAEC").unwrap(),
        vec![0, 1, 2]
    );
    assert_eq!(decode_base64_payload("AA\nEC").unwrap(), vec![0, 1, 2]);
    assert!(decode_base64_payload("data:image/png;base64").is_err());
    assert!(decode_base64_payload("!!!").is_err());
}
