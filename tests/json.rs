// Test serialization using json
#![cfg(feature = "serde")]

use kas_scale::geom::{Insets, Size};
use kas_scale::{EnvConfig, HiDpiMode, RoundingMode, ScaleType, ScaleTypes};
use serde::{de::Deserialize, ser::Serialize};
use std::cmp::PartialEq;
use std::fmt::Debug;

fn test<X: Debug + PartialEq + Serialize + for<'a> Deserialize<'a>>(x: X, t: &str) {
    match serde_json::to_string(&x) {
        Ok(text) => assert_eq!(text, t),
        Err(err) => panic!("Ser of '{x:?}' failed: {err}"),
    }

    match serde_json::from_str::<X>(t) {
        Ok(v) => assert_eq!(v, x),
        Err(err) => panic!("Deser of '{t}' failed: {err}"),
    }
}

#[test]
fn enums() {
    test(ScaleType::Object, "\"Object\"");
    test(HiDpiMode::DeviceScale, "\"DeviceScale\"");
    test(RoundingMode::Ceil, "\"Ceil\"");
}

#[test]
fn geom() {
    test(Size::new(3, 4), "{\"width\":3,\"height\":4}");
    test(
        Insets::new(1, 2, 3, 4),
        "{\"top\":1,\"left\":2,\"bottom\":3,\"right\":4}",
    );
}

#[test]
fn config() {
    test(
        EnvConfig {
            user_scale: 1.5,
            system_scale: 2.0,
            hidpi_mode: HiDpiMode::DeviceScale,
        },
        "{\"user_scale\":1.5,\"system_scale\":2.0,\"hidpi_mode\":\"DeviceScale\"}",
    );

    let partial: EnvConfig = serde_json::from_str("{\"user_scale\":1.25}").unwrap();
    assert_eq!(
        partial,
        EnvConfig {
            user_scale: 1.25,
            ..Default::default()
        }
    );
}

#[test]
fn scale_types() {
    let set = ScaleTypes::USER | ScaleTypes::OBJECT;
    let text = serde_json::to_string(&set).unwrap();
    let back: ScaleTypes = serde_json::from_str(&text).unwrap();
    assert_eq!(back, set);
}
