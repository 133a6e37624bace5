#![no_main]

use libfuzzer_sys::fuzz_target;
use mangaview::tap_zone::{TapPoint, TapZoneInvertMode, TapZoneLayout, classify};

fuzz_target!(|data: &[u8]| {
    if data.len() < 17 {
        return;
    }
    let x = f64::from_le_bytes(data[0..8].try_into().unwrap());
    let y = f64::from_le_bytes(data[8..16].try_into().unwrap());
    let layout = TapZoneLayout::ALL[data[16] as usize % TapZoneLayout::ALL.len()];
    let normal = TapZoneInvertMode::default();
    let both = TapZoneInvertMode {
        horizontal: true,
        vertical: true,
    };

    // Total for any input, NaN and infinities included.
    let zone = classify(layout, normal, TapPoint::new(x, y));

    // Inverting both axes equals mirroring the point.
    if x.is_finite() && y.is_finite() {
        let (cx, cy) = (x.clamp(0.0, 100.0), y.clamp(0.0, 100.0));
        assert_eq!(
            classify(layout, both, TapPoint::new(cx, cy)),
            classify(layout, normal, TapPoint::new(100.0 - cx, 100.0 - cy)),
            "layout={layout:?} point=({cx}, {cy})"
        );
    }

    if layout == TapZoneLayout::Disabled {
        assert_eq!(zone, mangaview::TapZoneRegionType::Menu);
    }
});
