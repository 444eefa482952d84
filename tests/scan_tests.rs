use proptest::prelude::*;
use wifi_connect::{classify, signal_tier, AccessPoint, ScanResultStore, SecurityClass};

fn access_point() -> impl Strategy<Value = AccessPoint> {
    (
        prop_oneof![Just(String::new()), "[A-Za-z0-9 ]{1,12}"],
        prop_oneof![
            Just("[ESS]"),
            Just("[WPA2-PSK-CCMP][ESS]"),
            Just("[WEP][ESS]"),
            Just("[WPA2-EAP-CCMP][ESS]"),
        ],
        -120i32..0,
    )
        .prop_map(|(ssid, caps, level)| AccessPoint::new(ssid, caps, level))
}

proptest! {
    #[test]
    fn prop_presented_list_is_sorted(batch in prop::collection::vec(access_point(), 0..40)) {
        let mut store = ScanResultStore::default();
        store.replace(batch);

        for pair in store.access_points().windows(2) {
            prop_assert!(pair[0].level >= pair[1].level);
        }
    }

    #[test]
    fn prop_hidden_networks_never_presented(batch in prop::collection::vec(access_point(), 0..40)) {
        let visible = batch.iter().filter(|ap| !ap.ssid.is_empty()).count();

        let mut store = ScanResultStore::default();
        store.replace(batch);

        prop_assert_eq!(store.len(), visible);
        prop_assert!(store.rows().iter().all(|row| !row.ssid.is_empty()));
    }

    #[test]
    fn prop_wep_always_wins(prefix in "[A-Z\\[\\]-]{0,10}", suffix in "[A-Z\\[\\]-]{0,10}") {
        let tags = format!("{prefix}WEP{suffix}");
        prop_assert_eq!(classify(&tags), SecurityClass::Wep);
    }

    #[test]
    fn prop_open_without_markers(tags in "[a-z0-9\\[\\]+-]{0,24}") {
        prop_assert_eq!(classify(&tags), SecurityClass::Open);
    }

    #[test]
    fn prop_tier_is_monotonic(a in -200i32..20, b in -200i32..20) {
        if a >= b {
            prop_assert!(signal_tier(a) >= signal_tier(b));
        }
        prop_assert!((1..=5).contains(&signal_tier(a)));
    }
}

#[test]
fn test_tier_boundaries() {
    assert_eq!(signal_tier(-50), 5);
    assert_eq!(signal_tier(-51), 4);
    assert_eq!(signal_tier(-80), 3);
    assert_eq!(signal_tier(-81), 2);
    assert_eq!(signal_tier(-150), 1);
}

#[test]
fn test_wep_beats_psk() {
    assert_eq!(classify("[WEP][WPA-PSK-TKIP]"), SecurityClass::Wep);
}
