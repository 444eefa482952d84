use wifi_connect::profile::{KeyMgmt, NetworkId};
use wifi_connect::{AccessPoint, CapabilityLevel, NetworkHandle, Selection};
use test_utils::{create_test_controller, create_test_results, FakePlatform, RequestReply};


fn secure_net() -> AccessPoint {
    AccessPoint::new("SecureNet", "[WPA2-PSK-CCMP][ESS]", -45)
}

#[test]
fn test_legacy_reuses_saved_profile() {
    let platform = FakePlatform::new(CapabilityLevel::Legacy);
    platform.save_profile("HomeNet", "7");
    platform.set_results(create_test_results());

    let (mut controller, mut rx) = create_test_controller(&platform);
    controller.on_scan_results(true).unwrap();

    let selection = controller.select_ssid("HomeNet").unwrap();
    let Selection::PromptPassword(ap) = selection else {
        panic!("HomeNet is secured");
    };
    controller.submit_password(&ap, "ignored-password").unwrap();

    let state = platform.state();
    assert!(state.added.is_empty(), "no duplicate profile");
    assert_eq!(state.saved.len(), 1);
    assert_eq!(state.enabled, [NetworkId("7".into())]);
    drop(state);

    let outcome = rx.try_recv().unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.handle, Some(NetworkHandle("7".into())));
}

#[test]
fn test_legacy_saved_profile_match_is_exact() {
    let platform = FakePlatform::new(CapabilityLevel::Legacy);
    platform.save_profile("homenet", "7");

    let (controller, _rx) = create_test_controller(&platform);
    let ap = AccessPoint::new("HomeNet", "[WPA2-PSK-CCMP][ESS]", -50);
    controller.submit_password(&ap, "pw12345678").unwrap();

    let state = platform.state();
    assert_eq!(state.added.len(), 1);
    assert_eq!(state.added[0].ssid, "\"HomeNet\"");
}

#[test]
fn test_legacy_creates_wpa_profile() {
    let platform = FakePlatform::new(CapabilityLevel::Legacy);
    let (controller, mut rx) = create_test_controller(&platform);

    controller.submit_password(&secure_net(), "  hunter22  ").unwrap();

    let state = platform.state();
    assert_eq!(state.added.len(), 1);
    let profile = &state.added[0];
    assert_eq!(profile.ssid, "\"SecureNet\"");
    assert_eq!(profile.pre_shared_key.as_deref(), Some("\"hunter22\""));
    assert_eq!(profile.key_mgmt, [KeyMgmt::WpaPsk]);
    assert_eq!(state.enabled, [NetworkId("101".into())]);
    drop(state);

    assert!(rx.try_recv().unwrap().success);
}

#[test]
fn test_legacy_activation_failure_is_reported() {
    let platform = FakePlatform::new(CapabilityLevel::Legacy);
    platform.state().enable_result = false;
    let (controller, mut rx) = create_test_controller(&platform);

    controller.submit_password(&secure_net(), "hunter22").unwrap();

    let outcome = rx.try_recv().unwrap();
    assert!(!outcome.success);
    assert!(outcome.handle.is_none());
    assert_eq!(outcome.ssid, "SecureNet");
}

#[test]
fn test_legacy_eap_is_configured_as_open() {
    let platform = FakePlatform::new(CapabilityLevel::Legacy);
    let (controller, _rx) = create_test_controller(&platform);
    let corp = AccessPoint::new("Corp", "[WPA2-EAP-CCMP][ESS]", -55);

    controller.submit_password(&corp, "secret").unwrap();

    let state = platform.state();
    assert_eq!(state.added[0].key_mgmt, [KeyMgmt::None]);
    assert!(state.added[0].pre_shared_key.is_none());
}

#[test]
fn test_legacy_add_failure_sends_no_outcome() {
    let platform = FakePlatform::new(CapabilityLevel::Legacy);
    platform.state().add_fails = true;
    let (controller, mut rx) = create_test_controller(&platform);

    assert!(controller.submit_password(&secure_net(), "hunter22").is_err());
    assert!(platform.state().enabled.is_empty());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_modern_builds_scoped_request() {
    let platform = FakePlatform::new(CapabilityLevel::Modern);
    let (controller, mut rx) = create_test_controller(&platform);

    controller.submit_password(&secure_net(), "hunter22").unwrap();

    let state = platform.state();
    assert!(state.added.is_empty());
    assert!(state.enabled.is_empty());
    let request = &state.requests[0];
    assert_eq!(request.ssid, "SecureNet");
    assert_eq!(request.wpa2_passphrase.as_deref(), Some("hunter22"));
    assert!(!request.requires_internet);
    assert!(request.trusted);
    assert!(!request.restricted);
    drop(state);

    let outcome = rx.try_recv().unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.handle, Some(NetworkHandle("net-SecureNet".into())));
}

#[test]
fn test_modern_unavailable() {
    let platform = FakePlatform::new(CapabilityLevel::Modern);
    platform.state().request_reply = RequestReply::Unavailable;
    let (controller, mut rx) = create_test_controller(&platform);

    controller.submit_password(&secure_net(), "hunter22").unwrap();

    let outcome = rx.try_recv().unwrap();
    assert!(!outcome.success);
    assert!(outcome.handle.is_none());
}

#[tokio::test]
async fn test_modern_outcome_arrives_later() {
    let platform = FakePlatform::new(CapabilityLevel::Modern);
    platform.state().request_reply = RequestReply::Hold;
    let (controller, mut rx) = create_test_controller(&platform);

    controller.submit_password(&secure_net(), "hunter22").unwrap();
    assert!(rx.try_recv().is_err());

    let router = platform.state().held.pop().unwrap();
    tokio::spawn(async move {
        router.on_available(NetworkHandle("late".into()));
    });

    let outcome = rx.recv().await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.handle, Some(NetworkHandle("late".into())));
}

#[test]
fn test_outcome_after_observer_is_gone() {
    let platform = FakePlatform::new(CapabilityLevel::Modern);
    platform.state().request_reply = RequestReply::Hold;
    let (controller, rx) = create_test_controller(&platform);

    controller.submit_password(&secure_net(), "hunter22").unwrap();
    drop(rx);
    drop(controller);

    let router = platform.state().held.pop().unwrap();
    router.on_unavailable();
}

#[test]
fn test_strategy_follows_platform_level() {
    let legacy = FakePlatform::new(CapabilityLevel::Legacy);
    let modern = FakePlatform::new(CapabilityLevel::Modern);

    assert_eq!(create_test_controller(&legacy).0.context().level(), CapabilityLevel::Legacy);
    assert_eq!(create_test_controller(&modern).0.context().level(), CapabilityLevel::Modern);
}
