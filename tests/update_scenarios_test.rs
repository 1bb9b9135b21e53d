use augury_lib::engine::config::FleetConfig;
use augury_lib::engine::fleet::{FleetEngine, UpdateError};

const MOXA: &str = "MOXA_TBCDB1045003";
const MOXA_OTA: &str = "OTA_MOXA_TBCDB1045003";
const EP1: &str = "MOXA-EP1-0001";
const EP1_DFU: &str = "DFU_MOXA-EP1-0001";
const CANARY: &str = "AHN2-CANARY-0001";

fn fleet() -> FleetEngine {
    FleetEngine::new(&FleetConfig::default()).expect("default fleet")
}

#[test]
fn test_endpoint_update_then_backlog_block() {
    let mut fleet = fleet();

    // Scenario 1: EP1 at v10, battery 3000, no backlog
    fleet.post_dfu(EP1_DFU, "ep1_11.swu");
    assert!(fleet.poll_endpoint(EP1).unwrap());
    let ep = fleet.endpoint_view(EP1).unwrap();
    assert_eq!(ep.version, "11");
    assert!(ep.last_error.is_none());

    // Scenario 2: same endpoint with pending backlog
    fleet.set_endpoint_backlog(EP1, 1).unwrap();
    fleet.post_dfu(EP1_DFU, "ep1_12.swu");
    assert!(!fleet.poll_endpoint(EP1).unwrap());
    let ep = fleet.endpoint_view(EP1).unwrap();
    assert_eq!(ep.last_error, Some(UpdateError::BacklogNotEmpty));
    assert_eq!(ep.version, "11");

    // Backlog drained: the queued artifact goes through on the next poll
    fleet.set_endpoint_backlog(EP1, 0).unwrap();
    assert!(fleet.poll_endpoint(EP1).unwrap());
    assert_eq!(fleet.endpoint_view(EP1).unwrap().version, "12");
}

#[test]
fn test_node_update_then_downgrade_rejected() {
    let mut fleet = fleet();

    // Scenario 3
    fleet.post_ota(MOXA_OTA, "moxa_34.swu");
    assert!(fleet.poll_node(MOXA).unwrap());
    assert_eq!(fleet.node_view(MOXA).unwrap().version, "34");

    // Scenario 4
    fleet.post_ota(MOXA_OTA, "moxa_30.swu");
    assert!(!fleet.poll_node(MOXA).unwrap());
    let node = fleet.node_view(MOXA).unwrap();
    assert_eq!(node.last_error, Some(UpdateError::VersionNotNewer));
    assert_eq!(node.version, "34");
}

#[test]
fn test_canary_low_battery() {
    let mut fleet = fleet();

    // Scenario 5
    fleet.set_endpoint_battery(CANARY, 3500).unwrap();
    fleet.post_dfu("DFU_AHN2-CANARY-0001", "canary_6.swu");
    assert!(!fleet.poll_endpoint(CANARY).unwrap());

    let ep = fleet.endpoint_view(CANARY).unwrap();
    assert_eq!(ep.last_error, Some(UpdateError::LowBattery));
    assert_eq!(ep.version, "5");
}

#[test]
fn test_poll_without_artifact() {
    let mut fleet = fleet();

    // Scenario 6
    assert!(!fleet.poll_node(MOXA).unwrap());
    assert_eq!(fleet.node_view(MOXA).unwrap().last_error, Some(UpdateError::NoArtifact));

    assert!(!fleet.poll_endpoint(EP1).unwrap());
    assert_eq!(fleet.endpoint_view(EP1).unwrap().last_error, Some(UpdateError::NoArtifact));
}

#[test]
fn test_repeated_poll_is_idempotent() {
    let mut fleet = fleet();
    fleet.post_ota(MOXA_OTA, "moxa_34.swu");

    assert!(fleet.poll_node(MOXA).unwrap());
    assert!(!fleet.poll_node(MOXA).unwrap());
    let node = fleet.node_view(MOXA).unwrap();
    assert_eq!(node.last_error, Some(UpdateError::VersionNotNewer));
    assert_eq!(node.version, "34");
}

#[test]
fn test_battery_threshold_boundary() {
    let mut fleet = fleet();

    fleet.set_endpoint_battery(CANARY, 3599).unwrap();
    fleet.post_dfu("DFU_AHN2-CANARY-0001", "canary_6.swu");
    assert!(!fleet.poll_endpoint(CANARY).unwrap());
    assert_eq!(fleet.endpoint_view(CANARY).unwrap().last_error, Some(UpdateError::LowBattery));

    fleet.set_endpoint_battery(CANARY, 3600).unwrap();
    assert!(fleet.poll_endpoint(CANARY).unwrap());
    assert_eq!(fleet.endpoint_view(CANARY).unwrap().version, "6");

    fleet.set_endpoint_battery(EP1, 2499).unwrap();
    fleet.post_dfu(EP1_DFU, "ep1_11.swu");
    assert!(!fleet.poll_endpoint(EP1).unwrap());

    fleet.set_endpoint_battery(EP1, 2500).unwrap();
    assert!(fleet.poll_endpoint(EP1).unwrap());
}

#[test]
fn test_latest_post_wins_per_channel() {
    let mut fleet = fleet();
    fleet.post_ota(MOXA_OTA, "moxa_50.swu");
    fleet.post_ota("OTA_AHN2_TBCDB1045001", "ahn2_60.swu");
    fleet.post_ota(MOXA_OTA, "moxa_40.swu");
    fleet.post_ota("OTA_AHN2_TBCDB1045001", "ahn2_61.swu");

    assert!(fleet.poll_node(MOXA).unwrap());
    assert_eq!(fleet.node_view(MOXA).unwrap().version, "40");

    assert!(fleet.poll_node("AHN2_TBCDB1045001").unwrap());
    assert_eq!(fleet.node_view("AHN2_TBCDB1045001").unwrap().version, "61");
}

#[test]
fn test_clear_exposes_previous_artifact() {
    let mut fleet = fleet();
    fleet.post_ota(MOXA_OTA, "moxa_34.swu");
    fleet.post_ota(MOXA_OTA, "moxa_35.swu");

    fleet.clear_ota(MOXA_OTA, "moxa_35.swu").unwrap();
    assert!(fleet.clear_ota(MOXA_OTA, "moxa_35.swu").is_err());

    assert!(fleet.poll_node(MOXA).unwrap());
    assert_eq!(fleet.node_view(MOXA).unwrap().version, "34");
}

#[test]
fn test_wrong_family_and_garbage_artifacts() {
    let mut fleet = fleet();

    fleet.post_ota(MOXA_OTA, "cassia_99.swu");
    assert!(!fleet.poll_node(MOXA).unwrap());
    assert_eq!(fleet.node_view(MOXA).unwrap().last_error, Some(UpdateError::BadFirmware));

    fleet.post_ota(MOXA_OTA, "MOXA_next.swu");
    assert!(!fleet.poll_node(MOXA).unwrap());
    assert_eq!(
        fleet.node_view(MOXA).unwrap().last_error,
        Some(UpdateError::BadArtifactFormat)
    );

    fleet.post_ota(MOXA_OTA, "");
    assert!(!fleet.poll_node(MOXA).unwrap());
    assert_eq!(fleet.node_view(MOXA).unwrap().last_error, Some(UpdateError::EmptyArtifact));
    assert_eq!(fleet.node_view(MOXA).unwrap().version, "33");
}

#[test]
fn test_grouped_and_signed_versions_apply() {
    let mut fleet = fleet();

    fleet.post_ota(MOXA_OTA, "moxa_3_5.swu");
    assert!(fleet.poll_node(MOXA).unwrap());
    assert_eq!(fleet.node_view(MOXA).unwrap().version, "35");

    fleet.post_dfu(EP1_DFU, "ep1_+11.swu");
    assert!(fleet.poll_endpoint(EP1).unwrap());
    assert_eq!(fleet.endpoint_view(EP1).unwrap().version, "11");

    fleet.post_dfu(EP1_DFU, "ep1_-12.swu");
    assert!(!fleet.poll_endpoint(EP1).unwrap());
    assert_eq!(
        fleet.endpoint_view(EP1).unwrap().last_error,
        Some(UpdateError::BadArtifactFormat)
    );
}

#[test]
fn test_metrics_follow_polls() {
    let mut fleet = fleet();
    fleet.post_ota(MOXA_OTA, "moxa_34.swu");
    fleet.poll_node(MOXA).unwrap();
    fleet.poll_node(MOXA).unwrap();
    fleet.poll_endpoint(EP1).unwrap();

    let metrics = fleet.metrics();
    assert_eq!(metrics.total_polls, 3);
    assert_eq!(metrics.successful_updates, 1);
    assert_eq!(metrics.failures_for(UpdateError::VersionNotNewer), 1);
    assert_eq!(metrics.failures_for(UpdateError::NoArtifact), 1);
}
