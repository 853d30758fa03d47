//! Focused unit tests covering argument resolution and session setup.

use super::*;
use crate::billing::{PackagesArgs, PackagesConfig, PayConfig, ReportConfig};
use crate::deliver::DeliverConfig;
use crate::error::env_var;
use crate::fleet::{MoveConfig, StatusConfig};
use crate::import::ImportConfig;
use crate::session::{DEFAULT_DATABASE, SessionClock, SessionOptions};
use camino::Utf8PathBuf;
use chrono::NaiveDate;
use haulage_core::{Clock, DeliveryClass, SupplierId};
use rstest::rstest;

fn assert_missing(err: CliError, expected_field: &str, expected_env: &str) {
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(CMD_DELIVER, ARG_START, "HAULAGE_CMDS_DELIVER_START")]
#[case(CMD_MOVE, ARG_FACILITY, "HAULAGE_CMDS_MOVE_FACILITY")]
#[case(CMD_IMPORT, ARG_NETWORK, "HAULAGE_CMDS_IMPORT_NETWORK")]
fn env_var_follows_subcommand_prefix(
    #[case] command: &str,
    #[case] field: &str,
    #[case] expected: &str,
) {
    assert_eq!(env_var(command, field), expected);
}

#[rstest]
#[case::start(None, Some("C"), Some(DeliveryClass::Economy), Some(1), ARG_START)]
#[case::end(Some("A"), None, Some(DeliveryClass::Economy), Some(1), ARG_END)]
#[case::class(Some("A"), Some("C"), None, Some(1), ARG_CLASS)]
#[case::supplier(Some("A"), Some("C"), Some(DeliveryClass::Express), None, ARG_SUPPLIER)]
fn deliver_requires_every_field(
    #[case] start: Option<&str>,
    #[case] end: Option<&str>,
    #[case] class: Option<DeliveryClass>,
    #[case] supplier: Option<u64>,
    #[case] field: &'static str,
) {
    let args = DeliverArgs {
        start: start.map(str::to_owned),
        end: end.map(str::to_owned),
        class,
        supplier,
        ..DeliverArgs::default()
    };
    let err = DeliverConfig::try_from(args).expect_err("missing field should error");
    assert_missing(err, field, &env_var(CMD_DELIVER, field));
}

#[rstest]
fn deliver_carries_session_options() {
    let now = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|day| day.and_hms_opt(9, 0, 0))
        .expect("valid timestamp");
    let args = DeliverArgs {
        start: Some("A".into()),
        end: Some("C".into()),
        class: Some(DeliveryClass::Overnight),
        supplier: Some(2),
        database: Some(Utf8PathBuf::from("deliveries.db")),
        now: Some(now),
        policy: Some(Utf8PathBuf::from("policy.json")),
    };
    let config = DeliverConfig::try_from(args).expect("config should build");
    assert_eq!(config.supplier, SupplierId(2));
    assert_eq!(config.class, DeliveryClass::Overnight);
    assert_eq!(config.session.database_path(), "deliveries.db");
    assert_eq!(config.session.now, Some(now));
    assert_eq!(config.session.policy, Some(Utf8PathBuf::from("policy.json")));
}

#[rstest]
fn move_requires_vehicle_and_facility() {
    let err = MoveConfig::try_from(MoveArgs {
        facility: Some("B".into()),
        ..MoveArgs::default()
    })
    .expect_err("missing vehicle should error");
    assert_missing(err, ARG_VEHICLE, "HAULAGE_CMDS_MOVE_VEHICLE");

    let err = MoveConfig::try_from(MoveArgs {
        vehicle: Some(1),
        ..MoveArgs::default()
    })
    .expect_err("missing facility should error");
    assert_missing(err, ARG_FACILITY, "HAULAGE_CMDS_MOVE_FACILITY");
}

#[rstest]
fn single_field_commands_report_their_field() {
    let err = StatusConfig::try_from(StatusArgs::default()).expect_err("status needs a package");
    assert_missing(err, ARG_PACKAGE, "HAULAGE_CMDS_STATUS_PACKAGE");

    let err = ReportConfig::try_from(ReportArgs::default()).expect_err("report needs a supplier");
    assert_missing(err, ARG_SUPPLIER, "HAULAGE_CMDS_REPORT_SUPPLIER");

    let err = ImportConfig::try_from(ImportArgs::default()).expect_err("import needs a network");
    assert_missing(err, ARG_NETWORK, "HAULAGE_CMDS_IMPORT_NETWORK");

    let err = PayConfig::try_from(PayArgs {
        supplier: Some(1),
        ..PayArgs::default()
    })
    .expect_err("pay needs a package");
    assert_missing(err, ARG_PACKAGE, "HAULAGE_CMDS_PAY_PACKAGE");
}

#[rstest]
#[case::all_when_empty(Vec::new(), DeliveryClass::ALL.to_vec())]
#[case::as_given(vec![DeliveryClass::Express], vec![DeliveryClass::Express])]
fn packages_defaults_to_every_class(
    #[case] given: Vec<DeliveryClass>,
    #[case] expected: Vec<DeliveryClass>,
) {
    let config = PackagesConfig::try_from(PackagesArgs {
        supplier: Some(1),
        class: given,
        database: None,
    })
    .expect("config should build");
    assert_eq!(config.classes, expected);
}

#[rstest]
fn session_defaults_to_working_directory_database() {
    assert_eq!(SessionOptions::default().database_path(), DEFAULT_DATABASE);
}

#[rstest]
fn pinned_session_clock_reports_pinned_time() {
    let now = NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|day| day.and_hms_opt(17, 30, 0))
        .expect("valid timestamp");
    assert_eq!(SessionClock::new(Some(now)).now(), now);
    assert!(matches!(SessionClock::new(None), SessionClock::System(_)));
}

#[rstest]
fn missing_policy_file_reports_open_error() {
    let options = SessionOptions {
        policy: Some(Utf8PathBuf::from("/nonexistent/haulage/policy.json")),
        ..SessionOptions::default()
    };
    match options.load_policy().expect_err("missing policy should error") {
        CliError::OpenInput { field, .. } => assert_eq!(field, ARG_POLICY),
        other => panic!("expected OpenInput, found {other:?}"),
    }
}

#[rstest]
fn write_json_terminates_with_newline() {
    let mut buffer = Vec::new();
    write_json(&mut buffer, &serde_json::json!({ "paid": true })).expect("write json");
    let text = String::from_utf8(buffer).expect("utf-8 output");
    assert!(text.ends_with('\n'));
    let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["paid"], true);
}

#[rstest]
fn rejects_unknown_delivery_class_on_the_command_line() {
    let err = Cli::try_parse_from(["haulage", "deliver", "--class", "teleport"])
        .expect_err("unknown class should be rejected");
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[rstest]
fn configuration_layers_accept_class_codes_and_any_case() {
    let deliver: DeliverArgs =
        serde_json::from_str(r#"{ "class": 3, "supplier": 1 }"#).expect("deliver layer decodes");
    assert_eq!(deliver.class, Some(DeliveryClass::Economy));

    let from_env: DeliverArgs =
        serde_json::from_str(r#"{ "class": "EXPRESS" }"#).expect("env-style layer decodes");
    assert_eq!(from_env.class, Some(DeliveryClass::Express));

    let packages: PackagesArgs = serde_json::from_str(r#"{ "supplier": 1, "class": ["2", 1] }"#)
        .expect("packages layer decodes");
    assert_eq!(
        packages.class,
        vec![DeliveryClass::Overnight, DeliveryClass::Express]
    );
}
