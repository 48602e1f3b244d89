//! Tests for REDCap wire rows.

use std::io;
use std::sync::{Arc, Mutex};

use sae_model::{Assignment, SaeNumber, SaeRecord};
use sae_redcap::rows::{
    ImportResponse, ImportRow, SaeRow, StudyNumberRow, sae_records, study_numbers,
};
use sae_redcap::{GatewayError, RedcapForm};

const SAE_EXPORT: &str = r#"[
  {"record_id": "12", "redcap_event_name": "adverse_events_arm_1", "redcap_repeat_instrument": "sae",
   "redcap_repeat_instance": 1, "sae_number": "ICA-0012-01", "sae_report_type": "1", "sae_complete": "2"},
  {"record_id": "12", "redcap_event_name": "adverse_events_arm_1", "redcap_repeat_instrument": "sae",
   "redcap_repeat_instance": "2", "sae_number": "", "sae_report_type": "2", "sae_complete": "2"},
  {"record_id": "15", "redcap_event_name": "adverse_events_arm_1", "redcap_repeat_instrument": "",
   "redcap_repeat_instance": "", "sae_number": "", "sae_report_type": "", "sae_complete": "2"}
]"#;

#[test]
fn parses_sae_export_and_skips_other_instruments() {
    let rows: Vec<SaeRow> = serde_json::from_str(SAE_EXPORT).expect("parse export");
    let form = RedcapForm::default();

    let records = sae_records(rows, &form.repeat_instrument).expect("convert rows");

    assert_eq!(
        records,
        [
            SaeRecord::new("12", 1)
                .with_report_type("1")
                .with_sae_number("ICA-0012-01"),
            SaeRecord::new("12", 2).with_report_type("2"),
        ]
    );
}

#[test]
fn invalid_repeat_instance_is_an_error() {
    let rows: Vec<SaeRow> = serde_json::from_str(
        r#"[{"record_id": "3", "redcap_repeat_instrument": "sae", "redcap_repeat_instance": "x"}]"#,
    )
    .expect("parse export");

    let error = sae_records(rows, "sae").unwrap_err();

    assert!(matches!(error, GatewayError::InvalidRow { ref record_id, .. } if record_id == "3"));
}

#[test]
fn first_study_number_wins() {
    let rows: Vec<StudyNumberRow> = serde_json::from_str(
        r#"[
            {"record_id": "1", "redcap_event_name": "screening_arm_1", "study_number": ""},
            {"record_id": "1", "redcap_event_name": "enrolment_arm_1", "study_number": "ICA-0001"},
            {"record_id": "1", "redcap_event_name": "epipenta1_arm_1", "study_number": "ICA-9999"},
            {"record_id": 2, "study_number": " ICA-0002 "}
        ]"#,
    )
    .expect("parse export");

    let numbers = study_numbers(rows);

    assert_eq!(numbers.len(), 2);
    assert_eq!(numbers["1"], "ICA-0001");
    assert_eq!(numbers["2"], "ICA-0002");
}

/// Log sink shared with a test subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn conflicting_study_numbers_are_not_logged() {
    let rows: Vec<StudyNumberRow> = serde_json::from_str(
        r#"[
            {"record_id": "1", "study_number": "ICA-0001"},
            {"record_id": "1", "study_number": "ICA-9999"}
        ]"#,
    )
    .expect("parse export");
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let numbers = tracing::subscriber::with_default(subscriber, || study_numbers(rows));

    assert_eq!(numbers["1"], "ICA-0001");
    let output = logs.contents();
    assert!(output.contains("conflicting study numbers"), "{output}");
    assert!(output.contains("record_id=1"), "{output}");
    assert!(!output.contains("ICA-0001"), "{output}");
    assert!(!output.contains("ICA-9999"), "{output}");
}

#[test]
fn import_payload_shape() {
    let assignments = vec![
        Assignment {
            record_id: "12".to_string(),
            event_name: "adverse_events_arm_1".to_string(),
            repeat_instrument: "sae".to_string(),
            repeat_instance: 2,
            sae_number: SaeNumber::new("ICA-0012", 1).unwrap(),
            replaces: None,
        },
        Assignment {
            record_id: "40".to_string(),
            event_name: "adverse_events_arm_1".to_string(),
            repeat_instrument: "sae".to_string(),
            repeat_instance: 1,
            sae_number: SaeNumber::new("ICA-0040", 1).unwrap(),
            replaces: Some("ICA-0040".to_string()),
        },
    ];
    let rows: Vec<ImportRow<'_>> = assignments.iter().map(ImportRow::from).collect();

    insta::assert_json_snapshot!(rows, @r#"
    [
      {
        "record_id": "12",
        "redcap_event_name": "adverse_events_arm_1",
        "redcap_repeat_instrument": "sae",
        "redcap_repeat_instance": 2,
        "sae_number": "ICA-0012-01"
      },
      {
        "record_id": "40",
        "redcap_event_name": "adverse_events_arm_1",
        "redcap_repeat_instrument": "sae",
        "redcap_repeat_instance": 1,
        "sae_number": "ICA-0040-01"
      }
    ]
    "#);
}

#[test]
fn import_count_accepts_number_or_string() {
    let response: ImportResponse = serde_json::from_str(r#"{"count": 3}"#).unwrap();
    assert_eq!(response.count, 3);
    let response: ImportResponse = serde_json::from_str(r#"{"count": "4"}"#).unwrap();
    assert_eq!(response.count, 4);
    assert!(serde_json::from_str::<ImportResponse>(r#"{"count": "many"}"#).is_err());
}
