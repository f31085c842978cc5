//! Property-Based Tests for submission fan-out and certificate layout
//!
//! 1. FAN-OUT: one record per serial entry, shared fields identical
//! 2. LAYOUT: one table row per serial entry, in order
//! 3. INK: exactly the passing Hi-Pot / Ground-Bond outcomes are green

use chrono::NaiveDate;
use hipot_core::{
    layout_certificate, Ink, PowerSupplyResults, SerialEntry, TestOutcome, TestResults,
    ValidatedSubmission, WorkOrder,
};
use proptest::prelude::*;

fn outcome() -> impl Strategy<Value = TestOutcome> {
    prop_oneof![
        Just(TestOutcome::Pass),
        Just(TestOutcome::Fail),
        Just(TestOutcome::NotApplicable),
    ]
}

fn supply_results() -> impl Strategy<Value = PowerSupplyResults> {
    (outcome(), outcome(), outcome()).prop_map(|(hp, gb, operational)| PowerSupplyResults {
        hp,
        gb,
        operational,
    })
}

fn serial_entry() -> impl Strategy<Value = SerialEntry> {
    ("SN-[A-Z0-9]{1,12}", supply_results(), supply_results())
        .prop_map(|(serial, ps1, ps2)| SerialEntry::new(serial, TestResults { ps1, ps2 }))
}

fn work_order(max_serials: usize) -> impl Strategy<Value = WorkOrder> {
    (
        "WO-[0-9]{1,6}",
        "[A-Za-z. ]{1,20}",
        prop::collection::vec(serial_entry(), 1..max_serials),
    )
        .prop_map(|(work_order_number, operator, serial_entries)| WorkOrder {
            work_order_number,
            operator,
            test_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            part_number: "PN-77".into(),
            test_voltage: "240V".into(),
            serial_entries,
        })
}

// =============================================================================
// FAN-OUT
// =============================================================================

proptest! {
    /// Every serial entry yields exactly one record carrying the shared fields
    #[test]
    fn prop_fan_out_one_record_per_serial(order in work_order(30)) {
        let submission = ValidatedSubmission {
            work_order: order.clone(),
            pdf_data: "data:application/pdf;base64,JVBERi0xLjUK".into(),
        };
        let records = submission.fan_out();

        prop_assert_eq!(records.len(), order.serial_entries.len());
        for (record, entry) in records.iter().zip(order.serial_entries.iter()) {
            prop_assert_eq!(&record.serial_number, &entry.serial_number);
            prop_assert_eq!(&record.work_order_number, &order.work_order_number);
            prop_assert_eq!(&record.operator, &order.operator);
            prop_assert_eq!(record.test_date.as_str(), "2024-05-01");
            prop_assert_eq!(&record.pdf_data, &submission.pdf_data);
        }
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

proptest! {
    /// Rows follow submission order, overflow included
    #[test]
    fn prop_layout_rows_follow_entries(order in work_order(20)) {
        let layout = layout_certificate(&order);
        prop_assert_eq!(layout.rows.len(), order.serial_entries.len());

        for (row, entry) in layout.rows.iter().zip(order.serial_entries.iter()) {
            prop_assert_eq!(row.frames.len(), 7);
            prop_assert_eq!(&row.runs[3].text, &entry.serial_number);
        }

        let tops: Vec<f32> = layout.rows.iter().map(|r| r.frames[0].y_mm).collect();
        prop_assert!(tops.windows(2).all(|w| w[0] < w[1]));
    }

    /// Green text appears exactly once per passing certified test
    #[test]
    fn prop_only_passing_outcomes_are_green(order in work_order(12)) {
        let layout = layout_certificate(&order);

        let expected: usize = order
            .serial_entries
            .iter()
            .map(|e| {
                [e.test_results.ps1.hp, e.test_results.ps1.gb, e.test_results.ps2.hp, e.test_results.ps2.gb]
                    .iter()
                    .filter(|o| o.is_pass())
                    .count()
            })
            .sum();

        let green: Vec<_> = layout.runs().filter(|r| r.ink == Ink::Pass).collect();
        prop_assert_eq!(green.len(), expected);
        prop_assert!(green.iter().all(|r| r.text == "PASS"));
    }
}
