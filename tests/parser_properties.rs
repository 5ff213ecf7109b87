// tests/parser_properties.rs

use proptest::prelude::*;
use swbridge::protocol::{LineEvent, LineParser};
use swbridge::types::OperationKind;

fn parser() -> LineParser {
    LineParser::new(OperationKind::PoseCreation)
}

proptest! {
    #[test]
    fn total_keeps_current(current in 0u64..1_000_000, total in any::<u64>()) {
        let mut p = parser();
        p.classify(&format!("PROGRESS:{current}"));
        prop_assert_eq!(
            p.classify(&format!("TOTAL:{total}")),
            Some(LineEvent::Progress { current, total })
        );
        prop_assert_eq!(p.total(), total);
    }

    #[test]
    fn last_progress_wins(values in proptest::collection::vec(any::<u64>(), 1..20)) {
        let mut p = parser();
        for v in &values {
            p.classify(&format!("PROGRESS:{v}"));
        }
        prop_assert_eq!(p.current(), *values.last().unwrap());
        prop_assert_eq!(p.total(), 0);
    }

    #[test]
    fn malformed_counts_change_nothing(
        garbage in prop_oneof!["[a-zA-Z]{1,8}", "-[0-9]{1,6}", "[0-9]{1,4}\\.[0-9]{1,3}"],
        prefix in prop_oneof![Just("TOTAL:"), Just("PROGRESS:")],
    ) {
        let mut p = parser();
        p.classify("TOTAL:7");
        p.classify("PROGRESS:3");

        prop_assert_eq!(p.classify(&format!("{prefix}{garbage}")), None);
        prop_assert_eq!((p.current(), p.total()), (3, 7));
    }

    #[test]
    fn whitespace_is_silent(line in "[ \t\r]{0,10}") {
        prop_assert_eq!(parser().classify(&line), None);
    }

    #[test]
    fn plain_text_is_logged_trimmed(line in "[ ]{0,3}[a-zA-Z][a-zA-Z0-9 ,.!]{0,40}") {
        prop_assert_eq!(
            parser().classify(&line),
            Some(LineEvent::Log(line.trim().to_string()))
        );
    }
}

#[test]
fn mixed_stream_in_order() {
    let mut p = LineParser::new(OperationKind::CoordinateInsertion);
    let events: Vec<LineEvent> = ["TOTAL:10", "PROGRESS:1", "hello", "STATE:Rebuilding", "PROGRESS:2"]
        .iter()
        .filter_map(|l| p.classify(l))
        .collect();

    assert_eq!(
        events,
        vec![
            LineEvent::Progress { current: 0, total: 10 },
            LineEvent::Progress { current: 1, total: 10 },
            LineEvent::Log("hello".into()),
            LineEvent::State("Rebuilding model...".into()),
            LineEvent::Progress { current: 2, total: 10 },
        ]
    );
}
