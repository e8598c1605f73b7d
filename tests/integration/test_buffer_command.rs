//! Binary runs of the `buffer` subcommand.

use crate::helpers::{count_lines, line_index, log_text, run_turnstile};

#[test]
fn test_buffer_transfers_every_letter_in_order() {
    let output = run_turnstile(&["buffer", "--total", "30", "--capacity", "3", "--delay-ms", "0"]);
    assert!(output.status.success(), "{}", log_text(&output));

    assert_eq!(count_lines(&output, "Produced: "), 30);
    assert_eq!(count_lines(&output, "Consumed: "), 30);
    assert!(log_text(&output).contains("Produced: D (Total produced: 30)"));

    let consumed: String = log_text(&output)
        .lines()
        .filter_map(|line| line.split("Consumed: ").nth(1))
        .filter_map(|rest| rest.chars().next())
        .collect();
    assert_eq!(consumed, "ABCDEFGHIJKLMNOPQRSTUVWXYZABCD");
    assert_eq!(count_lines(&output, "30 items produced and consumed"), 1);
}

#[test]
fn test_consumer_never_overtakes_producer() {
    let output = run_turnstile(&["buffer", "--total", "5", "--capacity", "1", "--delay-ms", "1"]);
    assert!(output.status.success(), "{}", log_text(&output));
    let produced = line_index(&output, "Produced: A");
    let consumed = line_index(&output, "Consumed: A");
    assert!(produced < consumed);
}

#[test]
fn test_buffer_rejects_zero_capacity() {
    let output = run_turnstile(&["buffer", "--capacity", "0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(log_text(&output).contains("capacity"));
}
