//! Binary runs of the `airline` and `pipeline` subcommands.

use rstest::rstest;

use crate::helpers::{count_lines, line_index, log_text, run_turnstile};

#[test]
fn test_airline_boards_everyone_and_takes_off_once() {
    let output =
        run_turnstile(&["airline", "-p", "12", "-b", "2", "-s", "3", "-f", "1", "--work-micros", "50"]);
    assert!(output.status.success(), "{}", log_text(&output));

    assert_eq!(count_lines(&output, "arrived at the terminal."), 12);
    assert_eq!(count_lines(&output, "is being processed by a baggage handler."), 12);
    assert_eq!(count_lines(&output, "is being screened by a security screener."), 12);
    assert_eq!(count_lines(&output, "is being seated by a flight attendant."), 12);
    assert_eq!(count_lines(&output, "has been seated and relaxes."), 12);
    assert_eq!(count_lines(&output, "The plane takes off!"), 1);
    assert!(log_text(&output).contains("*** All 12 passengers are seated. The plane takes off! ***"));
    assert_eq!(count_lines(&output, "All passenger threads completed. Exiting."), 1);
}

#[test]
fn test_airline_processing_starts_after_everyone_arrived() {
    let output = run_turnstile(&["airline", "-p", "20", "-b", "4", "-s", "4", "-f", "4"]);
    assert!(output.status.success(), "{}", log_text(&output));

    let text = log_text(&output);
    let lines: Vec<&str> = text.lines().collect();
    let last_arrival = lines.iter().rposition(|l| l.contains("arrived at the terminal.")).unwrap();
    let first_service = line_index(&output, "is being processed by a baggage handler.");
    assert!(last_arrival < first_service);

    let takeoff = line_index(&output, "The plane takes off!");
    let last_seated = lines.iter().rposition(|l| l.contains("has been seated and relaxes.")).unwrap();
    assert!(last_seated < takeoff);
}

#[test]
fn test_airline_passenger_visits_stages_in_order() {
    let output = run_turnstile(&["airline", "-p", "6", "-b", "1", "-s", "2", "-f", "1"]);
    assert!(output.status.success(), "{}", log_text(&output));

    for id in 1..=6 {
        let baggage = line_index(&output, &format!("Passenger #{id} is being processed"));
        let security = line_index(&output, &format!("Passenger #{id} is being screened"));
        let boarding = line_index(&output, &format!("Passenger #{id} is being seated"));
        let seated = line_index(&output, &format!("Passenger #{id} has been seated"));
        assert!(baggage < security && security < boarding && boarding < seated, "passenger {id}");
    }
}

#[test]
fn test_pipeline_command_reports_summary() {
    let output =
        run_turnstile(&["pipeline", "--items", "50", "--workers", "2,3,1", "--work-micros", "10"]);
    assert!(output.status.success(), "{}", log_text(&output));

    assert_eq!(count_lines(&output, "All 50 items finished every stage"), 1);
    assert_eq!(count_lines(&output, "Completed: 50"), 1);
    assert!(log_text(&output).contains("Stage 3 'stage-3': 1 worker(s), 50 visit(s)"));
}

#[test]
fn test_pipeline_command_with_watchdog() {
    let output = run_turnstile(&[
        "pipeline",
        "-n",
        "10",
        "-w",
        "1",
        "--work-micros",
        "10",
        "--stall-timeout",
        "30",
    ]);
    assert!(output.status.success(), "{}", log_text(&output));
    assert!(log_text(&output).contains("Stall watchdog: 30s"));
}

#[rstest]
#[case::zero_passengers(&["airline", "-p", "0", "-b", "1", "-s", "1", "-f", "1"])]
#[case::zero_screeners(&["airline", "-p", "5", "-b", "1", "-s", "0", "-f", "1"])]
#[case::zero_work(&["airline", "-p", "5", "-b", "1", "-s", "1", "-f", "1", "--work-micros", "0"])]
#[case::zero_stall_timeout(&["pipeline", "-n", "5", "-w", "1", "--stall-timeout", "0"])]
#[case::no_workers(&["pipeline", "-n", "5"])]
#[case::zero_items(&["pipeline", "-n", "0", "-w", "1,1"])]
#[case::missing_argument(&["airline", "-p", "5"])]
#[case::not_a_number(&["pipeline", "-n", "many", "-w", "1"])]
#[case::unknown_subcommand(&["teleport"])]
fn test_configuration_errors_exit_with_two(#[case] args: &[&str]) {
    let output = run_turnstile(args);
    assert_eq!(output.status.code(), Some(2), "{}", log_text(&output));
}
