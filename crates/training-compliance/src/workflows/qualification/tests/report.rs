use super::common::*;
use crate::workflows::qualification::{
    aggregate_qualifications, position_summaries, rank_training_impact,
    write_qualification_matrix, RuleSet,
};
use crate::workflows::roster::domain::{PositionId, TrainingId};
use crate::workflows::roster::ledger::completions_by_volunteer;

#[test]
fn summaries_count_only_active_volunteers() {
    let volunteers = volunteers();
    let held = completions_by_volunteer(&volunteers, &completions(), &catalog(), as_of());

    let summaries = position_summaries(&positions(), &volunteers, &held);

    assert_eq!(summaries.len(), 2);
    let interior = &summaries[0];
    assert_eq!(interior.position_id, PositionId::from("interior-ff"));
    assert_eq!(interior.active_volunteers, 3);
    assert_eq!(interior.county_qualified, 1);
    assert_eq!(interior.avfrd_qualified, 1);
    assert_eq!(interior.fully_qualified, 1);

    let driver = &summaries[1];
    assert_eq!(driver.county_qualified, 0);
    assert_eq!(driver.avfrd_qualified, 0);
}

#[test]
fn ranking_orders_by_impact_then_id() {
    let volunteers = volunteers();
    let catalog = catalog();
    let held = completions_by_volunteer(&volunteers, &completions(), &catalog, as_of());

    let ranking = rank_training_impact(&catalog, &volunteers, &positions(), &held, RuleSet::Avfrd);

    assert_eq!(ranking.len(), catalog.len());
    let order: Vec<(&str, usize)> = ranking
        .iter()
        .map(|entry| (entry.training_id.as_str(), entry.newly_qualified))
        .collect();
    assert_eq!(&order[..3], &[("ff2", 2), ("pump", 2), ("cpr", 1)]);
    assert!(order[3..].iter().all(|(_, count)| *count == 0));

    let cpr = &ranking[2];
    assert_eq!(cpr.training_id, TrainingId::new("cpr"));
    assert_eq!(cpr.by_position[&PositionId::from("interior-ff")], 1);
    assert_eq!(cpr.rule_set, RuleSet::Avfrd);
}

#[test]
fn matrix_lists_each_volunteer_position_pair() {
    let catalog = catalog();
    let volunteers = volunteers();
    let held = completions_by_volunteer(&volunteers, &completions(), &catalog, as_of());

    let rows: Vec<_> = volunteers[..2]
        .iter()
        .map(|volunteer| {
            let statuses =
                aggregate_qualifications(&held[&volunteer.id], &positions(), &catalog);
            (volunteer.clone(), statuses)
        })
        .collect();

    let mut buffer = Vec::new();
    write_qualification_matrix(&mut buffer, &rows).expect("matrix writes");
    let output = String::from_utf8(buffer).expect("utf8 output");
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(
        lines[0],
        "Volunteer ID,Volunteer,Position ID,Position,County Qualified,AVFRD Qualified,Missing County,Missing AVFRD"
    );
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[1],
        "101,Dana Whitfield,interior-ff,Interior Firefighter,Yes,Yes,,"
    );
    assert_eq!(
        lines[4],
        "102,Lee Park,driver,Engine Driver,No,No,Pump Operations,Pump Operations; Firefighter II"
    );
}
