use super::common::{date, snapshot, zone_cell, IN_ZONE, OUT_OF_ZONE};
use crate::verification::domain::{CertificationStatus, RiskLevel, VerificationStatus};
use crate::verification::evaluation::ComplianceEvaluator;
use crate::verification::policy::CompliancePolicy;
use crate::zones::EligibilityResolver;

fn assess_at(
    snapshot: &crate::verification::domain::BusinessSnapshot,
    as_of: chrono::NaiveDate,
) -> crate::verification::evaluation::ComplianceAssessment {
    let resolver = EligibilityResolver::new(zone_cell());
    let coordinate = snapshot.office.coordinate.expect("fixtures carry coordinates");
    let verdict = resolver.resolve(coordinate, as_of);
    ComplianceEvaluator::new(CompliancePolicy::default()).assess(snapshot, &verdict, as_of)
}

#[test]
fn healthy_business_is_compliant_and_low_risk() {
    let business = snapshot("ABC123DEF456", IN_ZONE);
    let assessment = assess_at(&business, date(2025, 6, 1));

    assert!(assessment.breakdown.all_compliant());
    assert_eq!(assessment.status, VerificationStatus::Compliant);
    assert_eq!(assessment.risk_level, RiskLevel::Low);
    assert!(assessment.risk_score >= 80);
}

#[test]
fn zero_employees_is_non_compliant_not_a_division_error() {
    let mut business = snapshot("ABC123DEF456", IN_ZONE);
    business.workforce.total_employees = 0;
    business.workforce.zone_resident_employees = 0;

    let assessment = assess_at(&business, date(2025, 6, 1));
    assert!(!assessment.breakdown.residency.compliant);
    assert_eq!(assessment.breakdown.residency.ratio, 0.0);
    assert_eq!(assessment.status, VerificationStatus::NonCompliant);
}

#[test]
fn all_facts_passing_at_borderline_values_still_scores_low_risk() {
    let mut business = snapshot("ABC123DEF456", IN_ZONE);
    // Residency exactly at threshold, ownership exactly at threshold, and a
    // certification expiring tomorrow: worst passing profile.
    business.workforce.total_employees = 100;
    business.workforce.zone_resident_employees = 35;
    business.ownership.qualifying_percentage = 0.51;
    business.certification.expires_on = Some(date(2025, 6, 2));

    let assessment = assess_at(&business, date(2025, 6, 1));
    assert!(assessment.breakdown.all_compliant());
    assert_eq!(assessment.risk_level, RiskLevel::Low);
    assert!(assessment.risk_score >= 80);
}

#[test]
fn borderline_residency_scores_worse_than_comfortable_residency() {
    let mut borderline = snapshot("ABC123DEF456", IN_ZONE);
    borderline.workforce.total_employees = 100;
    borderline.workforce.zone_resident_employees = 36;

    let mut comfortable = snapshot("ABC123DEF456", IN_ZONE);
    comfortable.workforce.total_employees = 100;
    comfortable.workforce.zone_resident_employees = 60;

    let as_of = date(2025, 6, 1);
    let borderline_score = assess_at(&borderline, as_of).risk_score;
    let comfortable_score = assess_at(&comfortable, as_of).risk_score;
    assert!(borderline_score < comfortable_score);
    // Both still pass the gate.
    assert!(assess_at(&borderline, as_of).breakdown.residency.compliant);
}

#[test]
fn office_outside_any_zone_fails_the_office_fact_with_heavy_penalty() {
    let business = snapshot("ABC123DEF456", OUT_OF_ZONE);
    let assessment = assess_at(&business, date(2025, 6, 1));

    assert!(!assessment.breakdown.office.compliant);
    assert_eq!(assessment.breakdown.office.zone_id, None);
    assert_eq!(assessment.status, VerificationStatus::NonCompliant);
    assert!(assessment.risk_score <= 60);
}

#[test]
fn ownership_below_threshold_or_without_citizenship_fails() {
    let as_of = date(2025, 6, 1);

    let mut minority = snapshot("ABC123DEF456", IN_ZONE);
    minority.ownership.qualifying_percentage = 0.40;
    assert!(!assess_at(&minority, as_of).breakdown.ownership.compliant);

    let mut foreign = snapshot("ABC123DEF456", IN_ZONE);
    foreign.ownership.citizenship_requirement_met = false;
    assert!(!assess_at(&foreign, as_of).breakdown.ownership.compliant);
}

#[test]
fn lapsed_certification_classifies_as_expired() {
    let mut business = snapshot("ABC123DEF456", IN_ZONE);
    business.certification.expires_on = Some(date(2025, 1, 31));

    let assessment = assess_at(&business, date(2025, 6, 1));
    assert!(!assessment.breakdown.certification.compliant);
    assert!(assessment.breakdown.certification.lapsed);
    assert_eq!(assessment.status, VerificationStatus::Expired);
}

#[test]
fn revoked_certification_is_non_compliant_but_not_expired() {
    let mut business = snapshot("ABC123DEF456", IN_ZONE);
    business.certification.status = CertificationStatus::Revoked;

    let assessment = assess_at(&business, date(2025, 6, 1));
    assert!(!assessment.breakdown.certification.compliant);
    assert!(!assessment.breakdown.certification.lapsed);
    assert_eq!(assessment.status, VerificationStatus::NonCompliant);
}

#[test]
fn recertification_warning_fires_inside_the_window_independent_of_validity() {
    let as_of = date(2025, 6, 1);

    let mut closing = snapshot("ABC123DEF456", IN_ZONE);
    closing.certification.expires_on = Some(date(2025, 7, 15));
    let assessment = assess_at(&closing, as_of);
    assert!(assessment.breakdown.certification.compliant);
    assert!(assessment.breakdown.certification.requires_recertification);

    let mut distant = snapshot("ABC123DEF456", IN_ZONE);
    distant.certification.expires_on = Some(date(2026, 6, 1));
    assert!(
        !assess_at(&distant, as_of)
            .breakdown
            .certification
            .requires_recertification
    );
}

#[test]
fn office_in_grace_period_zone_still_passes_the_office_fact() {
    // Inside the lapsed redesignated fixture zone while grace is open.
    let in_redesignated = crate::zones::Coordinate::new(43.5, -96.5);
    let business = snapshot("ABC123DEF456", in_redesignated);

    let assessment = assess_at(&business, date(2025, 6, 1));
    assert!(assessment.breakdown.office.compliant);
    assert!(assessment.breakdown.office.in_grace_period);

    let after_grace = assess_at(&business, date(2026, 2, 1));
    assert!(!after_grace.breakdown.office.compliant);
}

#[test]
fn every_failing_fact_lowers_the_score() {
    let as_of = date(2025, 6, 1);
    let healthy = assess_at(&snapshot("ABC123DEF456", IN_ZONE), as_of).risk_score;

    let mut broken = snapshot("ABC123DEF456", OUT_OF_ZONE);
    broken.workforce.zone_resident_employees = 0;
    broken.ownership.qualifying_percentage = 0.10;
    broken.certification.status = CertificationStatus::Revoked;

    let assessment = assess_at(&broken, as_of);
    assert!(assessment.risk_score < healthy);
    assert_eq!(assessment.risk_level, RiskLevel::Critical);
}
