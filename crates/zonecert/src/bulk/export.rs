use super::job::{BulkJob, ItemOutcome};

/// Flat CSV export of a job's results: one row per requested identifier in
/// submission order, including not-found rows. Identifiers that never got a
/// result (cancelled or faulted jobs) still appear, marked unprocessed.
pub fn export_csv(job: &BulkJob) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    let mut writer = csv::Writer::from_writer(&mut buffer);
    writer.write_record([
        "identifier",
        "business_name",
        "status",
        "compliant",
        "risk_level",
        "error",
    ])?;

    for (business_id, slot) in job.requested.iter().zip(job.result_slots()) {
        match slot {
            Some(result) => {
                let compliant = if result.outcome == ItemOutcome::Compliant {
                    "yes"
                } else {
                    "no"
                };
                writer.write_record([
                    business_id.as_str(),
                    result.business_name.as_deref().unwrap_or(""),
                    result.outcome.label(),
                    compliant,
                    result.risk_level.map(|level| level.label()).unwrap_or(""),
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
            None => {
                writer.write_record([
                    business_id.as_str(),
                    "",
                    "not_processed",
                    "no",
                    "",
                    "",
                ])?;
            }
        }
    }

    writer.flush()?;
    drop(writer);
    // The writer only ever receives &str, so the buffer is valid UTF-8.
    Ok(String::from_utf8(buffer).expect("csv output is utf-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::job::{ItemResult, JobStatus};
    use crate::verification::domain::BusinessId;
    use chrono::NaiveDate;

    fn id(value: &str) -> BusinessId {
        BusinessId::parse(value).expect("valid id")
    }

    #[test]
    fn export_covers_every_requested_identifier() {
        let mut job = BulkJob::new(
            vec![id("AAA111BBB222"), id("CCC333DDD444"), id("EEE555FFF666")],
            NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"),
        );
        job.transition(JobStatus::Processing).expect("legal");
        job.record(0, ItemResult::not_found(id("AAA111BBB222")));
        job.record(
            1,
            ItemResult::error(id("CCC333DDD444"), true, "geocoder down".to_string()),
        );
        job.transition(JobStatus::Cancelled).expect("legal");

        let csv = export_csv(&job).expect("export writes");
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "identifier,business_name,status,compliant,risk_level,error"
        );
        assert!(lines[1].starts_with("AAA111BBB222,,not_found,no,,"));
        assert!(lines[2].contains("geocoder down"));
        assert!(lines[3].starts_with("EEE555FFF666,,not_processed,no,,"));
    }
}
