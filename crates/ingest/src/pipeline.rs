use crate::cleaner::{clean_assignments, clean_invoices, CleaningRules, CleaningSummary};
use crate::error::IngestError;
use crate::loader::{open, read_assignments, read_invoices};
use database::SalesRepository;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// What one ingestion run loaded into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub invoices: CleaningSummary,
    pub assignments: CleaningSummary,
}

/// Reads, cleans and persists both input files.
///
/// Must complete before any report run starts. Both tables are replaced in a
/// single transaction, so a failed load leaves the previous snapshot intact.
pub async fn ingest_files(
    repo: &SalesRepository,
    invoices_csv: &Path,
    assignments_csv: &Path,
    rules: &CleaningRules,
) -> Result<IngestSummary, IngestError> {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        spinner.set_style(style);
    }

    spinner.set_message(format!("Reading {}...", invoices_csv.display()));
    let raw_invoices = read_invoices(open(invoices_csv)?)?;
    let (sales, invoice_summary) = clean_invoices(raw_invoices, rules);

    spinner.set_message(format!("Reading {}...", assignments_csv.display()));
    let raw_assignments = read_assignments(open(assignments_csv)?)?;
    let (assignments, assignment_summary) = clean_assignments(raw_assignments)?;

    spinner.set_message("Writing invoices and group assignments...");
    repo.replace_snapshot(&sales, &assignments).await?;

    spinner.finish_with_message(format!(
        "Loaded {} invoices and {} assignments.",
        sales.len(),
        assignments.len()
    ));

    Ok(IngestSummary {
        invoices: invoice_summary,
        assignments: assignment_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{connect_in_memory, run_migrations};
    use std::path::PathBuf;

    fn write_input(test: &str, name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("groupwise-ingest-{}-{test}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    async fn repository() -> SalesRepository {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        SalesRepository::new(pool)
    }

    #[tokio::test]
    async fn loads_cleaned_rows_into_the_store() {
        let invoices = write_input(
            "load",
            "invoices.csv",
            "userid,datepaid,event_id,amount,product_name\n\
             1,01/15/2023,10,25.50,Tickets\n\
             2,02/01/2023,11,,Merch\n\
             3,not-a-date,12,10.00,Parking\n\
             4,03/03/2023,12,10.00,Parking\n",
        );
        let assignments = write_input(
            "load",
            "assignments.csv",
            "userid,ui_change,desc_change\n1,0,0\n4,1,1\n",
        );
        let repo = repository().await;

        let summary = ingest_files(&repo, &invoices, &assignments, &CleaningRules::default())
            .await
            .unwrap();

        assert_eq!(summary.invoices.read, 4);
        assert_eq!(summary.invoices.kept, 2);
        assert_eq!(summary.invoices.dropped_incomplete, 1);
        assert_eq!(summary.invoices.dropped_unparseable, 1);
        assert_eq!(summary.assignments.kept, 2);
        assert_eq!(repo.count_sales().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn duplicate_assignment_aborts_ingestion() {
        let invoices = write_input(
            "duplicate",
            "invoices.csv",
            "userid,datepaid,event_id,amount,product_name\n1,01/15/2023,10,25.50,Tickets\n",
        );
        let assignments = write_input(
            "duplicate",
            "assignments.csv",
            "userid,ui_change,desc_change\n1,0,0\n1,1,0\n",
        );
        let repo = repository().await;

        let err = ingest_files(&repo, &invoices, &assignments, &CleaningRules::default())
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::DuplicateAssignment(1)));
        assert_eq!(repo.count_sales().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rejected_load_keeps_the_previous_snapshot() {
        let invoices = write_input(
            "rollback",
            "invoices.csv",
            "userid,datepaid,event_id,amount,product_name\n1,01/15/2023,10,25.50,Tickets\n",
        );
        let assignments = write_input("rollback", "assignments.csv", "userid,ui_change,desc_change\n1,0,0\n");
        let repo = repository().await;
        ingest_files(&repo, &invoices, &assignments, &CleaningRules::default())
            .await
            .unwrap();

        let bad_assignments = write_input(
            "rollback",
            "bad_assignments.csv",
            "userid,ui_change,desc_change\n1,0,0\n1,1,1\n",
        );
        assert!(ingest_files(&repo, &invoices, &bad_assignments, &CleaningRules::default())
            .await
            .is_err());

        assert_eq!(repo.count_sales().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_file_reports_its_path() {
        let repo = repository().await;
        let missing = PathBuf::from("does/not/exist.csv");

        let err = ingest_files(&repo, &missing, &missing, &CleaningRules::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
