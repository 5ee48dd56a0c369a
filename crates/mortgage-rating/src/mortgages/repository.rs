use super::domain::{MortgageApplication, MortgageFields, MortgageId, MortgagePatch};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Implementations assign ids on insert and never hand the same id out twice, even after
/// the record holding it has been deleted.
pub trait MortgageRepository: Send + Sync {
    fn insert(&self, fields: MortgageFields) -> Result<MortgageApplication, RepositoryError>;
    fn fetch(&self, id: MortgageId) -> Result<MortgageApplication, RepositoryError>;
    /// All records in insertion order.
    fn list(&self) -> Result<Vec<MortgageApplication>, RepositoryError>;
    fn update(
        &self,
        id: MortgageId,
        patch: &MortgagePatch,
    ) -> Result<MortgageApplication, RepositoryError>;
    fn delete(&self, id: MortgageId) -> Result<(), RepositoryError>;
    /// Mean credit score of the stored population, optionally leaving one record out.
    /// `None` when no record is eligible.
    fn average_credit_score(&self, exclude: Option<MortgageId>)
        -> Result<Option<f64>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("mortgage {0} not found")]
    NotFound(MortgageId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Shared averaging helper for repository implementations that hold records in memory.
pub fn mean_credit_score<'a, I>(records: I, exclude: Option<MortgageId>) -> Option<f64>
where
    I: IntoIterator<Item = &'a MortgageApplication>,
{
    let (sum, count) = records
        .into_iter()
        .filter(|record| Some(record.id) != exclude)
        .fold((0.0_f64, 0_u64), |(sum, count), record| {
            (sum + record.fields.credit_score as f64, count + 1)
        });

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
