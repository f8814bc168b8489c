//! Rating aggregator: average ratings derived on every read.
//!
//! Averages are never stored. A school with no active reviews averages 0.

use std::collections::HashMap;

use crate::{
  Error, Result,
  school::{RatedSchool, School, SchoolId},
  store::ReviewStore,
};

/// `COALESCE(mean, 0)`.
pub fn coalesce(mean: Option<f64>) -> f64 { mean.unwrap_or(0.0) }

/// Attach averages from a batched query to their schools. Schools missing
/// from `averages` have no active reviews.
pub fn annotate(
  schools: Vec<School>,
  averages: impl IntoIterator<Item = (SchoolId, f64)>,
) -> Vec<RatedSchool> {
  let averages: HashMap<SchoolId, f64> = averages.into_iter().collect();
  schools
    .into_iter()
    .map(|school| {
      let average_rating = coalesce(averages.get(&school.id).copied());
      RatedSchool { school, average_rating }
    })
    .collect()
}

pub struct RatingAggregator<'a, S> {
  store: &'a S,
}

impl<'a, S: ReviewStore> RatingAggregator<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// The average rating of one school.
  pub async fn average_rating(&self, school: SchoolId) -> Result<f64> {
    let mean = self
      .store
      .average_rating(school)
      .await
      .map_err(Error::storage)?;
    Ok(coalesce(mean))
  }

  /// Rate a whole list of schools with one grouped query.
  pub async fn rate_all(&self, schools: Vec<School>) -> Result<Vec<RatedSchool>> {
    let averages = self.store.average_ratings().await.map_err(Error::storage)?;
    Ok(annotate(schools, averages))
  }
}
