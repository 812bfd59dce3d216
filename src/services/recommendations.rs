use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

use crate::{
    dataset::MergedDataset,
    models::{Place, TimeBucket},
};

/// Most places returned by one recommendation draw
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Shown when the filter matches nothing
pub const NOT_FOUND_MESSAGE: &str = "조건에 맞는 장소가 없습니다.";

/// Result of one filter request; an empty match is not an error
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "places", rename_all = "snake_case")]
pub enum Recommendation {
    Found(Vec<Place>),
    NotFound,
}

impl Recommendation {
    pub fn places(&self) -> &[Place] {
        match self {
            Recommendation::Found(places) => places,
            Recommendation::NotFound => &[],
        }
    }

    pub fn into_places(self) -> Vec<Place> {
        match self {
            Recommendation::Found(places) => places,
            Recommendation::NotFound => Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Recommendation::Found(_))
    }
}

/// Picks up to three places of `category` within the bucket's distance ceiling
///
/// Category matching is exact and case-sensitive. Each call makes a fresh draw
/// from the thread RNG, so identical inputs can return different places.
pub fn recommend(dataset: &MergedDataset, category: &str, bucket: TimeBucket) -> Recommendation {
    recommend_with_rng(dataset, category, bucket, &mut rand::thread_rng())
}

/// Same as [`recommend`] with a caller-supplied RNG
pub fn recommend_with_rng<R: Rng + ?Sized>(
    dataset: &MergedDataset,
    category: &str,
    bucket: TimeBucket,
    rng: &mut R,
) -> Recommendation {
    let bound_km = bucket.max_distance_km();
    let candidates: Vec<&Place> = dataset
        .places()
        .iter()
        .filter(|place| place.category.as_deref() == Some(category))
        .filter(|place| place.is_within(bound_km))
        .collect();

    tracing::debug!(
        category = %category,
        bucket = %bucket,
        candidates = candidates.len(),
        "Recommendation filter applied"
    );

    if candidates.is_empty() {
        return Recommendation::NotFound;
    }

    // Sampling without replacement over row positions keeps duplicate names distinct
    let picked = candidates
        .choose_multiple(rng, MAX_RECOMMENDATIONS.min(candidates.len()))
        .map(|place| (*place).clone())
        .collect();

    Recommendation::Found(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn place(category: &str, name: &str, drive_minutes: f64) -> Place {
        Place::new(
            Some(category.to_string()),
            name,
            format!("대전 중구 {}", name),
            Some(drive_minutes),
            Some(drive_minutes * 3.0),
        )
    }

    fn cafe_dataset() -> MergedDataset {
        (0..10)
            .map(|i| place("카페", &format!("카페{}", i), 5.0 + 10.0 * i as f64))
            .chain([place("공원", "보문산공원", 10.0)])
            .collect()
    }

    #[test]
    fn test_example_only_the_near_cafe_qualifies() {
        let dataset: MergedDataset = vec![
            place("카페", "가까운 카페", 10.0),
            place("카페", "먼 카페", 40.0),
        ]
        .into_iter()
        .collect();

        let result = recommend(&dataset, "카페", "10min".parse().unwrap());

        assert_eq!(
            result,
            Recommendation::Found(vec![place("카페", "가까운 카페", 10.0)])
        );
    }

    #[test]
    fn test_every_result_respects_the_bucket_ceiling() {
        let dataset = cafe_dataset();
        let mut rng = StdRng::seed_from_u64(7);

        for bucket in TimeBucket::ALL {
            for _ in 0..20 {
                let result = recommend_with_rng(&dataset, "카페", bucket, &mut rng);
                for place in result.places() {
                    assert!(place.distance_km.unwrap() <= bucket.max_distance_km());
                }
            }
        }
    }

    #[test]
    fn test_absent_category_is_not_found() {
        let dataset = cafe_dataset();
        assert_eq!(
            recommend(&dataset, "없는카테고리", TimeBucket::WithinAnHour),
            Recommendation::NotFound
        );
        // case-sensitive exact match
        let dataset: MergedDataset = vec![place("Cafe", "x", 1.0)].into_iter().collect();
        assert_eq!(
            recommend(&dataset, "cafe", TimeBucket::WithinAnHour),
            Recommendation::NotFound
        );
    }

    #[test]
    fn test_never_more_than_three_and_no_duplicates() {
        let dataset = cafe_dataset();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let result = recommend_with_rng(&dataset, "카페", TimeBucket::WithinAnHour, &mut rng);
            let places = result.places();
            assert_eq!(places.len(), MAX_RECOMMENDATIONS);

            let names: HashSet<&str> = places.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names.len(), places.len());
        }
    }

    #[test]
    fn test_fewer_matches_than_limit_returns_all_of_them() {
        let dataset: MergedDataset = vec![
            place("제과점", "성심당", 3.0),
            place("제과점", "빵집", 12.0),
            place("제과점", "먼 빵집", 200.0),
            place("카페", "커피집", 3.0),
        ]
        .into_iter()
        .collect();

        let result = recommend(&dataset, "제과점", TimeBucket::TenMinutes);
        let names: HashSet<String> = result.into_places().into_iter().map(|p| p.name).collect();

        assert_eq!(names, HashSet::from(["성심당".to_string(), "빵집".to_string()]));
    }

    #[test]
    fn test_rows_without_category_or_distance_never_match() {
        let dataset: MergedDataset = vec![
            Place::new(None, "무분류", "", Some(1.0), None),
            Place::new(Some("카페".into()), "시간없음", "", None, None),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            recommend(&dataset, "카페", TimeBucket::WithinAnHour),
            Recommendation::NotFound
        );
    }

    #[test]
    fn test_dataset_is_not_mutated() {
        let dataset = cafe_dataset();
        let before = dataset.places().to_vec();
        let _ = recommend(&dataset, "카페", TimeBucket::ThirtyMinutes);
        assert_eq!(dataset.places(), before.as_slice());
    }
}
