//! Random order selection.

use rand::Rng;
use std::fmt;
use thiserror::Error;

use crate::catalog::Catalog;

/// Which prompts are eligible for a draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawFilter {
    /// Every prompt of every category
    Any,
    /// Only prompts of the named category
    Category(String),
}

impl DrawFilter {
    /// `None` means any category
    pub fn from_option(category: Option<String>) -> Self {
        match category {
            Some(name) => DrawFilter::Category(name),
            None => DrawFilter::Any,
        }
    }
}

impl fmt::Display for DrawFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawFilter::Any => write!(f, "any"),
            DrawFilter::Category(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("no {filter} orders to draw from")]
    EmptyPool { filter: DrawFilter },
}

/// Candidate prompts for a filter, in catalog order
pub fn pool<'a>(catalog: &'a Catalog, filter: &DrawFilter) -> Vec<&'a str> {
    match filter {
        DrawFilter::Any => catalog
            .iter()
            .flat_map(|(_, prompts)| prompts.iter().map(String::as_str))
            .collect(),
        DrawFilter::Category(name) => catalog
            .get(name)
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect(),
    }
}

/// Pick one prompt uniformly over the pool.
///
/// Each prompt is equally likely, so larger categories are drawn more often.
pub fn draw<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    filter: &DrawFilter,
    rng: &mut R,
) -> Result<&'a str, DrawError> {
    let pool = pool(catalog, filter);
    if pool.is_empty() {
        return Err(DrawError::EmptyPool {
            filter: filter.clone(),
        });
    }

    let idx = rng.random_range(0..pool.len());
    tracing::debug!("Drew order {} of {} ({})", idx + 1, pool.len(), filter);
    Ok(pool[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{COMBAT, NARRATIVE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::with_default_categories();
        catalog.push(COMBAT, "c1");
        catalog.push(NARRATIVE, "n1");
        catalog.push(NARRATIVE, "n2");
        catalog
    }

    #[test]
    fn test_pool_concatenates_in_order() {
        let catalog = sample_catalog();
        assert_eq!(pool(&catalog, &DrawFilter::Any), vec!["c1", "n1", "n2"]);
        assert_eq!(
            pool(&catalog, &DrawFilter::Category(NARRATIVE.into())),
            vec!["n1", "n2"]
        );
    }

    #[test]
    fn test_empty_category() {
        let catalog = Catalog::with_default_categories();
        let mut rng = StdRng::seed_from_u64(1);
        let filter = DrawFilter::Category(COMBAT.into());

        assert_eq!(
            draw(&catalog, &filter, &mut rng),
            Err(DrawError::EmptyPool { filter: filter.clone() })
        );
    }

    #[test]
    fn test_unknown_category_is_empty() {
        let catalog = sample_catalog();
        let mut rng = StdRng::seed_from_u64(1);
        let result = draw(&catalog, &DrawFilter::Category("social".into()), &mut rng);
        assert!(matches!(result, Err(DrawError::EmptyPool { .. })));
    }

    #[test]
    fn test_any_with_no_prompts() {
        let catalog = Catalog::with_default_categories();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(draw(&catalog, &DrawFilter::Any, &mut rng).is_err());
    }

    #[test]
    fn test_specific_category_only() {
        let catalog = sample_catalog();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = draw(&catalog, &DrawFilter::Category(COMBAT.into()), &mut rng).unwrap();
            assert_eq!(picked, "c1");
        }
    }

    #[test]
    fn test_uniform_per_prompt() {
        let catalog = sample_catalog();
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 30_000;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for _ in 0..trials {
            let picked = draw(&catalog, &DrawFilter::Any, &mut rng).unwrap();
            *counts.entry(picked).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        // Expect 1/3 each (not 1/2 for the lone combat prompt)
        for prompt in ["c1", "n1", "n2"] {
            let share = counts[prompt] as f64 / trials as f64;
            assert!((share - 1.0 / 3.0).abs() < 0.02, "{} drawn {:.3}", prompt, share);
        }
    }

    #[test]
    fn test_error_message() {
        let err = DrawError::EmptyPool {
            filter: DrawFilter::Category(COMBAT.into()),
        };
        assert_eq!(err.to_string(), "no combat orders to draw from");
    }
}
