//! Sampling pass that trains the boilerplate detectors

use super::{BoilerplateFilter, BoilerplateLearner};
use crate::config::{BoilerplateMode, ExtractionConfig};
use crate::render::RenderPool;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use url::Url;

/// Picks up to `size` URLs spread evenly over the sorted candidates
///
/// Small sites are sampled whole. The choice is deterministic.
pub fn choose_sample(candidates: &[String], size: usize) -> Vec<String> {
    let sorted: Vec<&String> = candidates.iter().collect::<BTreeSet<_>>().into_iter().collect();
    if sorted.len() <= size {
        return sorted.into_iter().cloned().collect();
    }
    (0..size)
        .map(|i| sorted[i * sorted.len() / size].clone())
        .collect()
}

/// Renders a sample of `candidates` and freezes the learned filter
///
/// Pages that fail to render are left out of the sample. Rendered pages are
/// fed to the learner one at a time as they complete.
pub async fn sample_boilerplate(
    pool: &RenderPool,
    root: &Url,
    candidates: &[String],
    config: &ExtractionConfig,
) -> BoilerplateFilter {
    if config.boilerplate == BoilerplateMode::Off {
        return BoilerplateFilter::disabled();
    }

    let sample = choose_sample(candidates, config.sample_size);
    let requested = sample.len();
    let mut learner = BoilerplateLearner::new(config.boilerplate, root.clone());

    let mut rendered = stream::iter(sample)
        .map(|url| async move {
            let result = pool.render(&url).await;
            (url, result)
        })
        .buffer_unordered(config.effective_render_slots().max(1));

    while let Some((url, result)) = rendered.next().await {
        let html = match result {
            Ok(html) => html,
            Err(e) => {
                warn!("Leaving {} out of the boilerplate sample: {}", url, e);
                continue;
            }
        };
        match Url::parse(&url) {
            Ok(page_url) => {
                learner.observe(&html, &page_url);
                debug!("Sampled {}", url);
            }
            Err(e) => warn!("Leaving {} out of the boilerplate sample: {}", url, e),
        }
    }

    let pages = learner.pages();
    let filter = learner.freeze(config.nav_threshold);
    info!(
        "Boilerplate sample: {}/{} pages, {} repeated blocks, {} navigational paths",
        pages,
        requested,
        filter.repeated().len(),
        filter.navigational().len()
    );
    filter
}
