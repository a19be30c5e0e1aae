#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use url_shortcode::application::services::{ShortCodeService, ShortCodeSettings};
use url_shortcode::domain::alphabet::AlphabetConfig;
use url_shortcode::domain::entities::{NewUrl, ShortCode};
use url_shortcode::domain::repositories::{UniquenessOracle, UrlRepository};
use url_shortcode::infrastructure::persistence::InMemoryUrlRepository;

/// Settings with a small code space and fast retries. Exhaustion is never
/// reported unless `max_cycles` is set afterwards.
pub fn tiny_settings(min: usize, max: usize, letters: &str, digits: &str) -> ShortCodeSettings {
    ShortCodeSettings {
        alphabet: AlphabetConfig::new(min, max, letters, digits).unwrap(),
        max_cycles: 0,
        max_failed_cycles: 0,
        check_retries: 1,
        retry_base_delay: Duration::from_millis(1),
        retry_max_delay: Duration::from_millis(5),
    }
}

pub fn start_codes<O>(oracle: Arc<O>, settings: ShortCodeSettings) -> Arc<ShortCodeService>
where
    O: UniquenessOracle + 'static,
{
    Arc::new(ShortCodeService::start(oracle, settings))
}

pub async fn store(repo: &InMemoryUrlRepository, code: &str) {
    let new_url = NewUrl::new(
        ShortCode::new_unchecked(code),
        "https://example.com",
        1,
        None,
    )
    .unwrap();

    repo.save_url(new_url).await.unwrap();
}
