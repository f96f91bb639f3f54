/// Read-through caching around an async block.
///
/// `$cache` is an `Option<&Cache>`. With a cache, a hit is returned directly
/// and a miss runs `$block`, queues the value for a background write with
/// `$ttl` seconds to live, and returns it. Without a cache the block simply
/// runs.
///
/// # Example
/// ```rust,ignore
/// let details: MovieDetails = cached!(self.cache.as_ref(), key, DETAILS_CACHE_TTL, async move {
///     fetch_from_tmdb().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache {
            Some(cache) => {
                if let Some(hit) = cache.get_from_cache(&$key).await? {
                    Ok(hit)
                } else {
                    let value = $block.await?;
                    cache.set_in_background(&$key, &value, $ttl);
                    Ok(value)
                }
            }
            None => $block.await,
        }
    }};
}
